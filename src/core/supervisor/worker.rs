//! Monitored worker identity and liveness bookkeeping
//!
//! The supervisor watches a fixed set of three workers. Each worker has a
//! stable 1-byte code used at the request/response boundary; internally the
//! protocol works on `WorkerId` so an unknown code can only enter through
//! the explicit `from_code` conversion.

use core::cell::UnsafeCell;

/// Identity of a monitored worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkerId {
    /// Satellite-fix decoding task
    Gps,
    /// Operator console task
    Console,
    /// Distance-to-target task
    Distance,
}

impl WorkerId {
    /// Number of monitored workers
    pub const COUNT: usize = 3;

    /// All monitored workers, in probe order
    pub const ALL: [WorkerId; Self::COUNT] = [WorkerId::Gps, WorkerId::Console, WorkerId::Distance];

    /// Wire code for this worker
    pub const fn code(self) -> u8 {
        match self {
            WorkerId::Gps => 0,
            WorkerId::Console => 1,
            WorkerId::Distance => 2,
        }
    }

    /// Resolve a wire code to a worker identity
    ///
    /// Returns `None` for codes outside the monitored set; callers treat
    /// that as a fatal protocol violation.
    pub const fn from_code(code: u8) -> Option<WorkerId> {
        match code {
            0 => Some(WorkerId::Gps),
            1 => Some(WorkerId::Console),
            2 => Some(WorkerId::Distance),
            _ => None,
        }
    }

    const fn bit(self) -> u8 {
        1 << self.code()
    }
}

/// Fixed-size set of worker identities
///
/// Used both for the per-round liveness register and for the statically
/// known expected set the register is reconciled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LivenessSet {
    bits: u8,
}

impl LivenessSet {
    /// The empty set
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// The full set of monitored workers
    pub const fn monitored() -> Self {
        Self {
            bits: WorkerId::Gps.bit() | WorkerId::Console.bit() | WorkerId::Distance.bit(),
        }
    }

    /// Insert a worker; returns `false` if it was already present
    pub fn insert(&mut self, id: WorkerId) -> bool {
        let newly = self.bits & id.bit() == 0;
        self.bits |= id.bit();
        newly
    }

    /// Whether the set contains `id`
    pub const fn contains(self, id: WorkerId) -> bool {
        self.bits & id.bit() != 0
    }

    /// Whether the set is empty
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Completeness check against the expected set
    ///
    /// The round is healthy only when every expected worker (and nothing
    /// else) has answered.
    pub const fn is_complete(self, expected: LivenessSet) -> bool {
        self.bits == expected.bits
    }
}

struct RegisterState {
    answered: LivenessSet,
    poisoned: bool,
}

/// Per-round liveness register shared between the supervisor and workers
///
/// Each bit is set only from its owning worker's execution context; the
/// supervisor clears the register at round start and reads it at
/// reconciliation. The poison flag records a fatal protocol violation
/// (an unrecognized worker code) and is never cleared.
pub struct SharedLivenessRegister {
    inner: UnsafeCell<RegisterState>,
}

// Safety: all access goes through critical sections in the methods below,
// which is sound in interrupt-adjacent contexts on a single address space.
unsafe impl Sync for SharedLivenessRegister {}
unsafe impl Send for SharedLivenessRegister {}

impl SharedLivenessRegister {
    /// Create an empty register
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(RegisterState {
                answered: LivenessSet::empty(),
                poisoned: false,
            }),
        }
    }

    /// Record a worker's answer for the current round
    pub fn record(&self, id: WorkerId) {
        critical_section::with(|_cs| unsafe {
            (*self.inner.get()).answered.insert(id);
        });
    }

    /// Snapshot of the workers that have answered this round
    pub fn answered(&self) -> LivenessSet {
        critical_section::with(|_cs| unsafe { (*self.inner.get()).answered })
    }

    /// Clear the register at round start / after a healthy reconciliation
    pub fn clear(&self) {
        critical_section::with(|_cs| unsafe {
            (*self.inner.get()).answered = LivenessSet::empty();
        });
    }

    /// Mark the register permanently poisoned (fatal protocol violation)
    pub fn poison(&self) {
        critical_section::with(|_cs| unsafe {
            (*self.inner.get()).poisoned = true;
        });
    }

    /// Whether a fatal protocol violation has been recorded
    pub fn is_poisoned(&self) -> bool {
        critical_section::with(|_cs| unsafe { (*self.inner.get()).poisoned })
    }
}

impl Default for SharedLivenessRegister {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending-probe flag owned by one worker
///
/// The supervisor raises the flag from its own context; the worker takes
/// it on its next wake and answers through its `LivenessReporter`.
pub struct ProbeFlag {
    inner: UnsafeCell<bool>,
}

// Safety: see SharedLivenessRegister.
unsafe impl Sync for ProbeFlag {}
unsafe impl Send for ProbeFlag {}

impl ProbeFlag {
    /// Create a lowered flag
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(false),
        }
    }

    /// Raise the flag (supervisor context)
    pub fn raise(&self) {
        critical_section::with(|_cs| unsafe {
            *self.inner.get() = true;
        });
    }

    /// Take the flag, lowering it (worker context)
    pub fn take(&self) -> bool {
        critical_section::with(|_cs| unsafe {
            let raised = *self.inner.get();
            *self.inner.get() = false;
            raised
        })
    }

    /// Whether the flag is currently raised
    pub fn is_raised(&self) -> bool {
        critical_section::with(|_cs| unsafe { *self.inner.get() })
    }
}

impl Default for ProbeFlag {
    fn default() -> Self {
        Self::new()
    }
}
