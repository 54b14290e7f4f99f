//! Supervisor tick-period control
//!
//! The supervisor ticks at a steady period but accepts a temporary
//! override (a faster or slower blink for a bounded number of ticks)
//! requested from other tasks. Overrides do not stack: a new request
//! replaces any in-flight one, and the period reverts to the steady
//! value on its own once the override's ticks are used up.

use core::cell::UnsafeCell;

/// Default steady tick period in milliseconds
pub const STEADY_PERIOD_MS: u16 = 1000;

/// A requested change to the supervisor tick period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeriodCommand {
    /// Replace the steady period and cancel any override
    Steady(u16),
    /// Use `period_ms` for the next `ticks` ticks, then revert
    Temporary { period_ms: u16, ticks: u8 },
}

/// The supervisor's view of its tick period
#[derive(Debug, Clone, Copy)]
pub struct RefreshPeriod {
    steady_ms: u16,
    temporary: Option<(u16, u8)>,
}

impl RefreshPeriod {
    /// Create with the given steady period
    pub const fn new(steady_ms: u16) -> Self {
        Self {
            steady_ms,
            temporary: None,
        }
    }

    /// Apply a period command
    ///
    /// A `Temporary` command with zero ticks is ignored.
    pub fn apply(&mut self, cmd: PeriodCommand) {
        match cmd {
            PeriodCommand::Steady(ms) => {
                self.steady_ms = ms;
                self.temporary = None;
            }
            PeriodCommand::Temporary { period_ms, ticks } => {
                if ticks > 0 {
                    self.temporary = Some((period_ms, ticks));
                }
            }
        }
    }

    /// Delay to sleep before the next tick, consuming one override tick
    pub fn next_delay_ms(&mut self) -> u16 {
        match self.temporary {
            Some((period_ms, remaining)) => {
                self.temporary = if remaining > 1 {
                    Some((period_ms, remaining - 1))
                } else {
                    None
                };
                period_ms
            }
            None => self.steady_ms,
        }
    }

    /// The steady period an override reverts to
    pub fn steady_ms(&self) -> u16 {
        self.steady_ms
    }

    /// Whether a temporary override is in flight
    pub fn is_overridden(&self) -> bool {
        self.temporary.is_some()
    }
}

impl Default for RefreshPeriod {
    fn default() -> Self {
        Self::new(STEADY_PERIOD_MS)
    }
}

/// Mailbox through which other tasks request a period change
///
/// The supervisor drains it at the start of each tick, so the
/// supervisor's own state is mutated only from its own context.
/// A second request before pickup replaces the first.
pub struct SharedPeriodControl {
    inner: UnsafeCell<Option<PeriodCommand>>,
}

// Safety: all access goes through critical sections in the methods below.
unsafe impl Sync for SharedPeriodControl {}
unsafe impl Send for SharedPeriodControl {}

impl SharedPeriodControl {
    /// Create an empty mailbox
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(None),
        }
    }

    /// Request a period change (any task context)
    pub fn request(&self, cmd: PeriodCommand) {
        critical_section::with(|_cs| unsafe {
            *self.inner.get() = Some(cmd);
        });
    }

    /// Take the pending request, if any (supervisor context)
    pub fn take(&self) -> Option<PeriodCommand> {
        critical_section::with(|_cs| unsafe { (*self.inner.get()).take() })
    }
}

impl Default for SharedPeriodControl {
    fn default() -> Self {
        Self::new()
    }
}
