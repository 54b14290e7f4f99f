//! Cross-task health supervision
//!
//! The supervisor gates hardware-watchdog refresh on proof that every
//! monitored task is still responsive. It runs a repeating round over a
//! fixed tick sequence: every tick toggles the liveness indicator and
//! refreshes the watchdog; at a fixed offset it broadcasts a liveness
//! probe to each worker; at a later offset it reconciles the answers
//! against the statically known expected set. A mismatch is deliberately
//! unrecoverable: the supervisor enters a terminal state, stops touching
//! the watchdog, and lets the hardware reset the device.
//!
//! Splitting a fast "I am alive" toggle from the slower "are my
//! dependents alive" round catches a hung worker within one round
//! instead of only at hardware watchdog-timeout granularity.

pub mod period;
pub mod worker;

pub use period::{PeriodCommand, RefreshPeriod, SharedPeriodControl, STEADY_PERIOD_MS};
pub use worker::{LivenessSet, ProbeFlag, SharedLivenessRegister, WorkerId};

use crate::platform::{GpioInterface, Result, WatchdogInterface};
use core::cell::UnsafeCell;

/// Tick at which the supervisor broadcasts liveness probes
pub const BROADCAST_TICK: u16 = 2;

/// Tick at which the supervisor reconciles the liveness register
pub const RECONCILE_TICK: u16 = 8;

/// Number of ticks in one supervision round
pub const ROUND_TICKS: u16 = 10;

/// Probe delivery failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeError {
    /// No route to the requested worker (programming-error class)
    UnknownWorker(u8),
}

/// Outbound probe seam between the supervisor and its workers
///
/// Implementations route a liveness request to the addressed worker's
/// own execution context. Returning an error is treated as a fatal
/// supervision failure, the same class as an unrecognized worker code.
pub trait LivenessPort {
    /// Deliver a liveness request to `id`
    fn request(&mut self, id: WorkerId) -> core::result::Result<(), ProbeError>;
}

/// Interrupt-safe wrapper sharing one hardware watchdog between the
/// supervisor task and the worker-side response path
pub struct SharedWatchdog<W: WatchdogInterface> {
    inner: UnsafeCell<W>,
}

// Safety: all access goes through critical sections in the methods below.
unsafe impl<W: WatchdogInterface + Send> Sync for SharedWatchdog<W> {}
unsafe impl<W: WatchdogInterface + Send> Send for SharedWatchdog<W> {}

impl<W: WatchdogInterface> SharedWatchdog<W> {
    /// Wrap a watchdog for shared access
    pub const fn new(watchdog: W) -> Self {
        Self {
            inner: UnsafeCell::new(watchdog),
        }
    }

    /// Refresh the watchdog (any context)
    pub fn refresh(&self) {
        critical_section::with(|_cs| unsafe {
            (*self.inner.get()).refresh();
        });
    }

    /// Access the underlying watchdog (test inspection, init)
    pub fn with<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        critical_section::with(|_cs| unsafe { f(&mut *self.inner.get()) })
    }
}

/// Worker-side handle for answering liveness probes
///
/// Each answer records the worker in the shared register and doubles as
/// a watchdog refresh. Once the register is poisoned no further refresh
/// is issued, so a wedged supervisor cannot be kept alive by its
/// workers.
pub struct LivenessReporter<'a, W: WatchdogInterface> {
    register: &'a SharedLivenessRegister,
    watchdog: &'a SharedWatchdog<W>,
}

impl<'a, W: WatchdogInterface> LivenessReporter<'a, W> {
    /// Create a reporter bound to the shared register and watchdog
    pub fn new(register: &'a SharedLivenessRegister, watchdog: &'a SharedWatchdog<W>) -> Self {
        Self { register, watchdog }
    }

    /// Answer the current round's probe as `id`
    pub fn report(&self, id: WorkerId) {
        if self.register.is_poisoned() {
            return;
        }
        self.register.record(id);
        self.watchdog.refresh();
    }

    /// Answer with a raw wire code
    ///
    /// An unrecognized code poisons the register, which the supervisor
    /// treats as fatal on its next tick.
    pub fn report_code(&self, code: u8) {
        match WorkerId::from_code(code) {
            Some(id) => self.report(id),
            None => {
                crate::log_error!("liveness response with unknown worker code {}", code);
                self.register.poison();
            }
        }
    }
}

impl<W: WatchdogInterface> Clone for LivenessReporter<'_, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W: WatchdogInterface> Copy for LivenessReporter<'_, W> {}

/// Probe routing to the three workers' pending-probe flags
pub struct ProbeFanout<'a> {
    /// Satellite-fix worker flag
    pub gps: &'a ProbeFlag,
    /// Console worker flag
    pub console: &'a ProbeFlag,
    /// Distance worker flag
    pub distance: &'a ProbeFlag,
}

impl LivenessPort for ProbeFanout<'_> {
    fn request(&mut self, id: WorkerId) -> core::result::Result<(), ProbeError> {
        match id {
            WorkerId::Gps => self.gps.raise(),
            WorkerId::Console => self.console.raise(),
            WorkerId::Distance => self.distance.raise(),
        }
        Ok(())
    }
}

/// Result of one supervisor tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Healthy; sleep `next_delay_ms` before the next tick
    Running {
        /// Delay before the next tick in milliseconds
        next_delay_ms: u16,
    },
    /// Terminal state; the watchdog is never refreshed again
    Wedged,
}

/// The health supervision state machine
///
/// Owns the indicator pin and the probe port; shares the watchdog and
/// the liveness register with the worker-side response path. All state
/// is mutated from the supervisor's own context, except the period
/// override which arrives through the [`SharedPeriodControl`] mailbox.
pub struct HealthSupervisor<'a, W, G, P>
where
    W: WatchdogInterface,
    G: GpioInterface,
    P: LivenessPort,
{
    watchdog: &'a SharedWatchdog<W>,
    indicator: G,
    port: P,
    register: &'a SharedLivenessRegister,
    control: &'a SharedPeriodControl,
    period: RefreshPeriod,
    expected: LivenessSet,
    counter: u16,
    wedged: bool,
}

impl<'a, W, G, P> HealthSupervisor<'a, W, G, P>
where
    W: WatchdogInterface,
    G: GpioInterface,
    P: LivenessPort,
{
    /// Create a supervisor in the idle-ticking state
    pub fn new(
        watchdog: &'a SharedWatchdog<W>,
        indicator: G,
        port: P,
        register: &'a SharedLivenessRegister,
        control: &'a SharedPeriodControl,
    ) -> Self {
        Self {
            watchdog,
            indicator,
            port,
            register,
            control,
            period: RefreshPeriod::default(),
            expected: LivenessSet::monitored(),
            counter: 0,
            wedged: false,
        }
    }

    /// Run one supervisor tick
    ///
    /// Returns the delay to sleep before the next tick, or
    /// [`TickOutcome::Wedged`] once the terminal state has been entered.
    /// In the terminal state the tick performs no action at all: no
    /// indicator toggle, no watchdog refresh, no probes.
    ///
    /// # Errors
    ///
    /// Propagates indicator GPIO failures; callers treat them like a
    /// wedge since the tick can no longer be trusted.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.wedged || self.register.is_poisoned() {
            return Ok(self.wedge());
        }

        if let Some(cmd) = self.control.take() {
            self.period.apply(cmd);
        }

        self.indicator.toggle()?;
        self.watchdog.refresh();

        self.counter += 1;
        if self.counter == BROADCAST_TICK {
            if self.broadcast().is_err() {
                return Ok(self.wedge());
            }
        } else if self.counter == RECONCILE_TICK && !self.reconcile() {
            return Ok(self.wedge());
        }
        if self.counter >= ROUND_TICKS {
            self.counter = 0;
        }

        Ok(TickOutcome::Running {
            next_delay_ms: self.period.next_delay_ms(),
        })
    }

    /// Whether the supervisor has entered the terminal state
    pub fn is_wedged(&self) -> bool {
        self.wedged
    }

    /// The indicator pin (test inspection)
    pub fn indicator(&self) -> &G {
        &self.indicator
    }

    fn broadcast(&mut self) -> core::result::Result<(), ProbeError> {
        self.expected = LivenessSet::monitored();
        self.register.clear();
        for id in WorkerId::ALL {
            self.port.request(id)?;
        }
        crate::log_debug!("liveness round started");
        Ok(())
    }

    fn reconcile(&mut self) -> bool {
        let answered = self.register.answered();
        if answered.is_complete(self.expected) {
            self.register.clear();
            true
        } else {
            crate::log_error!("liveness round incomplete: {:?}", answered);
            false
        }
    }

    fn wedge(&mut self) -> TickOutcome {
        if !self.wedged {
            self.wedged = true;
            // Poison the register so late worker answers stop refreshing
            // the watchdog too.
            self.register.poison();
            crate::log_error!("health supervision failed, watchdog refresh withheld");
        }
        TickOutcome::Wedged
    }
}

/// Async supervisor loop (embassy targets)
///
/// Sleeps the delay returned by each tick; once wedged it parks forever
/// so the hardware watchdog expires and resets the device.
#[cfg(feature = "embassy")]
pub async fn run<W, G, P>(mut supervisor: HealthSupervisor<'_, W, G, P>) -> !
where
    W: WatchdogInterface,
    G: GpioInterface,
    P: LivenessPort,
{
    loop {
        match supervisor.tick() {
            Ok(TickOutcome::Running { next_delay_ms }) => {
                embassy_time::Timer::after(embassy_time::Duration::from_millis(
                    next_delay_ms as u64,
                ))
                .await;
            }
            Ok(TickOutcome::Wedged) | Err(_) => {
                core::future::pending::<()>().await;
            }
        }
    }
}
