//! Hardware watchdog interface trait

/// Hardware watchdog interface
///
/// The watchdog resets the device unless it is refreshed within its
/// hardware timeout. The health supervisor owns the refresh policy;
/// platform implementations only expose the refresh primitive.
///
/// # Safety Invariants
///
/// - Once started, the hardware watchdog cannot be stopped
/// - `refresh` must be callable from any execution context
pub trait WatchdogInterface {
    /// Refresh (feed) the watchdog, restarting its hardware timeout
    fn refresh(&mut self);
}
