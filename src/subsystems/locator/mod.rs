//! Target point configuration and the distance worker
//!
//! The operator configures a target point over the console; the
//! distance worker periodically measures how far the last accepted fix
//! is from it and maps the distance to an indicator blink rate, so the
//! LED speeds up as the device closes in on the target.

pub mod geo;

use crate::core::supervisor::{
    LivenessReporter, PeriodCommand, ProbeFlag, SharedPeriodControl, WorkerId, STEADY_PERIOD_MS,
};
use crate::devices::gps::SharedPositionState;
use crate::platform::WatchdogInterface;
use core::cell::UnsafeCell;
use geo::haversine_distance_m;

/// Default Earth radius in kilometers
pub const EARTH_RADIUS_KM_DEFAULT: f64 = 6378.1;

/// Smallest accepted Earth radius (polar) in kilometers
pub const EARTH_RADIUS_KM_MIN: f64 = 6356.8;

/// Largest accepted Earth radius (equatorial) in kilometers
pub const EARTH_RADIUS_KM_MAX: f64 = 6378.1;

/// Cadence of the distance check in milliseconds
pub const DISTANCE_CHECK_PERIOD_MS: u64 = 5000;

/// Operator-configured target point
#[derive(Debug, Clone, Copy)]
pub struct TargetConfig {
    /// Target latitude in decimal degrees
    pub latitude: f64,
    /// Target longitude in decimal degrees
    pub longitude: f64,
    /// Earth radius used for the distance computation, in kilometers
    pub earth_radius_km: f64,
    lat_set: bool,
    lon_set: bool,
}

impl TargetConfig {
    /// Create an unconfigured target
    pub const fn new() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            earth_radius_km: EARTH_RADIUS_KM_DEFAULT,
            lat_set: false,
            lon_set: false,
        }
    }

    /// Whether both coordinates have been configured
    pub fn is_configured(&self) -> bool {
        self.lat_set && self.lon_set
    }

    fn set_latitude(&mut self, latitude: f64) -> bool {
        if (-90.0..=90.0).contains(&latitude) {
            self.latitude = latitude;
            self.lat_set = true;
            true
        } else {
            false
        }
    }

    fn set_longitude(&mut self, longitude: f64) -> bool {
        if (-180.0..=180.0).contains(&longitude) {
            self.longitude = longitude;
            self.lon_set = true;
            true
        } else {
            false
        }
    }

    fn set_earth_radius_km(&mut self, radius_km: f64) -> bool {
        if (EARTH_RADIUS_KM_MIN..=EARTH_RADIUS_KM_MAX).contains(&radius_km) {
            self.earth_radius_km = radius_km;
            true
        } else {
            false
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Target configuration shared between the console (writer) and the
/// distance worker (reader)
pub struct SharedTargetConfig {
    inner: UnsafeCell<TargetConfig>,
}

// Safety: all access goes through critical sections in the methods below.
unsafe impl Sync for SharedTargetConfig {}
unsafe impl Send for SharedTargetConfig {}

impl SharedTargetConfig {
    /// Create an unconfigured shared target
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(TargetConfig::new()),
        }
    }

    /// Set the target latitude; `false` if out of range
    pub fn set_latitude(&self, latitude: f64) -> bool {
        critical_section::with(|_cs| unsafe { (*self.inner.get()).set_latitude(latitude) })
    }

    /// Set the target longitude; `false` if out of range
    pub fn set_longitude(&self, longitude: f64) -> bool {
        critical_section::with(|_cs| unsafe { (*self.inner.get()).set_longitude(longitude) })
    }

    /// Set the Earth radius in kilometers; `false` if out of range
    pub fn set_earth_radius_km(&self, radius_km: f64) -> bool {
        critical_section::with(|_cs| unsafe { (*self.inner.get()).set_earth_radius_km(radius_km) })
    }

    /// Snapshot of the current configuration
    pub fn snapshot(&self) -> TargetConfig {
        critical_section::with(|_cs| unsafe { *self.inner.get() })
    }
}

impl Default for SharedTargetConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one distance check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceCheck {
    /// No fresh fix available; the indicator falls back to the slow blink
    NoFix,
    /// A fix is available but the target is not fully configured yet
    AwaitingTarget,
    /// Distance to the configured target
    Measured {
        /// Great-circle distance in meters
        distance_m: f64,
    },
}

/// Map a measured distance to the indicator blink period
fn blink_period_ms(distance_m: f64) -> u16 {
    if distance_m <= 20.0 {
        20
    } else if distance_m <= 50.0 {
        50
    } else if distance_m <= 100.0 {
        100
    } else if distance_m <= 250.0 {
        250
    } else if distance_m <= 500.0 {
        500
    } else {
        STEADY_PERIOD_MS
    }
}

/// The distance-to-target worker
///
/// Reads the published position, never writes it; requests indicator
/// blink periods through the supervisor's period mailbox.
pub struct DistanceMonitor<'a, W: WatchdogInterface> {
    position: &'a SharedPositionState,
    target: &'a SharedTargetConfig,
    control: &'a SharedPeriodControl,
    probe: &'a ProbeFlag,
    reporter: LivenessReporter<'a, W>,
}

impl<'a, W: WatchdogInterface> DistanceMonitor<'a, W> {
    /// Create the worker around its injected shared state
    pub fn new(
        position: &'a SharedPositionState,
        target: &'a SharedTargetConfig,
        control: &'a SharedPeriodControl,
        probe: &'a ProbeFlag,
        reporter: LivenessReporter<'a, W>,
    ) -> Self {
        Self {
            position,
            target,
            control,
            probe,
            reporter,
        }
    }

    /// One periodic distance check
    pub fn check(&mut self) -> DistanceCheck {
        let snapshot = self.position.snapshot();
        if !snapshot.is_valid() {
            crate::log_info!("no valid fix, distance check skipped");
            self.control.request(PeriodCommand::Steady(STEADY_PERIOD_MS));
            return DistanceCheck::NoFix;
        }

        let target = self.target.snapshot();
        if !target.is_configured() {
            return DistanceCheck::AwaitingTarget;
        }

        let distance_m = haversine_distance_m(
            snapshot.fix.latitude.decimal_degrees,
            snapshot.fix.longitude.decimal_degrees,
            target.latitude,
            target.longitude,
            target.earth_radius_km,
        );
        self.control
            .request(PeriodCommand::Steady(blink_period_ms(distance_m)));
        DistanceCheck::Measured { distance_m }
    }

    /// Answer a pending liveness probe
    pub fn answer_probe(&mut self) {
        if self.probe.take() {
            self.reporter.report(WorkerId::Distance);
        }
    }
}

/// Async distance loop (embassy targets)
///
/// The 5 s cadence is well inside the supervisor's broadcast-to-
/// reconcile window, so a pending probe is always answered in time.
#[cfg(feature = "embassy")]
pub async fn run<W: WatchdogInterface>(mut monitor: DistanceMonitor<'_, W>) -> ! {
    let mut ticker =
        embassy_time::Ticker::every(embassy_time::Duration::from_millis(DISTANCE_CHECK_PERIOD_MS));
    loop {
        ticker.next().await;
        monitor.check();
        monitor.answer_probe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::supervisor::{SharedLivenessRegister, SharedWatchdog};
    use crate::devices::gps::{Coordinate, Fix};
    use crate::platform::mock::MockWatchdog;

    struct Harness {
        position: SharedPositionState,
        target: SharedTargetConfig,
        control: SharedPeriodControl,
        probe: ProbeFlag,
        register: SharedLivenessRegister,
        watchdog: SharedWatchdog<MockWatchdog>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                position: SharedPositionState::new(),
                target: SharedTargetConfig::new(),
                control: SharedPeriodControl::new(),
                probe: ProbeFlag::new(),
                register: SharedLivenessRegister::new(),
                watchdog: SharedWatchdog::new(MockWatchdog::new()),
            }
        }

        fn monitor(&self) -> DistanceMonitor<'_, MockWatchdog> {
            DistanceMonitor::new(
                &self.position,
                &self.target,
                &self.control,
                &self.probe,
                LivenessReporter::new(&self.register, &self.watchdog),
            )
        }

        fn publish_fix_at(&self, latitude: f64, longitude: f64) {
            let mut fix = Fix {
                status: b'A',
                ..Fix::default()
            };
            fix.latitude = Coordinate {
                hemisphere: b'N',
                degrees: latitude as i16,
                minutes: 0,
                decimal_degrees: latitude,
            };
            fix.longitude = Coordinate {
                hemisphere: b'E',
                degrees: longitude as i16,
                minutes: 0,
                decimal_degrees: longitude,
            };
            self.position.publish(fix);
        }
    }

    #[test]
    fn test_target_config_ranges() {
        let target = SharedTargetConfig::new();
        assert!(!target.snapshot().is_configured());

        assert!(target.set_latitude(48.1173));
        assert!(!target.snapshot().is_configured());
        assert!(target.set_longitude(11.5167));
        assert!(target.snapshot().is_configured());

        assert!(!target.set_latitude(90.5));
        assert!(!target.set_longitude(-180.5));
        assert!(target.set_earth_radius_km(6371.0));
        assert!(!target.set_earth_radius_km(6400.0));
        assert!(!target.set_earth_radius_km(6000.0));
    }

    #[test]
    fn test_blink_bands() {
        assert_eq!(blink_period_ms(0.0), 20);
        assert_eq!(blink_period_ms(20.0), 20);
        assert_eq!(blink_period_ms(20.1), 50);
        assert_eq!(blink_period_ms(75.0), 100);
        assert_eq!(blink_period_ms(200.0), 250);
        assert_eq!(blink_period_ms(400.0), 500);
        assert_eq!(blink_period_ms(501.0), 1000);
    }

    #[test]
    fn test_no_fix_falls_back_to_slow_blink() {
        let harness = Harness::new();
        let mut monitor = harness.monitor();

        assert_eq!(monitor.check(), DistanceCheck::NoFix);
        assert_eq!(
            harness.control.take(),
            Some(PeriodCommand::Steady(STEADY_PERIOD_MS))
        );
    }

    #[test]
    fn test_awaiting_target_requests_nothing() {
        let harness = Harness::new();
        let mut monitor = harness.monitor();

        harness.publish_fix_at(48.1173, 11.5167);
        assert_eq!(monitor.check(), DistanceCheck::AwaitingTarget);
        assert_eq!(harness.control.take(), None);
    }

    #[test]
    fn test_at_target_requests_fastest_blink() {
        let harness = Harness::new();
        let mut monitor = harness.monitor();

        harness.publish_fix_at(48.1173, 11.5167);
        harness.target.set_latitude(48.1173);
        harness.target.set_longitude(11.5167);

        match monitor.check() {
            DistanceCheck::Measured { distance_m } => assert!(distance_m < 1.0),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(harness.control.take(), Some(PeriodCommand::Steady(20)));
    }

    #[test]
    fn test_far_from_target_requests_slow_blink() {
        let harness = Harness::new();
        let mut monitor = harness.monitor();

        harness.publish_fix_at(35.0, 139.0);
        harness.target.set_latitude(36.0);
        harness.target.set_longitude(139.0);

        match monitor.check() {
            DistanceCheck::Measured { distance_m } => {
                assert!((distance_m - 111_319.0).abs() < 1000.0)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(
            harness.control.take(),
            Some(PeriodCommand::Steady(STEADY_PERIOD_MS))
        );
    }

    #[test]
    fn test_stale_fix_counts_as_no_fix() {
        let harness = Harness::new();
        let mut monitor = harness.monitor();

        harness.publish_fix_at(48.1173, 11.5167);
        harness.position.on_epoch_tick();
        harness.position.on_epoch_tick();

        assert_eq!(monitor.check(), DistanceCheck::NoFix);
    }

    #[test]
    fn test_answers_probe() {
        let harness = Harness::new();
        let mut monitor = harness.monitor();

        monitor.answer_probe();
        assert!(harness.register.answered().is_empty());

        harness.probe.raise();
        monitor.answer_probe();
        assert!(harness.register.answered().contains(WorkerId::Distance));
        assert_eq!(harness.watchdog.with(|w| w.refresh_count()), 1);
    }
}
