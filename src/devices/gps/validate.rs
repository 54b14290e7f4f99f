//! Range validation of extracted fixes
//!
//! Every extracted field is checked against static bounds before a fix
//! becomes visible to readers. A single violation rejects the whole
//! fix.

use super::extract::FIX_STATUS_VALID;
use super::position::Fix;

/// Inclusive min/max bounds for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds<T> {
    /// Smallest accepted value
    pub min: T,
    /// Largest accepted value
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    /// Create inclusive bounds
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the bounds
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Static acceptance bounds for every fix field
#[derive(Debug, Clone, Copy)]
pub struct ValidationLimits {
    /// Hour of day
    pub hour: Bounds<u8>,
    /// Minute
    pub minute: Bounds<u8>,
    /// Second (60 admits a leap second)
    pub second: Bounds<u8>,
    /// Day of month
    pub day: Bounds<u8>,
    /// Month
    pub month: Bounds<u8>,
    /// Year
    pub year: Bounds<u16>,
    /// Latitude whole degrees (hemisphere-signed)
    pub latitude_degrees: Bounds<i16>,
    /// Longitude whole degrees (hemisphere-signed)
    pub longitude_degrees: Bounds<i16>,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            hour: Bounds::new(0, 23),
            minute: Bounds::new(0, 59),
            second: Bounds::new(0, 60),
            day: Bounds::new(1, 31),
            month: Bounds::new(1, 12),
            year: Bounds::new(1970, 2038),
            latitude_degrees: Bounds::new(-90, 90),
            longitude_degrees: Bounds::new(-180, 180),
        }
    }
}

impl ValidationLimits {
    /// Check a fully extracted fix against the bounds
    pub fn validate(&self, fix: &Fix) -> bool {
        fix.status == FIX_STATUS_VALID
            && self.hour.contains(fix.time.hour)
            && self.minute.contains(fix.time.minute)
            && self.second.contains(fix.time.second)
            && self.day.contains(fix.date.day)
            && self.month.contains(fix.date.month)
            && self.year.contains(fix.date.year)
            && self.latitude_degrees.contains(fix.latitude.degrees)
            && matches!(fix.latitude.hemisphere, b'N' | b'S')
            && self.longitude_degrees.contains(fix.longitude.degrees)
            && matches!(fix.longitude.hemisphere, b'E' | b'W')
    }
}
