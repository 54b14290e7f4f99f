//! Fix data model and the published position shared with readers
//!
//! The pipeline is the only writer of the published position; the
//! distance task and console read it. Readers may observe an update
//! mid-tick but never a half-written fix: the whole record is replaced
//! inside one critical section, coordinates before the validity flag.

use core::cell::UnsafeCell;

/// One geographic coordinate as carried by an RMC sentence
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coordinate {
    /// Hemisphere letter (`N`/`S` or `E`/`W`)
    pub hemisphere: u8,
    /// Whole degrees, negated for southern/western hemispheres
    pub degrees: i16,
    /// Whole minutes
    pub minutes: u8,
    /// Decimal degrees, negated for southern/western hemispheres
    pub decimal_degrees: f64,
}

/// UTC time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtcTime {
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-60, leap second included)
    pub second: u8,
}

/// UTC calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtcDate {
    /// Day of month (1-31)
    pub day: u8,
    /// Month (1-12)
    pub month: u8,
    /// Full year (sentence carries two digits, normalized by adding 2000)
    pub year: u16,
}

/// One accepted satellite position/time sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fix {
    /// Latitude
    pub latitude: Coordinate,
    /// Longitude
    pub longitude: Coordinate,
    /// UTC time of the fix
    pub time: UtcTime,
    /// UTC date of the fix
    pub date: UtcDate,
    /// Receiver status letter (`A` for a valid fix)
    pub status: u8,
}

/// Snapshot of the published position
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PublishedPosition {
    /// Last accepted fix (last-known coordinates are retained while stale)
    pub fix: Fix,
    /// Epoch pulses since the fix was accepted
    pub age: u32,
    /// Whether a fix has been published and is still fresh
    pub valid: bool,
}

impl PublishedPosition {
    /// Whether this snapshot holds a fresh fix (published and age <= 1)
    pub fn is_valid(&self) -> bool {
        self.valid && self.age <= 1
    }
}

const fn empty_position() -> PublishedPosition {
    PublishedPosition {
        fix: Fix {
            latitude: Coordinate {
                hemisphere: 0,
                degrees: 0,
                minutes: 0,
                decimal_degrees: 0.0,
            },
            longitude: Coordinate {
                hemisphere: 0,
                degrees: 0,
                minutes: 0,
                decimal_degrees: 0.0,
            },
            time: UtcTime {
                hour: 0,
                minute: 0,
                second: 0,
            },
            date: UtcDate {
                day: 0,
                month: 0,
                year: 0,
            },
            status: 0,
        },
        age: 0,
        valid: false,
    }
}

/// Single-writer/multi-reader published position
///
/// The decode pipeline publishes accepted fixes; an external ~1 Hz epoch
/// pulse ages them. `age > 1` means the position is stale: readers see
/// `is_valid() == false` while the last-known coordinates stay
/// available.
pub struct SharedPositionState {
    inner: UnsafeCell<PublishedPosition>,
}

// Safety: all access goes through critical sections in the methods below,
// which is sound in interrupt-adjacent contexts on a single address space.
unsafe impl Sync for SharedPositionState {}
unsafe impl Send for SharedPositionState {}

impl SharedPositionState {
    /// Create with no published fix; `is_valid()` is `false` until the
    /// first fix is accepted
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(empty_position()),
        }
    }

    /// Publish an accepted fix, resetting its age
    ///
    /// The update is atomic with respect to readers; the coordinate
    /// fields are written before the validity flag.
    pub fn publish(&self, fix: Fix) {
        critical_section::with(|_cs| unsafe {
            let record = &mut *self.inner.get();
            record.fix = fix;
            record.age = 0;
            record.valid = true;
        });
    }

    /// Age the fix by one epoch pulse
    pub fn on_epoch_tick(&self) {
        critical_section::with(|_cs| unsafe {
            let record = &mut *self.inner.get();
            record.age += 1;
            if record.age > 1 {
                record.valid = false;
            }
        });
    }

    /// Age the fix when the epoch pulse source itself went silent
    pub fn on_epoch_missed(&self) {
        crate::log_warn!("epoch pulse missed, aging last fix");
        self.on_epoch_tick();
    }

    /// Full snapshot of the published position
    pub fn snapshot(&self) -> PublishedPosition {
        critical_section::with(|_cs| unsafe { *self.inner.get() })
    }

    /// Whether a fix has been published and is still fresh (age <= 1)
    pub fn is_valid(&self) -> bool {
        critical_section::with(|_cs| unsafe {
            let record = &*self.inner.get();
            record.valid && record.age <= 1
        })
    }

    /// Epoch pulses since the last accepted fix
    pub fn age(&self) -> u32 {
        critical_section::with(|_cs| unsafe { (*self.inner.get()).age })
    }
}

impl Default for SharedPositionState {
    fn default() -> Self {
        Self::new()
    }
}
