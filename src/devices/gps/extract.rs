//! Typed extraction of RMC sentence fields
//!
//! Fields are fixed-width ASCII with no separators, decoded
//! digit-by-digit. Any unexpected byte makes the extractor return
//! `None`, which discards the whole frame upstream.

use super::position::{Coordinate, UtcDate, UtcTime};

/// Receiver status letter marking a valid fix
pub const FIX_STATUS_VALID: u8 = b'A';

fn digit(byte: u8) -> Option<u8> {
    byte.is_ascii_digit().then(|| byte - b'0')
}

fn two_digits(field: &[u8], at: usize) -> Option<u8> {
    Some(digit(*field.get(at)?)? * 10 + digit(*field.get(at + 1)?)?)
}

/// Extract `HHMMSS` from a time field
///
/// Trailing fractional seconds (`.ss`) some receivers append are
/// ignored.
pub fn extract_time(field: &[u8]) -> Option<UtcTime> {
    Some(UtcTime {
        hour: two_digits(field, 0)?,
        minute: two_digits(field, 2)?,
        second: two_digits(field, 4)?,
    })
}

/// Extract `DDMMYY` from a date field
///
/// The two-digit year is normalized over the GPS epoch window: 70-99
/// map to 19YY, 00-69 to 20YY, keeping every representable date inside
/// the validator's 1970-2038 range.
pub fn extract_date(field: &[u8]) -> Option<UtcDate> {
    let yy = two_digits(field, 4)? as u16;
    Some(UtcDate {
        day: two_digits(field, 0)?,
        month: two_digits(field, 2)?,
        year: if yy >= 70 { 1900 + yy } else { 2000 + yy },
    })
}

/// Extract a coordinate from a `ddmm.mmmm` / `dddmm.mmmm` field
///
/// The decimal point at byte 5 is the field-width cue for the
/// 3-digit-degree (longitude) layout. Fractional minutes are
/// accumulated digit-by-digit with a power-of-ten scale, so precision
/// is limited to the digits actually present:
/// `decimal_degrees = degrees + (minutes + fraction / scale) / 60`.
///
/// The hemisphere letter lives in the following field; the caller
/// applies it.
pub fn extract_coordinate(field: &[u8]) -> Option<Coordinate> {
    let three_degree_digits = field.get(5) == Some(&b'.');
    let (degrees, point) = if three_degree_digits {
        let hundreds = digit(*field.first()?)? as i16;
        (hundreds * 100 + two_digits(field, 1)? as i16, 5)
    } else {
        (two_digits(field, 0)? as i16, 4)
    };
    let minutes = two_digits(field, point - 2)?;

    let mut fraction: u32 = 0;
    let mut scale: u32 = 1;
    if field.len() > point {
        if field[point] != b'.' {
            return None;
        }
        for &byte in &field[point + 1..] {
            if scale >= 1_000_000_000 {
                return None;
            }
            fraction = fraction * 10 + digit(byte)? as u32;
            scale *= 10;
        }
    }

    let minutes_total = minutes as f64 + fraction as f64 / scale as f64;
    Some(Coordinate {
        hemisphere: 0,
        degrees,
        minutes,
        decimal_degrees: degrees as f64 + minutes_total / 60.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_time() {
        let time = extract_time(b"123519").unwrap();
        assert_eq!((time.hour, time.minute, time.second), (12, 35, 19));
    }

    #[test]
    fn test_extract_time_ignores_fractional_seconds() {
        let time = extract_time(b"123519.00").unwrap();
        assert_eq!((time.hour, time.minute, time.second), (12, 35, 19));
    }

    #[test]
    fn test_extract_time_rejects_short_or_garbled() {
        assert!(extract_time(b"1235").is_none());
        assert!(extract_time(b"12x519").is_none());
        assert!(extract_time(b"").is_none());
    }

    #[test]
    fn test_extract_date_windows_year() {
        let date = extract_date(b"230394").unwrap();
        assert_eq!((date.day, date.month, date.year), (23, 3, 1994));

        let date = extract_date(b"010170").unwrap();
        assert_eq!(date.year, 1970);

        let date = extract_date(b"050625").unwrap();
        assert_eq!(date.year, 2025);
    }

    #[test]
    fn test_extract_date_rejects_garbled() {
        assert!(extract_date(b"23039").is_none());
        assert!(extract_date(b"23-394").is_none());
    }

    #[test]
    fn test_extract_latitude_two_digit_degrees() {
        let coord = extract_coordinate(b"4807.038").unwrap();
        assert_eq!(coord.degrees, 48);
        assert_eq!(coord.minutes, 7);
        assert!((coord.decimal_degrees - 48.1173).abs() < 1e-9);
    }

    #[test]
    fn test_extract_longitude_three_digit_degrees() {
        let coord = extract_coordinate(b"01131.000").unwrap();
        assert_eq!(coord.degrees, 11);
        assert_eq!(coord.minutes, 31);
        assert!((coord.decimal_degrees - 11.516_666_666).abs() < 1e-6);
    }

    #[test]
    fn test_extract_coordinate_without_fraction() {
        let coord = extract_coordinate(b"9000").unwrap();
        assert_eq!(coord.degrees, 90);
        assert_eq!(coord.minutes, 0);
        assert!((coord.decimal_degrees - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_extract_coordinate_precision_follows_digits() {
        let short = extract_coordinate(b"4807.0").unwrap();
        let long = extract_coordinate(b"4807.0380").unwrap();
        assert!((short.decimal_degrees - (48.0 + 7.0 / 60.0)).abs() < 1e-9);
        assert!((long.decimal_degrees - 48.1173).abs() < 1e-9);
    }

    #[test]
    fn test_extract_coordinate_rejects_garbled() {
        assert!(extract_coordinate(b"").is_none());
        assert!(extract_coordinate(b"48o7.038").is_none());
        assert!(extract_coordinate(b"4807x038").is_none());
        assert!(extract_coordinate(b"4807.03x").is_none());
    }
}
