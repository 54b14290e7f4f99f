//! The ordered decode gates for one assembled sentence
//!
//! `decode` either produces a fully validated fix or nothing; no error
//! is surfaced to the byte feeder and a discarded frame leaves the next
//! one unaffected.

use super::extract::{extract_coordinate, extract_date, extract_time, FIX_STATUS_VALID};
use super::frame::{fields, verify_checksum};
use super::position::{Coordinate, Fix};
use super::validate::ValidationLimits;

/// Sentence type code this pipeline understands ("recommended minimum")
const SENTENCE_TYPE: &[u8] = b"RMC";

/// Length of the talker prefix preceding the type code
const TALKER_LEN: usize = 2;

fn apply_hemisphere(coordinate: &mut Coordinate, letter: u8, negative: u8) {
    coordinate.hemisphere = letter;
    if letter == negative {
        coordinate.degrees = -coordinate.degrees;
        coordinate.decimal_degrees = -coordinate.decimal_degrees;
    }
}

/// Runs the checksum, type, extraction and validation gates in order
#[derive(Debug, Default)]
pub struct FixDecoder {
    limits: ValidationLimits,
}

impl FixDecoder {
    /// Create a decoder with the standard validation limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one sentence body (the bytes after the `$` header)
    ///
    /// Returns the accepted fix, or `None` if any gate rejects the
    /// frame: checksum mismatch, unknown sentence type, a malformed
    /// field, a non-valid status letter, or an out-of-range value.
    pub fn decode(&self, body: &[u8]) -> Option<Fix> {
        let payload = verify_checksum(body)?;

        let mut tokens = fields(payload);
        let header = tokens.next()?;
        if header.len() < TALKER_LEN + SENTENCE_TYPE.len()
            || &header[TALKER_LEN..TALKER_LEN + SENTENCE_TYPE.len()] != SENTENCE_TYPE
        {
            return None;
        }

        let time = extract_time(tokens.next()?)?;

        let status = *tokens.next()?.first()?;
        if status != FIX_STATUS_VALID {
            return None;
        }

        let mut latitude = extract_coordinate(tokens.next()?)?;
        apply_hemisphere(&mut latitude, *tokens.next()?.first()?, b'S');

        let mut longitude = extract_coordinate(tokens.next()?)?;
        apply_hemisphere(&mut longitude, *tokens.next()?.first()?, b'W');

        let _speed = tokens.next()?;
        let _track = tokens.next()?;

        let date = extract_date(tokens.next()?)?;

        let fix = Fix {
            latitude,
            longitude,
            time,
            date,
            status,
        };
        self.limits.validate(&fix).then_some(fix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::gps::frame::checksum;

    const RMC_BODY: &[u8] =
        b"GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

    /// Encode a synthetic sentence body, computing its checksum
    fn encode_rmc(
        time: &str,
        status: char,
        lat: &str,
        ns: char,
        lon: &str,
        ew: char,
        date: &str,
    ) -> std::string::String {
        let payload =
            format!("GPRMC,{time},{status},{lat},{ns},{lon},{ew},022.4,084.4,{date},003.1,W");
        format!("{payload}*{:02X}", checksum(payload.as_bytes()))
    }

    #[test]
    fn test_decode_known_sentence() {
        let fix = FixDecoder::new().decode(RMC_BODY).expect("fix accepted");

        assert_eq!(fix.latitude.hemisphere, b'N');
        assert_eq!(fix.latitude.degrees, 48);
        assert_eq!(fix.latitude.minutes, 7);
        assert!((fix.latitude.decimal_degrees - 48.1173).abs() < 1e-9);

        assert_eq!(fix.longitude.hemisphere, b'E');
        assert_eq!(fix.longitude.degrees, 11);
        assert!((fix.longitude.decimal_degrees - 11.516_666_666).abs() < 1e-6);

        assert_eq!((fix.time.hour, fix.time.minute, fix.time.second), (12, 35, 19));
        assert_eq!((fix.date.day, fix.date.month, fix.date.year), (23, 3, 1994));
        assert_eq!(fix.status, b'A');
    }

    #[test]
    fn test_round_trip_matches_literal_checksum() {
        // The helper must agree with the known-good literal sentence.
        let encoded = encode_rmc("123519", 'A', "4807.038", 'N', "01131.000", 'E', "230394");
        assert_eq!(encoded.as_bytes(), RMC_BODY);
    }

    #[test]
    fn test_round_trip_southern_western_fix() {
        let body = encode_rmc("235960", 'A', "3330.500", 'S', "07040.250", 'W', "311299");
        let fix = FixDecoder::new().decode(body.as_bytes()).expect("fix accepted");

        assert_eq!(fix.latitude.hemisphere, b'S');
        assert_eq!(fix.latitude.degrees, -33);
        assert_eq!(fix.latitude.minutes, 30);
        assert!((fix.latitude.decimal_degrees - (-(33.0 + 30.5 / 60.0))).abs() < 1e-9);

        assert_eq!(fix.longitude.hemisphere, b'W');
        assert_eq!(fix.longitude.degrees, -70);
        assert!((fix.longitude.decimal_degrees - (-(70.0 + 40.25 / 60.0))).abs() < 1e-9);

        assert_eq!((fix.date.day, fix.date.month, fix.date.year), (31, 12, 1999));
    }

    #[test]
    fn test_rejects_invalid_status_letter() {
        let body = encode_rmc("123519", 'V', "4807.038", 'N', "01131.000", 'E', "230394");
        assert!(FixDecoder::new().decode(body.as_bytes()).is_none());
    }

    #[test]
    fn test_rejects_corrupted_checksum() {
        let mut body: std::vec::Vec<u8> = RMC_BODY.to_vec();
        let last = body.len() - 1;
        body[last] = b'B';
        assert!(FixDecoder::new().decode(&body).is_none());
    }

    #[test]
    fn test_rejects_other_sentence_types() {
        let payload = "GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";
        let body = format!("{payload}*{:02X}", checksum(payload.as_bytes()));
        assert!(FixDecoder::new().decode(body.as_bytes()).is_none());
    }

    #[test]
    fn test_accepts_other_talker_prefixes() {
        let payload = "GNRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W";
        let body = format!("{payload}*{:02X}", checksum(payload.as_bytes()));
        assert!(FixDecoder::new().decode(body.as_bytes()).is_some());
    }

    #[test]
    fn test_rejects_truncated_sentence() {
        let payload = "GPRMC,123519,A,4807.038,N";
        let body = format!("{payload}*{:02X}", checksum(payload.as_bytes()));
        assert!(FixDecoder::new().decode(body.as_bytes()).is_none());
    }

    #[test]
    fn test_rejects_garbled_field() {
        let body = encode_rmc("12x519", 'A', "4807.038", 'N', "01131.000", 'E', "230394");
        assert!(FixDecoder::new().decode(body.as_bytes()).is_none());
    }

    #[test]
    fn test_latitude_edge_accepted_beyond_rejected() {
        let decoder = FixDecoder::new();

        let edge = encode_rmc("123519", 'A', "9000.000", 'N', "01131.000", 'E', "230394");
        let fix = decoder.decode(edge.as_bytes()).expect("edge accepted");
        assert_eq!(fix.latitude.degrees, 90);

        let beyond = encode_rmc("123519", 'A', "9100.000", 'N', "01131.000", 'E', "230394");
        assert!(decoder.decode(beyond.as_bytes()).is_none());
    }

    #[test]
    fn test_longitude_edge_accepted_beyond_rejected() {
        let decoder = FixDecoder::new();

        let edge = encode_rmc("123519", 'A', "4807.038", 'N', "18000.000", 'W', "230394");
        let fix = decoder.decode(edge.as_bytes()).expect("edge accepted");
        assert_eq!(fix.longitude.degrees, -180);

        let beyond = encode_rmc("123519", 'A', "4807.038", 'N', "18100.000", 'W', "230394");
        assert!(decoder.decode(beyond.as_bytes()).is_none());
    }

    #[test]
    fn test_trailing_fields_ignored() {
        // Mode and navigational-status fields after the magnetic
        // variation are not interpreted.
        let payload = "GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W,A,V";
        let body = format!("{payload}*{:02X}", checksum(payload.as_bytes()));
        assert!(FixDecoder::new().decode(body.as_bytes()).is_some());
    }
}
