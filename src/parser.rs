//! This module provides a parser for the *GPRMC* sentence of the *NMEA 0183*
//! protocol.

use arrayvec::ArrayVec;
use chrono::{NaiveDate, NaiveDateTime};
use std::str::FromStr;

use checksum;
use err::ParseError;

/// Number of comma separated fields in the dialect we consume. The receiver
/// appends one field beyond the baseline GPRMC layout; any other count is an
/// incompatible sentence revision.
pub const FIELD_COUNT: usize = 13;

const LAT_DEG_LEN: usize = 2;
const LONG_DEG_LEN: usize = 3;
const ACTIVE_STATUS: &str = "A";

/// A single position fix decoded from one valid GPRMC sentence.
///
/// Only [`parse`](fn.parse.html) constructs these, and only from sentences
/// that passed checksum validation and every field check. Never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsFix {
    /// UTC timestamp of the fix, millisecond resolution.
    pub timestamp: NaiveDateTime,
    /// Latitude in decimal degrees. Positive values are in the northern
    /// hemisphere.
    pub latitude: f64,
    /// Longitude in decimal degrees. Positive values are in the eastern
    /// hemisphere.
    pub longitude: f64,
    /// Speed over ground in knots.
    pub speed_in_knots: f64,
    /// Bearing in degrees, clockwise from true north.
    pub bearing_in_degrees: f64,
}

/// Parse one GPRMC sentence into a [`GpsFix`](struct.GpsFix.html).
///
/// Parsing is all or nothing: a checksum mismatch, a wrong field count, a
/// void status or any malformed field rejects the whole sentence.
///
/// ```
/// let fix = gprmc::parser::parse(
///     "$GPRMC,040302.663,A,3939.7,N,10506.6,W,0.27,358.86,200804,,,*33",
/// ).unwrap();
/// assert!((fix.latitude - 39.6617).abs() < 1e-4);
/// assert!((fix.longitude + 105.11).abs() < 1e-4);
/// ```
pub fn parse(sentence: &str) -> Result<GpsFix, ParseError> {
    if !checksum::is_valid(sentence) {
        return Err(ParseError::Checksum);
    }

    let count = sentence.split(',').count();
    if count != FIELD_COUNT {
        return Err(ParseError::FieldCount(count));
    }
    let fields: ArrayVec<[&str; FIELD_COUNT]> = sentence.split(',').collect();

    if fields[2] != ACTIVE_STATUS {
        return Err(ParseError::VoidFix);
    }

    let timestamp = parse_timestamp(fields[9], fields[1])?;
    let latitude = parse_coord(fields[3], LAT_DEG_LEN, "latitude", fields[4] == "S")?;
    let longitude = parse_coord(fields[5], LONG_DEG_LEN, "longitude", fields[6] == "W")?;
    let speed_in_knots = f64::from_str(fields[7])?;
    let bearing_in_degrees = f64::from_str(fields[8])?;

    Ok(GpsFix {
        timestamp,
        latitude,
        longitude,
        speed_in_knots,
        bearing_in_degrees,
    })
}

/// Combine the `DDMMYY` date field and the `HHMMSS.fff` time field into a
/// UTC timestamp.
///
/// The two digit year is always interpreted as 2000s; this receiver predates
/// any century rollover concern and the offset is a documented limitation.
/// Only the first two fractional digits of the time are consumed, as
/// hundredths of a second.
fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, ParseError> {
    if date.len() != 6 {
        return Err(ParseError::MalformedField("date"));
    }
    let day = two_digits(date, 0)?;
    let month = two_digits(date, 2)?;
    let year = 2000 + two_digits(date, 4)? as i32;

    if time.len() < 9 || time.as_bytes()[6] != b'.' {
        return Err(ParseError::MalformedField("time"));
    }
    let hour = two_digits(time, 0)?;
    let minute = two_digits(time, 2)?;
    let second = two_digits(time, 4)?;
    let milliseconds = two_digits(time, 7)? * 10;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_milli_opt(hour, minute, second, milliseconds))
        .ok_or(ParseError::InvalidTimestamp)
}

/// Parse a `DDMM.MMMM` (or `DDDMM.MMMMM`) coordinate field: the leading
/// `deg_len` bytes are whole degrees, the remainder decimal minutes.
fn parse_coord(
    coord: &str,
    deg_len: usize,
    field: &'static str,
    negate: bool,
) -> Result<f64, ParseError> {
    let (deg, min) = match (coord.get(..deg_len), coord.get(deg_len..)) {
        (Some(d), Some(m)) if !m.is_empty() => (d, m),
        _ => return Err(ParseError::MalformedField(field)),
    };
    let value = f64::from_str(deg)? + f64::from_str(min)? / 60.0;
    Ok(if negate { -value } else { value })
}

/// Parse the two ASCII digits of `s` starting at byte offset `at`.
fn two_digits(s: &str, at: usize) -> Result<u32, ParseError> {
    let digits = s
        .get(at..at + 2)
        .ok_or(ParseError::MalformedField("digit pair"))?;
    Ok(u32::from_str(digits)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SENTENCE: &str = "$GPRMC,040302.663,A,3939.7,N,10506.6,W,0.27,358.86,200804,,,*33";

    /// Rebuild a sentence body with a freshly computed checksum.
    fn with_checksum(body: &str) -> String {
        let sum = body.bytes().fold(0u8, |acc, b| acc ^ b);
        format!("${}*{:02X}", body, sum)
    }

    #[test]
    fn parses_reference_sentence() {
        let fix = parse(SENTENCE).unwrap();
        assert!((fix.latitude - (39.0 + 39.7 / 60.0)).abs() < 1e-9);
        assert!((fix.longitude + (105.0 + 6.6 / 60.0)).abs() < 1e-9);
        assert_eq!(
            fix.timestamp,
            NaiveDate::from_ymd_opt(2004, 8, 20)
                .unwrap()
                .and_hms_milli_opt(4, 3, 2, 660)
                .unwrap()
        );
        assert_eq!(fix.speed_in_knots, 0.27);
        assert_eq!(fix.bearing_in_degrees, 358.86);
    }

    #[test]
    fn rejects_bad_checksum() {
        let tampered = SENTENCE.replace("*33", "*34");
        assert_matches!(parse(&tampered), Err(ParseError::Checksum));
    }

    #[test]
    fn rejects_void_status_despite_good_checksum() {
        let void = with_checksum("GPRMC,040302.663,V,3939.7,N,10506.6,W,0.27,358.86,200804,,,");
        assert_matches!(parse(&void), Err(ParseError::VoidFix));
    }

    #[test]
    fn rejects_twelve_fields() {
        let short = with_checksum("GPRMC,040302.663,A,3939.7,N,10506.6,W,0.27,358.86,200804,,");
        assert_matches!(parse(&short), Err(ParseError::FieldCount(12)));
    }

    #[test]
    fn rejects_fourteen_fields() {
        let long = with_checksum("GPRMC,040302.663,A,3939.7,N,10506.6,W,0.27,358.86,200804,,,,");
        assert_matches!(parse(&long), Err(ParseError::FieldCount(14)));
    }

    #[test]
    fn southern_and_eastern_hemispheres() {
        let fix = parse(&with_checksum(
            "GPRMC,040302.663,A,3939.7,S,10506.6,E,0.27,358.86,200804,,,",
        )).unwrap();
        assert!(fix.latitude < 0.0);
        assert!(fix.longitude > 0.0);
    }

    #[test]
    fn rejects_short_date() {
        let bad = with_checksum("GPRMC,040302.663,A,3939.7,N,10506.6,W,0.27,358.86,2008,,,");
        assert_matches!(parse(&bad), Err(ParseError::MalformedField("date")));
    }

    #[test]
    fn rejects_out_of_range_calendar_values() {
        // Month 13.
        let bad = with_checksum("GPRMC,040302.663,A,3939.7,N,10506.6,W,0.27,358.86,201304,,,");
        assert_matches!(parse(&bad), Err(ParseError::InvalidTimestamp));
    }

    #[test]
    fn rejects_non_digit_time() {
        let bad = with_checksum("GPRMC,04x302.663,A,3939.7,N,10506.6,W,0.27,358.86,200804,,,");
        assert_matches!(parse(&bad), Err(ParseError::Int(_)));
    }

    #[test]
    fn rejects_truncated_time() {
        let bad = with_checksum("GPRMC,0403.663,A,3939.7,N,10506.6,W,0.27,358.86,200804,,,");
        assert_matches!(parse(&bad), Err(ParseError::MalformedField("time")));
    }

    #[test]
    fn rejects_degrees_only_coordinate() {
        let bad = with_checksum("GPRMC,040302.663,A,39,N,10506.6,W,0.27,358.86,200804,,,");
        assert_matches!(parse(&bad), Err(ParseError::MalformedField("latitude")));
    }

    #[test]
    fn rejects_non_numeric_speed() {
        let bad = with_checksum("GPRMC,040302.663,A,3939.7,N,10506.6,W,fast,358.86,200804,,,");
        assert_matches!(parse(&bad), Err(ParseError::Float(_)));
    }

    #[test]
    fn only_first_two_fractional_digits_are_used() {
        let fix = parse(&with_checksum(
            "GPRMC,040302.669,A,3939.7,N,10506.6,W,0.27,358.86,200804,,,",
        )).unwrap();
        // The trailing 9 is ignored; .66 becomes 660 milliseconds.
        assert_eq!(
            fix.timestamp,
            NaiveDate::from_ymd_opt(2004, 8, 20)
                .unwrap()
                .and_hms_milli_opt(4, 3, 2, 660)
                .unwrap()
        );
    }
}
