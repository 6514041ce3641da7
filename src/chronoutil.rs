use std::str::FromStr;

use chrono::format::{ParseError, ParseResult};
use chrono::naive::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono::offset::FixedOffset;
use chrono::{DateTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// ISO 8601 timestamp format, accepting both the extended and the basic ("compact") forms.
    static ref ISO_8601_REGEX: Regex = Regex::new(
        r"(?x)^
        (?P<year>\d{4})-?
        (?P<month>0[1-9]|1[0-2])-?
        (?P<day>0[1-9]|[12][0-9]|3[01])
        T
        (?P<hour>[01][0-9]|2[0-3]):?
        (?P<minute>[0-5][0-9]):?
        (?P<second>[0-5][0-9]|6[0-1])
        (?P<offset>[-+][01][0-9]:?[0-5][0-9]|Z)$").unwrap();

    static ref INVALID: ParseError = DateTime::<FixedOffset>::from_str("").unwrap_err();
}

/// Parse a timestamp from the subset of ISO 8601 formats AWS services emit, most notably the
/// `YYYYMMDD'T'HHMMSS'Z'` basic format carried in `X-Amz-Date` headers.
pub trait ParseISO8601<T> {
    /// Parse the string, returning a chrono [ParseError] if it does not match.
    fn parse_from_iso8601(s: &str) -> ParseResult<T>;
}

impl ParseISO8601<DateTime<FixedOffset>> for DateTime<FixedOffset> {
    fn parse_from_iso8601(s: &str) -> ParseResult<DateTime<FixedOffset>> {
        let cap = match ISO_8601_REGEX.captures(s) {
            Some(cap) => cap,
            None => return Err(*INVALID),
        };

        // The regex guarantees each component is present and numeric.
        let year = i32::from_str(cap.name("year").unwrap().as_str()).unwrap();
        let month = u32::from_str(cap.name("month").unwrap().as_str()).unwrap();
        let day = u32::from_str(cap.name("day").unwrap().as_str()).unwrap();
        let naive_date = NaiveDate::from_ymd_opt(year, month, day).ok_or(*INVALID)?;

        let hour = u32::from_str(cap.name("hour").unwrap().as_str()).unwrap();
        let minute = u32::from_str(cap.name("minute").unwrap().as_str()).unwrap();
        let second = u32::from_str(cap.name("second").unwrap().as_str()).unwrap();
        let naive_time = NaiveTime::from_hms_opt(hour, minute, second).ok_or(*INVALID)?;
        let naive_dt = NaiveDateTime::new(naive_date, naive_time);

        let offset_str = cap.name("offset").unwrap().as_str();
        let offset_secs = if offset_str == "Z" {
            0
        } else {
            let offset_condensed = offset_str.replace(':', "");
            // Must be [+-]HHMM at this point.
            assert_eq!(offset_condensed.len(), 5);
            let (sign_str, hm) = offset_condensed.split_at(1);
            let (hour_off_str, minute_off_str) = hm.split_at(2);

            let sign = if sign_str == "-" {
                -1
            } else {
                1
            };

            let hour = i32::from_str(hour_off_str).unwrap();
            let min = i32::from_str(minute_off_str).unwrap();
            sign * (hour * 3600 + min * 60)
        };

        let offset = FixedOffset::east_opt(offset_secs).ok_or(*INVALID)?;
        offset.from_local_datetime(&naive_dt).single().ok_or(*INVALID)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::ParseISO8601,
        chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc},
    };

    #[test_log::test]
    fn test_compact_format() {
        let ts = DateTime::<FixedOffset>::parse_from_iso8601("20150830T123600Z").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2015, 8, 30));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (12, 36, 0));
        assert_eq!(ts.offset().local_minus_utc(), 0);
    }

    #[test_log::test]
    fn test_extended_format_with_offset() {
        let ts = DateTime::<FixedOffset>::parse_from_iso8601("2015-08-30T12:36:00-07:00").unwrap();
        let utc = ts.with_timezone(&Utc);
        assert_eq!((utc.hour(), utc.minute()), (19, 36));
    }

    #[test_log::test]
    fn test_rejects_garbage() {
        assert!(DateTime::<FixedOffset>::parse_from_iso8601("20150830").is_err());
        assert!(DateTime::<FixedOffset>::parse_from_iso8601("20151330T123600Z").is_err());
        assert!(DateTime::<FixedOffset>::parse_from_iso8601("yesterday").is_err());
    }
}
