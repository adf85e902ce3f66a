//! Type converters for annotated string values.
//!
//! A converter turns the text of an annotated string, like `(ipv4)"10.0.0.1"`, into
//! a richer [`KdlValue`]. The reader looks the annotation up in
//! [`KdlReaderOptions::converters`] and, when a converter is registered, replaces the
//! plain string with whatever the converter returns.
//!
//! | Annotation  | Result                         |
//! |-------------|--------------------------------|
//! | `date-time` | [`ValueKind::DateTime`]        |
//! | `time`      | [`ValueKind::Time`]            |
//! | `date`      | [`ValueKind::Date`]            |
//! | `decimal`   | [`Number::Decimal`]            |
//! | `ipv4`      | [`ValueKind::Ip`] (v4 only)    |
//! | `ipv6`      | [`ValueKind::Ip`] (v6 only)    |
//! | `regex`     | [`ValueKind::Regex`]           |
//! | `base64`    | [`ValueKind::Bytes`]           |
//!
//! ## Examples
//!
//! ```rust
//! use kdl_doc::parse;
//!
//! let doc = parse(r#"server (ipv6)"::1" (date)"2024-01-15""#).unwrap();
//! let args = &doc.nodes[0].arguments;
//! assert!(args[0].as_ip().unwrap().is_loopback());
//! assert_eq!(args[1].as_date().unwrap().to_string(), "2024-01-15");
//! ```

use crate::error::ConvertError;
use crate::value::{KdlNumber, NumberFormat, NumberLiteral};
use crate::{KdlReaderOptions, KdlValue, Number, ValueKind};
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::RegexBuilder;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::net::IpAddr;
use std::str::FromStr;

/// Signature of a type converter: `(literal, annotation, options)`.
pub type TypeConverter =
    fn(&str, &str, &KdlReaderOptions) -> Result<KdlValue, ConvertError>;

/// The built-in converter table used by [`KdlReaderOptions::default`].
pub fn default_converters() -> HashMap<String, TypeConverter> {
    let builtins: [(&str, TypeConverter); 8] = [
        ("date-time", to_date_time),
        ("time", to_time),
        ("date", to_date),
        ("decimal", to_decimal),
        ("ipv4", to_ip_address),
        ("ipv6", to_ip_address),
        ("regex", to_regex),
        ("base64", to_base64),
    ];
    builtins
        .into_iter()
        .map(|(name, converter)| (name.to_string(), converter))
        .collect()
}

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// RFC 3339, or a date-time without offset read as UTC, or a bare date at midnight UTC.
fn parse_date_time(text: &str) -> Result<DateTime<FixedOffset>, ConvertError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt);
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| ConvertError::new(format!("'{}' is not a valid date-time", text)))
}

pub fn to_date_time(
    text: &str,
    ty: &str,
    _options: &KdlReaderOptions,
) -> Result<KdlValue, ConvertError> {
    let dt = parse_date_time(text)?;
    Ok(KdlValue::new(ValueKind::DateTime(dt)).with_type(ty))
}

pub fn to_time(text: &str, ty: &str, _options: &KdlReaderOptions) -> Result<KdlValue, ConvertError> {
    let time = NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .or_else(|_| parse_date_time(text).map(|dt| dt.time()))
        .map_err(|_| ConvertError::new(format!("'{}' is not a valid time", text)))?;
    Ok(KdlValue::new(ValueKind::Time(time)).with_type(ty))
}

pub fn to_date(text: &str, ty: &str, _options: &KdlReaderOptions) -> Result<KdlValue, ConvertError> {
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| parse_date_time(text).map(|dt| dt.date_naive()))
        .map_err(|_| ConvertError::new(format!("'{}' is not a valid date", text)))?;
    Ok(KdlValue::new(ValueKind::Date(date)).with_type(ty))
}

pub fn to_decimal(
    text: &str,
    ty: &str,
    _options: &KdlReaderOptions,
) -> Result<KdlValue, ConvertError> {
    let has_exponent = text.contains(&['e', 'E'][..]);
    let parsed = if has_exponent {
        Decimal::from_scientific(text)
    } else {
        Decimal::from_str(text)
    };
    let value = parsed.map_err(|e| ConvertError::new(format!("'{}' is not a decimal: {}", text, e)))?;

    let format = NumberFormat {
        has_point: text.contains('.'),
        has_exponent,
        only_zeroes: value.is_zero(),
    };
    let number = KdlNumber::with_literal(Number::Decimal(value), NumberLiteral::new(text, format));
    Ok(KdlValue::new(ValueKind::Number(number)).with_type(ty))
}

/// Parses either address family, then checks it against `ipv4`/`ipv6`.
pub fn to_ip_address(
    text: &str,
    ty: &str,
    _options: &KdlReaderOptions,
) -> Result<KdlValue, ConvertError> {
    let ip = IpAddr::from_str(text)
        .map_err(|_| ConvertError::new(format!("'{}' is not an IP address", text)))?;

    match (ty, ip) {
        ("ipv4", IpAddr::V6(_)) => Err(ConvertError::new(format!(
            "expected an IPv4 address but found IPv6 '{}'",
            text
        ))),
        ("ipv6", IpAddr::V4(_)) => Err(ConvertError::new(format!(
            "expected an IPv6 address but found IPv4 '{}'",
            text
        ))),
        _ => Ok(KdlValue::new(ValueKind::Ip(ip)).with_type(ty)),
    }
}

pub fn to_regex(text: &str, ty: &str, options: &KdlReaderOptions) -> Result<KdlValue, ConvertError> {
    let flags = options.regex;
    let regex = RegexBuilder::new(text)
        .case_insensitive(flags.case_insensitive)
        .multi_line(flags.multi_line)
        .dot_matches_new_line(flags.dot_matches_new_line)
        .ignore_whitespace(flags.ignore_whitespace)
        .swap_greed(flags.swap_greed)
        .unicode(flags.unicode)
        .build()
        .map_err(|e| ConvertError::new(format!("invalid regex '{}': {}", text, e)))?;
    Ok(KdlValue::new(ValueKind::Regex(regex)).with_type(ty))
}

pub fn to_base64(text: &str, ty: &str, _options: &KdlReaderOptions) -> Result<KdlValue, ConvertError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(text)
        .map_err(|e| ConvertError::new(format!("invalid base64: {}", e)))?;
    Ok(KdlValue::new(ValueKind::Bytes(bytes)).with_type(ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn opts() -> KdlReaderOptions {
        KdlReaderOptions::default()
    }

    #[test]
    fn test_date_time_forms() {
        let value = to_date_time("2024-01-15T10:30:00+02:00", "date-time", &opts()).unwrap();
        let dt = value.as_date_time().unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7200);
        assert_eq!(dt.hour(), 10);
        assert_eq!(value.ty(), Some("date-time"));

        let naive = to_date_time("2024-01-15 10:30:00.5", "date-time", &opts()).unwrap();
        assert_eq!(naive.as_date_time().unwrap().offset().local_minus_utc(), 0);

        assert!(to_date_time("yesterday", "date-time", &opts()).is_err());
    }

    #[test]
    fn test_time_and_date() {
        let time = to_time("08:15:30", "time", &opts()).unwrap();
        assert_eq!(time.as_time().unwrap().minute(), 15);
        let from_dt = to_time("2024-01-15T23:59:00Z", "time", &opts()).unwrap();
        assert_eq!(from_dt.as_time().unwrap().hour(), 23);

        let date = to_date("2024-02-29", "date", &opts()).unwrap();
        assert_eq!(date.as_date().unwrap().day(), 29);
        assert!(to_date("2023-02-29", "date", &opts()).is_err());
    }

    #[test]
    fn test_decimal_keeps_literal() {
        let value = to_decimal("1.50", "decimal", &opts()).unwrap();
        assert_eq!(value.as_decimal(), Some(&Decimal::new(150, 2)));
        let sci = to_decimal("2.5e3", "decimal", &opts()).unwrap();
        assert_eq!(sci.as_decimal(), Some(&Decimal::new(2500, 0)));
        assert!(to_decimal("abc", "decimal", &opts()).is_err());
    }

    #[test]
    fn test_ip_family_checked() {
        assert!(to_ip_address("192.168.0.1", "ipv4", &opts()).is_ok());
        assert!(to_ip_address("::1", "ipv6", &opts()).is_ok());
        let err = to_ip_address("::1", "ipv4", &opts()).unwrap_err();
        assert!(err.0.contains("IPv6"));
        assert!(to_ip_address("192.168.0.1", "ipv6", &opts()).is_err());
        assert!(to_ip_address("999.1.1.1", "ipv4", &opts()).is_err());
    }

    #[test]
    fn test_regex_flags() {
        let options = opts().with_regex_options(crate::RegexOptions::new().with_case_insensitive(true));
        let value = to_regex("^abc$", "regex", &options).unwrap();
        assert!(value.as_regex().unwrap().is_match("ABC"));
        assert!(to_regex("(", "regex", &opts()).is_err());
    }

    #[test]
    fn test_base64() {
        let value = to_base64("aGVsbG8=", "base64", &opts()).unwrap();
        assert_eq!(value.as_bytes(), Some(&b"hello"[..]));
        assert!(to_base64("not base64!", "base64", &opts()).is_err());
    }
}
