//! Values attached to KDL nodes.
//!
//! This module provides the [`KdlValue`] type, which wraps a [`ValueKind`] together
//! with its optional type annotation and source span.
//!
//! ## Core Types
//!
//! - [`KdlValue`]: a value with its annotation, e.g. `(u8)10` or `"text"`
//! - [`ValueKind`]: the closed set of scalar kinds a value can hold
//! - [`Number`]: the numeric widths a literal can resolve to
//! - [`KdlNumber`]: a [`Number`] plus the literal text it was read from
//!
//! ## Usage Patterns
//!
//! ```rust
//! use kdl_doc::{KdlValue, Number};
//!
//! let text = KdlValue::from("hello");
//! let count = KdlValue::from(42);
//! let small = KdlValue::from(7u8).with_type("u8");
//!
//! assert!(text.is_string());
//! assert_eq!(count.as_i64(), Some(42));
//! assert_eq!(small.as_number(), Some(&Number::U8(7)));
//! assert_eq!(small.ty(), Some("u8"));
//! ```
//!
//! Equality is structural: two values are equal when their kinds, payloads and
//! type annotations match. Source spans and the original spelling of numbers
//! are ignored, so `0x1A` and `26` compare equal.

use crate::error::Location;
use crate::{KdlPrintOptions, Writer};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;

/// Start and end of an element in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceSpan {
    pub start: Location,
    pub end: Location,
}

impl SourceSpan {
    #[must_use]
    pub const fn new(start: Location, end: Location) -> Self {
        SourceSpan { start, end }
    }
}

/// Shape of a decimal literal, used to print floats the way they were written.
///
/// `only_zeroes` records that every digit of the mantissa was `0`, which tells a
/// genuine `0.0` apart from a literal like `1e-400` that underflowed to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NumberFormat {
    pub has_point: bool,
    pub has_exponent: bool,
    pub only_zeroes: bool,
}

/// The exact text of a number literal as it appeared in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumberLiteral {
    pub source: String,
    pub format: NumberFormat,
}

impl NumberLiteral {
    pub fn new(source: impl Into<String>, format: NumberFormat) -> Self {
        NumberLiteral {
            source: source.into(),
            format,
        }
    }

    /// Radix selected by the literal's `0b`, `0o` or `0x` prefix, 10 otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_doc::{NumberFormat, NumberLiteral};
    ///
    /// assert_eq!(NumberLiteral::new("-0x1F", NumberFormat::default()).radix(), 16);
    /// assert_eq!(NumberLiteral::new("0o17", NumberFormat::default()).radix(), 8);
    /// assert_eq!(NumberLiteral::new("1_000", NumberFormat::default()).radix(), 10);
    /// ```
    #[must_use]
    pub fn radix(&self) -> u32 {
        let unsigned = self.source.trim_start_matches(&['+', '-'][..]);
        if unsigned.starts_with("0x") {
            16
        } else if unsigned.starts_with("0o") {
            8
        } else if unsigned.starts_with("0b") {
            2
        } else {
            10
        }
    }
}

/// A numeric value at a specific width.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    BigInt(BigInt),
}

impl Number {
    /// The annotation name matching this width, e.g. `"i32"` or `"decimal"`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Number::I8(_) => "i8",
            Number::I16(_) => "i16",
            Number::I32(_) => "i32",
            Number::I64(_) => "i64",
            Number::U8(_) => "u8",
            Number::U16(_) => "u16",
            Number::U32(_) => "u32",
            Number::U64(_) => "u64",
            Number::F32(_) => "f32",
            Number::F64(_) => "f64",
            Number::Decimal(_) => "decimal",
            Number::BigInt(_) => "bigint",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Returns `true` for `f32`, `f64` and decimal values.
    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::F32(_) | Number::F64(_) | Number::Decimal(_))
    }

    /// Converts integer widths to `i64` when the value fits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_doc::Number;
    ///
    /// assert_eq!(Number::U8(200).as_i64(), Some(200));
    /// assert_eq!(Number::U64(u64::MAX).as_i64(), None);
    /// assert_eq!(Number::F64(1.0).as_i64(), None);
    /// ```
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::I8(n) => Some(i64::from(*n)),
            Number::I16(n) => Some(i64::from(*n)),
            Number::I32(n) => Some(i64::from(*n)),
            Number::I64(n) => Some(*n),
            Number::U8(n) => Some(i64::from(*n)),
            Number::U16(n) => Some(i64::from(*n)),
            Number::U32(n) => Some(i64::from(*n)),
            Number::U64(n) => i64::try_from(*n).ok(),
            Number::BigInt(n) => i64::try_from(n).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Number::U64(n) => Some(*n),
            Number::BigInt(n) => u64::try_from(n).ok(),
            other => other.as_i64().and_then(|n| u64::try_from(n).ok()),
        }
    }

    /// Converts to `f64`, possibly losing precision.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::F32(f) => f64::from(*f),
            Number::F64(f) => *f,
            // Display output of both types parses back as a float
            Number::Decimal(d) => d.to_string().parse().unwrap_or(f64::NAN),
            Number::BigInt(n) => n.to_string().parse().unwrap_or(f64::NAN),
            Number::U64(n) => *n as f64,
            other => other.as_i64().map_or(f64::NAN, |n| n as f64),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I8(n) => write!(f, "{}", n),
            Number::I16(n) => write!(f, "{}", n),
            Number::I32(n) => write!(f, "{}", n),
            Number::I64(n) => write!(f, "{}", n),
            Number::U8(n) => write!(f, "{}", n),
            Number::U16(n) => write!(f, "{}", n),
            Number::U32(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F32(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
            Number::Decimal(n) => write!(f, "{}", n),
            Number::BigInt(n) => write!(f, "{}", n),
        }
    }
}

/// A [`Number`] together with the literal it was parsed from.
///
/// Numbers built in code have no literal. Equality only looks at `value`.
#[derive(Debug, Clone)]
pub struct KdlNumber {
    pub value: Number,
    pub literal: Option<NumberLiteral>,
}

impl KdlNumber {
    #[must_use]
    pub fn new(value: Number) -> Self {
        KdlNumber {
            value,
            literal: None,
        }
    }

    #[must_use]
    pub fn with_literal(value: Number, literal: NumberLiteral) -> Self {
        KdlNumber {
            value,
            literal: Some(literal),
        }
    }

    /// Literal shape, or the default (plain, no exponent) for numbers built in code.
    #[must_use]
    pub fn format(&self) -> NumberFormat {
        self.literal.as_ref().map(|l| l.format).unwrap_or_default()
    }
}

impl PartialEq for KdlNumber {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// The payload of a [`KdlValue`].
///
/// The last six variants are only produced by type converters, e.g.
/// `(date)"2024-01-15"` or `(ipv4)"127.0.0.1"`.
#[derive(Debug, Clone)]
pub enum ValueKind {
    Null,
    Bool(bool),
    String(String),
    Number(KdlNumber),
    DateTime(DateTime<FixedOffset>),
    Time(NaiveTime),
    Date(NaiveDate),
    Ip(IpAddr),
    Regex(regex::Regex),
    Bytes(Vec<u8>),
}

impl PartialEq for ValueKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueKind::Null, ValueKind::Null) => true,
            (ValueKind::Bool(a), ValueKind::Bool(b)) => a == b,
            (ValueKind::String(a), ValueKind::String(b)) => a == b,
            (ValueKind::Number(a), ValueKind::Number(b)) => a == b,
            (ValueKind::DateTime(a), ValueKind::DateTime(b)) => a == b,
            (ValueKind::Time(a), ValueKind::Time(b)) => a == b,
            (ValueKind::Date(a), ValueKind::Date(b)) => a == b,
            (ValueKind::Ip(a), ValueKind::Ip(b)) => a == b,
            (ValueKind::Regex(a), ValueKind::Regex(b)) => a.as_str() == b.as_str(),
            (ValueKind::Bytes(a), ValueKind::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

/// A value with an optional type annotation and source span.
#[derive(Debug, Clone)]
pub struct KdlValue {
    pub kind: ValueKind,
    pub ty: Option<String>,
    pub span: Option<SourceSpan>,
}

impl PartialEq for KdlValue {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.ty == other.ty
    }
}

impl Default for KdlValue {
    fn default() -> Self {
        KdlValue::null()
    }
}

impl KdlValue {
    #[must_use]
    pub fn new(kind: ValueKind) -> Self {
        KdlValue {
            kind,
            ty: None,
            span: None,
        }
    }

    #[must_use]
    pub fn null() -> Self {
        KdlValue::new(ValueKind::Null)
    }

    /// Sets the type annotation, replacing any previous one.
    #[must_use]
    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    #[must_use]
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// The type annotation, if any.
    #[inline]
    #[must_use]
    pub fn ty(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self.kind, ValueKind::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self.kind, ValueKind::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self.kind, ValueKind::Number(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Bool(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a number, returns its width and payload.
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match &self.kind {
            ValueKind::Number(n) => Some(&n.value),
            _ => None,
        }
    }

    /// If the value is an integer that fits in `i64`, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_doc::KdlValue;
    ///
    /// assert_eq!(KdlValue::from(42).as_i64(), Some(42));
    /// assert_eq!(KdlValue::from(4.2).as_i64(), None);
    /// assert_eq!(KdlValue::from("42").as_i64(), None);
    /// ```
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().and_then(Number::as_u64)
    }

    /// If the value is any number, returns it as `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    #[must_use]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self.as_number() {
            Some(Number::BigInt(n)) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self.as_number() {
            Some(Number::Decimal(d)) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date_time(&self) -> Option<&DateTime<FixedOffset>> {
        match &self.kind {
            ValueKind::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_time(&self) -> Option<&NaiveTime> {
        match &self.kind {
            ValueKind::Time(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<&NaiveDate> {
        match &self.kind {
            ValueKind::Date(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_ip(&self) -> Option<&IpAddr> {
        match &self.kind {
            ValueKind::Ip(ip) => Some(ip),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_regex(&self) -> Option<&regex::Regex> {
        match &self.kind {
            ValueKind::Regex(re) => Some(re),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            ValueKind::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Renders this value (with its annotation) using the pretty preset.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_doc::KdlValue;
    ///
    /// assert_eq!(KdlValue::from("a\"b").to_kdl_string(), r#""a\"b""#);
    /// assert_eq!(KdlValue::from(1.5).with_type("f64").to_kdl_string(), "(f64)1.5");
    /// ```
    #[must_use]
    pub fn to_kdl_string(&self) -> String {
        self.to_kdl_string_with(&KdlPrintOptions::PRETTY)
    }

    #[must_use]
    pub fn to_kdl_string_with(&self, options: &KdlPrintOptions) -> String {
        let mut writer = Writer::new(*options);
        writer.write_value(self);
        writer.into_inner()
    }
}

impl fmt::Display for KdlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_kdl_string())
    }
}

impl Serialize for KdlValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.kind {
            ValueKind::Null => serializer.serialize_unit(),
            ValueKind::Bool(b) => serializer.serialize_bool(*b),
            ValueKind::String(s) => serializer.serialize_str(s),
            ValueKind::Number(n) => match &n.value {
                Number::I8(v) => serializer.serialize_i8(*v),
                Number::I16(v) => serializer.serialize_i16(*v),
                Number::I32(v) => serializer.serialize_i32(*v),
                Number::I64(v) => serializer.serialize_i64(*v),
                Number::U8(v) => serializer.serialize_u8(*v),
                Number::U16(v) => serializer.serialize_u16(*v),
                Number::U32(v) => serializer.serialize_u32(*v),
                Number::U64(v) => serializer.serialize_u64(*v),
                Number::F32(v) => serializer.serialize_f32(*v),
                Number::F64(v) => serializer.serialize_f64(*v),
                // Exact digits would be lost going through a binary float
                Number::Decimal(v) => serializer.serialize_str(&v.to_string()),
                Number::BigInt(v) => serializer.serialize_str(&v.to_string()),
            },
            ValueKind::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            ValueKind::Time(t) => serializer.serialize_str(&t.to_string()),
            ValueKind::Date(d) => serializer.serialize_str(&d.to_string()),
            ValueKind::Ip(ip) => serializer.serialize_str(&ip.to_string()),
            ValueKind::Regex(re) => serializer.serialize_str(re.as_str()),
            ValueKind::Bytes(b) => {
                use base64::Engine;
                serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(b))
            }
        }
    }
}

// TryFrom implementations for extracting values from KdlValue
impl TryFrom<KdlValue> for i64 {
    type Error = crate::Error;

    fn try_from(value: KdlValue) -> crate::Result<Self> {
        value.as_i64().ok_or_else(|| {
            crate::Error::custom(format!("expected an integer fitting i64, found {:?}", value.kind))
        })
    }
}

impl TryFrom<KdlValue> for f64 {
    type Error = crate::Error;

    fn try_from(value: KdlValue) -> crate::Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| crate::Error::custom(format!("expected a number, found {:?}", value.kind)))
    }
}

impl TryFrom<KdlValue> for bool {
    type Error = crate::Error;

    fn try_from(value: KdlValue) -> crate::Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| crate::Error::custom(format!("expected a boolean, found {:?}", value.kind)))
    }
}

impl TryFrom<KdlValue> for String {
    type Error = crate::Error;

    fn try_from(value: KdlValue) -> crate::Result<Self> {
        match value.kind {
            ValueKind::String(s) => Ok(s),
            other => Err(crate::Error::custom(format!(
                "expected a string, found {:?}",
                other
            ))),
        }
    }
}

impl From<ValueKind> for KdlValue {
    fn from(kind: ValueKind) -> Self {
        KdlValue::new(kind)
    }
}

impl From<Number> for KdlValue {
    fn from(value: Number) -> Self {
        KdlValue::new(ValueKind::Number(KdlNumber::new(value)))
    }
}

impl From<bool> for KdlValue {
    fn from(value: bool) -> Self {
        KdlValue::new(ValueKind::Bool(value))
    }
}

impl From<String> for KdlValue {
    fn from(value: String) -> Self {
        KdlValue::new(ValueKind::String(value))
    }
}

impl From<&str> for KdlValue {
    fn from(value: &str) -> Self {
        KdlValue::new(ValueKind::String(value.to_string()))
    }
}

macro_rules! impl_from_number {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for KdlValue {
                fn from(value: $t) -> Self {
                    KdlValue::from(Number::$variant(value))
                }
            }
        )*
    };
}

impl_from_number! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    BigInt => BigInt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_span_and_literal() {
        let parsed = KdlValue::new(ValueKind::Number(KdlNumber::with_literal(
            Number::I32(26),
            NumberLiteral::new("0x1A", NumberFormat::default()),
        )))
        .with_span(SourceSpan::default());
        assert_eq!(parsed, KdlValue::from(26));
    }

    #[test]
    fn test_equality_compares_type_and_width() {
        assert_ne!(KdlValue::from(1), KdlValue::from(1).with_type("u8"));
        assert_ne!(KdlValue::from(1i32), KdlValue::from(1i64));
        assert_ne!(KdlValue::from("1"), KdlValue::from(1));
    }

    #[test]
    fn test_regex_equality_uses_pattern() {
        let a = KdlValue::new(ValueKind::Regex(regex::Regex::new("a+").unwrap()));
        let b = KdlValue::new(ValueKind::Regex(regex::Regex::new("a+").unwrap()));
        let c = KdlValue::new(ValueKind::Regex(regex::Regex::new("b+").unwrap()));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_number_conversions() {
        assert_eq!(Number::I8(-3).as_i64(), Some(-3));
        assert_eq!(Number::I8(-3).as_u64(), None);
        assert_eq!(Number::U64(u64::MAX).as_u64(), Some(u64::MAX));
        assert_eq!(Number::F32(1.5).as_f64(), 1.5);
        assert_eq!(Number::BigInt(BigInt::from(7)).as_i64(), Some(7));
        assert!(Number::Decimal(Decimal::new(15, 1)).is_float());
        assert_eq!(Number::Decimal(Decimal::new(15, 1)).as_f64(), 1.5);
        assert_eq!(Number::U16(3).type_name(), "u16");
    }

    #[test]
    fn test_tryfrom() {
        assert_eq!(i64::try_from(KdlValue::from(42)).unwrap(), 42);
        assert!(i64::try_from(KdlValue::from("x")).is_err());
        assert_eq!(f64::try_from(KdlValue::from(2)).unwrap(), 2.0);
        assert!(bool::try_from(KdlValue::from(true)).unwrap());
        assert_eq!(
            String::try_from(KdlValue::from("hi")).unwrap(),
            "hi".to_string()
        );
        assert!(String::try_from(KdlValue::null()).is_err());
    }

    #[test]
    fn test_accessors() {
        let value = KdlValue::from(BigInt::from(10).pow(30));
        assert!(value.as_bigint().is_some());
        assert!(value.as_i64().is_none());
        assert!(KdlValue::null().is_null());
        assert_eq!(KdlValue::default(), KdlValue::null());
        assert_eq!(KdlValue::from(false).as_bool(), Some(false));
    }
}
