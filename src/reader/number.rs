//! Number literals: radix prefixes, decimal fractions and exponents, and width selection.
//!
//! The magnitude is always parsed without its sign; the sign is applied last.
//! Unannotated integers take the first of `i32`, `i64` and `BigInt` that holds
//! the signed value. A numeric type annotation forces its width exactly.

use super::ident::Sign;
use super::Parser;
use crate::error::{ErrorKind, Result};
use crate::lexical::{is_decimal_digit, is_digit_in};
use crate::value::{KdlNumber, NumberFormat, NumberLiteral};
use crate::{KdlValue, Number, ValueKind};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

/// The pieces of a number literal after scanning.
struct Scanned {
    negative: bool,
    radix: u32,
    /// Digits without sign, prefix or underscores; for radix 10 this includes
    /// the fraction and exponent, e.g. `1.5e-3`.
    body: String,
    format: NumberFormat,
    source: String,
}

impl Scanned {
    fn is_fractional(&self) -> bool {
        self.format.has_point || self.format.has_exponent
    }

    fn signed_body(&self) -> String {
        if self.negative {
            format!("-{}", self.body)
        } else {
            self.body.clone()
        }
    }
}

/// Numeric annotations that force a width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Forced {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
}

impl Forced {
    fn from_annotation(ty: &str) -> Option<Self> {
        Some(match ty {
            "u8" => Forced::U8,
            "u16" => Forced::U16,
            "u32" => Forced::U32,
            "u64" => Forced::U64,
            "i8" => Forced::I8,
            "i16" => Forced::I16,
            "i32" => Forced::I32,
            "i64" => Forced::I64,
            "f32" => Forced::F32,
            "f64" | "decimal64" => Forced::F64,
            "decimal" | "decimal128" => Forced::Decimal,
            _ => return None,
        })
    }

    fn is_integer(self) -> bool {
        !matches!(self, Forced::F32 | Forced::F64 | Forced::Decimal)
    }
}

impl Parser<'_, '_> {
    /// Reads a number literal.
    ///
    /// `sign` is set when the identifier parser already consumed a leading sign;
    /// otherwise an optional sign is read here.
    pub(crate) fn parse_number(&mut self, sign: Option<Sign>, ty: Option<&str>) -> Result<KdlValue> {
        let scanned = self.scan_number(sign)?;
        let value = self.resolve_number(&scanned, ty)?;

        let literal = NumberLiteral::new(scanned.source, scanned.format);
        let mut value = KdlValue::new(ValueKind::Number(KdlNumber::with_literal(value, literal)));
        value.ty = ty.map(str::to_string);
        Ok(value)
    }

    fn scan_number(&mut self, sign: Option<Sign>) -> Result<Scanned> {
        let mut source = String::new();

        let sign = match sign {
            Some(sign) => Some(sign),
            None => match self.peek()? {
                Some('+') => {
                    self.read()?;
                    Some(Sign::Plus)
                }
                Some('-') => {
                    self.read()?;
                    Some(Sign::Minus)
                }
                _ => None,
            },
        };
        if let Some(sign) = sign {
            source.push(sign.as_char());
        }

        let first = match self.read()? {
            Some(c) if is_decimal_digit(c) => c,
            Some(c) => {
                return self.fail(
                    ErrorKind::Lexical,
                    format!("numbers must start with a digit, found '{}'", c),
                )
            }
            None => {
                return self.fail(
                    ErrorKind::Lexical,
                    "numbers must start with a digit, found end of input",
                )
            }
        };
        source.push(first);

        let mut radix = 10;
        if first == '0' {
            radix = match self.peek()? {
                Some('b') => 2,
                Some('o') => 8,
                Some('x') => 16,
                _ => 10,
            };
            if radix != 10 {
                if let Some(marker) = self.read()? {
                    source.push(marker);
                }
            }
        }

        let negative = sign == Some(Sign::Minus);

        if radix != 10 {
            let body = self.scan_radix_digits(radix, &mut source)?;
            let format = NumberFormat {
                has_point: false,
                has_exponent: false,
                only_zeroes: body.chars().all(|c| c == '0'),
            };
            return Ok(Scanned {
                negative,
                radix,
                body,
                format,
                source,
            });
        }

        let (body, format) = self.scan_decimal(first, &mut source)?;
        Ok(Scanned {
            negative,
            radix,
            body,
            format,
            source,
        })
    }

    fn scan_radix_digits(&mut self, radix: u32, source: &mut String) -> Result<String> {
        let mut digits = String::new();
        while let Some(c) = self.peek()? {
            if c == '_' {
                if digits.is_empty() {
                    return self.fail(
                        ErrorKind::Lexical,
                        "the first digit of a number cannot be an underscore",
                    );
                }
            } else if !is_digit_in(c, radix) {
                break;
            } else {
                digits.push(c);
            }
            self.read()?;
            source.push(c);
        }

        if digits.is_empty() {
            return self.fail(
                ErrorKind::Lexical,
                format!("expected at least one base-{} digit", radix),
            );
        }
        Ok(digits)
    }

    /// Reads the rest of a decimal literal whose first digit was `first`.
    fn scan_decimal(&mut self, first: char, source: &mut String) -> Result<(String, NumberFormat)> {
        let mut body = String::new();
        body.push(first);
        let mut format = NumberFormat {
            only_zeroes: first == '0',
            ..NumberFormat::default()
        };

        self.scan_decimal_digits(&mut body, source, &mut format.only_zeroes)?;

        if self.peek()? == Some('.') {
            self.read()?;
            body.push('.');
            source.push('.');
            if !self.peek()?.map_or(false, is_decimal_digit) {
                return self.fail(
                    ErrorKind::Lexical,
                    "a decimal point must be followed by at least one digit",
                );
            }
            self.scan_decimal_digits(&mut body, source, &mut format.only_zeroes)?;
            format.has_point = true;
        }

        if let Some(e @ ('e' | 'E')) = self.peek()? {
            self.read()?;
            body.push(e);
            source.push(e);
            if let Some(s @ ('+' | '-')) = self.peek()? {
                self.read()?;
                body.push(s);
                source.push(s);
            }
            if !self.peek()?.map_or(false, is_decimal_digit) {
                return self.fail(
                    ErrorKind::Lexical,
                    "an exponent must have at least one digit",
                );
            }
            let mut exponent_zeroes = true;
            self.scan_decimal_digits(&mut body, source, &mut exponent_zeroes)?;
            format.has_exponent = true;
        }

        Ok((body, format))
    }

    fn scan_decimal_digits(
        &mut self,
        body: &mut String,
        source: &mut String,
        only_zeroes: &mut bool,
    ) -> Result<()> {
        while let Some(c) = self.peek()? {
            if is_decimal_digit(c) {
                body.push(c);
                *only_zeroes &= c == '0';
            } else if c != '_' {
                break;
            }
            self.read()?;
            source.push(c);
        }
        Ok(())
    }

    fn resolve_number(&mut self, scanned: &Scanned, ty: Option<&str>) -> Result<Number> {
        let forced = if self.options.use_type_annotations {
            ty.and_then(Forced::from_annotation)
        } else {
            None
        };

        if let Some(forced) = forced {
            trace!(literal = %scanned.source, ty = ?ty, "applying numeric annotation");
            return self.resolve_forced(scanned, forced);
        }

        if scanned.is_fractional() {
            return if self.options.prefer_single {
                self.to_f32(scanned)
            } else if self.options.prefer_decimal {
                self.to_decimal(scanned)
            } else {
                Ok(Number::F64(self.parse_f64(scanned)))
            };
        }

        self.resolve_integer(scanned)
    }

    /// `i32`, then `i64`, then `BigInt`.
    fn resolve_integer(&mut self, scanned: &Scanned) -> Result<Number> {
        if let Some(value) = self.signed_magnitude(scanned) {
            if let Ok(n) = i32::try_from(value) {
                return Ok(Number::I32(n));
            }
            if let Ok(n) = i64::try_from(value) {
                return Ok(Number::I64(n));
            }
        }

        if scanned.radix == 2 || scanned.radix == 8 {
            return self.fail(
                ErrorKind::NumericRange,
                format!(
                    "binary and octal literals beyond 64 bits are not supported: {}",
                    scanned.source
                ),
            );
        }

        match BigInt::parse_bytes(scanned.body.as_bytes(), scanned.radix) {
            Some(magnitude) => Ok(Number::BigInt(if scanned.negative {
                -magnitude
            } else {
                magnitude
            })),
            None => self.fail(
                ErrorKind::Lexical,
                format!("invalid integer literal: {}", scanned.source),
            ),
        }
    }

    /// The signed value, if its magnitude fits in `u64`.
    fn signed_magnitude(&self, scanned: &Scanned) -> Option<i128> {
        let magnitude = u64::from_str_radix(&scanned.body, scanned.radix).ok()?;
        let magnitude = i128::from(magnitude);
        Some(if scanned.negative { -magnitude } else { magnitude })
    }

    fn resolve_forced(&mut self, scanned: &Scanned, forced: Forced) -> Result<Number> {
        if forced.is_integer() {
            if scanned.is_fractional() {
                return self.fail(
                    ErrorKind::NumericRange,
                    format!("{} is not an integer", scanned.source),
                );
            }
            let value = match self.signed_magnitude(scanned) {
                Some(value) => value,
                None => return self.out_of_range(scanned, forced),
            };

            macro_rules! narrow {
                ($t:ty, $variant:ident) => {
                    match <$t>::try_from(value) {
                        Ok(n) => Ok(Number::$variant(n)),
                        Err(_) => self.out_of_range(scanned, forced),
                    }
                };
            }

            return match forced {
                Forced::U8 => narrow!(u8, U8),
                Forced::U16 => narrow!(u16, U16),
                Forced::U32 => narrow!(u32, U32),
                Forced::U64 => narrow!(u64, U64),
                Forced::I8 => narrow!(i8, I8),
                Forced::I16 => narrow!(i16, I16),
                Forced::I32 => narrow!(i32, I32),
                Forced::I64 => narrow!(i64, I64),
                Forced::F32 | Forced::F64 | Forced::Decimal => self.out_of_range(scanned, forced),
            };
        }

        if scanned.radix != 10 {
            return self.fail(
                ErrorKind::NumericRange,
                format!("floating point numbers must be base 10: {}", scanned.source),
            );
        }

        match forced {
            Forced::F32 => self.to_f32(scanned).and_then(|n| match n {
                Number::F32(f) if f.is_infinite() => self.out_of_range(scanned, forced),
                n => Ok(n),
            }),
            Forced::F64 => {
                let f = self.parse_f64(scanned);
                if f.is_infinite() {
                    self.out_of_range(scanned, forced)
                } else {
                    Ok(Number::F64(f))
                }
            }
            _ => self.to_decimal(scanned),
        }
    }

    fn out_of_range<T>(&mut self, scanned: &Scanned, forced: Forced) -> Result<T> {
        self.fail(
            ErrorKind::NumericRange,
            format!(
                "{} does not fit in {}",
                scanned.source,
                format!("{:?}", forced).to_lowercase()
            ),
        )
    }

    /// Decimal text always parses as a float; overflow gives an infinity.
    fn parse_f64(&self, scanned: &Scanned) -> f64 {
        scanned.signed_body().parse().unwrap_or(f64::NAN)
    }

    fn to_f32(&mut self, scanned: &Scanned) -> Result<Number> {
        if scanned.radix != 10 {
            return self.fail(
                ErrorKind::NumericRange,
                format!("floating point numbers must be base 10: {}", scanned.source),
            );
        }
        Ok(Number::F32(scanned.signed_body().parse().unwrap_or(f32::NAN)))
    }

    fn to_decimal(&mut self, scanned: &Scanned) -> Result<Number> {
        let text = scanned.signed_body();
        let parsed = if scanned.format.has_exponent {
            Decimal::from_scientific(&text)
        } else {
            Decimal::from_str(&text)
        };
        match parsed {
            Ok(d) => Ok(Number::Decimal(d)),
            Err(e) => self.fail(
                ErrorKind::NumericRange,
                format!("{} does not fit in a decimal: {}", scanned.source, e),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::SourceCursor;
    use crate::KdlReaderOptions;

    fn number_with(input: &str, ty: Option<&str>, options: &KdlReaderOptions) -> Result<KdlValue> {
        let mut parser = Parser::new(SourceCursor::new(input), options);
        parser.parse_number(None, ty)
    }

    fn number(input: &str) -> Number {
        number_with(input, None, &KdlReaderOptions::default())
            .unwrap()
            .as_number()
            .cloned()
            .unwrap()
    }

    fn forced(input: &str, ty: &str) -> Result<KdlValue> {
        number_with(input, Some(ty), &KdlReaderOptions::default())
    }

    #[test]
    fn test_integer_cascade() {
        assert_eq!(number("2147483647"), Number::I32(i32::MAX));
        assert_eq!(number("2147483648"), Number::I64(2_147_483_648));
        assert_eq!(number("-2147483648"), Number::I32(i32::MIN));
        assert_eq!(number("9223372036854775807"), Number::I64(i64::MAX));
        assert_eq!(
            number("99999999999999999999"),
            Number::BigInt(BigInt::parse_bytes(b"99999999999999999999", 10).unwrap())
        );
        assert_eq!(
            number("-0xFFFFFFFFFFFFFFFFFF"),
            Number::BigInt(-BigInt::parse_bytes(b"FFFFFFFFFFFFFFFFFF", 16).unwrap())
        );
    }

    #[test]
    fn test_radix() {
        assert_eq!(number("0x1A"), Number::I32(26));
        assert_eq!(number("0o17"), Number::I32(15));
        assert_eq!(number("0b1010"), Number::I32(10));
        assert_eq!(number("-0x10"), Number::I32(-16));
        assert_eq!(number("0xdead_beef"), Number::I64(0xdead_beef));
        assert_eq!(number("1_000_000"), Number::I32(1_000_000));
    }

    #[test]
    fn test_large_binary_is_range_error() {
        let input = format!("0b1{}", "0".repeat(64));
        let err = number_with(&input, None, &KdlReaderOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumericRange);
    }

    #[test]
    fn test_floats() {
        assert_eq!(number("1.5"), Number::F64(1.5));
        assert_eq!(number("-2.5e3"), Number::F64(-2500.0));
        assert_eq!(number("1E-2"), Number::F64(0.01));
        assert_eq!(number("1e400"), Number::F64(f64::INFINITY));
    }

    #[test]
    fn test_literal_is_kept() {
        let value = number_with("+0x1_F", None, &KdlReaderOptions::default()).unwrap();
        match &value.kind {
            ValueKind::Number(n) => {
                let literal = n.literal.as_ref().unwrap();
                assert_eq!(literal.source, "+0x1_F");
                assert_eq!(literal.radix(), 16);
            }
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test]
    fn test_format_flags() {
        let format = |input: &str| match number_with(input, None, &KdlReaderOptions::default())
            .unwrap()
            .kind
        {
            ValueKind::Number(n) => n.format(),
            _ => unreachable!(),
        };
        assert_eq!(
            format("0.0"),
            NumberFormat { has_point: true, has_exponent: false, only_zeroes: true }
        );
        assert_eq!(
            format("0e5"),
            NumberFormat { has_point: false, has_exponent: true, only_zeroes: true }
        );
        assert!(!format("1e-400").only_zeroes);
    }

    #[test]
    fn test_malformed() {
        let options = KdlReaderOptions::default();
        for input in ["1.", "1.e5", "1e", "1e+", "0x", "0x_1", "-", "+x"] {
            let err = number_with(input, None, &options).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Lexical, "{input}");
        }
    }

    #[test]
    fn test_forced_widths() {
        assert_eq!(forced("255", "u8").unwrap().as_number(), Some(&Number::U8(255)));
        assert_eq!(forced("-128", "i8").unwrap().as_number(), Some(&Number::I8(-128)));
        assert_eq!(forced("0xFF", "u16").unwrap().as_number(), Some(&Number::U16(255)));
        assert_eq!(forced("7", "i64").unwrap().as_number(), Some(&Number::I64(7)));
        assert_eq!(forced("3", "f64").unwrap().as_number(), Some(&Number::F64(3.0)));
        assert_eq!(forced("1.5", "f32").unwrap().as_number(), Some(&Number::F32(1.5)));
        assert_eq!(
            forced("1.25", "decimal").unwrap().as_number(),
            Some(&Number::Decimal(Decimal::new(125, 2)))
        );
        assert_eq!(forced("255", "u8").unwrap().ty(), Some("u8"));
    }

    #[test]
    fn test_forced_out_of_range() {
        for (input, ty) in [
            ("256", "u8"),
            ("-1", "u32"),
            ("128", "i8"),
            ("18446744073709551616", "u64"),
            ("1.5", "i32"),
            ("0x10", "f64"),
            ("1e39", "f32"),
            ("1e309", "f64"),
        ] {
            let err = forced(input, ty).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NumericRange, "{input} as {ty}");
        }
    }

    #[test]
    fn test_annotations_ignored_when_disabled() {
        let options = KdlReaderOptions::new().with_type_annotations(false);
        let value = number_with("300", Some("u8"), &options).unwrap();
        assert_eq!(value.as_number(), Some(&Number::I32(300)));
        assert_eq!(value.ty(), Some("u8"));
    }

    #[test]
    fn test_preferred_float_widths() {
        let single = KdlReaderOptions::new().with_prefer_single(true);
        assert_eq!(
            number_with("0.5", None, &single).unwrap().as_number(),
            Some(&Number::F32(0.5))
        );

        let decimal = KdlReaderOptions::new().with_prefer_decimal(true);
        assert_eq!(
            number_with("0.1", None, &decimal).unwrap().as_number(),
            Some(&Number::Decimal(Decimal::new(1, 1)))
        );

        let both = single.with_prefer_decimal(true);
        assert_eq!(
            number_with("0.5", None, &both).unwrap().as_number(),
            Some(&Number::F32(0.5))
        );
    }
}
