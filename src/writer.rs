//! KDL text output.
//!
//! [`Writer`] renders documents, nodes and values into a `String` under a
//! [`KdlPrintOptions`] configuration. Most callers go through
//! [`KdlDocument::to_kdl_string`](crate::KdlDocument::to_kdl_string) or the
//! crate-level [`to_string`](crate::to_string) instead.
//!
//! ## Output rules
//!
//! - Identifiers are bare when [`is_bare_identifier`] accepts them, quoted otherwise.
//! - Strings are always quoted and escaped per the `escape_*` flags.
//! - Floats keep the shape of their literal: exponent notation only if the
//!   source had an exponent, and always at least one fractional digit otherwise.
//! - Derived values (dates, addresses, regexes, bytes) are written as quoted strings.
//!
//! ## Direct usage
//!
//! ```rust
//! use kdl_doc::{KdlNode, KdlPrintOptions, KdlValue, Writer};
//!
//! let mut writer = Writer::new(KdlPrintOptions::PRETTY);
//! writer.write_node(&KdlNode::new("title").with_argument("Hello \"KDL\""));
//! assert_eq!(writer.into_inner(), "title \"Hello \\\"KDL\\\"\"");
//!
//! let value = KdlValue::from(2.0).with_type("f64");
//! assert_eq!(value.to_kdl_string(), "(f64)2.0");
//! ```

use crate::lexical::{is_bare_identifier, is_dangerous_unicode, is_newline};
use crate::value::NumberFormat;
use crate::{KdlDocument, KdlNode, KdlNumber, KdlPrintOptions, KdlValue, Number, ValueKind};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rust_decimal::Decimal;
use std::fmt::{self, Write as _};
use tracing::debug;

/// Renders KDL trees into an owned `String`.
pub struct Writer {
    output: String,
    options: KdlPrintOptions,
    indent_level: usize,
}

impl Writer {
    pub fn new(options: KdlPrintOptions) -> Self {
        Writer {
            output: String::with_capacity(256),
            options,
            indent_level: 0,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Writes every node followed by a newline. An empty document is a single newline.
    pub fn write_document(&mut self, doc: &KdlDocument) {
        debug!(nodes = doc.nodes.len(), "writing KDL document");
        if doc.nodes.is_empty() {
            self.output.push_str(self.options.newline);
            return;
        }
        for node in &doc.nodes {
            self.write_indent();
            self.write_node(node);
            self.output.push_str(self.options.newline);
        }
    }

    /// Writes a node at the current nesting level, without a trailing newline.
    pub fn write_node(&mut self, node: &KdlNode) {
        self.write_annotation(node.ty.as_deref());
        self.write_identifier(&node.name);

        for arg in &node.arguments {
            if arg.is_null() && !self.options.print_null_arguments {
                continue;
            }
            self.output.push(' ');
            self.write_value(arg);
        }

        for (key, value) in &node.properties {
            if value.is_null() && !self.options.print_null_properties {
                continue;
            }
            self.output.push(' ');
            self.write_identifier(key);
            self.output.push('=');
            self.write_value(value);
        }

        match &node.children {
            Some(children) if !children.is_empty() => {
                self.output.push_str(" {");
                self.output.push_str(self.options.newline);
                self.indent_level += 1;
                for child in &children.nodes {
                    self.write_indent();
                    self.write_node(child);
                    self.output.push_str(self.options.newline);
                }
                self.indent_level -= 1;
                self.write_indent();
                self.output.push('}');
            }
            Some(_) if self.options.print_empty_children => self.output.push_str(" {}"),
            _ => {}
        }

        if self.options.terminate_nodes_with_semicolon {
            self.output.push(';');
        }
    }

    /// Writes a value with its type annotation, if any.
    pub fn write_value(&mut self, value: &KdlValue) {
        self.write_annotation(value.ty());

        match &value.kind {
            ValueKind::Null => self.output.push_str("null"),
            ValueKind::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            ValueKind::String(s) => self.write_string(s),
            ValueKind::Number(n) => self.write_number(n),
            ValueKind::DateTime(dt) => self.write_string(&dt.to_rfc3339()),
            ValueKind::Time(t) => self.write_string(&t.to_string()),
            ValueKind::Date(d) => self.write_string(&d.to_string()),
            ValueKind::Ip(ip) => self.write_string(&ip.to_string()),
            ValueKind::Regex(re) => self.write_string(re.as_str()),
            ValueKind::Bytes(bytes) => self.write_string(&STANDARD.encode(bytes)),
        }
    }

    fn write_indent(&mut self) {
        let width = self.indent_level * self.options.indent_size;
        self.output
            .extend(std::iter::repeat(self.options.indent_char).take(width));
    }

    fn write_annotation(&mut self, ty: Option<&str>) {
        if let Some(ty) = ty {
            self.output.push('(');
            self.write_identifier(ty);
            self.output.push(')');
        }
    }

    fn write_identifier(&mut self, name: &str) {
        if is_bare_identifier(name) {
            self.output.push_str(name);
        } else {
            self.write_string(name);
        }
    }

    fn write_string(&mut self, s: &str) {
        self.output.push('"');
        for c in s.chars() {
            if self.needs_escape(c) {
                self.write_escape(c);
            } else {
                self.output.push(c);
            }
        }
        self.output.push('"');
    }

    fn needs_escape(&self, c: char) -> bool {
        let o = &self.options;
        match c {
            '"' | '\\' => true,
            c if is_newline(c) => o.escape_linespace || (o.escape_common && short_escape(c).is_some()),
            '\t' | '\u{0008}' => o.escape_common || o.escape_non_printable_ascii,
            c if c < '\u{20}' || c == '\u{7F}' => o.escape_non_printable_ascii,
            c if is_dangerous_unicode(c) => o.escape_dangerous_unicode || o.escape_non_ascii,
            c => !c.is_ascii() && o.escape_non_ascii,
        }
    }

    fn write_escape(&mut self, c: char) {
        match short_escape(c) {
            Some(short) => self.output.push_str(short),
            None => {
                let _ = write!(self.output, "\\u{{{:x}}}", c as u32);
            }
        }
    }

    fn write_number(&mut self, number: &KdlNumber) {
        let format = number.format();
        match &number.value {
            Number::F32(f) => self.write_float(*f, f.is_finite(), *f == 0.0, number),
            Number::F64(f) => self.write_float(*f, f.is_finite(), *f == 0.0, number),
            Number::Decimal(d) => self.write_decimal(d, format),
            integer => match &number.literal {
                Some(literal) if self.options.keep_radix && literal.radix() != 10 => {
                    self.output.push_str(&literal.source);
                }
                _ => {
                    let _ = write!(self.output, "{}", integer);
                }
            },
        }
    }

    fn write_float<F>(&mut self, f: F, finite: bool, zero: bool, number: &KdlNumber)
    where
        F: fmt::Display + fmt::UpperExp,
    {
        let format = number.format();

        // overflowed or underflowed literals keep their source spelling
        if let Some(literal) = &number.literal {
            if !finite || (zero && !format.only_zeroes) {
                self.output.push_str(&literal.source);
                return;
            }
        }

        if format.has_exponent && finite {
            let text = format!("{:E}", f);
            let (mantissa, exponent) = text.split_once('E').unwrap_or((text.as_str(), "0"));
            self.write_scientific(mantissa.to_string(), exponent, format.has_point);
            return;
        }

        let text = f.to_string();
        let plain = text.contains('.') || !finite;
        self.output.push_str(&text);
        if !plain {
            self.output.push_str(".0");
        }
    }

    fn write_decimal(&mut self, d: &Decimal, format: NumberFormat) {
        if !format.has_exponent {
            let text = d.to_string();
            self.output.push_str(&text);
            if !text.contains('.') {
                self.output.push_str(".0");
            }
            return;
        }

        let d = d.normalize();
        let digits = d.mantissa().unsigned_abs().to_string();
        let exponent = digits.len() as i64 - 1 - i64::from(d.scale());

        let mut mantissa = String::new();
        if d.mantissa() < 0 {
            mantissa.push('-');
        }
        mantissa.push_str(&digits[..1]);
        let fraction = digits[1..].trim_end_matches('0');
        if !fraction.is_empty() {
            mantissa.push('.');
            mantissa.push_str(fraction);
        }
        self.write_scientific(mantissa, &exponent.to_string(), format.has_point);
    }

    /// Writes `mantissa`, the exponent character and a signed exponent, e.g. `1.5E+3`.
    fn write_scientific(&mut self, mut mantissa: String, exponent: &str, has_point: bool) {
        if has_point && !mantissa.contains('.') {
            mantissa.push_str(".0");
        }
        self.output.push_str(&mantissa);
        self.output.push(self.options.exponent_char);
        if !exponent.starts_with('-') {
            self.output.push('+');
        }
        self.output.push_str(exponent);
    }
}

fn short_escape(c: char) -> Option<&'static str> {
    Some(match c {
        '"' => "\\\"",
        '\\' => "\\\\",
        '\n' => "\\n",
        '\r' => "\\r",
        '\t' => "\\t",
        '\u{0008}' => "\\b",
        '\u{000C}' => "\\f",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NumberLiteral;

    fn node(node: &KdlNode, options: KdlPrintOptions) -> String {
        let mut writer = Writer::new(options);
        writer.write_node(node);
        writer.into_inner()
    }

    fn value(value: impl Into<KdlValue>) -> String {
        value.into().to_kdl_string()
    }

    fn float(value: f64, source: &str, format: NumberFormat) -> String {
        let number = KdlNumber::with_literal(Number::F64(value), NumberLiteral::new(source, format));
        KdlValue::from(ValueKind::Number(number)).to_kdl_string()
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(node(&KdlNode::new("plain"), KdlPrintOptions::PRETTY), "plain");
        assert_eq!(node(&KdlNode::new("two words"), KdlPrintOptions::PRETTY), "\"two words\"");
        assert_eq!(node(&KdlNode::new("true"), KdlPrintOptions::PRETTY), "\"true\"");
        assert_eq!(node(&KdlNode::new("-1x"), KdlPrintOptions::PRETTY), "\"-1x\"");
        assert_eq!(node(&KdlNode::new(""), KdlPrintOptions::PRETTY), "\"\"");
        assert_eq!(
            node(&KdlNode::new("n").with_property("a key", 1), KdlPrintOptions::PRETTY),
            "n \"a key\"=1"
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(value("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(value("l1\nl2\tx\r"), r#""l1\nl2\tx\r""#);
        assert_eq!(value("\u{8}\u{c}"), r#""\b\f""#);
        assert_eq!(value("\u{1}"), r#""\u{1}""#);
        assert_eq!(value("\u{202E}"), r#""\u{202e}""#);
        assert_eq!(value("café"), "\"café\"");
    }

    #[test]
    fn test_escape_flags() {
        let options = KdlPrintOptions::PRETTY
            .with_escape_common(false)
            .with_escape_linespace(false)
            .with_escape_non_printable_ascii(false)
            .with_escape_non_ascii(true);
        let v = KdlValue::from("a\nb\té");
        assert_eq!(v.to_kdl_string_with(&options), "\"a\nb\t\\u{e9}\"");
    }

    #[test]
    fn test_integers() {
        assert_eq!(value(42), "42");
        assert_eq!(value(-7i64), "-7");
        assert_eq!(value(u64::MAX), u64::MAX.to_string());
    }

    #[test]
    fn test_floats_plain() {
        assert_eq!(value(1.0), "1.0");
        assert_eq!(value(-0.5), "-0.5");
        assert_eq!(value(1e20), "100000000000000000000.0");
        assert_eq!(value(0.1f32), "0.1");
    }

    #[test]
    fn test_floats_scientific() {
        let exp = NumberFormat {
            has_point: false,
            has_exponent: true,
            only_zeroes: false,
        };
        assert_eq!(float(1500.0, "1.5e3", exp), "1.5E+3");
        assert_eq!(float(0.001, "1e-3", exp), "1E-3");

        let exp_point = NumberFormat {
            has_point: true,
            ..exp
        };
        assert_eq!(float(100.0, "1.0e2", exp_point), "1.0E+2");
    }

    #[test]
    fn test_floats_keep_unrepresentable_source() {
        let exp = NumberFormat {
            has_point: false,
            has_exponent: true,
            only_zeroes: false,
        };
        assert_eq!(float(f64::INFINITY, "1e400", exp), "1e400");
        assert_eq!(float(0.0, "1e-400", exp), "1e-400");

        let zero = NumberFormat {
            has_point: true,
            has_exponent: false,
            only_zeroes: true,
        };
        assert_eq!(float(0.0, "0.000", zero), "0.0");
    }

    #[test]
    fn test_decimals() {
        assert_eq!(value(Decimal::new(1999, 2)), "19.99");
        assert_eq!(value(Decimal::new(5, 0)), "5.0");

        let exp = NumberFormat {
            has_point: true,
            has_exponent: true,
            only_zeroes: false,
        };
        let number = KdlNumber::with_literal(
            Number::Decimal(Decimal::new(-15000, 1)),
            NumberLiteral::new("-1.5e3", exp),
        );
        assert_eq!(KdlValue::from(ValueKind::Number(number)).to_kdl_string(), "-1.5E+3");
    }

    #[test]
    fn test_keep_radix() {
        let number = KdlNumber::with_literal(
            Number::I32(255),
            NumberLiteral::new("0xff", NumberFormat::default()),
        );
        let v = KdlValue::from(ValueKind::Number(number));
        assert_eq!(v.to_kdl_string(), "255");
        assert_eq!(
            v.to_kdl_string_with(&KdlPrintOptions::PRETTY.with_keep_radix(true)),
            "0xff"
        );
    }

    #[test]
    fn test_annotations() {
        assert_eq!(value(KdlValue::from(5).with_type("u8")), "(u8)5");
        assert_eq!(value(KdlValue::from("x").with_type("my type")), "(\"my type\")\"x\"");
        assert_eq!(
            node(&KdlNode::new("n").with_type("t"), KdlPrintOptions::PRETTY),
            "(t)n"
        );
    }

    #[test]
    fn test_derived_values() {
        let bytes = KdlValue::from(ValueKind::Bytes(b"hi".to_vec())).with_type("base64");
        assert_eq!(value(bytes), "(base64)\"aGk=\"");

        let ip = KdlValue::from(ValueKind::Ip("127.0.0.1".parse().unwrap())).with_type("ipv4");
        assert_eq!(value(ip), "(ipv4)\"127.0.0.1\"");
    }

    #[test]
    fn test_nulls() {
        let n = KdlNode::new("n")
            .with_argument(KdlValue::null())
            .with_property("p", KdlValue::null());
        assert_eq!(node(&n, KdlPrintOptions::PRETTY), "n null p=null");
        assert_eq!(
            node(&n, KdlPrintOptions::PRETTY.with_nulls(false, false)),
            "n"
        );
    }

    #[test]
    fn test_children_layout() {
        let mut parent = KdlNode::new("parent");
        parent.push_child(KdlNode::new("child").with_children(KdlDocument::new()));

        assert_eq!(
            node(&parent, KdlPrintOptions::PRETTY),
            "parent {\n    child {}\n}"
        );
        assert_eq!(node(&parent, KdlPrintOptions::RAW), "parent {\nchild\n}");
        assert_eq!(
            node(&parent, KdlPrintOptions::TESTING),
            "parent {\r\n    child\r\n}"
        );
        assert_eq!(
            node(&parent, KdlPrintOptions::RAW.with_semicolons(true)),
            "parent {\nchild;\n};"
        );
    }

    #[test]
    fn test_empty_document() {
        let mut writer = Writer::new(KdlPrintOptions::TESTING);
        writer.write_document(&KdlDocument::new());
        assert_eq!(writer.into_inner(), "\r\n");
    }
}
