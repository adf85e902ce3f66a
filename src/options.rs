//! Configuration options for reading and writing KDL.
//!
//! This module provides the types that customize both directions:
//!
//! - [`KdlPrintOptions`]: escaping, indentation, number and node formatting for the writer
//! - [`KdlReaderOptions`]: type converters and float precision for the reader
//! - [`RegexOptions`]: flags handed to the `regex` converter
//!
//! ## Examples
//!
//! ```rust
//! use kdl_doc::{parse, KdlPrintOptions};
//!
//! let doc = parse("node 0x1A").unwrap();
//!
//! // Keep the original radix of number literals
//! let options = KdlPrintOptions::PRETTY.with_keep_radix(true);
//! assert_eq!(doc.to_kdl_string_with(&options), "node 0x1A\n");
//!
//! // Terminate every node with a semicolon
//! let options = KdlPrintOptions::new().with_semicolons(true);
//! assert_eq!(doc.to_kdl_string_with(&options), "node 26;\n");
//! ```

use crate::convert::{default_converters, TypeConverter};
use std::collections::HashMap;
use std::fmt;

/// Formatting options for the writer.
///
/// Three presets cover the common cases:
///
/// - [`KdlPrintOptions::PRETTY`]: four-space indentation and permissive defaults
/// - [`KdlPrintOptions::RAW`]: no indentation, empty children blocks omitted
/// - [`KdlPrintOptions::TESTING`]: CRLF newlines, empty children blocks omitted
///
/// Presets are plain constants; customize a copy with the `with_*` builders.
///
/// # Examples
///
/// ```rust
/// use kdl_doc::KdlPrintOptions;
///
/// let options = KdlPrintOptions::PRETTY.with_indent('\t', 1).with_newline("\r\n");
/// assert_eq!(options.indent_char, '\t');
/// assert_eq!(options.newline, "\r\n");
/// assert_eq!(KdlPrintOptions::RAW.indent_size, 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KdlPrintOptions {
    /// Escape `\`, `"`, CR, LF, tab, backspace and form feed with their short forms.
    pub escape_common: bool,
    /// Escape every newline character.
    pub escape_linespace: bool,
    /// Escape characters above U+007F as `\u{..}`.
    pub escape_non_ascii: bool,
    /// Escape control characters below U+0020.
    pub escape_non_printable_ascii: bool,
    /// Escape bidirectional control characters.
    pub escape_dangerous_unicode: bool,
    pub exponent_char: char,
    pub indent_char: char,
    /// Number of `indent_char` per nesting level.
    pub indent_size: usize,
    /// Print integers with their original `0x`/`0o`/`0b` spelling.
    pub keep_radix: bool,
    pub newline: &'static str,
    pub print_null_arguments: bool,
    pub print_null_properties: bool,
    /// Print `{}` for nodes that have an empty children block.
    pub print_empty_children: bool,
    pub terminate_nodes_with_semicolon: bool,
}

impl KdlPrintOptions {
    pub const PRETTY: KdlPrintOptions = KdlPrintOptions {
        escape_common: true,
        escape_linespace: true,
        escape_non_ascii: false,
        escape_non_printable_ascii: true,
        escape_dangerous_unicode: true,
        exponent_char: 'E',
        indent_char: ' ',
        indent_size: 4,
        keep_radix: false,
        newline: "\n",
        print_null_arguments: true,
        print_null_properties: true,
        print_empty_children: true,
        terminate_nodes_with_semicolon: false,
    };

    pub const RAW: KdlPrintOptions = KdlPrintOptions {
        indent_size: 0,
        print_empty_children: false,
        ..KdlPrintOptions::PRETTY
    };

    pub const TESTING: KdlPrintOptions = KdlPrintOptions {
        newline: "\r\n",
        print_empty_children: false,
        ..KdlPrintOptions::PRETTY
    };

    /// Creates the default options, identical to [`KdlPrintOptions::PRETTY`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation character and how many of them make one level.
    #[must_use]
    pub fn with_indent(mut self, indent_char: char, indent_size: usize) -> Self {
        self.indent_char = indent_char;
        self.indent_size = indent_size;
        self
    }

    #[must_use]
    pub fn with_newline(mut self, newline: &'static str) -> Self {
        self.newline = newline;
        self
    }

    /// Sets the character between mantissa and exponent, usually `E` or `e`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_doc::{parse, KdlPrintOptions};
    ///
    /// let doc = parse("node 1.5e3").unwrap();
    /// let options = KdlPrintOptions::new().with_exponent_char('e');
    /// assert_eq!(doc.to_kdl_string_with(&options), "node 1.5e+3\n");
    /// ```
    #[must_use]
    pub fn with_exponent_char(mut self, exponent_char: char) -> Self {
        self.exponent_char = exponent_char;
        self
    }

    #[must_use]
    pub fn with_keep_radix(mut self, keep_radix: bool) -> Self {
        self.keep_radix = keep_radix;
        self
    }

    #[must_use]
    pub fn with_semicolons(mut self, terminate: bool) -> Self {
        self.terminate_nodes_with_semicolon = terminate;
        self
    }

    #[must_use]
    pub fn with_empty_children(mut self, print: bool) -> Self {
        self.print_empty_children = print;
        self
    }

    /// Sets whether null arguments and null properties are printed.
    #[must_use]
    pub fn with_nulls(mut self, arguments: bool, properties: bool) -> Self {
        self.print_null_arguments = arguments;
        self.print_null_properties = properties;
        self
    }

    #[must_use]
    pub fn with_escape_common(mut self, escape: bool) -> Self {
        self.escape_common = escape;
        self
    }

    #[must_use]
    pub fn with_escape_linespace(mut self, escape: bool) -> Self {
        self.escape_linespace = escape;
        self
    }

    #[must_use]
    pub fn with_escape_non_ascii(mut self, escape: bool) -> Self {
        self.escape_non_ascii = escape;
        self
    }

    #[must_use]
    pub fn with_escape_non_printable_ascii(mut self, escape: bool) -> Self {
        self.escape_non_printable_ascii = escape;
        self
    }

    #[must_use]
    pub fn with_escape_dangerous_unicode(mut self, escape: bool) -> Self {
        self.escape_dangerous_unicode = escape;
        self
    }
}

impl Default for KdlPrintOptions {
    fn default() -> Self {
        KdlPrintOptions::PRETTY
    }
}

/// Flags for patterns built by the `regex` converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegexOptions {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
    pub ignore_whitespace: bool,
    pub swap_greed: bool,
    pub unicode: bool,
}

impl Default for RegexOptions {
    fn default() -> Self {
        RegexOptions {
            case_insensitive: false,
            multi_line: false,
            dot_matches_new_line: false,
            ignore_whitespace: false,
            swap_greed: false,
            unicode: true,
        }
    }
}

impl RegexOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    #[must_use]
    pub fn with_multi_line(mut self, yes: bool) -> Self {
        self.multi_line = yes;
        self
    }

    #[must_use]
    pub fn with_dot_matches_new_line(mut self, yes: bool) -> Self {
        self.dot_matches_new_line = yes;
        self
    }

    #[must_use]
    pub fn with_ignore_whitespace(mut self, yes: bool) -> Self {
        self.ignore_whitespace = yes;
        self
    }

    #[must_use]
    pub fn with_swap_greed(mut self, yes: bool) -> Self {
        self.swap_greed = yes;
        self
    }

    #[must_use]
    pub fn with_unicode(mut self, yes: bool) -> Self {
        self.unicode = yes;
        self
    }
}

/// Options controlling how the reader turns literals into values.
///
/// The default options register the built-in converters for `date-time`, `time`,
/// `date`, `decimal`, `ipv4`, `ipv6`, `regex` and `base64`.
///
/// # Examples
///
/// ```rust
/// use kdl_doc::{parse_with_options, KdlReaderOptions, Number};
///
/// let options = KdlReaderOptions::new().with_prefer_single(true);
/// let doc = parse_with_options("node 1.5", &options).unwrap();
/// assert_eq!(doc.nodes[0].arguments[0].as_number(), Some(&Number::F32(1.5)));
///
/// // Turn off converters and numeric overrides altogether
/// let options = KdlReaderOptions::new().with_type_annotations(false);
/// let doc = parse_with_options("node (ipv4)\"10.0.0.1\"", &options).unwrap();
/// assert_eq!(doc.nodes[0].arguments[0].as_str(), Some("10.0.0.1"));
/// ```
#[derive(Clone)]
pub struct KdlReaderOptions {
    pub converters: HashMap<String, TypeConverter>,
    /// When unset, converters and numeric width annotations are ignored.
    pub use_type_annotations: bool,
    /// Read unannotated floats as `f32`.
    pub prefer_single: bool,
    /// Read unannotated floats as decimals. `prefer_single` takes precedence.
    pub prefer_decimal: bool,
    pub regex: RegexOptions,
}

impl Default for KdlReaderOptions {
    fn default() -> Self {
        KdlReaderOptions {
            converters: default_converters(),
            use_type_annotations: true,
            prefer_single: false,
            prefer_decimal: false,
            regex: RegexOptions::default(),
        }
    }
}

impl fmt::Debug for KdlReaderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("KdlReaderOptions")
            .field("converters", &names)
            .field("use_type_annotations", &self.use_type_annotations)
            .field("prefer_single", &self.prefer_single)
            .field("prefer_decimal", &self.prefer_decimal)
            .field("regex", &self.regex)
            .finish()
    }
}

impl KdlReaderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a converter for an annotation, replacing any existing one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_doc::{parse_with_options, ConvertError, KdlReaderOptions, KdlValue};
    ///
    /// fn shout(text: &str, _ty: &str, _opts: &KdlReaderOptions) -> Result<KdlValue, ConvertError> {
    ///     Ok(KdlValue::from(text.to_uppercase()))
    /// }
    ///
    /// let options = KdlReaderOptions::new().with_converter("shout", shout);
    /// let doc = parse_with_options("node (shout)\"hey\"", &options).unwrap();
    /// assert_eq!(doc.nodes[0].arguments[0].as_str(), Some("HEY"));
    /// ```
    #[must_use]
    pub fn with_converter(mut self, name: impl Into<String>, converter: TypeConverter) -> Self {
        self.converters.insert(name.into(), converter);
        self
    }

    /// Removes every registered converter, including the built-in ones.
    #[must_use]
    pub fn without_converters(mut self) -> Self {
        self.converters.clear();
        self
    }

    #[must_use]
    pub fn with_type_annotations(mut self, enabled: bool) -> Self {
        self.use_type_annotations = enabled;
        self
    }

    #[must_use]
    pub fn with_prefer_single(mut self, prefer: bool) -> Self {
        self.prefer_single = prefer;
        self
    }

    #[must_use]
    pub fn with_prefer_decimal(mut self, prefer: bool) -> Self {
        self.prefer_decimal = prefer;
        self
    }

    #[must_use]
    pub fn with_regex_options(mut self, regex: RegexOptions) -> Self {
        self.regex = regex;
        self
    }

    /// The converter registered for `ty`, if annotations are enabled.
    #[must_use]
    pub fn converter(&self, ty: &str) -> Option<TypeConverter> {
        if !self.use_type_annotations {
            return None;
        }
        self.converters.get(ty).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(KdlPrintOptions::default(), KdlPrintOptions::PRETTY);
        assert_eq!(KdlPrintOptions::PRETTY.indent_size, 4);
        assert_eq!(KdlPrintOptions::PRETTY.exponent_char, 'E');
        assert!(KdlPrintOptions::PRETTY.print_empty_children);
        assert!(!KdlPrintOptions::RAW.print_empty_children);
        assert_eq!(KdlPrintOptions::RAW.newline, "\n");
        assert_eq!(KdlPrintOptions::TESTING.newline, "\r\n");
        assert_eq!(KdlPrintOptions::TESTING.indent_size, 4);
        assert!(!KdlPrintOptions::TESTING.print_empty_children);
    }

    #[test]
    fn test_builders_leave_presets_alone() {
        let custom = KdlPrintOptions::PRETTY.with_keep_radix(true).with_nulls(false, false);
        assert!(custom.keep_radix);
        assert!(!custom.print_null_arguments);
        assert!(!KdlPrintOptions::PRETTY.keep_radix);
        assert!(KdlPrintOptions::PRETTY.print_null_arguments);
    }

    #[test]
    fn test_reader_defaults() {
        let options = KdlReaderOptions::default();
        assert!(options.use_type_annotations);
        assert!(!options.prefer_single);
        assert!(!options.prefer_decimal);
        for name in [
            "date-time", "time", "date", "decimal", "ipv4", "ipv6", "regex", "base64",
        ] {
            assert!(options.converter(name).is_some(), "missing {name}");
        }
        assert!(options.converter("uuid").is_none());
    }

    #[test]
    fn test_disabled_annotations_hide_converters() {
        let options = KdlReaderOptions::new().with_type_annotations(false);
        assert!(options.converter("date").is_none());
        assert!(KdlReaderOptions::new()
            .without_converters()
            .converter("date")
            .is_none());
    }

    #[test]
    fn test_regex_defaults() {
        let regex = RegexOptions::default();
        assert!(regex.unicode);
        assert!(!regex.case_insensitive);
        assert!(RegexOptions::new().with_case_insensitive(true).case_insensitive);
    }
}
