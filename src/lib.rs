//! # kdl_doc
//!
//! A parser and writer for the KDL document language.
//!
//! ## What is KDL?
//!
//! KDL is a node-oriented configuration language. A document is a list of
//! nodes; each node has a name, ordered arguments, named properties and an
//! optional block of child nodes:
//!
//! ```kdl
//! package "kdl_doc" version="0.1.0" {
//!     author "Jane Doe" email="jane@example.com"
//!     (date)released "2024-01-15"
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Full literal grammar**: quoted and raw strings, `0x`/`0o`/`0b` radixes,
//!   exponents, `/-` discards, nested block comments and line continuations
//! - **Width-aware numbers**: integers take the narrowest of `i32`, `i64` and
//!   `BigInt`; annotations such as `(u8)` force a width and reject overflow
//! - **Type converters**: `(date-time)`, `(ipv4)`, `(regex)`, `(base64)` and
//!   friends turn strings into typed values, and custom converters can be registered
//! - **Round-trip writer**: configurable escaping, indentation, exponent style and
//!   radix preservation
//! - **Serde export**: documents implement `Serialize` for conversion to JSON and similar formats
//!
//! ## Quick Start
//!
//! ```rust
//! use kdl_doc::{parse, to_string};
//!
//! let doc = parse("server \"main\" port=8080 {\n    tls enabled=true\n}").unwrap();
//!
//! let server = doc.get("server").unwrap();
//! assert_eq!(server.arguments[0].as_str(), Some("main"));
//! assert_eq!(server.get("port").and_then(|v| v.as_i64()), Some(8080));
//! assert_eq!(
//!     server.child("tls").and_then(|n| n.get("enabled")).and_then(|v| v.as_bool()),
//!     Some(true)
//! );
//!
//! assert_eq!(
//!     to_string(&doc),
//!     "server \"main\" port=8080 {\n    tls enabled=true\n}\n"
//! );
//! ```
//!
//! ### Reader Options
//!
//! ```rust
//! use kdl_doc::{parse_with_options, KdlReaderOptions, Number};
//!
//! let options = KdlReaderOptions::new().with_prefer_single(true);
//! let doc = parse_with_options("scale 0.5 (u8)255", &options).unwrap();
//!
//! let scale = &doc.nodes[0];
//! assert_eq!(scale.arguments[0].as_number(), Some(&Number::F32(0.5)));
//! assert_eq!(scale.arguments[1].as_number(), Some(&Number::U8(255)));
//! ```
//!
//! ### Print Options
//!
//! ```rust
//! use kdl_doc::{parse, to_string_with_options, KdlPrintOptions};
//!
//! let doc = parse("a { b; }").unwrap();
//! let options = KdlPrintOptions::PRETTY.with_indent('\t', 1);
//! assert_eq!(to_string_with_options(&doc, &options), "a {\n\tb\n}\n");
//! ```
//!
//! ## Errors
//!
//! Parsing stops at the first error. Every grammar error carries a
//! [`Location`] and an [`ErrorKind`]:
//!
//! ```rust
//! use kdl_doc::{parse, ErrorKind};
//!
//! let err = parse("node (u8)256").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::NumericRange);
//! assert_eq!(err.location().map(|l| l.line), Some(1));
//! ```
//!
//! ## Logging
//!
//! The reader and writer emit `tracing` events at `debug` and `trace` level.
//! No subscriber is installed by the library.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Parse, query and write a document
//! - **`custom_options.rs`** - Reader converters and print presets
//!
//! Run either with: `cargo run --example <name>`

pub mod convert;
pub mod cursor;
pub mod error;
pub mod lexical;
pub mod map;
pub mod node;
pub mod options;
pub mod reader;
pub mod value;
pub mod writer;

pub use convert::TypeConverter;
pub use error::{ConvertError, Error, ErrorKind, Location, Result};
pub use map::KdlMap;
pub use node::{KdlDocument, KdlNode};
pub use options::{KdlPrintOptions, KdlReaderOptions, RegexOptions};
pub use reader::KdlReader;
pub use value::{KdlNumber, KdlValue, Number, NumberFormat, NumberLiteral, SourceSpan, ValueKind};
pub use writer::Writer;

use std::io;

/// Parses KDL text with the default reader options.
///
/// # Examples
///
/// ```rust
/// use kdl_doc::parse;
///
/// let doc = parse("title \"Hello\"; count 3").unwrap();
/// assert_eq!(doc.len(), 2);
/// assert_eq!(doc.nodes[1].arguments[0].as_i64(), Some(3));
/// ```
///
/// # Errors
///
/// Returns the first lexical, structural, numeric range or conversion error,
/// with its line and column.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<KdlDocument> {
    KdlReader::new().parse(text)
}

/// Parses KDL text with custom reader options.
///
/// # Errors
///
/// Same as [`parse`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with_options(text: &str, options: &KdlReaderOptions) -> Result<KdlDocument> {
    reader::read_document(text, options)
}

/// Reads a whole I/O stream, then parses it.
///
/// # Examples
///
/// ```rust
/// use kdl_doc::from_reader;
/// use std::io::Cursor;
///
/// let doc = from_reader(Cursor::new(b"node 1")).unwrap();
/// assert_eq!(doc.nodes[0].name, "node");
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not UTF-8, or it is not valid KDL.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(mut reader: R) -> Result<KdlDocument>
where
    R: io::Read,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    from_slice(&bytes)
}

/// Parses KDL from bytes, which must be UTF-8.
///
/// # Errors
///
/// Returns [`Error::Utf8`] for invalid UTF-8, otherwise the same errors as [`parse`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(v: &[u8]) -> Result<KdlDocument> {
    let text = std::str::from_utf8(v)?;
    parse(text)
}

/// Writes a document using [`KdlPrintOptions::PRETTY`].
#[must_use]
pub fn to_string(doc: &KdlDocument) -> String {
    doc.to_kdl_string()
}

/// Writes a document with custom print options.
///
/// # Examples
///
/// ```rust
/// use kdl_doc::{parse, to_string_with_options, KdlPrintOptions};
///
/// let doc = parse("a; b").unwrap();
/// assert_eq!(to_string_with_options(&doc, &KdlPrintOptions::TESTING), "a\r\nb\r\n");
/// ```
#[must_use]
pub fn to_string_with_options(doc: &KdlDocument, options: &KdlPrintOptions) -> String {
    doc.to_kdl_string_with(options)
}

/// Writes a document to an I/O sink.
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(mut writer: W, doc: &KdlDocument, options: &KdlPrintOptions) -> Result<()>
where
    W: io::Write,
{
    let text = to_string_with_options(doc, options);
    writer.write_all(text.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_write() {
        let doc = parse("a 1 b=\"x\" { c; }").unwrap();
        assert_eq!(to_string(&doc), "a 1 b=\"x\" {\n    c\n}\n");
    }

    #[test]
    fn test_from_slice_invalid_utf8() {
        let err = from_slice(&[b'a', 0xFF]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Utf8);
    }

    #[test]
    fn test_from_reader() {
        let doc = from_reader(io::Cursor::new("x; y".as_bytes())).unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_to_writer() {
        let doc = parse("node \"v\"").unwrap();
        let mut out = Vec::new();
        to_writer(&mut out, &doc, &KdlPrintOptions::RAW).unwrap();
        assert_eq!(out, b"node \"v\"\n");
    }

    #[test]
    fn test_to_writer_failure() {
        struct Broken;
        impl io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let doc = parse("node").unwrap();
        let err = to_writer(Broken, &doc, &KdlPrintOptions::PRETTY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_parse_with_options() {
        let options = KdlReaderOptions::new().without_converters();
        let doc = parse_with_options("n (ipv4)\"not an address\"", &options).unwrap();
        assert_eq!(doc.nodes[0].arguments[0].as_str(), Some("not an address"));
    }
}
