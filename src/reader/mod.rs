//! KDL document reader.
//!
//! This module provides [`KdlReader`], a recursive-descent parser that turns KDL
//! text into a [`KdlDocument`].
//!
//! ## Grammar overview
//!
//! - A document is a sequence of nodes separated by linespace: whitespace,
//!   newlines, `//` line comments and nestable `/* */` block comments.
//! - A node is an optional `(type)`, a name, then arguments and `key=value`
//!   properties, an optional `{ ... }` children block, and a terminator
//!   (`;`, a newline or end of input).
//! - `/-` discards the next node, argument, property or children block.
//! - A `\` continues a node on the next line.
//!
//! ## Examples
//!
//! ```rust
//! use kdl_doc::{KdlReader, KdlReaderOptions};
//!
//! let reader = KdlReader::with_options(KdlReaderOptions::new().with_prefer_decimal(true));
//! let doc = reader.parse("price 19.99 currency=\"EUR\"").unwrap();
//!
//! let price = &doc.nodes[0];
//! assert_eq!(price.arguments[0].as_decimal().map(|d| d.to_string()), Some("19.99".into()));
//! assert_eq!(price.get("currency").and_then(|v| v.as_str()), Some("EUR"));
//! ```

mod ident;
mod number;
mod string;

use crate::cursor::SourceCursor;
use crate::error::{ErrorKind, Result};
use crate::lexical::{is_identifier_char, is_keyword, is_newline, is_node_terminator, is_whitespace, BOM};
use crate::value::SourceSpan;
use crate::{Error, KdlDocument, KdlNode, KdlReaderOptions, KdlValue, ValueKind};
use ident::IdentOutcome;
use string::RawString;
use tracing::{debug, trace};

/// A reusable reader holding its [`KdlReaderOptions`].
///
/// Each call to [`KdlReader::parse`] uses a fresh cursor, so one reader can parse
/// any number of documents.
#[derive(Debug, Clone, Default)]
pub struct KdlReader {
    options: KdlReaderOptions,
}

impl KdlReader {
    /// Creates a reader with the default options and built-in converters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: KdlReaderOptions) -> Self {
        KdlReader { options }
    }

    #[must_use]
    pub fn options(&self) -> &KdlReaderOptions {
        &self.options
    }

    /// Parses a complete document.
    ///
    /// # Errors
    ///
    /// Returns the first error found; parsing never resumes after it.
    pub fn parse(&self, text: &str) -> Result<KdlDocument> {
        read_document(text, &self.options)
    }
}

/// Parses `text` with a fresh cursor.
pub(crate) fn read_document(text: &str, options: &KdlReaderOptions) -> Result<KdlDocument> {
    debug!(bytes = text.len(), "parsing KDL document");
    let mut parser = Parser::new(SourceCursor::new(text), options);
    match parser.parse_document(0) {
        Ok(doc) => {
            debug!(nodes = doc.nodes.len(), "parsed KDL document");
            Ok(doc)
        }
        Err(err) => {
            debug!(error = %err, "KDL parse abandoned");
            Err(err)
        }
    }
}

/// Space found between two tokens of a node.
#[derive(Debug, Default, Clone, Copy)]
struct Blank {
    /// Nothing was consumed.
    empty: bool,
    /// A `/-` marker was consumed.
    discard: bool,
    /// `//` was consumed; the rest of the line is a comment.
    line_comment: bool,
}

/// What follows a node name.
enum Element {
    Argument(KdlValue),
    Property(String, KdlValue),
    /// An unquoted identifier not followed by `=`.
    Bare(String, Option<String>),
}

/// A token at argument position, before checking for `=`.
enum Token {
    Text(String),
    Bare(String),
    Value(KdlValue),
}

pub(crate) struct Parser<'a, 'o> {
    cursor: SourceCursor<'a>,
    options: &'o KdlReaderOptions,
}

impl<'a, 'o> Parser<'a, 'o> {
    pub(crate) fn new(cursor: SourceCursor<'a>, options: &'o KdlReaderOptions) -> Self {
        Parser { cursor, options }
    }

    #[inline]
    fn peek(&mut self) -> Result<Option<char>> {
        self.cursor.peek()
    }

    #[inline]
    fn read(&mut self) -> Result<Option<char>> {
        self.cursor.read()
    }

    /// Builds an error at the current position and invalidates the cursor.
    fn fail<T>(&mut self, kind: ErrorKind, msg: impl Into<String>) -> Result<T> {
        let err = Error::at(kind, self.cursor.location(), msg);
        self.cursor.invalidate();
        Err(err)
    }

    fn span_from(&self, start: crate::Location) -> SourceSpan {
        SourceSpan::new(start, self.cursor.location())
    }

    /// Parses nodes until end of input (`level == 0`) or a closing `}` (`level > 0`).
    fn parse_document(&mut self, level: usize) -> Result<KdlDocument> {
        let start = self.cursor.location();
        let mut nodes = Vec::new();

        loop {
            let discard = self.parse_linespace()?;

            match self.peek()? {
                None if level > 0 => {
                    return self.fail(
                        ErrorKind::Structural,
                        "expected '}' to close children block, found end of input",
                    )
                }
                None | Some('}') if discard => {
                    return self.fail(ErrorKind::Structural, "expected a node after '/-'")
                }
                None => break,
                Some('}') if level > 0 => {
                    self.read()?;
                    break;
                }
                Some('}') => return self.fail(ErrorKind::Structural, "unexpected '}'"),
                Some(_) => {}
            }

            let node = self.parse_node(level)?;
            if discard {
                trace!(name = %node.name, "discarded node");
            } else {
                nodes.push(node);
            }
        }

        Ok(KdlDocument {
            nodes,
            span: Some(self.span_from(start)),
        })
    }

    /// Skips space between nodes. Returns whether a `/-` marker was found.
    fn parse_linespace(&mut self) -> Result<bool> {
        let mut discard = false;
        while let Some(c) = self.peek()? {
            if is_whitespace(c) || is_newline(c) || c == BOM {
                self.read()?;
                continue;
            }
            if c != '/' {
                break;
            }

            self.read()?;
            match self.read()? {
                Some('/') => self.parse_line_comment()?,
                Some('*') => self.parse_block_comment()?,
                Some('-') => discard = true,
                _ => return self.fail(ErrorKind::Structural, "unexpected '/'"),
            }
        }
        Ok(discard)
    }

    /// Skips space inside a node. Stops right after `//` if a line comment starts.
    fn parse_nodespace(&mut self) -> Result<Blank> {
        let mut blank = Blank {
            empty: true,
            ..Blank::default()
        };

        while let Some(c) = self.peek()? {
            if is_whitespace(c) {
                self.read()?;
                blank.empty = false;
                continue;
            }
            if c != '/' {
                break;
            }

            self.read()?;
            blank.empty = false;
            match self.read()? {
                Some('-') => blank.discard = true,
                Some('*') => self.parse_block_comment()?,
                Some('/') => {
                    blank.line_comment = true;
                    break;
                }
                _ => return self.fail(ErrorKind::Structural, "unexpected '/'"),
            }
        }
        Ok(blank)
    }

    /// Consumes the rest of a line comment, including its newline.
    fn parse_line_comment(&mut self) -> Result<()> {
        while let Some(c) = self.read()? {
            if is_newline(c) {
                break;
            }
        }
        Ok(())
    }

    /// Consumes a block comment after its opening `/*`. Block comments nest.
    fn parse_block_comment(&mut self) -> Result<()> {
        let mut depth = 1usize;
        loop {
            match self.read()? {
                Some('/') if self.peek()? == Some('*') => {
                    self.read()?;
                    depth += 1;
                }
                Some('*') if self.peek()? == Some('/') => {
                    self.read()?;
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => {
                    return self.fail(
                        ErrorKind::UnterminatedLiteral,
                        "unexpected end of input inside a block comment",
                    )
                }
            }
        }
    }

    /// Consumes a `\` line continuation up to and including the newline.
    fn parse_line_continuation(&mut self) -> Result<()> {
        self.read()?;
        loop {
            match self.peek()? {
                None => return Ok(()),
                Some(c) if is_newline(c) => {
                    self.read()?;
                    return Ok(());
                }
                Some(c) if is_whitespace(c) => {
                    self.read()?;
                }
                Some('/') => {
                    self.read()?;
                    match self.read()? {
                        Some('/') => return self.parse_line_comment(),
                        Some('*') => self.parse_block_comment()?,
                        _ => return self.fail(ErrorKind::Structural, "unexpected '/'"),
                    }
                }
                Some(c) => {
                    return self.fail(
                        ErrorKind::Lexical,
                        format!("unexpected '{}' after line continuation", c),
                    )
                }
            }
        }
    }

    fn parse_node(&mut self, level: usize) -> Result<KdlNode> {
        let start = self.cursor.location();
        let ty = self.parse_type_annotation()?;

        let ident = match self.parse_identifier()? {
            IdentOutcome::Identifier(ident) => ident,
            IdentOutcome::SignedNumber(_) => {
                return self.fail(
                    ErrorKind::Lexical,
                    "a node name cannot start with a sign followed by a digit",
                )
            }
        };

        if is_keyword(&ident.name) {
            return self.fail(
                ErrorKind::Lexical,
                format!("'{}' cannot be used as a node name", ident.name),
            );
        }

        self.parse_node_body(ident.name, ty, start, level)
    }

    /// Parses everything after a node's name up to and including its terminator.
    fn parse_node_body(
        &mut self,
        name: String,
        ty: Option<String>,
        start: crate::Location,
        level: usize,
    ) -> Result<KdlNode> {
        let mut node = KdlNode::new(name);
        node.ty = ty;

        let mut discard = false;
        let mut continued = false;

        loop {
            let blank = self.parse_nodespace()?;
            discard |= blank.discard;
            let c = self.peek()?;

            if blank.line_comment || is_node_terminator(c) {
                if discard {
                    return self.fail(ErrorKind::Structural, "expected an element after '/-'");
                }
                if blank.line_comment {
                    self.parse_line_comment()?;
                } else if c == Some(';') {
                    self.read()?;
                }
                break;
            }

            match c {
                Some('\\') => {
                    self.parse_line_continuation()?;
                    continued = true;
                    continue;
                }
                Some('}') if level > 0 => {
                    if discard {
                        return self.fail(ErrorKind::Structural, "expected an element after '/-'");
                    }
                    break;
                }
                Some('}') => return self.fail(ErrorKind::Structural, "unexpected '}'"),
                Some('{') => {
                    self.read()?;
                    let children = self.parse_document(level + 1)?;
                    if discard {
                        trace!(node = %node.name, "discarded children block");
                        discard = false;
                        continued = false;
                        continue;
                    }
                    node.children = Some(children);
                    self.parse_after_children(level)?;
                    break;
                }
                _ => {}
            }

            if blank.empty && !continued {
                return self.fail(
                    ErrorKind::Structural,
                    "arguments and properties must be separated by whitespace",
                );
            }

            let element_start = self.cursor.location();
            match self.parse_element()? {
                Element::Bare(name, ty) if discard => {
                    // `/- sibling` ends this node and drops the next one whole
                    let sibling = self.parse_node_body(name, ty, element_start, level)?;
                    trace!(name = %sibling.name, "discarded sibling node");
                    node.span = Some(self.span_from(start));
                    return Ok(node);
                }
                Element::Bare(name, _) => {
                    return self.fail(
                        ErrorKind::Structural,
                        format!("bare identifier '{}' cannot be used as an argument", name),
                    )
                }
                _ if discard => {}
                Element::Argument(value) => node.arguments.push(value),
                Element::Property(key, value) => {
                    node.properties.insert(key, value);
                }
            }

            discard = false;
            continued = false;
        }

        node.span = Some(self.span_from(start));
        Ok(node)
    }

    /// After a closing `}`, only space, a comment or a terminator may follow.
    fn parse_after_children(&mut self, level: usize) -> Result<()> {
        let blank = self.parse_nodespace()?;
        if blank.discard {
            return self.fail(ErrorKind::Structural, "unexpected '/-' after children block");
        }
        if blank.line_comment {
            return self.parse_line_comment();
        }

        match self.peek()? {
            Some(';') => {
                self.read()?;
                Ok(())
            }
            c if is_node_terminator(c) => Ok(()),
            Some('}') if level > 0 => Ok(()),
            Some(c) => self.fail(
                ErrorKind::Structural,
                format!("unexpected '{}' after children block", c),
            ),
            None => Ok(()),
        }
    }

    /// Parses an argument or a `key=value` property.
    fn parse_element(&mut self) -> Result<Element> {
        let start = self.cursor.location();
        let ty = self.parse_type_annotation()?;

        let token = match self.peek()? {
            Some('"') => Token::Text(self.parse_string()?),
            Some(c) if c.is_ascii_digit() => Token::Value(self.parse_number(None, ty.as_deref())?),
            Some(_) => match self.parse_identifier()? {
                IdentOutcome::Identifier(ident) if ident.explicit_string => Token::Text(ident.name),
                IdentOutcome::Identifier(ident) => match keyword_value(&ident.name) {
                    Some(kind) => Token::Value(KdlValue::new(kind)),
                    None => Token::Bare(ident.name),
                },
                IdentOutcome::SignedNumber(sign) => {
                    Token::Value(self.parse_number(Some(sign), ty.as_deref())?)
                }
            },
            None => {
                return self.fail(ErrorKind::Lexical, "expected an argument, found end of input")
            }
        };

        if self.peek()? == Some('=') {
            let key = match token {
                Token::Text(key) | Token::Bare(key) => key,
                Token::Value(_) => {
                    return self.fail(
                        ErrorKind::Structural,
                        "property names must be identifiers or strings",
                    )
                }
            };
            if ty.is_some() {
                return self.fail(
                    ErrorKind::Structural,
                    "a type annotation must precede the property value, not its name",
                );
            }
            self.read()?;
            let value = self.parse_value()?;
            return Ok(Element::Property(key, value));
        }

        let value = match token {
            Token::Bare(name) => return Ok(Element::Bare(name, ty)),
            Token::Text(text) => self.convert_string(text, ty)?,
            Token::Value(mut value) => {
                value.ty = ty;
                value
            }
        };
        Ok(Element::Argument(value.with_span(self.span_from(start))))
    }

    /// Parses the value after `=`.
    fn parse_value(&mut self) -> Result<KdlValue> {
        let start = self.cursor.location();
        let ty = self.parse_type_annotation()?;

        let value = match self.peek()? {
            Some('"') => {
                let text = self.parse_string()?;
                self.convert_string(text, ty)?
            }
            Some('r') => {
                self.read()?;
                match self.parse_raw_string()? {
                    RawString::Parsed(text) => self.convert_string(text, ty)?,
                    RawString::NotRaw { .. } => {
                        return self.fail(ErrorKind::Lexical, "expected a raw string after 'r'")
                    }
                }
            }
            Some(c) if c.is_ascii_digit() || c == '+' || c == '-' => {
                self.parse_number(None, ty.as_deref())?
            }
            Some(c) if is_identifier_char(c) => {
                let mut word = String::new();
                while let Some(c) = self.peek()? {
                    if !is_identifier_char(c) {
                        break;
                    }
                    self.read()?;
                    word.push(c);
                }
                match keyword_value(&word) {
                    Some(kind) => {
                        let mut value = KdlValue::new(kind);
                        value.ty = ty;
                        value
                    }
                    None => {
                        return self.fail(
                            ErrorKind::Lexical,
                            format!("'{}' is not a valid value", word),
                        )
                    }
                }
            }
            _ => return self.fail(ErrorKind::Structural, "expected a value after '='"),
        };

        Ok(value.with_span(self.span_from(start)))
    }

    /// Wraps a string, running it through the converter registered for its annotation.
    fn convert_string(&mut self, text: String, ty: Option<String>) -> Result<KdlValue> {
        let ty = match ty {
            Some(ty) => ty,
            None => return Ok(KdlValue::from(text)),
        };

        let converter = match self.options.converter(&ty) {
            Some(converter) => converter,
            None => return Ok(KdlValue::from(text).with_type(ty)),
        };

        trace!(ty = %ty, "applying type converter");
        match converter(&text, &ty, self.options) {
            Ok(mut value) => {
                if value.ty.is_none() {
                    value.ty = Some(ty);
                }
                Ok(value)
            }
            Err(err) => self.fail(ErrorKind::Conversion, format!("({}) {}", ty, err)),
        }
    }
}

fn keyword_value(word: &str) -> Option<ValueKind> {
    match word {
        "true" => Some(ValueKind::Bool(true)),
        "false" => Some(ValueKind::Bool(false)),
        "null" => Some(ValueKind::Null),
        _ => None,
    }
}
