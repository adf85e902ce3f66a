//! Quoted and raw string literals.

use super::Parser;
use crate::error::{ErrorKind, Result};
use crate::lexical::is_hex_digit;

/// Outcome of reading the hashes and quote that open a raw string.
#[derive(Debug, PartialEq)]
pub(crate) enum RawString {
    Parsed(String),
    /// No opening quote followed the `r` and `hashes` hash marks, which were consumed.
    NotRaw { hashes: usize },
}

impl Parser<'_, '_> {
    /// Reads a quoted string, starting at the opening quote.
    pub(crate) fn parse_string(&mut self) -> Result<String> {
        if self.read()? != Some('"') {
            return self.fail(ErrorKind::Lexical, "expected '\"' to open a string");
        }

        let mut out = String::new();
        loop {
            let c = match self.read()? {
                Some(c) => c,
                None => {
                    return self.fail(
                        ErrorKind::UnterminatedLiteral,
                        "unexpected end of input inside a string",
                    )
                }
            };

            match c {
                '"' => return Ok(out),
                '\\' => self.parse_escape(&mut out)?,
                c => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<()> {
        let escaped = match self.peek()? {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('"') => '"',
            Some('b') => '\u{0008}',
            Some('f') => '\u{000C}',
            Some('u') => {
                self.read()?;
                let c = self.parse_unicode_escape()?;
                out.push(c);
                return Ok(());
            }
            // unknown escapes are kept verbatim, backslash included
            _ => {
                out.push('\\');
                return Ok(());
            }
        };
        self.read()?;
        out.push(escaped);
        Ok(())
    }

    /// Reads `{H..H}` after `\u`.
    fn parse_unicode_escape(&mut self) -> Result<char> {
        if self.read()? != Some('{') {
            return self.fail(ErrorKind::Lexical, "expected '{' after \\u");
        }

        let mut hex = String::with_capacity(6);
        loop {
            match self.read()? {
                Some('}') => break,
                Some(c) if is_hex_digit(c) => hex.push(c),
                Some(c) => {
                    return self.fail(
                        ErrorKind::Lexical,
                        format!("invalid character '{}' in unicode escape", c),
                    )
                }
                None => {
                    return self.fail(
                        ErrorKind::UnterminatedLiteral,
                        "unexpected end of input inside a unicode escape",
                    )
                }
            }
        }

        if hex.is_empty() || hex.len() > 6 {
            return self.fail(
                ErrorKind::Lexical,
                format!("unicode escape must have 1 to 6 hex digits, got '{}'", hex),
            );
        }

        let code = u32::from_str_radix(&hex, 16).unwrap_or(u32::MAX);
        match char::from_u32(code) {
            Some(c) => Ok(c),
            None => self.fail(
                ErrorKind::Lexical,
                format!("U+{:X} is not a unicode scalar value", code),
            ),
        }
    }

    /// Reads a raw string whose `r` has already been consumed.
    ///
    /// The body ends at a quote followed by as many hashes as opened it. A quote
    /// followed by fewer hashes is part of the content.
    pub(crate) fn parse_raw_string(&mut self) -> Result<RawString> {
        let mut hashes = 0;
        loop {
            match self.peek()? {
                Some('#') => {
                    self.read()?;
                    hashes += 1;
                }
                Some('"') => {
                    self.read()?;
                    break;
                }
                _ => return Ok(RawString::NotRaw { hashes }),
            }
        }

        let mut out = String::new();
        loop {
            let c = match self.read()? {
                Some(c) => c,
                None => {
                    return self.fail(
                        ErrorKind::UnterminatedLiteral,
                        "unexpected end of input inside a raw string",
                    )
                }
            };

            if c != '"' {
                out.push(c);
                continue;
            }

            let mut closing = 0;
            while closing < hashes && self.peek()? == Some('#') {
                self.read()?;
                closing += 1;
            }

            if closing == hashes {
                if self.peek()? == Some('#') {
                    return self.fail(ErrorKind::Lexical, "unequal number of hashes in raw string");
                }
                return Ok(RawString::Parsed(out));
            }

            out.push('"');
            out.extend(std::iter::repeat('#').take(closing));
        }
    }
}
