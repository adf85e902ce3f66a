//! Identifiers and type annotations.

use super::string::RawString;
use super::Parser;
use crate::error::{ErrorKind, Result};
use crate::lexical::{is_decimal_digit, is_identifier_char, is_initial_identifier_char};

/// An identifier, and whether it was written as a quoted or raw string.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Identifier {
    pub name: String,
    pub explicit_string: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub(crate) fn as_char(self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum IdentOutcome {
    Identifier(Identifier),
    /// A sign followed by a digit was read; the caller continues with a number.
    SignedNumber(Sign),
}

impl Parser<'_, '_> {
    /// Reads `(identifier)` if the next character opens a type annotation.
    pub(crate) fn parse_type_annotation(&mut self) -> Result<Option<String>> {
        if self.peek()? != Some('(') {
            return Ok(None);
        }
        self.read()?;

        if self.peek()?.is_none() {
            return self.fail(
                ErrorKind::UnterminatedLiteral,
                "unexpected end of input inside a type annotation",
            );
        }

        let name = match self.parse_identifier()? {
            IdentOutcome::Identifier(id) => id.name,
            IdentOutcome::SignedNumber(_) => {
                return self.fail(
                    ErrorKind::Lexical,
                    "a type annotation cannot start with a sign followed by a digit",
                )
            }
        };

        match self.peek()? {
            Some(')') => {
                self.read()?;
                Ok(Some(name))
            }
            None => self.fail(
                ErrorKind::UnterminatedLiteral,
                "unexpected end of input inside a type annotation",
            ),
            Some(c) => self.fail(
                ErrorKind::Structural,
                format!("expected ')' to close type annotation, found '{}'", c),
            ),
        }
    }

    /// Reads a quoted, raw or bare identifier.
    ///
    /// A leading `r` is first tried as a raw string; if no quote follows its
    /// hashes, the consumed `r#..` starts a bare identifier instead.
    pub(crate) fn parse_identifier(&mut self) -> Result<IdentOutcome> {
        let c = match self.peek()? {
            Some(c) => c,
            None => {
                return self.fail(ErrorKind::Lexical, "expected an identifier, found end of input")
            }
        };

        if c == '"' {
            let name = self.parse_string()?;
            return Ok(IdentOutcome::Identifier(Identifier {
                name,
                explicit_string: true,
            }));
        }

        if !is_initial_identifier_char(c) {
            return self.fail(
                ErrorKind::Lexical,
                format!("identifiers cannot start with '{}'", c),
            );
        }

        let mut name = String::new();

        if c == 'r' {
            self.read()?;
            name.push('r');
            if matches!(self.peek()?, Some('#') | Some('"')) {
                match self.parse_raw_string()? {
                    RawString::Parsed(raw) => {
                        return Ok(IdentOutcome::Identifier(Identifier {
                            name: raw,
                            explicit_string: true,
                        }))
                    }
                    RawString::NotRaw { hashes } => {
                        name.extend(std::iter::repeat('#').take(hashes));
                    }
                }
            }
        } else if c == '+' || c == '-' {
            self.read()?;
            let sign = if c == '+' { Sign::Plus } else { Sign::Minus };
            if self.peek()?.map_or(false, is_decimal_digit) {
                return Ok(IdentOutcome::SignedNumber(sign));
            }
            name.push(c);
        }

        while let Some(c) = self.peek()? {
            if !is_identifier_char(c) {
                break;
            }
            self.read()?;
            name.push(c);
        }

        Ok(IdentOutcome::Identifier(Identifier {
            name,
            explicit_string: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::SourceCursor;
    use crate::KdlReaderOptions;

    fn ident(input: &str) -> Result<IdentOutcome> {
        let options = KdlReaderOptions::default();
        let mut parser = Parser::new(SourceCursor::new(input), &options);
        parser.parse_identifier()
    }

    fn bare(name: &str) -> IdentOutcome {
        IdentOutcome::Identifier(Identifier {
            name: name.to_string(),
            explicit_string: false,
        })
    }

    fn quoted(name: &str) -> IdentOutcome {
        IdentOutcome::Identifier(Identifier {
            name: name.to_string(),
            explicit_string: true,
        })
    }

    #[test]
    fn test_bare_stops_at_reserved() {
        assert_eq!(ident("node{").unwrap(), bare("node"));
        assert_eq!(ident("key=1").unwrap(), bare("key"));
        assert_eq!(ident("a-b.c ").unwrap(), bare("a-b.c"));
    }

    #[test]
    fn test_quoted_and_raw() {
        assert_eq!(ident("\"two words\"").unwrap(), quoted("two words"));
        assert_eq!(ident("r#\"raw\"#").unwrap(), quoted("raw"));
        assert_eq!(ident("r\"raw\"").unwrap(), quoted("raw"));
    }

    #[test]
    fn test_raw_fallback() {
        assert_eq!(ident("rfoo").unwrap(), bare("rfoo"));
        assert_eq!(ident("r#foo").unwrap(), bare("r#foo"));
        assert_eq!(ident("r##").unwrap(), bare("r##"));
        assert_eq!(ident("r").unwrap(), bare("r"));
    }

    #[test]
    fn test_sign_followed_by_digit() {
        assert_eq!(ident("-1").unwrap(), IdentOutcome::SignedNumber(Sign::Minus));
        assert_eq!(ident("+0x1").unwrap(), IdentOutcome::SignedNumber(Sign::Plus));
        assert_eq!(ident("-a").unwrap(), bare("-a"));
        assert_eq!(ident("-").unwrap(), bare("-"));
    }

    #[test]
    fn test_invalid_start() {
        assert_eq!(ident("1abc").unwrap_err().kind(), ErrorKind::Lexical);
        assert_eq!(ident("{").unwrap_err().kind(), ErrorKind::Lexical);
    }

    #[test]
    fn test_type_annotations() {
        let options = KdlReaderOptions::default();
        let mut parser = Parser::new(SourceCursor::new("(u8)"), &options);
        assert_eq!(parser.parse_type_annotation().unwrap(), Some("u8".into()));

        let mut parser = Parser::new(SourceCursor::new("(\"my type\")"), &options);
        assert_eq!(parser.parse_type_annotation().unwrap(), Some("my type".into()));

        let mut parser = Parser::new(SourceCursor::new("u8"), &options);
        assert_eq!(parser.parse_type_annotation().unwrap(), None);

        let mut parser = Parser::new(SourceCursor::new("(u8"), &options);
        assert_eq!(
            parser.parse_type_annotation().unwrap_err().kind(),
            ErrorKind::UnterminatedLiteral
        );

        let mut parser = Parser::new(SourceCursor::new("(u8 x)"), &options);
        assert_eq!(
            parser.parse_type_annotation().unwrap_err().kind(),
            ErrorKind::Structural
        );
    }
}
