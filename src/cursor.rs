//! Character cursor over the source text.
//!
//! The reader never indexes into the input directly. It goes through a
//! [`SourceCursor`], which tracks the line, column and byte offset of the next
//! character and lets the grammar push back at most two characters when it has
//! read too far.

use crate::error::{Location, Result};
use crate::lexical::is_newline;
use crate::Error;
use std::iter::Peekable;
use std::str::Chars;

const PUSHBACK_DEPTH: usize = 2;

/// A single-use cursor over a borrowed string.
///
/// After [`SourceCursor::invalidate`] every `peek` and `read` fails, which is how a
/// parse that hit an error is kept from being resumed.
pub struct SourceCursor<'a> {
    chars: Peekable<Chars<'a>>,
    pushback: [Option<char>; PUSHBACK_DEPTH],
    pushed: usize,
    line: usize,
    column: usize,
    offset: usize,
    invalid: bool,
}

impl<'a> SourceCursor<'a> {
    pub fn new(input: &'a str) -> Self {
        SourceCursor {
            chars: input.chars().peekable(),
            pushback: [None; PUSHBACK_DEPTH],
            pushed: 0,
            line: 1,
            column: 1,
            offset: 0,
            invalid: false,
        }
    }

    fn check(&self) -> Result<()> {
        if self.invalid {
            Err(Error::invalid_cursor(
                "can't operate on a cursor invalidated by an earlier error",
            ))
        } else {
            Ok(())
        }
    }

    /// Returns the next character without consuming it, or `None` at end of input.
    pub fn peek(&mut self) -> Result<Option<char>> {
        self.check()?;
        if self.pushed > 0 {
            return Ok(self.pushback[self.pushed - 1]);
        }
        Ok(self.chars.peek().copied())
    }

    /// Consumes the next character, or returns `None` at end of input.
    ///
    /// A CR immediately followed by LF is consumed as one newline and reported as `'\n'`.
    pub fn read(&mut self) -> Result<Option<char>> {
        self.check()?;

        let c = if self.pushed > 0 {
            self.pushed -= 1;
            self.pushback[self.pushed].take()
        } else {
            self.chars.next()
        };

        let c = match c {
            Some(c) => c,
            None => return Ok(None),
        };

        self.offset += c.len_utf8();

        if is_newline(c) {
            // newlines never sit in the pushback slots, so the LF comes from the stream
            let c = if c == '\r' && self.chars.peek() == Some(&'\n') {
                self.chars.next();
                self.offset += 1;
                '\n'
            } else {
                c
            };
            self.line += 1;
            self.column = 1;
            return Ok(Some(c));
        }

        self.column += 1;
        Ok(Some(c))
    }

    /// Pushes a character back so the next `read` returns it again.
    ///
    /// Only the last two characters of a line can be pushed back; newlines cannot.
    pub fn unread(&mut self, c: char) -> Result<()> {
        self.check()?;

        if is_newline(c) {
            return Err(Error::invalid_cursor("cannot unread a newline"));
        }
        if self.pushed == PUSHBACK_DEPTH {
            return Err(Error::invalid_cursor("cursor overflow"));
        }
        if self.column == 1 || self.offset < c.len_utf8() {
            return Err(Error::invalid_cursor("cannot unread past the start of the line"));
        }

        self.pushback[self.pushed] = Some(c);
        self.pushed += 1;
        self.offset -= c.len_utf8();
        self.column -= 1;
        Ok(())
    }

    /// Position of the next character to be read.
    #[must_use]
    pub fn location(&self) -> Location {
        Location::new(self.line, self.column, self.offset)
    }

    /// Marks the cursor as unusable; all later operations fail.
    pub fn invalidate(&mut self) {
        self.invalid = true;
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }
}
