//! Character classes of the KDL grammar.
//!
//! Every predicate here looks at a single character (or, for the identifier checks,
//! a whole candidate string) and never consumes input. The reader and the writer
//! share these so that anything the writer prints bare is read back the same way.

/// Byte order mark, skipped as linespace at document level.
pub const BOM: char = '\u{FEFF}';

/// Literal keywords that can never be used as node names.
pub const KEYWORDS: [&str; 3] = ["true", "false", "null"];

/// Returns `true` if the string is `true`, `false` or `null`.
#[inline]
pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

/// Returns `true` for the letters making up `true`, `false` and `null`.
#[inline]
pub fn is_keyword_char(c: char) -> bool {
    matches!(c, 'n' | 'u' | 'l' | 't' | 'r' | 'e' | 'f' | 'a' | 's')
}

#[inline]
pub fn is_decimal_digit(c: char) -> bool {
    c.is_ascii_digit()
}

#[inline]
pub fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Returns `true` if `c` is a digit of the given radix (2, 8, 10 or 16).
#[inline]
pub fn is_digit_in(c: char, radix: u32) -> bool {
    match radix {
        2 => matches!(c, '0' | '1'),
        8 => matches!(c, '0'..='7'),
        16 => c.is_ascii_hexdigit(),
        _ => c.is_ascii_digit(),
    }
}

/// Unicode space characters that separate tokens on a line.
#[inline]
pub fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// Characters that end a line. CRLF is folded into a single newline by the cursor.
#[inline]
pub fn is_newline(c: char) -> bool {
    matches!(
        c,
        '\u{000D}' | '\u{000A}' | '\u{0085}' | '\u{000C}' | '\u{2028}' | '\u{2029}'
    )
}

/// `;`, a newline, or end of input (`None`).
#[inline]
pub fn is_node_terminator(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => c == ';' || is_newline(c),
    }
}

/// Characters with structural meaning that can never appear in a bare identifier.
#[inline]
pub fn is_reserved(c: char) -> bool {
    matches!(
        c,
        '\\' | '/' | '(' | ')' | '{' | '}' | '<' | '>' | ';' | '[' | ']' | '=' | ',' | '"'
    )
}

/// Returns `true` if `c` may appear anywhere in a bare identifier.
#[inline]
pub fn is_identifier_char(c: char) -> bool {
    c > '\u{20}' && !is_reserved(c) && !is_whitespace(c) && !is_newline(c) && c != BOM
}

/// Returns `true` if `c` may start a bare identifier.
#[inline]
pub fn is_initial_identifier_char(c: char) -> bool {
    !is_decimal_digit(c) && is_identifier_char(c)
}

/// Returns `true` if `s` reads back as the same bare identifier.
///
/// Keywords are excluded since they would read back as booleans or null.
///
/// # Examples
///
/// ```rust
/// use kdl_doc::lexical::is_bare_identifier;
///
/// assert!(is_bare_identifier("node"));
/// assert!(is_bare_identifier("-dash"));
/// assert!(!is_bare_identifier("-1"));
/// assert!(!is_bare_identifier("two words"));
/// assert!(!is_bare_identifier("null"));
/// ```
pub fn is_bare_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };

    if !is_initial_identifier_char(first) || is_keyword(s) {
        return false;
    }

    if matches!(first, '+' | '-') {
        if let Some(second) = s.chars().nth(1) {
            if is_decimal_digit(second) {
                return false;
            }
        }
    }

    chars.all(is_identifier_char)
}

/// Bidirectional control characters that can disguise the visible order of text.
#[inline]
pub fn is_dangerous_unicode(c: char) -> bool {
    matches!(c, '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}')
}

/// Characters with a short escape form (`\n`, `\t`, ...).
#[inline]
pub fn is_common_escape(c: char) -> bool {
    matches!(
        c,
        '\\' | '\r' | '\n' | '\t' | '\u{0008}' | '\u{000C}' | '"'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_and_newlines_are_disjoint() {
        for c in ['\t', ' ', '\u{00A0}', '\u{2003}', '\u{3000}'] {
            assert!(is_whitespace(c));
            assert!(!is_newline(c));
        }
        for c in ['\r', '\n', '\u{0085}', '\u{000C}', '\u{2028}', '\u{2029}'] {
            assert!(is_newline(c));
            assert!(!is_whitespace(c));
        }
    }

    #[test]
    fn test_digits_by_radix() {
        assert!(is_digit_in('1', 2));
        assert!(!is_digit_in('2', 2));
        assert!(is_digit_in('7', 8));
        assert!(!is_digit_in('8', 8));
        assert!(is_digit_in('f', 16));
        assert!(is_digit_in('F', 16));
        assert!(!is_digit_in('g', 16));
        assert!(is_digit_in('9', 10));
    }

    #[test]
    fn test_identifier_chars() {
        assert!(is_initial_identifier_char('a'));
        assert!(is_initial_identifier_char('-'));
        assert!(is_initial_identifier_char('#'));
        assert!(!is_initial_identifier_char('1'));
        assert!(is_identifier_char('1'));
        for c in ['\\', '/', '(', ')', '{', '}', '<', '>', ';', '[', ']', '=', ',', '"'] {
            assert!(!is_identifier_char(c), "{c:?} should be reserved");
        }
        assert!(!is_identifier_char(' '));
        assert!(!is_identifier_char('\u{2028}'));
    }

    #[test]
    fn test_terminators() {
        assert!(is_node_terminator(None));
        assert!(is_node_terminator(Some(';')));
        assert!(is_node_terminator(Some('\n')));
        assert!(!is_node_terminator(Some(' ')));
    }

    #[test]
    fn test_bare_identifiers() {
        assert!(is_bare_identifier("r#foo"));
        assert!(is_bare_identifier("+"));
        assert!(is_bare_identifier("-.5"));
        assert!(!is_bare_identifier(""));
        assert!(!is_bare_identifier("1abc"));
        assert!(!is_bare_identifier("+9"));
        assert!(!is_bare_identifier("a=b"));
        assert!(!is_bare_identifier("true"));
    }
}
