//! String literal escaping and unescaping for Ridge syntax.
//!
//! Converts between runtime strings (`"hello\n"` with an actual newline) and the
//! source form (`"hello\n"` with a backslash-n sequence).

use bumpalo::Bump;
use core::fmt;

/// Errors that can occur when unescaping string literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnescapeError {
    /// Invalid escape sequence (e.g., `\q`)
    InvalidEscape { pos: usize, seq: String },
    /// Invalid hex digit in Unicode escape
    InvalidHexDigit { pos: usize, seq: String },
    /// Incomplete Unicode escape (not enough digits)
    IncompleteUnicodeEscape {
        pos: usize,
        expected: usize,
        got: usize,
    },
    /// Invalid Unicode scalar value
    InvalidUnicodeScalar { pos: usize, value: u32 },
}

impl fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnescapeError::InvalidEscape { pos, seq } => {
                write!(f, "invalid escape sequence '{}' at position {}", seq, pos)
            }
            UnescapeError::InvalidHexDigit { pos, seq } => {
                write!(f, "invalid hex digit in '{}' at position {}", seq, pos)
            }
            UnescapeError::IncompleteUnicodeEscape { pos, expected, got } => {
                write!(
                    f,
                    "incomplete Unicode escape at position {}: expected {} digits, got {}",
                    pos, expected, got
                )
            }
            UnescapeError::InvalidUnicodeScalar { pos, value } => {
                write!(
                    f,
                    "invalid Unicode scalar value U+{:X} at position {}",
                    value, pos
                )
            }
        }
    }
}

/// Escape a string for display as a Ridge string literal (always double quoted).
pub fn escape_string(f: &mut impl fmt::Write, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

/// Unescape the body of a string literal (without the surrounding quotes).
///
/// Supports `\n`, `\r`, `\t`, `\0`, `\\`, `\"` and `\uNNNN`. Inputs without a
/// backslash are returned as-is without allocating.
pub fn unescape_string<'a>(arena: &'a Bump, input: &'a str) -> Result<&'a str, UnescapeError> {
    if !input.contains('\\') {
        return Ok(input);
    }

    let mut output = String::with_capacity(input.len());
    let mut chars = input.char_indices();

    while let Some((pos, ch)) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }

        match chars.next() {
            Some((_, 'n')) => output.push('\n'),
            Some((_, 'r')) => output.push('\r'),
            Some((_, 't')) => output.push('\t'),
            Some((_, '0')) => output.push('\0'),
            Some((_, '\\')) => output.push('\\'),
            Some((_, '"')) => output.push('"'),
            Some((upos, 'u')) => {
                let mut value = 0u32;
                for digit_count in 0..4 {
                    match chars.next() {
                        Some((_, c)) => match c.to_digit(16) {
                            Some(digit) => value = (value << 4) | digit,
                            None => {
                                return Err(UnescapeError::InvalidHexDigit {
                                    pos: upos + 1,
                                    seq: format!("\\u{}", c),
                                });
                            }
                        },
                        None => {
                            return Err(UnescapeError::IncompleteUnicodeEscape {
                                pos,
                                expected: 4,
                                got: digit_count,
                            });
                        }
                    }
                }
                let c = char::from_u32(value)
                    .ok_or(UnescapeError::InvalidUnicodeScalar { pos, value })?;
                output.push(c);
            }
            Some((_, other)) => {
                return Err(UnescapeError::InvalidEscape {
                    pos,
                    seq: format!("\\{}", other),
                });
            }
            None => {
                return Err(UnescapeError::InvalidEscape {
                    pos,
                    seq: "\\".to_string(),
                });
            }
        }
    }

    Ok(arena.alloc_str(&output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_fast_path_borrows_input() {
        let arena = Bump::new();
        let input = "plain text";
        let result = unescape_string(&arena, input).unwrap();
        assert!(core::ptr::eq(result, input));
    }

    #[test]
    fn test_unescape_common_sequences() {
        let arena = Bump::new();
        assert_eq!(
            unescape_string(&arena, r#"a\nb\t\"c\"\\"#).unwrap(),
            "a\nb\t\"c\"\\"
        );
        assert_eq!(unescape_string(&arena, r"\u0041").unwrap(), "A");
    }

    #[test]
    fn test_unescape_invalid_escape() {
        let arena = Bump::new();
        let err = unescape_string(&arena, r"bad\q").unwrap_err();
        assert_eq!(
            err,
            UnescapeError::InvalidEscape {
                pos: 3,
                seq: "\\q".to_string()
            }
        );
    }

    #[test]
    fn test_unescape_incomplete_unicode() {
        let arena = Bump::new();
        let err = unescape_string(&arena, r"\u00").unwrap_err();
        assert!(matches!(
            err,
            UnescapeError::IncompleteUnicodeEscape { got: 2, .. }
        ));
    }

    #[test]
    fn test_escape_string() {
        let mut out = String::new();
        escape_string(&mut out, "say \"hi\"\n").unwrap();
        assert_eq!(out, r#""say \"hi\"\n""#);
    }
}
