use crate::{Error, Result};

/// Expands backslash escapes in a configuration string such as a line ending.
///
/// Understands `\" \' \\ \b \f \n \r \t \v \0`, `\xNN` and `\uNNNN`. Any other
/// escape, and a trailing lone backslash, is kept verbatim.
///
/// # Errors
///
/// Returns [`Error::InvalidEscape`] if a `\x` or `\u` escape is not followed by
/// the required hex digits or does not name a valid character.
///
/// # Examples
///
/// ```
/// use serialterm::unescape;
///
/// assert_eq!(unescape(r"\r\n").unwrap(), "\r\n");
/// assert_eq!(unescape(r"\x04;").unwrap(), "\u{4};");
/// ```
pub fn unescape(original: &str) -> Result<String> {
    let mut out = String::with_capacity(original.len());
    let mut chars = original.char_indices();

    while let Some((start, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some((_, escaped)) = chars.next() else {
            out.push('\\');
            break;
        };

        match escaped {
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'x' | 'u' => {
                let digits = if escaped == 'x' { 2 } else { 4 };
                let hex: String = chars.by_ref().take(digits).map(|(_, h)| h).collect();
                let end = (start + 2 + hex.len()).min(original.len());
                let invalid = || Error::InvalidEscape(original[start..end].to_string());

                if hex.len() != digits || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
                    return Err(invalid());
                }
                let code = u32::from_str_radix(&hex, 16).map_err(|_| invalid())?;
                out.push(char::from_u32(code).ok_or_else(invalid)?);
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(unescape("hello").unwrap(), "hello");
        assert_eq!(unescape("").unwrap(), "");
    }

    #[test]
    fn test_simple_escapes() {
        assert_eq!(
            unescape(r#"\"\'\\\b\f\n\r\t\v\0"#).unwrap(),
            "\"'\\\u{8}\u{c}\n\r\t\u{b}\0"
        );
    }

    #[test]
    fn test_escapes_are_expanded_everywhere() {
        assert_eq!(unescape(r"a\nb\nc").unwrap(), "a\nb\nc");
    }

    #[test]
    fn test_hex_and_unicode() {
        assert_eq!(unescape(r"\x41\x7e").unwrap(), "A~");
        assert_eq!(unescape(r"\u00e4\u2603").unwrap(), "ä☃");
    }

    #[test]
    fn test_unknown_escape_kept() {
        assert_eq!(unescape(r"\q").unwrap(), r"\q");
        assert_eq!(unescape("end\\").unwrap(), "end\\");
    }

    #[test]
    fn test_malformed_hex() {
        assert!(matches!(unescape(r"\x4"), Err(Error::InvalidEscape(s)) if s == r"\x4"));
        assert!(matches!(unescape(r"\xzz"), Err(Error::InvalidEscape(_))));
        assert!(matches!(unescape(r"\u12"), Err(Error::InvalidEscape(_))));
    }

    #[test]
    fn test_surrogate_code_point_rejected() {
        assert!(matches!(unescape(r"\ud800"), Err(Error::InvalidEscape(_))));
    }
}
