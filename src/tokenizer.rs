//! Keystroke tokenizer.
//!
//! Raw keystroke chunks are split into [`InputToken`]s by trying a fixed,
//! priority-ordered table of [`Pattern`]s against the head of the unconsumed
//! input. The first pattern that matches wins and reports how many bytes it
//! consumed. The last pattern matches any character, so every non-empty input
//! makes progress.
//!
//! Tokenizing is stateless: an escape sequence split across two chunks is not
//! reassembled, its pieces fall through to [`InputToken::Literal`].

const CSI: &str = "\x1b[";

/// Arrow keys, reported as `ESC [ A..D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    Up,
    Down,
    Right,
    Left,
}

/// A recognized unit of keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputToken {
    /// `\r`
    Enter,
    /// `\x7f`
    Backspace,
    /// `ESC [ 3 ~`
    Delete,
    Arrow(Arrow),
    /// `ESC [ H`
    Home,
    /// `ESC [ F`
    End,
    /// `ESC [ row ; col R`, sent by terminals answering a position query.
    CursorReport { row: u32, column: u32 },
    /// Any other character, inserted as typed.
    Literal(char),
}

/// One entry of the dispatch table: a name for tracing and a matcher returning
/// the token and the number of bytes it consumed.
#[derive(Debug, Clone, Copy)]
pub struct Pattern {
    pub name: &'static str,
    pub matcher: fn(&str) -> Option<(InputToken, usize)>,
}

/// Patterns in priority order.
pub const PATTERNS: &[Pattern] = &[
    Pattern { name: "enter", matcher: match_enter },
    Pattern { name: "backspace", matcher: match_backspace },
    Pattern { name: "delete", matcher: match_delete },
    Pattern { name: "arrow", matcher: match_arrow },
    Pattern { name: "home_end", matcher: match_home_end },
    Pattern { name: "cursor_report", matcher: match_cursor_report },
    Pattern { name: "literal", matcher: match_literal },
];

fn match_enter(input: &str) -> Option<(InputToken, usize)> {
    input.starts_with('\r').then_some((InputToken::Enter, 1))
}

fn match_backspace(input: &str) -> Option<(InputToken, usize)> {
    input.starts_with('\x7f').then_some((InputToken::Backspace, 1))
}

fn match_delete(input: &str) -> Option<(InputToken, usize)> {
    input.starts_with("\x1b[3~").then_some((InputToken::Delete, 4))
}

fn match_arrow(input: &str) -> Option<(InputToken, usize)> {
    let arrow = match input.strip_prefix(CSI)?.as_bytes().first()? {
        b'A' => Arrow::Up,
        b'B' => Arrow::Down,
        b'C' => Arrow::Right,
        b'D' => Arrow::Left,
        _ => return None,
    };
    Some((InputToken::Arrow(arrow), CSI.len() + 1))
}

fn match_home_end(input: &str) -> Option<(InputToken, usize)> {
    let token = match input.strip_prefix(CSI)?.as_bytes().first()? {
        b'H' => InputToken::Home,
        b'F' => InputToken::End,
        _ => return None,
    };
    Some((token, CSI.len() + 1))
}

fn match_cursor_report(input: &str) -> Option<(InputToken, usize)> {
    let body = input.strip_prefix(CSI)?;
    let (row, rest) = split_digits(body)?;
    let rest = rest.strip_prefix(';')?;
    let (column, rest) = split_digits(rest)?;
    rest.strip_prefix('R')?;

    let consumed = CSI.len() + row.len() + 1 + column.len() + 1;
    Some((
        InputToken::CursorReport {
            row: parse_saturating(row),
            column: parse_saturating(column),
        },
        consumed,
    ))
}

fn match_literal(input: &str) -> Option<(InputToken, usize)> {
    let c = input.chars().next()?;
    Some((InputToken::Literal(c), c.len_utf8()))
}

/// Parses a run of ASCII digits, clamping values that overflow `u32`.
fn parse_saturating(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

/// Splits a non-empty run of ASCII digits off the front of `s`.
fn split_digits(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    (end > 0).then(|| s.split_at(end))
}

/// Matches the head of `input` against [`PATTERNS`].
///
/// Returns the token and its length in bytes, or `None` for empty input.
pub fn next_token(input: &str) -> Option<(InputToken, usize)> {
    PATTERNS.iter().find_map(|pattern| {
        let found = (pattern.matcher)(input);
        if let Some((token, len)) = found {
            tracing::trace!(pattern = pattern.name, ?token, len, "matched input");
        }
        found
    })
}

/// Iterator over the tokens of one keystroke chunk.
///
/// ```
/// use serialterm::tokenizer::{tokenize, Arrow};
/// use serialterm::InputToken;
///
/// let tokens: Vec<_> = tokenize("a\x1b[D\r").collect();
/// assert_eq!(
///     tokens,
///     vec![
///         InputToken::Literal('a'),
///         InputToken::Arrow(Arrow::Left),
///         InputToken::Enter,
///     ]
/// );
/// ```
pub fn tokenize(input: &str) -> Tokens<'_> {
    Tokens { rest: input }
}

#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    /// The input not consumed yet.
    pub fn remainder(&self) -> &'a str {
        self.rest
    }
}

impl Iterator for Tokens<'_> {
    type Item = InputToken;

    fn next(&mut self) -> Option<InputToken> {
        if self.rest.is_empty() {
            return None;
        }
        match next_token(self.rest) {
            Some((token, len)) if len > 0 => {
                self.rest = &self.rest[len..];
                Some(token)
            }
            // Nothing consumed: stop rather than spin on the same bytes.
            _ => {
                self.rest = "";
                None
            }
        }
    }
}
