//! The small ANSI escape subset the editor emits, plus the layout arithmetic
//! that decides where those escapes put the cursor.

use crate::Dimensions;

/// Save cursor position (`CSI s`).
pub const SAVE_CURSOR: &str = "\x1b[s";
/// Restore the position saved by [`SAVE_CURSOR`] (`CSI u`).
pub const RESTORE_CURSOR: &str = "\x1b[u";
/// Full terminal reset (`ESC c`).
pub const RESET_TERMINAL: &str = "\x1bc";
/// Line break used for everything the editor renders itself.
pub const NEWLINE: &str = "\r\n";

/// Erase from the cursor to the end of the screen (`CSI 0 J`).
pub const ERASE_TO_END: &str = "\x1b[0J";

/// Cursor movement directions for [`move_cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Right,
    Left,
}

impl Direction {
    fn final_byte(self) -> char {
        match self {
            Direction::Up => 'A',
            Direction::Down => 'B',
            Direction::Right => 'C',
            Direction::Left => 'D',
        }
    }
}

/// Appends a relative cursor movement to `out`. Moving by zero emits nothing,
/// since `CSI 0 C` means "one" to most terminals.
pub fn move_cursor(out: &mut String, direction: Direction, amount: usize) {
    if amount == 0 {
        return;
    }
    out.push_str(&format!("\x1b[{}{}", amount, direction.final_byte()));
}

/// Where the cursor lands relative to the start of the input area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPlacement {
    /// Rows below the first row of the input area.
    pub rows_down: usize,
    /// Zero-based column on that row.
    pub column: usize,
}

/// Computes the screen position of buffer index `index` when the line is drawn
/// after a prompt of `prompt_len` characters.
///
/// With known dimensions the absolute column wraps every `columns` cells;
/// without them the input area is treated as one unbounded row.
///
/// ```
/// use serialterm::ansi::{cursor_placement, CursorPlacement};
/// use serialterm::Dimensions;
///
/// let placement = cursor_placement(9, 3, Some(Dimensions::new(5, 24)));
/// assert_eq!(placement, CursorPlacement { rows_down: 2, column: 2 });
/// ```
pub fn cursor_placement(index: usize, prompt_len: usize, dims: Option<Dimensions>) -> CursorPlacement {
    let absolute = index + prompt_len;
    match dims.map(|d| usize::from(d.columns)) {
        Some(columns) if columns > 0 => CursorPlacement {
            rows_down: absolute / columns,
            column: absolute % columns,
        },
        _ => CursorPlacement {
            rows_down: 0,
            column: absolute,
        },
    }
}

/// Returns `true` if `text` ends on a fresh line: its trailing run of `\r`/`\n`
/// characters contains at least one of each.
pub fn ends_with_newline(text: &str) -> bool {
    let mut saw_cr = false;
    let mut saw_lf = false;
    for c in text.chars().rev() {
        match c {
            '\r' => saw_cr = true,
            '\n' => saw_lf = true,
            _ => break,
        }
    }
    saw_cr && saw_lf
}

/// Renders `data` as lowercase hex pairs separated by spaces.
///
/// When the terminal width is known a line break is inserted before a pair once
/// the current row has reached `columns - 3` cells, so the dump wraps on its own.
pub fn hex_dump(data: &[u8], dims: Option<Dimensions>) -> String {
    let wrap_at = dims.map(|d| usize::from(d.columns).saturating_sub(3));
    let mut out = String::with_capacity(data.len() * 3);
    let mut row_len = 0;

    for byte in data {
        if let Some(limit) = wrap_at {
            if row_len > 0 && row_len >= limit {
                out.push_str(NEWLINE);
                row_len = 0;
            }
        }
        out.push_str(&format!("{byte:02x} "));
        row_len += 3;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_move_cursor_zero_is_empty() {
        let mut out = String::new();
        move_cursor(&mut out, Direction::Right, 0);
        assert_eq!(out, "");
    }

    #[test]
    fn test_move_cursor_directions() {
        let mut out = String::new();
        move_cursor(&mut out, Direction::Up, 1);
        move_cursor(&mut out, Direction::Down, 2);
        move_cursor(&mut out, Direction::Right, 10);
        move_cursor(&mut out, Direction::Left, 3);
        assert_eq!(out, "\x1b[1A\x1b[2B\x1b[10C\x1b[3D");
    }

    #[test]
    fn test_cursor_placement_without_dimensions() {
        assert_eq!(
            cursor_placement(3, 3, None),
            CursorPlacement { rows_down: 0, column: 6 }
        );
    }

    #[test]
    fn test_cursor_placement_wraps() {
        let dims = Some(Dimensions::new(10, 5));
        assert_eq!(
            cursor_placement(6, 3, dims),
            CursorPlacement { rows_down: 0, column: 9 }
        );
        assert_eq!(
            cursor_placement(7, 3, dims),
            CursorPlacement { rows_down: 1, column: 0 }
        );
        assert_eq!(
            cursor_placement(25, 3, dims),
            CursorPlacement { rows_down: 2, column: 8 }
        );
    }

    #[test]
    fn test_cursor_placement_zero_columns_is_unbounded() {
        assert_eq!(
            cursor_placement(4, 3, Some(Dimensions::new(0, 0))),
            CursorPlacement { rows_down: 0, column: 7 }
        );
    }

    #[test]
    fn test_ends_with_newline() {
        assert!(ends_with_newline("data\r\n"));
        assert!(ends_with_newline("data\n\r"));
        assert!(ends_with_newline("data\r\r\n\n"));
        assert!(ends_with_newline("\n\n\r"));
        assert!(!ends_with_newline("data\n"));
        assert!(!ends_with_newline("data\r"));
        assert!(!ends_with_newline("data\r\nmore"));
        assert!(!ends_with_newline(""));
    }

    #[test]
    fn test_hex_dump_without_dimensions() {
        assert_eq!(hex_dump(&[0x00, 0x0a, 0xff], None), "00 0a ff ");
    }

    #[test]
    fn test_hex_dump_wraps_once_for_five_bytes() {
        let out = hex_dump(&[1, 2, 3, 4, 5], Some(Dimensions::new(10, 5)));
        assert_eq!(out, "01 02 03 \r\n04 05 ");
        assert_eq!(out.matches(NEWLINE).count(), 1);
    }

    #[test]
    fn test_hex_dump_narrow_terminal_never_breaks_before_first_pair() {
        let out = hex_dump(&[0xab, 0xcd], Some(Dimensions::new(2, 5)));
        assert_eq!(out, "ab \r\ncd ");
    }
}
