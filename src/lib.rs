//! Line-editing terminal front-end for serial devices and other duplex byte streams.
//!
//! This library sits between a human typing into a raw terminal and a byte-oriented
//! backend such as a serial port. It renders an editable input line with a prompt,
//! interleaves it with asynchronous data arriving from the backend without corrupting
//! the line, and supports the usual editing gestures using plain ANSI escape sequences.
//!
//! # Features
//!
//! - **Line editing**: Insert, backspace, delete, cursor movement, Home/End
//! - **Command history**: 1000-entry FIFO with up/down navigation
//! - **Smart history**: Skips empty lines and consecutive duplicates
//! - **Inbound interleaving**: Backend data is drawn above the input line, never through it
//! - **Hex mode**: Inbound bytes can be shown as a self-wrapping hex dump
//! - **Reconnect**: A disconnected device is polled until it reappears
//! - **Zero global state**: Every session owns its editor, history and command table
//!
//! # Quick Start
//!
//! ```
//! use serialterm::{EditorConfig, EditorEvent, LineEditor};
//!
//! let mut editor = LineEditor::new(EditorConfig::default());
//! editor.handle_input("ab\r");
//!
//! let submitted: Vec<String> = editor
//!     .drain_events()
//!     .into_iter()
//!     .filter_map(|event| match event {
//!         EditorEvent::Submit(line) => Some(line),
//!         EditorEvent::Output(_) => None,
//!     })
//!     .collect();
//!
//! assert_eq!(submitted, vec!["ab\r\n".to_string()]);
//! assert_eq!(editor.history().len(), 1);
//! ```
//!
//! # Architecture
//!
//! - [`LineEditor`]: Owns the edit state and produces ANSI output and submitted lines
//! - [`LineBuffer`]: Manages the in-progress line and the cursor inside it
//! - [`History`]: Bounded list of previously submitted lines
//! - [`Session`]: Wires a [`LineEditor`] to a [`Transport`] and its lifecycle events
//!
//! Host terminals are abstracted through the [`Terminal`] trait and backends through the
//! [`Transport`] trait, so the editing core never touches a file descriptor.

use std::collections::VecDeque;
use std::fmt;

pub mod ansi;
pub mod commands;
mod editor;
pub mod serial;
mod session;
pub mod terminals;
pub mod tokenizer;
pub mod transport;
mod unescape;
mod utf8;

pub use commands::{Command, CommandRegistry};
pub use editor::{EditorConfig, EditorEvent, LineEditor};
pub use session::{Session, SessionEvent, RECONNECT_INTERVAL};
pub use tokenizer::InputToken;
pub use transport::{DeviceInfo, DeviceLister, Transport, TransportEvent};
pub use unescape::unescape;
pub use utf8::Utf8Decoder;

/// Maximum number of entries kept in the command history.
pub const HISTORY_CAPACITY: usize = 1000;

/// Error type for serialterm operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A write was attempted on a transport that is not open
    #[error("{0} is not open")]
    NotOpen(String),
    /// The platform cannot configure the requested baud rate
    #[error("Unsupported baud rate {0}")]
    UnsupportedBaudRate(u32),
    /// The baud rate is not an integer greater than zero
    #[error("Invalid baud rate {0}. Must be an integer > 0")]
    InvalidBaudRate(String),
    /// A malformed `\x` or `\u` escape in a configuration string
    #[error("Invalid escape sequence `{0}`")]
    InvalidEscape(String),
    /// The requested device does not exist
    #[error("Device {0} not found")]
    DeviceNotFound(String),
}

/// Result type for serialterm operations
pub type Result<T> = core::result::Result<T, Error>;

/// Size of the host terminal in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub columns: u16,
    pub rows: u16,
}

impl Dimensions {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self { columns, rows }
    }
}

/// Host terminal abstraction: the surface the editor's ANSI output is written to.
///
/// Keystrokes are read separately (see [`terminals::spawn_input_reader`]) so that
/// a blocking read never holds up rendering of backend data.
///
/// # Example
///
/// ```
/// use serialterm::{Dimensions, Result, Terminal};
///
/// struct MockTerminal {
///     output: Vec<u8>,
/// }
///
/// impl Terminal for MockTerminal {
///     fn write(&mut self, data: &[u8]) -> Result<()> {
///         self.output.extend_from_slice(data);
///         Ok(())
///     }
///
///     // ... implement other methods
/// #   fn flush(&mut self) -> Result<()> { Ok(()) }
/// #   fn enter_raw_mode(&mut self) -> Result<()> { Ok(()) }
/// #   fn exit_raw_mode(&mut self) -> Result<()> { Ok(()) }
/// #   fn dimensions(&self) -> Option<Dimensions> { None }
/// }
/// ```
pub trait Terminal {
    /// Writes raw bytes (UTF-8 text and ANSI escapes) to the output.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Flushes any buffered output.
    ///
    /// Called after every batch of editor output to ensure immediate visual feedback.
    fn flush(&mut self) -> Result<()>;

    /// Enters raw mode for keystroke-by-keystroke input.
    ///
    /// Should disable line buffering, echo and signal generation so that Enter arrives
    /// as `\r` and Ctrl-C arrives as `\x03`.
    fn enter_raw_mode(&mut self) -> Result<()>;

    /// Exits raw mode and restores the terminal settings saved by [`Terminal::enter_raw_mode`].
    fn exit_raw_mode(&mut self) -> Result<()>;

    /// Returns the current terminal size, or `None` if it cannot be determined.
    fn dimensions(&self) -> Option<Dimensions>;
}

/// Text buffer with cursor tracking for line editing operations.
///
/// Stores the line as Unicode scalar values so that the cursor index and the
/// column arithmetic used for redraws count the same units.
///
/// This struct is typically not used directly - instead use [`LineEditor`] which
/// drives it from keystrokes.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    buffer: Vec<char>,
    cursor_pos: usize,
}

impl LineBuffer {
    /// Creates a new line buffer with the specified capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use serialterm::LineBuffer;
    ///
    /// let buffer = LineBuffer::new(256);
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            cursor_pos: 0,
        }
    }

    /// Clears the buffer and resets the cursor to the start.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor_pos = 0;
    }

    /// Returns the length of the buffer in characters.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the current cursor position in characters from the start.
    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    /// Inserts a character at the cursor position, moving the cursor forward.
    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor_pos, c);
        self.cursor_pos += 1;
    }

    /// Deletes the character before the cursor (backspace operation).
    ///
    /// Returns `true` if a character was deleted, `false` if the cursor is at the start.
    pub fn delete_before_cursor(&mut self) -> bool {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            self.buffer.remove(self.cursor_pos);
            true
        } else {
            false
        }
    }

    /// Deletes the character at the cursor (delete key operation).
    ///
    /// Returns `true` if a character was deleted, `false` if the cursor is at the end.
    pub fn delete_at_cursor(&mut self) -> bool {
        if self.cursor_pos < self.buffer.len() {
            self.buffer.remove(self.cursor_pos);
            true
        } else {
            false
        }
    }

    /// Moves the cursor one position to the left.
    ///
    /// Returns `true` if the cursor moved, `false` if already at the start.
    pub fn move_cursor_left(&mut self) -> bool {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            true
        } else {
            false
        }
    }

    /// Moves the cursor one position to the right.
    ///
    /// Returns `true` if the cursor moved, `false` if already at the end.
    pub fn move_cursor_right(&mut self) -> bool {
        if self.cursor_pos < self.buffer.len() {
            self.cursor_pos += 1;
            true
        } else {
            false
        }
    }

    /// Moves the cursor to the start of the line.
    ///
    /// Returns the number of positions the cursor moved.
    pub fn move_cursor_to_start(&mut self) -> usize {
        let old_pos = self.cursor_pos;
        self.cursor_pos = 0;
        old_pos
    }

    /// Moves the cursor to the end of the line.
    ///
    /// Returns the number of positions the cursor moved.
    pub fn move_cursor_to_end(&mut self) -> usize {
        let old_pos = self.cursor_pos;
        self.cursor_pos = self.buffer.len();
        self.buffer.len() - old_pos
    }

    /// Loads text into the buffer, replacing existing content.
    ///
    /// The cursor is positioned at the end of the loaded text.
    /// Used internally for history navigation.
    pub fn load(&mut self, text: &str) {
        self.buffer.clear();
        self.buffer.extend(text.chars());
        self.cursor_pos = self.buffer.len();
    }
}

impl fmt::Display for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.buffer.iter().try_for_each(|c| fmt::Write::write_char(f, *c))
    }
}

/// Command history with FIFO eviction and an index-based browsing cursor.
///
/// The cursor ranges over `0..=len`; `len` means "not browsing", i.e. the user is
/// on a fresh line. Empty lines and consecutive duplicates are never stored.
///
/// # Examples
///
/// ```
/// use serialterm::History;
///
/// let mut hist = History::new(50);
/// hist.add("first command");
/// hist.add("second command");
///
/// // Navigate through history
/// assert_eq!(hist.previous(), Some("second command"));
/// assert_eq!(hist.previous(), Some("first command"));
/// assert_eq!(hist.next_entry(), Some("second command"));
/// assert_eq!(hist.next_entry(), Some(""));
/// ```
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl History {
    /// Creates a new history holding at most `capacity` entries.
    ///
    /// When the capacity is exceeded, the oldest entry is evicted.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            cursor: 0,
        }
    }

    /// Adds a line to the history.
    ///
    /// Empty lines and lines equal to the most recent entry are skipped.
    /// Returns `true` if the line was stored.
    pub fn add(&mut self, line: &str) -> bool {
        if line.is_empty() || self.capacity == 0 {
            return false;
        }

        if self.entries.back().is_some_and(|last| last == line) {
            return false;
        }

        self.entries.push_back(line.to_string());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.cursor.min(self.entries.len());

        true
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept; the oldest is evicted beyond this.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current browsing position; equal to [`len`](Self::len) when not browsing.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the entry at `index`, oldest first.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Returns the most recently stored entry.
    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    /// Iterates over the entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Navigates to the previous (older) history entry.
    ///
    /// Returns `None` if already at the oldest entry.
    pub fn previous(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.get(self.cursor)
    }

    /// Navigates to the next (newer) history entry.
    ///
    /// Stepping past the newest entry yields the empty fresh line. Returns `None`
    /// if not currently browsing.
    pub fn next_entry(&mut self) -> Option<&str> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.get(self.cursor).unwrap_or(""))
    }

    /// Resets the browsing cursor to the fresh line.
    pub fn reset_view(&mut self) {
        self.cursor = self.entries.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // LineBuffer tests
    #[test]
    fn test_line_buffer_insert() {
        let mut buf = LineBuffer::new(100);
        buf.insert_char('h');
        buf.insert_char('i');
        assert_eq!(buf.to_string(), "hi");
        assert_eq!(buf.cursor_pos(), 2);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_line_buffer_backspace() {
        let mut buf = LineBuffer::new(100);
        buf.insert_char('h');
        buf.insert_char('i');
        assert!(buf.delete_before_cursor());
        assert_eq!(buf.to_string(), "h");
        assert_eq!(buf.cursor_pos(), 1);
    }

    #[test]
    fn test_line_buffer_backspace_at_start() {
        let mut buf = LineBuffer::new(100);
        assert!(!buf.delete_before_cursor());
        assert_eq!(buf.cursor_pos(), 0);
    }

    #[test]
    fn test_line_buffer_delete() {
        let mut buf = LineBuffer::new(100);
        buf.insert_char('h');
        buf.insert_char('i');
        buf.move_cursor_left();
        assert!(buf.delete_at_cursor());
        assert_eq!(buf.to_string(), "h");
        assert_eq!(buf.cursor_pos(), 1);
        assert!(!buf.delete_at_cursor()); // at end
    }

    #[test]
    fn test_line_buffer_cursor_movement() {
        let mut buf = LineBuffer::new(100);
        buf.insert_char('h');
        buf.insert_char('e');
        buf.insert_char('y');
        assert_eq!(buf.cursor_pos(), 3);

        assert!(buf.move_cursor_left());
        assert_eq!(buf.cursor_pos(), 2);

        assert!(buf.move_cursor_right());
        assert_eq!(buf.cursor_pos(), 3);

        assert!(!buf.move_cursor_right()); // at end
    }

    #[test]
    fn test_line_buffer_home_end() {
        let mut buf = LineBuffer::new(100);
        buf.load("hey");

        assert_eq!(buf.move_cursor_to_start(), 3);
        assert_eq!(buf.cursor_pos(), 0);

        assert_eq!(buf.move_cursor_to_end(), 3);
        assert_eq!(buf.cursor_pos(), 3);
    }

    #[test]
    fn test_line_buffer_insert_middle() {
        let mut buf = LineBuffer::new(100);
        buf.insert_char('h');
        buf.insert_char('e');
        buf.move_cursor_left();
        buf.insert_char('x');
        assert_eq!(buf.to_string(), "hxe");
        assert_eq!(buf.cursor_pos(), 2);
    }

    #[test]
    fn test_line_buffer_counts_characters() {
        let mut buf = LineBuffer::new(100);
        buf.insert_char('ä');
        buf.insert_char('ö');
        buf.insert_char('🦀');
        assert_eq!(buf.to_string(), "äö🦀");
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.cursor_pos(), 3);
    }

    #[test]
    fn test_line_buffer_load() {
        let mut buf = LineBuffer::new(100);
        buf.insert_char('x');
        buf.load("hello world");
        assert_eq!(buf.to_string(), "hello world");
        assert_eq!(buf.cursor_pos(), 11);
    }

    // History tests
    #[test]
    fn test_history_add() {
        let mut hist = History::new(10);
        assert!(hist.add("first"));
        assert!(hist.add("second"));
        hist.reset_view();

        assert_eq!(hist.previous(), Some("second"));
        assert_eq!(hist.previous(), Some("first"));
        assert_eq!(hist.previous(), None); // no more
    }

    #[test]
    fn test_history_skip_empty() {
        let mut hist = History::new(10);
        hist.add("first");
        assert!(!hist.add(""));
        hist.add("second");

        assert_eq!(hist.iter().collect::<Vec<_>>(), vec!["first", "second"]);
    }

    #[test]
    fn test_history_skip_adjacent_duplicates() {
        let mut hist = History::new(10);
        hist.add("test");
        assert!(!hist.add("test"));
        hist.add("other");
        assert!(hist.add("test")); // not adjacent any more

        assert_eq!(hist.iter().collect::<Vec<_>>(), vec!["test", "other", "test"]);
    }

    #[test]
    fn test_history_navigation() {
        let mut hist = History::new(10);
        hist.add("first");
        hist.add("second");
        hist.reset_view();
        assert_eq!(hist.cursor(), 2);

        assert_eq!(hist.previous(), Some("second"));
        assert_eq!(hist.previous(), Some("first"));
        assert_eq!(hist.next_entry(), Some("second"));
        assert_eq!(hist.next_entry(), Some(""));
        assert_eq!(hist.next_entry(), None);
        assert_eq!(hist.cursor(), 2);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut hist = History::new(3);
        hist.add("first");
        hist.add("second");
        hist.add("third");
        hist.add("fourth");

        assert_eq!(hist.len(), 3);
        assert_eq!(hist.get(0), Some("second"));
        assert_eq!(hist.last(), Some("fourth"));
    }

    #[test]
    fn test_history_default_capacity() {
        let mut hist = History::default();
        for i in 0..1500 {
            hist.add(&format!("line {i}"));
        }

        assert_eq!(hist.len(), HISTORY_CAPACITY);
        assert_eq!(hist.get(0), Some("line 500"));
        assert_eq!(hist.last(), Some("line 1499"));
    }
}
