//! The line editor: edit state, keystroke dispatch and the redraw protocol.
//!
//! The editor never writes anywhere itself. Every operation appends
//! [`EditorEvent`]s to an internal queue which the host drains with
//! [`LineEditor::drain_events`] and delivers however it likes.
//!
//! Screen layout is anchored on a saved cursor position: inbound data is drawn
//! from the anchor, the anchor is moved to the end of that data, and the input
//! area (prompt plus buffer) is redrawn below it. The input line is therefore
//! always the last thing on screen.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::ansi::{
    self, Direction, ERASE_TO_END, NEWLINE, RESET_TERMINAL, RESTORE_CURSOR, SAVE_CURSOR,
};
use crate::tokenizer::{tokenize, Arrow, InputToken};
use crate::{CommandRegistry, Dimensions, History, LineBuffer, Utf8Decoder, HISTORY_CAPACITY};

/// Initial editor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Decode inbound bytes as UTF-8 text (`true`) or show them as a hex dump.
    pub translate_as_text: bool,
    /// Appended to every submitted line before it is handed to the backend.
    pub line_end: String,
    /// Drawn in front of the edit buffer.
    pub prompt: String,
    pub history_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            translate_as_text: true,
            line_end: "\r\n".to_string(),
            prompt: ">: ".to_string(),
            history_capacity: HISTORY_CAPACITY,
        }
    }
}

/// Output of the editor, in the order it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// ANSI text for the rendering surface.
    Output(String),
    /// A submitted line with the line terminator already appended.
    Submit(String),
}

/// Line editor with history, prompt and inbound-data interleaving.
///
/// # Key Bindings
///
/// - **Enter**: Submit the line
/// - **Backspace/Delete**: Delete before/at the cursor
/// - **Left/Right, Home/End**: Move the cursor
/// - **Up/Down**: Browse history
///
/// # Examples
///
/// ```
/// use serialterm::{EditorConfig, LineEditor};
///
/// let mut editor = LineEditor::new(EditorConfig::default());
/// editor.handle_input("helo\x1b[D\x1b[Dl");
/// assert_eq!(editor.contents(), "hello");
/// assert_eq!(editor.cursor_index(), 3);
/// ```
#[derive(Debug)]
pub struct LineEditor {
    line: LineBuffer,
    history: History,
    prompt: String,
    line_end: String,
    dimensions: Option<Dimensions>,
    ends_with_newline: bool,
    translate_as_text: bool,
    decoder: Utf8Decoder,
    commands: CommandRegistry,
    events: VecDeque<EditorEvent>,
}

impl LineEditor {
    /// Creates an editor with the default command registry (`clear`/`cls`).
    pub fn new(config: EditorConfig) -> Self {
        Self::with_commands(config, CommandRegistry::with_defaults())
    }

    /// Creates an editor with an explicit command registry.
    pub fn with_commands(config: EditorConfig, commands: CommandRegistry) -> Self {
        Self {
            line: LineBuffer::new(256),
            history: History::new(config.history_capacity),
            prompt: config.prompt,
            line_end: config.line_end,
            dimensions: None,
            ends_with_newline: false,
            translate_as_text: config.translate_as_text,
            decoder: Utf8Decoder::new(),
            commands,
            events: VecDeque::new(),
        }
    }

    /// Anchors the editor at the current cursor position, sets the initial
    /// dimensions and draws the input area.
    pub fn open(&mut self, dimensions: Option<Dimensions>) {
        self.dimensions = dimensions;
        let mut out = String::from(SAVE_CURSOR);
        out.push_str(&self.redraw_input_area());
        self.emit(out);
    }

    /// Removes and returns every queued event.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    /// Returns `true` if output or submitted lines are waiting to be drained.
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Renders a chunk of backend data above the input line.
    ///
    /// In text mode the chunk is decoded as UTF-8; an incomplete sequence at the
    /// end of a chunk is held back until the next chunk completes it. In hex mode
    /// every byte is shown as a hex pair.
    pub fn render_inbound(&mut self, chunk: &[u8]) {
        let rendered = if self.translate_as_text {
            self.decoder.decode(chunk)
        } else {
            ansi::hex_dump(chunk, self.dimensions)
        };
        if rendered.is_empty() {
            return;
        }
        self.render_rendered(&rendered);
    }

    /// Renders `text` through the inbound path with text mode forced on.
    ///
    /// Used for echoes, banners and status messages that must never be hex dumped.
    pub fn render_inbound_text(&mut self, text: &str) {
        self.render_rendered(text);
    }

    fn render_rendered(&mut self, rendered: &str) {
        let mut out = String::with_capacity(rendered.len() + 32);
        out.push_str(RESTORE_CURSOR);
        out.push_str(ERASE_TO_END);
        self.ends_with_newline = ansi::ends_with_newline(rendered);
        out.push_str(rendered);
        out.push_str(SAVE_CURSOR);
        out.push_str(&self.redraw_input_area());
        self.emit(out);
    }

    /// Returns the ANSI text that redraws the prompt and buffer below the anchor
    /// and leaves the cursor at the buffer's cursor index.
    pub fn redraw_input_area(&self) -> String {
        let mut out = String::new();
        out.push_str(RESTORE_CURSOR);
        if !self.ends_with_newline {
            out.push_str(NEWLINE);
        }
        out.push_str(ERASE_TO_END);
        out.push_str(&self.prompt);
        out.push_str(&self.line.to_string());
        out.push_str(&self.cursor_sequence(self.line.cursor_pos()));
        out
    }

    /// Escape sequence placing the cursor at buffer index `index`.
    fn cursor_sequence(&self, index: usize) -> String {
        let mut out = String::from(RESTORE_CURSOR);
        if !self.ends_with_newline {
            ansi::move_cursor(&mut out, Direction::Down, 1);
        }
        out.push('\r');
        let placement = ansi::cursor_placement(index, self.prompt.chars().count(), self.dimensions);
        ansi::move_cursor(&mut out, Direction::Down, placement.rows_down);
        ansi::move_cursor(&mut out, Direction::Right, placement.column);
        out
    }

    /// Consumes a raw keystroke chunk.
    pub fn handle_input(&mut self, raw: &str) {
        for token in tokenize(raw) {
            self.apply(token);
        }
    }

    fn apply(&mut self, token: InputToken) {
        match token {
            InputToken::Enter => self.submit(),
            InputToken::Backspace => {
                if self.line.delete_before_cursor() {
                    self.emit_redraw();
                }
            }
            InputToken::Delete => {
                self.line.delete_at_cursor();
                self.emit_redraw();
            }
            InputToken::Arrow(Arrow::Up) => {
                if let Some(entry) = self.history.previous().map(str::to_owned) {
                    self.line.load(&entry);
                    self.emit_redraw();
                }
            }
            InputToken::Arrow(Arrow::Down) => {
                if let Some(entry) = self.history.next_entry().map(str::to_owned) {
                    self.line.load(&entry);
                    self.emit_redraw();
                }
            }
            InputToken::Arrow(Arrow::Right) => {
                self.line.move_cursor_right();
                self.emit_cursor();
            }
            InputToken::Arrow(Arrow::Left) => {
                self.line.move_cursor_left();
                self.emit_cursor();
            }
            InputToken::Home => {
                self.line.move_cursor_to_start();
                self.emit_cursor();
            }
            InputToken::End => {
                self.line.move_cursor_to_end();
                self.emit_cursor();
            }
            InputToken::CursorReport { row, column } => {
                trace!(row, column, "ignoring cursor position report");
            }
            InputToken::Literal(c) => {
                self.line.insert_char(c);
                self.emit_redraw();
            }
        }
    }

    fn submit(&mut self) {
        let line = self.line.to_string();
        if self.history.add(&line) {
            trace!(len = self.history.len(), "stored history entry");
        }

        if !self.ends_with_newline {
            self.render_inbound_text(NEWLINE);
        }
        let echo = format!("{}{}{}", self.prompt, line, NEWLINE);
        self.render_inbound_text(&echo);

        if !self.run_commands(&line) {
            debug!(line = %line, "submitting line");
            self.events
                .push_back(EditorEvent::Submit(format!("{}{}", line, self.line_end)));
        }

        self.history.reset_view();
        self.line.clear();
        self.emit_redraw();
    }

    /// Runs every command matching `line`. Returns `true` if any matched.
    fn run_commands(&mut self, line: &str) -> bool {
        let mut commands = std::mem::take(&mut self.commands);
        let mut handled = false;
        for command in commands.matching(line) {
            debug!(command = command.name(), "running local command");
            command.run(self);
            handled = true;
        }
        // Keep anything an action registered while the table was taken out.
        let mut added = std::mem::replace(&mut self.commands, CommandRegistry::new());
        commands.append(&mut added);
        self.commands = commands;
        handled
    }

    /// Resets the terminal and the edit line, keeping history.
    pub fn clear(&mut self) {
        self.history.reset_view();
        self.line.clear();
        self.ends_with_newline = true;
        let mut out = String::from(RESET_TERMINAL);
        out.push_str(SAVE_CURSOR);
        out.push_str(&self.redraw_input_area());
        self.emit(out);
    }

    /// Replaces the prompt and redraws the input area.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.emit_redraw();
    }

    /// Sets the terminator appended to submitted lines. Nothing is redrawn.
    pub fn set_line_end(&mut self, line_end: impl Into<String>) {
        self.line_end = line_end.into();
    }

    /// Switches inbound rendering between text (`true`) and hex dump (`false`).
    pub fn set_translate_as_text(&mut self, translate_as_text: bool) {
        self.translate_as_text = translate_as_text;
    }

    pub fn toggle_translate(&mut self) {
        self.set_translate_as_text(!self.translate_as_text);
    }

    /// Updates the terminal size used for wrapping and redraws the input area.
    pub fn set_dimensions(&mut self, dimensions: Option<Dimensions>) {
        self.dimensions = dimensions;
        self.emit_redraw();
    }

    /// Terminal size last given to [`open`](Self::open) or
    /// [`set_dimensions`](Self::set_dimensions); `None` means no wrapping.
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Terminator appended to every submitted line.
    pub fn line_end(&self) -> &str {
        &self.line_end
    }

    pub fn translate_as_text(&self) -> bool {
        self.translate_as_text
    }

    /// Whether the last rendered inbound text left the anchor at the start of a line.
    pub fn ends_with_newline(&self) -> bool {
        self.ends_with_newline
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Local commands checked on every submitted line.
    ///
    /// Commands registered from inside a running command's action take effect
    /// from the next submitted line.
    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    /// The in-progress line.
    pub fn contents(&self) -> String {
        self.line.to_string()
    }

    pub fn cursor_index(&self) -> usize {
        self.line.cursor_pos()
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.line
    }

    fn emit_redraw(&mut self) {
        let out = self.redraw_input_area();
        self.emit(out);
    }

    fn emit_cursor(&mut self) {
        let out = self.cursor_sequence(self.line.cursor_pos());
        self.emit(out);
    }

    fn emit(&mut self, out: String) {
        if !out.is_empty() {
            self.events.push_back(EditorEvent::Output(out));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Command;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn editor() -> LineEditor {
        LineEditor::new(EditorConfig::default())
    }

    fn submitted(editor: &mut LineEditor) -> Vec<String> {
        editor
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                EditorEvent::Submit(line) => Some(line),
                EditorEvent::Output(_) => None,
            })
            .collect()
    }

    fn output(editor: &mut LineEditor) -> String {
        editor
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                EditorEvent::Output(text) => Some(text),
                EditorEvent::Submit(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_basic_echo() {
        let mut editor = editor();
        editor.handle_input("ab\r");

        assert_eq!(submitted(&mut editor), vec!["ab\r\n".to_string()]);
        assert_eq!(editor.history().iter().collect::<Vec<_>>(), vec!["ab"]);
        assert_eq!(editor.contents(), "");
        assert_eq!(editor.cursor_index(), 0);
    }

    #[test]
    fn test_enter_echoes_prompt_and_line() {
        let mut editor = editor();
        editor.handle_input("ab");
        editor.drain_events();
        editor.handle_input("\r");

        let out = output(&mut editor);
        assert!(out.contains(">: ab\r\n"), "echo missing from {out:?}");
        assert!(editor.ends_with_newline());
    }

    #[test]
    fn test_empty_enter_submits_terminator_without_history() {
        let mut editor = editor();
        editor.handle_input("\r");

        assert_eq!(submitted(&mut editor), vec!["\r\n".to_string()]);
        assert!(editor.history().is_empty());
    }

    #[test]
    fn test_duplicate_submission_stored_once() {
        let mut editor = editor();
        editor.handle_input("ls\rls\r");

        assert_eq!(submitted(&mut editor).len(), 2);
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_history_bound_through_enter() {
        let mut editor = editor();
        for i in 0..HISTORY_CAPACITY + 5 {
            editor.handle_input(&format!("l{i}\r"));
            editor.drain_events();
        }

        assert_eq!(editor.history().len(), HISTORY_CAPACITY);
        assert_eq!(editor.history().get(0), Some("l5"));
        assert_eq!(editor.history().cursor(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_custom_line_end() {
        let mut editor = LineEditor::new(EditorConfig {
            line_end: "\n".to_string(),
            ..EditorConfig::default()
        });
        editor.handle_input("x\r");
        editor.set_line_end(";");
        editor.handle_input("y\r");

        assert_eq!(submitted(&mut editor), vec!["x\n".to_string(), "y;".to_string()]);
    }

    #[test]
    fn test_history_browse() {
        let mut editor = editor();
        editor.handle_input("first\rsecond\r");
        assert_eq!(editor.history().cursor(), 2);

        editor.handle_input("\x1b[A");
        assert_eq!(editor.contents(), "second");
        assert_eq!(editor.cursor_index(), 6);

        editor.handle_input("\x1b[A");
        assert_eq!(editor.contents(), "first");

        editor.handle_input("\x1b[B");
        assert_eq!(editor.contents(), "second");

        editor.handle_input("\x1b[B");
        assert_eq!(editor.contents(), "");
        assert_eq!(editor.cursor_index(), 0);
    }

    #[test]
    fn test_up_on_empty_history_is_noop() {
        let mut editor = editor();
        editor.handle_input("abc\x1b[A");
        assert_eq!(editor.contents(), "abc");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut editor = editor();
        editor.handle_input("\x7f");

        assert_eq!(editor.contents(), "");
        assert_eq!(editor.cursor_index(), 0);
        assert!(!editor.has_events());
    }

    #[test]
    fn test_backspace_in_middle() {
        let mut editor = editor();
        editor.handle_input("abc\x1b[D\x7f");
        assert_eq!(editor.contents(), "ac");
        assert_eq!(editor.cursor_index(), 1);
    }

    #[test]
    fn test_delete_at_cursor() {
        let mut editor = editor();
        editor.handle_input("abc\x1b[H\x1b[3~");
        assert_eq!(editor.contents(), "bc");
        assert_eq!(editor.cursor_index(), 0);

        editor.handle_input("\x1b[F\x1b[3~");
        assert_eq!(editor.contents(), "bc");
    }

    #[test]
    fn test_left_right_clamp() {
        let mut editor = editor();
        editor.handle_input("ab\x1b[C\x1b[C");
        assert_eq!(editor.cursor_index(), 2);

        editor.handle_input("\x1b[D\x1b[D\x1b[D\x1b[D");
        assert_eq!(editor.cursor_index(), 0);
    }

    #[test]
    fn test_home_end_do_not_drop_following_input() {
        let mut editor = editor();
        editor.handle_input("bc\x1b[Ha\x1b[Fd");
        assert_eq!(editor.contents(), "abcd");
        assert_eq!(editor.cursor_index(), 4);
    }

    #[test]
    fn test_cursor_report_is_discarded() {
        let mut editor = editor();
        editor.handle_input("a\x1b[10;20Rb");
        assert_eq!(editor.contents(), "ab");
    }

    #[test]
    fn test_redraw_places_cursor_after_prompt_and_text() {
        let mut editor = editor();
        editor.handle_input("abc");

        let redraw = editor.redraw_input_area();
        assert!(redraw.contains(">: abc"));
        assert!(redraw.ends_with("\x1b[6C"), "unexpected redraw {redraw:?}");
    }

    #[test]
    fn test_redraw_exact_sequence() {
        let mut editor = editor();
        editor.handle_input("abc\x1b[D");

        assert_eq!(
            editor.redraw_input_area(),
            "\x1b[u\r\n\x1b[0J>: abc\x1b[u\x1b[1B\r\x1b[5C"
        );
    }

    #[test]
    fn test_cursor_movement_only_repositions() {
        let mut editor = editor();
        editor.handle_input("abc");
        editor.drain_events();
        editor.handle_input("\x1b[D");

        assert_eq!(output(&mut editor), "\x1b[u\x1b[1B\r\x1b[5C");
    }

    #[test]
    fn test_cursor_wraps_with_dimensions() {
        let mut editor = editor();
        editor.open(Some(Dimensions::new(10, 5)));
        editor.handle_input("abcdefghij");
        editor.drain_events();
        editor.handle_input("\x1b[H");
        assert_eq!(output(&mut editor), "\x1b[u\x1b[1B\r\x1b[3C");

        editor.handle_input("\x1b[F");
        // prompt 3 + 10 chars = column 13 -> one row down, column 3
        assert_eq!(output(&mut editor), "\x1b[u\x1b[1B\r\x1b[1B\x1b[3C");
    }

    #[test]
    fn test_render_inbound_text() {
        let mut editor = editor();
        editor.render_inbound(b"hello\r\n");

        let out = output(&mut editor);
        assert!(out.starts_with("\x1b[u\x1b[0Jhello\r\n\x1b[s\x1b[u"));
        assert!(out.ends_with(">: \x1b[u\r\x1b[3C"));
        assert!(editor.ends_with_newline());

        editor.render_inbound(b"partial");
        assert!(!editor.ends_with_newline());
    }

    #[test]
    fn test_render_inbound_keeps_input_line_last() {
        let mut editor = editor();
        editor.handle_input("cmd");
        editor.drain_events();
        editor.render_inbound(b"data");

        let out = output(&mut editor);
        let data_at = out.find("data").unwrap_or_default();
        let input_at = out.rfind(">: cmd").unwrap_or_default();
        assert!(input_at > data_at);
    }

    #[test]
    fn test_render_inbound_joins_split_utf8() {
        let mut editor = editor();
        let bytes = "ä".as_bytes();
        editor.render_inbound(&bytes[..1]);
        editor.render_inbound(&bytes[1..]);

        let out = output(&mut editor);
        assert!(out.contains('ä'));
        assert!(!out.contains('\u{fffd}'));
    }

    #[test]
    fn test_render_inbound_joins_split_utf8_after_invalid_byte() {
        let mut editor = editor();
        editor.render_inbound(&[0xff, 0xc3]);
        editor.render_inbound(&[0xa4, b'\r', b'\n']);

        let out = output(&mut editor);
        assert!(out.contains("ä\r\n"));
        assert_eq!(out.matches('\u{fffd}').count(), 1);
        assert!(editor.ends_with_newline());
    }

    #[test]
    fn test_hex_mode_wrapping() {
        let mut editor = LineEditor::new(EditorConfig {
            translate_as_text: false,
            ..EditorConfig::default()
        });
        editor.open(Some(Dimensions::new(10, 5)));
        editor.drain_events();
        editor.render_inbound(&[1, 2, 3, 4, 5]);

        let out = output(&mut editor);
        assert!(out.contains("01 02 03 \r\n04 05 "), "unexpected hex dump {out:?}");
        assert!(!editor.ends_with_newline());
    }

    #[test]
    fn test_inbound_text_forced_in_hex_mode() {
        let mut editor = editor();
        editor.toggle_translate();
        assert!(!editor.translate_as_text());

        editor.render_inbound_text("status\r\n");
        assert!(output(&mut editor).contains("status\r\n"));
        assert!(!editor.translate_as_text());
    }

    #[test]
    fn test_clear_command_is_not_submitted() {
        let mut editor = editor();
        editor.handle_input("abc\rclear\r");

        let events = editor.drain_events();
        let submits: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, EditorEvent::Submit(_)))
            .collect();
        assert_eq!(submits, vec![&EditorEvent::Submit("abc\r\n".to_string())]);
        assert!(events
            .iter()
            .any(|e| matches!(e, EditorEvent::Output(o) if o.contains(RESET_TERMINAL))));
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_empty_registry_submits_everything() {
        let mut editor = LineEditor::with_commands(EditorConfig::default(), CommandRegistry::new());
        editor.handle_input("cls\r");
        assert_eq!(submitted(&mut editor), vec!["cls\r\n".to_string()]);
    }

    #[test]
    fn test_registered_command_runs_on_editor() {
        let mut editor = editor();
        editor
            .commands_mut()
            .register(Command::exact(&[".hex"], "Toggle hex", LineEditor::toggle_translate));
        editor.handle_input(".hex\r");

        assert!(!editor.translate_as_text());
        assert!(submitted(&mut editor).is_empty());
        assert_eq!(editor.commands_mut().len(), 2);
    }

    #[test]
    fn test_command_registered_by_action_is_kept() {
        let mut editor = editor();
        editor.commands_mut().register(Command::exact(&[".learn"], "Adds .ping", |e| {
            e.commands_mut().register(Command::exact(&[".ping"], "Changes the prompt", |e| {
                e.set_prompt("pong> ")
            }));
        }));

        editor.handle_input(".learn\r");
        assert_eq!(editor.commands_mut().len(), 3);

        editor.handle_input(".ping\r");
        assert_eq!(editor.prompt(), "pong> ");
        assert!(submitted(&mut editor).is_empty());
    }

    #[test]
    fn test_set_dimensions_redraws_with_wrapping() {
        let mut editor = editor();
        editor.handle_input("abcdefghij");
        editor.drain_events();

        editor.set_dimensions(Some(Dimensions::new(10, 5)));
        assert_eq!(editor.dimensions(), Some(Dimensions::new(10, 5)));
        // prompt 3 + 10 chars = column 13 -> one row down, column 3
        assert_eq!(
            output(&mut editor),
            "\x1b[u\r\n\x1b[0J>: abcdefghij\x1b[u\x1b[1B\r\x1b[1B\x1b[3C"
        );

        editor.set_dimensions(None);
        assert!(output(&mut editor).ends_with("\x1b[u\x1b[1B\r\x1b[13C"));
    }

    #[test]
    fn test_set_prompt_redraws() {
        let mut editor = editor();
        editor.set_prompt("$ ");
        assert!(output(&mut editor).contains("$ "));
        assert_eq!(editor.prompt(), "$ ");
    }

    #[test]
    fn test_literal_inserts_whole_code_point() {
        let mut editor = editor();
        editor.handle_input("a🦀b");
        assert_eq!(editor.contents(), "a🦀b");
        assert_eq!(editor.cursor_index(), 3);
    }

    #[test]
    fn test_unrecognized_escape_terminates() {
        let mut editor = editor();
        editor.handle_input("\x1b[Z\x1b[");
        assert_eq!(editor.contents(), "\x1b[Z\x1b[");
    }

    fn keystroke() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "a", "b", "ä", "\x7f", "\x1b[3~", "\x1b[A", "\x1b[B", "\x1b[C", "\x1b[D", "\x1b[H",
            "\x1b[F", "\r", "\x1b[1;1R", "\x1b", "[",
        ])
    }

    proptest! {
        #[test]
        fn prop_cursor_stays_in_bounds(keys in prop::collection::vec(keystroke(), 0..64)) {
            let mut editor = editor();
            for key in keys {
                editor.handle_input(key);
                prop_assert!(editor.cursor_index() <= editor.buffer().len());
            }
        }

        #[test]
        fn prop_handle_input_terminates(input in ".*") {
            let mut editor = editor();
            editor.handle_input(&input);
            prop_assert!(editor.cursor_index() <= editor.buffer().len());
        }
    }
}
