//! Backend adapter: connects a [`LineEditor`] to a [`Transport`].
//!
//! The session forwards submitted lines to the transport, renders transport
//! data and lifecycle through the editor, and keeps polling for a device that
//! disappeared until it can be reopened.

use std::collections::VecDeque;
use std::io::Write;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::ansi::NEWLINE;
use crate::{DeviceLister, Dimensions, EditorEvent, LineEditor, Transport, TransportEvent};

/// How often a disconnected device is looked for.
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// Output of a session for its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// ANSI text for the rendering surface.
    Write(String),
    /// The session ended; emitted exactly once.
    Close,
}

#[derive(Debug, Clone, Copy)]
struct ReconnectPoll {
    next_attempt: Instant,
    reopened: bool,
}

/// One terminal session over one transport.
///
/// # Examples
///
/// ```
/// use serialterm::{
///     DeviceInfo, DeviceLister, EditorConfig, LineEditor, Result, Session, Transport,
/// };
///
/// struct Loopback {
///     open: bool,
///     sent: Vec<u8>,
/// }
///
/// impl Transport for Loopback {
///     fn identifier(&self) -> &str { "loop0" }
///     fn rate(&self) -> u32 { 9600 }
///     fn is_open(&self) -> bool { self.open }
///     fn open(&mut self) -> Result<()> { self.open = true; Ok(()) }
///     fn write(&mut self, data: &[u8]) -> Result<()> { self.sent.extend_from_slice(data); Ok(()) }
///     fn close(&mut self) -> Result<()> { self.open = false; Ok(()) }
/// }
///
/// struct NoDevices;
///
/// impl DeviceLister for NoDevices {
///     fn list_devices(&self) -> Result<Vec<DeviceInfo>> { Ok(Vec::new()) }
/// }
///
/// let editor = LineEditor::new(EditorConfig::default());
/// let mut session = Session::new(editor, Loopback { open: false, sent: Vec::new() }, NoDevices);
/// session.open(None);
/// session.handle_input("AT\r");
///
/// assert_eq!(session.transport().sent, b"AT\r\n");
/// ```
pub struct Session<T, L> {
    editor: LineEditor,
    transport: T,
    lister: L,
    reconnect: Option<ReconnectPoll>,
    capture: Option<Box<dyn Write>>,
    closed: bool,
    close_signaled: bool,
    events: VecDeque<SessionEvent>,
}

impl<T: Transport, L: DeviceLister> Session<T, L> {
    pub fn new(editor: LineEditor, transport: T, lister: L) -> Self {
        Self {
            editor,
            transport,
            lister,
            reconnect: None,
            capture: None,
            closed: false,
            close_signaled: false,
            events: VecDeque::new(),
        }
    }

    /// Copies every inbound data chunk verbatim to `sink`.
    pub fn with_capture(mut self, sink: impl Write + 'static) -> Self {
        self.capture = Some(Box::new(sink));
        self
    }

    /// Shows the banner, opens the transport if needed and draws the input area.
    pub fn open(&mut self, dimensions: Option<Dimensions>) {
        self.editor.open(dimensions);
        let banner = format!(
            "Serial terminal{NEWLINE}Port: {}{NEWLINE}Baud rate: {}{NEWLINE}",
            self.transport.identifier(),
            self.transport.rate()
        );
        self.editor.render_inbound_text(&banner);

        if !self.transport.is_open() {
            if let Err(e) = self.transport.open() {
                warn!(port = self.transport.identifier(), error = %e, "failed to open transport");
                self.fail(&e.to_string());
            }
        }
        self.pump();
    }

    /// Feeds a raw keystroke chunk to the editor and forwards submitted lines.
    pub fn handle_input(&mut self, raw: &str) {
        if self.closed {
            return;
        }
        self.editor.handle_input(raw);
        self.pump();
    }

    pub fn set_dimensions(&mut self, dimensions: Option<Dimensions>) {
        if self.closed {
            return;
        }
        self.editor.set_dimensions(dimensions);
        self.pump();
    }

    pub fn on_transport_event(&mut self, event: TransportEvent) {
        if self.closed {
            trace!(?event, "ignoring transport event after close");
            return;
        }

        match event {
            TransportEvent::Open => {
                debug!(port = self.transport.identifier(), "transport open");
                if self.reconnect.take().is_some() {
                    debug!("reconnect poll cancelled");
                }
            }
            TransportEvent::Data(data) => {
                self.capture_data(&data);
                self.editor.render_inbound(&data);
            }
            TransportEvent::Error(message) => {
                warn!(port = self.transport.identifier(), %message, "transport error");
                self.fail(&message);
            }
            TransportEvent::Close { disconnected: true } => self.start_reconnect(),
            TransportEvent::Close { disconnected: false } => {
                debug!(port = self.transport.identifier(), "transport closed");
                self.teardown();
            }
        }
        self.pump();
    }

    /// Drives the reconnect poll. Call at least once per [`RECONNECT_INTERVAL`].
    pub fn tick(&mut self, now: Instant) {
        let Some(poll) = self.reconnect else {
            return;
        };
        if self.closed || poll.reopened || now < poll.next_attempt {
            return;
        }
        self.reconnect = Some(ReconnectPoll {
            next_attempt: now + RECONNECT_INTERVAL,
            reopened: false,
        });

        let port = self.transport.identifier().to_string();
        match self.lister.is_present(&port) {
            Ok(true) => match self.transport.open() {
                Ok(()) => {
                    info!(%port, "device reconnected");
                    if let Some(poll) = self.reconnect.as_mut() {
                        poll.reopened = true;
                    }
                    self.status(&format!("Reconnected to {port}"));
                }
                Err(e) => debug!(%port, error = %e, "reopen failed, still polling"),
            },
            Ok(false) => trace!(%port, "device not present yet"),
            Err(e) => warn!(error = %e, "device enumeration failed"),
        }
        self.pump();
    }

    /// Tears the session down. Safe to call more than once.
    pub fn close(&mut self) {
        self.teardown();
        self.pump();
    }

    fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if self.reconnect.take().is_some() {
            debug!("reconnect poll cancelled");
        }
        if let Err(e) = self.transport.close() {
            warn!(port = self.transport.identifier(), error = %e, "failed to close transport");
        }
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.flush() {
                warn!(error = %e, "failed to flush capture");
            }
        }
        debug!("session closed");
    }

    /// Removes and returns every queued event.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.pump();
        self.events.drain(..).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_reconnecting(&self) -> bool {
        self.reconnect.is_some()
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut LineEditor {
        &mut self.editor
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn start_reconnect(&mut self) {
        let port = self.transport.identifier().to_string();
        info!(%port, "device disconnected, polling for it");
        if let Err(e) = self.transport.close() {
            debug!(%port, error = %e, "close after disconnect failed");
        }
        if self.reconnect.is_none() {
            self.status(&format!("{port} disconnected, waiting for it to reappear..."));
        }
        self.reconnect = Some(ReconnectPoll {
            next_attempt: Instant::now() + RECONNECT_INTERVAL,
            reopened: false,
        });
    }

    fn send_line(&mut self, line: &str) {
        if self.closed {
            return;
        }
        if self.reconnect.is_some() {
            let port = self.transport.identifier().to_string();
            self.status(&format!("{port} is disconnected, line not sent"));
            return;
        }
        if let Err(e) = self.transport.write(line.as_bytes()) {
            warn!(port = self.transport.identifier(), error = %e, "write failed");
            self.fail(&e.to_string());
        }
    }

    /// Renders `An error occurred: <message>` and closes the session.
    fn fail(&mut self, message: &str) {
        let text = format!("An error occurred: {message}")
            .replace("\r\n", "\n")
            .replace('\n', NEWLINE);
        self.status(&text);
        self.teardown();
    }

    /// Renders a status line on a line of its own.
    fn status(&mut self, text: &str) {
        let lead = if self.editor.ends_with_newline() { "" } else { NEWLINE };
        self.editor.render_inbound_text(&format!("{lead}{text}{NEWLINE}"));
    }

    fn capture_data(&mut self, data: &[u8]) {
        if let Some(capture) = self.capture.as_mut() {
            if let Err(e) = capture.write_all(data) {
                warn!(error = %e, "capture write failed, capture disabled");
                self.capture = None;
            }
        }
    }

    /// Moves editor output into the session queue and sends submitted lines.
    fn pump(&mut self) {
        loop {
            let events = self.editor.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                match event {
                    EditorEvent::Output(text) => self.events.push_back(SessionEvent::Write(text)),
                    EditorEvent::Submit(line) => self.send_line(&line),
                }
            }
        }
        if self.closed && !self.close_signaled {
            self.close_signaled = true;
            self.events.push_back(SessionEvent::Close);
        }
    }
}
