// Interactive serial terminal: line editing on the host, raw bytes on the wire

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use serialterm::serial::{available_ports, parse_baud_rate, SerialLister, SerialPort, DEFAULT_BAUD_RATE};
use serialterm::terminals::{spawn_input_reader, StdioTerminal};
use serialterm::{
    unescape, Command, CommandRegistry, DeviceLister, EditorConfig, LineEditor, Session,
    SessionEvent, Terminal, Transport, TransportEvent, Utf8Decoder,
};
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// How often terminal size and the reconnect poll are checked while idle.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

const CTRL_C: u8 = 0x03;

/// Line-editing terminal for serial devices.
///
/// Type a line and press Enter to send it; data from the device is shown above
/// the input line. `clear` (or `cls`) clears the screen, `.hex` toggles a hex
/// view of received data and Ctrl-C quits.
#[derive(Parser, Debug)]
#[command(name = "serialterm", version, about)]
struct Args {
    /// Serial device to open, e.g. /dev/ttyUSB0 or COM3
    port: Option<String>,

    /// Baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE, value_parser = baud_rate)]
    baud: u32,

    /// Appended to every sent line; backslash escapes such as \r\n are expanded
    #[arg(long, default_value = r"\r\n")]
    line_end: String,

    /// Prompt shown in front of the input line
    #[arg(long, default_value = ">: ")]
    prompt: String,

    /// Show received data as hex instead of text
    #[arg(long)]
    hex: bool,

    /// List available serial devices and exit
    #[arg(long)]
    list: bool,

    /// Write diagnostics to this file (filtered by RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Copy all received bytes verbatim to this file
    #[arg(long)]
    capture: Option<PathBuf>,
}

fn baud_rate(value: &str) -> Result<u32, String> {
    parse_baud_rate(value).map_err(|e| e.to_string())
}

enum HostEvent {
    Input(Vec<u8>),
    Transport(TransportEvent),
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        if let Err(e) = init_tracing(path) {
            eprintln!("serialterm: cannot open log file {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    }

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("serialterm: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(path: &Path) -> std::io::Result<()> {
    let log_file = File::create(path)?;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Arc::new(log_file)).with_ansi(false))
        .with(env_filter)
        .init();
    Ok(())
}

fn run(args: Args) -> serialterm::Result<ExitCode> {
    if args.list {
        print_ports()?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(port) = args.port else {
        eprintln!("No serial device given.");
        print_ports()?;
        return Ok(ExitCode::FAILURE);
    };

    let config = EditorConfig {
        translate_as_text: !args.hex,
        line_end: unescape(&args.line_end)?,
        prompt: args.prompt,
        ..EditorConfig::default()
    };
    let mut commands = CommandRegistry::with_defaults();
    commands.register(Command::exact(
        &[".hex"],
        "Toggles hex display of received data",
        LineEditor::toggle_translate,
    ));
    let editor = LineEditor::with_commands(config, commands);

    let (tx, rx) = mpsc::channel();
    let transport_tx = tx.clone();
    let serial = SerialPort::new(port, args.baud, move |event| {
        let _ = transport_tx.send(HostEvent::Transport(event));
    });

    let mut session = Session::new(editor, serial, SerialLister);
    if let Some(path) = &args.capture {
        session = session.with_capture(BufWriter::new(File::create(path)?));
    }

    let mut terminal = host_terminal()?;
    terminal.enter_raw_mode()?;
    spawn_input_reader(move |chunk| tx.send(HostEvent::Input(chunk)).is_ok())?;

    let result = event_loop(&mut session, &mut terminal, &rx);
    terminal.write(b"\r\n")?;
    terminal.flush()?;
    terminal.exit_raw_mode()?;
    result.map(|()| ExitCode::SUCCESS)
}

/// Runs until the session closes.
fn event_loop<T: Transport, L: DeviceLister>(
    session: &mut Session<T, L>,
    terminal: &mut StdioTerminal,
    events: &Receiver<HostEvent>,
) -> serialterm::Result<()> {
    let mut dimensions = terminal.dimensions();
    let mut keystrokes = Utf8Decoder::new();
    session.open(dimensions);

    loop {
        if render(session, terminal)? {
            info!("session closed");
            return Ok(());
        }

        match events.recv_timeout(POLL_INTERVAL) {
            Ok(HostEvent::Input(chunk)) if chunk.contains(&CTRL_C) => {
                debug!("interrupted");
                session.close();
            }
            Ok(HostEvent::Input(chunk)) => session.handle_input(&keystrokes.decode(&chunk)),
            Ok(HostEvent::Transport(event)) => session.on_transport_event(event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => session.close(),
        }

        let current = terminal.dimensions();
        if current != dimensions {
            debug!(?current, "terminal resized");
            dimensions = current;
            session.set_dimensions(current);
        }
        session.tick(Instant::now());
    }
}

/// Writes pending session output. Returns `true` once the session has closed.
fn render<T: Transport, L: DeviceLister>(
    session: &mut Session<T, L>,
    terminal: &mut StdioTerminal,
) -> serialterm::Result<bool> {
    let mut closed = false;
    for event in session.drain_events() {
        match event {
            SessionEvent::Write(text) => terminal.write(text.as_bytes())?,
            SessionEvent::Close => closed = true,
        }
    }
    terminal.flush()?;
    Ok(closed)
}

fn print_ports() -> serialterm::Result<()> {
    let ports = available_ports()?;
    if ports.is_empty() {
        println!("No serial devices found");
    } else {
        println!("Available devices:");
        for port in ports {
            println!("  {}", port.identifier);
        }
    }
    Ok(())
}

#[cfg(unix)]
fn host_terminal() -> serialterm::Result<StdioTerminal> {
    Ok(StdioTerminal::new())
}

#[cfg(windows)]
fn host_terminal() -> serialterm::Result<StdioTerminal> {
    StdioTerminal::new()
}
