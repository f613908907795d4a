//! Host terminal implementations.
//!
//! This module provides the [`Terminal`](crate::Terminal) implementation for the
//! process's own console:
//!
//! - **Unix/Linux**: [`StdioTerminal`] using termios and `TIOCGWINSZ`
//! - **Windows**: [`StdioTerminal`] using the Console API with virtual terminal
//!   input and processing enabled
//!
//! Keystrokes are read on a separate thread by [`spawn_input_reader`], so the
//! host loop can wait on keystrokes and transport events at the same time.

use std::io::{self, Read};
use std::thread::{self, JoinHandle};

use tracing::debug;

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::StdioTerminal;

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::StdioTerminal;

/// Spawns a thread that reads raw keystroke chunks from stdin.
///
/// Each chunk is passed to `on_input`; the thread stops when it returns
/// `false`, on end of input, or on a read error.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned.
pub fn spawn_input_reader(
    mut on_input: impl FnMut(Vec<u8>) -> bool + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            let mut stdin = io::stdin().lock();
            let mut buf = [0u8; 1024];
            loop {
                match stdin.read(&mut buf) {
                    Ok(0) => {
                        debug!("stdin closed");
                        break;
                    }
                    Ok(n) => {
                        if !on_input(buf[..n].to_vec()) {
                            break;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        debug!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
        })
}
