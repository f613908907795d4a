//! Windows terminal implementation using the Console API.
//!
//! Raw mode disables line input, echo and Ctrl-C processing on the input handle
//! and turns on virtual terminal sequences in both directions, so arrow keys
//! arrive as the same escape sequences a Unix terminal sends and the editor's
//! ANSI output is interpreted by the console.

use crate::{Dimensions, Result, Terminal};
use std::io::{self, Write};
use winapi::um::consoleapi::{GetConsoleMode, SetConsoleMode};
use winapi::um::handleapi::INVALID_HANDLE_VALUE;
use winapi::um::processenv::GetStdHandle;
use winapi::um::winbase::{STD_INPUT_HANDLE, STD_OUTPUT_HANDLE};
use winapi::um::wincon::{
    GetConsoleScreenBufferInfo, CONSOLE_SCREEN_BUFFER_INFO, ENABLE_ECHO_INPUT,
    ENABLE_LINE_INPUT, ENABLE_PROCESSED_INPUT, ENABLE_VIRTUAL_TERMINAL_INPUT,
    ENABLE_VIRTUAL_TERMINAL_PROCESSING,
};
use winapi::um::winnt::HANDLE;

/// Windows terminal using stdin/stdout with Console API.
///
/// # Examples
///
/// ```no_run
/// use serialterm::terminals::StdioTerminal;
///
/// let terminal = StdioTerminal::new()?;
/// # Ok::<(), serialterm::Error>(())
/// ```
pub struct StdioTerminal {
    stdin_handle: HANDLE,
    stdout_handle: HANDLE,
    original_modes: Option<(u32, u32)>,
}

impl StdioTerminal {
    /// Creates a new Windows terminal using stdin/stdout handles.
    ///
    /// # Errors
    ///
    /// Returns an error if the standard handles cannot be obtained.
    pub fn new() -> Result<Self> {
        unsafe {
            let stdin_handle = GetStdHandle(STD_INPUT_HANDLE);
            let stdout_handle = GetStdHandle(STD_OUTPUT_HANDLE);

            if stdin_handle == INVALID_HANDLE_VALUE || stdout_handle == INVALID_HANDLE_VALUE {
                return Err(io::Error::last_os_error().into());
            }

            Ok(Self {
                stdin_handle,
                stdout_handle,
                original_modes: None,
            })
        }
    }
}

impl Terminal for StdioTerminal {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        io::stdout().write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn enter_raw_mode(&mut self) -> Result<()> {
        unsafe {
            let mut input_mode: u32 = 0;
            let mut output_mode: u32 = 0;
            if GetConsoleMode(self.stdin_handle, &mut input_mode) == 0
                || GetConsoleMode(self.stdout_handle, &mut output_mode) == 0
            {
                return Err(io::Error::last_os_error().into());
            }

            self.original_modes = Some((input_mode, output_mode));

            let raw_input = (input_mode
                & !(ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT | ENABLE_PROCESSED_INPUT))
                | ENABLE_VIRTUAL_TERMINAL_INPUT;
            let vt_output = output_mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING;

            if SetConsoleMode(self.stdin_handle, raw_input) == 0
                || SetConsoleMode(self.stdout_handle, vt_output) == 0
            {
                return Err(io::Error::last_os_error().into());
            }
        }

        Ok(())
    }

    fn exit_raw_mode(&mut self) -> Result<()> {
        if let Some((input_mode, output_mode)) = self.original_modes {
            unsafe {
                if SetConsoleMode(self.stdin_handle, input_mode) == 0
                    || SetConsoleMode(self.stdout_handle, output_mode) == 0
                {
                    return Err(io::Error::last_os_error().into());
                }
            }
            self.original_modes = None;
        }

        Ok(())
    }

    fn dimensions(&self) -> Option<Dimensions> {
        unsafe {
            let mut csbi: CONSOLE_SCREEN_BUFFER_INFO = std::mem::zeroed();
            if GetConsoleScreenBufferInfo(self.stdout_handle, &mut csbi) == 0 {
                return None;
            }

            let window = csbi.srWindow;
            let columns = (window.Right - window.Left + 1).max(0) as u16;
            let rows = (window.Bottom - window.Top + 1).max(0) as u16;
            if columns == 0 {
                return None;
            }
            Some(Dimensions::new(columns, rows))
        }
    }
}

impl Drop for StdioTerminal {
    fn drop(&mut self) {
        let _ = self.exit_raw_mode();
    }
}
