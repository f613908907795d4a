// Unix terminal implementation using termios and ANSI escape codes

use crate::{Dimensions, Result, Terminal};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;

/// Unix terminal using stdin/stdout with termios
pub struct StdioTerminal {
    stdin: io::Stdin,
    stdout: io::Stdout,
    original_termios: Option<libc::termios>,
}

impl StdioTerminal {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
            original_termios: None,
        }
    }
}

impl Default for StdioTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for StdioTerminal {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.stdout.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    fn enter_raw_mode(&mut self) -> Result<()> {
        let fd = self.stdin.as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();

            if libc::tcgetattr(fd, &mut termios) != 0 {
                return Err(io::Error::last_os_error().into());
            }

            // Save original settings
            self.original_termios = Some(termios);

            // No echo, no line buffering, Ctrl-C and Ctrl-Z arrive as bytes
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
            // Enter arrives as \r, Ctrl-S and Ctrl-Q are passed through
            termios.c_iflag &= !(libc::ICRNL | libc::IXON);

            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &termios) != 0 {
                return Err(io::Error::last_os_error().into());
            }
        }

        Ok(())
    }

    fn exit_raw_mode(&mut self) -> Result<()> {
        if let Some(original) = self.original_termios {
            let fd = self.stdin.as_raw_fd();

            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, &original) != 0 {
                    return Err(io::Error::last_os_error().into());
                }
            }

            self.original_termios = None;
        }

        Ok(())
    }

    fn dimensions(&self) -> Option<Dimensions> {
        let fd = self.stdout.as_raw_fd();

        unsafe {
            let mut size: libc::winsize = std::mem::zeroed();
            if libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) == -1 {
                return None;
            }
            if size.ws_col == 0 {
                return None;
            }
            Some(Dimensions::new(size.ws_col, size.ws_row))
        }
    }
}

impl Drop for StdioTerminal {
    fn drop(&mut self) {
        let _ = self.exit_raw_mode();
    }
}
