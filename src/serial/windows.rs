//! Windows serial port using the Communications API.
//!
//! The device is opened as `\\.\COMn` and configured through a `DCB`. Read
//! timeouts make every read return after at most [`READ_TIMEOUT_MS`], which is
//! how the reader thread notices its stop flag.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::windows::io::AsRawHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, trace, warn};
use winapi::shared::winerror::{
    ERROR_ACCESS_DENIED, ERROR_BAD_COMMAND, ERROR_DEVICE_NOT_CONNECTED, ERROR_FILE_NOT_FOUND,
    ERROR_GEN_FAILURE, ERROR_OPERATION_ABORTED,
};
use winapi::um::commapi::{GetCommState, SetCommState, SetCommTimeouts};
use winapi::um::winbase::{
    COMMTIMEOUTS, DCB, DTR_CONTROL_ENABLE, NOPARITY, ONESTOPBIT, RTS_CONTROL_ENABLE,
};
use winapi::um::winnt::{HANDLE, MAXDWORD};

use super::{EventSink, READ_CHUNK};
use crate::{DeviceInfo, Error, Result, Transport, TransportEvent};

const READ_TIMEOUT_MS: u32 = 100;

/// Highest COM port number probed by [`available_ports`].
const MAX_COM_PORT: u32 = 256;

/// Serial device opened raw at a fixed baud rate (8N1, no flow control).
///
/// # Examples
///
/// ```no_run
/// use std::sync::mpsc;
/// use serialterm::serial::SerialPort;
/// use serialterm::Transport;
///
/// let (tx, rx) = mpsc::channel();
/// let mut port = SerialPort::new("COM3", 115_200, move |event| {
///     let _ = tx.send(event);
/// });
/// port.open()?;
/// port.write(b"AT\r\n")?;
/// println!("{:?}", rx.recv());
/// # Ok::<(), serialterm::Error>(())
/// ```
pub struct SerialPort {
    path: String,
    baud: u32,
    sink: EventSink,
    active: Option<ActivePort>,
}

struct ActivePort {
    file: File,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl SerialPort {
    pub fn new(
        path: impl Into<String>,
        baud: u32,
        sink: impl Fn(TransportEvent) + Send + Sync + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            baud,
            sink: Arc::new(sink),
            active: None,
        }
    }
}

impl Transport for SerialPort {
    fn identifier(&self) -> &str {
        &self.path
    }

    fn rate(&self) -> u32 {
        self.baud
    }

    fn is_open(&self) -> bool {
        self.active.is_some()
    }

    fn open(&mut self) -> Result<()> {
        if self.active.is_some() {
            return Ok(());
        }

        let file = open_device(&self.path).map_err(|e| {
            if e.raw_os_error() == Some(ERROR_FILE_NOT_FOUND as i32) {
                Error::DeviceNotFound(self.path.clone())
            } else {
                Error::Io(e)
            }
        })?;
        configure(file.as_raw_handle() as HANDLE, self.baud)?;

        let reader_file = file.try_clone()?;
        let stop = Arc::new(AtomicBool::new(false));
        let reader = {
            let stop = Arc::clone(&stop);
            let sink = Arc::clone(&self.sink);
            let path = self.path.clone();
            thread::Builder::new()
                .name(format!("serial-reader {}", self.path))
                .spawn(move || read_loop(reader_file, &stop, &sink, &path))?
        };

        self.active = Some(ActivePort {
            file,
            stop,
            reader: Some(reader),
        });
        info!(port = %self.path, baud = self.baud, "serial port open");
        (self.sink)(TransportEvent::Open);
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| Error::NotOpen(self.path.clone()))?;
        active.file.write_all(data)?;
        trace!(port = %self.path, len = data.len(), "wrote");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut active) = self.active.take() else {
            return Ok(());
        };
        active.stop.store(true, Ordering::Release);
        if let Some(reader) = active.reader.take() {
            if reader.join().is_err() {
                warn!(port = %self.path, "serial reader thread panicked");
            }
        }
        debug!(port = %self.path, "serial port closed");
        Ok(())
    }
}

impl Drop for SerialPort {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn device_path(name: &str) -> String {
    if name.starts_with(r"\\.\") {
        name.to_string()
    } else {
        format!(r"\\.\{name}")
    }
}

fn open_device(name: &str) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(device_path(name))
}

fn configure(handle: HANDLE, baud: u32) -> Result<()> {
    unsafe {
        let mut dcb: DCB = std::mem::zeroed();
        dcb.DCBlength = std::mem::size_of::<DCB>() as u32;
        if GetCommState(handle, &mut dcb) == 0 {
            return Err(io::Error::last_os_error().into());
        }

        dcb.BaudRate = baud;
        dcb.ByteSize = 8;
        dcb.Parity = NOPARITY;
        dcb.StopBits = ONESTOPBIT;
        dcb.set_fBinary(1);
        dcb.set_fParity(0);
        dcb.set_fOutxCtsFlow(0);
        dcb.set_fOutxDsrFlow(0);
        dcb.set_fDsrSensitivity(0);
        dcb.set_fOutX(0);
        dcb.set_fInX(0);
        dcb.set_fDtrControl(DTR_CONTROL_ENABLE);
        dcb.set_fRtsControl(RTS_CONTROL_ENABLE);

        if SetCommState(handle, &mut dcb) == 0 {
            let err = io::Error::last_os_error();
            return Err(match err.raw_os_error() {
                Some(code) if code == ERROR_GEN_FAILURE as i32 => Error::UnsupportedBaudRate(baud),
                _ => err.into(),
            });
        }

        // Return what is buffered, or wait up to READ_TIMEOUT_MS for one byte.
        let mut timeouts = COMMTIMEOUTS {
            ReadIntervalTimeout: MAXDWORD,
            ReadTotalTimeoutMultiplier: MAXDWORD,
            ReadTotalTimeoutConstant: READ_TIMEOUT_MS,
            WriteTotalTimeoutMultiplier: 0,
            WriteTotalTimeoutConstant: 0,
        };
        if SetCommTimeouts(handle, &mut timeouts) == 0 {
            return Err(io::Error::last_os_error().into());
        }
    }
    Ok(())
}

/// Errors that mean the device itself went away.
fn is_hangup(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error().map(|code| code as u32),
        Some(ERROR_ACCESS_DENIED)
            | Some(ERROR_BAD_COMMAND)
            | Some(ERROR_DEVICE_NOT_CONNECTED)
            | Some(ERROR_OPERATION_ABORTED)
            | Some(ERROR_GEN_FAILURE)
    )
}

fn read_loop(mut file: File, stop: &AtomicBool, sink: &EventSink, path: &str) {
    let mut buf = [0u8; READ_CHUNK];

    while !stop.load(Ordering::Acquire) {
        match file.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => sink(TransportEvent::Data(buf[..n].to_vec())),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(_) if stop.load(Ordering::Acquire) => return,
            Err(e) if is_hangup(&e) => {
                info!(port = %path, "serial device disconnected");
                sink(TransportEvent::Close { disconnected: true });
                return;
            }
            Err(e) => {
                sink(TransportEvent::Error(e.to_string()));
                return;
            }
        }
    }
}

pub(super) fn available_ports() -> Result<Vec<DeviceInfo>> {
    let ports = (1..=MAX_COM_PORT)
        .map(|n| format!("COM{n}"))
        .filter(|name| match open_device(name) {
            Ok(_) => true,
            // Present but held by another process.
            Err(e) => e.raw_os_error() == Some(ERROR_ACCESS_DENIED as i32),
        })
        .map(DeviceInfo::new)
        .collect();
    Ok(ports)
}
