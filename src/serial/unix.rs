// Unix serial port using termios and a poll-driven reader thread

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, trace, warn};

use super::{is_serial_device_name, EventSink, READ_CHUNK};
use crate::{DeviceInfo, Error, Result, Transport, TransportEvent};

/// How long the reader waits for data before checking its stop flag.
const POLL_TIMEOUT_MS: libc::c_int = 100;

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
/// let mut port = SerialPort::new("/dev/ttyUSB0", 115_200, move |event| {
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

    fn open_device(&self) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::DeviceNotFound(self.path.clone()),
                _ => Error::Io(e),
            })
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

        let speed = baud_speed(self.baud)?;
        let file = self.open_device()?;
        configure(file.as_raw_fd(), speed)?;

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

/// Puts the device in raw 8N1 mode at `speed` and switches it back to blocking I/O.
fn configure(fd: RawFd, speed: libc::speed_t) -> Result<()> {
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut termios) != 0 {
            return Err(io::Error::last_os_error().into());
        }

        libc::cfmakeraw(&mut termios);
        termios.c_cflag |= libc::CLOCAL | libc::CREAD;
        termios.c_cflag &= !(libc::CSTOPB | libc::CRTSCTS);
        termios.c_iflag &= !(libc::IXON | libc::IXOFF | libc::IXANY);
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;

        if libc::cfsetispeed(&mut termios, speed) != 0
            || libc::cfsetospeed(&mut termios, speed) != 0
        {
            return Err(io::Error::last_os_error().into());
        }
        if libc::tcsetattr(fd, libc::TCSANOW, &termios) != 0 {
            return Err(io::Error::last_os_error().into());
        }

        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 || libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) < 0 {
            return Err(io::Error::last_os_error().into());
        }

        libc::tcflush(fd, libc::TCIOFLUSH);
    }
    Ok(())
}

fn baud_speed(baud: u32) -> Result<libc::speed_t> {
    let speed = match baud {
        50 => libc::B50,
        75 => libc::B75,
        110 => libc::B110,
        134 => libc::B134,
        150 => libc::B150,
        200 => libc::B200,
        300 => libc::B300,
        600 => libc::B600,
        1200 => libc::B1200,
        1800 => libc::B1800,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        460800 => libc::B460800,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        921600 => libc::B921600,
        other => return Err(Error::UnsupportedBaudRate(other)),
    };
    Ok(speed)
}

/// Errors that mean the device itself went away.
fn is_hangup(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::EIO) | Some(libc::ENXIO) | Some(libc::ENODEV)
    )
}

fn read_loop(mut file: File, stop: &AtomicBool, sink: &EventSink, path: &str) {
    let fd = file.as_raw_fd();
    let mut buf = [0u8; READ_CHUNK];

    while !stop.load(Ordering::Acquire) {
        let mut pollfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&mut pollfd, 1, POLL_TIMEOUT_MS) };
        if ready < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            sink(TransportEvent::Error(err.to_string()));
            return;
        }
        if ready == 0 || stop.load(Ordering::Acquire) {
            continue;
        }

        if pollfd.revents & libc::POLLIN != 0 {
            match file.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => sink(TransportEvent::Data(buf[..n].to_vec())),
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                    ) => {}
                Err(e) if is_hangup(&e) => break,
                Err(e) => {
                    sink(TransportEvent::Error(e.to_string()));
                    return;
                }
            }
        } else if pollfd.revents & (libc::POLLHUP | libc::POLLERR | libc::POLLNVAL) != 0 {
            break;
        }
    }

    if !stop.load(Ordering::Acquire) {
        info!(port = %path, "serial device disconnected");
        sink(TransportEvent::Close { disconnected: true });
    }
}

pub(super) fn available_ports() -> Result<Vec<DeviceInfo>> {
    let mut ports: Vec<DeviceInfo> = fs::read_dir("/dev")?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_serial_device_name(name))
        .map(|name| DeviceInfo::new(format!("/dev/{name}")))
        .collect();
    ports.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    Ok(ports)
}
