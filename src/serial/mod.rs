//! Serial device transport.
//!
//! [`SerialPort`] implements [`Transport`](crate::Transport) for a local serial
//! device. A reader thread per open port turns incoming bytes and hangups into
//! [`TransportEvent`]s handed to the event sink given at construction.
//! [`SerialLister`] enumerates the devices the host currently exposes.

use std::sync::Arc;

use crate::{DeviceInfo, DeviceLister, Error, Result, TransportEvent};

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::SerialPort;

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::SerialPort;

/// Default line rate used by the binary.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Size of a single read from the device.
pub(crate) const READ_CHUNK: usize = 4096;

/// Receives transport events from the reader thread.
pub type EventSink = Arc<dyn Fn(TransportEvent) + Send + Sync>;

/// Parses a user-supplied baud rate.
///
/// # Errors
///
/// Returns [`Error::InvalidBaudRate`] unless `value` is an integer greater than zero.
///
/// # Examples
///
/// ```
/// use serialterm::serial::parse_baud_rate;
///
/// assert_eq!(parse_baud_rate("9600").unwrap(), 9600);
/// assert!(parse_baud_rate("0").is_err());
/// assert!(parse_baud_rate("fast").is_err());
/// ```
pub fn parse_baud_rate(value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(rate) if rate > 0 => Ok(rate),
        _ => Err(Error::InvalidBaudRate(value.to_string())),
    }
}

/// Lists the serial devices currently present on this host.
///
/// # Errors
///
/// Returns an error if the device directory cannot be read.
pub fn available_ports() -> Result<Vec<DeviceInfo>> {
    #[cfg(unix)]
    {
        unix::available_ports()
    }
    #[cfg(windows)]
    {
        windows::available_ports()
    }
    #[cfg(not(any(unix, windows)))]
    {
        Ok(Vec::new())
    }
}

/// [`DeviceLister`] backed by [`available_ports`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialLister;

impl DeviceLister for SerialLister {
    fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        available_ports()
    }
}

/// Names under `/dev` that are treated as serial devices.
pub(crate) const DEVICE_PREFIXES: &[&str] =
    &["ttyUSB", "ttyACM", "ttyAMA", "rfcomm", "cu.", "tty.usb"];

pub(crate) fn is_serial_device_name(name: &str) -> bool {
    DEVICE_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_baud_rate() {
        assert_eq!(parse_baud_rate("115200").unwrap(), 115_200);
        assert_eq!(parse_baud_rate(" 300 ").unwrap(), 300);
    }

    #[test]
    fn test_parse_baud_rate_rejects_bad_values() {
        for bad in ["0", "-9600", "9600.5", "", "abc"] {
            let err = parse_baud_rate(bad).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Invalid baud rate {bad}. Must be an integer > 0")
            );
        }
    }

    #[test]
    fn test_device_name_filter() {
        assert!(is_serial_device_name("ttyUSB0"));
        assert!(is_serial_device_name("ttyACM12"));
        assert!(is_serial_device_name("cu.usbserial-1420"));
        assert!(is_serial_device_name("tty.usbmodem1101"));
        assert!(is_serial_device_name("rfcomm0"));
        assert!(!is_serial_device_name("tty0"));
        assert!(!is_serial_device_name("null"));
        assert!(!is_serial_device_name("ttyS0"));
    }
}
