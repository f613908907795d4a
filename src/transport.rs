//! Backend transport contract.
//!
//! A transport is a duplex byte stream with a lifecycle. Writes are synchronous
//! calls on the [`Transport`]; everything the transport has to say (data,
//! errors, open/close) arrives as [`TransportEvent`]s, typically over a channel
//! fed by a reader thread.

use crate::Result;

/// Lifecycle and data notifications from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The transport is open and ready for writes.
    Open,
    /// Bytes received from the backend.
    Data(Vec<u8>),
    /// A transport-level failure, fatal for the session.
    Error(String),
    /// The transport closed. `disconnected` is `true` when the device went away
    /// rather than being closed locally.
    Close { disconnected: bool },
}

/// Duplex byte stream to the backend.
pub trait Transport {
    /// Name of the underlying device, e.g. `/dev/ttyUSB0` or `COM3`.
    fn identifier(&self) -> &str;

    /// Configured line rate in baud.
    fn rate(&self) -> u32;

    fn is_open(&self) -> bool;

    /// Opens the transport. On success the transport reports [`TransportEvent::Open`].
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be opened or configured.
    fn open(&mut self) -> Result<()>;

    /// Writes `data` to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotOpen`] if the transport is closed, or the
    /// underlying I/O error.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Closes the transport. Closing a closed transport is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing the device fails.
    fn close(&mut self) -> Result<()>;
}

/// A device the host can open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub identifier: String,
}

impl DeviceInfo {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

/// Source of the currently available devices.
pub trait DeviceLister {
    /// # Errors
    ///
    /// Returns an error if enumeration itself fails.
    fn list_devices(&self) -> Result<Vec<DeviceInfo>>;

    /// Returns `true` if a device named `identifier` is currently listed.
    ///
    /// # Errors
    ///
    /// Propagates enumeration failures.
    fn is_present(&self, identifier: &str) -> Result<bool> {
        Ok(self
            .list_devices()?
            .iter()
            .any(|device| device.identifier == identifier))
    }
}
