//! Byte transport between the engine and the hub.
//!
//! The engine only needs a duplex byte channel that can report how many
//! bytes are waiting. [`SerialTransport`] provides one over a USB serial
//! port; tests substitute in-memory implementations.

use std::io::{self, Read, Write};

use serialport::SerialPort;
use tracing::debug;

use crate::config::SerialConfig;
use crate::error::{Result, RpcError, TransportFault};

/// A byte-in/byte-out duplex channel.
pub trait Transport {
    /// Number of bytes that can be read without blocking.
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read into `buf`, blocking for at most the transport's read timeout.
    ///
    /// `Ok(0)` means nothing arrived in time.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `data`.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Release the underlying resource.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn bytes_available(&mut self) -> io::Result<usize> {
        (**self).bytes_available()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_all(data)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Transport over a serial port.
pub struct SerialTransport {
    path: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Open the serial device.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        debug!("Opening {} at {} baud", config.path, config.baud_rate);
        let port = serialport::new(&config.path, config.baud_rate)
            .timeout(config.read_timeout)
            .open()
            .map_err(|e| RpcError::Transport {
                fault: TransportFault::Open,
                source: e.into(),
            })?;
        Ok(SerialTransport {
            path: config.path.clone(),
            port: Some(port),
        })
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port is closed"))
    }
}

impl Transport for SerialTransport {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let waiting = self.port()?.bytes_to_read().map_err(io::Error::from)?;
        Ok(waiting as usize)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let port = self.port()?;
        match Read::read(port, buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let port = self.port()?;
        Write::write_all(port, data)?;
        port.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(port) = self.port.take() {
            debug!("Closing {}", self.path);
            drop(port);
        }
        Ok(())
    }
}
