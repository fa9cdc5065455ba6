use std::io::{self, Read, Write};

use serialport::{ClearBuffer, SerialPort};

use crate::error::MonitorError;

/// Byte stream to the board with the two non-blocking helpers the poll loop needs.
pub trait Transport: Read + Write {
    /// Number of bytes that can be read without blocking.
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Drops whatever the driver has buffered on the receive side.
    fn clear_input(&mut self) -> io::Result<()>;
}

impl Transport for Box<dyn SerialPort> {
    fn bytes_available(&mut self) -> io::Result<usize> {
        self.bytes_to_read()
            .map(|count| count as usize)
            .map_err(io::Error::from)
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Input).map_err(io::Error::from)
    }
}

/// Opens transports and finds candidate device paths.
pub trait Connector {
    fn discover(&self) -> Option<String>;

    fn open(&self, path: &str) -> Result<Box<dyn Transport>, MonitorError>;
}
