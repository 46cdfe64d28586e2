use std::io::{Read, Write};

use serialport::SerialPort;

use crate::error::{Error, Result};
use crate::protocol::Command;
use crate::timing::Delay;

/// Byte-level access to the instrument. The instrument speaks a half-duplex
/// text protocol, so reads never block: callers wait (see `timing::Delay`)
/// and then collect whatever arrived in the meantime.
pub trait Transport {
    /// Closes and reopens the connection. This resets line state and drops
    /// anything that was still buffered.
    fn reopen(&mut self) -> Result<()>;
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;
    /// Returns all bytes currently buffered, which may be none.
    fn read_available(&mut self) -> Result<Vec<u8>>;
    /// Drives DTR, which the instrument uses as its wake line.
    fn set_wake_line(&mut self, level: bool) -> Result<()>;
}

pub fn send(transport: &mut dyn Transport, command: &Command) -> Result<()> {
    transport.write_all(command.to_wire()?.as_bytes())
}

/// Reads everything that is currently buffered. The instrument only ever
/// sends ASCII, anything else is line noise and is replaced.
pub fn read_text(transport: &mut dyn Transport) -> Result<String> {
    Ok(String::from_utf8_lossy(&transport.read_available()?).into_owned())
}

/// Sends a command, waits for the instrument to process it, and returns
/// whatever it answered in that time.
pub fn exchange(
    transport: &mut dyn Transport,
    delay: &mut dyn Delay,
    command: &Command,
    settle: core::time::Duration,
) -> Result<String> {
    send(transport, command)?;
    delay.pause(settle);
    let response = read_text(transport)?;
    log::debug!("response: {response:?}");
    Ok(response)
}

pub struct SerialTransport {
    path: String,
    baud_rate: u32,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    pub fn open(path: &str, baud_rate: u32) -> Result<SerialTransport> {
        let port = open_port(path, baud_rate)?;
        Ok(SerialTransport {
            path: path.to_string(),
            baud_rate,
            port: Some(port),
        })
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "serial port is closed",
            ))
        })
    }
}

fn open_port(path: &str, baud_rate: u32) -> serialport::Result<Box<dyn SerialPort>> {
    // The instrument uses plain 8N1 without any flow control. DTR is driven
    // manually for waking the unit.
    serialport::new(path, baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        // Reads only ever ask for bytes that are already buffered, so this
        // mostly matters for writes.
        .timeout(core::time::Duration::from_millis(500))
        .open()
}

impl Transport for SerialTransport {
    fn reopen(&mut self) -> Result<()> {
        // The old handle must be closed (dropped) before opening a new one.
        self.port = None;
        self.port = Some(open_port(&self.path, self.baud_rate)?);
        log::debug!("reopened {} at {} baud", self.path, self.baud_rate);
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        log::trace!("tx: {:?}", String::from_utf8_lossy(bytes));
        let port = self.port()?;
        port.write_all(bytes)?;
        port.flush()?;
        Ok(())
    }

    fn read_available(&mut self) -> Result<Vec<u8>> {
        let port = self.port()?;
        let available = port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(Vec::new());
        }
        let mut buf = vec![0u8; available];
        let read = match port.read(&mut buf) {
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => 0,
            Err(e) => return Err(e.into()),
        };
        buf.truncate(read);
        log::trace!("rx: {:?}", String::from_utf8_lossy(&buf));
        Ok(buf)
    }

    fn set_wake_line(&mut self, level: bool) -> Result<()> {
        log::trace!("DTR -> {level}");
        self.port()?.write_data_terminal_ready(level)?;
        Ok(())
    }
}
