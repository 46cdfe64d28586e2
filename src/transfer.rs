use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Receives the event files once the instrument has been told to send them.
pub trait FileReceiver {
    /// Called before `xfr 0` is sent, to get the line ready for binary data.
    fn prepare(&mut self) -> Result<()>;
    /// Called right after `xfr 0`. Must not return before the instrument has
    /// finished sending (or the transfer has failed).
    fn receive(&mut self) -> Result<()>;
}

/// Hands the serial line over to lrzsz's `rb`, the instrument sends its
/// events as a YMODEM batch.
pub struct YmodemReceiver {
    port_path: String,
    baud_rate: u32,
    directory: PathBuf,
    program: String,
}

impl YmodemReceiver {
    pub fn new(port_path: &str, baud_rate: u32, directory: &Path) -> YmodemReceiver {
        YmodemReceiver {
            port_path: port_path.to_string(),
            baud_rate,
            directory: directory.to_path_buf(),
            program: "rb".to_string(),
        }
    }

    pub fn with_program(mut self, program: &str) -> YmodemReceiver {
        self.program = program.to_string();
        self
    }
}

fn run(command: &mut Command, name: &str) -> Result<()> {
    let status = command
        .status()
        .map_err(|e| Error::Transfer(format!("unable to run {name}: {e}")))?;
    if !status.success() {
        return Err(Error::Transfer(format!("{name} failed ({status})")));
    }
    Ok(())
}

impl FileReceiver for YmodemReceiver {
    fn prepare(&mut self) -> Result<()> {
        // rb expects a raw line, whereas the port was configured for the
        // text protocol so far.
        run(
            Command::new("stty")
                .arg("-F")
                .arg(&self.port_path)
                .arg(self.baud_rate.to_string())
                .arg("raw")
                .arg("-echo"),
            "stty",
        )
    }

    fn receive(&mut self) -> Result<()> {
        let input = std::fs::File::open(&self.port_path)?;
        let output = std::fs::OpenOptions::new()
            .write(true)
            .open(&self.port_path)?;
        log::debug!(
            "receiving files into {} using {}",
            self.directory.display(),
            self.program
        );
        run(
            Command::new(&self.program)
                .arg("--ymodem")
                .current_dir(&self.directory)
                .stdin(Stdio::from(input))
                .stdout(Stdio::from(output)),
            &self.program,
        )
    }
}
