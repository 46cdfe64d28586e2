use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::controller::Settings;
use crate::error::{Error, Result};
use crate::protocol::Command;
use crate::timing::Timing;

/// Periodically downloads events from a seismograph and returns it to scan
/// mode.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Config {
    /// Serial number of the seismograph, used to identify it in the log.
    pub serial_number: String,
    /// Access code used to unlock the seismograph.
    pub access_code: String,
    #[arg(long, default_value = "/dev/ttyUSB0")]
    pub port: String,
    #[arg(long, default_value_t = 9600)]
    pub baud: u32,
    /// Events and the log file are written here.
    #[arg(long, default_value = "/home/pi/FTP/")]
    pub directory: PathBuf,
    #[arg(long, default_value = "log.txt")]
    pub log_file: String,
    /// Seconds to wait between two checks.
    #[arg(long, default_value_t = 1800)]
    pub interval: u64,
    /// How often to retry waking the unit or getting a prompt before giving up.
    #[arg(long, default_value_t = 15)]
    pub max_retries: usize,
    /// How often a check may start over after a communication fault.
    #[arg(long, default_value_t = 15)]
    pub max_restarts: usize,
    /// Program used to receive the YMODEM batch transfer.
    #[arg(long, default_value = "rb")]
    pub receive_program: String,
    /// Run a single check and exit.
    #[arg(long)]
    pub once: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.baud == 0 {
            return Err(Error::Config("baud rate must not be 0".to_string()));
        }
        if self.interval == 0 {
            return Err(Error::Config("interval must not be 0".to_string()));
        }
        if self.receive_program.is_empty() {
            return Err(Error::Config("receive program must not be empty".to_string()));
        }
        if self.log_file.is_empty() {
            return Err(Error::Config("log file name must not be empty".to_string()));
        }
        Command::Login {
            access_code: self.access_code.clone(),
        }
        .to_wire()
        .map_err(|_| {
            Error::Config("access code must be printable ASCII and not empty".to_string())
        })?;
        Ok(())
    }

    pub fn log_path(&self) -> PathBuf {
        self.directory.join(&self.log_file)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn settings(&self) -> Settings {
        Settings {
            access_code: self.access_code.clone(),
            max_retries: self.max_retries,
            max_restarts: self.max_restarts,
            timing: Timing::default(),
        }
    }
}
