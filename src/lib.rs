extern crate serialport;

pub mod config;
pub mod controller;
pub mod error;
pub mod logger;
#[cfg(test)]
mod mock;
pub mod protocol;
pub mod scheduler;
pub mod state;
pub mod timing;
pub mod transfer;
pub mod transport;
pub mod wake;

pub use config::Config;
pub use controller::{Controller, Settings, Termination};
pub use error::{Error, Result};
pub use state::{Fault, Outcome, State};
