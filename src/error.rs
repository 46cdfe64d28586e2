use crate::protocol::InvalidCommandError;
use crate::state::State;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid command: {0:?}")]
    InvalidCommand(InvalidCommandError),

    #[error("file transfer failed: {0}")]
    Transfer(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid state transition {from:?} -> {to:?}")]
    InvalidTransition { from: State, to: State },
}

impl From<InvalidCommandError> for Error {
    fn from(error: InvalidCommandError) -> Self {
        Error::InvalidCommand(error)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
