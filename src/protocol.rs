use std::str::FromStr;

/// Marker emitted by the instrument's serial interface once it has woken up.
pub const READY_MARKER: &str = "ATE0";
/// Firmware version prefix contained in the `inf` response. Anything else is
/// a firmware we don't know how to talk to.
pub const FIRMWARE_MARKER: &str = "[05.";
pub const ACK_MARKER: &str = "OK";
pub const PROMPT_MARKER: &str = ">";
/// Contained in the `lst` response while the instrument is recording.
pub const SCANNING_MARKER: &str = "NOT STOPPED";

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// inf - firmware version and stored event count.
    Info,
    /// key - unlocks the instrument using the access code.
    Login { access_code: String },
    /// lst - reports (amongst other things) whether the unit is scanning.
    ListStatus,
    Halt,
    /// xfr 0 - starts a batch transfer of all stored events.
    Transfer,
    /// clr E - deletes stored events.
    ClearEvents,
    Run,
    /// A bare carriage return, which makes the instrument print its prompt.
    Prompt,
}

#[derive(Debug, PartialEq)]
pub enum InvalidCommandError {
    /// The access code would corrupt the command framing.
    InvalidAccessCode(String),
}

impl Command {
    pub fn to_wire(&self) -> Result<String, InvalidCommandError> {
        let body = match self {
            Command::Info => "inf".to_string(),
            Command::Login { access_code } => {
                if access_code.is_empty()
                    || !access_code.is_ascii()
                    || access_code.chars().any(|c| c.is_ascii_control())
                {
                    return Err(InvalidCommandError::InvalidAccessCode(access_code.clone()));
                }
                format!("key {access_code}")
            }
            Command::ListStatus => "lst".to_string(),
            Command::Halt => "hlt".to_string(),
            Command::Transfer => "xfr 0".to_string(),
            Command::ClearEvents => "clr E".to_string(),
            Command::Run => "run".to_string(),
            Command::Prompt => String::new(),
        };
        Ok(body + self.terminator())
    }

    fn terminator(&self) -> &'static str {
        match self {
            // The unit expects an extra CR after mode changes.
            Command::Halt | Command::Run => "\r\r",
            _ => "\r",
        }
    }
}

#[derive(Debug)]
pub struct ParseError {
    pub received_message: String,
    pub reason: String,
}

impl PartialEq for ParseError {
    fn eq(&self, other: &Self) -> bool {
        self.received_message == other.received_message
    }
}

impl Eq for ParseError {}

/// The parts of the `inf` response that we care about.
#[derive(Debug, PartialEq)]
pub enum InfoResponse {
    /// The firmware marker is missing - either the unit runs firmware we
    /// don't understand, or the response was garbled.
    UnknownFirmware,
    Events(usize),
}

impl InfoResponse {
    /// The instrument always reports at least one "event", which is its
    /// configuration template. Only more than that is real data.
    pub fn has_new_data(&self) -> bool {
        matches!(self, InfoResponse::Events(count) if *count > 1)
    }
}

/// Parses the `inf` response. The event count is the first field inside the
/// first pair of parentheses, e.g. `... (12,3,...)`.
pub fn parse_info(response: &str) -> Result<InfoResponse, ParseError> {
    if !response.contains(FIRMWARE_MARKER) {
        return Ok(InfoResponse::UnknownFirmware);
    }
    let Some((_, after_paren)) = response.split_once('(') else {
        return Err(ParseError {
            received_message: response.to_string(),
            reason: "no event count section".to_string(),
        });
    };
    let count = after_paren.split(',').next().unwrap_or_default().trim();
    match usize::from_str(count) {
        Ok(count) => Ok(InfoResponse::Events(count)),
        Err(_) => Err(ParseError {
            received_message: response.to_string(),
            reason: format!("unable to parse event count {count:?}"),
        }),
    }
}

pub fn is_awake(response: &str) -> bool {
    response.contains(READY_MARKER)
}

pub fn is_acknowledged(response: &str) -> bool {
    response.contains(ACK_MARKER)
}

pub fn is_scanning(response: &str) -> bool {
    response.contains(SCANNING_MARKER)
}
