use crate::error::{Error, Result};
use crate::logger::Logger;
use crate::protocol::{self, Command, InfoResponse};
use crate::state::{Fault, Outcome, State};
use crate::timing::{Delay, Timing};
use crate::transfer::FileReceiver;
use crate::transport::{self, Transport};
use crate::wake;

pub struct Settings {
    pub access_code: String,
    /// Ceiling for every retry loop: wake pulses, prompt probes, and attempts
    /// to resume scanning.
    pub max_retries: usize,
    /// How often a cycle may start over from the wake sequence after a
    /// communication fault before it is given up.
    pub max_restarts: usize,
    pub timing: Timing,
}

/// Everything learned during one wake attempt. Discarded whenever the wake
/// sequence starts over: the instrument itself is the only record of what
/// happened before.
#[derive(Default)]
struct Session {
    was_scanning: bool,
    transferred: bool,
}

/// How a cycle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Ended(Outcome),
    Aborted(Fault),
}

/// Drives the instrument through one polling cycle at a time.
pub struct Controller<T: Transport, R: FileReceiver, L: Logger> {
    transport: T,
    receiver: R,
    logger: L,
    delay: Box<dyn Delay>,
    settings: Settings,
}

impl<T: Transport, R: FileReceiver, L: Logger> Controller<T, R, L> {
    pub fn new(
        transport: T,
        receiver: R,
        logger: L,
        delay: Box<dyn Delay>,
        settings: Settings,
    ) -> Controller<T, R, L> {
        Controller {
            transport,
            receiver,
            logger,
            delay,
            settings,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    pub fn logger(&self) -> &L {
        &self.logger
    }

    pub fn log(&mut self, message: &str) {
        self.logger.log(message);
    }

    /// Runs one full cycle: wake the instrument, download new events if there
    /// are any, and leave it scanning if it was scanning before. Instrument
    /// misbehaviour is reported through the returned Termination, errors are
    /// reserved for failures on our side (e.g. the port disappearing).
    pub fn run_cycle(&mut self) -> Result<Termination> {
        let mut state = State::Idle;
        let mut session = Session::default();
        let mut restarts = 0;
        loop {
            let mut next = match state {
                State::Idle => State::Waking,
                State::Waking => {
                    session = Session::default();
                    self.wake()?
                }
                State::CheckingData => self.check_data()?,
                State::Authenticating => self.authenticate()?,
                State::QueryingScanStatus => self.query_scan_status(&mut session)?,
                State::Halting => self.halt()?,
                State::Transferring => self.transfer(&mut session)?,
                State::Clearing => self.clear(&session)?,
                State::Resuming => self.resume(&session)?,
                State::Ended(outcome) => {
                    self.log("Ending communications with seismo.");
                    return Ok(Termination::Ended(outcome));
                }
                State::Aborted(fault) => {
                    self.log("Ending communications with seismo.");
                    return Ok(Termination::Aborted(fault));
                }
            };
            if next == State::Waking && state.can_restart() {
                restarts += 1;
                if restarts > self.settings.max_restarts {
                    self.log(&format!(
                        "Giving up after restarting comms {} times.",
                        self.settings.max_restarts
                    ));
                    next = State::Aborted(Fault::RestartLimitReached);
                }
            }
            check_transition(state, next)?;
            log::debug!("{state:?} -> {next:?}");
            state = next;
        }
    }

    fn exchange(&mut self, command: &Command, settle: core::time::Duration) -> Result<String> {
        transport::exchange(&mut self.transport, self.delay.as_mut(), command, settle)
    }

    /// Probes with bare CRs until the response contains `marker`. Gives up
    /// after `max_retries` retries, i.e. `max_retries + 1` probes.
    pub fn await_marker(&mut self, marker: &str) -> Result<bool> {
        let max_retries = self.settings.max_retries;
        let mut response = String::new();
        let mut retries = 0;
        loop {
            transport::send(&mut self.transport, &Command::Prompt)?;
            response.push_str(&transport::read_text(&mut self.transport)?);
            if response.contains(marker) {
                return Ok(true);
            }
            retries += 1;
            if retries > max_retries {
                self.log(&format!(
                    "Trouble communicating with seismo after {} out of {max_retries} retries.",
                    retries - 1
                ));
                return Ok(false);
            }
            self.log(&format!(
                " Trying to get a prompt {retries} out of {max_retries}"
            ));
            self.delay.pause(self.settings.timing.retry_delay);
        }
    }

    fn await_prompt(&mut self) -> Result<bool> {
        self.await_marker(protocol::PROMPT_MARKER)
    }

    fn stopped(&mut self) {
        self.log("Seismo stopped communicating for some reason.");
    }

    fn wake(&mut self) -> Result<State> {
        self.log("Waiting for seismo to acknowledge...");
        let woke = wake::wake(
            &mut self.transport,
            self.delay.as_mut(),
            &self.settings.timing,
            self.settings.max_retries,
        )?;
        match woke {
            Some(_) => {
                self.log("OK.");
                Ok(State::CheckingData)
            }
            None => {
                self.log(
                    "Seismo not responding. It could be busy, bad battery, or bad comm setup.",
                );
                Ok(State::Aborted(Fault::Unresponsive))
            }
        }
    }

    fn check_data(&mut self) -> Result<State> {
        self.log("Checking seismo for new data...");
        let response = self.exchange(&Command::Info, self.settings.timing.command_settle)?;
        let info = match protocol::parse_info(&response) {
            Ok(InfoResponse::UnknownFirmware) => {
                self.log("Incorrect firmware?");
                return Ok(State::Ended(Outcome::ProtocolMismatch));
            }
            Ok(info) => info,
            Err(e) => {
                self.log(&format!("Unable to read event count: {}", e.reason));
                return Ok(State::Ended(Outcome::ProtocolMismatch));
            }
        };
        if let InfoResponse::Events(count) = &info {
            self.log(&format!("{count} values found."));
        }
        if !info.has_new_data() {
            self.log(" Just a template.");
            return Ok(State::Ended(Outcome::NoNewData));
        }
        if self.await_prompt()? {
            Ok(State::Authenticating)
        } else {
            self.stopped();
            Ok(State::Waking)
        }
    }

    fn authenticate(&mut self) -> Result<State> {
        self.log("Logging into seismo...");
        let login = Command::Login {
            access_code: self.settings.access_code.clone(),
        };
        let response = self.exchange(&login, self.settings.timing.command_settle)?;
        if protocol::is_acknowledged(&response) {
            self.log("OK.");
            Ok(State::QueryingScanStatus)
        } else {
            self.log("Incorrect response from seismo. Restarting comms.");
            Ok(State::Waking)
        }
    }

    fn query_scan_status(&mut self, session: &mut Session) -> Result<State> {
        self.log("Checking to see if seismo is currently scanning...");
        let response = self.exchange(&Command::ListStatus, self.settings.timing.status_settle)?;
        session.was_scanning = protocol::is_scanning(&response);
        if session.was_scanning {
            self.log("Currently in scan mode. Halting...");
            Ok(State::Halting)
        } else {
            self.log("Not in scan mode.");
            Ok(State::Transferring)
        }
    }

    fn halt(&mut self) -> Result<State> {
        if !self.await_prompt()? {
            self.stopped();
            return Ok(State::Waking);
        }
        let response = self.exchange(&Command::Halt, self.settings.timing.command_settle)?;
        if protocol::is_acknowledged(&response) {
            self.log("Temporarily halted.");
            Ok(State::Transferring)
        } else {
            self.log("Seismo did not acknowledge halt. Restarting comms.");
            Ok(State::Waking)
        }
    }

    fn transfer(&mut self, session: &mut Session) -> Result<State> {
        self.log("Transferring files...");
        let result = match self.receiver.prepare() {
            Ok(()) => {
                transport::send(&mut self.transport, &Command::Transfer)?;
                self.receiver.receive()
            }
            Err(e) => Err(e),
        };
        self.delay.pause(self.settings.timing.transfer_settle);
        match result {
            Ok(()) => {
                session.transferred = true;
                self.log("Transfer complete!");
            }
            Err(e) => {
                session.transferred = false;
                self.log(&format!("Transfer failed: {e}"));
            }
        }
        Ok(State::Clearing)
    }

    fn clear(&mut self, session: &Session) -> Result<State> {
        if !self.await_prompt()? {
            self.stopped();
            return Ok(State::Waking);
        }
        if !session.transferred {
            // Events that weren't downloaded must stay on the unit.
            self.log("Not clearing events, the transfer did not complete.");
            return Ok(State::Resuming);
        }
        self.log("Clearing events downloaded from seismo..");
        let response = self.exchange(&Command::ClearEvents, self.settings.timing.command_settle)?;
        if protocol::is_acknowledged(&response) {
            self.log("Events cleared.");
        } else {
            self.log("Seismo did not confirm clearing events.");
        }
        Ok(State::Resuming)
    }

    fn resume(&mut self, session: &Session) -> Result<State> {
        if !session.was_scanning {
            return Ok(State::Ended(Outcome::Completed));
        }
        self.log("Returning unit back to scan mode...");
        let max_retries = self.settings.max_retries;
        let mut retries = 0;
        loop {
            let response = self.exchange(&Command::Run, self.settings.timing.resume_settle)?;
            if protocol::is_acknowledged(&response) {
                break;
            }
            self.stopped();
            retries += 1;
            if retries > max_retries {
                self.log("Unable to return seismo to scan mode, it is probably still halted!");
                return Ok(State::Aborted(Fault::ResumeUnacknowledged));
            }
            self.log(&format!(
                " Retrying scan mode {retries} out of {max_retries}"
            ));
        }
        if !self.await_prompt()? {
            // The unit did acknowledge "run", so it is most likely scanning.
            // There's nothing more we could do anyway.
            self.stopped();
            return Ok(State::Ended(Outcome::Completed));
        }
        self.log("Unit scanning.");
        Ok(State::Ended(Outcome::Completed))
    }
}

fn check_transition(from: State, to: State) -> Result<()> {
    if from.can_transition_to(&to) {
        Ok(())
    } else {
        Err(Error::InvalidTransition { from, to })
    }
}
