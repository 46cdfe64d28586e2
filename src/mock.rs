//! A scripted stand-in for the instrument, for exercising the protocol
//! without hardware.

use std::collections::{HashMap, VecDeque};

use crate::error::{Error, Result};
use crate::transfer::FileReceiver;
use crate::transport::Transport;

pub struct MockInstrument {
    /// Responses used once each (in order) before falling back to `defaults`.
    scripts: HashMap<String, VecDeque<String>>,
    defaults: HashMap<String, String>,
    /// None: the unit never wakes up. Some(0): it is awake as soon as the
    /// port is opened.
    wake_after: Option<usize>,
    pulses_since_open: usize,
    pulses: usize,
    dtr: bool,
    reopened: usize,
    pending: String,
    sent: Vec<String>,
    rx: Vec<u8>,
}

impl MockInstrument {
    pub fn new() -> MockInstrument {
        let defaults = [
            ("", "\r\n>"),
            ("inf", "inf\r\nV[05.32] SN 4402 (12,3,0)\r\n>"),
            ("key ABC123", "OK\r\n>"),
            ("lst", "MODE: STOPPED\r\n>"),
            ("hlt", "OK\r\n"),
            ("xfr 0", ""),
            ("clr E", "OK\r\n>"),
            ("run", "OK\r\n"),
        ];
        MockInstrument {
            scripts: HashMap::new(),
            defaults: defaults
                .iter()
                .map(|(command, response)| (command.to_string(), response.to_string()))
                .collect(),
            wake_after: Some(1),
            pulses_since_open: 0,
            pulses: 0,
            dtr: true,
            reopened: 0,
            pending: String::new(),
            sent: Vec::new(),
            rx: Vec::new(),
        }
    }

    pub fn wakes_after(mut self, pulses: usize) -> MockInstrument {
        self.wake_after = Some(pulses);
        self
    }

    pub fn never_wakes(mut self) -> MockInstrument {
        self.wake_after = None;
        self
    }

    /// Sets the response to `command` (without its CR).
    pub fn respond(mut self, command: &str, response: &str) -> MockInstrument {
        self.defaults
            .insert(command.to_string(), response.to_string());
        self
    }

    /// Queues one-off responses to `command`, used before the default.
    pub fn script(mut self, command: &str, responses: &[&str]) -> MockInstrument {
        self.scripts
            .entry(command.to_string())
            .or_default()
            .extend(responses.iter().map(|r| r.to_string()));
        self
    }

    /// Every CR-terminated line received, including bare prompt probes.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    /// Received lines other than prompt probes.
    pub fn commands(&self) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|line| !line.is_empty())
            .map(|line| line.as_str())
            .collect()
    }

    pub fn count(&self, command: &str) -> usize {
        self.sent.iter().filter(|line| *line == command).count()
    }

    pub fn pulses(&self) -> usize {
        self.pulses
    }

    pub fn reopened(&self) -> usize {
        self.reopened
    }

    fn announce_if_awake(&mut self) {
        if self.wake_after == Some(self.pulses_since_open) {
            self.rx.extend_from_slice(b"\0ATE0\r\n");
        }
    }

    fn respond_to(&mut self, line: &str) -> String {
        if let Some(response) = self.scripts.get_mut(line).and_then(|q| q.pop_front()) {
            return response;
        }
        self.defaults.get(line).cloned().unwrap_or_default()
    }
}

impl Transport for MockInstrument {
    fn reopen(&mut self) -> Result<()> {
        self.reopened += 1;
        self.rx.clear();
        self.pending.clear();
        self.pulses_since_open = 0;
        self.announce_if_awake();
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.pending.push_str(&String::from_utf8_lossy(bytes));
        while let Some(end) = self.pending.find('\r') {
            let line: String = self.pending.drain(..=end).collect();
            let line = line.trim_end_matches('\r').to_string();
            let response = self.respond_to(&line);
            self.rx.extend_from_slice(response.as_bytes());
            self.sent.push(line);
        }
        Ok(())
    }

    fn read_available(&mut self) -> Result<Vec<u8>> {
        Ok(std::mem::take(&mut self.rx))
    }

    fn set_wake_line(&mut self, level: bool) -> Result<()> {
        if level && !self.dtr {
            self.pulses += 1;
            self.pulses_since_open += 1;
            self.announce_if_awake();
        }
        self.dtr = level;
        Ok(())
    }
}

#[derive(Default)]
pub struct MockReceiver {
    pub prepared: usize,
    pub received: usize,
    pub fail: bool,
}

impl FileReceiver for MockReceiver {
    fn prepare(&mut self) -> Result<()> {
        self.prepared += 1;
        Ok(())
    }

    fn receive(&mut self) -> Result<()> {
        self.received += 1;
        if self.fail {
            return Err(Error::Transfer("rb failed (exit status: 1)".to_string()));
        }
        Ok(())
    }
}

impl Default for MockInstrument {
    fn default() -> Self {
        MockInstrument::new()
    }
}
