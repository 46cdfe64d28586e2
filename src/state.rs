/// How a cycle that talked to the instrument ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Events were downloaded, and the unit is back in whatever mode it was
    /// in before.
    Completed,
    /// The unit only holds its template, there was nothing to download.
    NoNewData,
    /// The unit answered, but not in a way we understand (unknown firmware or
    /// unreadable event count). Retrying won't help.
    ProtocolMismatch,
}

/// Why a cycle was given up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// The unit never acknowledged the wake line.
    Unresponsive,
    /// Communication kept failing mid-way, even after restarting from the
    /// wake sequence several times.
    RestartLimitReached,
    /// The unit did not confirm returning to scan mode. It is most likely
    /// still halted, which needs attention on site.
    ResumeUnacknowledged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Waking,
    CheckingData,
    Authenticating,
    QueryingScanStatus,
    Halting,
    Transferring,
    Clearing,
    Resuming,
    Ended(Outcome),
    Aborted(Fault),
}

impl State {
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Ended(_) | State::Aborted(_))
    }

    /// States that recover from communication faults by starting over at
    /// `Waking`.
    pub fn can_restart(&self) -> bool {
        matches!(
            self,
            State::CheckingData
                | State::Authenticating
                | State::Halting
                | State::Clearing
        )
    }

    /// The complete transition table of a polling cycle. Checked on every
    /// step, a cycle that attempts anything else fails with an error.
    pub fn can_transition_to(&self, next: &State) -> bool {
        if self.is_terminal() {
            return false;
        }
        if self.can_restart()
            && matches!(next, State::Waking | State::Aborted(Fault::RestartLimitReached))
        {
            return true;
        }
        matches!(
            (self, next),
            (State::Idle, State::Waking)
                | (State::Waking, State::CheckingData)
                | (State::Waking, State::Aborted(Fault::Unresponsive))
                | (State::CheckingData, State::Authenticating)
                | (State::CheckingData, State::Ended(Outcome::NoNewData))
                | (State::CheckingData, State::Ended(Outcome::ProtocolMismatch))
                | (State::Authenticating, State::QueryingScanStatus)
                | (State::QueryingScanStatus, State::Halting)
                | (State::QueryingScanStatus, State::Transferring)
                | (State::Halting, State::Transferring)
                | (State::Transferring, State::Clearing)
                | (State::Clearing, State::Resuming)
                | (State::Resuming, State::Ended(Outcome::Completed))
                | (State::Resuming, State::Aborted(Fault::ResumeUnacknowledged))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        struct TestCase<'a> {
            name: &'a str,
            from: State,
            to: State,
            expected_result: bool,
        }
        let tests = [
            TestCase {
                name: "StartCycle",
                from: State::Idle,
                to: State::Waking,
                expected_result: true,
            },
            TestCase {
                name: "IdleCannotSkipWake",
                from: State::Idle,
                to: State::CheckingData,
                expected_result: false,
            },
            TestCase {
                name: "Unresponsive",
                from: State::Waking,
                to: State::Aborted(Fault::Unresponsive),
                expected_result: true,
            },
            TestCase {
                name: "WakingCannotRestart",
                from: State::Waking,
                to: State::Waking,
                expected_result: false,
            },
            TestCase {
                name: "Template",
                from: State::CheckingData,
                to: State::Ended(Outcome::NoNewData),
                expected_result: true,
            },
            TestCase {
                name: "AuthenticationRestarts",
                from: State::Authenticating,
                to: State::Waking,
                expected_result: true,
            },
            TestCase {
                name: "HaltRestarts",
                from: State::Halting,
                to: State::Waking,
                expected_result: true,
            },
            TestCase {
                name: "PostTransferPromptRestarts",
                from: State::Clearing,
                to: State::Waking,
                expected_result: true,
            },
            TestCase {
                name: "TooManyRestarts",
                from: State::Clearing,
                to: State::Aborted(Fault::RestartLimitReached),
                expected_result: true,
            },
            TestCase {
                name: "TransferCannotRestart",
                from: State::Transferring,
                to: State::Waking,
                expected_result: false,
            },
            TestCase {
                name: "NoTransferWithoutAuthentication",
                from: State::CheckingData,
                to: State::Transferring,
                expected_result: false,
            },
            TestCase {
                name: "IdleUnitSkipsHalt",
                from: State::QueryingScanStatus,
                to: State::Transferring,
                expected_result: true,
            },
            TestCase {
                name: "ResumeCannotRestart",
                from: State::Resuming,
                to: State::Waking,
                expected_result: false,
            },
            TestCase {
                name: "Completed",
                from: State::Resuming,
                to: State::Ended(Outcome::Completed),
                expected_result: true,
            },
            TestCase {
                name: "TerminalIsFinal",
                from: State::Ended(Outcome::Completed),
                to: State::Waking,
                expected_result: false,
            },
        ];
        for case in tests {
            let got = case.from.can_transition_to(&case.to);
            assert_eq!(
                got, case.expected_result,
                "{}: got={got:?}, want={:?}",
                case.name, case.expected_result
            );
        }
    }

    #[test]
    fn test_is_terminal() {
        assert!(State::Ended(Outcome::NoNewData).is_terminal());
        assert!(State::Aborted(Fault::Unresponsive).is_terminal());
        assert!(!State::Resuming.is_terminal());
        assert!(!State::Idle.is_terminal());
    }
}
