use std::time::Duration;

/// Pauses used while talking to the instrument. None of these are documented
/// by the manufacturer, the defaults were found by trial and error against
/// real units and may need adjusting for other hardware.
#[derive(Clone, Debug, PartialEq)]
pub struct Timing {
    /// How long DTR is held low while pulsing the wake line.
    pub wake_low: Duration,
    /// How long to wait after raising DTR again before reading.
    pub wake_high: Duration,
    /// Wait between sending a command and reading its response.
    pub command_settle: Duration,
    /// `lst` is noticeably slower than the other commands.
    pub status_settle: Duration,
    pub transfer_settle: Duration,
    pub resume_settle: Duration,
    /// Wait between two attempts to get a prompt.
    pub retry_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            wake_low: Duration::from_secs(2),
            wake_high: Duration::from_secs(3),
            command_settle: Duration::from_secs(2),
            status_settle: Duration::from_secs(5),
            transfer_settle: Duration::from_secs(5),
            resume_settle: Duration::from_secs(5),
            retry_delay: Duration::from_secs(10),
        }
    }
}

impl Timing {
    pub fn zero() -> Timing {
        Timing {
            wake_low: Duration::ZERO,
            wake_high: Duration::ZERO,
            command_settle: Duration::ZERO,
            status_settle: Duration::ZERO,
            transfer_settle: Duration::ZERO,
            resume_settle: Duration::ZERO,
            retry_delay: Duration::ZERO,
        }
    }
}

pub trait Delay {
    fn pause(&mut self, duration: Duration);
}

/// Blocks the current thread. Everything runs on one thread, so there is
/// nothing else that could make progress in the meantime anyway.
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordedDelay {
    pub pauses: Vec<Duration>,
}

impl Delay for RecordedDelay {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}
