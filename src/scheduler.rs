use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Runs a job immediately, and then again every `interval` (measured from
/// the end of the previous run) until asked to stop.
pub struct Scheduler {
    interval: Duration,
    rx_shutdown: Receiver<()>,
}

impl Scheduler {
    /// Returns the scheduler, and the sender used to request shutdown (e.g.
    /// from a signal handler).
    pub fn new(interval: Duration) -> (Scheduler, Sender<()>) {
        let (tx_shutdown, rx_shutdown) = mpsc::channel();
        (
            Scheduler {
                interval,
                rx_shutdown,
            },
            tx_shutdown,
        )
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the number of times `job` was run. Only returns once shutdown
    /// was requested: a job that is already running is never interrupted.
    pub fn run(&self, mut job: impl FnMut()) -> usize {
        let mut runs = 0;
        loop {
            job();
            runs += 1;
            if !self.wait() {
                return runs;
            }
        }
    }

    /// Sleeps for one interval. Returns false if shutdown was requested.
    fn wait(&self) -> bool {
        match self.rx_shutdown.recv_timeout(self.interval) {
            Ok(()) => false,
            Err(RecvTimeoutError::Timeout) => true,
            Err(RecvTimeoutError::Disconnected) => {
                // Nobody can ask us to stop anymore, which just means we
                // run forever.
                std::thread::sleep(self.interval);
                true
            }
        }
    }
}
