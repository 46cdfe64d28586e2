use crate::error::Result;
use crate::protocol;
use crate::timing::{Delay, Timing};
use crate::transport::{read_text, Transport};

/// Pulses DTR low and back high, which rouses the instrument's serial
/// interface if it has powered down to save battery.
pub fn pulse_wake_line(
    transport: &mut dyn Transport,
    delay: &mut dyn Delay,
    timing: &Timing,
) -> Result<()> {
    transport.set_wake_line(false)?;
    delay.pause(timing.wake_low);
    transport.set_wake_line(true)?;
    delay.pause(timing.wake_high);
    Ok(())
}

/// Reopens the port and pulses the wake line until the instrument announces
/// itself. Returns the number of pulses that were needed, or None if it still
/// hadn't answered after `max_retries + 1` pulses.
pub fn wake(
    transport: &mut dyn Transport,
    delay: &mut dyn Delay,
    timing: &Timing,
    max_retries: usize,
) -> Result<Option<usize>> {
    transport.reopen()?;
    let mut response = read_text(transport)?;
    let mut pulses = 0;
    while !protocol::is_awake(&response) {
        if pulses > max_retries {
            return Ok(None);
        }
        pulses += 1;
        log::debug!("pulsing wake line ({pulses} of {})", max_retries + 1);
        pulse_wake_line(transport, delay, timing)?;
        response.push_str(&read_text(transport)?);
    }
    Ok(Some(pulses))
}
