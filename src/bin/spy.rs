use clap::Parser;

use seismo_poll::protocol::{self, Command, InfoResponse};
use seismo_poll::timing::{ThreadDelay, Timing};
use seismo_poll::transport::{exchange, SerialTransport};
use seismo_poll::wake::wake;

/// Wakes the seismograph and dumps its `inf` response. This neither logs in
/// nor touches any data, so it's safe to use on a unit that is recording.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[arg(default_value = "/dev/ttyUSB0")]
    port: String,
    #[arg(long, default_value_t = 9600)]
    baud: u32,
    #[arg(long, default_value_t = 15)]
    max_retries: usize,
}

fn main() {
    env_logger::init();
    eprintln!("seismo spy (v{})", env!("CARGO_PKG_VERSION"));
    let args = Args::parse();

    let mut transport = match SerialTransport::open(&args.port, args.baud) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("Unable to open {}: {e}", args.port);
            std::process::exit(1);
        }
    };
    let timing = Timing::default();
    let mut delay = ThreadDelay;

    match wake(&mut transport, &mut delay, &timing, args.max_retries) {
        Ok(Some(pulses)) => eprintln!("Awake after {pulses} wake pulse(s)."),
        Ok(None) => {
            eprintln!("Seismo not responding.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Wake failed: {e}");
            std::process::exit(1);
        }
    }

    let response = match exchange(&mut transport, &mut delay, &Command::Info, timing.command_settle)
    {
        Ok(response) => response,
        Err(e) => {
            eprintln!("inf failed: {e}");
            std::process::exit(1);
        }
    };
    for line in response.lines() {
        println!("{}", line.trim());
    }
    match protocol::parse_info(&response) {
        Ok(InfoResponse::Events(count)) => eprintln!("Stored events: {count}"),
        Ok(InfoResponse::UnknownFirmware) => eprintln!("Unknown firmware."),
        Err(e) => eprintln!("Unable to read event count: {}", e.reason),
    }
}
