use clap::Parser;

use seismo_poll::logger::{FileLogger, Logger};
use seismo_poll::scheduler::Scheduler;
use seismo_poll::timing::ThreadDelay;
use seismo_poll::transfer::{FileReceiver, YmodemReceiver};
use seismo_poll::transport::{SerialTransport, Transport};
use seismo_poll::{Config, Controller};

fn main() {
    env_logger::init();
    eprintln!("seismo-poll (v{})", env!("CARGO_PKG_VERSION"));

    // Anything going wrong before the first cycle is a setup problem, and
    // there's no point in running unattended with a broken setup.
    let config = Config::parse();
    if let Err(e) = config.validate() {
        eprintln!("{e}");
        std::process::exit(2);
    }
    if let Err(e) = std::fs::create_dir_all(&config.directory) {
        eprintln!(
            "Unable to create download directory {}: {e}",
            config.directory.display()
        );
        std::process::exit(1);
    }
    let mut logger = match FileLogger::open(&config.log_path()) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Unable to open log file: {e}");
            std::process::exit(1);
        }
    };
    let transport = match SerialTransport::open(&config.port, config.baud) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("Could not use {} for comms: {e}", config.port);
            std::process::exit(1);
        }
    };
    log::info!("logging to {}", logger.path().display());
    let receiver = YmodemReceiver::new(&config.port, config.baud, &config.directory)
        .with_program(&config.receive_program);

    logger.log(&format!(
        "Script started (seismo #{}) ----------------------------------",
        config.serial_number
    ));
    let mut controller = Controller::new(
        transport,
        receiver,
        logger,
        Box::new(ThreadDelay),
        config.settings(),
    );

    if config.once {
        run_cycle(&mut controller);
        return;
    }

    let (scheduler, tx_shutdown) = Scheduler::new(config.interval());
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = tx_shutdown.send(());
    }) {
        eprintln!("Unable to install signal handler, ctrl-c will not stop gracefully: {e}");
    }
    scheduler.run(|| {
        run_cycle(&mut controller);
        controller.log(&format!(
            "Waiting {} seconds before next check.",
            scheduler.interval().as_secs()
        ));
    });
    controller.log("Script stopped.");
}

fn run_cycle<T: Transport, R: FileReceiver, L: Logger>(controller: &mut Controller<T, R, L>) {
    match controller.run_cycle() {
        Ok(termination) => log::info!("cycle finished: {termination:?}"),
        // Most likely the USB adapter went away. It might come back, so keep
        // going.
        Err(e) => controller.log(&format!("Communication error: {e}")),
    }
}
