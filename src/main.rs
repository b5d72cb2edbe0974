mod command;
mod config;
mod controller;
mod detector;
mod device;
mod dump;
mod error;
mod input;
mod notify;
mod toggle;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use config::{Cli, Command, ToggleConfig};
use error::Error;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> error::Result<()> {
    let config = ToggleConfig::load(cli)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .map_err(|e| Error::Unexpected(format!("cannot install signal handler: {}", e)))?;

    match &cli.subcommand {
        Some(Command::Devices) => dump::run_devices(&config),
        Some(Command::Dump) => dump::run_dump(&config, &shutdown),
        None => controller::run(&config, &shutdown),
    }
}

fn report(err: &Error) {
    log::error!("{}", err);
    if let Error::PermissionDenied(_) = err {
        log::error!("Try running with sudo or add user to input group:");
        log::error!("sudo usermod -a -G input $USER");
        log::error!("Then log out and back in.");
    }
}
