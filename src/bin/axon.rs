use anyhow::Result;
use axon::event::{EventManager, Handler};
use axon::relay::{init_logging, Config, Mode};
use axon::socket::{address, Endpoint};
use clap::Parser;
use mio::Interest;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments
    let config = Config::parse();

    // Initialize structured logging with config options
    init_logging(&config.log_level, config.is_json_format());

    // Validate configuration
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    println!("{}", config.summary());

    if let Err(e) = run(config) {
        error!(error = %e, "Relay failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: Config) -> Result<()> {
    let mut manager = EventManager::new()?;

    match config.mode {
        Mode::Receive => {
            let endpoint = Endpoint::receiver(config.port)?;
            manager.register(endpoint, Interest::READABLE, Handler::receive(), config.port)?;
            info!(port = config.port, "Receiver registered");
        }
        Mode::Broadcast => {
            let endpoint = Endpoint::broadcast(&config.interface, config.port)?;
            manager.register(
                endpoint,
                Interest::WRITABLE,
                Handler::broadcast(config.port),
                config.port,
            )?;
            info!(
                interface = %config.interface,
                port = config.port,
                "Broadcast transmitter registered"
            );
        }
        Mode::Forward => {
            let receiver = Endpoint::receiver(config.port)?;
            let transmitter = Endpoint::transmitter(config.app_port)?;
            let dest = address::unicast(&config.forward_host, config.app_port)?;
            manager.register(
                receiver,
                Interest::READABLE,
                Handler::forward(transmitter, dest, config.verbose_forward),
                config.port,
            )?;
            info!(
                port = config.port,
                app_port = config.app_port,
                "Forwarder registered"
            );
        }
    }

    info!("Event loop running; terminate the process to stop");
    manager.run()?;
    Ok(())
}
