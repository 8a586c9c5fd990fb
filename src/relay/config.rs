//! Runtime configuration.
//!
//! Provides CLI argument parsing and validation for the relay.

use clap::{Parser, ValueEnum};
use tracing::debug;

/// Which packet handler gets wired into the event loop.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Receive datagrams on the network port and print them
    Receive,
    /// Periodically broadcast the fixed test payload
    Broadcast,
    /// Relay datagrams from the network port to the application port
    Forward,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "axon")]
#[command(version)]
#[command(about = "Event-driven UDP relay and broadcast test tool")]
pub struct Config {
    /// Operating mode
    #[arg(long, value_enum, default_value_t = Mode::Receive)]
    pub mode: Mode,

    /// Network interface for broadcast transmission
    #[arg(long, default_value = "eth0")]
    pub interface: String,

    /// Network-side UDP port
    #[arg(long, default_value_t = 9000)]
    pub port: u16,

    /// Application-side UDP port (forward mode)
    #[arg(long, default_value_t = 9100)]
    pub app_port: u16,

    /// Host datagrams are forwarded to (forward mode)
    #[arg(long, default_value = "127.0.0.1")]
    pub forward_host: String,

    /// Print forwarded byte counts and payload hex dumps
    #[arg(long)]
    pub verbose_forward: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log format (text or json)
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub log_format: String,
}

impl Config {
    /// Validates the configuration values
    pub fn validate(&self) -> Result<(), String> {
        debug!("Validating configuration");

        if self.port == 0 {
            return Err("port must be > 0".into());
        }

        match self.mode {
            Mode::Broadcast => {
                if self.interface.is_empty() {
                    return Err("interface must not be empty in broadcast mode".into());
                }
            }
            Mode::Forward => {
                if self.app_port == 0 {
                    return Err("app-port must be > 0".into());
                }
                if self.app_port == self.port {
                    return Err("app-port must differ from port in forward mode".into());
                }
            }
            Mode::Receive => {}
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            ));
        }

        debug!("Configuration validated successfully");
        Ok(())
    }

    /// Returns true if JSON format logging is enabled
    pub fn is_json_format(&self) -> bool {
        self.log_format.to_lowercase() == "json"
    }

    /// Human-readable summary printed before the event loop starts.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("mode        = {:?}", self.mode),
            format!("port        = {}", self.port),
        ];
        match self.mode {
            Mode::Broadcast => lines.push(format!("interface   = {}", self.interface)),
            Mode::Forward => {
                lines.push(format!(
                    "forward-to  = {}:{}",
                    self.forward_host, self.app_port
                ));
                lines.push(format!("verbose-fwd = {}", self.verbose_forward));
            }
            Mode::Receive => {}
        }
        lines.join("\n")
    }
}
