//! Runtime configuration and process plumbing for the relay.

pub mod config;
pub mod constants;
pub mod logging;

pub use config::{Config, Mode};
pub use constants::*;
pub use logging::init_logging;
