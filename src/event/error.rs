use thiserror::Error;

/// Errors surfaced by the event manager itself.
///
/// These are all fatal: a loop that cannot poll or a watcher that cannot
/// register has no recovery path. Per-tick I/O failures never reach this
/// type; handlers log them and abandon the tick.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("event loop I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("watcher registration failed: {0}")]
    Registration(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EventError>;
