use thiserror::Error;

/// Severity classes for socket-level failures.
///
/// `Fatal` covers conditions the process cannot meaningfully continue past:
/// socket creation, bind, socket options, address parsing. `Transient` covers
/// per-tick I/O failures; the current readiness tick is abandoned and the
/// loop carries on with the next notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Transient,
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("socket setup failed ({context}): {source}")]
    Setup {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("not a parseable IPv4 address: {0}")]
    BadAddress(String),

    #[error("short write: sent {sent} of {requested} bytes")]
    ShortWrite { sent: usize, requested: usize },

    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    #[error("receive failed: {0}")]
    RecvFailed(#[source] std::io::Error),
}

impl SocketError {
    /// Severity of this error under the two-tier model.
    pub fn severity(&self) -> Severity {
        match self {
            SocketError::Setup { .. } | SocketError::BadAddress(_) => Severity::Fatal,
            SocketError::ShortWrite { .. }
            | SocketError::SendFailed(_)
            | SocketError::RecvFailed(_) => Severity::Transient,
        }
    }
}

pub type Result<T> = std::result::Result<T, SocketError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_setup_errors_are_fatal() {
        let err = SocketError::Setup {
            context: "bind",
            source: std::io::Error::from(ErrorKind::AddrInUse),
        };
        assert_eq!(err.severity(), Severity::Fatal);

        let err = SocketError::BadAddress("not-an-ip".to_string());
        assert_eq!(err.severity(), Severity::Fatal);
    }

    #[test]
    fn test_per_tick_errors_are_transient() {
        let err = SocketError::ShortWrite {
            sent: 3,
            requested: 5,
        };
        assert_eq!(err.severity(), Severity::Transient);

        let err = SocketError::SendFailed(std::io::Error::from(ErrorKind::PermissionDenied));
        assert_eq!(err.severity(), Severity::Transient);

        let err = SocketError::RecvFailed(std::io::Error::from(ErrorKind::WouldBlock));
        assert_eq!(err.severity(), Severity::Transient);
    }
}
