use std::fmt;
use std::io;

use ttswire_client::ClientError;
use ttswire_frame::FrameError;
use ttswire_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const AUTH_FAILED: i32 = 40;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const VENDOR_ERROR: i32 = 70;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => USAGE,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    if matches!(err.http_status(), Some(401 | 403)) {
        return CliError::new(AUTH_FAILED, format!("{context}: {err}"));
    }
    let code = match err {
        TransportError::ConnectTimeout { .. } => TIMEOUT,
        TransportError::InvalidRequest(_) => USAGE,
        TransportError::Closed => FAILURE,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Transport(err) => transport_error(context, err),
        ClientError::Frame(err) => frame_error(context, err),
        ClientError::ConnectTimeout(_) | ClientError::Timeout(_) => {
            CliError::new(TIMEOUT, format!("{context}: {err}"))
        }
        ClientError::Vendor { .. } => CliError::new(VENDOR_ERROR, format!("{context}: {err}")),
        ClientError::PrematureClose { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        ClientError::MissingSecretKey | ClientError::InvalidSpeedRatio(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn client_errors_map_to_exit_codes() {
        let vendor = ClientError::Vendor {
            code: 4000,
            message: "bad voice".to_string(),
        };
        assert_eq!(client_error("synth", vendor).code, VENDOR_ERROR);
        assert_eq!(
            client_error("synth", ClientError::Timeout(Duration::from_secs(1))).code,
            TIMEOUT
        );
        assert_eq!(
            client_error("synth", ClientError::MissingSecretKey).code,
            USAGE
        );
        assert_eq!(
            client_error("synth", ClientError::InvalidSpeedRatio(f64::NAN)).code,
            USAGE
        );
        assert_eq!(
            client_error("synth", ClientError::PrematureClose { chunks: 2 }).code,
            FAILURE
        );
        let truncated = FrameError::TooShort {
            field: "payload",
            needed: 8,
            available: 2,
        };
        assert_eq!(client_error("synth", truncated.into()).code, DATA_INVALID);
    }

    #[test]
    fn full_disk_is_internal() {
        let err = io_error("failed writing output", io::Error::from_raw_os_error(28));
        assert_eq!(err.code, INTERNAL);
        assert!(err.message.starts_with("failed writing output: "));
    }

    #[test]
    fn message_keeps_context() {
        let err = client_error("synthesis failed", ClientError::MissingSecretKey);
        assert!(err.to_string().starts_with("synthesis failed: "));
    }
}
