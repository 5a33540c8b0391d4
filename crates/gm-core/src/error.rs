//! Structured errors, serialized as-is onto the control surface

use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{code:?}] {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A start was requested while the corresponding session is running.
    AlreadyActive,
    /// A stop/consume was requested with no active session.
    NotActive,
    /// A malformed log entry was encountered during replay.
    InvalidEvent,
    /// Input-observer installation failed; the capture session is dead.
    CaptureError,
    /// Synthetic-input emission failed for one event.
    PlaybackError,
    /// The request body or parameters were unusable.
    BadRequest,
    /// The operation is not available on this platform.
    NotImplemented,
    Unknown,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn already_active(what: &str) -> Self {
        Self::new(ErrorCode::AlreadyActive, format!("Already {}", what))
    }

    pub fn not_active(what: &str) -> Self {
        Self::new(ErrorCode::NotActive, format!("Not {}", what))
    }

    pub fn invalid_event(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidEvent, reason)
    }

    pub fn capture(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::CaptureError, reason)
    }

    pub fn playback(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::PlaybackError, reason)
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, reason)
    }

    pub fn not_implemented(what: &str) -> Self {
        Self::new(
            ErrorCode::NotImplemented,
            format!("{} is not available on this platform", what),
        )
    }

    /// HTTP status this error maps to on the control surface.
    pub fn http_status(&self) -> u16 {
        match self.code {
            ErrorCode::AlreadyActive
            | ErrorCode::NotActive
            | ErrorCode::InvalidEvent
            | ErrorCode::BadRequest => 400,
            ErrorCode::NotImplemented => 501,
            ErrorCode::CaptureError | ErrorCode::PlaybackError | ErrorCode::Unknown => 500,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorCode::Unknown, e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ErrorCode::BadRequest, e.to_string())
    }
}
