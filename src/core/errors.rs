use serde::ser::SerializeStruct;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("design api rejected the access token")]
    Auth,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transient error: {0}")]
    Transient(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("anchor text not found: {0}")]
    AnchorNotFound(String),
    #[error("anchor node {0} has no parent")]
    ParentNotFound(String),
    #[error("run deadline of {0}s exceeded")]
    DeadlineExceeded(u64),
    #[error("io error: {0}")]
    Io(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AppError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Auth => "AUTH_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Transient(_) => "TRANSIENT_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::InvalidResponse(_) => "INVALID_RESPONSE",
            Self::AnchorNotFound(_) => "ANCHOR_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::DeadlineExceeded(_) => "DEADLINE_EXCEEDED",
            Self::Io(_) => "IO_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a later attempt could succeed. Nothing retries today; the
    /// classification only shapes the diagnostic.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Timeout)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidResponse(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
