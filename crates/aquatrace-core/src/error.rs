//! Unified error model
use thiserror::Error;

/// Failures raised by a state backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A key read or range scanned by the transaction was committed by
    /// someone else in the meantime. The caller may retry.
    #[error("CONFLICT/{0}")]
    Conflict(String),

    #[error("BACKEND/{0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("VALIDATION/{0}")]
    Validation(String),

    #[error("NOT_FOUND/{0}")]
    NotFound(String),

    #[error("ALREADY_EXISTS/{0}")]
    AlreadyExists(String),

    #[error("DESERIALIZATION/{0}")]
    Deserialization(String),

    #[error("NOT_FOUND/compliance thresholds {0} not found")]
    ThresholdsNotFound(String),

    #[error("DESERIALIZATION/invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("STORE/{0}")]
    Store(#[from] StoreError),
}

/// Coarse error category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AlreadyExists,
    Deserialization,
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::Deserialization => "DESERIALIZATION",
            ErrorKind::Store => "STORE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::NotFound(_) | LedgerError::ThresholdsNotFound(_) => ErrorKind::NotFound,
            LedgerError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            LedgerError::Deserialization(_) | LedgerError::InvalidParameters(_) => {
                ErrorKind::Deserialization
            }
            LedgerError::Store(_) => ErrorKind::Store,
        }
    }

    /// True when retrying the whole operation may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, LedgerError::Store(StoreError::Conflict(_)))
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Deserialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            LedgerError::ThresholdsNotFound("EU".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LedgerError::InvalidParameters("ph".into()).kind(),
            ErrorKind::Deserialization
        );
        let conflict: LedgerError = StoreError::Conflict("station-index:S".into()).into();
        assert_eq!(conflict.kind(), ErrorKind::Store);
        assert!(conflict.is_conflict());
    }

    #[test]
    fn test_display_prefix() {
        let err = LedgerError::AlreadyExists("record QR_1 already exists".into());
        assert_eq!(err.to_string(), "ALREADY_EXISTS/record QR_1 already exists");
    }
}
