use thiserror::Error;

/// Trip engine error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TripError {
    #[error("Invalid trip state: {0}")]
    InvalidState(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for trip engine operations
pub type TripResult<T> = Result<T, TripError>;

impl From<serde_json::Error> for TripError {
    fn from(err: serde_json::Error) -> Self {
        TripError::Storage(format!("JSON serialization failed: {err}"))
    }
}

impl From<std::io::Error> for TripError {
    fn from(err: std::io::Error) -> Self {
        TripError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TripError::InvalidState("trip already finalized".to_string());
        assert_eq!(err.to_string(), "Invalid trip state: trip already finalized");

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing dir");
        assert_eq!(TripError::from(io), TripError::Storage("missing dir".to_string()));
    }
}
