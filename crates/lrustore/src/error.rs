//! Error types for lrustore
//!
//! Store operations never fail. Errors only come from loading a
//! [`StoreConfig`](crate::StoreConfig).

use std::fmt;

/// Result type alias for configuration loading
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for configuration loading
#[derive(Debug)]
pub enum Error {
    /// Byte-size string could not be parsed
    InvalidByteSize(String),

    /// Malformed JSON configuration
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidByteSize(input) => write!(f, "Invalid byte size: {:?}", input),
            Error::Json(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_invalid_byte_size() {
        let err = Error::InvalidByteSize("12XB".to_string());
        assert_eq!(err.to_string(), "Invalid byte size: \"12XB\"");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_json_error_has_source() {
        let json_err = serde_json::from_str::<u64>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().starts_with("Invalid configuration: "));
        assert!(err.source().is_some());
    }
}
