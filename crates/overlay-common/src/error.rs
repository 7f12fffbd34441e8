//! Error types for overlay tile requests.

use thiserror::Error;

/// Result type alias using TileError.
pub type TileResult<T> = Result<T, TileError>;

/// Primary error type for tile conversion and protocol dispatch.
///
/// Decoding and classification are total, so every variant here comes from
/// a collaborator (loader, codec, registry) or from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    // === Collaborator Errors ===
    #[error("Source raster unreadable: {0}")]
    SourceUnreadable(String),

    #[error("Failed to encode output raster: {0}")]
    Encoding(String),

    // === Registry Errors ===
    #[error("No protocol registered for scheme: {0}")]
    UnknownScheme(String),

    #[error("Protocol already registered: {0}")]
    AlreadyRegistered(String),

    // === Setup Errors ===
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No async runtime available: {0}")]
    Runtime(String),
}

impl TileError {
    /// Create a SourceUnreadable error.
    pub fn source_unreadable(msg: impl Into<String>) -> Self {
        Self::SourceUnreadable(msg.into())
    }

    /// Create an Encoding error.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the HTTP status code a host should answer with for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            TileError::SourceUnreadable(_) => 502,
            TileError::UnknownScheme(_) => 404,
            TileError::AlreadyRegistered(_) => 409,
            TileError::Encoding(_) | TileError::Config(_) | TileError::Runtime(_) => 500,
        }
    }
}

impl From<serde_json::Error> for TileError {
    fn from(err: serde_json::Error) -> Self {
        TileError::Config(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_codes() {
        assert_eq!(TileError::source_unreadable("404 from upstream").http_status_code(), 502);
        assert_eq!(TileError::encoding("zlib").http_status_code(), 500);
        assert_eq!(TileError::UnknownScheme("foo".into()).http_status_code(), 404);
        assert_eq!(TileError::AlreadyRegistered("shinsui".into()).http_status_code(), 409);
    }

    #[test]
    fn test_display_is_descriptive() {
        let err = TileError::source_unreadable("connection refused");
        assert_eq!(err.to_string(), "Source raster unreadable: connection refused");
    }

    #[test]
    fn test_json_error_becomes_config() {
        let err: TileError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, TileError::Config(_)));
    }
}
