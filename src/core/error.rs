//! Error taxonomy for the market data layer.

use thiserror::Error;

/// Errors surfaced by market data and currency rate providers.
///
/// Messages are kept as strings so a failed query can be cached and replayed
/// to every caller that asks for the same key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// Transport failure: connection, timeout or non-2xx status.
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream API answered 404 for the resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response is missing an expected field or a field does not parse.
    #[error("Schema error: {0}")]
    Schema(String),

    /// The caller passed an argument no request can be built from.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, MarketDataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            MarketDataError::NotFound("asset bitcoinx".to_string()).to_string(),
            "Not found: asset bitcoinx"
        );
        assert_eq!(
            MarketDataError::Schema("missing `data` field".to_string()).to_string(),
            "Schema error: missing `data` field"
        );
    }
}
