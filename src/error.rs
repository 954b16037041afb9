//! Error types for the persona service

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the persona service
#[derive(Error, Debug)]
pub enum Error {
    // Request validation errors
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // Ledger RPC errors
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("RPC timeout after {0}ms")]
    RpcTimeout(u64),

    #[error("RPC connection failed: {0}")]
    RpcConnection(String),

    // Clustering errors
    #[error("Not enough profiles to cluster: have {have}, need {need}")]
    InsufficientProfiles { have: usize, need: usize },

    // Malformed ledger responses
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if the caller sent bad input
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidAddress(_))
    }

    /// Check if the ledger gateway failed or answered with garbage
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::Rpc(_)
                | Error::RpcTimeout(_)
                | Error::RpcConnection(_)
                | Error::Deserialization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert!(Error::InvalidAddress("0x12".into()).is_client_error());
        assert!(!Error::InvalidAddress("0x12".into()).is_upstream());

        assert!(Error::RpcTimeout(15_000).is_upstream());
        assert!(Error::Deserialization("bad hex".into()).is_upstream());
        assert!(!Error::Rpc("boom".into()).is_client_error());
    }

    #[test]
    fn test_internal_and_clustering_errors_are_neither_client_nor_upstream() {
        for err in [
            Error::Internal("oops".into()),
            Error::InsufficientProfiles { have: 2, need: 3 },
        ] {
            assert!(!err.is_client_error());
            assert!(!err.is_upstream());
        }
    }
}
