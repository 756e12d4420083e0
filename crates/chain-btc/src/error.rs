use thiserror::Error;

/// Bitcoin key and address errors.
#[derive(Debug, Error)]
pub enum BtcError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid network: {0}")]
    InvalidNetwork(String),
}

/// Failure of a single chain-data query.
///
/// A query failure never means "unused": callers abort the scan instead of
/// recording the probed address either way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query timed out after {0} ms")]
    Timeout(u64),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
