//! Failure taxonomy shared by the store, lookup clients and the label session

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Record store unreachable, rejected the request, or returned garbage.
    #[error("record store unavailable during {operation}: {detail}")]
    StoreUnavailable {
        operation: &'static str,
        detail: String,
        /// Raw error body from the store, kept for diagnostics
        payload: Option<String>,
    },

    #[error("{service} lookup unavailable: {detail}")]
    LookupUnavailable {
        service: &'static str,
        detail: String,
    },

    #[error("no record for {address} on chain {chain_id}")]
    NotFound { chain_id: String, address: String },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("unknown chain id '{0}' (not in chain registry)")]
    UnknownChain(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn store(operation: &'static str, detail: impl ToString) -> Self {
        Self::StoreUnavailable {
            operation,
            detail: detail.to_string(),
            payload: None,
        }
    }

    pub(crate) fn lookup(service: &'static str, detail: impl ToString) -> Self {
        Self::LookupUnavailable {
            service,
            detail: detail.to_string(),
        }
    }

    /// Short label used in the status line
    pub fn kind(&self) -> &'static str {
        match self {
            Error::StoreUnavailable { .. } => "StoreUnavailable",
            Error::LookupUnavailable { .. } => "LookupUnavailable",
            Error::NotFound { .. } => "NotFound",
            Error::ValidationFailed(_) => "ValidationFailed",
            Error::UnknownChain(_) => "UnknownChain",
            Error::Config(_) => "Config",
        }
    }
}
