//! Error types for the estimator
//!
//! Every failure the core can produce is a variant of [`EstimateError`], so
//! callers can branch on the kind of failure instead of parsing messages.
//! Construction-time problems (unknown or missing fields, bad values,
//! unresolvable regions) are grouped under [`ConfigError`]. Failures of the
//! external pricing catalog are reported as [`CatalogError`] after the catalog
//! client has exhausted its own retries.
//!
//! None of the estimator errors are retried by the core: no-match and
//! ambiguous-match mean the filters are wrong, and a malformed document is a
//! data-integrity failure on the catalog side.

use std::time::Duration;
use thiserror::Error;

use crate::resource::ResourceKind;

/// Main error type for the estimator
#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resource \"{tag}\": no matches for specified options (expected {expected}, found {found})")]
    NoMatch {
        tag: String,
        expected: usize,
        found: usize,
    },

    #[error("Resource \"{tag}\": too many matches (expected {expected}, found {found})")]
    AmbiguousMatch {
        tag: String,
        expected: usize,
        found: usize,
    },

    #[error("Resource \"{tag}\": malformed price document: {reason}")]
    MalformedDocument {
        tag: String,
        reason: String,
        document: String,
    },

    #[error("Duplicate resource: {tag}")]
    DuplicateResource { tag: String },

    #[error("Resource \"{tag}\": pricing catalog query failed: {source}")]
    Catalog {
        tag: String,
        #[source]
        source: CatalogError,
    },
}

impl EstimateError {
    /// Tag of the resource the error belongs to, when there is one
    pub fn tag(&self) -> Option<&str> {
        match self {
            EstimateError::Config(ConfigError::MissingField { tag, .. }) => Some(tag),
            EstimateError::Config(_) => None,
            EstimateError::NoMatch { tag, .. }
            | EstimateError::AmbiguousMatch { tag, .. }
            | EstimateError::MalformedDocument { tag, .. }
            | EstimateError::DuplicateResource { tag }
            | EstimateError::Catalog { tag, .. } => Some(tag),
        }
    }
}

/// Configuration errors, raised while resources or sessions are constructed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown field for {kind}: {field}")]
    UnknownField { kind: ResourceKind, field: String },

    #[error("resource \"{tag}\": missing required field: {field}")]
    MissingField { tag: String, field: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("unknown region code: {code}")]
    UnknownRegion { code: String },
}

/// Failures reported by a [`crate::catalog::PriceCatalog`] implementation
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("request throttled: {0}")]
    Throttled(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request could not be sent: {0}")]
    Transport(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

impl CatalogError {
    /// Throttling and transport-level failures are worth another attempt;
    /// a rejected request will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::Throttled(_) | CatalogError::Timeout(_) | CatalogError::Transport(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EstimateError>;
