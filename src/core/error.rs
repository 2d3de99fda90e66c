//! Error taxonomy for catalog operations
//!
//! Every fault that can cross the service boundary maps to exactly one of
//! these conditions, so callers can tell "catalog not imported yet" from
//! "no such combination" from "storage medium is down".

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::store::StoreError;

/// Errors produced by the loader, resolver, and service layers
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("import source not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("malformed catalog document: {reason}")]
    MalformedDocument { reason: String },

    #[error("catalog data not loaded")]
    StoreNotLoaded,

    #[error("missing query parameter: {name}")]
    MissingParameter { name: &'static str },

    #[error(transparent)]
    Backend(#[from] StoreError),
}

impl CatalogError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        CatalogError::MalformedDocument {
            reason: reason.into(),
        }
    }

    /// Machine-readable reason code for query-path conditions
    ///
    /// Import-path errors (SourceNotFound, MalformedDocument) have no reason
    /// code; they are reported through `LoadResponse` instead.
    pub fn reason_code(&self) -> Option<ReasonCode> {
        match self {
            CatalogError::StoreNotLoaded => Some(ReasonCode::NotLoaded),
            CatalogError::MissingParameter { .. } => Some(ReasonCode::MissingParameter),
            CatalogError::Backend(_) => Some(ReasonCode::BackendUnavailable),
            _ => None,
        }
    }
}

/// Reason codes attached to query responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    NotLoaded,
    MissingParameter,
    BackendUnavailable,
}

/// Error payload carried inside an otherwise well-formed response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: ReasonCode,
    pub message: String,
}

impl ErrorBody {
    pub fn from_error(err: &CatalogError) -> Option<Self> {
        err.reason_code().map(|code| ErrorBody {
            code,
            message: err.to_string(),
        })
    }
}
