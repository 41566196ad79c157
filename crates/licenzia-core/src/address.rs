//! Contract of the external address registry.
//!
//! The engine only depends on this trait. Implementations live in
//! `licenzia-registry` (live portal lookups, a fallback table) or in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressStatus {
    /// Confirmed by the live registry.
    Valid,
    /// Confirmed by the deterministic table of known addresses.
    ValidFallback,
    NotFound,
    /// The registry answered but could not process the query.
    Error,
}

impl AddressStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid | Self::ValidFallback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResolution {
    pub status: AddressStatus,
    pub normalized_address: Option<String>,
    pub location_id: Option<String>,
}

impl AddressResolution {
    pub fn not_found() -> Self {
        Self {
            status: AddressStatus::NotFound,
            normalized_address: None,
            location_id: None,
        }
    }

    pub fn error() -> Self {
        Self {
            status: AddressStatus::Error,
            normalized_address: None,
            location_id: None,
        }
    }
}

/// Transport-level failure talking to the registry.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("registry request failed: {0}")]
    Transport(String),
    #[error("registry returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("unexpected registry response: {0}")]
    Response(String),
    #[error("registry did not answer within {0} ms")]
    Timeout(u64),
}

/// Normalizes free-text addresses and resolves subdivision tax codes.
#[async_trait]
pub trait AddressValidator: Send + Sync {
    async fn resolve_address(&self, address: &str) -> Result<AddressResolution, ValidatorError>;

    /// Subdivision code registered for a location, if any.
    async fn resolve_subdivision_code(
        &self,
        location_id: &str,
    ) -> Result<Option<String>, ValidatorError>;
}
