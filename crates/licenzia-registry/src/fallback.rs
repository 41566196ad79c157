//! Reference table of known addresses.
//!
//! A closed, deterministic answer set for addresses the live registry is
//! known to miss. Matching is by fragments of the lower-cased query.

use async_trait::async_trait;
use licenzia_core::{AddressResolution, AddressStatus, AddressValidator, ValidatorError};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackEntry {
    /// All must occur in the lower-cased query.
    pub fragments: Vec<String>,
    pub normalized_address: String,
    pub location_id: String,
    pub subdivision_code: Option<String>,
}

impl FallbackEntry {
    fn matches(&self, query: &str) -> bool {
        self.fragments.iter().all(|f| query.contains(f.as_str()))
    }

    fn resolution(&self) -> AddressResolution {
        AddressResolution {
            status: AddressStatus::ValidFallback,
            normalized_address: Some(self.normalized_address.clone()),
            location_id: Some(self.location_id.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FallbackTable {
    entries: Vec<FallbackEntry>,
}

impl FallbackTable {
    pub fn new(entries: Vec<FallbackEntry>) -> Self {
        Self { entries }
    }

    /// The table shipped with the binary.
    pub fn builtin() -> Self {
        Self::new(vec![FallbackEntry {
            fragments: vec!["автозаводская".into(), "18".into()],
            normalized_address: "г Москва, ул Автозаводская, д 18".into(),
            location_id: "74d633f7-9619-4972-963d-4c31165c7197".into(),
            subdivision_code: Some("772501001".into()),
        }])
    }

    pub fn lookup(&self, address: &str) -> Option<AddressResolution> {
        let query = address.to_lowercase();
        let hit = self.entries.iter().find(|e| e.matches(&query))?;
        debug!(location_id = %hit.location_id, "address found in reference table");
        Some(hit.resolution())
    }

    pub fn subdivision_code(&self, location_id: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|e| e.location_id == location_id)
            .and_then(|e| e.subdivision_code.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl AddressValidator for FallbackTable {
    async fn resolve_address(&self, address: &str) -> Result<AddressResolution, ValidatorError> {
        Ok(self
            .lookup(address)
            .unwrap_or_else(AddressResolution::not_found))
    }

    async fn resolve_subdivision_code(
        &self,
        location_id: &str,
    ) -> Result<Option<String>, ValidatorError> {
        Ok(self.subdivision_code(location_id))
    }
}
