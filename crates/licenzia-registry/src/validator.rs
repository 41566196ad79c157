use async_trait::async_trait;
use licenzia_core::{AddressResolution, AddressStatus, AddressValidator, ValidatorError};
use tracing::{debug, info};

use crate::fallback::FallbackTable;

/// Live registry first, reference table second.
///
/// A table hit replaces a live miss, a live error status, or a transport
/// failure. A table miss keeps whatever the live registry said.
pub struct RegistryValidator {
    live: Option<Box<dyn AddressValidator>>,
    table: FallbackTable,
}

impl RegistryValidator {
    pub fn new(live: Box<dyn AddressValidator>, table: FallbackTable) -> Self {
        Self {
            live: Some(live),
            table,
        }
    }

    /// Only the reference table answers.
    pub fn offline(table: FallbackTable) -> Self {
        Self { live: None, table }
    }

    #[cfg(feature = "http")]
    pub fn from_config(
        config: &licenzia_core::RegistryConfig,
    ) -> Result<Self, crate::portal::PortalError> {
        let portal = crate::portal::PortalClient::new(config)?;
        Ok(Self::new(Box::new(portal), FallbackTable::builtin()))
    }

    pub fn is_offline(&self) -> bool {
        self.live.is_none()
    }
}

#[async_trait]
impl AddressValidator for RegistryValidator {
    async fn resolve_address(&self, address: &str) -> Result<AddressResolution, ValidatorError> {
        let Some(live) = &self.live else {
            return Ok(self
                .table
                .lookup(address)
                .unwrap_or_else(AddressResolution::not_found));
        };

        let answer = live.resolve_address(address).await;
        if let Ok(resolution) = &answer
            && resolution.status.is_valid()
        {
            return answer;
        }
        match self.table.lookup(address) {
            Some(hit) => {
                info!(live = ?answer.as_ref().map(|r| r.status), "live registry missed, using reference table");
                Ok(hit)
            }
            None => answer,
        }
    }

    async fn resolve_subdivision_code(
        &self,
        location_id: &str,
    ) -> Result<Option<String>, ValidatorError> {
        let Some(live) = &self.live else {
            return Ok(self.table.subdivision_code(location_id));
        };

        let answer = live.resolve_subdivision_code(location_id).await;
        if let Ok(Some(_)) = &answer {
            return answer;
        }
        match self.table.subdivision_code(location_id) {
            Some(code) => {
                debug!(location_id, "subdivision code from reference table");
                Ok(Some(code))
            }
            None => answer,
        }
    }
}

impl std::fmt::Debug for RegistryValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryValidator")
            .field("offline", &self.is_offline())
            .field("table_entries", &self.table.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MOSCOW: &str = "г. Москва, ул. Автозаводская, д. 18";

    /// Live registry stand-in with a fixed answer.
    enum Live {
        Status(AddressStatus),
        Down,
    }

    #[async_trait]
    impl AddressValidator for Live {
        async fn resolve_address(&self, _: &str) -> Result<AddressResolution, ValidatorError> {
            match self {
                Live::Status(AddressStatus::Valid) => Ok(AddressResolution {
                    status: AddressStatus::Valid,
                    normalized_address: Some("live".into()),
                    location_id: Some("live-id".into()),
                }),
                Live::Status(AddressStatus::Error) => Ok(AddressResolution::error()),
                Live::Status(_) => Ok(AddressResolution::not_found()),
                Live::Down => Err(ValidatorError::Transport("connection refused".into())),
            }
        }

        async fn resolve_subdivision_code(
            &self,
            _: &str,
        ) -> Result<Option<String>, ValidatorError> {
            match self {
                Live::Down => Err(ValidatorError::Transport("connection refused".into())),
                _ => Ok(None),
            }
        }
    }

    fn validator(live: Live) -> RegistryValidator {
        RegistryValidator::new(Box::new(live), FallbackTable::builtin())
    }

    #[tokio::test]
    async fn live_hit_wins() {
        let r = validator(Live::Status(AddressStatus::Valid))
            .resolve_address(MOSCOW)
            .await
            .unwrap();
        assert_eq!(r.status, AddressStatus::Valid);
        assert_eq!(r.normalized_address.as_deref(), Some("live"));
    }

    #[tokio::test]
    async fn table_covers_live_miss_error_and_outage() {
        for live in [
            Live::Status(AddressStatus::NotFound),
            Live::Status(AddressStatus::Error),
            Live::Down,
        ] {
            let r = validator(live).resolve_address(MOSCOW).await.unwrap();
            assert_eq!(r.status, AddressStatus::ValidFallback);
        }
    }

    #[tokio::test]
    async fn table_miss_keeps_live_answer() {
        let miss = validator(Live::Status(AddressStatus::Error))
            .resolve_address("ул. Тверская, 1")
            .await
            .unwrap();
        assert_eq!(miss.status, AddressStatus::Error);

        let down = validator(Live::Down).resolve_address("ул. Тверская, 1").await;
        assert!(matches!(down, Err(ValidatorError::Transport(_))));
    }

    #[tokio::test]
    async fn subdivision_code_falls_back_to_table() {
        let id = "74d633f7-9619-4972-963d-4c31165c7197";
        for live in [Live::Status(AddressStatus::Valid), Live::Down] {
            let code = validator(live).resolve_subdivision_code(id).await.unwrap();
            assert_eq!(code.as_deref(), Some("772501001"));
        }
        assert!(validator(Live::Down).resolve_subdivision_code("other").await.is_err());
    }

    #[tokio::test]
    async fn offline_uses_table_only() {
        let v = RegistryValidator::offline(FallbackTable::builtin());
        assert!(v.is_offline());
        assert_eq!(
            v.resolve_address(MOSCOW).await.unwrap().status,
            AddressStatus::ValidFallback
        );
        assert_eq!(
            v.resolve_address("ул. Тверская, 1").await.unwrap().status,
            AddressStatus::NotFound
        );
    }
}
