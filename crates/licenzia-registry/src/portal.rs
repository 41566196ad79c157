//! HTTP client for the public address registry portal.

use std::time::Duration;

use async_trait::async_trait;
use licenzia_core::{
    AddressResolution, AddressStatus, AddressValidator, RegistryConfig, ValidatorError,
};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, REFERER};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid registry URL '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("registry URL '{0}' cannot carry a path")]
    NotABase(String),
}

impl From<PortalError> for ValidatorError {
    fn from(e: PortalError) -> Self {
        match e {
            PortalError::Http(e) if e.is_timeout() => Self::Transport(format!("timed out: {e}")),
            PortalError::Http(e) => Self::Transport(e.to_string()),
            PortalError::Server { status, body } => Self::Server { status, body },
            PortalError::Json(e) => Self::Response(e.to_string()),
            PortalError::Url { url, source } => {
                Self::Transport(format!("invalid registry URL '{url}': {source}"))
            }
            e @ PortalError::NotABase(_) => Self::Transport(e.to_string()),
        }
    }
}

/// One search hit. The portal is inconsistent about the identifier field
/// and whether it is a string or a number.
#[derive(Debug, Deserialize)]
struct SearchHit {
    full_name: Option<String>,
    object_id: Option<serde_json::Value>,
    id: Option<serde_json::Value>,
}

impl SearchHit {
    fn location_id(&self) -> Option<String> {
        [&self.object_id, &self.id]
            .into_iter()
            .flatten()
            .find_map(|v| match v {
                serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }
}

#[derive(Debug, Deserialize)]
struct SubdivisionResponse {
    code: Option<String>,
}

/// Queries the registry search endpoints in order; the first non-empty
/// answer wins.
pub struct PortalClient {
    client: reqwest::Client,
    endpoints: Vec<Url>,
    subdivision_url: Option<Url>,
}

impl PortalClient {
    pub fn new(config: &RegistryConfig) -> Result<Self, PortalError> {
        let endpoints = config
            .endpoints
            .iter()
            .map(|e| parse_url(e))
            .collect::<Result<Vec<_>, _>>()?;
        let subdivision_url = config
            .subdivision_url
            .as_deref()
            .map(|u| parse_url(u.trim_end_matches('/')))
            .transpose()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        if let Some(origin) = endpoints.first().and_then(|u| u.join("/Search").ok())
            && let Ok(value) = HeaderValue::from_str(origin.as_str())
        {
            headers.insert(REFERER, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("licenzia/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoints,
            subdivision_url,
        })
    }

    /// Best match for `term`, or `None` when no endpoint produced one.
    ///
    /// Failing endpoints are skipped, not reported.
    pub async fn search(&self, term: &str) -> Option<AddressResolution> {
        for endpoint in &self.endpoints {
            match self.query(endpoint, term).await {
                Ok(Some(hit)) => {
                    info!(endpoint = %endpoint, "address resolved by registry portal");
                    return Some(AddressResolution {
                        status: AddressStatus::Valid,
                        location_id: hit.location_id(),
                        normalized_address: hit.full_name,
                    });
                }
                Ok(None) => debug!(endpoint = %endpoint, "no match"),
                Err(e) => warn!(endpoint = %endpoint, error = %e, "registry endpoint skipped"),
            }
        }
        None
    }

    async fn query(&self, endpoint: &Url, term: &str) -> Result<Option<SearchHit>, PortalError> {
        let resp = self
            .client
            .get(endpoint.clone())
            .query(&[("term", term)])
            .send()
            .await?;
        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(PortalError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        // Anything that is not an array of hits counts as no match.
        let hits: Vec<SearchHit> = match serde_json::from_slice(&bytes) {
            Ok(hits) => hits,
            Err(e) => {
                debug!(endpoint = %endpoint, error = %e, "response is not a hit list");
                return Ok(None);
            }
        };
        Ok(hits.into_iter().next())
    }

    /// Subdivision code registered for `location_id`. `None` when the
    /// location has none or no subdivision service is configured.
    pub async fn subdivision_code(&self, location_id: &str) -> Result<Option<String>, PortalError> {
        let Some(base) = &self.subdivision_url else {
            return Ok(None);
        };
        let url = location_url(base, location_id)?;

        debug!(url = %url, "resolving subdivision code");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PortalError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SubdivisionResponse = serde_json::from_slice(&resp.bytes().await?)?;
        Ok(parsed.code.filter(|c| !c.trim().is_empty()))
    }
}

fn parse_url(raw: &str) -> Result<Url, PortalError> {
    Url::parse(raw).map_err(|source| PortalError::Url {
        url: raw.to_string(),
        source,
    })
}

/// `base` with `location_id` appended as one percent-encoded path segment.
fn location_url(base: &Url, location_id: &str) -> Result<Url, PortalError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| PortalError::NotABase(base.to_string()))?
        .pop_if_empty()
        .push(location_id);
    Ok(url)
}

#[async_trait]
impl AddressValidator for PortalClient {
    async fn resolve_address(&self, address: &str) -> Result<AddressResolution, ValidatorError> {
        Ok(self
            .search(address)
            .await
            .unwrap_or_else(AddressResolution::not_found))
    }

    async fn resolve_subdivision_code(
        &self,
        location_id: &str,
    ) -> Result<Option<String>, ValidatorError> {
        Ok(self.subdivision_code(location_id).await?)
    }
}
