//! Blockscout smart-contract lookups

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::domain::{ChainRegistry, Enrichment};
use crate::error::{Error, Result};

const SERVICE: &str = "explorer";

/// Smart-contract metadata as the explorer reports it. Missing fields default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerContract {
    pub name: Option<String>,
    pub is_fully_verified: Option<bool>,
    pub is_verified: Option<bool>,
    pub is_partially_verified: Option<bool>,
    pub is_verified_via_sourcify: Option<bool>,
    pub source_code: Option<String>,
    pub verified_at: Option<String>,
    pub file_path: Option<String>,
    pub minimal_proxy_address_hash: Option<String>,
    pub compiler_version: Option<String>,
}

impl ExplorerContract {
    /// Verified by any of the explorer's criteria, not only "fully".
    pub fn any_verification(&self) -> bool {
        [
            self.is_fully_verified,
            self.is_verified,
            self.is_partially_verified,
            self.is_verified_via_sourcify,
        ]
        .into_iter()
        .any(|flag| flag == Some(true))
    }

    /// Minimal-proxy hash present, or a name that gives it away.
    pub fn is_proxy(&self) -> bool {
        if self
            .minimal_proxy_address_hash
            .as_deref()
            .is_some_and(|hash| !hash.is_empty())
        {
            return true;
        }
        let name = self.name.as_deref().unwrap_or_default().to_lowercase();
        name.contains("proxy") || name.contains("erc1967")
    }

    pub fn enrichment(&self) -> Enrichment {
        Enrichment {
            verified: self.is_fully_verified.unwrap_or(false),
            source_code: self.source_code.clone().unwrap_or_default(),
            verified_at: self
                .verified_at
                .as_deref()
                .map(format_verified_at)
                .unwrap_or_default(),
            file_path: self.file_path.clone().unwrap_or_default(),
            is_proxy: self.is_proxy(),
        }
    }
}

/// `2024-03-01T12:30:00.000000Z` -> `2024-03-01 12:30:00`. Anything that isn't
/// RFC 3339 passes through untouched.
pub fn format_verified_at(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[async_trait]
pub trait ContractLookup: Send + Sync {
    async fn lookup_contract(&self, chain_id: &str, address: &str) -> Result<ExplorerContract>;
}

pub struct BlockscoutClient {
    http: reqwest::Client,
    registry: Arc<ChainRegistry>,
}

impl BlockscoutClient {
    pub fn new(registry: Arc<ChainRegistry>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| Error::Config(format!("http client: {err}")))?;
        Ok(Self { http, registry })
    }
}

#[async_trait]
impl ContractLookup for BlockscoutClient {
    async fn lookup_contract(&self, chain_id: &str, address: &str) -> Result<ExplorerContract> {
        let chain = self.registry.lookup(chain_id)?;
        let url = chain.explorer_url(address);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| Error::lookup(SERVICE, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::lookup(SERVICE, format!("HTTP {status} for {address}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("json") {
            return Err(Error::lookup(
                SERVICE,
                format!("unexpected content type '{content_type}'"),
            ));
        }

        response
            .json::<ExplorerContract>()
            .await
            .map_err(|err| Error::lookup(SERVICE, format!("malformed response: {err}")))
    }
}
