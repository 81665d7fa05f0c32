//! Sourcify verification status and source files

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::domain::ChainRegistry;
use crate::error::{Error, Result};

const SERVICE: &str = "sourcify";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStatus {
    #[serde(rename = "chainId")]
    pub chain_id: String,
    pub status: String,
}

/// One entry of `check-all-by-addresses`. `status` is set instead of
/// `chainIds` when the address is unknown on every chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressStatus {
    pub address: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "chainIds", default)]
    pub chain_ids: Option<Vec<ChainStatus>>,
}

impl AddressStatus {
    /// `perfect`, `partial`, or None if unverified on `chain_id`
    pub fn match_on(&self, chain_id: &str) -> Option<&str> {
        self.chain_ids
            .as_ref()?
            .iter()
            .find(|entry| entry.chain_id == chain_id)
            .map(|entry| entry.status.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub url: String,
    pub content: String,
}

impl SourceFile {
    /// Path after the `/sources/` segment, or the whole url
    pub fn display_path(&self) -> &str {
        self.url
            .split_once("/sources/")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceBundle {
    /// `full` or `partial`
    pub status: String,
    pub files: Vec<SourceFile>,
}

#[derive(Debug, Deserialize)]
struct FileTree {
    #[serde(default)]
    status: String,
    #[serde(default)]
    files: Vec<String>,
}

pub struct SourcifyClient {
    http: reqwest::Client,
    registry: Arc<ChainRegistry>,
}

impl SourcifyClient {
    pub fn new(registry: Arc<ChainRegistry>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| Error::Config(format!("http client: {err}")))?;
        Ok(Self { http, registry })
    }

    pub async fn check_verification(
        &self,
        chain_id: &str,
        address: &str,
    ) -> Result<Vec<AddressStatus>> {
        let chain = self.registry.lookup(chain_id)?;
        let url = chain.verification_url(address);
        tracing::debug!(chain_id, address, "sourcify check");
        self.get_json(&url).await
    }

    /// Solidity files under `/src/`, fetched concurrently. Any failed file
    /// fails the whole bundle.
    pub async fn fetch_sources(&self, chain_id: &str, address: &str) -> Result<SourceBundle> {
        let chain = self.registry.lookup(chain_id)?;
        let tree: FileTree = self.get_json(&chain.files_url(address)).await?;

        let wanted = tree
            .files
            .into_iter()
            .filter(|file| file.contains("/src/") && file.ends_with(".sol"));
        let files = try_join_all(wanted.map(|url| self.fetch_text(url))).await?;

        tracing::debug!(chain_id, address, files = files.len(), "sourcify sources fetched");
        Ok(SourceBundle {
            status: tree.status,
            files,
        })
    }

    async fn fetch_text(&self, url: String) -> Result<SourceFile> {
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| Error::lookup(SERVICE, err))?;
        if !response.status().is_success() {
            return Err(Error::lookup(
                SERVICE,
                format!("HTTP {} for {url}", response.status()),
            ));
        }
        let content = response
            .text()
            .await
            .map_err(|err| Error::lookup(SERVICE, err))?;
        Ok(SourceFile { url, content })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| Error::lookup(SERVICE, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::lookup(SERVICE, format!("HTTP {status}")));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| Error::lookup(SERVICE, format!("malformed response: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChainDescriptor;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SourcifyClient {
        let local = ChainDescriptor {
            chain_id: "10".to_string(),
            display_name: "OP Mainnet".to_string(),
            origin_key: "optimism".to_string(),
            explorer_url_template: String::new(),
            verification_url_template: format!(
                "{}/check-all-by-addresses?addresses={{address}}&chainIds={{chain_id}}",
                server.uri()
            ),
            files_url_template: format!("{}/files/tree/any/{{chain_id}}/{{address}}", server.uri()),
            browse_url_template: String::new(),
            analysis_url_template: String::new(),
        };
        let registry = ChainRegistry::builtin().with_overrides(vec![local]);
        SourcifyClient::new(Arc::new(registry), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_check_verification() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/check-all-by-addresses"))
            .and(query_param("addresses", "0xabc"))
            .and(query_param("chainIds", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"address": "0xabc", "chainIds": [{"chainId": "10", "status": "perfect"}]}
            ])))
            .mount(&server)
            .await;

        let statuses = client(&server).check_verification("10", "0xabc").await.unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].match_on("10"), Some("perfect"));
        assert_eq!(statuses[0].match_on("8453"), None);
    }

    #[tokio::test]
    async fn test_fetch_sources_keeps_solidity_under_src() {
        let server = MockServer::start().await;
        let base = server.uri();
        Mock::given(method("GET"))
            .and(path("/files/tree/any/10/0xabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "full",
                "files": [
                    format!("{base}/repo/sources/src/Vault.sol"),
                    format!("{base}/repo/sources/lib/Ownable.sol"),
                    format!("{base}/repo/sources/src/notes.md"),
                    format!("{base}/repo/metadata.json")
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repo/sources/src/Vault.sol"))
            .respond_with(ResponseTemplate::new(200).set_body_string("contract Vault {}"))
            .expect(1)
            .mount(&server)
            .await;

        let bundle = client(&server).fetch_sources("10", "0xabc").await.unwrap();
        assert_eq!(bundle.status, "full");
        assert_eq!(bundle.files.len(), 1);
        assert_eq!(bundle.files[0].content, "contract Vault {}");
        assert_eq!(bundle.files[0].display_path(), "src/Vault.sol");
    }

    #[tokio::test]
    async fn test_unknown_chain_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        assert_eq!(
            client.check_verification("342", "0xabc").await.unwrap_err(),
            Error::UnknownChain("342".to_string())
        );
        assert_eq!(
            client.fetch_sources("342", "0xabc").await.unwrap_err(),
            Error::UnknownChain("342".to_string())
        );
    }
}
