//! Airtable-backed record store

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::RecordStore;
use crate::domain::{ChainRegistry, ContractRecord, LabelDraft, RecordId};
use crate::error::{Error, Result};

/// Written into the `labeler` column on every update, whatever the draft says.
pub const LABELER_IDENTITY: &str = "growthepie";

const RECORD_FIELDS: [&str; 7] = [
    "address",
    "gas_eth",
    "txcount",
    "avg_daa",
    "owner_project",
    "usage_category",
    "contract_name",
];

/// Table and view ids plus credentials. `base` and `token` come from the
/// environment, the rest from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirtableSettings {
    pub api_url: String,
    pub base: String,
    pub token: String,
    pub table: String,
    pub view: String,
    pub projects_table: String,
    pub categories_table: String,
}

impl Default for AirtableSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.airtable.com/v0".to_string(),
            base: String::new(),
            token: String::new(),
            table: "tblcXnFAf0IEvAQA6".to_string(),
            view: "viwFVTWjj0HBWnpiB".to_string(),
            projects_table: "tblZxky1IdnhEJEDv".to_string(),
            categories_table: "tblNDOoyBfvtmAzEk".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<AirtableRecord>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirtableRecord {
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

pub struct AirtableStore {
    http: reqwest::Client,
    settings: AirtableSettings,
    registry: Arc<ChainRegistry>,
}

impl AirtableStore {
    pub fn new(
        settings: AirtableSettings,
        registry: Arc<ChainRegistry>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| Error::Config(format!("http client: {err}")))?;
        Ok(Self {
            http,
            settings,
            registry,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/{}/{}",
            self.settings.api_url.trim_end_matches('/'),
            self.settings.base,
            table
        )
    }

    /// GET every page of `table`, following `offset` until the store stops
    /// returning one.
    async fn fetch_all(
        &self,
        operation: &'static str,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<AirtableRecord>> {
        let url = self.table_url(table);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(&url)
                .bearer_auth(&self.settings.token)
                .query(query);
            if let Some(ref offset) = offset {
                request = request.query(&[("offset", offset)]);
            }

            let response = request
                .send()
                .await
                .map_err(|err| Error::store(operation, err))?;
            let page: ListResponse = decode(operation, response).await?;
            records.extend(page.records);

            match page.offset {
                Some(next) if !next.is_empty() => {
                    if offset.as_deref() == Some(next.as_str()) {
                        tracing::error!(operation, offset = %next, "pagination offset repeated");
                        return Err(Error::StoreUnavailable {
                            operation,
                            detail: format!("pagination offset {next} repeated"),
                            payload: None,
                        });
                    }
                    offset = Some(next);
                }
                _ => break,
            }
        }

        Ok(records)
    }

    async fn list_catalog(
        &self,
        operation: &'static str,
        table: &str,
        field: &str,
    ) -> Result<Vec<String>> {
        let records = self
            .fetch_all(operation, table, &[("fields[]", field.to_string())])
            .await?;
        let mut names: Vec<String> = records
            .iter()
            .filter_map(|record| text(record.fields.get(field)))
            .collect();
        names.sort_by_key(|name| name.to_lowercase());
        names.dedup_by(|a, b| a.to_lowercase() == b.to_lowercase());
        tracing::debug!(operation, count = names.len(), "catalog loaded");
        Ok(names)
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    async fn list_records(&self, chain_id: &str) -> Result<Vec<ContractRecord>> {
        let chain = self.registry.lookup(chain_id)?;

        let mut query = vec![
            (
                "filterByFormula",
                format!("FIND(\"{}\", {{origin_key}})", chain.origin_key),
            ),
            ("view", self.settings.view.clone()),
        ];
        query.extend(RECORD_FIELDS.iter().map(|f| ("fields[]", f.to_string())));

        let rows = self
            .fetch_all("list_records", &self.settings.table, &query)
            .await?;
        let records: Vec<ContractRecord> = rows.into_iter().map(to_record).collect();

        tracing::info!(
            chain_id,
            origin_key = %chain.origin_key,
            count = records.len(),
            "records listed"
        );
        Ok(records)
    }

    async fn update_record(&self, record_id: &RecordId, draft: &LabelDraft) -> Result<()> {
        const OP: &str = "update_record";
        let url = format!("{}/{}", self.table_url(&self.settings.table), record_id);
        let body = json!({
            "fields": {
                "owner_project": draft.owner_project,
                "usage_category": draft.usage_category,
                "contract_name": draft.contract_name,
                "labeler": LABELER_IDENTITY,
            },
            "typecast": true,
        });

        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.settings.token)
            .json(&body)
            .send()
            .await
            .map_err(|err| Error::store(OP, err))?;
        let _: Value = decode(OP, response).await?;

        tracing::info!(record_id = %record_id, "label written");
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<String>> {
        self.list_catalog("list_projects", &self.settings.projects_table, "Name")
            .await
    }

    async fn list_categories(&self) -> Result<Vec<String>> {
        self.list_catalog(
            "list_categories",
            &self.settings.categories_table,
            "Category",
        )
        .await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::StoreUnavailable {
            operation,
            detail: format!("HTTP {status}"),
            payload: (!body.is_empty()).then_some(body),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|err| Error::store(operation, err))?;
    serde_json::from_str(&body).map_err(|err| Error::StoreUnavailable {
        operation,
        detail: format!("malformed response: {err}"),
        payload: Some(body),
    })
}

fn to_record(row: AirtableRecord) -> ContractRecord {
    let fields = &row.fields;
    let mut record = ContractRecord::new(
        RecordId::new(row.id),
        text(fields.get("address")).unwrap_or_default(),
    );
    record.gas_spent_eth = number(fields.get("gas_eth")).max(0.0);
    record.tx_count = number(fields.get("txcount")).max(0.0).round() as u64;
    record.avg_daily_active_addresses = number(fields.get("avg_daa")).max(0.0);
    record.contract_name = text(fields.get("contract_name")).unwrap_or_default();
    record.owner_project = text(fields.get("owner_project"));
    record.usage_category = text(fields.get("usage_category"));
    record
}

/// Airtable hands numbers back as JSON numbers or numeric strings depending on
/// the column type.
fn number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        Some(Value::Array(items)) => number(items.first()),
        _ => 0.0,
    }
}

/// Plain text, or the first entry of a linked/lookup column
fn text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Array(items)) => text(items.first()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TABLE_PATH: &str = "/appTest/tblcXnFAf0IEvAQA6";

    fn store(server: &MockServer) -> AirtableStore {
        store_with_timeout(server, Duration::from_secs(5))
    }

    fn store_with_timeout(server: &MockServer, timeout: Duration) -> AirtableStore {
        let settings = AirtableSettings {
            api_url: server.uri(),
            base: "appTest".to_string(),
            token: "secret".to_string(),
            ..AirtableSettings::default()
        };
        AirtableStore::new(
            settings,
            Arc::new(ChainRegistry::builtin()),
            timeout,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_records_filters_by_origin_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(header("authorization", "Bearer secret"))
            .and(query_param("filterByFormula", "FIND(\"base\", {origin_key})"))
            .and(query_param("view", "viwFVTWjj0HBWnpiB"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [
                    {"id": "rec1", "fields": {
                        "address": "0xabc",
                        "gas_eth": "1.234",
                        "txcount": "10",
                        "avg_daa": 3.5,
                        "contract_name": "Vault",
                        "owner_project": ["acme"]
                    }},
                    {"id": "rec2", "fields": {"address": "0xdef", "gas_eth": 0.5, "txcount": 2}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let records = store(&server).list_records("8453").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_id, RecordId::new("rec1"));
        assert_eq!(records[0].gas_spent_eth, 1.234);
        assert_eq!(records[0].tx_count, 10);
        assert_eq!(records[0].avg_daily_active_addresses, 3.5);
        assert_eq!(records[0].owner_project.as_deref(), Some("acme"));
        assert_eq!(records[1].tx_count, 2);
        assert_eq!(records[1].display_name(), None);
    }

    #[tokio::test]
    async fn test_list_records_follows_offset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("offset", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{"id": "rec2", "fields": {"address": "0x2"}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{"id": "rec1", "fields": {"address": "0x1"}}],
                "offset": "page2"
            })))
            .mount(&server)
            .await;

        let records = store(&server).list_records("10").await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.record_id.as_str()).collect();
        assert_eq!(ids, vec!["rec1", "rec2"]);
    }

    #[tokio::test]
    async fn test_repeated_offset_stops_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{"id": "rec1", "fields": {"address": "0x1"}}],
                "offset": "itrSame"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let err = store(&server).list_records("8453").await.unwrap_err();
        match err {
            Error::StoreUnavailable {
                operation, detail, ..
            } => {
                assert_eq!(operation, "list_records");
                assert!(detail.contains("itrSame"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_store_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "records": [] }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let store = store_with_timeout(&server, Duration::from_millis(100));
        let err = store.list_records("8453").await.unwrap_err();
        match err {
            Error::StoreUnavailable { operation, .. } => assert_eq!(operation, "list_records"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_chain_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = store(&server).list_records("342").await.unwrap_err();
        assert_eq!(err, Error::UnknownChain("342".to_string()));
    }

    #[tokio::test]
    async fn test_http_error_keeps_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"error":{"type":"AUTHENTICATION_REQUIRED"}}"#),
            )
            .mount(&server)
            .await;

        let err = store(&server).list_records("8453").await.unwrap_err();
        match err {
            Error::StoreUnavailable {
                operation,
                detail,
                payload,
            } => {
                assert_eq!(operation, "list_records");
                assert!(detail.contains("401"));
                assert!(payload.unwrap().contains("AUTHENTICATION_REQUIRED"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_store_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = store(&server).list_records("8453").await.unwrap_err();
        assert_eq!(err.kind(), "StoreUnavailable");
    }

    #[tokio::test]
    async fn test_update_record_always_writes_own_labeler() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{TABLE_PATH}/rec1")))
            .and(body_json(json!({
                "fields": {
                    "owner_project": "acme",
                    "usage_category": "dex",
                    "contract_name": "Router",
                    "labeler": LABELER_IDENTITY
                },
                "typecast": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "rec1"})))
            .expect(1)
            .mount(&server)
            .await;

        let draft = LabelDraft {
            owner_project: "acme".to_string(),
            usage_category: "dex".to_string(),
            contract_name: "Router".to_string(),
            labeler: "someone else".to_string(),
        };
        store(&server)
            .update_record(&RecordId::new("rec1"), &draft)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_catalogs_are_sorted_and_deduped_ignoring_case() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appTest/tblZxky1IdnhEJEDv"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [
                    {"id": "p1", "fields": {"Name": "uniswap"}},
                    {"id": "p2", "fields": {"Name": "Aave"}},
                    {"id": "p3", "fields": {}},
                    {"id": "p4", "fields": {"Name": "Uniswap"}},
                    {"id": "p5", "fields": {"Name": "uniswap"}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/appTest/tblNDOoyBfvtmAzEk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{"id": "c1", "fields": {"Category": "dex"}}]
            })))
            .mount(&server)
            .await;

        let store = store(&server);
        assert_eq!(store.list_projects().await.unwrap(), vec!["Aave", "uniswap"]);
        assert_eq!(store.list_categories().await.unwrap(), vec!["dex"]);
    }

    #[test]
    fn test_lenient_numbers() {
        assert_eq!(number(Some(&json!("  2.5 "))), 2.5);
        assert_eq!(number(Some(&json!(7))), 7.0);
        assert_eq!(number(Some(&json!("n/a"))), 0.0);
        assert_eq!(number(None), 0.0);
    }
}
