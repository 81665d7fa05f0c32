use std::fmt;

use serde::Serialize;

/// Placeholder the record store and explorer use for "no name"
pub const NO_NAME: &str = "N/A";

/// Datastore-assigned record id. Opaque; never constructed from user input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Block-explorer metadata merged into a record. `Default` is "not verified".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Enrichment {
    pub verified: bool,
    pub source_code: String,
    pub verified_at: String,
    pub file_path: String,
    pub is_proxy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractRecord {
    pub record_id: RecordId,
    pub address: String,
    pub gas_spent_eth: f64,
    pub tx_count: u64,
    pub avg_daily_active_addresses: f64,
    pub contract_name: String,
    pub owner_project: Option<String>,
    pub usage_category: Option<String>,
    pub enrichment: Enrichment,
}

impl ContractRecord {
    pub fn new(record_id: RecordId, address: impl Into<String>) -> Self {
        Self {
            record_id,
            address: address.into(),
            gas_spent_eth: 0.0,
            tx_count: 0,
            avg_daily_active_addresses: 0.0,
            contract_name: String::new(),
            owner_project: None,
            usage_category: None,
            enrichment: Enrichment::default(),
        }
    }

    /// Name worth showing, if any. Empty and "N/A" count as absent.
    pub fn display_name(&self) -> Option<&str> {
        let name = self.contract_name.trim();
        if name.is_empty() || name == NO_NAME {
            None
        } else {
            Some(name)
        }
    }

    pub fn is_labeled(&self) -> bool {
        self.owner_project
            .as_deref()
            .is_some_and(|project| !project.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    OwnerProject,
    UsageCategory,
    ContractName,
}

impl DraftField {
    pub const ALL: [DraftField; 3] = [
        DraftField::OwnerProject,
        DraftField::UsageCategory,
        DraftField::ContractName,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            DraftField::OwnerProject => "Owner Project",
            DraftField::UsageCategory => "Usage Category",
            DraftField::ContractName => "Contract Name",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DraftField::OwnerProject => DraftField::UsageCategory,
            DraftField::UsageCategory => DraftField::ContractName,
            DraftField::ContractName => DraftField::OwnerProject,
        }
    }
}

/// Unsaved label values. `labeler` is display-only: the store client always
/// writes its own identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDraft {
    pub owner_project: String,
    pub usage_category: String,
    pub contract_name: String,
    pub labeler: String,
}

impl LabelDraft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::OwnerProject => &self.owner_project,
            DraftField::UsageCategory => &self.usage_category,
            DraftField::ContractName => &self.contract_name,
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::OwnerProject => self.owner_project = value,
            DraftField::UsageCategory => self.usage_category = value,
            DraftField::ContractName => self.contract_name = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.owner_project.is_empty()
            && self.usage_category.is_empty()
            && self.contract_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_skips_placeholders() {
        let mut record = ContractRecord::new(RecordId::new("rec1"), "0x01");
        assert_eq!(record.display_name(), None);
        record.contract_name = NO_NAME.to_string();
        assert_eq!(record.display_name(), None);
        record.contract_name = " Vault ".to_string();
        assert_eq!(record.display_name(), Some("Vault"));
    }

    #[test]
    fn test_draft_field_access() {
        let mut draft = LabelDraft::default();
        assert!(draft.is_empty());
        draft.set(DraftField::UsageCategory, "dex");
        assert_eq!(draft.get(DraftField::UsageCategory), "dex");
        assert!(!draft.is_empty());
        assert_eq!(DraftField::ContractName.next(), DraftField::OwnerProject);
    }
}
