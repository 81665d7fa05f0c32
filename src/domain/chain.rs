//! Chain registry: one table mapping chain ids to explorer, verification and
//! record-store vocabulary.

use serde::Deserialize;

use crate::error::{Error, Result};

const SOURCIFY_CHECK: &str =
    "https://sourcify.dev/server/check-all-by-addresses?addresses={address}&chainIds={chain_id}";
const SOURCIFY_FILES: &str = "https://sourcify.dev/server/files/tree/any/{chain_id}/{address}";
const DEDAUB_OVERVIEW: &str = "https://app.dedaub.com/{origin_key}/address/{address}/overview";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainDescriptor {
    pub chain_id: String,
    pub display_name: String,
    /// Record store's name for this chain (`origin_key` column)
    pub origin_key: String,
    /// Block-explorer smart-contract API, e.g. `.../api/v2/smart-contracts/{address}`
    pub explorer_url_template: String,
    #[serde(default = "default_verification_template")]
    pub verification_url_template: String,
    #[serde(default = "default_files_template")]
    pub files_url_template: String,
    /// Human-facing explorer page
    #[serde(default)]
    pub browse_url_template: String,
    #[serde(default = "default_analysis_template")]
    pub analysis_url_template: String,
}

fn default_verification_template() -> String {
    SOURCIFY_CHECK.to_string()
}

fn default_files_template() -> String {
    SOURCIFY_FILES.to_string()
}

fn default_analysis_template() -> String {
    DEDAUB_OVERVIEW.to_string()
}

impl ChainDescriptor {
    fn builtin(
        chain_id: &str,
        display_name: &str,
        origin_key: &str,
        explorer_api: &str,
        browse: &str,
    ) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            display_name: display_name.to_string(),
            origin_key: origin_key.to_string(),
            explorer_url_template: format!("{explorer_api}/api/v2/smart-contracts/{{address}}"),
            verification_url_template: default_verification_template(),
            files_url_template: default_files_template(),
            browse_url_template: format!("{browse}/address/{{address}}"),
            analysis_url_template: default_analysis_template(),
        }
    }

    pub fn explorer_url(&self, address: &str) -> String {
        self.render(&self.explorer_url_template, address)
    }

    pub fn verification_url(&self, address: &str) -> String {
        self.render(&self.verification_url_template, address)
    }

    pub fn files_url(&self, address: &str) -> String {
        self.render(&self.files_url_template, address)
    }

    pub fn browse_url(&self, address: &str) -> Option<String> {
        if self.browse_url_template.is_empty() {
            return None;
        }
        Some(self.render(&self.browse_url_template, address))
    }

    pub fn analysis_url(&self, address: &str) -> String {
        self.render(&self.analysis_url_template, address)
    }

    fn render(&self, template: &str, address: &str) -> String {
        template
            .replace("{address}", address)
            .replace("{chain_id}", &self.chain_id)
            .replace("{origin_key}", &self.origin_key)
    }
}

/// Ordered set of known chains. Order is the order shown in the chain picker.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<ChainDescriptor>,
}

impl ChainRegistry {
    pub fn new(chains: Vec<ChainDescriptor>) -> Self {
        Self { chains }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            ChainDescriptor::builtin(
                "42161",
                "Arbitrum One",
                "arbitrum",
                "https://arbitrum.blockscout.com",
                "https://arbiscan.io",
            ),
            ChainDescriptor::builtin(
                "10",
                "OP Mainnet",
                "optimism",
                "https://optimism.blockscout.com",
                "https://optimistic.etherscan.io",
            ),
            ChainDescriptor::builtin(
                "8453",
                "Base",
                "base",
                "https://base.blockscout.com",
                "https://basescan.org",
            ),
            ChainDescriptor::builtin(
                "324",
                "ZKsync Era",
                "zksync_era",
                "https://zksync.blockscout.com",
                "https://explorer.zksync.io",
            ),
            ChainDescriptor::builtin(
                "7777777",
                "Zora",
                "zora",
                "https://explorer.zora.energy",
                "https://explorer.zora.energy",
            ),
            ChainDescriptor::builtin(
                "534352",
                "Scroll",
                "scroll",
                "https://explorer.scroll.io",
                "https://scrollscan.com",
            ),
            ChainDescriptor::builtin(
                "34443",
                "Mode",
                "mode",
                "https://explorer.mode.network",
                "https://explorer.mode.network",
            ),
            ChainDescriptor::builtin(
                "1101",
                "Polygon zkEVM",
                "polygon_zkevm",
                "https://zkevm.blockscout.com",
                "https://zkevm.polygonscan.com",
            ),
            ChainDescriptor::builtin(
                "59144",
                "Linea",
                "linea",
                "https://explorer.linea.build",
                "https://lineascan.build",
            ),
            ChainDescriptor::builtin(
                "5000",
                "Mantle",
                "mantle",
                "https://explorer.mantle.xyz",
                "https://mantlescan.xyz",
            ),
            ChainDescriptor::builtin(
                "17001",
                "Redstone",
                "redstone",
                "https://explorer.redstone.xyz",
                "https://explorer.redstone.xyz",
            ),
        ])
    }

    /// Replace descriptors sharing a chain id, append the rest.
    pub fn with_overrides(mut self, overrides: Vec<ChainDescriptor>) -> Self {
        for descriptor in overrides {
            match self
                .chains
                .iter_mut()
                .find(|existing| existing.chain_id == descriptor.chain_id)
            {
                Some(existing) => *existing = descriptor,
                None => self.chains.push(descriptor),
            }
        }
        self
    }

    pub fn lookup(&self, chain_id: &str) -> Result<&ChainDescriptor> {
        self.chains
            .iter()
            .find(|chain| chain.chain_id == chain_id)
            .ok_or_else(|| Error::UnknownChain(chain_id.to_string()))
    }

    /// Resolve by chain id, origin key, or case-insensitive display name
    pub fn find(&self, needle: &str) -> Option<&ChainDescriptor> {
        let needle = needle.trim();
        self.chains.iter().find(|chain| {
            chain.chain_id == needle
                || chain.origin_key.eq_ignore_ascii_case(needle)
                || chain.display_name.eq_ignore_ascii_case(needle)
        })
    }

    pub fn contains(&self, chain_id: &str) -> bool {
        self.lookup(chain_id).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.chains.iter()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Neighbouring chain id in picker order, wrapping around
    pub fn cycle(&self, chain_id: &str, forward: bool) -> Option<&ChainDescriptor> {
        if self.chains.is_empty() {
            return None;
        }
        let len = self.chains.len();
        let idx = self
            .chains
            .iter()
            .position(|chain| chain.chain_id == chain_id)
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        self.chains.get(next)
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
