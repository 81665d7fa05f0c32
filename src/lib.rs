//! Labeldesk: a terminal workbench for labeling smart contracts.
//!
//! Records come from an Airtable base, get enriched with Blockscout and
//! Sourcify data, and are labeled through a ratatui interface.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod modules;
pub mod store;
pub mod ui;

pub use error::{Error, Result};
