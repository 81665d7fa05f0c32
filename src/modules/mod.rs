//! Feature modules that act on the current table.
//!
//! - export: write the visible rows to CSV or JSON

pub mod export;
