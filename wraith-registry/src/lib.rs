//! # Wraith Registry
//!
//! Breadcrumb record storage standing in for a ledger indexer.
//!
//! This crate provides two storage backends:
//!
//! - **Memory**: Fast in-memory storage for development and testing
//! - **File**: Persistent JSON file storage for the single-user CLI
//!
//! Records are stored exactly as received. Decoding happens at scan time,
//! so one malformed record never blocks the rest.
//!
//! ## Example
//!
//! ```rust
//! use wraith_core::types::BreadcrumbRecord;
//! use wraith_registry::{MemoryRegistry, Registry};
//!
//! # tokio_test::block_on(async {
//! let registry = MemoryRegistry::new();
//! let id = registry
//!     .publish(BreadcrumbRecord::new("ephemeral", "stealth", "tx-1"))
//!     .await
//!     .unwrap();
//! assert_eq!(registry.get_by_id(id).await.unwrap().unwrap().tx_ref, "tx-1");
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod file;
mod memory;

pub use file::FileRegistry;
pub use memory::MemoryRegistry;

// Re-export the trait from core
pub use wraith_core::traits::BreadcrumbSource as Registry;
