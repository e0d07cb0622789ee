//! # Wraith Core
//!
//! Core types, errors, and traits for the Wraith dual-key stealth address protocol.
//!
//! This crate provides the foundational building blocks used by all other Wraith crates:
//!
//! - **Types**: Seed material, meta-addresses, stealth addresses, breadcrumbs
//! - **Errors**: A single error enum shared by every layer
//! - **Constants**: Key sizes, the versioned domain message, ledger program ids
//! - **Traits**: The breadcrumb source collaborator interface
//!
//! ## Example
//!
//! ```rust
//! use wraith_core::{MetaAddress, WraithError};
//!
//! // Meta-addresses have a compact textual form that can be shared freely
//! let err = MetaAddress::decode("not-a-meta-address").unwrap_err();
//! assert!(matches!(err, WraithError::InvalidMetaAddress(_)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{Result, WraithError};
pub use traits::*;
pub use types::*;
