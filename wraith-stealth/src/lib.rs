//! # Wraith Stealth Address Protocol
//!
//! High-level API for paying meta-addresses and recognising payments.
//!
//! This crate provides:
//!
//! - **Wallet**: rebuild a recipient's meta-keys from a signature
//! - **Payment Construction**: transfer + memo instructions for a one-time address
//! - **Payment Discovery**: test breadcrumbs and recover stealth keys
//!
//! ## Quick Start
//!
//! ```rust
//! use wraith_core::types::LedgerAddress;
//! use wraith_stealth::{build_stealth_payment, PaymentRequest, StealthWallet};
//!
//! // Recipient: re-sign the domain message, publish the meta-address
//! let wallet = StealthWallet::from_signature(&[9u8; 64]).unwrap();
//!
//! // Sender: build the payment
//! let payment = build_stealth_payment(&PaymentRequest {
//!     recipient: wallet.meta_address().clone(),
//!     amount: 1_000,
//!     sender: LedgerAddress::from_array([1; 32]),
//!     settlement: LedgerAddress::from_array([2; 32]),
//! })
//! .unwrap();
//!
//! // Recipient: recognise it from the indexed breadcrumb
//! let record = payment.to_record("tx-signature", 0);
//! let recovered = wallet.try_recover(&record).unwrap().unwrap();
//! assert_eq!(recovered.stealth_address, payment.stealth_address);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod discovery;
pub mod payment;
pub mod wallet;

pub use discovery::{
    scan_breadcrumb, scan_breadcrumb_at, scan_breadcrumbs_sequential, RecoveredPayment, ScanKeys,
    ScanResult, ScanStats,
};
pub use payment::{
    build_stealth_payment, build_stealth_payment_with_seed, PaymentRequest, StealthPayment,
    StealthPaymentBuilder, TransferInstruction,
};
pub use wallet::{StealthWallet, ViewKeyExport};
