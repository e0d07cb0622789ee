//! Error types for Wraith.
//!
//! One error hierarchy for every layer, built with `thiserror`. The split that
//! matters to callers is between errors that abort a whole operation (bad
//! seed material, an unparseable recipient) and errors that only invalidate a
//! single scan candidate.

use thiserror::Error;

/// Result type alias using `WraithError`.
pub type Result<T> = std::result::Result<T, WraithError>;

/// Main error type for all Wraith operations.
#[derive(Debug, Error)]
pub enum WraithError {
    // ═══════════════════════════════════════════════════════════════════════════
    // KEY DERIVATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Seed material is not a 64-byte signature.
    #[error("Invalid seed length: expected {expected} bytes, got {actual}")]
    InvalidSeedLength { expected: usize, actual: usize },

    /// Malformed, off-curve, or low-order public key.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // ENCODING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Malformed base58 or byte-length mismatch.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    /// Encoding version mismatch.
    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    // ═══════════════════════════════════════════════════════════════════════════
    // STEALTH ADDRESS ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Invalid meta-address format or content.
    #[error("Invalid meta-address: {0}")]
    InvalidMetaAddress(String),

    /// Invalid stealth address format.
    #[error("Invalid stealth address: {0}")]
    InvalidStealthAddress(String),

    /// Breadcrumb record is missing fields or structurally unusable.
    #[error("Invalid breadcrumb: {0}")]
    InvalidBreadcrumb(String),

    /// A scan was stopped by its caller before completing.
    #[error("Scan cancelled")]
    ScanCancelled,

    // ═══════════════════════════════════════════════════════════════════════════
    // REGISTRY ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Registry storage is unusable.
    #[error("Registry error: {0}")]
    RegistryError(String),

    /// A breadcrumb with the same transaction reference already exists.
    #[error("Duplicate breadcrumb for transaction: {0}")]
    DuplicateBreadcrumb(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl WraithError {
    /// Returns true if this is a cryptographic error.
    pub fn is_crypto_error(&self) -> bool {
        matches!(
            self,
            WraithError::InvalidSeedLength { .. } | WraithError::InvalidPublicKey(_)
        )
    }

    /// Returns true if this error only invalidates a single scan candidate.
    ///
    /// A batch scan counts these as skipped and keeps going.
    pub fn is_candidate_local(&self) -> bool {
        matches!(
            self,
            WraithError::InvalidPublicKey(_)
                | WraithError::EncodingError(_)
                | WraithError::InvalidStealthAddress(_)
                | WraithError::InvalidBreadcrumb(_)
        )
    }

    /// Returns true if this error aborts the whole operation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WraithError::InvalidSeedLength { .. }
                | WraithError::InvalidMetaAddress(_)
                | WraithError::ConfigError(_)
                | WraithError::InternalError(_)
        )
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            WraithError::ValidationError(_)
                | WraithError::InvalidMetaAddress(_)
                | WraithError::InvalidStealthAddress(_)
                | WraithError::InvalidBreadcrumb(_)
                | WraithError::VersionMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_error_display() {
        let err = WraithError::InvalidSeedLength {
            expected: 64,
            actual: 63,
        };
        assert!(err.to_string().contains("64"));
        assert!(err.to_string().contains("63"));
    }

    #[test_case(WraithError::InvalidPublicKey("low order".into()) ; "off curve point")]
    #[test_case(WraithError::EncodingError("bad base58".into()) ; "bad encoding")]
    #[test_case(WraithError::InvalidBreadcrumb("empty tx ref".into()) ; "empty record")]
    fn test_candidate_local_errors_are_not_fatal(err: WraithError) {
        assert!(err.is_candidate_local());
        assert!(!err.is_fatal());
    }

    #[test_case(WraithError::InvalidSeedLength { expected: 64, actual: 0 } ; "short signature")]
    #[test_case(WraithError::InvalidMetaAddress("scan key".into()) ; "bad recipient")]
    fn test_root_errors_are_fatal(err: WraithError) {
        assert!(err.is_fatal());
        assert!(!err.is_candidate_local());
    }

    #[test]
    fn test_error_classification() {
        assert!(WraithError::InvalidPublicKey("x".into()).is_crypto_error());
        assert!(!WraithError::EncodingError("x".into()).is_crypto_error());
        assert!(WraithError::VersionMismatch { expected: 1, actual: 2 }.is_validation_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let wraith_result: Result<serde_json::Value> = json_result.map_err(WraithError::from);
        assert!(matches!(wraith_result, Err(WraithError::JsonError(_))));
    }
}
