//! Environment configuration for the `wraith` binary.
//!
//! Values come from the process environment, which `main` seeds from a `.env`
//! file before parsing arguments. Command-line flags take precedence over
//! anything read here.

use std::path::PathBuf;

use anyhow::{Context, Result};

use wraith_core::constants::DEFAULT_SCAN_BATCH_SIZE;

/// Registry file used when neither flag nor env var names one.
pub const DEFAULT_REGISTRY_PATH: &str = "wraith-registry.bin";

/// Settings read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliConfig {
    /// Breadcrumb registry file (`WRAITH_REGISTRY_PATH`)
    pub registry_path: PathBuf,
    /// Scan worker threads (`WRAITH_SCAN_WORKERS`), `None` means one per core
    pub scan_workers: Option<usize>,
    /// Candidates per scan batch (`WRAITH_SCAN_BATCH_SIZE`)
    pub scan_batch_size: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            scan_workers: None,
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}

impl CliConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            registry_path: lookup("WRAITH_REGISTRY_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.registry_path),
            scan_workers: parse_count(&lookup, "WRAITH_SCAN_WORKERS")?,
            scan_batch_size: parse_count(&lookup, "WRAITH_SCAN_BATCH_SIZE")?
                .unwrap_or(defaults.scan_batch_size),
        })
    }
}

fn parse_count(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<usize>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => {
            let n: usize = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a positive integer, got {:?}", key, raw))?;
            anyhow::ensure!(n > 0, "{} must be at least 1", key);
            Ok(Some(n))
        }
    }
}
