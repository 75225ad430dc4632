//! TOML configuration for the `gridhook` binary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use gridhook_delivery::DeliveryConfig;
use gridhook_source::{SheetSelector, DEFAULT_SHEET};
use gridhook_sync::ReconcilerConfig;
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "gridhook.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub document: String,
    pub source: SourceSection,
    pub store: StoreSection,
    pub delivery: DeliverySection,
    pub sync: SyncSection,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    pub path: PathBuf,
    pub sheet: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverySection {
    pub endpoint: String,
    pub token: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    pub lock_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            document: ReconcilerConfig::default().document,
            source: SourceSection::default(),
            store: StoreSection::default(),
            delivery: DeliverySection::default(),
            sync: SyncSection::default(),
        }
    }
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data.json"),
            sheet: DEFAULT_SHEET.to_string(),
        }
    }
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".gridhook/state.json"),
        }
    }
}

impl Default for DeliverySection {
    fn default() -> Self {
        let defaults = DeliveryConfig::default();
        Self {
            endpoint: defaults.endpoint,
            token: defaults.token,
            timeout_secs: defaults.timeout.as_secs(),
        }
    }
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            lock_timeout_secs: ReconcilerConfig::default().lock_timeout.as_secs(),
        }
    }
}

impl AppConfig {
    /// Load from `explicit` if given (it must exist), else from
    /// [`DEFAULT_CONFIG_FILE`] if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn delivery_config(&self) -> DeliveryConfig {
        DeliveryConfig::new(self.delivery.endpoint.clone(), self.delivery.token.clone())
            .with_timeout(Duration::from_secs(self.delivery.timeout_secs))
    }

    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig::new(self.document.clone())
            .with_lock_timeout(Duration::from_secs(self.sync.lock_timeout_secs))
    }

    pub fn sheet_selector(&self) -> SheetSelector {
        SheetSelector::new(self.source.sheet.clone())
    }

    /// Lock file held for the whole of a cycle, next to the state file.
    /// Every run against the same state file uses the same lock.
    pub fn cycle_lock_path(&self) -> PathBuf {
        let mut path = OsString::from(self.store.path.as_os_str());
        path.push(".cycle.lock");
        PathBuf::from(path)
    }
}
