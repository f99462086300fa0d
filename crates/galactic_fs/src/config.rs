//! Storage and logging configuration

use crate::{FsError, GalacticFs, Result};
use anyhow::Context;
use directories::ProjectDirs;
use galactic_ledger::{
    ledger_dir, DiskQuota, FixedQuota, Ledger, MemoryLedger, QuotaEstimator, SqliteLedger,
    UnknownQuota,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalacticConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Which ledger implementation stores the documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    #[default]
    Sqlite,
    RocksDb,
}

impl FromStr for Backend {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "sqlite" => Ok(Backend::Sqlite),
            "rocksdb" => Ok(Backend::RocksDb),
            other => Err(FsError::Config(format!("unknown backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Ledger name, used as the on-disk file name
    pub name: String,
    /// Directory holding ledger files; the platform data dir when unset
    pub dir: Option<PathBuf>,
    /// Fixed quota in bytes; estimated from the disk when unset
    pub quota: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Sqlite,
            name: "default".to_string(),
            dir: None,
            quota: None,
        }
    }
}

impl StorageConfig {
    pub fn ledger_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(ledger_dir)
    }

    /// On-disk location of the ledger, `None` for the memory backend
    pub fn ledger_path(&self) -> Option<PathBuf> {
        let dir = self.ledger_dir();
        match self.backend {
            Backend::Memory => None,
            Backend::Sqlite => Some(dir.join(format!("{}.sqlite3", self.name))),
            Backend::RocksDb => Some(dir.join(format!("{}.rocksdb", self.name))),
        }
    }

    /// Open the configured ledger
    pub fn open_ledger(&self) -> Result<Arc<dyn Ledger>> {
        let ledger: Arc<dyn Ledger> = match (self.backend, self.ledger_path()) {
            (Backend::Sqlite, Some(path)) => Arc::new(SqliteLedger::open(&path)?),
            #[cfg(feature = "rocksdb")]
            (Backend::RocksDb, Some(path)) => Arc::new(galactic_ledger::RocksLedger::open(&path)?),
            #[cfg(not(feature = "rocksdb"))]
            (Backend::RocksDb, _) => {
                return Err(FsError::Config(
                    "the rocksdb backend requires the `rocksdb` feature".to_string(),
                ))
            }
            _ => Arc::new(MemoryLedger::new()),
        };
        Ok(ledger)
    }

    /// Quota source: the configured value, else the disk holding the ledger
    pub fn quota_estimator(&self) -> Arc<dyn QuotaEstimator> {
        match (self.quota, self.backend) {
            (Some(quota), _) => Arc::new(FixedQuota(quota)),
            (None, Backend::Memory) => Arc::new(UnknownQuota),
            (None, _) => Arc::new(DiskQuota::new(self.ledger_dir())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Rolled log files older than this are removed at startup
    pub keep_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            keep_days: 7,
        }
    }
}

impl GalacticConfig {
    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if absent
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {:?}", path))?;
            let config: Self = toml::from_str(&content)
                .with_context(|| format!("malformed configuration in {:?}", path))?;
            tracing::info!("Configuration loaded from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "GalacticFS", "GalacticFS")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Open a filesystem over the configured ledger
    pub fn open_filesystem(&self) -> Result<GalacticFs> {
        let ledger = self.storage.open_ledger()?;
        let quota = self.storage.quota_estimator();
        tracing::info!(
            "Opened {:?} ledger {:?}",
            self.storage.backend,
            self.storage.name
        );
        Ok(GalacticFs::with_quota(ledger, quota))
    }
}
