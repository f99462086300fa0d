//! Host storage quota estimation

use async_trait::async_trait;
use std::path::PathBuf;

/// Quota reported when the host cannot estimate one (2^53 - 1)
pub const UNBOUNDED_QUOTA: u64 = 9_007_199_254_740_991;

/// Source of the storage quota used in storage reports
#[async_trait]
pub trait QuotaEstimator: Send + Sync {
    /// Quota in bytes, or `None` if the host cannot tell
    async fn estimate(&self) -> Option<u64>;
}

/// Host without quota introspection
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownQuota;

#[async_trait]
impl QuotaEstimator for UnknownQuota {
    async fn estimate(&self) -> Option<u64> {
        None
    }
}

/// Fixed, configured quota
#[derive(Debug, Clone, Copy)]
pub struct FixedQuota(pub u64);

#[async_trait]
impl QuotaEstimator for FixedQuota {
    async fn estimate(&self) -> Option<u64> {
        Some(self.0)
    }
}

/// Capacity of the volume holding a directory
#[derive(Debug, Clone)]
pub struct DiskQuota {
    dir: PathBuf,
}

impl DiskQuota {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl QuotaEstimator for DiskQuota {
    async fn estimate(&self) -> Option<u64> {
        match fs2::total_space(&self.dir) {
            Ok(total) => Some(total),
            Err(e) => {
                tracing::debug!("Quota estimation failed for {:?}: {}", self.dir, e);
                None
            }
        }
    }
}
