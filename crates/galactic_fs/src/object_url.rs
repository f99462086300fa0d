//! Scoped, caller-released references to rendered file content

use crate::Blob;
use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use uuid::Uuid;

const URL_SCHEME: &str = "blob:galactic/";

/// Live object URLs of one filesystem
pub(crate) type UrlRegistry = Arc<DashMap<String, Blob>>;

/// A `blob:` reference to a snapshot of file content.
///
/// Resolvable through `GalacticFs::resolve_url` until `release` is called.
/// Dropping an unreleased handle revokes it and logs a warning.
pub struct ObjectUrl {
    url: String,
    registry: Weak<DashMap<String, Blob>>,
    released: bool,
}

impl ObjectUrl {
    pub(crate) fn register(registry: &UrlRegistry, blob: Blob) -> Self {
        let url = format!("{}{}", URL_SCHEME, Uuid::new_v4());
        registry.insert(url.clone(), blob);
        tracing::debug!("Object URL created: {}", url);

        Self {
            url,
            registry: Arc::downgrade(registry),
            released: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Revoke the URL
    pub fn release(mut self) {
        self.revoke();
        self.released = true;
    }

    fn revoke(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.url);
        }
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!("Object URL dropped without release: {}", self.url);
            self.revoke();
        }
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrl")
            .field("url", &self.url)
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> Blob {
        Blob {
            bytes: b"data".to_vec(),
            mime: "text/plain".to_string(),
        }
    }

    #[test]
    fn test_release_revokes() {
        let registry: UrlRegistry = Arc::new(DashMap::new());
        let url = ObjectUrl::register(&registry, blob());
        assert!(url.as_str().starts_with("blob:"));
        assert_eq!(registry.get(url.as_str()).unwrap().bytes, b"data");

        url.release();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_drop_revokes() {
        let registry: UrlRegistry = Arc::new(DashMap::new());
        {
            let _url = ObjectUrl::register(&registry, blob());
            assert_eq!(registry.len(), 1);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_urls_are_unique() {
        let registry: UrlRegistry = Arc::new(DashMap::new());
        let a = ObjectUrl::register(&registry, blob());
        let b = ObjectUrl::register(&registry, blob());
        assert_ne!(a.as_str(), b.as_str());
        a.release();
        b.release();
    }
}
