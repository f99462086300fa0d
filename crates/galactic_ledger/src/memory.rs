//! In-process ledger backed by ordered maps

use crate::{
    Capabilities, ChangeCallback, ChangeFeed, Document, Ledger, LedgerError, PathRange, Result,
    Subscription,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

#[derive(Default)]
struct State {
    docs: BTreeMap<String, Document>,
    /// path -> id
    by_path: BTreeMap<String, String>,
}

/// Non-persistent ledger
#[derive(Default)]
pub struct MemoryLedger {
    state: RwLock<State>,
    feed: ChangeFeed,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state.read().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn put(&self, doc: Document) -> Result<()> {
        {
            let mut state = self.state.write();
            if let Some(old) = state.docs.get(&doc.id) {
                if old.path != doc.path {
                    let old_path = old.path.clone();
                    state.by_path.remove(&old_path);
                }
            }
            state.by_path.insert(doc.path.clone(), doc.id.clone());
            state.docs.insert(doc.id.clone(), doc.clone());
        }

        self.feed.publish(&[doc]);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Document> {
        self.state
            .read()
            .docs
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    async fn del(&self, id: &str) -> Result<()> {
        let removed = {
            let mut state = self.state.write();
            let removed = state.docs.remove(id);
            if let Some(doc) = &removed {
                state.by_path.remove(&doc.path);
            }
            removed
        };

        if let Some(doc) = removed {
            self.feed.publish(&[doc.tombstone()]);
        }
        Ok(())
    }

    async fn query_path(&self, range: Option<&PathRange>) -> Result<Vec<Document>> {
        let state = self.state.read();

        let ids: Vec<&String> = match range {
            Some(range) if range.lower >= range.upper => Vec::new(),
            Some(range) => state
                .by_path
                .range::<str, _>((
                    Bound::Included(range.lower.as_str()),
                    Bound::Excluded(range.upper.as_str()),
                ))
                .map(|(_, id)| id)
                .collect(),
            None => state.by_path.values().collect(),
        };

        Ok(ids
            .into_iter()
            .filter_map(|id| state.docs.get(id).cloned())
            .collect())
    }

    async fn all_docs(&self) -> Result<Vec<Document>> {
        Ok(self.state.read().docs.values().cloned().collect())
    }

    fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        self.feed.subscribe(callback)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            persistent: false,
            supported: true,
            syncable: false,
            writeable: true,
        }
    }
}
