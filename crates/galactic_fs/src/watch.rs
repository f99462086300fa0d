//! Glob-filtered change notifications

use crate::filesystem::FsHandle;
use crate::{Entry, Glob, Result, Subscription};
use galactic_ledger::Document;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Pending watch on a path pattern; nothing is delivered until subscribed
#[derive(Clone)]
pub struct Watch {
    glob: Glob,
    fs: FsHandle,
}

impl Watch {
    pub(crate) fn new(glob: Glob, fs: FsHandle) -> Self {
        Self { glob, fs }
    }

    pub fn pattern(&self) -> &str {
        self.glob.pattern()
    }

    /// Deliver matching changes to `callback` until the subscription is
    /// dropped or unsubscribed.
    ///
    /// Each ledger batch is filtered by the pattern and wrapped into
    /// entries; removals arrive with `Entry::is_deleted` set. Batches with
    /// no matching change are not delivered.
    pub fn subscribe<F>(&self, callback: F) -> Result<Subscription>
    where
        F: Fn(Vec<Entry>) + Send + Sync + 'static,
    {
        let fs = self.fs.upgrade()?;
        let glob = self.glob.clone();
        let handle = self.fs.clone();

        let subscription = fs.ledger().subscribe(Arc::new(move |batch: &[Document]| {
            let entries: Vec<Entry> = batch
                .iter()
                .filter(|doc| glob.matches(&doc.path))
                .map(|doc| Entry::from_document(doc.clone(), &handle))
                .collect();
            if !entries.is_empty() {
                callback(entries);
            }
        }));

        tracing::info!("Watching: {}", self.glob.pattern());
        Ok(subscription)
    }

    /// Matching change batches as an async stream of messages
    pub fn channel(&self) -> Result<(Subscription, UnboundedReceiver<Vec<Entry>>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(move |entries| {
            // The receiver may already be gone; the subscription outlives it
            let _ = tx.send(entries);
        })?;
        Ok((subscription, rx))
    }
}

#[cfg(test)]
mod tests {
    use crate::{GalacticFs, WriteOptions};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_only_matching_changes_are_delivered() {
        let fs = GalacticFs::in_memory();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(Mutex::new(0usize));

        let sink = seen.clone();
        let counter = calls.clone();
        let _subscription = fs
            .watch("/a*")
            .unwrap()
            .subscribe(move |entries| {
                *counter.lock() += 1;
                sink.lock()
                    .extend(entries.iter().map(|e| e.path().to_string()));
            })
            .unwrap();

        fs.write("/a1.txt", "1", WriteOptions::default()).await.unwrap();
        fs.write("/b.txt", "2", WriteOptions::default()).await.unwrap();
        fs.write("/a2.txt", "3", WriteOptions::default()).await.unwrap();

        assert_eq!(*seen.lock(), vec!["/a1.txt", "/a2.txt"]);
        assert_eq!(*calls.lock(), 2);
    }

    #[tokio::test]
    async fn test_deletions_are_flagged() {
        let fs = GalacticFs::in_memory();
        fs.write("/a.txt", "x", WriteOptions::default()).await.unwrap();

        let deleted = Arc::new(Mutex::new(Vec::new()));
        let sink = deleted.clone();
        let _subscription = fs
            .watch("/a.txt")
            .unwrap()
            .subscribe(move |entries| {
                sink.lock().extend(entries.iter().map(|e| e.is_deleted()));
            })
            .unwrap();

        fs.delete("/a.txt").await.unwrap();
        assert_eq!(*deleted.lock(), vec![true]);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let fs = GalacticFs::in_memory();
        let calls = Arc::new(Mutex::new(0usize));
        let counter = calls.clone();

        let subscription = fs
            .watch("*")
            .unwrap()
            .subscribe(move |_| *counter.lock() += 1)
            .unwrap();
        fs.write("/x", "1", WriteOptions::default()).await.unwrap();
        subscription.unsubscribe();
        fs.write("/y", "2", WriteOptions::default()).await.unwrap();

        assert_eq!(*calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_channel_receives_batches() {
        let fs = GalacticFs::in_memory();
        let (_subscription, mut rx) = fs.watch("/docs/*").unwrap().channel().unwrap();

        fs.write("/other.txt", "o", WriteOptions::default())
            .await
            .unwrap();
        fs.write("/docs/readme.md", "r", WriteOptions::default())
            .await
            .unwrap();

        let batch = rx.recv().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].path(), "/docs/readme.md");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_watch_after_drop_is_detached() {
        let fs = GalacticFs::in_memory();
        let watch = fs.watch("*").unwrap();
        drop(fs);
        assert!(watch.subscribe(|_| {}).is_err());
    }
}
