//! Change feed shared by all ledger implementations

use crate::Document;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Receives every batch of changed documents
pub type ChangeCallback = Arc<dyn Fn(&[Document]) + Send + Sync>;

#[derive(Default)]
struct FeedInner {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(u64, ChangeCallback)>>,
}

/// Fan-out of change batches to registered callbacks
#[derive(Clone, Default)]
pub struct ChangeFeed {
    inner: Arc<FeedInner>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; it stays registered until the returned
    /// subscription is dropped or unsubscribed
    pub fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().push((id, callback));
        tracing::debug!("Change feed subscriber {} registered", id);

        Subscription {
            id,
            feed: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver a batch to every subscriber.
    ///
    /// Callbacks are invoked outside the subscriber lock so they may
    /// subscribe or unsubscribe themselves.
    pub fn publish(&self, batch: &[Document]) {
        if batch.is_empty() {
            return;
        }

        let subscribers: Vec<ChangeCallback> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();

        for callback in subscribers {
            callback(batch);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

/// Handle for a registered change callback
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    feed: Weak<FeedInner>,
}

impl Subscription {
    /// Stop receiving changes
    pub fn unsubscribe(self) {
        // Drop does the work
    }

    fn detach(&self) {
        if let Some(feed) = self.feed.upgrade() {
            feed.subscribers.lock().retain(|(id, _)| *id != self.id);
            tracing::debug!("Change feed subscriber {} removed", self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_publish_reaches_subscribers() {
        let feed = ChangeFeed::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = seen.clone();
        let sub = feed.subscribe(Arc::new(move |batch: &[Document]| {
            counter.fetch_add(batch.len(), Ordering::SeqCst);
        }));

        let doc = Document::folder("folder:/a/", "/a/", Utc::now());
        feed.publish(&[doc.clone(), doc]);
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        sub.unsubscribe();
        assert_eq!(feed.subscriber_count(), 0);

        feed.publish(&[Document::folder("folder:/b/", "/b/", Utc::now())]);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_batch_not_delivered() {
        let feed = ChangeFeed::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let _sub = feed.subscribe(Arc::new(move |_: &[Document]| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        feed.publish(&[]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_outlives_feed() {
        let feed = ChangeFeed::new();
        let sub = feed.subscribe(Arc::new(|_: &[Document]| {}));
        drop(feed);
        drop(sub);
    }

    #[test]
    fn test_dropped_subscription_is_removed() {
        let feed = ChangeFeed::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        drop(feed.subscribe(Arc::new(move |_: &[Document]| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));
        assert_eq!(feed.subscriber_count(), 0);

        feed.publish(&[Document::folder("folder:/a/", "/a/", Utc::now())]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
