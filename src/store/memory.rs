//! Process-lifetime subscriber store.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;

use super::{email_key, AddOutcome, NewSubscriber, Subscriber, SubscriberStore};

/// In-memory [`SubscriberStore`].
///
/// Records and the email index live behind one mutex so the duplicate check
/// and the append cannot interleave.
#[derive(Debug, Default)]
pub struct MemorySubscriberStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<Subscriber>,
    emails: HashSet<String>,
}

impl MemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored subscribers.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SubscriberStore for MemorySubscriberStore {
    async fn add(&self, subscriber: NewSubscriber) -> Result<AddOutcome, StoreError> {
        let key = email_key(&subscriber.email);
        let mut inner = self.inner.lock().await;

        if !inner.emails.insert(key) {
            debug!(total = inner.records.len(), "subscriber_duplicate");
            return Ok(AddOutcome::Duplicate);
        }

        inner.records.push(Subscriber {
            name: subscriber.name,
            email: subscriber.email,
            shop: subscriber.shop,
            customer_id: subscriber.customer_id,
            created_at: Utc::now(),
        });
        debug!(total = inner.records.len(), "subscriber_added");

        Ok(AddOutcome::Accepted)
    }

    async fn list(&self) -> Result<Vec<Subscriber>, StoreError> {
        Ok(self.inner.lock().await.records.clone())
    }
}
