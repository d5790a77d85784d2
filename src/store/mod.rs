//! Newsletter subscriber storage.
//!
//! Handlers only see the [`SubscriberStore`] trait, so the in-memory
//! implementation can be swapped for a persistent one without touching the
//! HTTP layer.
//!
//! # Example
//!
//! ```
//! use storefront_proxy::store::{AddOutcome, MemorySubscriberStore, NewSubscriber, SubscriberStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemorySubscriberStore::new();
//!     let jo = NewSubscriber::new("Jo", "jo@x.com");
//!
//!     assert_eq!(store.add(jo.clone()).await.unwrap(), AddOutcome::Accepted);
//!     assert_eq!(store.add(jo).await.unwrap(), AddOutcome::Duplicate);
//!     assert_eq!(store.list().await.unwrap().len(), 1);
//! }
//! ```

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;

pub use memory::MemorySubscriberStore;

// =============================================================================
// Records
// =============================================================================

/// A subscription request that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscriber {
    pub name: String,
    pub email: String,

    /// Store the request came through
    pub shop: Option<String>,

    /// Customer id when the visitor was logged in
    pub customer_id: Option<String>,
}

impl NewSubscriber {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            shop: None,
            customer_id: None,
        }
    }

    pub fn with_shop(mut self, shop: Option<String>) -> Self {
        self.shop = shop;
        self
    }

    pub fn with_customer_id(mut self, customer_id: Option<String>) -> Self {
        self.customer_id = customer_id;
        self
    }
}

/// A stored subscriber. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscriber {
    pub name: String,
    pub email: String,
    pub shop: Option<String>,
    pub customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of [`SubscriberStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The subscriber was appended
    Accepted,

    /// A subscriber with the same email already exists; nothing changed
    Duplicate,
}

/// Key used for email uniqueness: trimmed and lower-cased.
pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// SubscriberStore Trait
// =============================================================================

/// Append-only registry of subscribers, unique by email.
///
/// Implementations must make the duplicate check and the insert a single
/// atomic step: two concurrent `add` calls with the same email must yield
/// exactly one [`AddOutcome::Accepted`].
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Append `subscriber` unless its email is already registered.
    async fn add(&self, subscriber: NewSubscriber) -> Result<AddOutcome, StoreError>;

    /// Snapshot of all subscribers in insertion order.
    async fn list(&self) -> Result<Vec<Subscriber>, StoreError>;
}
