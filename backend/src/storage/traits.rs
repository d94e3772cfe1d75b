//! # Storage Traits
//!
//! Storage abstraction for events, so the domain layer does not depend on a
//! particular backend.

use anyhow::Result;
use async_trait::async_trait;
use shared::Event;

use crate::domain::EventCollection;

/// A consistent view of the event store at one revision
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSnapshot {
    /// Incremented on every successful mutation
    pub revision: u64,
    pub events: EventCollection,
}

/// Trait defining the interface for event storage operations
#[async_trait]
pub trait EventStorage: Send + Sync {
    /// Store a new event. Fails if the id is already taken.
    async fn store_event(&self, event: &Event) -> Result<()>;

    /// Retrieve a specific event by ID
    async fn get_event(&self, event_id: &str) -> Result<Option<Event>>;

    /// List all events in insertion order
    async fn list_events(&self) -> Result<Vec<Event>>;

    /// Read, edit and replace an event in place as one step, so concurrent
    /// edits of the same event cannot overwrite each other.
    ///
    /// Returns `None` if the event does not exist. When `edit` fails its error
    /// is handed back and nothing is written. The edited event keeps the
    /// original id.
    async fn modify_event<F, E>(&self, event_id: &str, edit: F) -> Result<Option<Result<Event, E>>>
    where
        F: FnOnce(&Event) -> std::result::Result<Event, E> + Send,
        E: Send;

    /// Delete a single event.
    /// Returns true if the event was found and deleted, false otherwise
    async fn delete_event(&self, event_id: &str) -> Result<bool>;

    /// All events together with the revision they belong to
    async fn snapshot(&self) -> Result<EventSnapshot>;
}
