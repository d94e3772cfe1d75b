//! In-memory event repository.
//!
//! Holds an immutable `EventCollection` behind a lock. Writers build a new
//! collection and swap it in together with a bumped revision, so readers
//! always observe a complete snapshot.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::Event;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::traits::{EventSnapshot, EventStorage};

#[derive(Clone, Default)]
pub struct InMemoryEventRepository {
    state: Arc<RwLock<EventSnapshot>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStorage for InMemoryEventRepository {
    async fn store_event(&self, event: &Event) -> Result<()> {
        let mut state = self.state.write().await;
        let events = state
            .events
            .inserted(event.clone())
            .ok_or_else(|| anyhow!("Event with id {} already exists", event.id))?;

        state.events = events;
        state.revision += 1;
        debug!("Stored event {} (revision {})", event.id, state.revision);
        Ok(())
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<Event>> {
        let state = self.state.read().await;
        Ok(state.events.get(event_id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let state = self.state.read().await;
        Ok(state.events.as_slice().to_vec())
    }

    async fn modify_event<F, E>(&self, event_id: &str, edit: F) -> Result<Option<Result<Event, E>>>
    where
        F: FnOnce(&Event) -> std::result::Result<Event, E> + Send,
        E: Send,
    {
        let mut state = self.state.write().await;
        let Some(existing) = state.events.get(event_id) else {
            return Ok(None);
        };

        let mut event = match edit(existing) {
            Ok(event) => event,
            Err(e) => return Ok(Some(Err(e))),
        };
        event.id = existing.id.clone();

        let events = state
            .events
            .replaced(event.clone())
            .ok_or_else(|| anyhow!("Event {} vanished while locked", event_id))?;
        state.events = events;
        state.revision += 1;
        debug!("Updated event {} (revision {})", event.id, state.revision);
        Ok(Some(Ok(event)))
    }

    async fn delete_event(&self, event_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.events.removed(event_id) {
            Some(events) => {
                state.events = events;
                state.revision += 1;
                debug!("Deleted event {} (revision {})", event_id, state.revision);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn snapshot(&self) -> Result<EventSnapshot> {
        Ok(self.state.read().await.clone())
    }
}
