//! Immutable, insertion-ordered collection of events keyed by id.
//!
//! Every edit returns a new collection and leaves the receiver untouched, so
//! a snapshot handed to the grid builder can never change underneath it.

use shared::Event;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventCollection {
    events: Arc<Vec<Event>>,
}

impl EventCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, event_id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == event_id)
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.get(event_id).is_some()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Append `event`. Returns `None` if an event with the same id already exists.
    pub fn inserted(&self, event: Event) -> Option<Self> {
        if self.contains(&event.id) {
            return None;
        }

        let events: Vec<Event> = self.events.iter().cloned().chain(Some(event)).collect();
        Some(Self { events: Arc::new(events) })
    }

    /// Replace the event sharing `event.id`, keeping its position.
    /// Returns `None` if no such event exists.
    pub fn replaced(&self, event: Event) -> Option<Self> {
        let position = self.events.iter().position(|existing| existing.id == event.id)?;

        let mut events = self.events.as_ref().clone();
        events[position] = event;
        Some(Self { events: Arc::new(events) })
    }

    /// Drop the event with `event_id`. Returns `None` if no such event exists.
    pub fn removed(&self, event_id: &str) -> Option<Self> {
        if !self.contains(event_id) {
            return None;
        }

        let events: Vec<Event> = self
            .events
            .iter()
            .filter(|event| event.id != event_id)
            .cloned()
            .collect();
        Some(Self { events: Arc::new(events) })
    }
}

impl From<Vec<Event>> for EventCollection {
    fn from(events: Vec<Event>) -> Self {
        Self { events: Arc::new(events) }
    }
}
