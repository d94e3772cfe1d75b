//! Event service domain logic for the event calendar.
//!
//! Owns the event lifecycle: validation, identifier assignment and
//! create/update/delete against the configured storage. Identifiers are always
//! generated here, and the stored record is what gets returned to the caller,
//! so the id a client sees is the id the store knows.

use chrono::NaiveTime;
use shared::{CalendarDate, Event, EventFormInput, EventFormValidation, EventValidationError};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::calendar::{CalendarError, CalendarService};
use crate::domain::commands::events::{CreateEventCommand, EventListQuery, UpdateEventCommand};
use crate::storage::{EventSnapshot, EventStorage};

/// Errors raised by event operations
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Event not found: {0}")]
    NotFound(String),
    #[error("Invalid event: {}", describe(.0))]
    Validation(Vec<EventValidationError>),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

fn describe(errors: &[EventValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub struct EventService<S: EventStorage> {
    storage: Arc<S>,
    max_title_length: usize,
}

// Manual impl: a derive would require `S: Clone`.
impl<S: EventStorage> Clone for EventService<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            max_title_length: self.max_title_length,
        }
    }
}

impl<S: EventStorage> EventService<S> {
    pub fn new(storage: Arc<S>, max_title_length: usize) -> Self {
        Self {
            storage,
            max_title_length,
        }
    }

    /// Check form input without touching storage
    pub fn validate_event_form(&self, input: &EventFormInput) -> EventFormValidation {
        let mut errors = Vec::new();

        let title = input.title.trim();
        if title.is_empty() {
            errors.push(EventValidationError::EmptyTitle);
        } else if title.chars().count() > self.max_title_length {
            errors.push(EventValidationError::TitleTooLong(self.max_title_length));
        }

        let time = input.time.trim();
        if time.is_empty() {
            errors.push(EventValidationError::EmptyTime);
        } else if NaiveTime::parse_from_str(time, "%H:%M").is_err() || time.len() != 5 {
            errors.push(EventValidationError::InvalidTime(input.time.clone()));
        }

        if input.description.trim().is_empty() {
            errors.push(EventValidationError::EmptyDescription);
        }

        if input.date.parse::<CalendarDate>().is_err() {
            errors.push(EventValidationError::InvalidDate(input.date.clone()));
        }

        EventFormValidation {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub async fn create_event(&self, command: CreateEventCommand) -> Result<Event, EventError> {
        let input = EventFormInput {
            date: command.date,
            title: command.title,
            time: command.time,
            description: command.description,
        };
        self.ensure_valid(&input)?;

        let event = Event {
            id: Uuid::new_v4().to_string(),
            date: input.date,
            title: input.title.trim().to_string(),
            time: input.time.trim().to_string(),
            description: input.description,
        };

        self.storage.store_event(&event).await?;
        info!("Created event {} on {}", event.id, event.date);
        Ok(event)
    }

    /// Apply the fields present in `command`. The merge and validation run
    /// against the stored event while storage holds it, so concurrent partial
    /// updates of one event all take effect.
    pub async fn update_event(&self, command: UpdateEventCommand) -> Result<Event, EventError> {
        let event_id = command.event_id.clone();
        let outcome = self
            .storage
            .modify_event(&event_id, |existing| self.merge_update(existing, command))
            .await?;

        match outcome {
            Some(Ok(event)) => {
                info!("Updated event {}", event.id);
                Ok(event)
            }
            Some(Err(e)) => Err(e),
            None => Err(EventError::NotFound(event_id)),
        }
    }

    fn merge_update(&self, existing: &Event, command: UpdateEventCommand) -> Result<Event, EventError> {
        let input = EventFormInput {
            date: command.date.unwrap_or_else(|| existing.date.clone()),
            title: command.title.unwrap_or_else(|| existing.title.clone()),
            time: command.time.unwrap_or_else(|| existing.time.clone()),
            description: command
                .description
                .unwrap_or_else(|| existing.description.clone()),
        };
        self.ensure_valid(&input)?;

        Ok(Event {
            id: existing.id.clone(),
            date: input.date,
            title: input.title.trim().to_string(),
            time: input.time.trim().to_string(),
            description: input.description,
        })
    }

    pub async fn delete_event(&self, event_id: &str) -> Result<(), EventError> {
        if self.storage.delete_event(event_id).await? {
            info!("Deleted event {}", event_id);
            Ok(())
        } else {
            Err(EventError::NotFound(event_id.to_string()))
        }
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Event, EventError> {
        self.storage
            .get_event(event_id)
            .await?
            .ok_or_else(|| EventError::NotFound(event_id.to_string()))
    }

    /// List events in insertion order, optionally within an inclusive date range.
    /// Events with unparsable dates are excluded whenever a bound is given.
    pub async fn list_events(&self, query: EventListQuery) -> Result<Vec<Event>, EventError> {
        let events = self.storage.list_events().await?;
        if query.from.is_none() && query.to.is_none() {
            return Ok(events);
        }

        Ok(events
            .into_iter()
            .filter(|event| match event.date.parse::<CalendarDate>() {
                Ok(date) => {
                    query.from.map_or(true, |from| date >= from)
                        && query.to.map_or(true, |to| date <= to)
                }
                Err(_) => false,
            })
            .collect())
    }

    /// Events shown anywhere on the month grid, leading and trailing days included
    pub async fn list_events_for_month(
        &self,
        calendar: &CalendarService,
        year: i32,
        month: u32,
    ) -> Result<Vec<Event>, EventError> {
        let (from, to) = calendar.grid_span(year, month)?;
        self.list_events(EventListQuery {
            from: Some(from),
            to: Some(to),
        })
        .await
    }

    /// All events plus the store revision they were read at
    pub async fn snapshot(&self) -> Result<EventSnapshot, EventError> {
        Ok(self.storage.snapshot().await?)
    }

    fn ensure_valid(&self, input: &EventFormInput) -> Result<(), EventError> {
        let validation = self.validate_event_form(input);
        if validation.is_valid {
            Ok(())
        } else {
            warn!("Rejected event input: {}", describe(&validation.errors));
            Err(EventError::Validation(validation.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::GridCacheConfig;
    use crate::storage::InMemoryEventRepository;

    fn service() -> EventService<InMemoryEventRepository> {
        EventService::new(Arc::new(InMemoryEventRepository::new()), 20)
    }

    fn create_command(date: &str, title: &str) -> CreateEventCommand {
        CreateEventCommand {
            date: date.to_string(),
            title: title.to_string(),
            time: "14:30".to_string(),
            description: "Team sync".to_string(),
        }
    }

    fn form(date: &str, title: &str, time: &str, description: &str) -> EventFormInput {
        EventFormInput {
            date: date.to_string(),
            title: title.to_string(),
            time: time.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_validate_event_form() {
        let service = service();

        let valid = service.validate_event_form(&form("2025-06-15", "Standup", "09:15", "Daily"));
        assert!(valid.is_valid);
        assert!(valid.errors.is_empty());

        let empty = service.validate_event_form(&form("2025-06-15", "  ", "", ""));
        assert!(!empty.is_valid);
        assert_eq!(
            empty.errors,
            vec![
                EventValidationError::EmptyTitle,
                EventValidationError::EmptyTime,
                EventValidationError::EmptyDescription,
            ]
        );

        let malformed = service.validate_event_form(&form("2025-6-15", "Standup", "9am", "Daily"));
        assert_eq!(
            malformed.errors,
            vec![
                EventValidationError::InvalidTime("9am".to_string()),
                EventValidationError::InvalidDate("2025-6-15".to_string()),
            ]
        );

        let long = service.validate_event_form(&form("2025-06-15", &"x".repeat(21), "09:15", "Daily"));
        assert_eq!(long.errors, vec![EventValidationError::TitleTooLong(20)]);

        let bad_hour = service.validate_event_form(&form("2025-06-15", "Late", "25:00", "Daily"));
        assert_eq!(
            bad_hour.errors,
            vec![EventValidationError::InvalidTime("25:00".to_string())]
        );
    }

    #[tokio::test]
    async fn test_create_event_assigns_stored_id() {
        let service = service();

        let first = service.create_event(create_command("2025-06-15", "Lunch")).await.unwrap();
        let second = service.create_event(create_command("2025-06-15", "Lunch")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(Uuid::parse_str(&first.id).is_ok());
        // The returned id is the one the store knows
        assert_eq!(service.get_event(&first.id).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_create_event_rejects_invalid_input() {
        let service = service();

        let result = service.create_event(create_command("not-a-date", "")).await;
        match result {
            Err(EventError::Validation(errors)) => {
                assert!(errors.contains(&EventValidationError::EmptyTitle));
                assert!(errors.contains(&EventValidationError::InvalidDate("not-a-date".to_string())));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(service.list_events(EventListQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_event_replaces_only_given_fields() {
        let service = service();
        let a = service.create_event(create_command("2025-06-01", "A")).await.unwrap();
        let b = service.create_event(create_command("2025-06-02", "B")).await.unwrap();
        let c = service.create_event(create_command("2025-06-03", "C")).await.unwrap();

        let updated = service
            .update_event(UpdateEventCommand {
                event_id: b.id.clone(),
                date: Some("2025-07-04".to_string()),
                title: Some("B moved".to_string()),
                time: None,
                description: None,
            })
            .await
            .unwrap();

        assert_eq!(updated.id, b.id);
        assert_eq!(updated.date, "2025-07-04");
        assert_eq!(updated.title, "B moved");
        assert_eq!(updated.time, b.time);
        assert_eq!(updated.description, b.description);

        let events = service.list_events(EventListQuery::default()).await.unwrap();
        assert_eq!(events, vec![a, updated, c]);
    }

    #[tokio::test]
    async fn test_concurrent_partial_updates_both_apply() {
        let service = service();
        let event = service.create_event(create_command("2025-06-01", "A")).await.unwrap();

        let retitle = service.update_event(UpdateEventCommand {
            event_id: event.id.clone(),
            date: None,
            title: Some("Renamed".to_string()),
            time: None,
            description: None,
        });
        let reschedule = service.update_event(UpdateEventCommand {
            event_id: event.id.clone(),
            date: None,
            title: None,
            time: Some("16:45".to_string()),
            description: None,
        });
        let (retitled, rescheduled) = tokio::join!(retitle, reschedule);
        retitled.unwrap();
        rescheduled.unwrap();

        let stored = service.get_event(&event.id).await.unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.time, "16:45");
    }

    #[tokio::test]
    async fn test_update_missing_event() {
        let service = service();

        let result = service
            .update_event(UpdateEventCommand {
                event_id: "missing".to_string(),
                date: None,
                title: Some("X".to_string()),
                time: None,
                description: None,
            })
            .await;
        assert!(matches!(result, Err(EventError::NotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_update_event_validates_merged_input() {
        let service = service();
        let event = service.create_event(create_command("2025-06-01", "A")).await.unwrap();

        let result = service
            .update_event(UpdateEventCommand {
                event_id: event.id.clone(),
                date: None,
                title: None,
                time: Some("noon".to_string()),
                description: None,
            })
            .await;
        assert!(matches!(result, Err(EventError::Validation(_))));
        assert_eq!(service.get_event(&event.id).await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_delete_event() {
        let service = service();
        let event = service.create_event(create_command("2025-06-01", "A")).await.unwrap();

        service.delete_event(&event.id).await.unwrap();
        assert!(matches!(service.get_event(&event.id).await, Err(EventError::NotFound(_))));
        assert!(matches!(service.delete_event(&event.id).await, Err(EventError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_events_in_range() {
        let service = service();
        for date in ["2025-05-31", "2025-06-01", "2025-06-30", "2025-07-01"] {
            service.create_event(create_command(date, "Event")).await.unwrap();
        }

        let query = EventListQuery {
            from: Some(CalendarDate::new(2025, 6, 1)),
            to: Some(CalendarDate::new(2025, 6, 30)),
        };
        let dates: Vec<String> = service
            .list_events(query)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.date)
            .collect();
        assert_eq!(dates, vec!["2025-06-01", "2025-06-30"]);

        let open_ended = EventListQuery {
            from: Some(CalendarDate::new(2025, 6, 30)),
            to: None,
        };
        assert_eq!(service.list_events(open_ended).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_events_for_month_covers_padding() {
        let service = service();
        let calendar = CalendarService::new(GridCacheConfig {
            enabled: false,
            capacity: 0,
        });
        // January 2024 grid runs from 2023-12-31 to 2024-02-03
        for date in ["2023-12-30", "2023-12-31", "2024-01-15", "2024-02-03", "2024-02-04"] {
            service.create_event(create_command(date, "Event")).await.unwrap();
        }

        let dates: Vec<String> = service
            .list_events_for_month(&calendar, 2024, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.date)
            .collect();
        assert_eq!(dates, vec!["2023-12-31", "2024-01-15", "2024-02-03"]);

        let invalid = service.list_events_for_month(&calendar, 2024, 13).await;
        assert!(matches!(
            invalid,
            Err(EventError::Calendar(CalendarError::InvalidMonth(13)))
        ));
    }

    #[tokio::test]
    async fn test_snapshot_revision_tracks_mutations() {
        let service = service();
        assert_eq!(service.snapshot().await.unwrap().revision, 0);

        let event = service.create_event(create_command("2025-06-01", "A")).await.unwrap();
        service.delete_event(&event.id).await.unwrap();

        let snapshot = service.snapshot().await.unwrap();
        assert_eq!(snapshot.revision, 2);
        assert!(snapshot.events.is_empty());
    }
}
