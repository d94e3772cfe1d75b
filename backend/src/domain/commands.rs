//! Domain-level command and query types.
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined in
//! the `shared` crate to these internal types.

pub mod events {
    use shared::{CalendarDate, CreateEventRequest, UpdateEventRequest};

    /// Input for creating a new event.
    #[derive(Debug, Clone)]
    pub struct CreateEventCommand {
        pub date: String,
        pub title: String,
        pub time: String,
        pub description: String,
    }

    impl From<CreateEventRequest> for CreateEventCommand {
        fn from(request: CreateEventRequest) -> Self {
            Self {
                date: request.date,
                title: request.title,
                time: request.time,
                description: request.description,
            }
        }
    }

    /// Input for updating an event; `None` fields keep their current value.
    #[derive(Debug, Clone)]
    pub struct UpdateEventCommand {
        pub event_id: String,
        pub date: Option<String>,
        pub title: Option<String>,
        pub time: Option<String>,
        pub description: Option<String>,
    }

    impl UpdateEventCommand {
        pub fn from_request(event_id: String, request: UpdateEventRequest) -> Self {
            Self {
                event_id,
                date: request.date,
                title: request.title,
                time: request.time,
                description: request.description,
            }
        }
    }

    /// Query for listing events, optionally restricted to an inclusive date range.
    #[derive(Debug, Clone, Default)]
    pub struct EventListQuery {
        pub from: Option<CalendarDate>,
        pub to: Option<CalendarDate>,
    }
}
