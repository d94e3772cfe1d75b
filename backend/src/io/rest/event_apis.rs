use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use shared::{
    CalendarDate, CreateEventRequest, DeleteEventResponse, EventFormInput, EventFormValidation,
    EventListResponse, EventResponse, UpdateEventRequest,
};
use tracing::{error, info, warn};

use crate::domain::commands::events::{CreateEventCommand, EventListQuery, UpdateEventCommand};
use crate::domain::EventError;
use crate::AppState;

// Query parameters for event listing API
#[derive(Debug, Deserialize)]
pub struct EventListParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

// Query parameters for the month event listing API
#[derive(Debug, Deserialize)]
pub struct EventMonthParams {
    pub year: i32,
    pub month: u32,
}

/// Create a router for event related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/month", get(list_events_for_month))
        .route("/validate", post(validate_event))
        .route("/:id", get(get_event).put(update_event).delete(delete_event))
}

/// Translate a domain error into an HTTP response
fn event_error_response(err: EventError) -> Response {
    match err {
        EventError::NotFound(id) => {
            warn!("Event not found: {}", id);
            (StatusCode::NOT_FOUND, format!("Event not found: {}", id)).into_response()
        }
        EventError::Validation(errors) => {
            let validation = EventFormValidation {
                is_valid: false,
                errors,
            };
            (StatusCode::BAD_REQUEST, Json(validation)).into_response()
        }
        EventError::Calendar(e) => {
            warn!("Rejected event month request: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        EventError::Storage(e) => {
            error!("Event storage failure: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Event storage error").into_response()
        }
    }
}

fn parse_bound(raw: Option<String>) -> Result<Option<CalendarDate>, Response> {
    raw.map(|value| {
        value
            .parse::<CalendarDate>()
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()).into_response())
    })
    .transpose()
}

/// List events in insertion order, optionally within a date range
async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
) -> impl IntoResponse {
    info!("GET /api/events - query: {:?}", params);

    let query = match (parse_bound(params.from), parse_bound(params.to)) {
        (Ok(from), Ok(to)) => EventListQuery { from, to },
        (Err(response), _) | (_, Err(response)) => return response,
    };

    match state.event_service.list_events(query).await {
        Ok(events) => (StatusCode::OK, Json(EventListResponse { events })).into_response(),
        Err(e) => event_error_response(e),
    }
}

/// List the events shown on a month grid, padding days included
async fn list_events_for_month(
    State(state): State<AppState>,
    Query(params): Query<EventMonthParams>,
) -> impl IntoResponse {
    info!("GET /api/events/month - query: {:?}", params);

    match state
        .event_service
        .list_events_for_month(&state.calendar_service, params.year, params.month)
        .await
    {
        Ok(events) => (StatusCode::OK, Json(EventListResponse { events })).into_response(),
        Err(e) => event_error_response(e),
    }
}

/// Create a new event; the backend assigns its id
async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> impl IntoResponse {
    info!("POST /api/events - request: {:?}", request);

    match state
        .event_service
        .create_event(CreateEventCommand::from(request))
        .await
    {
        Ok(event) => {
            let response = EventResponse {
                success_message: format!("Event '{}' added for {}", event.title, event.date),
                event,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => event_error_response(e),
    }
}

async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("GET /api/events/{}", id);

    match state.event_service.get_event(&id).await {
        Ok(event) => {
            let response = EventResponse {
                event,
                success_message: String::new(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => event_error_response(e),
    }
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateEventRequest>,
) -> impl IntoResponse {
    info!("PUT /api/events/{} - request: {:?}", id, request);

    match state
        .event_service
        .update_event(UpdateEventCommand::from_request(id, request))
        .await
    {
        Ok(event) => {
            let response = EventResponse {
                success_message: format!("Event '{}' updated", event.title),
                event,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => event_error_response(e),
    }
}

async fn delete_event(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/events/{}", id);

    match state.event_service.delete_event(&id).await {
        Ok(()) => {
            let response = DeleteEventResponse {
                success_message: "Event deleted".to_string(),
                deleted_id: id,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => event_error_response(e),
    }
}

/// Validate event form input without saving it
async fn validate_event(
    State(state): State<AppState>,
    Json(input): Json<EventFormInput>,
) -> impl IntoResponse {
    info!("POST /api/events/validate");

    let validation = state.event_service.validate_event_form(&input);
    (StatusCode::OK, Json(validation)).into_response()
}
