use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Local;
use serde::Deserialize;
use shared::{CalendarDate, CalendarFocusDate};
use tracing::{error, info, warn};

use crate::AppState;

// Query parameters for calendar month API
#[derive(Debug, Deserialize)]
pub struct CalendarMonthQuery {
    pub year: i32,
    pub month: u32,
    /// Reference date for highlighting; the server's local date when absent
    pub today: Option<String>,
}

/// Create a router for calendar related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/month", get(get_calendar_month))
        .route("/current-date", get(get_current_date))
        .route("/month/previous", get(navigate_previous_month))
        .route("/month/next", get(navigate_next_month))
        .route("/focus-date", get(get_focus_date))
}

/// Get the month grid with events placed on their days
async fn get_calendar_month(
    State(state): State<AppState>,
    Query(query): Query<CalendarMonthQuery>,
) -> impl IntoResponse {
    info!("GET /api/calendar/month - query: {:?}", query);

    let today = match query.today.as_deref() {
        Some(raw) => match raw.parse::<CalendarDate>() {
            Ok(date) => date,
            Err(e) => {
                warn!("Rejected calendar request: {}", e);
                return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
            }
        },
        None => CalendarDate::from(Local::now().date_naive()),
    };

    let snapshot = match state.event_service.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to read events for calendar: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error reading events").into_response();
        }
    };

    match state
        .calendar_service
        .cached_calendar_grid(
            query.year,
            query.month,
            snapshot.revision,
            snapshot.events.as_slice(),
            Some(today),
        ) {
        Ok(grid) => {
            info!(
                "Calendar generated for {} {} with {} days",
                grid.month_name,
                grid.year,
                grid.days.len()
            );
            (StatusCode::OK, Json(grid)).into_response()
        }
        Err(e) => {
            warn!("Rejected calendar request: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Get current date information from the backend
async fn get_current_date(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/calendar/current-date");

    let current_date = state.calendar_service.get_current_date();
    (StatusCode::OK, Json(current_date)).into_response()
}

/// Get the month a client should open on (the server's current month)
async fn get_focus_date(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/calendar/focus-date");

    let focus_date = state.calendar_service.current_focus_date();
    (StatusCode::OK, Json(focus_date)).into_response()
}

/// Get the month before the one given in the query
async fn navigate_previous_month(
    State(state): State<AppState>,
    Query(focus): Query<CalendarFocusDate>,
) -> impl IntoResponse {
    info!("GET /api/calendar/month/previous - query: {:?}", focus);

    match state.calendar_service.navigate_previous_month(focus) {
        Ok(focus_date) => (StatusCode::OK, Json(focus_date)).into_response(),
        Err(e) => {
            warn!("Failed to navigate to previous month: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Get the month after the one given in the query
async fn navigate_next_month(
    State(state): State<AppState>,
    Query(focus): Query<CalendarFocusDate>,
) -> impl IntoResponse {
    info!("GET /api/calendar/month/next - query: {:?}", focus);

    match state.calendar_service.navigate_next_month(focus) {
        Ok(focus_date) => (StatusCode::OK, Json(focus_date)).into_response(),
        Err(e) => {
            warn!("Failed to navigate to next month: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::domain::commands::events::CreateEventCommand;
    use crate::{create_router, initialize_backend};
    use axum::body::Body;
    use axum::http::{Method, Request};
    use shared::{CalendarFocusDate, CalendarGrid, CurrentDateResponse, DayMembership};
    use tower::ServiceExt;

    fn test_app() -> Result<(AppState, Router), Box<dyn std::error::Error>> {
        let config = AppConfig::default();
        let app_state = initialize_backend(&config);
        let app = create_router(app_state.clone(), &config)?;
        Ok((app_state, app))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        app: Router,
        uri: &str,
    ) -> Result<(StatusCode, Option<T>), Box<dyn std::error::Error>> {
        let response = app
            .oneshot(Request::builder().uri(uri).method(Method::GET).body(Body::empty())?)
            .await?;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&body).ok()))
    }

    #[tokio::test]
    async fn test_get_calendar_month_places_events() -> Result<(), Box<dyn std::error::Error>> {
        let (app_state, app) = test_app()?;

        let event = app_state
            .event_service
            .create_event(CreateEventCommand {
                date: "2023-12-31".to_string(),
                title: "New Year's Eve".to_string(),
                time: "20:00".to_string(),
                description: "Party".to_string(),
            })
            .await?;

        let (status, grid) =
            get_json::<CalendarGrid>(app, "/api/calendar/month?year=2024&month=1&today=2024-01-02")
                .await?;
        assert_eq!(status, StatusCode::OK);
        let grid = grid.ok_or("missing body")?;

        assert_eq!(grid.month_name, "January");
        assert_eq!(grid.first_day_of_week, 1);
        assert_eq!(grid.days.len(), 35);
        assert_eq!(grid.today_index, Some(2));
        assert_eq!(grid.days[0].membership, DayMembership::Previous);
        assert_eq!(grid.days[0].events, vec![event]);

        Ok(())
    }

    #[tokio::test]
    async fn test_calendar_reflects_new_events() -> Result<(), Box<dyn std::error::Error>> {
        let (app_state, app) = test_app()?;
        let uri = "/api/calendar/month?year=2025&month=6&today=2025-06-01";

        let (_, before) = get_json::<CalendarGrid>(app.clone(), uri).await?;
        let before = before.ok_or("missing body")?;
        assert!(before.days.iter().all(|cell| cell.events.is_empty()));

        app_state
            .event_service
            .create_event(CreateEventCommand {
                date: "2025-06-15".to_string(),
                title: "Lunch".to_string(),
                time: "12:00".to_string(),
                description: "With the team".to_string(),
            })
            .await?;

        let (_, after) = get_json::<CalendarGrid>(app, uri).await?;
        let after = after.ok_or("missing body")?;
        let with_events: Vec<_> = after.days.iter().filter(|cell| !cell.events.is_empty()).collect();
        assert_eq!(with_events.len(), 1);
        assert_eq!(with_events[0].date.to_string(), "2025-06-15");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_calendar_month_invalid_input() -> Result<(), Box<dyn std::error::Error>> {
        let (_, app) = test_app()?;

        let (status, _) =
            get_json::<CalendarGrid>(app.clone(), "/api/calendar/month?year=2024&month=13").await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            get_json::<CalendarGrid>(app, "/api/calendar/month?year=2024&month=1&today=01/02/2024")
                .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_current_date() -> Result<(), Box<dyn std::error::Error>> {
        let (_, app) = test_app()?;

        let (status, current) =
            get_json::<CurrentDateResponse>(app, "/api/calendar/current-date").await?;
        assert_eq!(status, StatusCode::OK);
        let current = current.ok_or("missing body")?;
        assert!(current.iso_date.parse::<CalendarDate>().is_ok());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_focus_date() -> Result<(), Box<dyn std::error::Error>> {
        let (_, app) = test_app()?;

        let (status, focus_date) = get_json::<CalendarFocusDate>(app, "/api/calendar/focus-date").await?;
        assert_eq!(status, StatusCode::OK);
        let focus_date = focus_date.ok_or("missing body")?;
        assert!(focus_date.month >= 1 && focus_date.month <= 12);

        Ok(())
    }

    #[tokio::test]
    async fn test_navigate_months() -> Result<(), Box<dyn std::error::Error>> {
        let (_, app) = test_app()?;

        let (status, previous) = get_json::<CalendarFocusDate>(
            app.clone(),
            "/api/calendar/month/previous?year=2025&month=1",
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(previous, Some(CalendarFocusDate { year: 2024, month: 12 }));

        let (status, next) =
            get_json::<CalendarFocusDate>(app.clone(), "/api/calendar/month/next?year=2024&month=12")
                .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(next, Some(CalendarFocusDate { year: 2025, month: 1 }));

        let (status, _) =
            get_json::<CalendarFocusDate>(app, "/api/calendar/month/next?year=2025&month=13").await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        Ok(())
    }

    #[tokio::test]
    async fn test_navigation_does_not_leak_between_clients() -> Result<(), Box<dyn std::error::Error>> {
        let (_, app) = test_app()?;

        let (_, before) = get_json::<CalendarFocusDate>(app.clone(), "/api/calendar/focus-date").await?;
        let before = before.ok_or("missing body")?;

        // One client steps forward from its own month
        get_json::<CalendarFocusDate>(app.clone(), "/api/calendar/month/next?year=2025&month=6").await?;

        let (_, after) = get_json::<CalendarFocusDate>(app, "/api/calendar/focus-date").await?;
        assert_eq!(after, Some(before));

        Ok(())
    }
}
