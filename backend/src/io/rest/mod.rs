//! # REST API Interface Layer
//!
//! HTTP endpoints for the event calendar. Each submodule exposes a `router()`
//! that is nested under `/api` by [`crate::create_router`].
//!
//! - Calendar endpoints return 400 for months outside 1..=12 and for
//!   unparsable dates
//! - Event endpoints return 400 with the validation errors as JSON, 404 for
//!   unknown ids and 500 when storage fails

pub mod calendar_apis;
pub mod event_apis;
