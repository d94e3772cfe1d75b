//! # IO Module
//!
//! Interface layer between HTTP clients and the domain logic.
//!
//! Handlers translate requests into domain calls and map domain errors to
//! HTTP status codes. No business rules live here.
//!
//! ## Supported Operations
//!
//! - **GET /api/calendar/month**: Month grid with events attached to each cell
//! - **GET /api/calendar/month/previous, /month/next**: Neighbouring months
//! - **GET /api/calendar/focus-date**: The month a client should open on
//! - **GET/POST /api/events**: List or create events
//! - **GET/PUT/DELETE /api/events/:id**: Read, edit or delete one event

pub mod rest;

pub use rest::*;
