//! # Domain Module
//!
//! Contains all business logic for the event calendar.
//!
//! ## Module Organization
//!
//! - **calendar**: Month-grid generation, month arithmetic and stateless navigation
//! - **event_service**: Event validation and create/update/delete operations
//! - **event_collection**: Immutable ordered event collection used by storage
//! - **commands**: Internal command and query types mapped from the public DTOs
//!
//! ## Business Rules
//!
//! - A month grid always covers whole weeks, Sunday first
//! - Events are placed on a grid cell by exact `YYYY-MM-DD` string match
//! - Events require a title, an `HH:MM` time, a description and a valid date
//! - Event identifiers are assigned by the backend, never by the client

pub mod calendar;
pub mod commands;
pub mod event_collection;
pub mod event_service;

pub use calendar::*;
pub use commands::*;
pub use event_collection::*;
pub use event_service::*;
