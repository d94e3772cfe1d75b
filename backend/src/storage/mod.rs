//! # Storage Module
//!
//! Handles event persistence for the calendar backend.
//!
//! The domain layer talks to storage only through the `EventStorage` trait.
//! The bundled implementation keeps events in memory for the lifetime of the
//! process.

pub mod memory;
pub mod traits;

pub use memory::InMemoryEventRepository;
pub use traits::{EventSnapshot, EventStorage};
