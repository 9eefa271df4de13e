//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    ChatRef, DateWindow, ExportJob, ExportStats, GroupTarget, MessageRecord, RawMessage, SinkTable,
};
pub use errors::DomainError;
