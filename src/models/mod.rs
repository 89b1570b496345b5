//! Data models for the timetable backend.
//!
//! Field names are camelCase on the wire to match the front-end's saved documents.

mod document;
mod semester;

pub use document::*;
pub use semester::*;
