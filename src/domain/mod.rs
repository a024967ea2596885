//! Domain layer: record shapes, status vocabularies and their invariants.

pub mod entities;
pub mod error;
pub mod initials;
pub mod types;
