//! Mock backend for the property-management mini-program.
//!
//! Every endpoint answers from seeded in-memory stores wrapped in the
//! `{success, code, message, data, timestamp}` envelope, after an optional
//! artificial delay.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
