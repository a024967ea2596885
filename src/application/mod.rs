//! Mock data layer: generators, envelopes, stores and simulated latency.

pub mod envelope;
pub mod error;
pub mod generators;
pub mod latency;
pub mod pagination;
pub mod store;
