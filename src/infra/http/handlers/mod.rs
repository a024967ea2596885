//! Route handlers, one module per business domain.
//!
//! Each handler turns the merged [`ParamBag`] into a typed request before it
//! touches a store, then returns a [`Reply`] or an [`AppError`].

mod activities;
mod apply_room;
mod complaints;
mod directory;
mod fees;
mod locations;
mod repairs;

use axum::http::Method;

use crate::application::error::AppError;
use crate::application::latency::DelaySpec;
use crate::domain::error::DomainError;

use super::registry::MockEndpoint;

pub(super) const LIST_DELAY: DelaySpec = DelaySpec::Range(200, 600);
pub(super) const WRITE_DELAY: DelaySpec = DelaySpec::Range(300, 800);
pub(super) const COUNTER_DELAY: DelaySpec = DelaySpec::Fixed(100);
pub(super) const SELECTOR_DELAY: DelaySpec = DelaySpec::Fixed(150);

/// Default `row` for feed-like lists.
pub(super) const FEED_ROW: u32 = 10;
/// Default `row` for directory, fee and selector lists.
pub(super) const TABLE_ROW: u32 = 50;

pub(super) const GET_POST: &[Method] = &[Method::GET, Method::POST];
pub(super) const POST: &[Method] = &[Method::POST];
pub(super) const POST_DELETE: &[Method] = &[Method::POST, Method::DELETE];

pub(super) fn endpoints() -> Vec<MockEndpoint> {
    [
        activities::endpoints(),
        repairs::endpoints(),
        complaints::endpoints(),
        apply_room::endpoints(),
        fees::endpoints(),
        directory::endpoints(),
        locations::endpoints(),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Report a missing entity with a domain-specific message; other domain
/// errors keep their own classification.
pub(super) fn missing(message: &'static str) -> impl FnOnce(DomainError) -> AppError {
    move |err| match err {
        DomainError::NotFound { .. } => AppError::not_found(message),
        other => AppError::from(other),
    }
}
