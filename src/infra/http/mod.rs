//! HTTP surface: mock endpoint registration, parameter merging and the
//! request logging middleware.

mod handlers;
mod middleware;
pub mod params;
pub mod registry;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn,
    response::{IntoResponse, Response},
};

use crate::application::error::AppError;
use crate::application::latency::LatencySimulator;
use crate::application::store::MockDatabase;
use crate::infra::error::InfraError;

pub use params::ParamBag;
pub use registry::{MockEndpoint, MockRegistry, Reply, RouteLine, prefixed_path};

use middleware::{log_responses, set_request_context};

pub const NOT_FOUND_MESSAGE: &str = "接口不存在";

#[derive(Clone)]
pub struct MockState {
    pub db: Arc<MockDatabase>,
    pub latency: Arc<LatencySimulator>,
}

impl MockState {
    pub fn new(db: MockDatabase, latency: LatencySimulator) -> Self {
        Self {
            db: Arc::new(db),
            latency: Arc::new(latency),
        }
    }
}

/// Every mock endpoint declared under `prefix`.
pub fn mock_registry(prefix: &str) -> Result<MockRegistry, InfraError> {
    MockRegistry::new(prefix).register(handlers::endpoints())
}

/// Assemble the mock router. Unknown paths and unsupported methods answer a
/// `404` envelope.
pub fn build_router(state: MockState, prefix: &str) -> Result<Router, InfraError> {
    let router = mock_registry(prefix)?
        .into_router()?
        .fallback(unknown_endpoint)
        .method_not_allowed_fallback(unknown_endpoint)
        .with_state(state)
        .layer(from_fn(log_responses))
        .layer(from_fn(set_request_context));
    Ok(router)
}

async fn unknown_endpoint() -> Response {
    AppError::not_found(NOT_FOUND_MESSAGE).into_response()
}
