use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::{envelope::CODE_INTERNAL, error::ErrorReport};

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Log failed envelopes. Mock responses are always HTTP 200, so failure is
/// detected through the attached [`ErrorReport`] rather than the status.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;

    if let Some(report) = response.extensions_mut().remove::<ErrorReport>() {
        let elapsed_ms = start.elapsed().as_millis();
        let detail = report
            .messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if report.code >= CODE_INTERNAL {
            error!(
                target = "property_mock::http::response",
                code = report.code,
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = report.source,
                detail = %detail,
                chain = ?report.messages,
                request_id = %request_id,
                "mock request failed",
            );
        } else {
            warn!(
                target = "property_mock::http::response",
                code = report.code,
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = report.source,
                detail = %detail,
                chain = ?report.messages,
                request_id = %request_id,
                "mock request rejected",
            );
        }
    }

    response
}
