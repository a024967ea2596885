//! Binds declared mock endpoints onto an axum router.
//!
//! Every declared url is rewritten by prepending the configured prefix twice:
//! the deployed client adds the prefix once through its base url and once
//! more behind the reverse proxy, and requests arrive carrying both.

use std::{collections::HashSet, fmt, future::Future, panic::AssertUnwindSafe, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
    routing::{MethodFilter, on},
};
use futures::{FutureExt, future::BoxFuture};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::application::envelope::{DEFAULT_SUCCESS_MESSAGE, success_response};
use crate::application::error::AppError;
use crate::application::latency::DelaySpec;
use crate::application::store::MockDatabase;
use crate::infra::error::InfraError;

use super::MockState;
use super::params::ParamBag;

/// Successful handler output, wrapped into the success envelope on the way out.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub data: Value,
    pub message: String,
}

impl Reply {
    pub fn new(data: impl Serialize) -> Result<Self, AppError> {
        Ok(Self {
            data: serde_json::to_value(data)?,
            message: DEFAULT_SUCCESS_MESSAGE.to_string(),
        })
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

pub type HandlerResult = Result<Reply, AppError>;

type BoxedHandler =
    Arc<dyn Fn(Arc<MockDatabase>, ParamBag) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// One endpoint declaration: url, accepted methods, delay policy and handler.
#[derive(Clone)]
pub struct MockEndpoint {
    pub url: &'static str,
    pub methods: Vec<Method>,
    pub delay: DelaySpec,
    handler: BoxedHandler,
}

impl fmt::Debug for MockEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockEndpoint")
            .field("url", &self.url)
            .field("methods", &self.methods)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl MockEndpoint {
    pub fn new<F, Fut>(url: &'static str, methods: &[Method], delay: DelaySpec, handler: F) -> Self
    where
        F: Fn(Arc<MockDatabase>, ParamBag) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            url,
            methods: methods.to_vec(),
            delay,
            handler: Arc::new(move |db, params| handler(db, params).boxed()),
        }
    }

    /// Run the handler directly, bypassing routing and latency.
    pub async fn call(&self, db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
        (self.handler)(db, params).await
    }
}

/// `prefix + prefix + url`; an empty prefix leaves the url untouched.
pub fn prefixed_path(prefix: &str, url: &str) -> String {
    format!("{prefix}{prefix}{url}")
}

/// One resolved line of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLine {
    pub methods: String,
    pub path: String,
    pub delay: DelaySpec,
}

impl fmt::Display for RouteLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12} {} ({})", self.methods, self.path, self.delay)
    }
}

/// Endpoint declarations bound under one prefix.
#[derive(Debug)]
pub struct MockRegistry {
    prefix: String,
    endpoints: Vec<(String, MockEndpoint)>,
}

impl MockRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            endpoints: Vec::new(),
        }
    }

    /// Declare endpoints, rejecting malformed urls and duplicate paths.
    pub fn register(
        mut self,
        endpoints: impl IntoIterator<Item = MockEndpoint>,
    ) -> Result<Self, InfraError> {
        let mut seen: HashSet<String> = self
            .endpoints
            .iter()
            .map(|(path, _)| path.clone())
            .collect();
        for endpoint in endpoints {
            if !endpoint.url.starts_with('/') {
                return Err(InfraError::registration(format!(
                    "url `{}` must start with `/`",
                    endpoint.url
                )));
            }
            if endpoint.methods.is_empty() {
                return Err(InfraError::registration(format!(
                    "url `{}` declares no methods",
                    endpoint.url
                )));
            }
            let path = prefixed_path(&self.prefix, endpoint.url);
            if !seen.insert(path.clone()) {
                return Err(InfraError::registration(format!("duplicate path `{path}`")));
            }
            self.endpoints.push((path, endpoint));
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn route_table(&self) -> Vec<RouteLine> {
        self.endpoints
            .iter()
            .map(|(path, endpoint)| RouteLine {
                methods: endpoint
                    .methods
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
                path: path.clone(),
                delay: endpoint.delay,
            })
            .collect()
    }

    pub fn into_router(self) -> Result<Router<MockState>, InfraError> {
        let mut router = Router::new();
        for (path, endpoint) in self.endpoints {
            let filter = method_filter(&endpoint)?;
            let endpoint = Arc::new(endpoint);
            debug!(target = "property_mock::http::registry", path = %path, "binding mock endpoint");
            router = router.route(
                &path,
                on(filter, move |State(state): State<MockState>, params: ParamBag| {
                    dispatch(state, Arc::clone(&endpoint), params)
                }),
            );
        }
        Ok(router)
    }
}

fn method_filter(endpoint: &MockEndpoint) -> Result<MethodFilter, InfraError> {
    let mut filters = endpoint.methods.iter().map(|method| {
        MethodFilter::try_from(method.clone()).map_err(|err| {
            InfraError::registration(format!("url `{}`: {err}", endpoint.url))
        })
    });
    let first = filters.next().ok_or_else(|| {
        InfraError::registration(format!("url `{}` declares no methods", endpoint.url))
    })??;
    filters.try_fold(first, |acc, next| Ok(acc.or(next?)))
}

/// Simulate latency, run the handler and envelope the outcome. Panics inside
/// the handler become `500` envelopes.
async fn dispatch(state: MockState, endpoint: Arc<MockEndpoint>, params: ParamBag) -> Response {
    state.latency.apply(endpoint.delay).await;

    let outcome = AssertUnwindSafe(endpoint.call(Arc::clone(&state.db), params))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(reply)) => Json(success_response(reply.data, reply.message)).into_response(),
        Ok(Err(err)) => err.into_response(),
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            AppError::unexpected(format!("handler for `{}` panicked: {detail}", endpoint.url))
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::application::error::INTERNAL_ERROR_MESSAGE;
    use crate::application::latency::LatencySimulator;

    async fn ok(_: Arc<MockDatabase>, _: ParamBag) -> HandlerResult {
        Reply::new(serde_json::json!({"ok": true}))
    }

    async fn boom(_: Arc<MockDatabase>, _: ParamBag) -> HandlerResult {
        panic!("kaboom: fixture table corrupted")
    }

    #[test]
    fn prefix_is_applied_twice() {
        assert_eq!(prefixed_path("", "/app/x"), "/app/x");
        assert_eq!(prefixed_path("/api", "/app/x"), "/api/api/app/x");
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let endpoints = vec![
            MockEndpoint::new("/app/a", &[Method::GET], DelaySpec::None, ok),
            MockEndpoint::new("/app/a", &[Method::POST], DelaySpec::None, ok),
        ];
        let err = MockRegistry::new("/p").register(endpoints).expect_err("duplicate");
        assert!(err.to_string().contains("/p/p/app/a"));
    }

    #[test]
    fn malformed_declarations_are_rejected() {
        let relative = MockEndpoint::new("app/a", &[Method::GET], DelaySpec::None, ok);
        assert!(MockRegistry::new("").register([relative]).is_err());

        let silent = MockEndpoint::new("/app/a", &[], DelaySpec::None, ok);
        assert!(MockRegistry::new("").register([silent]).is_err());
    }

    #[test]
    fn route_table_lists_methods_and_delay() {
        let registry = MockRegistry::new("/m")
            .register([MockEndpoint::new(
                "/app/a",
                &[Method::GET, Method::POST],
                DelaySpec::Range(200, 600),
                ok,
            )])
            .expect("register");
        let lines = registry.route_table();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].to_string(), "GET,POST     /m/m/app/a (200-600ms)");
    }

    #[tokio::test]
    async fn handler_panic_becomes_internal_error_envelope() {
        let state = MockState::new(MockDatabase::seeded(1), LatencySimulator::disabled());
        let router = MockRegistry::new("/p")
            .register([MockEndpoint::new("/app/x", &[Method::POST], DelaySpec::None, boom)])
            .expect("register")
            .into_router()
            .expect("router")
            .with_state(state);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/p/p/app/x")
            .body(Body::empty())
            .expect("request");
        let response = router.oneshot(request).await.expect("response");
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let envelope: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(envelope["success"], serde_json::json!(false));
        assert_eq!(envelope["code"], serde_json::json!("500"));
        assert_eq!(envelope["message"], serde_json::json!(INTERNAL_ERROR_MESSAGE));
        assert!(!envelope["message"].to_string().contains("kaboom"));
        assert_eq!(envelope["data"], Value::Null);
    }
}
