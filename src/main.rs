use std::{future::IntoFuture, process, sync::Arc, time::Duration};

use property_mock::{
    application::{error::AppError, latency::LatencySimulator, store::MockDatabase},
    config,
    infra::{
        error::InfraError,
        http::{self, MockState},
        telemetry,
    },
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Routes(_) => run_routes(&settings),
    }
}

fn run_routes(settings: &config::Settings) -> Result<(), AppError> {
    let registry = http::mock_registry(&settings.mock.path_prefix)?;
    for line in registry.route_table() {
        println!("{line}");
    }
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let db = MockDatabase::new(settings.mock.seed);
    let latency = LatencySimulator::new(settings.mock.simulate_latency, settings.mock.seed);
    let state = MockState::new(db, latency);
    let router = http::build_router(state, &settings.mock.path_prefix)?;

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target = "property_mock::server",
        addr = %settings.server.addr,
        prefix = %settings.mock.path_prefix,
        simulate_latency = settings.mock.simulate_latency,
        "mock server listening"
    );

    let stopping = Arc::new(Notify::new());
    let signal = {
        let stopping = Arc::clone(&stopping);
        async move {
            wait_for_shutdown().await;
            stopping.notify_one();
        }
    };

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(signal)
        .into_future();
    let drain_deadline = drain_deadline(&stopping, settings.server.graceful_shutdown);

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = drain_deadline => {
            warn!(
                target = "property_mock::server",
                timeout_secs = settings.server.graceful_shutdown.as_secs(),
                "graceful shutdown timed out; dropping in-flight requests"
            );
        }
    }

    info!(target = "property_mock::server", "mock server stopped");
    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target = "property_mock::server", error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!(target = "property_mock::server", "shutdown signal received");
}

async fn drain_deadline(stopping: &Notify, grace: Duration) {
    stopping.notified().await;
    tokio::time::sleep(grace).await;
}
