use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

/// Transport crates stay at `warn` unless `RUST_LOG` says otherwise.
const QUIET_DEPENDENCIES: [&str; 2] = ["hyper", "h2"];

/// Install the global subscriber: configured level for this crate, `RUST_LOG`
/// directives layered on top, compact or JSON lines on stdout.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    let overrides = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let env_filter = build_filter(logging.level, &overrides);

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

/// The configured level and quiet dependency directives first, then
/// `overrides`, so a later directive for the same target wins. Unparsable
/// directives are skipped.
fn build_filter(level: LevelFilter, overrides: &str) -> EnvFilter {
    let directives = std::iter::once(level.to_string())
        .chain(QUIET_DEPENDENCIES.iter().map(|target| format!("{target}=warn")))
        .chain((!overrides.trim().is_empty()).then(|| overrides.trim().to_string()))
        .collect::<Vec<_>>()
        .join(",");

    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependencies_are_quieted() {
        let rendered = build_filter(LevelFilter::DEBUG, "").to_string();
        assert!(rendered.contains("hyper=warn"));
        assert!(rendered.contains("h2=warn"));
        assert!(rendered.contains("debug"));
    }

    #[test]
    fn overrides_are_layered_and_bad_ones_skipped() {
        let rendered = build_filter(LevelFilter::INFO, "property_mock=trace, ==nope").to_string();
        assert!(rendered.contains("property_mock=trace"));
        assert!(!rendered.contains("nope"));
    }

    #[test]
    fn bare_level_override_replaces_configured_level() {
        let rendered = build_filter(LevelFilter::INFO, "trace").to_string();
        assert!(rendered.contains("trace"));
        assert!(!rendered.contains("info"));
        assert!(rendered.contains("hyper=warn"));
    }

    #[test]
    fn overrides_win_over_quieted_dependencies() {
        let rendered = build_filter(LevelFilter::INFO, "hyper=debug").to_string();
        assert!(rendered.contains("hyper=debug"));
        assert!(!rendered.contains("hyper=warn"));
    }
}
