use std::{io, sync::Once};

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::{
    application::{
        listing::{METRIC_FETCH_FAILED_TOTAL, METRIC_FETCH_STALE_DROPPED_TOTAL, METRIC_FETCH_TOTAL},
        moderation::{METRIC_ACTION_FAILED_TOTAL, METRIC_ACTION_TOTAL},
    },
    config::{LogFormat, LoggingSettings},
};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Log lines go to stderr so command output on stdout stays machine-readable.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .with_writer(io::stderr)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_writer(io::stderr)
            .compact()
            .with_target(true)
            .boxed(),
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

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_FETCH_TOTAL,
            Unit::Count,
            "Total number of list page fetches issued."
        );
        describe_counter!(
            METRIC_FETCH_FAILED_TOTAL,
            Unit::Count,
            "Total number of list fetches that failed and left an empty page."
        );
        describe_counter!(
            METRIC_FETCH_STALE_DROPPED_TOTAL,
            Unit::Count,
            "Total number of list responses dropped because a newer fetch superseded them."
        );
        describe_counter!(
            METRIC_ACTION_TOTAL,
            Unit::Count,
            "Total number of row actions sent to the server, counted per row."
        );
        describe_counter!(
            METRIC_ACTION_FAILED_TOTAL,
            Unit::Count,
            "Total number of row or bulk actions the server refused."
        );
    });
}
