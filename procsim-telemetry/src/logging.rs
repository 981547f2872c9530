//! ## procsim-telemetry::logging
//! **Diagnostics subscriber and structured simulator events**
//!
//! ### Expectations:
//! - Diagnostics go to stderr so stdout stays reserved for the simulation log
//! - `RUST_LOG` overrides the default `info` filter
//! - Events carry OpenTelemetry `KeyValue` metadata

use opentelemetry::KeyValue;
use tracing::{info_span, Instrument};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. Later calls are no-ops.
    pub fn init() {
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .with_span_events(FmtSpan::ENTER)
            .try_init();
    }

    #[inline]
    pub async fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!(
            "simulator_event",
            event_type = event_type,
            otel.kind = "INTERNAL"
        );

        async {
            tracing::info!(
                metadata = ?metadata,
                "Simulator event occurred"
            );
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_logging() {
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(EventLogger::log_event(
                "arrivals_exhausted",
                vec![KeyValue::new("rounds", 3_i64)],
            ));
        assert!(logs_contain("Simulator event occurred"));
        assert!(logs_contain("arrivals_exhausted"));
    }
}
