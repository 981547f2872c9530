//! # procsim Telemetry
//!
//! Diagnostics for the simulator: `tracing` output on stderr, structured
//! simulator events and Prometheus counters. The simulation log itself is
//! written by the engine and never goes through here.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
