//! ## procsim-telemetry::metrics
//! **Prometheus counters and histograms for a simulation run**

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    /// Executed operations, labelled by operation code.
    pub operations: IntCounterVec,
    pub arrived_processes: IntCounter,
    /// Simulated device time per timed operation, in milliseconds.
    pub device_time: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let operations = IntCounterVec::new(
            Opts::new("procsim_operations_total", "Total executed operations"),
            &["kind"],
        )?;
        let arrived_processes = IntCounter::new(
            "procsim_arrivals_total",
            "Processes appended by the arrival feed",
        )?;
        let device_time = Histogram::with_opts(
            HistogramOpts::new("procsim_device_time_ms", "Simulated device time per operation")
                .buckets(vec![1.0, 10.0, 50.0, 100.0, 500.0, 1_000.0, 5_000.0]),
        )?;

        registry.register(Box::new(operations.clone()))?;
        registry.register(Box::new(arrived_processes.clone()))?;
        registry.register(Box::new(device_time.clone()))?;

        Ok(Self {
            registry,
            operations,
            arrived_processes,
            device_time,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn inc_operation(&self, code: char) {
        let kind = code.to_string();
        self.operations.with_label_values(&[kind.as_str()]).inc();
    }

    pub fn inc_arrivals(&self, processes: u64) {
        self.arrived_processes.inc_by(processes);
    }

    pub fn observe_device_time(&self, millis: f64) {
        self.device_time.observe(millis);
    }

    pub fn operation_count(&self, code: char) -> u64 {
        let kind = code.to_string();
        self.operations.with_label_values(&[kind.as_str()]).get()
    }
}
