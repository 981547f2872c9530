use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use procsim_config::SimConfig;
use procsim_core::Operation;
use procsim_engine::{ArrivalFeed, FileArrivalSource, SimulationReport, SimulationRuntime};
use procsim_metadata::load_program;
use procsim_scheduler::{schedule, SchedulingPolicy};

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "procsim", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate the meta-data program named in a configuration file
    Run(RunArgs),
    /// Validate configuration and meta-data, then print the schedule
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Configuration file (.conf, or .yaml/.yml)
    pub config: PathBuf,
    /// Arrival feed rounds; 0 disables the feed
    #[arg(long, default_value_t = ArrivalFeed::DEFAULT_ROUNDS)]
    pub arrivals: u32,
    /// Disable the arrival feed
    #[arg(long)]
    pub no_arrivals: bool,
    /// Milliseconds between arrival rounds
    #[arg(long, default_value_t = 100)]
    pub arrival_interval_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Configuration file (.conf, or .yaml/.yml)
    pub config: PathBuf,
}

fn ensure_extension(path: &Path, allowed: &[&str], expected: &'static str) -> Result<(), CliError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if allowed.contains(&ext) => Ok(()),
        _ => Err(CliError::Extension {
            path: path.to_path_buf(),
            expected,
        }),
    }
}

/// Loads the configuration and its meta-data program.
fn load_inputs(config_path: &Path) -> anyhow::Result<(SimConfig, PathBuf, Vec<Operation>)> {
    ensure_extension(config_path, &["conf", "yaml", "yml"], "conf")?;
    let config = SimConfig::load_from_path(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let metadata_path = config.metadata_path_from(config_path);
    ensure_extension(&metadata_path, &["mdf"], "mdf")?;
    let operations = load_program(&metadata_path)
        .with_context(|| format!("loading {}", metadata_path.display()))?;
    debug!(operations = operations.len(), "Inputs loaded");
    Ok((config, metadata_path, operations))
}

fn open_sinks(config: &SimConfig, config_path: &Path) -> io::Result<Vec<Box<dyn Write + Send>>> {
    let mut sinks: Vec<Box<dyn Write + Send>> = Vec::new();
    if config.log.to_monitor() {
        sinks.push(Box::new(io::stdout()));
    }
    if config.log.to_file() {
        let path = config.log_path_from(config_path);
        sinks.push(Box::new(BufWriter::new(File::create(path)?)));
    }
    Ok(sinks)
}

pub async fn run_simulation(args: RunArgs) -> anyhow::Result<SimulationReport> {
    let (config, metadata_path, operations) = load_inputs(&args.config)?;
    let sinks = open_sinks(&config, &args.config).context("opening log file")?;
    let runtime = SimulationRuntime::from_config(&config)?;

    let feed = (!args.no_arrivals && args.arrivals > 0).then(|| {
        ArrivalFeed::new(FileArrivalSource::new(metadata_path))
            .with_rounds(args.arrivals)
            .with_interval(Duration::from_millis(args.arrival_interval_ms))
    });

    let report = runtime.run(operations, sinks, feed).await?;
    info!(
        operations = report.operations,
        processes = report.processes,
        arrived = report.arrived_processes,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Simulation complete"
    );
    debug!(metrics = %runtime.metrics.gather_metrics()?, "Run metrics");
    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub policy: SchedulingPolicy,
    pub operations: usize,
    pub order: Vec<usize>,
    pub io_counts: Vec<usize>,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scheduling policy: {}", self.policy)?;
        writeln!(f, "Operations: {}", self.operations)?;
        writeln!(f, "Processes: {}", self.order.len())?;
        for (position, (ordinal, io)) in self.order.iter().zip(&self.io_counts).enumerate() {
            writeln!(f, "  {}. process {ordinal} ({io} I/O)", position + 1)?;
        }
        Ok(())
    }
}

pub fn check_inputs(args: &CheckArgs) -> anyhow::Result<CheckReport> {
    let (config, _, operations) = load_inputs(&args.config)?;
    let scheduled = schedule(operations, config.scheduling);
    Ok(CheckReport {
        policy: config.scheduling,
        operations: scheduled.operations.len(),
        order: scheduled.identity.as_slice().to_vec(),
        io_counts: scheduled.io_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = "Start Program Meta-Data Code:
S{begin}0; A{begin}0; P{run}5; A{finish}0;
A{begin}0; O{monitor}1; I{hard drive}1; A{finish}0; S{finish}0.
End Program Meta-Data Code.
";

    fn write_inputs(dir: &Path, policy: &str, log: &str) -> PathBuf {
        std::fs::write(dir.join("program.mdf"), PROGRAM).unwrap();
        let conf = format!(
            "Start Simulator Configuration File
Version/Phase: 5.0
File Path: program.mdf
Monitor display time {{msec}}: 20
Processor cycle time {{msec}}: 10
Scanner cycle time {{msec}}: 10
Hard drive cycle time {{msec}}: 15
Keyboard cycle time {{msec}}: 50
Memory cycle time {{msec}}: 30
Projector cycle time {{msec}}: 25
System memory {{kbytes}}: 1024
Memory block size {{kbytes}}: 128
Projector quantity: 1
Hard drive quantity: 1
Processor Quantum Number: 10
CPU Scheduling Code: {policy}
Log: {log}
Log File Path: run.lgf
End Simulator Configuration File
"
        );
        let path = dir.join("sim.conf");
        std::fs::write(&path, conf).unwrap();
        path
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from(["procsim", "run", "sim.conf", "--arrivals", "3"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.arrivals, 3);
                assert!(!args.no_arrivals);
                assert_eq!(args.arrival_interval_ms, 100);
            }
            Commands::Check(_) => panic!("expected run"),
        }
        let cli = Cli::try_parse_from(["procsim", "run", "sim.conf", "--no-arrivals"]).unwrap();
        assert!(matches!(cli.command, Commands::Run(RunArgs { no_arrivals: true, arrivals: 10, .. })));
    }

    #[test]
    fn rejects_wrong_extensions() {
        assert!(ensure_extension(Path::new("a.conf"), &["conf"], "conf").is_ok());
        let err = ensure_extension(Path::new("a.txt"), &["conf"], "conf").unwrap_err();
        assert_eq!(err.to_string(), "a.txt: expected a .conf file");
        assert!(ensure_extension(Path::new("noext"), &["mdf"], "mdf").is_err());
    }

    #[test]
    fn check_prints_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_inputs(dir.path(), "PS", "Log to File");
        let report = check_inputs(&CheckArgs { config }).unwrap();
        assert_eq!(report.policy, SchedulingPolicy::Ps);
        assert_eq!(report.order, vec![2, 1]);
        assert_eq!(report.io_counts, vec![2, 0]);
        let text = report.to_string();
        assert!(text.contains("1. process 2 (2 I/O)"));
    }

    #[tokio::test(start_paused = true)]
    async fn run_writes_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_inputs(dir.path(), "FIFO", "Log to File");
        let report = run_simulation(RunArgs {
            config,
            arrivals: 0,
            no_arrivals: false,
            arrival_interval_ms: 100,
        })
        .await
        .unwrap();

        assert_eq!(report.processes, 2);
        let log = std::fs::read_to_string(dir.path().join("run.lgf")).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.first(), Some(&"0.000000 - Simulator program starting"));
        assert!(lines.contains(&"0.050000 - Process 1: end processing action"));
        assert!(lines.contains(&"0.050000 - Process 2: start monitor output"));
        assert!(lines.contains(&"0.085000 - Process 2: end hard drive input"));
        assert_eq!(lines.last(), Some(&"0.085000 - Simulator program ending"));
    }

    #[tokio::test(start_paused = true)]
    async fn run_feeds_arrivals_from_the_program() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_inputs(dir.path(), "FIFO", "Log to File");
        let report = run_simulation(RunArgs {
            config,
            arrivals: 5,
            no_arrivals: false,
            arrival_interval_ms: 100,
        })
        .await
        .unwrap();

        // The program holds two processes, so the third round finds nothing.
        assert_eq!(report.arrived_processes, 2);
        assert_eq!(report.processes, 4);
        let log = std::fs::read_to_string(dir.path().join("run.lgf")).unwrap();
        assert!(log.contains("OS: starting process 4"));
        assert!(log.ends_with("0.300000 - Simulator program ending\n"));
    }

    #[test]
    fn missing_metadata_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_inputs(dir.path(), "FIFO", "Log to File");
        std::fs::remove_file(dir.path().join("program.mdf")).unwrap();
        let err = check_inputs(&CheckArgs { config }).unwrap_err();
        assert!(format!("{err:#}").contains("Meta-data file not found"));
    }
}
