//! # procsim Configuration System
//!
//! Loads the simulator configuration into one strongly typed [`SimConfig`]
//! that is resolved and validated once, before the simulation starts.
//!
//! ## Sources
//! - `.conf` files in the simulator's `Key: value` format ([`ConfFile`])
//! - `.yaml` / `.yml` files with the same field names
//! - `PROCSIM_*` environment variables, e.g. `PROCSIM_CYCLE_TIMES__PROCESSOR=5`
//!
//! Later sources override earlier ones.

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use procsim_core::devices::{CycleTimes, HardwareProfile};
use procsim_scheduler::SchedulingPolicy;

mod error;
mod provider;
mod validation;

pub use error::ConfigError;
pub use provider::{ConfFile, CONF_FOOTER, CONF_HEADER};

/// Where the simulation log goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    Monitor,
    File,
    Both,
}

impl LogTarget {
    pub fn to_monitor(self) -> bool {
        matches!(self, LogTarget::Monitor | LogTarget::Both)
    }

    pub fn to_file(self) -> bool {
        matches!(self, LogTarget::File | LogTarget::Both)
    }
}

/// Per-device cycle times in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CycleTimeConfig {
    #[validate(range(min = 1))]
    pub monitor: u64,
    #[validate(range(min = 1))]
    pub processor: u64,
    #[validate(range(min = 1))]
    pub scanner: u64,
    #[validate(range(min = 1))]
    pub hard_drive: u64,
    #[validate(range(min = 1))]
    pub keyboard: u64,
    #[validate(range(min = 1))]
    pub memory: u64,
    #[validate(range(min = 1))]
    pub projector: u64,
}

impl From<&CycleTimeConfig> for CycleTimes {
    fn from(config: &CycleTimeConfig) -> Self {
        CycleTimes {
            monitor: config.monitor,
            processor: config.processor,
            scanner: config.scanner,
            hard_drive: config.hard_drive,
            keyboard: config.keyboard,
            memory: config.memory,
            projector: config.projector,
        }
    }
}

/// Validated simulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SimConfig {
    /// `Version/Phase`; informational.
    #[validate(range(exclusive_min = 0.0))]
    pub version: f32,

    /// Meta-data file holding the operations to simulate.
    #[validate(custom(function = validation::validate_path))]
    pub metadata_path: PathBuf,

    #[validate(nested)]
    pub cycle_times: CycleTimeConfig,

    pub log: LogTarget,

    #[validate(custom(function = validation::validate_path))]
    pub log_path: PathBuf,

    /// System memory in kbytes.
    #[validate(range(min = 1))]
    pub system_memory_kb: u64,

    /// Memory block size in kbytes.
    #[validate(range(min = 1))]
    pub block_size_kb: u64,

    /// Checked separately so a zero surfaces as [`ConfigError::DeviceCountZero`].
    pub hdd_count: u32,
    pub projector_count: u32,

    /// Processor quantum number. Accepted, never enforced.
    #[validate(range(min = 1))]
    pub quantum: u32,

    pub scheduling: SchedulingPolicy,
}

impl SimConfig {
    /// Load configuration from a specific path.
    ///
    /// `.yaml`/`.yml` files are read as YAML, anything else as the `.conf`
    /// format. `PROCSIM_*` environment variables are merged on top.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        );
        let figment = if is_yaml {
            Figment::from(Yaml::file(path))
        } else {
            Figment::from(ConfFile::file(path)?)
        };
        Self::extract(figment.merge(Env::prefixed("PROCSIM_").split("__")))
    }

    /// Parses `.conf` text without consulting files or the environment.
    pub fn from_conf_str(text: &str) -> Result<Self, ConfigError> {
        Self::extract(Figment::from(ConfFile::parse(text)?))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.check()?;
                Ok(config)
            })
    }

    /// Field validation plus the device-count rule.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;
        self.hardware_profile().map(|_| ())
    }

    /// Hardware view of the configuration handed to the dispatcher.
    pub fn hardware_profile(&self) -> Result<HardwareProfile, ConfigError> {
        let hdd_count = NonZeroU32::new(self.hdd_count)
            .ok_or(ConfigError::DeviceCountZero { device: "hard drive" })?;
        let projector_count = NonZeroU32::new(self.projector_count)
            .ok_or(ConfigError::DeviceCountZero { device: "projector" })?;
        Ok(HardwareProfile {
            cycle_times: CycleTimes::from(&self.cycle_times),
            max_memory_kb: self.system_memory_kb,
            block_size_kb: self.block_size_kb,
            hdd_count,
            projector_count,
        })
    }

    /// Resolves the meta-data path against the directory of the config file
    /// when it is relative.
    pub fn metadata_path_from(&self, config_path: &Path) -> PathBuf {
        resolve_relative(&self.metadata_path, config_path)
    }

    pub fn log_path_from(&self, config_path: &Path) -> PathBuf {
        resolve_relative(&self.log_path, config_path)
    }
}

fn resolve_relative(path: &Path, config_path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Start Simulator Configuration File
Version/Phase: 5.0
File Path: Test_5a.mdf
Monitor display time {msec}: 20
Processor cycle time {msec}: 10
Scanner cycle time {msec}: 10
Hard drive cycle time {msec}: 15
Keyboard cycle time {msec}: 50
Memory cycle time {msec}: 30
Projector cycle time {msec}: 25
System memory {Mbytes}: 1
Memory block size {kbytes}: 128
Projector quantity: 4
Hard drive quantity: 2
Processor Quantum Number: 10
CPU Scheduling Code: PS
Log: Log to Both
Log File Path: logfile_1.lgf
End Simulator Configuration File
";

    #[test]
    fn parses_full_conf_file() {
        let config = SimConfig::from_conf_str(SAMPLE).unwrap();
        assert_eq!(config.version, 5.0);
        assert_eq!(config.metadata_path, PathBuf::from("Test_5a.mdf"));
        assert_eq!(config.cycle_times.monitor, 20);
        assert_eq!(config.system_memory_kb, 1024);
        assert_eq!(config.block_size_kb, 128);
        assert_eq!(config.scheduling, SchedulingPolicy::Ps);
        assert_eq!(config.log, LogTarget::Both);
        let profile = config.hardware_profile().unwrap();
        assert_eq!(profile.hdd_count.get(), 2);
        assert_eq!(profile.projector_count.get(), 4);
        assert_eq!(profile.cycle_times.processor, 10);
    }

    #[test]
    fn zero_device_count_is_rejected() {
        let text = SAMPLE.replace("Hard drive quantity: 2", "Hard drive quantity: 0");
        let err = SimConfig::from_conf_str(&text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DeviceCountZero {
                device: "hard drive"
            }
        ));
    }

    #[test]
    fn zero_cycle_time_fails_validation() {
        let text = SAMPLE.replace("Memory cycle time {msec}: 30", "Memory cycle time {msec}: 0");
        let err = SimConfig::from_conf_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("cycle_times.memory"));
    }

    #[test]
    fn unknown_scheduling_code_fails_to_parse() {
        let text = SAMPLE.replace("CPU Scheduling Code: PS", "CPU Scheduling Code: EDF");
        let err = SimConfig::from_conf_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Parsing(_)));
        assert!(err.to_string().contains("Unknown scheduling policy 'EDF'"), "{err}");
    }

    #[test]
    fn missing_key_is_reported() {
        let text = SAMPLE.replace("Processor Quantum Number: 10\n", "");
        let err = SimConfig::from_conf_str(&text).unwrap_err();
        assert!(err.to_string().contains("quantum"));
    }

    #[test]
    fn accepts_str_alias_for_srt() {
        let text = SAMPLE.replace("CPU Scheduling Code: PS", "CPU Scheduling Code: STR");
        let config = SimConfig::from_conf_str(&text).unwrap();
        assert_eq!(config.scheduling, SchedulingPolicy::Srt);
    }

    #[test]
    fn resolves_paths_next_to_config() {
        let config = SimConfig::from_conf_str(SAMPLE).unwrap();
        assert_eq!(
            config.metadata_path_from(Path::new("runs/sim.conf")),
            PathBuf::from("runs/Test_5a.mdf")
        );
        assert_eq!(
            config.log_path_from(Path::new("sim.conf")),
            PathBuf::from("logfile_1.lgf")
        );
    }

    #[test]
    fn environment_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("sim.conf", SAMPLE)?;
            jail.set_env("PROCSIM_CYCLE_TIMES__PROCESSOR", "5");
            let config = SimConfig::load_from_path("sim.conf").map_err(|e| e.to_string())?;
            assert_eq!(config.cycle_times.processor, 5);
            Ok(())
        });
    }

    #[test]
    fn loads_yaml_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.yaml");
        std::fs::write(
            &path,
            "version: 5.0
metadata_path: a.mdf
cycle_times: { monitor: 20, processor: 10, scanner: 10, hard_drive: 15, keyboard: 50, memory: 30, projector: 25 }
log: monitor
log_path: out.lgf
system_memory_kb: 2048
block_size_kb: 256
hdd_count: 1
projector_count: 1
quantum: 4
scheduling: SJF
",
        )
        .unwrap();
        let config = SimConfig::load_from_path(&path).unwrap();
        assert_eq!(config.scheduling, SchedulingPolicy::Sjf);
        assert_eq!(config.log, LogTarget::Monitor);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = SimConfig::load_from_path("does/not/exist.conf").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
