//! Figment provider for the simulator's `Key: value` configuration format.
//!
//! ```text
//! Start Simulator Configuration File
//! Version/Phase: 5.0
//! File Path: Test_5a.mdf
//! Processor cycle time {msec}: 10
//! System memory {Mbytes}: 1
//! CPU Scheduling Code: PS
//! ...
//! End Simulator Configuration File
//! ```
//!
//! Sizes are normalised to kbytes and values are handed to figment under the
//! field names of [`SimConfig`](crate::SimConfig), so the same extraction and
//! validation path serves `.conf`, YAML and environment overrides.

use std::path::{Path, PathBuf};

use figment::providers::Serialized;
use figment::value::{Dict, Map};
use figment::{Error, Metadata, Profile, Provider, Source};
use serde::Serialize;

use crate::ConfigError;

pub const CONF_HEADER: &str = "Start Simulator Configuration File";
pub const CONF_FOOTER: &str = "End Simulator Configuration File";

#[derive(Debug, Clone, Default, Serialize)]
struct RawCycleTimes {
    #[serde(skip_serializing_if = "Option::is_none")]
    monitor: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    processor: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scanner: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hard_drive: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyboard: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    projector: Option<u64>,
}

/// Values found in the file. Absent keys stay absent so figment reports
/// them as missing fields instead of silently defaulting.
#[derive(Debug, Clone, Default, Serialize)]
struct RawConf {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata_path: Option<String>,
    cycle_times: RawCycleTimes,
    #[serde(skip_serializing_if = "Option::is_none")]
    log: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_memory_kb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_size_kb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hdd_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    projector_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantum: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduling: Option<String>,
}

/// A parsed `.conf` file usable as a figment provider.
#[derive(Debug, Clone)]
pub struct ConfFile {
    raw: RawConf,
    path: Option<PathBuf>,
}

impl ConfFile {
    /// Reads and parses a `.conf` file.
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let mut conf = Self::parse(&text)?;
        conf.path = Some(path.to_path_buf());
        Ok(conf)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        match lines.next() {
            Some((_, CONF_HEADER)) => {}
            _ => return Err(ConfigError::MissingHeader(CONF_HEADER)),
        }

        let mut raw = RawConf::default();
        for (number, line) in lines {
            if line == CONF_FOOTER {
                break;
            }
            apply_line(&mut raw, number, line)?;
        }
        Ok(Self { raw, path: None })
    }
}

impl Provider for ConfFile {
    fn metadata(&self) -> Metadata {
        match &self.path {
            Some(path) => Metadata::from("procsim conf file", Source::File(path.clone())),
            None => Metadata::named("procsim conf text"),
        }
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        Serialized::defaults(self.raw.clone()).data()
    }
}

fn apply_line(raw: &mut RawConf, number: usize, line: &str) -> Result<(), ConfigError> {
    let malformed = |reason: String| ConfigError::MalformedLine {
        line: number,
        reason,
    };

    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| malformed("expected 'Key: value'".into()))?;
    let value = value.trim();
    let (name, unit) = split_unit(key);
    let name = name.to_ascii_lowercase();

    let number_value = || {
        value
            .parse::<u64>()
            .map_err(|_| malformed(format!("'{value}' is not a non-negative integer")))
    };
    let kbytes = || -> Result<u64, ConfigError> {
        let factor = match unit.map(str::to_ascii_lowercase).as_deref() {
            Some("kbytes") => 1,
            Some("mbytes") => 1024,
            Some("gbytes") => 1024 * 1024,
            other => return Err(malformed(format!("unknown size unit {other:?}"))),
        };
        number_value()?
            .checked_mul(factor)
            .ok_or_else(|| malformed(format!("'{value}' overflows")))
    };
    let count = || -> Result<u32, ConfigError> {
        u32::try_from(number_value()?).map_err(|_| malformed(format!("'{value}' is too large")))
    };

    let times = &mut raw.cycle_times;
    match name.as_str() {
        "version/phase" => {
            raw.version = Some(
                value
                    .parse()
                    .map_err(|_| malformed(format!("'{value}' is not a version number")))?,
            )
        }
        "file path" => raw.metadata_path = Some(value.to_string()),
        "log file path" => raw.log_path = Some(value.to_string()),
        "monitor display time" | "monitor cycle time" => times.monitor = Some(number_value()?),
        "processor cycle time" => times.processor = Some(number_value()?),
        "scanner cycle time" => times.scanner = Some(number_value()?),
        "hard drive cycle time" => times.hard_drive = Some(number_value()?),
        "keyboard cycle time" => times.keyboard = Some(number_value()?),
        "memory cycle time" => times.memory = Some(number_value()?),
        "projector cycle time" => times.projector = Some(number_value()?),
        "log" => {
            raw.log = Some(match value {
                "Log to Monitor" => "monitor",
                "Log to File" => "file",
                "Log to Both" => "both",
                other => return Err(malformed(format!("unknown log target '{other}'"))),
            })
        }
        "system memory" => raw.system_memory_kb = Some(kbytes()?),
        "memory block size" => raw.block_size_kb = Some(kbytes()?),
        "hard drive quantity" => raw.hdd_count = Some(count()?),
        "projector quantity" => raw.projector_count = Some(count()?),
        "processor quantum number" => raw.quantum = Some(count()?),
        "cpu scheduling code" => raw.scheduling = Some(value.to_string()),
        _ => return Err(malformed(format!("unknown key '{}'", key.trim()))),
    }
    Ok(())
}

/// `"System memory {Mbytes}"` -> `("System memory", Some("Mbytes"))`
fn split_unit(key: &str) -> (&str, Option<&str>) {
    match key.split_once('{') {
        Some((name, rest)) => (name.trim(), Some(rest.trim_end().trim_end_matches('}').trim())),
        None => (key.trim(), None),
    }
}
