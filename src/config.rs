use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level monitor configuration, loaded once at startup and
/// read-only for the rest of the run.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorConfig {
    pub apps: AppGroupConfig,
    #[serde(default)]
    pub system: SystemGroupConfig,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Optional log file; when set, log lines are written there in
    /// addition to the console.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl MonitorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: MonitorConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse config")?;
        Ok(config)
    }
}

/// HTTP application group: a list of endpoints checked on one cadence.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppGroupConfig {
    #[serde(default = "default_app_interval")]
    pub check_interval_secs: u64,
    pub targets: Vec<AppTarget>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppTarget {
    pub name: String,
    pub url: String,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

/// System resource group: OS metrics checked against thresholds.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SystemGroupConfig {
    #[serde(default = "default_system_interval")]
    pub check_interval_secs: u64,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default = "default_disk_mount")]
    pub disk_mount: PathBuf,
}

impl Default for SystemGroupConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_system_interval(),
            thresholds: Thresholds::default(),
            disk_mount: default_disk_mount(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Thresholds {
    #[serde(default = "default_cpu_threshold")]
    pub cpu: f64,
    #[serde(default = "default_memory_threshold")]
    pub memory: f64,
    #[serde(default = "default_disk_threshold")]
    pub disk: f64,
    #[serde(default = "default_process_threshold")]
    pub processes: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu: default_cpu_threshold(),
            memory: default_memory_threshold(),
            disk: default_disk_threshold(),
            processes: default_process_threshold(),
        }
    }
}

fn default_api_port() -> u16 {
    3000
}
fn default_app_interval() -> u64 {
    30
}
fn default_system_interval() -> u64 {
    60
}
fn default_expected_status() -> u16 {
    200
}
fn default_http_timeout() -> u64 {
    10
}
fn default_disk_mount() -> PathBuf {
    PathBuf::from("/")
}
fn default_cpu_threshold() -> f64 {
    80.0
}
fn default_memory_threshold() -> f64 {
    80.0
}
fn default_disk_threshold() -> f64 {
    85.0
}
fn default_process_threshold() -> f64 {
    500.0
}
