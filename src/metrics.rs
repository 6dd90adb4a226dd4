//! OS metrics collaborator.
//!
//! `MetricSource` is the seam between resource probes and the platform;
//! `SystemMetrics` is the sysinfo-backed implementation used in
//! production.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use sysinfo::{Disks, System};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CpuPercent,
    MemoryPercent,
    DiskPercent,
    ProcessCount,
}

/// One metric reading: the value compared against the threshold plus a
/// human-readable context string (e.g. free space) for reporting.
#[derive(Debug, Clone)]
pub struct MetricSample {
    pub value: f64,
    pub context: String,
}

impl MetricSample {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            context: String::new(),
        }
    }

    pub fn with_context(value: f64, context: String) -> Self {
        Self { value, context }
    }
}

/// Read-only access to OS metrics. Calls may block and are dispatched
/// on the blocking pool by the resource probe.
pub trait MetricSource: Send + Sync {
    fn sample(&self, metric: Metric) -> Result<MetricSample>;
}

/// sysinfo-backed metric source.
pub struct SystemMetrics {
    system: Mutex<System>,
    disk_mount: PathBuf,
}

const GIB: u64 = 1024 * 1024 * 1024;

impl SystemMetrics {
    pub fn new(disk_mount: PathBuf) -> Self {
        Self {
            system: Mutex::new(System::new()),
            disk_mount,
        }
    }

    fn cpu_percent(&self) -> Result<MetricSample> {
        let mut system = self.lock_system();
        // CPU usage is a delta between two refreshes; sample over a
        // short window rather than taking an instantaneous reading.
        system.refresh_cpu();
        std::thread::sleep(
            std::time::Duration::from_secs(1).max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
        );
        system.refresh_cpu();
        Ok(MetricSample::new(f64::from(
            system.global_cpu_info().cpu_usage(),
        )))
    }

    fn memory_percent(&self) -> Result<MetricSample> {
        let mut system = self.lock_system();
        system.refresh_memory();
        let total = system.total_memory();
        if total == 0 {
            bail!("platform reported zero total memory");
        }
        let used = system.used_memory();
        let percent = used as f64 / total as f64 * 100.0;
        let context = format!("{}GB free", system.available_memory() / GIB);
        Ok(MetricSample::with_context(percent, context))
    }

    fn disk_percent(&self) -> Result<MetricSample> {
        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .iter()
            .find(|d| d.mount_point() == self.disk_mount)
            .ok_or_else(|| {
                anyhow::anyhow!("no disk mounted at {}", self.disk_mount.display())
            })?;
        let total = disk.total_space();
        if total == 0 {
            bail!("disk at {} reports zero capacity", self.disk_mount.display());
        }
        let free = disk.available_space();
        let percent = (total - free) as f64 / total as f64 * 100.0;
        let context = format!("{}GB free", free / GIB);
        Ok(MetricSample::with_context(percent, context))
    }

    fn process_count(&self) -> Result<MetricSample> {
        let mut system = self.lock_system();
        system.refresh_processes();
        Ok(MetricSample::new(system.processes().len() as f64))
    }

    fn lock_system(&self) -> std::sync::MutexGuard<'_, System> {
        match self.system.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl MetricSource for SystemMetrics {
    fn sample(&self, metric: Metric) -> Result<MetricSample> {
        match metric {
            Metric::CpuPercent => self.cpu_percent(),
            Metric::MemoryPercent => self.memory_percent(),
            Metric::DiskPercent => self.disk_percent(),
            Metric::ProcessCount => self.process_count(),
        }
    }
}
