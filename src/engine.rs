//! Monitor engine — builds probe groups from configuration and owns
//! the lifecycle of their schedulers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::metrics::{Metric, MetricSource, SystemMetrics};
use crate::models::MonitorState;
use crate::probe::{HttpProbe, Probe, ResourceProbe};
use crate::reporter::{EngineReporter, Reporter};
use crate::scheduler::Scheduler;

pub const APPS_GROUP: &str = "apps";
pub const SYSTEM_GROUP: &str = "system";

/// A monitor group's static definition: its probes and cadence.
pub struct GroupSpec {
    pub name: String,
    pub probes: Vec<Probe>,
    pub interval: Duration,
}

/// A running scheduler for one group.
struct GroupSlot {
    handle: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

pub struct Engine {
    specs: HashMap<String, GroupSpec>,
    running: HashMap<String, GroupSlot>,
    reporter: Arc<dyn Reporter>,
    state: Arc<Mutex<MonitorState>>,
}

impl Engine {
    pub fn new(config: &MonitorConfig) -> Self {
        let metrics: Arc<dyn MetricSource> =
            Arc::new(SystemMetrics::new(config.system.disk_mount.clone()));
        let client = reqwest::Client::new();

        let app_probes = config
            .apps
            .targets
            .iter()
            .map(|t| {
                Probe::Http(HttpProbe::new(
                    t.name.clone(),
                    t.url.clone(),
                    t.expected_status,
                    Duration::from_secs(t.timeout_secs),
                    client.clone(),
                ))
            })
            .collect();

        let thresholds = &config.system.thresholds;
        let system_probes = vec![
            Probe::Resource(ResourceProbe::new(
                "CPU",
                Metric::CpuPercent,
                thresholds.cpu,
                Arc::clone(&metrics),
            )),
            Probe::Resource(ResourceProbe::new(
                "Memory",
                Metric::MemoryPercent,
                thresholds.memory,
                Arc::clone(&metrics),
            )),
            Probe::Resource(ResourceProbe::new(
                "Disk",
                Metric::DiskPercent,
                thresholds.disk,
                Arc::clone(&metrics),
            )),
            Probe::Resource(ResourceProbe::new(
                "Processes",
                Metric::ProcessCount,
                thresholds.processes,
                metrics,
            )),
        ];

        let groups = vec![
            GroupSpec {
                name: APPS_GROUP.to_string(),
                probes: app_probes,
                interval: Duration::from_secs(config.apps.check_interval_secs),
            },
            GroupSpec {
                name: SYSTEM_GROUP.to_string(),
                probes: system_probes,
                interval: Duration::from_secs(config.system.check_interval_secs),
            },
        ];

        Self::from_groups(groups)
    }

    pub fn from_groups(groups: Vec<GroupSpec>) -> Self {
        let state = Arc::new(Mutex::new(MonitorState::default()));
        let reporter: Arc<dyn Reporter> = Arc::new(EngineReporter::new(Arc::clone(&state)));
        Self {
            specs: groups.into_iter().map(|g| (g.name.clone(), g)).collect(),
            running: HashMap::new(),
            reporter,
            state,
        }
    }

    /// Shared state handle for the status API.
    pub fn state(&self) -> Arc<Mutex<MonitorState>> {
        Arc::clone(&self.state)
    }

    pub fn is_running(&self, group: &str) -> bool {
        self.running.contains_key(group)
    }

    /// Spawn the scheduler for one group. Starting an already-running
    /// group is a no-op.
    pub fn start(&mut self, group: &str) -> Result<()> {
        let spec = self
            .specs
            .get(group)
            .ok_or_else(|| anyhow!("unknown monitor group: {group}"))?;
        if self.running.contains_key(group) {
            warn!(group, "monitor group already running");
            return Ok(());
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut scheduler = Scheduler::new(spec.name.clone(), spec.probes.clone(), spec.interval);
        let reporter = Arc::clone(&self.reporter);
        let handle = tokio::spawn(async move {
            scheduler.run(reporter, shutdown_rx).await;
        });

        self.running.insert(
            group.to_string(),
            GroupSlot {
                handle,
                shutdown_tx,
            },
        );
        info!(group, "monitor group started");
        Ok(())
    }

    pub fn start_all(&mut self) -> Result<()> {
        let groups: Vec<String> = self.specs.keys().cloned().collect();
        for group in groups {
            self.start(&group)?;
        }
        Ok(())
    }

    /// Signal the group's scheduler and wait for it to finish. An
    /// in-flight tick completes; no new tick starts.
    pub async fn stop(&mut self, group: &str) {
        if let Some(slot) = self.running.remove(group) {
            let _ = slot.shutdown_tx.send(true);
            if let Err(e) = slot.handle.await {
                warn!(group, error = %e, "scheduler task ended abnormally");
            }
            info!(group, "monitor group stopped");
        }
    }

    pub async fn stop_all(&mut self) {
        let groups: Vec<String> = self.running.keys().cloned().collect();
        for group in groups {
            self.stop(&group).await;
        }
    }
}
