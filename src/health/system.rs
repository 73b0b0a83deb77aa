//! OS resource sampling
//!
//! Probes read memory, CPU, disk and load through [`SystemSampler`] so the
//! threshold logic can be exercised with fixed readings.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::time::Duration;
use sysinfo::{Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("System sampling failed: {0}")]
pub struct SamplerError(pub String);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryUsage {
    pub used_bytes: u64,
    pub total_bytes: u64,
}

impl MemoryUsage {
    pub fn percent(&self) -> f64 {
        percent_of(self.used_bytes, self.total_bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    pub used_bytes: u64,
    pub total_bytes: u64,
}

impl DiskUsage {
    pub fn percent(&self) -> f64 {
        percent_of(self.used_bytes, self.total_bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

fn percent_of(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.0
}

#[async_trait]
pub trait SystemSampler: Send + Sync + std::fmt::Debug {
    async fn memory(&self) -> Result<MemoryUsage, SamplerError>;

    /// Global CPU utilisation over a short sampling window
    async fn cpu_percent(&self) -> Result<f64, SamplerError>;

    /// Usage of the filesystem containing `path`
    async fn disk(&self, path: &Path) -> Result<DiskUsage, SamplerError>;

    fn load_average(&self) -> LoadAverage;
}

/// [`SystemSampler`] backed by `sysinfo`
#[derive(Debug)]
pub struct SysinfoSampler {
    system: Mutex<System>,
    cpu_interval: Duration,
}

impl SysinfoSampler {
    pub fn new(cpu_interval: Duration) -> Self {
        Self {
            system: Mutex::new(System::new()),
            cpu_interval: cpu_interval.max(MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }
}

#[async_trait]
impl SystemSampler for SysinfoSampler {
    async fn memory(&self) -> Result<MemoryUsage, SamplerError> {
        let mut system = self.system.lock();
        system.refresh_memory();
        let total = system.total_memory();
        if total == 0 {
            return Err(SamplerError("memory statistics unavailable".to_string()));
        }
        Ok(MemoryUsage {
            used_bytes: total.saturating_sub(system.available_memory()),
            total_bytes: total,
        })
    }

    async fn cpu_percent(&self) -> Result<f64, SamplerError> {
        // Usage is a delta between two refreshes
        self.system.lock().refresh_cpu_usage();
        tokio::time::sleep(self.cpu_interval).await;
        let mut system = self.system.lock();
        system.refresh_cpu_usage();
        Ok(f64::from(system.global_cpu_usage()))
    }

    async fn disk(&self, path: &Path) -> Result<DiskUsage, SamplerError> {
        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .list()
            .iter()
            .filter(|d| path.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len())
            .ok_or_else(|| SamplerError(format!("no filesystem mounted at {}", path.display())))?;

        let total = disk.total_space();
        Ok(DiskUsage {
            used_bytes: total.saturating_sub(disk.available_space()),
            total_bytes: total,
        })
    }

    fn load_average(&self) -> LoadAverage {
        let load = System::load_average();
        LoadAverage {
            one: load.one,
            five: load.five,
            fifteen: load.fifteen,
        }
    }
}
