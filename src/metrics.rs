//! # Process Metrics
//!
//! Hardware and process snapshot shown under each chat answer.
//!
//! | Category | Metric | Source |
//! |----------|--------|--------|
//! | RAM | Process RSS (MB) / total (MB) | `sysinfo` |
//! | CPU | Active cores / total / peak per core | `sysinfo` |
//! | Charts | Files and bytes in the chart directory | `std::fs` |
//!
//! ## Persistent `System`
//!
//! `sysinfo` computes CPU usage as a delta against the previous refresh, so a
//! single [`System`] lives in a [`OnceLock`] + [`Mutex`] for the whole
//! process and every collection reuses it.

use std::path::Path;
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};

static SYS: OnceLock<Mutex<System>> = OnceLock::new();

fn system() -> &'static Mutex<System> {
    SYS.get_or_init(|| {
        let mut s = System::new();
        s.refresh_cpu_usage(); // baseline
        Mutex::new(s)
    })
}

/// Snapshot of process and chart-directory metrics.
#[derive(Clone, Debug, Serialize)]
pub struct ProcessMetrics {
    /// Process RSS in MB.
    pub memory_used_mb: f64,
    pub memory_total_mb: f64,
    /// Cores above 1% usage.
    pub cpu_active_cores: usize,
    pub cpu_max_core_percent: f32,
    pub cpu_total_cores: usize,
    /// PNG files currently in the chart directory.
    pub chart_files: usize,
    pub chart_dir_bytes: u64,
}

/// Collects a snapshot. The lock on the shared [`System`] is released before
/// the chart directory is scanned.
pub fn collect_metrics(chart_dir: &Path) -> ProcessMetrics {
    let pid = Pid::from_u32(std::process::id());

    let mut sys = system().lock();
    sys.refresh_memory();
    sys.refresh_cpu_usage();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), false);

    let memory_used_mb = sys
        .process(pid)
        .map(|p| p.memory() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0);
    let memory_total_mb = sys.total_memory() as f64 / (1024.0 * 1024.0);

    let cpus = sys.cpus();
    let cpu_total_cores = cpus.len();
    let cpu_active_cores = cpus.iter().filter(|c| c.cpu_usage() > 1.0).count();
    let cpu_max_core_percent = cpus
        .iter()
        .map(|c| c.cpu_usage())
        .fold(0.0f32, f32::max);

    drop(sys);

    let (chart_files, chart_dir_bytes) = chart_dir_usage(chart_dir);

    ProcessMetrics {
        memory_used_mb,
        memory_total_mb,
        cpu_active_cores,
        cpu_max_core_percent,
        cpu_total_cores,
        chart_files,
        chart_dir_bytes,
    }
}

/// PNG count and total size. A missing directory counts as empty.
fn chart_dir_usage(dir: &Path) -> (usize, u64) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return (0, 0);
    };
    entries
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "png"))
        .filter_map(|e| e.metadata().ok())
        .fold((0, 0), |(n, bytes), m| (n + 1, bytes + m.len()))
}

fn human_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

impl ProcessMetrics {
    /// One-line summary for the chat UI:
    /// `"12ms | RAM 48.2 MB | CPU 2/8 cores peak 35.0% | charts 14 files 410.5 KB"`
    pub fn summary_line(&self, elapsed_ms: u64) -> String {
        format!(
            "{}ms | RAM {:.1} MB | CPU {}/{} cores peak {:.1}% | charts {} files {}",
            elapsed_ms,
            self.memory_used_mb,
            self.cpu_active_cores,
            self.cpu_total_cores,
            self.cpu_max_core_percent,
            self.chart_files,
            human_bytes(self.chart_dir_bytes),
        )
    }
}
