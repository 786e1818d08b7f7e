//! Optional process resource logging around the phases of a smoke run.

#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct ResourceSnapshot {
    pub cpu_percent: f32,
    pub rss_mb: u64,
    pub peak_rss_mb: u64,
    pub since_start: Duration,
    pub since_last_phase: Duration,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    peak_rss_mb: u64,
    last_phase: Instant,
}

#[cfg(feature = "cli")]
pub struct SystemMonitor {
    pid: Option<Pid>,
    started: Instant,
    state: Mutex<MonitorState>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            sysinfo::get_current_pid()
                .map_err(|e| tracing::warn!("Cannot determine current PID, monitoring disabled: {}", e))
                .ok()
        } else {
            None
        };

        let now = Instant::now();
        Self {
            pid,
            started: now,
            state: Mutex::new(MonitorState {
                system: System::new_with_specifics(RefreshKind::nothing()),
                peak_rss_mb: 0,
                last_phase: now,
            }),
        }
    }

    /// Samples this process; `None` when monitoring is off.
    pub fn snapshot(&self) -> Option<ResourceSnapshot> {
        let pid = self.pid?;
        let mut state = self.state.lock().ok()?;

        state.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
        let process = state.system.process(pid)?;
        let cpu_percent = process.cpu_usage();
        let rss_mb = process.memory() / 1024 / 1024;

        state.peak_rss_mb = state.peak_rss_mb.max(rss_mb);
        let now = Instant::now();
        let since_last_phase = now - state.last_phase;
        state.last_phase = now;

        Some(ResourceSnapshot {
            cpu_percent,
            rss_mb,
            peak_rss_mb: state.peak_rss_mb,
            since_start: now - self.started,
            since_last_phase,
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(s) = self.snapshot() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, RSS: {}MB (peak {}MB), phase took {:?}",
                phase,
                s.cpu_percent,
                s.rss_mb,
                s.peak_rss_mb,
                s.since_last_phase
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(s) = self.snapshot() {
            tracing::info!(
                "📊 Run finished in {:?}, peak RSS {}MB",
                s.since_start,
                s.peak_rss_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.pid.is_some()
    }
}

// 非 CLI 建置時的空實現
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
