use crate::core::master::MasterUrl;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Connection descriptor handed to a [`ComputeEngine`](crate::domain::ports::ComputeEngine).
///
/// Every value the engine needs is carried here explicitly, including the
/// runtime home, so nothing has to be smuggled through the process environment.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub master: MasterUrl,
    pub app_name: String,
    pub console_progress: bool,
    /// Address advertised to workers for callbacks.
    pub driver_host: Ipv4Addr,
    /// Local interface the driver binds to.
    pub driver_bind_address: IpAddr,
    pub runtime_home: Option<PathBuf>,
    pub master_ui_port: Option<u16>,
    pub connect_timeout: Duration,
}

impl SessionConfig {
    /// The option set as `(key, value)` pairs, in the naming cluster tooling expects.
    pub fn options(&self) -> Vec<(&'static str, String)> {
        let mut options = vec![
            ("spark.master", self.master.to_string()),
            ("spark.app.name", self.app_name.clone()),
            ("spark.ui.showConsoleProgress", self.console_progress.to_string()),
            ("spark.driver.host", self.driver_host.to_string()),
            ("spark.driver.bindAddress", self.driver_bind_address.to_string()),
        ];
        if let Some(home) = &self.runtime_home {
            options.push(("spark.executorEnv.JAVA_HOME", home.display().to_string()));
        }
        options
    }
}

/// Where the map closures of a session actually run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "threads")]
pub enum ExecutionLocation {
    LocalThreads(usize),
    Driver,
}

impl fmt::Display for ExecutionLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionLocation::LocalThreads(n) => write!(f, "local ({} threads)", n),
            ExecutionLocation::Driver => write!(f, "driver executor"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub engine: String,
    pub app_name: String,
    pub master: String,
    pub execution: ExecutionLocation,
    pub cluster: Option<ClusterStatus>,
}

pub type MapFn = Arc<dyn Fn(i64) -> i64 + Send + Sync>;

/// A single parallel map over an integer range, collected back to the driver.
#[derive(Clone)]
pub struct MapJob {
    pub data: Range<i64>,
    pub num_slices: usize,
    pub op: MapFn,
}

impl MapJob {
    pub fn new(data: Range<i64>, num_slices: usize, op: MapFn) -> Self {
        Self {
            data,
            num_slices,
            op,
        }
    }

    /// `0..size` squared, split into `num_slices` partitions.
    pub fn squares(size: i64, num_slices: usize) -> Self {
        Self::new(0..size, num_slices, Arc::new(|x| x * x))
    }

    pub fn len(&self) -> usize {
        (self.data.end - self.data.start).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for MapJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapJob")
            .field("data", &self.data)
            .field("num_slices", &self.num_slices)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionStat {
    pub index: usize,
    pub start: i64,
    pub end: i64,
    pub count: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct JobOutput {
    pub values: Vec<i64>,
    pub partitions: Vec<PartitionStat>,
}

/// Master status as published on the standalone master's `/json/` page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStatus {
    pub url: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "aliveworkers", default)]
    pub alive_workers: u32,
    #[serde(default)]
    pub cores: u32,
    #[serde(rename = "coresused", default)]
    pub cores_used: u32,
    #[serde(default)]
    pub workers: Vec<WorkerInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub id: String,
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub cores: u32,
    #[serde(default)]
    pub memory: u64,
    #[serde(default)]
    pub state: String,
}

impl ClusterStatus {
    pub fn is_alive(&self) -> bool {
        self.status.eq_ignore_ascii_case("ALIVE")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squares_job() {
        let job = MapJob::squares(100_000, 10);
        assert_eq!(job.len(), 100_000);
        assert_eq!(job.num_slices, 10);
        assert_eq!((job.op)(9), 81);
    }

    #[test]
    fn test_cluster_status_from_master_json() {
        let json = r#"{
            "url": "spark://10.0.0.5:7077",
            "workers": [
                {"id": "worker-1", "host": "10.0.0.6", "port": 35000, "cores": 4,
                 "coresused": 0, "memory": 6144, "state": "ALIVE"}
            ],
            "aliveworkers": 1,
            "cores": 4,
            "coresused": 0,
            "memory": 6144,
            "activeapps": [],
            "status": "ALIVE"
        }"#;

        let status: ClusterStatus = serde_json::from_str(json).unwrap();
        assert!(status.is_alive());
        assert_eq!(status.alive_workers, 1);
        assert_eq!(status.workers[0].host, "10.0.0.6");
    }
}
