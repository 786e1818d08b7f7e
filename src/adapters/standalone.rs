//! Standalone cluster adapter.
//!
//! Session creation checks that the master endpoint accepts TCP connections
//! and reads the master's JSON status page to report the workers it has
//! registered. Map closures cannot be shipped to JVM executors from here, so
//! jobs run on a driver-side [`PartitionExecutor`] and the session reports
//! [`ExecutionLocation::Driver`].

use crate::adapters::executor::PartitionExecutor;
use crate::adapters::runtime::RuntimeHome;
use crate::core::master::{url_host, LocalThreads, MasterUrl};
use crate::domain::model::{
    ClusterStatus, ExecutionLocation, JobOutput, MapJob, SessionConfig, SessionInfo,
};
use crate::domain::ports::{ComputeEngine, ComputeSession};
use crate::utils::error::{Result, SmokeError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::net::TcpStream;

/// Reads `/json/` from a standalone master's web UI.
#[derive(Debug, Clone)]
pub struct MasterStatusClient {
    client: Client,
}

impl MasterStatusClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn status_url(host: &str, ui_port: u16) -> String {
        format!("http://{}:{}/json/", url_host(host), ui_port)
    }

    pub async fn fetch(&self, url: &str) -> Result<ClusterStatus> {
        tracing::debug!("Fetching master status from {}", url);
        let status = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<ClusterStatus>()
            .await?;
        Ok(status)
    }
}

#[derive(Debug, Default, Clone)]
pub struct StandaloneEngine;

impl StandaloneEngine {
    pub fn new() -> Self {
        Self
    }

    async fn probe_master(host: &str, port: u16, timeout: Duration, master: &str) -> Result<()> {
        let unavailable = |reason: String| SmokeError::EngineUnavailable {
            master: master.to_string(),
            reason,
        };

        match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(unavailable(e.to_string())),
            Err(_) => Err(unavailable(format!("no answer within {:?}", timeout))),
        }
    }
}

#[async_trait]
impl ComputeEngine for StandaloneEngine {
    fn name(&self) -> &str {
        "standalone"
    }

    async fn get_or_create(&self, config: &SessionConfig) -> Result<Box<dyn ComputeSession>> {
        let (host, port) = match &config.master {
            MasterUrl::Standalone { host, port } => (host.as_str(), *port),
            other => {
                return Err(SmokeError::InvalidMasterUrl {
                    url: other.to_string(),
                    reason: "standalone engine needs a spark:// master".to_string(),
                })
            }
        };
        let master = config.master.to_string();

        if let Some(home) = &config.runtime_home {
            RuntimeHome::new(home.clone()).log_status();
        }

        Self::probe_master(host, port, config.connect_timeout, &master).await?;
        tracing::info!("🔗 Master {} accepted a connection", master);

        let cluster = match config.master_ui_port {
            Some(ui_port) => {
                let url = MasterStatusClient::status_url(host, ui_port);
                match MasterStatusClient::new(config.connect_timeout)?.fetch(&url).await {
                    Ok(status) => Some(status),
                    Err(e) => {
                        tracing::warn!("⚠️ Could not read master status from {}: {}", url, e);
                        None
                    }
                }
            }
            None => None,
        };

        if let Some(status) = &cluster {
            if !status.is_alive() {
                return Err(SmokeError::EngineUnavailable {
                    master,
                    reason: format!("master reports status {}", status.status),
                });
            }
            if status.alive_workers == 0 {
                tracing::warn!("⚠️ Master {} has no alive workers", master);
            }
            tracing::info!(
                "👷 {} alive workers, {} cores ({} in use)",
                status.alive_workers,
                status.cores,
                status.cores_used
            );
        }

        tracing::warn!(
            "Map closures run on the driver; the cluster at {} is checked for reachability only",
            master
        );

        Ok(Box::new(StandaloneSession {
            app_name: config.app_name.clone(),
            master,
            cluster,
            executor: PartitionExecutor::new(
                LocalThreads::All.resolve(),
                config.console_progress,
            ),
            stopped: false,
        }))
    }
}

pub struct StandaloneSession {
    app_name: String,
    master: String,
    cluster: Option<ClusterStatus>,
    executor: PartitionExecutor,
    stopped: bool,
}

#[async_trait]
impl ComputeSession for StandaloneSession {
    fn info(&self) -> SessionInfo {
        SessionInfo {
            engine: "standalone".to_string(),
            app_name: self.app_name.clone(),
            master: self.master.clone(),
            execution: ExecutionLocation::Driver,
            cluster: self.cluster.clone(),
        }
    }

    async fn map_collect(&self, job: &MapJob) -> Result<JobOutput> {
        if self.stopped {
            return Err(SmokeError::SessionStopped {
                app_name: self.app_name.clone(),
            });
        }
        self.executor.execute(job).await
    }

    async fn stop(&mut self) -> Result<()> {
        if !self.stopped {
            tracing::info!("🛑 Releasing session '{}' on {}", self.app_name, self.master);
            self.stopped = true;
        }
        Ok(())
    }
}
