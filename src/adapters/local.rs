use crate::adapters::executor::PartitionExecutor;
use crate::core::master::MasterUrl;
use crate::domain::model::{ExecutionLocation, JobOutput, MapJob, SessionConfig, SessionInfo};
use crate::domain::ports::{ComputeEngine, ComputeSession};
use crate::utils::error::{Result, SmokeError};
use async_trait::async_trait;

/// In-process engine for `local`, `local[N]` and `local[*]` masters.
#[derive(Debug, Default, Clone)]
pub struct LocalEngine;

impl LocalEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ComputeEngine for LocalEngine {
    fn name(&self) -> &str {
        "local"
    }

    async fn get_or_create(&self, config: &SessionConfig) -> Result<Box<dyn ComputeSession>> {
        let threads = match &config.master {
            MasterUrl::Local { threads } => threads.resolve(),
            other => {
                return Err(SmokeError::InvalidMasterUrl {
                    url: other.to_string(),
                    reason: "local engine only accepts local masters".to_string(),
                })
            }
        };

        tracing::debug!(
            "Local session '{}' with {} threads (bind {})",
            config.app_name,
            threads,
            config.driver_bind_address
        );

        Ok(Box::new(LocalSession {
            app_name: config.app_name.clone(),
            master: config.master.to_string(),
            executor: PartitionExecutor::new(threads, config.console_progress),
            stopped: false,
        }))
    }
}

pub struct LocalSession {
    app_name: String,
    master: String,
    executor: PartitionExecutor,
    stopped: bool,
}

#[async_trait]
impl ComputeSession for LocalSession {
    fn info(&self) -> SessionInfo {
        SessionInfo {
            engine: "local".to_string(),
            app_name: self.app_name.clone(),
            master: self.master.clone(),
            execution: ExecutionLocation::LocalThreads(self.executor.threads()),
            cluster: None,
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
            tracing::debug!("Stopping local session '{}'", self.app_name);
            self.stopped = true;
        }
        Ok(())
    }
}
