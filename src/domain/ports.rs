use crate::domain::model::{JobOutput, MapJob, SessionConfig, SessionInfo};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Produces the address this process advertises to the cluster.
pub trait EndpointResolver: Send + Sync {
    fn resolve(&self) -> Result<Ipv4Addr>;
}

#[async_trait]
pub trait ComputeEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn get_or_create(&self, config: &SessionConfig) -> Result<Box<dyn ComputeSession>>;
}

#[async_trait]
pub trait ComputeSession: Send + Sync {
    fn info(&self) -> SessionInfo;

    /// Runs `job.op` over every element and collects results in dataset order.
    async fn map_collect(&self, job: &MapJob) -> Result<JobOutput>;

    /// Releases the session. Calling it twice is a no-op.
    async fn stop(&mut self) -> Result<()>;
}
