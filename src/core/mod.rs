pub mod endpoint;
pub mod job;
pub mod master;
pub mod partition;
pub mod report;

pub use crate::domain::model::{JobOutput, MapJob, SessionConfig, SessionInfo};
pub use crate::domain::ports::{ComputeEngine, ComputeSession, EndpointResolver};
pub use crate::utils::error::Result;
