// Adapters layer: concrete compute engines and the runtime locator.

pub mod executor;
pub mod local;
pub mod runtime;
pub mod standalone;

use crate::core::master::MasterUrl;
use crate::domain::ports::ComputeEngine;

pub use local::LocalEngine;
pub use standalone::StandaloneEngine;

/// Picks the engine that serves `master`.
pub fn engine_for(master: &MasterUrl) -> Box<dyn ComputeEngine> {
    match master {
        MasterUrl::Local { .. } => Box::new(LocalEngine::new()),
        MasterUrl::Standalone { .. } => Box::new(StandaloneEngine::new()),
    }
}
