pub mod engine;
pub mod registry;
pub mod spawn;

pub use engine::{DiscoveryEngine, EngineOutcome, EngineSettings};
pub use registry::{JobRecord, JobRegistry};
pub use spawn::spawn_job;
