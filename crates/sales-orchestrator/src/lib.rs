pub mod admission;
pub mod orchestrator;
pub mod phase;
pub mod types;

pub use admission::{AdmissionControl, AdmissionGuard};
pub use orchestrator::Orchestrator;
pub use phase::next_phase;
pub use types::{MlInsights, SendMessageResponse};
