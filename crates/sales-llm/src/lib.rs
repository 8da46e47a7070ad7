pub mod error;
pub mod fallback;
pub mod gateway;
pub mod trait_def;
pub mod types;

pub use error::{LlmError, Result};
pub use fallback::CannedFallbackProvider;
pub use gateway::HttpLlmGateway;
pub use trait_def::LlmGateway;
pub use types::{FallbackBucket, LlmOutput, LlmParams};
