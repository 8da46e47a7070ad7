pub mod catalogue;
pub mod composer;
pub mod postprocess;
pub mod score;
pub mod types;

pub use catalogue::TemplateCatalogue;
pub use composer::{ComposerInput, PromptComposer};
pub use postprocess::{enforce_forward_question, enforce_name_once, enforce_no_repetition};
pub use score::score_empathy;
pub use types::{PriceObjectionSubCategory, SystemPrompt, TimeOfDay};
