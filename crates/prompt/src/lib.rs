//! Prompt system for docqa.
//!
//! Prompts are Handlebars templates with HTML escaping disabled. The
//! grounded question-answering prompt ships built in so its wording cannot
//! drift between deployments.

pub mod builder;
pub mod templates;
pub mod types;

pub use builder::build_prompt;
pub use templates::{grounded_qa, GROUNDED_QA_ID};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
