//! Answer synthesis.
//!
//! Retrieved chunks are rendered into the grounded QA prompt and sent to a
//! text generator exactly once per question.

pub mod generator;
pub mod synthesizer;
pub mod types;

pub use generator::{Generator, LlmGenerator};
pub use synthesizer::{build_context, AnswerSynthesizer, NO_CONTEXT};
pub use types::{Answer, SourceRef};
