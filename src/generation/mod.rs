//! Prompt construction for grounded generation

pub mod prompt;

pub use prompt::PromptBuilder;
