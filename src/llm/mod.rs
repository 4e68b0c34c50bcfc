//! Text-generation service client and prompt construction.

pub mod client;
pub mod prompt;

pub use client::{ChatCompletionsClient, CompletionClient, CompletionOptions};
pub use prompt::{build_combined_prompt, build_file_prompt, sanitize_content};
