//! OpenAI-compatible generation backend.
//!
//! Works with any endpoint that speaks the chat completions API: the OpenAI
//! cloud, Azure OpenAI, Ollama in compatibility mode, vLLM, LM Studio.
//!
//! # Example
//!
//! ```rust,no_run
//! use survey_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use survey_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::new(OpenAIConfig {
//!         base_url: "http://localhost:11434/v1".to_string(),
//!         gen_model: "llama3".to_string(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//!     let reply = backend.generate("Say hello").await.unwrap();
//!     println!("{}", reply);
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig};
pub use error::{to_survey_error, OpenAIErrorCode};
pub use types::*;
