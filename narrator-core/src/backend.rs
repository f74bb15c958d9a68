//! The generation backend seam shared by the agents.

use async_trait::async_trait;
use ollama::{Ollama, Request, Response};
use thiserror::Error;

/// Errors from an agent's use of the generation backend.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Generation backend error: {0}")]
    Generation(#[from] ollama::Error),

    #[error("Model kept requesting tools after {max} rounds")]
    ToolRoundsExceeded { max: usize },
}

/// Anything that can produce text for the agents.
///
/// Implemented by [`Ollama`] for real use and by
/// [`ScriptedModel`](crate::testing::ScriptedModel) in tests.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Multi-message chat with optional tools.
    async fn chat(&self, request: Request) -> Result<Response, ollama::Error>;

    /// Single combined prompt, text out.
    async fn generate(&self, prompt: &str) -> Result<String, ollama::Error>;
}

#[async_trait]
impl LanguageModel for Ollama {
    async fn chat(&self, request: Request) -> Result<Response, ollama::Error> {
        Ollama::chat(self, request).await
    }

    async fn generate(&self, prompt: &str) -> Result<String, ollama::Error> {
        Ollama::generate(self, prompt).await
    }
}
