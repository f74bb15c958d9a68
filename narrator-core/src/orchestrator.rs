//! Routes player input to the agent that can answer it.

use crate::backend::{AgentError, LanguageModel};
use crate::config::{ConfigError, Settings};
use crate::entity::EntityAgent;
use crate::intent::{self, Intent, IntentError};
use crate::lore::{LoreClient, LoreLookup};
use crate::narrator::NarrationAgent;
use ollama::Ollama;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Reply for intents no agent handles.
pub const FALLBACK_REPLY: &str = "I did not understand your request.";

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    InvalidInput(#[from] IntentError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Single entry point: classify, then dispatch.
///
/// Takes `&mut self` because narration updates conversation memory, so one
/// orchestrator serves one conversation at a time.
pub struct Orchestrator {
    narrator: NarrationAgent,
    entities: EntityAgent,
}

impl Orchestrator {
    pub fn new(narrator: NarrationAgent, entities: EntityAgent) -> Self {
        Self { narrator, entities }
    }

    /// Wire the real generation backend and lore client.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let backend: Arc<dyn LanguageModel> =
            Arc::new(Ollama::new(&settings.base_url, &settings.model)?);
        let lore: Arc<dyn LoreLookup> = Arc::new(LoreClient::new(settings.lore.clone())?);

        let narrator = NarrationAgent::new(backend.clone(), lore, settings.narrator.clone());
        let entities = EntityAgent::new(backend);

        Ok(Self::new(narrator, entities))
    }

    pub fn narrator(&self) -> &NarrationAgent {
        &self.narrator
    }

    /// Classify `input` and return the chosen agent's reply.
    ///
    /// `None` stands for absent input and fails with
    /// [`OrchestratorError::InvalidInput`] before any backend call.
    pub async fn handle<'a>(
        &mut self,
        input: impl Into<Option<&'a str>>,
    ) -> Result<String, OrchestratorError> {
        let input = input.into();
        let intent = intent::classify(input)?;
        self.dispatch(intent, input.unwrap_or_default()).await
    }

    /// Run the agent for an already classified intent.
    pub async fn dispatch(
        &mut self,
        intent: Intent,
        input: &str,
    ) -> Result<String, OrchestratorError> {
        info!(%intent, "dispatching player input");

        match intent {
            Intent::ContinueStory => Ok(self.narrator.narrate(input).await?),
            Intent::CreateEntity => Ok(self.entities.generate(input).await?),
            Intent::Unknown => Ok(FALLBACK_REPLY.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lore::LoreConfig;
    use crate::narrator::NarratorConfig;

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            base_url: "http://localhost:11434/".to_string(),
            model: "llama3.1".to_string(),
            lore: LoreConfig::default(),
            narrator: NarratorConfig::default().with_memory_turns(6),
        };

        let orchestrator = Orchestrator::from_settings(&settings).unwrap();
        assert_eq!(orchestrator.narrator().memory().capacity(), 6);
        assert!(orchestrator.narrator().memory().is_empty());
    }

    #[test]
    fn test_from_settings_rejects_blank_model() {
        let settings = Settings {
            base_url: "http://localhost:11434".to_string(),
            model: " ".to_string(),
            lore: LoreConfig::default(),
            narrator: NarratorConfig::default(),
        };

        let err = Orchestrator::from_settings(&settings).err().unwrap();
        assert!(matches!(err, ConfigError::Backend(ollama::Error::Config(_))));
    }
}
