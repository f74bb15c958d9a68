//! Entity generation.
//!
//! Asks the backend to invent a game entity (monster, weapon, NPC...) as a
//! JSON description. The model's text is returned untouched; callers that
//! want structure can use [`GeneratedEntity::extract`].

use crate::backend::{AgentError, LanguageModel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Stateless entity generator.
pub struct EntityAgent {
    model: Arc<dyn LanguageModel>,
}

impl EntityAgent {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Generate an entity for the player's request and return the raw text.
    pub async fn generate(&self, input: &str) -> Result<String, AgentError> {
        let prompt = build_prompt(input);
        debug!(prompt_len = prompt.len(), "generating entity");
        Ok(self.model.generate(&prompt).await?)
    }
}

/// The single combined prompt sent for an entity request.
pub fn build_prompt(input: &str) -> String {
    format!(
        r#"Generate an RPG entity as JSON with:
- type (monster, weapon, NPC...)
- name
- rarity
- description

Example:
{{
  "type": "weapon",
  "name": "Flame Sword",
  "rarity": "rare",
  "description": "Forged in the volcanoes of Thalara."
}}

Player request: {input}
"#
    )
}

/// An entity parsed out of generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl GeneratedEntity {
    /// Parse the first JSON object in `text` that looks like an entity.
    ///
    /// Models often wrap the object in prose or code fences, so every `{` is
    /// tried as a starting point.
    pub fn extract(text: &str) -> Option<Self> {
        text.match_indices('{').find_map(|(start, _)| {
            serde_json::Deserializer::from_str(&text[start..])
                .into_iter::<GeneratedEntity>()
                .next()
                .and_then(Result::ok)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    #[test]
    fn test_prompt_ends_with_request() {
        let prompt = build_prompt("a cursed ring");
        assert!(prompt.contains("- type (monster, weapon, NPC...)"));
        assert!(prompt.contains(r#""name": "Flame Sword""#));
        assert!(prompt.trim_end().ends_with("Player request: a cursed ring"));
    }

    #[tokio::test]
    async fn test_generate_returns_raw_text() {
        let raw = "Here you go:\n```json\n{\"type\": \"npc\", \"name\": \"Brom\"}\n```";
        let model = Arc::new(ScriptedModel::new().with_generate_text(raw));
        let agent = EntityAgent::new(model.clone());

        let text = agent.generate("create a blacksmith").await.unwrap();
        assert_eq!(text, raw);
        assert_eq!(model.generate_calls(), 1);
        assert_eq!(model.chat_calls(), 0);
        assert!(model
            .last_prompt()
            .unwrap()
            .ends_with("Player request: create a blacksmith\n"));
    }

    #[tokio::test]
    async fn test_generate_propagates_backend_errors() {
        let model = Arc::new(ScriptedModel::new().with_generate_error(ollama::Error::Api {
            status: 500,
            message: "model not loaded".to_string(),
        }));
        let agent = EntityAgent::new(model);

        let err = agent.generate("create a sword").await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::Generation(ollama::Error::Api { status: 500, .. })
        ));
    }

    #[test]
    fn test_extract_from_wrapped_text() {
        let text = r#"Sure! {"type": "weapon", "name": "Frost Brand", "rarity": "very rare", "description": "Cold to the touch."} Enjoy."#;
        let entity = GeneratedEntity::extract(text).unwrap();

        assert_eq!(entity.kind, "weapon");
        assert_eq!(entity.name, "Frost Brand");
        assert_eq!(entity.rarity.as_deref(), Some("very rare"));
    }

    #[test]
    fn test_extract_skips_non_entity_objects() {
        let text = r#"{"note": 1} then {"type": "monster", "name": "Grell"}"#;
        let entity = GeneratedEntity::extract(text).unwrap();
        assert_eq!(entity.name, "Grell");
        assert_eq!(entity.description, None);

        assert_eq!(GeneratedEntity::extract("no json here"), None);
    }
}
