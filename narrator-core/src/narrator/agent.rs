//! The narration agent.
//!
//! Turns player input into story prose through the generation backend. The
//! model may look up monsters, spells and magic items mid-generation; those
//! lookups never fail the call.

use super::memory::{ConversationMemory, DEFAULT_MEMORY_TURNS};
use super::safety;
use super::tools::{parse_tool_call, LoreRequest, LoreTools};
use crate::backend::{AgentError, LanguageModel};
use crate::lore::LoreLookup;
use ollama::{Message, Request, ToolCall};
use std::sync::Arc;
use tracing::debug;

const MAX_TEMPERATURE: f32 = 2.0;

/// Configuration for the narration agent.
#[derive(Debug, Clone)]
pub struct NarratorConfig {
    /// Number of recent turns kept in memory.
    pub memory_turns: usize,

    /// Temperature for generation.
    pub temperature: Option<f32>,

    /// Tool-call rounds allowed before giving up on a narration.
    pub max_tool_rounds: usize,

    /// Replaces the built-in narrator instructions.
    pub custom_system_prompt: Option<String>,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            memory_turns: DEFAULT_MEMORY_TURNS,
            temperature: Some(0.7),
            max_tool_rounds: 4,
            custom_system_prompt: None,
        }
    }
}

impl NarratorConfig {
    pub fn with_memory_turns(mut self, turns: usize) -> Self {
        self.memory_turns = turns;
        self
    }

    /// Set the temperature, clamped to `0.0..=2.0`.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, MAX_TEMPERATURE));
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_system_prompt = Some(prompt.into());
        self
    }
}

/// Story narrator with bounded memory and lore lookups.
pub struct NarrationAgent {
    model: Arc<dyn LanguageModel>,
    lore: Arc<dyn LoreLookup>,
    memory: ConversationMemory,
    config: NarratorConfig,
}

impl NarrationAgent {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        lore: Arc<dyn LoreLookup>,
        config: NarratorConfig,
    ) -> Self {
        Self {
            model,
            lore,
            memory: ConversationMemory::new(config.memory_turns),
            config,
        }
    }

    pub fn config(&self) -> &NarratorConfig {
        &self.config
    }

    /// Remembered conversation, oldest turn first.
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn system_prompt(&self) -> &str {
        self.config
            .custom_system_prompt
            .as_deref()
            .unwrap_or(include_str!("prompts/narrator_base.txt"))
    }

    /// Narrate the next part of the story in response to `input`.
    ///
    /// Memory is updated only when generation succeeds, with the text that
    /// is actually returned.
    pub async fn narrate(&mut self, input: &str) -> Result<String, AgentError> {
        let mut messages = self.memory.messages();
        messages.push(Message::user(input));

        let mut rounds = 0;
        let raw = loop {
            let mut request = Request::new(messages.clone())
                .with_system(self.system_prompt())
                .with_tools(LoreTools::all());

            if let Some(temp) = self.config.temperature {
                request = request.with_temperature(temp);
            }

            let response = self.model.chat(request).await?;

            if !response.message.has_tool_calls() {
                break response.message.content;
            }

            if rounds >= self.config.max_tool_rounds {
                return Err(AgentError::ToolRoundsExceeded {
                    max: self.config.max_tool_rounds,
                });
            }
            rounds += 1;

            let calls = response.message.tool_calls.clone();
            messages.push(response.message);

            for call in &calls {
                let result = self.run_tool(call).await;
                messages.push(Message::tool(&call.name, result));
            }
        };

        let narration = safety::filter(raw);

        self.memory.add_player_turn(input);
        self.memory.add_narrator_turn(&narration);

        Ok(narration)
    }

    async fn run_tool(&self, call: &ToolCall) -> String {
        match parse_tool_call(&call.name, &call.arguments) {
            LoreRequest::Lookup { category, name } => {
                debug!(tool = %call.name, query = %name, "lore tool call");
                self.lore.lookup(category, &name).await
            }
            LoreRequest::MissingName(category) => {
                debug!(tool = %call.name, "lore tool call without a name");
                format!("No {category} name was given to look up.")
            }
            LoreRequest::UnknownTool(name) => {
                debug!(tool = %name, "unknown tool requested");
                format!("Unknown tool: {name}")
            }
        }
    }
}
