//! Conversational D&D game master.
//!
//! This crate provides:
//! - Keyword intent routing between narration and entity generation
//! - A narrator with bounded memory and live 5e lore lookups
//! - An entity generator for monsters, weapons and NPCs
//! - Environment-driven configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use narrator_core::{Orchestrator, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let mut orchestrator = Orchestrator::from_settings(&settings)?;
//!
//!     let reply = orchestrator.handle("I explore the crypt").await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod entity;
pub mod intent;
pub mod lore;
pub mod narrator;
pub mod orchestrator;
pub mod testing;

// Backend client, re-exported for callers building requests or matching errors
pub use ollama;

// Primary public API
pub use backend::{AgentError, LanguageModel};
pub use config::{ConfigError, Settings};
pub use entity::{EntityAgent, GeneratedEntity};
pub use intent::{classify, Intent, IntentError};
pub use lore::{LoreCategory, LoreClient, LoreConfig, LoreLookup, LoreRecord, LookupQuery};
pub use narrator::{ConversationMemory, NarrationAgent, NarratorConfig};
pub use orchestrator::{Orchestrator, OrchestratorError, FALLBACK_REPLY};
pub use testing::{RecordingLore, ScriptedModel};
