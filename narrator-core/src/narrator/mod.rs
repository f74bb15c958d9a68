//! Story narration.
//!
//! Contains the narration agent, its lore tools, conversation memory and
//! the structured-output filter.

mod agent;
pub mod memory;
pub mod safety;
mod tools;

pub use agent::{NarrationAgent, NarratorConfig};
pub use memory::{ConversationMemory, Speaker, Turn};
pub use tools::{parse_tool_call, LoreRequest, LoreTools};
