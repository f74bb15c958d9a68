//! Lore tools offered to the narrator model.
//!
//! Each tool maps to one lore category and takes a single `name` argument.

use crate::lore::LoreCategory;
use ollama::Tool;
use serde_json::{json, Value};

pub const SEARCH_MONSTER: &str = "search_monster";
pub const SEARCH_SPELL: &str = "search_spell";
pub const SEARCH_MAGIC_ITEM: &str = "search_magic_item";

/// Tool definitions for lore lookups.
pub struct LoreTools;

impl LoreTools {
    pub fn all() -> Vec<Tool> {
        vec![
            Self::search_monster(),
            Self::search_spell(),
            Self::search_magic_item(),
        ]
    }

    fn search_monster() -> Tool {
        Tool {
            name: SEARCH_MONSTER.to_string(),
            description: "Search for information about a D&D monster by name (ex: goblin, dragon, beholder)".to_string(),
            input_schema: name_schema("Monster name, e.g. 'goblin' or 'adult red dragon'"),
        }
    }

    fn search_spell() -> Tool {
        Tool {
            name: SEARCH_SPELL.to_string(),
            description: "Search for a D&D spell by name (ex: fireball, magic-missile, cure-wounds)".to_string(),
            input_schema: name_schema("Spell name, e.g. 'fireball'"),
        }
    }

    fn search_magic_item() -> Tool {
        Tool {
            name: SEARCH_MAGIC_ITEM.to_string(),
            description: "Search for a D&D magic item by name (ex: bag-of-holding, vorpal-sword)".to_string(),
            input_schema: name_schema("Magic item name, e.g. 'bag of holding'"),
        }
    }
}

fn name_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": description
            }
        },
        "required": ["name"]
    })
}

/// A tool call the narrator can act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoreRequest {
    Lookup { category: LoreCategory, name: String },
    UnknownTool(String),
    MissingName(LoreCategory),
}

/// Map a model tool call onto a lore lookup.
pub fn parse_tool_call(name: &str, arguments: &Value) -> LoreRequest {
    let category = match name {
        SEARCH_MONSTER => LoreCategory::Monster,
        SEARCH_SPELL => LoreCategory::Spell,
        SEARCH_MAGIC_ITEM => LoreCategory::Item,
        other => return LoreRequest::UnknownTool(other.to_string()),
    };

    match arguments["name"].as_str().map(str::trim) {
        Some(value) if !value.is_empty() => LoreRequest::Lookup {
            category,
            name: value.to_string(),
        },
        _ => LoreRequest::MissingName(category),
    }
}
