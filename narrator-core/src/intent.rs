//! Keyword-based intent classification.
//!
//! Inputs are routed by plain substring matching on the lowercased text.
//! Creation keywords win over narrative keywords, and anything unmatched is
//! treated as a request to continue the story.

use std::fmt;
use thiserror::Error;

/// Keywords that ask for a new game entity.
pub const CREATION_KEYWORDS: &[&str] = &["create", "generate"];

/// Keywords that ask for the story to move forward.
pub const NARRATIVE_KEYWORDS: &[&str] = &["tell", "attack", "explore", "start", "begin"];

/// What the player wants from a given input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Narrate the next part of the adventure.
    ContinueStory,
    /// Produce a description of a new monster, weapon, NPC, etc.
    CreateEntity,
    /// Reserved. Keyword matching never produces it.
    Unknown,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::ContinueStory => write!(f, "continue_story"),
            Intent::CreateEntity => write!(f, "create_entity"),
            Intent::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("No input to classify")]
    InvalidInput,
}

/// Classify raw player input.
///
/// Accepts `&str` or `Option<&str>`; `None` stands for absent input and is
/// rejected. An empty string is valid and falls through to
/// [`Intent::ContinueStory`].
pub fn classify<'a>(text: impl Into<Option<&'a str>>) -> Result<Intent, IntentError> {
    let text = text.into().ok_or(IntentError::InvalidInput)?;
    let lowered = text.to_lowercase();

    if contains_any(&lowered, CREATION_KEYWORDS) {
        return Ok(Intent::CreateEntity);
    }

    if contains_any(&lowered, NARRATIVE_KEYWORDS) {
        return Ok(Intent::ContinueStory);
    }

    Ok(Intent::ContinueStory)
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(keyword))
}
