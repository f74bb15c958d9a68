//! Sliding-window conversation memory for the narrator.

use ollama::Message;
use std::collections::VecDeque;
use tracing::debug;

/// Default number of turns kept.
pub const DEFAULT_MEMORY_TURNS: usize = 10;

/// Who produced a remembered turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Player,
    Narrator,
}

/// One remembered turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub content: String,
}

/// The most recent turns of the conversation, oldest first.
///
/// Holds at most `capacity` turns; pushing past that evicts the oldest.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationMemory {
    /// Create an empty memory. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn add_player_turn(&mut self, content: impl Into<String>) {
        self.push(Speaker::Player, content.into());
    }

    pub fn add_narrator_turn(&mut self, content: impl Into<String>) {
        self.push(Speaker::Narrator, content.into());
    }

    fn push(&mut self, speaker: Speaker, content: String) {
        self.turns.push_back(Turn { speaker, content });
        while self.turns.len() > self.capacity {
            if let Some(evicted) = self.turns.pop_front() {
                debug!(speaker = ?evicted.speaker, "evicted oldest turn from memory");
            }
        }
    }

    /// Remembered turns, oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Turns as chat messages for a generation request.
    pub fn messages(&self) -> Vec<Message> {
        self.turns
            .iter()
            .map(|turn| match turn.speaker {
                Speaker::Player => Message::user(&turn.content),
                Speaker::Narrator => Message::assistant(&turn.content),
            })
            .collect()
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_TURNS)
    }
}
