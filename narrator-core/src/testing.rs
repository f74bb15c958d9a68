//! Testing utilities for the narrator.
//!
//! This module provides deterministic stand-ins for the external services:
//! - `ScriptedModel` replays scripted backend output and records requests
//! - `RecordingLore` records lore queries and returns canned text

use crate::backend::LanguageModel;
use crate::lore::{LoreCategory, LoreLookup};
use async_trait::async_trait;
use ollama::{Request, Response};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Returned once the chat script runs out.
pub const SCRIPT_EXHAUSTED: &str = "The narrator has no more scripted responses.";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A backend that returns scripted responses.
///
/// Chat and generate calls draw from separate queues, in order.
#[derive(Default)]
pub struct ScriptedModel {
    chat_script: Mutex<VecDeque<Result<Response, ollama::Error>>>,
    generate_script: Mutex<VecDeque<Result<String, ollama::Error>>>,
    chat_requests: Mutex<Vec<Request>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain text chat reply.
    pub fn with_chat_text(self, text: impl Into<String>) -> Self {
        self.with_chat_response(Response::text_only(text))
    }

    /// Queue an arbitrary chat reply, e.g. one that requests tools.
    pub fn with_chat_response(self, response: Response) -> Self {
        lock(&self.chat_script).push_back(Ok(response));
        self
    }

    pub fn with_chat_error(self, error: ollama::Error) -> Self {
        lock(&self.chat_script).push_back(Err(error));
        self
    }

    pub fn with_generate_text(self, text: impl Into<String>) -> Self {
        lock(&self.generate_script).push_back(Ok(text.into()));
        self
    }

    pub fn with_generate_error(self, error: ollama::Error) -> Self {
        lock(&self.generate_script).push_back(Err(error));
        self
    }

    pub fn chat_calls(&self) -> usize {
        lock(&self.chat_requests).len()
    }

    pub fn generate_calls(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Total backend calls of either kind.
    pub fn calls(&self) -> usize {
        self.chat_calls() + self.generate_calls()
    }

    pub fn chat_requests(&self) -> Vec<Request> {
        lock(&self.chat_requests).clone()
    }

    pub fn last_chat_request(&self) -> Option<Request> {
        lock(&self.chat_requests).last().cloned()
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        lock(&self.prompts).last().cloned()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn chat(&self, request: Request) -> Result<Response, ollama::Error> {
        lock(&self.chat_requests).push(request);
        lock(&self.chat_script)
            .pop_front()
            .unwrap_or_else(|| Ok(Response::text_only(SCRIPT_EXHAUSTED)))
    }

    async fn generate(&self, prompt: &str) -> Result<String, ollama::Error> {
        lock(&self.prompts).push(prompt.to_string());
        lock(&self.generate_script)
            .pop_front()
            .unwrap_or_else(|| Ok(SCRIPT_EXHAUSTED.to_string()))
    }
}

/// A lore capability that records every query.
#[derive(Default)]
pub struct RecordingLore {
    reply: Option<String>,
    queries: Mutex<Vec<(LoreCategory, String)>>,
}

impl RecordingLore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every query with `text`.
    pub fn with_reply(mut self, text: impl Into<String>) -> Self {
        self.reply = Some(text.into());
        self
    }

    /// Queries seen so far, in order.
    pub fn queries(&self) -> Vec<(LoreCategory, String)> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl LoreLookup for RecordingLore {
    async fn lookup(&self, category: LoreCategory, name: &str) -> String {
        lock(&self.queries).push((category, name.to_string()));
        match &self.reply {
            Some(text) => text.clone(),
            None => format!("No lore recorded for {category} '{name}'."),
        }
    }
}
