//! Orchestrator routing tests using scripted backends.
//!
//! These run without a generation backend or network access.

use narrator_core::narrator::safety::APOLOGY;
use narrator_core::narrator::Speaker;
use narrator_core::testing::{RecordingLore, ScriptedModel};
use narrator_core::{
    EntityAgent, Intent, NarrationAgent, NarratorConfig, Orchestrator, OrchestratorError,
    FALLBACK_REPLY,
};
use std::sync::Arc;

fn orchestrator(model: &Arc<ScriptedModel>) -> Orchestrator {
    let narrator = NarrationAgent::new(
        model.clone(),
        Arc::new(RecordingLore::new()),
        NarratorConfig::default(),
    );
    Orchestrator::new(narrator, EntityAgent::new(model.clone()))
}

#[tokio::test]
async fn test_narrative_input_goes_to_narrator() {
    let model = Arc::new(ScriptedModel::new().with_chat_text("You draw your blade."));
    let mut orchestrator = orchestrator(&model);

    let reply = orchestrator.handle("attack the goblin").await.unwrap();

    assert_eq!(reply, "You draw your blade.");
    assert_eq!(model.chat_calls(), 1);
    assert_eq!(model.generate_calls(), 0);
}

#[tokio::test]
async fn test_creation_input_goes_to_entity_agent() {
    let model = Arc::new(ScriptedModel::new().with_generate_text(
        r#"{"type": "weapon", "name": "Flame Sword", "rarity": "rare", "description": "Hot."}"#,
    ));
    let mut orchestrator = orchestrator(&model);

    let reply = orchestrator.handle("create a fire sword").await.unwrap();

    assert!(reply.contains("Flame Sword"));
    assert_eq!(model.generate_calls(), 1);
    assert_eq!(model.chat_calls(), 0);
    assert!(orchestrator.narrator().memory().is_empty());
}

#[tokio::test]
async fn test_unmatched_input_defaults_to_story() {
    let model = Arc::new(ScriptedModel::new().with_chat_text("The door creaks open."));
    let mut orchestrator = orchestrator(&model);

    let reply = orchestrator.handle("I open the door").await.unwrap();

    assert_eq!(reply, "The door creaks open.");
    assert_eq!(model.chat_calls(), 1);
}

#[tokio::test]
async fn test_absent_input_is_rejected_without_calls() {
    let model = Arc::new(ScriptedModel::new());
    let mut orchestrator = orchestrator(&model);

    let err = orchestrator.handle(None).await.unwrap_err();

    assert!(matches!(err, OrchestratorError::InvalidInput(_)));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_unknown_intent_falls_back_without_calls() {
    let model = Arc::new(ScriptedModel::new());
    let mut orchestrator = orchestrator(&model);

    let reply = orchestrator.dispatch(Intent::Unknown, "xyzzy").await.unwrap();

    assert_eq!(reply, FALLBACK_REPLY);
    assert_eq!(reply, "I did not understand your request.");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_structured_narration_is_replaced() {
    let leaked = r#"{"name": "describeScene", "parameters": {"mood": "dark"}}"#;
    let model = Arc::new(ScriptedModel::new().with_chat_text(leaked));
    let mut orchestrator = orchestrator(&model);

    let reply = orchestrator.handle("tell me what I see").await.unwrap();

    assert_eq!(reply, APOLOGY);
}

#[tokio::test]
async fn test_backend_failure_surfaces() {
    let error = ollama::Error::Network("connection refused".to_string());
    let model = Arc::new(ScriptedModel::new().with_chat_error(error));
    let mut orchestrator = orchestrator(&model);

    let err = orchestrator.handle("explore the ruins").await.unwrap_err();

    assert!(matches!(err, OrchestratorError::Agent(_)));
    assert!(orchestrator.narrator().memory().is_empty());
}

#[tokio::test]
async fn test_memory_keeps_most_recent_turns() {
    let mut model = ScriptedModel::new();
    for i in 0..12 {
        model = model.with_chat_text(format!("reply {i}"));
    }
    let model = Arc::new(model);
    let mut orchestrator = orchestrator(&model);

    for i in 0..12 {
        orchestrator.handle(format!("explore room {i}").as_str()).await.unwrap();
    }

    // Each call stores the player turn and the narration; only the last ten turns stay.
    let memory = orchestrator.narrator().memory();
    assert_eq!(memory.len(), 10);

    let turns: Vec<_> = memory.turns().collect();
    assert_eq!(turns[0].speaker, Speaker::Player);
    assert_eq!(turns[0].content, "explore room 7");
    assert_eq!(turns[1].content, "reply 7");
    assert_eq!(turns[9].speaker, Speaker::Narrator);
    assert_eq!(turns[9].content, "reply 11");

    // The twelfth request carried the ten turns remembered before it plus the new input.
    let last = model.last_chat_request().unwrap();
    assert_eq!(last.messages.len(), 11);
    assert_eq!(last.messages[10].content, "explore room 11");
}
