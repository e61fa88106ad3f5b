//! End-to-end tests driving the dialog manager through a conversation store

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use dialog_runtime::{
    Choice, ChoicePrompt, ComponentDialog, ConversationStore, Dialog, DialogError, DialogInstance,
    DialogManager, DialogTurnStatus, MemoryConversationStore, PersistedConversation, StepFuture,
    StepResult, TextPrompt, TurnContext, WaterfallDialog, WaterfallStepContext,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn ask_name<'c>(step: &'c mut WaterfallStepContext<'_, '_>) -> StepFuture<'c> {
    Box::pin(async move { step.prompt_text("namePrompt", "What is your name?").await })
}

fn ask_color<'c>(step: &'c mut WaterfallStepContext<'_, '_>) -> StepFuture<'c> {
    Box::pin(async move {
        let name = step.take_result().unwrap();
        step.set_value("name", name)?;
        step.prompt_choices(
            "colorPrompt",
            "Pick a color",
            vec![Choice::new("red"), Choice::new("green"), Choice::new("blue")],
        )
        .await
    })
}

fn summarize<'c>(step: &'c mut WaterfallStepContext<'_, '_>) -> StepFuture<'c> {
    Box::pin(async move {
        let found = step.take_result().unwrap();
        let color = found["value"].clone();
        let name = step.get_value("name").unwrap();
        step.send_text(format!(
            "Thanks {}, you picked {}.",
            name.as_str().unwrap(),
            color.as_str().unwrap()
        ));
        Ok(StepResult::End(Some(json!({
            "name": name,
            "color": color,
        }))))
    })
}

fn profile_dialog() -> Arc<dyn Dialog> {
    let flow = WaterfallDialog::new("profileFlow")
        .step(ask_name)
        .step(ask_color)
        .step(summarize);
    Arc::new(
        ComponentDialog::new("profile")
            .add_dialog(Arc::new(flow))
            .unwrap()
            .add_dialog(Arc::new(TextPrompt::new("namePrompt")))
            .unwrap()
            .add_dialog(Arc::new(ChoicePrompt::new("colorPrompt")))
            .unwrap(),
    )
}

#[tokio::test]
async fn turns_fail_fast_until_the_manager_is_configured() {
    let mut turn = TurnContext::with_text("hi");
    let err = DialogManager::new()
        .on_turn("conv", &mut turn)
        .await
        .unwrap_err();
    assert!(matches!(err, DialogError::Unconfigured("root dialog")));

    let manager = DialogManager::new().with_root(profile_dialog()).unwrap();
    let err = manager.on_turn("conv", &mut turn).await.unwrap_err();
    assert!(matches!(err, DialogError::Unconfigured("conversation store")));
}

#[tokio::test]
async fn runs_a_profile_conversation_across_three_turns() {
    init_tracing();
    let store = Arc::new(MemoryConversationStore::new());
    let manager = DialogManager::new()
        .with_root(profile_dialog())
        .unwrap()
        .with_store(store.clone());

    let mut turn = TurnContext::with_text("hi");
    let result = manager.on_turn("conv-1", &mut turn).await.unwrap();
    assert_eq!(result.turn_result.status, DialogTurnStatus::Waiting);
    assert_eq!(turn.responses()[0].text, "What is your name?");

    let mut turn = TurnContext::with_text("Ada");
    let result = manager.on_turn("conv-1", &mut turn).await.unwrap();
    assert_eq!(result.turn_result.status, DialogTurnStatus::Waiting);
    assert_eq!(
        turn.responses()[0].text,
        "Pick a color (1) red, (2) green, (3) blue"
    );

    let mut turn = TurnContext::with_text("blue");
    let result = manager.on_turn("conv-1", &mut turn).await.unwrap();
    assert_eq!(result.turn_result.status, DialogTurnStatus::Complete);
    let value = result.turn_result.result.unwrap();
    assert_eq!(value["name"], json!("Ada"));
    assert_eq!(value["color"], json!("blue"));
    assert_eq!(turn.responses()[0].text, "Thanks Ada, you picked blue.");

    // The conversation wound all the way down and is idle again.
    let stored = store.read("conv-1").await.unwrap().unwrap();
    assert!(stored.state.is_idle());
    assert!(stored.state.last_access.is_some());
}

#[tokio::test]
async fn persisted_state_uses_the_wire_format_keys() {
    let store = Arc::new(MemoryConversationStore::new());
    let manager = DialogManager::new()
        .with_root(profile_dialog())
        .unwrap()
        .with_store(store.clone());

    let mut turn = TurnContext::with_text("hi");
    manager.on_turn("conv-1", &mut turn).await.unwrap();

    let stored = store.read("conv-1").await.unwrap().unwrap();
    let serialized = serde_json::to_value(&stored.state).unwrap();
    assert!(serialized.get("dialogStack").is_some());
    assert!(serialized.get("_lastAccess").is_some());
    assert_eq!(serialized["dialogStack"][0]["id"], json!("profile"));
}

#[tokio::test]
async fn conversations_are_isolated_by_id() {
    let store = Arc::new(MemoryConversationStore::new());
    let manager = DialogManager::new()
        .with_root(profile_dialog())
        .unwrap()
        .with_store(store.clone());

    let mut turn = TurnContext::with_text("hi");
    manager.on_turn("conv-a", &mut turn).await.unwrap();
    let mut turn = TurnContext::with_text("hello");
    manager.on_turn("conv-b", &mut turn).await.unwrap();

    // Answering in one conversation advances only that conversation.
    let mut turn = TurnContext::with_text("Ada");
    manager.on_turn("conv-a", &mut turn).await.unwrap();
    assert_eq!(
        turn.responses()[0].text,
        "Pick a color (1) red, (2) green, (3) blue"
    );

    let mut turn = TurnContext::with_text("Bob");
    manager.on_turn("conv-b", &mut turn).await.unwrap();
    assert_eq!(
        turn.responses()[0].text,
        "Pick a color (1) red, (2) green, (3) blue"
    );

    let mut turn = TurnContext::with_text("red");
    let result = manager.on_turn("conv-b", &mut turn).await.unwrap();
    assert_eq!(
        result.turn_result.result.unwrap()["name"],
        json!("Bob")
    );
}

#[tokio::test]
async fn an_expired_conversation_starts_over() {
    init_tracing();
    let store = Arc::new(MemoryConversationStore::new());
    let manager = DialogManager::new()
        .with_root(profile_dialog())
        .unwrap()
        .with_store(store.clone())
        .with_expire_after(Duration::minutes(30));

    // Seed a conversation that went idle two hours ago, mid-dialog.
    let stale = PersistedConversation {
        dialog_stack: vec![DialogInstance::new("profile")],
        last_access: Some(Utc::now() - Duration::hours(2)),
    };
    store.write("conv-1", &stale, None).await.unwrap();

    let mut turn = TurnContext::with_text("hi again");
    let result = manager.on_turn("conv-1", &mut turn).await.unwrap();
    assert_eq!(result.turn_result.status, DialogTurnStatus::Waiting);
    // The stale stack was discarded and the root began from scratch.
    assert_eq!(turn.responses()[0].text, "What is your name?");

    let stored = store.read("conv-1").await.unwrap().unwrap();
    assert_eq!(stored.state.dialog_stack.len(), 1);
    assert_eq!(stored.state.dialog_stack[0].id, "profile");
}

#[tokio::test]
async fn a_recent_conversation_does_not_expire() {
    let store = Arc::new(MemoryConversationStore::new());
    let manager = DialogManager::new()
        .with_root(profile_dialog())
        .unwrap()
        .with_store(store.clone())
        .with_expire_after(Duration::minutes(30));

    let mut turn = TurnContext::with_text("hi");
    manager.on_turn("conv-1", &mut turn).await.unwrap();

    // Seconds later, the same conversation picks up where it left off.
    let mut turn = TurnContext::with_text("Ada");
    let result = manager.on_turn("conv-1", &mut turn).await.unwrap();
    assert_eq!(result.turn_result.status, DialogTurnStatus::Waiting);
    assert_eq!(
        turn.responses()[0].text,
        "Pick a color (1) red, (2) green, (3) blue"
    );
}

fn wait_first<'c>(_step: &'c mut WaterfallStepContext<'_, '_>) -> StepFuture<'c> {
    Box::pin(async move { Ok(StepResult::Wait) })
}

fn then_fail<'c>(_step: &'c mut WaterfallStepContext<'_, '_>) -> StepFuture<'c> {
    Box::pin(async move { Err(DialogError::Step(anyhow::anyhow!("downstream unavailable"))) })
}

#[tokio::test]
async fn a_failed_turn_is_not_persisted() {
    let flow = WaterfallDialog::new("failingFlow")
        .step(wait_first)
        .step(then_fail);
    let root = Arc::new(
        ComponentDialog::new("failing")
            .add_dialog(Arc::new(flow))
            .unwrap(),
    );
    let store = Arc::new(MemoryConversationStore::new());
    let manager = DialogManager::new()
        .with_root(root)
        .unwrap()
        .with_store(store.clone());

    let mut turn = TurnContext::with_text("hi");
    manager.on_turn("conv-1", &mut turn).await.unwrap();
    let before = store.read("conv-1").await.unwrap().unwrap();
    assert_eq!(before.state.dialog_stack.len(), 1);

    let mut turn = TurnContext::with_text("go");
    let err = manager.on_turn("conv-1", &mut turn).await.unwrap_err();
    assert!(matches!(err, DialogError::Step(_)));

    // The store still holds the state from the last successful turn.
    let after = store.read("conv-1").await.unwrap().unwrap();
    assert_eq!(after.state, before.state);
    assert_eq!(after.token, before.token);
}

#[tokio::test]
async fn nested_containers_register_recursively() {
    let inner = ComponentDialog::new("inner")
        .add_dialog(Arc::new(TextPrompt::new("prompt")))
        .unwrap();
    let outer = ComponentDialog::new("outer")
        .add_dialog(Arc::new(inner))
        .unwrap();
    let manager = DialogManager::new().with_root(Arc::new(outer)).unwrap();

    assert!(manager.dialogs().contains("outer"));
    assert!(manager.dialogs().contains("inner"));
    // Leaf dialogs stay private to their owning container.
    assert!(!manager.dialogs().contains("prompt"));
}
