//! End-to-end command flows through the invoke handler.
//!
//! Each test wires the built-in tools against seeded in-memory adapters and
//! a scripted model, then drives one or two invocations the way a client
//! would, including clarification round trips.

mod common;

use std::time::Duration;

use serde_json::json;

use command_orchestrator::adapters::MockAIProvider;
use command_orchestrator::application::OrchestratorSettings;
use command_orchestrator::domain::foundation::Timestamp;
use command_orchestrator::domain::orchestration::{
    AppContext, ChainState, PlanSource, ResponseAction, Screen,
};
use command_orchestrator::domain::tools::{reasons, ClarificationOption, ClarificationResponse};
use command_orchestrator::ports::CompletionPurpose;

use common::{cid, command, uid, World, ME};

fn options(payload: &serde_json::Value) -> Vec<ClarificationOption> {
    serde_json::from_value(payload["options"].clone()).unwrap()
}

fn pick(option: &ClarificationOption, reason: &str) -> ClarificationResponse {
    ClarificationResponse {
        selected_option: option.clone(),
        original_reason: reason.to_string(),
    }
}

#[tokio::test]
async fn message_to_a_named_contact_takes_two_tools() {
    let ai = MockAIProvider::new().with_response_for(
        CompletionPurpose::Planning,
        r#"[{"tool": "lookup_contacts", "parameters": {"name": "John Smith"}},
            {"tool": "send_message", "parameters": {"recipient_id": "$prev.contact_id", "content": "I'm running late"}}]"#,
    );
    let world = World::new(ai).await;

    let result = world
        .handler(OrchestratorSettings::default())
        .handle(command("Tell John Smith I'm running late"))
        .await;

    assert!(result.response.success);
    assert_eq!(result.response.action, ResponseAction::Navigate);
    assert_eq!(result.tools_invoked, 2);
    assert_eq!(result.chain_state, Some(ChainState::Complete));
    assert_eq!(result.response.payload["conversation_id"], "c-john-smith");

    let messages = world.store.messages_in(&cid("c-john-smith")).await;
    let last = messages.last().unwrap();
    assert_eq!(last.content, "I'm running late");
    assert_eq!(last.sender_id, uid(ME));
    assert_eq!(world.ai.call_count(), 1);
}

#[tokio::test]
async fn ambiguous_contact_pauses_then_resumes_without_replanning() {
    let ai = MockAIProvider::new().with_response_for(
        CompletionPurpose::Planning,
        r#"[{"tool": "lookup_contacts", "parameters": {"name": "John"}},
            {"tool": "send_message", "parameters": {"recipient_id": "$prev.contact_id", "content": "I'm running late"}}]"#,
    );
    let world = World::new(ai).await;
    let handler = world.handler(OrchestratorSettings::default());

    let first = handler.handle(command("Tell John I'm running late")).await;

    assert!(first.response.success);
    assert_eq!(first.response.action, ResponseAction::ShowClarification);
    assert_eq!(first.chain_state, Some(ChainState::Clarifying));
    assert_eq!(first.response.payload["reason"], reasons::AMBIGUOUS_CONTACT);
    let choices = options(&first.response.payload);
    let john_doe = choices.iter().find(|o| o.id == "u-john-doe").unwrap();

    let before = world.store.message_count().await;
    let mut resume = command("Tell John I'm running late");
    resume.context = resume
        .context
        .with_clarification_response(pick(john_doe, reasons::AMBIGUOUS_CONTACT));
    let second = handler.handle(resume).await;

    assert!(second.response.success);
    assert_eq!(second.plan_source, Some(PlanSource::ClarificationResume));
    assert_eq!(second.tools_invoked, 1);
    assert_eq!(world.ai.call_count_for(CompletionPurpose::Planning), 1);
    assert_eq!(world.store.message_count().await, before + 1);

    let conversation = second.response.payload["conversation_id"].as_str().unwrap();
    let sent = world.store.messages_in(&cid(conversation)).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].content, "I'm running late");
}

#[tokio::test]
async fn contact_choice_without_its_metadata_sends_nothing() {
    let ai = MockAIProvider::new().with_response_for(
        CompletionPurpose::Planning,
        r#"[{"tool": "lookup_contacts", "parameters": {"name": "John"}},
            {"tool": "send_message", "parameters": {"recipient_id": "$prev.contact_id", "content": "I'm on my way"}}]"#,
    );
    let world = World::new(ai).await;
    let handler = world.handler(OrchestratorSettings::default());

    let first = handler.handle(command("Tell John I'm on my way")).await;
    assert_eq!(first.response.action, ResponseAction::ShowClarification);

    let before = world.store.message_count().await;
    let bare = ClarificationOption::new("u-john-doe", "John Doe", "", 0.9);
    let mut resume = command("Tell John I'm on my way");
    resume.context = resume
        .context
        .with_clarification_response(pick(&bare, reasons::AMBIGUOUS_CONTACT));
    let second = handler.handle(resume).await;

    assert!(!second.response.success);
    assert_eq!(second.response.action, ResponseAction::ShowError);
    assert_eq!(second.response.payload["code"], "validation_error");
    assert!(second.response.payload["suggestion"].is_string());
    assert_eq!(second.tools_invoked, 0);
    assert_eq!(world.store.message_count().await, before);
}

#[tokio::test]
async fn question_with_one_relevant_conversation_is_answered() {
    let ai = MockAIProvider::new()
        .with_response_for(
            CompletionPurpose::Planning,
            r#"[{"tool": "analyze_conversations_multi", "parameters": {"query": "When is the project deadline?"}}]"#,
        )
        .with_response_for(
            CompletionPurpose::Extraction,
            r#"{"answer": "Monday", "confidence": 0.85, "supporting_message_ids": []}"#,
        );
    let world = World::new(ai).await;

    let result = world
        .handler(OrchestratorSettings::default())
        .handle(command("When is the project deadline?"))
        .await;

    assert!(result.response.success);
    assert_eq!(result.response.action, ResponseAction::ShowAnalysis);
    assert_eq!(result.response.response, "Monday");
    assert_eq!(result.response.payload["conversation_id"], "c-mike");
    assert_eq!(result.tools_invoked, 1);
}

#[tokio::test]
async fn question_spanning_conversations_asks_which_then_answers() {
    let ai = MockAIProvider::new()
        .with_response_for(
            CompletionPurpose::Planning,
            r#"[{"tool": "analyze_conversations_multi", "parameters": {"query": "project deadline"}}]"#,
        )
        .with_response_for(
            CompletionPurpose::Extraction,
            r#"{"answer": "Still Monday", "confidence": 0.7, "supporting_message_ids": []}"#,
        );
    let world = World::new(ai).await;
    world
        .store
        .add_message_at(
            &cid("c-john-smith"),
            &uid("u-john-smith"),
            "Is the project deadline still Monday?",
            Timestamp::now().minus_hours(1),
        )
        .await
        .unwrap();
    let handler = world.handler(OrchestratorSettings::default());

    let first = handler.handle(command("What did people say about the project deadline?")).await;

    assert_eq!(first.response.action, ResponseAction::ShowClarification);
    assert_eq!(first.response.payload["reason"], reasons::MULTIPLE_CONVERSATIONS);
    let choices = options(&first.response.payload);
    assert_eq!(choices.len(), 2);
    assert_eq!(world.ai.call_count_for(CompletionPurpose::Extraction), 0);

    let john = choices.iter().find(|o| o.id == "c-john-smith").unwrap();
    let mut resume = command("What did people say about the project deadline?");
    resume.context = resume
        .context
        .with_clarification_response(pick(john, reasons::MULTIPLE_CONVERSATIONS));
    let second = handler.handle(resume).await;

    assert!(second.response.success);
    assert_eq!(second.response.action, ResponseAction::ShowAnalysis);
    assert_eq!(second.response.payload["conversation_id"], "c-john-smith");
    assert_eq!(second.response.payload["answer"], "Still Monday");
    assert_eq!(world.ai.call_count_for(CompletionPurpose::Planning), 1);
}

#[tokio::test]
async fn steps_after_a_conversation_choice_still_run() {
    let ai = MockAIProvider::new()
        .with_response_for(
            CompletionPurpose::Planning,
            r#"[{"tool": "analyze_conversations_multi", "parameters": {"query": "project deadline"}},
                {"tool": "send_message", "parameters": {"conversation_id": "$prev.conversation_id", "content": "Thanks for the reminder"}}]"#,
        )
        .with_response_for(
            CompletionPurpose::Extraction,
            r#"{"answer": "Monday", "confidence": 0.8, "supporting_message_ids": []}"#,
        );
    let world = World::new(ai).await;
    world
        .store
        .add_message_at(
            &cid("c-john-smith"),
            &uid("u-john-smith"),
            "Is the project deadline still Monday?",
            Timestamp::now().minus_hours(1),
        )
        .await
        .unwrap();
    let handler = world.handler(OrchestratorSettings::default());
    let text = "Check the project deadline and thank whoever mentioned it";

    let first = handler.handle(command(text)).await;
    let choices = options(&first.response.payload);
    let john = choices.iter().find(|o| o.id == "c-john-smith").unwrap();
    let pending: Vec<_> = john.resume_steps().iter().map(|s| s.name().to_string()).collect();
    assert_eq!(pending, vec!["analyze_conversation", "send_message"]);

    let mut resume = command(text);
    resume.context = resume
        .context
        .with_clarification_response(pick(john, reasons::MULTIPLE_CONVERSATIONS));
    let second = handler.handle(resume).await;

    assert!(second.response.success, "{:?}", second.response);
    assert_eq!(second.tools_invoked, 2);
    let sent = world.store.messages_in(&cid("c-john-smith")).await;
    assert_eq!(sent.last().unwrap().content, "Thanks for the reminder");
}

#[tokio::test]
async fn index_outage_is_flagged_on_conversation_choices() {
    let ai = MockAIProvider::new().with_response_for(
        CompletionPurpose::Planning,
        r#"[{"tool": "analyze_conversations_multi", "parameters": {"query": "project deadline"}}]"#,
    );
    let world = World::new(ai).await;
    world.index.set_available(false);

    let result = world
        .handler(OrchestratorSettings::default())
        .handle(command("When is the project deadline?"))
        .await;

    assert_eq!(result.response.action, ResponseAction::ShowClarification);
    assert_eq!(result.response.payload["reason"], reasons::MULTIPLE_CONVERSATIONS);
    assert_eq!(result.response.payload["metadata"]["retrieval_degraded"], json!(true));
}

#[tokio::test]
async fn index_outage_still_answers_from_recent_messages() {
    let ai = MockAIProvider::new()
        .with_response_for(
            CompletionPurpose::Planning,
            r#"[{"tool": "analyze_conversation", "parameters": {"conversation_id": "c-sarah", "query": "When is dinner?"}}]"#,
        )
        .with_response_for(
            CompletionPurpose::Extraction,
            r#"{"answer": "Friday at 7", "confidence": 0.6, "supporting_message_ids": []}"#,
        );
    let world = World::new(ai).await;
    world.index.set_available(false);

    let mut cmd = command("When is dinner?");
    cmd.context = AppContext::new(ME, Screen::Conversation).with_conversation("c-sarah");
    let result = world.handler(OrchestratorSettings::default()).handle(cmd).await;

    assert!(result.response.success);
    assert_eq!(result.response.payload["answer"], "Friday at 7");
    assert_eq!(result.response.payload["metadata"]["retrieval_degraded"], json!(true));

    let extraction = world
        .ai
        .get_calls()
        .into_iter()
        .find(|c| c.purpose() == CompletionPurpose::Extraction)
        .unwrap();
    assert!(extraction.messages.iter().any(|m| m.content.contains("Luigi's")));
}

#[tokio::test]
async fn slow_tool_times_out() {
    let ai = MockAIProvider::new()
        .with_delay(Duration::from_millis(300))
        .with_response_for(
            CompletionPurpose::Planning,
            r#"[{"tool": "summarize_conversation", "parameters": {"conversation_id": "c-sarah"}}]"#,
        );
    let world = World::new(ai).await;
    let settings = OrchestratorSettings {
        planner_timeout: Duration::from_secs(5),
        tool_timeout: Duration::from_millis(50),
        ..OrchestratorSettings::default()
    };

    let result = world.handler(settings).handle(command("Summarize my chat with Sarah")).await;

    assert!(!result.response.success);
    assert_eq!(result.response.action, ResponseAction::ShowError);
    assert_eq!(result.response.payload["code"], "timeout");
    assert_eq!(result.tools_invoked, 1);
    assert_eq!(result.chain_state, Some(ChainState::Failed));
}
