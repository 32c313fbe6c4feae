//! Chat → task queue → worker agent, end to end with a scripted model.

use crate::prelude::*;
use smith_core::{AgentId, EventFilter, EventType, Role, TaskId, TaskStatus};
use smith_engine::{Agent, ChatSession};
use smith_provider::{ScriptedProvider, ScriptedReply, StreamChunk};
use smith_safety::AutoLevel;
use smith_tools::ToolRegistry;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn user_request_becomes_a_completed_task() {
    let world = World::new();
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::new());
    let registry = ToolRegistry::with_builtin_tools();

    // Turn 1 (chat): the model enqueues implementation work.
    provider.push_reply(ScriptedReply::tool_call(
        "create_task",
        serde_json::json!({
            "title": "Add config parser",
            "description": "Create src/parser.rs with a parse() stub",
            "role": "implementation",
            "priority": 2
        }),
    ));
    provider.push_reply(
        ScriptedReply::text("Queued task-001 for the implementation agent.").with_usage(40, 12),
    );

    let mut chat = ChatSession::new(
        provider.clone(),
        registry.clone(),
        world.tool_ctx(dir.path(), "chat", AutoLevel::High),
    );
    let mut sink = |_: StreamChunk| {};
    let reply = chat.send_message("please add a config parser", &mut sink).await;
    assert!(reply.contains("task-001"));

    let task = world
        .coordinator
        .tasks
        .get(&TaskId::new("task-001"))
        .unwrap();
    assert_eq!(task.status, TaskStatus::Backlog);

    // Turns 2-3 (worker): the agent claims it, edits a file, reports done.
    provider.push_reply(ScriptedReply::tool_call(
        "write_file",
        serde_json::json!({"path": "src/parser.rs", "content": "pub fn parse() {}\n"}),
    ));
    provider.push_reply(ScriptedReply::text("created src/parser.rs").with_usage(80, 20));

    let agent = Agent::new(
        AgentId::new("implementation-1"),
        Role::Implementation,
        Duration::from_millis(10),
        world.coordinator.clone(),
        provider.clone(),
        registry,
        world.tool_ctx(dir.path(), "implementation-1", AutoLevel::High),
    );
    world
        .coordinator
        .registry
        .register(agent.agent_id(), Role::Implementation, 1)
        .unwrap();
    assert!(agent.iterate().await.unwrap());

    // The task finished, the edit landed, the locks are gone.
    let task = world
        .coordinator
        .tasks
        .get(&TaskId::new("task-001"))
        .unwrap();
    assert_eq!(task.status, TaskStatus::Done);
    assert_eq!(task.result, "created src/parser.rs");
    assert!(dir.path().join("src/parser.rs").exists());
    assert!(world.coordinator.locks.list().unwrap().is_empty());

    // The UI's poll sees the whole causal chain for the task.
    let types: Vec<EventType> = world
        .coordinator
        .events
        .query(&EventFilter::since(0).task(TaskId::new("task-001")))
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(types[0], EventType::TaskCreated);
    let position = |t: EventType| types.iter().position(|x| *x == t).unwrap();
    assert!(position(EventType::TaskClaimed) < position(EventType::TaskCompleted));
    assert!(position(EventType::FileLocked) < position(EventType::TaskCompleted));
    // The completion's lock sweep trails it.
    assert_eq!(types.last(), Some(&EventType::FileUnlocked));

    // Token usage from both conversations rolled into the session.
    let session = world.coordinator.current_session().unwrap();
    let usage = world.coordinator.sessions.usage(&session).unwrap();
    assert_eq!(usage.prompt_tokens, 40 + 10 + 80 + 10);
    assert_eq!(usage.completion_tokens, 12 + 5 + 20 + 5);
}

#[tokio::test]
async fn failed_attempt_leaves_retryable_work_for_the_next_agent() {
    let world = World::new();
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::new());
    let registry = ToolRegistry::with_builtin_tools();

    let task = world
        .coordinator
        .create_task(
            smith_core::TaskSpec::new("Run suite", "cargo test", Role::Testing),
            &chat_agent(),
        )
        .unwrap();

    // First agent's provider dies mid-task.
    provider.push_error("stream reset by peer");
    let first = Agent::new(
        AgentId::new("testing-1"),
        Role::Testing,
        Duration::from_millis(10),
        world.coordinator.clone(),
        provider.clone(),
        registry.clone(),
        world.tool_ctx(dir.path(), "testing-1", AutoLevel::High),
    );
    world
        .coordinator
        .registry
        .register(first.agent_id(), Role::Testing, 1)
        .unwrap();
    assert!(first.iterate().await.unwrap());

    let failed = world.coordinator.tasks.get(&task.id).unwrap();
    assert_eq!(failed.status, TaskStatus::Backlog);
    assert!(failed.error.contains("stream reset"));

    // A second agent picks the same task up and completes it.
    provider.push_reply(ScriptedReply::text("suite green"));
    let second = Agent::new(
        AgentId::new("testing-2"),
        Role::Testing,
        Duration::from_millis(10),
        world.coordinator.clone(),
        provider,
        registry,
        world.tool_ctx(dir.path(), "testing-2", AutoLevel::High),
    );
    world
        .coordinator
        .registry
        .register(second.agent_id(), Role::Testing, 2)
        .unwrap();
    assert!(second.iterate().await.unwrap());

    let done = world.coordinator.tasks.get(&task.id).unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    assert_eq!(done.agent_id, "testing-2");
}
