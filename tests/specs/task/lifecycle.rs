//! Create → claim → complete, and failure retention.

use crate::prelude::*;
use smith_core::{AgentId, EventFilter, EventType, Priority, TaskMemory, TaskSpec, TaskStatus};

#[test]
fn create_and_finish_a_task() {
    let world = World::new();
    let coord = &world.coordinator;

    // create_task returns task-001 and publishes task_created with id 1.
    let task = coord
        .create_task(
            TaskSpec::new("Add parser", "Write the config parser", smith_core::Role::Implementation)
                .priority(Priority::Medium),
            &chat_agent(),
        )
        .unwrap();
    assert_eq!(task.id, "task-001");

    let created = coord.recent_events(0).unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].event_id, 1);
    assert_eq!(created[0].event_type, EventType::TaskCreated);

    // An implementation agent claims it.
    let agent = AgentId::new("implementation-1");
    let claimed = coord.tasks.claim(&task.id, &agent).unwrap();
    assert_eq!(claimed.status, TaskStatus::Wip);
    let events = coord
        .events
        .query(&EventFilter::since(0).types([EventType::TaskClaimed]))
        .unwrap();
    assert_eq!(events.len(), 1);

    // Completion records the result and memory, and the stats see it.
    coord
        .tasks
        .complete(
            &task.id,
            "done",
            Some(TaskMemory {
                learnings: "regex was enough".to_string(),
                ..TaskMemory::default()
            }),
        )
        .unwrap();

    let done = coord.tasks.get(&task.id).unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    assert_eq!(done.result, "done");
    assert_eq!(done.memory.learnings, "regex was enough");
    assert!(coord.task_stats().unwrap().done >= 1);
}

#[test]
fn wip_and_done_tasks_always_have_an_owner() {
    let world = World::new();
    let coord = &world.coordinator;
    let agent = AgentId::new("testing-1");

    let task = coord
        .create_task(
            TaskSpec::new("t", "d", smith_core::Role::Testing),
            &chat_agent(),
        )
        .unwrap();
    coord.tasks.claim(&task.id, &agent).unwrap();
    coord.tasks.complete(&task.id, "ok", None).unwrap();

    for task in coord.tasks.list(None).unwrap() {
        assert!(task.ownership_ok(), "{} violates ownership", task.id);
    }
}

#[test]
fn failure_restores_backlog_and_keeps_context_for_the_next_agent() {
    let world = World::new();
    let coord = &world.coordinator;

    let task = coord
        .create_task(
            TaskSpec::new("flaky", "d", smith_core::Role::Implementation),
            &chat_agent(),
        )
        .unwrap();
    coord
        .tasks
        .claim(&task.id, &AgentId::new("implementation-1"))
        .unwrap();
    coord
        .tasks
        .fail(
            &task.id,
            "missing fixture",
            Some(TaskMemory {
                tried_approaches: vec!["ran suite directly".to_string()],
                ..TaskMemory::default()
            }),
        )
        .unwrap();

    let failed = coord.tasks.get(&task.id).unwrap();
    assert_eq!(failed.status, TaskStatus::Backlog);
    assert!(failed.agent_id.is_empty());
    assert_eq!(failed.error, "missing fixture");

    // A different agent claims it and sees the retained memory.
    let retry = coord
        .tasks
        .claim(&task.id, &AgentId::new("implementation-2"))
        .unwrap();
    assert_eq!(retry.agent_id, "implementation-2");
    assert_eq!(retry.memory.tried_approaches, vec!["ran suite directly"]);
}

#[test]
fn first_task_titles_the_session_and_counts_accumulate() {
    let world = World::new();
    let coord = &world.coordinator;

    coord
        .create_task(
            TaskSpec::new("Ship feature X", "d", smith_core::Role::Planning),
            &chat_agent(),
        )
        .unwrap();
    coord
        .create_task(
            TaskSpec::new("later", "d", smith_core::Role::Planning),
            &chat_agent(),
        )
        .unwrap();

    let session_id = coord.current_session().unwrap();
    let session = coord.sessions.get(&session_id).unwrap();
    assert_eq!(session.title, "Ship feature X");
    assert_eq!(session.task_count, 2);
}
