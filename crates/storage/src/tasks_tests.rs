// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::events::EventBus;
use crate::sessions::SessionStore;
use smith_core::{EventFilter, FakeClock, Priority, SessionId};

struct Fixture {
    tasks: TaskStore,
    sessions: SessionStore,
    bus: EventBus,
    clock: Arc<FakeClock>,
    session_id: SessionId,
}

fn fixture() -> Fixture {
    let clock = Arc::new(FakeClock::new());
    let store = Store::in_memory().unwrap();
    let sessions = SessionStore::new(store.clone(), clock.clone());
    let session_id = sessions.get_or_create().unwrap();
    Fixture {
        tasks: TaskStore::new(store.clone(), clock.clone()),
        sessions,
        bus: EventBus::new(store, clock.clone()),
        clock,
        session_id,
    }
}

fn chat() -> AgentId {
    AgentId::new("chat")
}

impl Fixture {
    fn create(&self, title: &str, role: Role) -> Task {
        self.tasks
            .create(TaskSpec::new(title, "desc", role), &self.session_id, &chat())
            .unwrap()
    }
}

#[test]
fn create_assigns_sequential_ids() {
    let fx = fixture();
    assert_eq!(fx.create("first", Role::Planning).id, "task-001");
    assert_eq!(fx.create("second", Role::Planning).id, "task-002");
}

#[test]
fn create_publishes_event_and_bumps_session() {
    let fx = fixture();
    let task = fx.create("Add parser", Role::Implementation);
    assert_eq!(task.status, TaskStatus::Backlog);

    let events = fx.bus.query(&EventFilter::since(0)).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::TaskCreated);
    assert_eq!(events[0].task_id, Some(task.id.clone()));

    let session = fx.sessions.get(&fx.session_id).unwrap();
    assert_eq!(session.task_count, 1);
    // First task titles the session.
    assert_eq!(session.title, "Add parser");
}

#[test]
fn second_task_does_not_retitle_session() {
    let fx = fixture();
    fx.create("first", Role::Planning);
    fx.create("second", Role::Planning);
    let session = fx.sessions.get(&fx.session_id).unwrap();
    assert_eq!(session.title, "first");
    assert_eq!(session.task_count, 2);
}

#[test]
fn create_rejects_unknown_dependency() {
    let fx = fixture();
    let err = fx
        .tasks
        .create(
            TaskSpec::new("t", "d", Role::Testing).depends_on([TaskId::new("task-999")]),
            &fx.session_id,
            &chat(),
        )
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[test]
fn claim_moves_to_wip() {
    let fx = fixture();
    let task = fx.create("t", Role::Implementation);
    let agent = AgentId::new("implementation-1");

    let claimed = fx.tasks.claim(&task.id, &agent).unwrap();
    assert_eq!(claimed.status, TaskStatus::Wip);
    assert_eq!(claimed.agent_id, agent);
    assert!(claimed.ownership_ok());

    let events = fx.bus.query(&EventFilter::since(0).types([EventType::TaskClaimed])).unwrap();
    assert_eq!(events.len(), 1);
}

#[test]
fn claim_of_claimed_task_is_invalid_state() {
    let fx = fixture();
    let task = fx.create("t", Role::Implementation);
    fx.tasks.claim(&task.id, &AgentId::new("implementation-1")).unwrap();

    let err = fx
        .tasks
        .claim(&task.id, &AgentId::new("implementation-2"))
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    // The winner's ownership is what readers observe.
    let task = fx.tasks.get(&task.id).unwrap();
    assert_eq!(task.agent_id, "implementation-1");
    assert_eq!(task.status, TaskStatus::Wip);
}

#[test]
fn complete_sets_result_and_timestamp() {
    let fx = fixture();
    let task = fx.create("t", Role::Implementation);
    fx.tasks.claim(&task.id, &AgentId::new("implementation-1")).unwrap();

    fx.clock.advance_ms(100);
    let memory = TaskMemory {
        learnings: "regex was enough".to_string(),
        ..TaskMemory::default()
    };
    let done = fx.tasks.complete(&task.id, "done", Some(memory)).unwrap();

    assert_eq!(done.status, TaskStatus::Done);
    assert_eq!(done.result, "done");
    assert_eq!(done.completed_at_ms, Some(fx.clock.epoch_ms()));
    assert_eq!(done.memory.learnings, "regex was enough");
    assert!(done.ownership_ok());
}

#[test]
fn complete_from_backlog_is_invalid() {
    let fx = fixture();
    let task = fx.create("t", Role::Implementation);
    let err = fx.tasks.complete(&task.id, "done", None).unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[test]
fn fail_returns_task_to_backlog_with_context() {
    let fx = fixture();
    let task = fx.create("t", Role::Implementation);
    fx.tasks.claim(&task.id, &AgentId::new("implementation-1")).unwrap();

    let memory = TaskMemory {
        blockers: vec!["fixture missing".to_string()],
        ..TaskMemory::default()
    };
    let failed = fx.tasks.fail(&task.id, "compile error", Some(memory)).unwrap();

    assert_eq!(failed.status, TaskStatus::Backlog);
    assert!(failed.agent_id.is_empty());
    assert_eq!(failed.error, "compile error");
    assert_eq!(failed.memory.blockers, vec!["fixture missing"]);

    // A different agent can now claim it.
    let reclaimed = fx.tasks.claim(&task.id, &AgentId::new("implementation-2")).unwrap();
    assert_eq!(reclaimed.agent_id, "implementation-2");
}

#[test]
fn update_status_validates_transitions() {
    let fx = fixture();
    let task = fx.create("t", Role::Review);
    fx.tasks.claim(&task.id, &AgentId::new("review-1")).unwrap();
    fx.tasks.update_status(&task.id, TaskStatus::Review).unwrap();
    fx.tasks.complete(&task.id, "approved", None).unwrap();

    let err = fx.tasks.update_status(&task.id, TaskStatus::Backlog).unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[test]
fn update_status_refuses_done() {
    // Finishing is complete()'s job: it stamps completed_at, records
    // the result, and publishes task_completed. update_status must not
    // offer a side door that skips those.
    let fx = fixture();
    let task = fx.create("t", Role::Review);
    fx.tasks.claim(&task.id, &AgentId::new("review-1")).unwrap();

    let err = fx.tasks.update_status(&task.id, TaskStatus::Done).unwrap_err();
    match err {
        CoreError::InvalidState(msg) => assert!(msg.contains("complete()")),
        other => panic!("expected InvalidState, got {:?}", other),
    }

    fx.tasks.update_status(&task.id, TaskStatus::Review).unwrap();
    let err = fx.tasks.update_status(&task.id, TaskStatus::Done).unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    // The task is untouched by the refused transitions, and completing
    // from review still satisfies the done invariants.
    assert_eq!(fx.tasks.get(&task.id).unwrap().status, TaskStatus::Review);
    let done = fx.tasks.complete(&task.id, "approved", None).unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    assert!(done.completed_at_ms.is_some());

    let completed_events = fx
        .bus
        .query(&EventFilter::since(0).types([EventType::TaskCompleted]))
        .unwrap();
    assert_eq!(completed_events.len(), 1);
}

#[test]
fn review_rework_clears_agent() {
    let fx = fixture();
    let task = fx.create("t", Role::Review);
    fx.tasks.claim(&task.id, &AgentId::new("review-1")).unwrap();
    fx.tasks.update_status(&task.id, TaskStatus::Review).unwrap();
    let reworked = fx.tasks.update_status(&task.id, TaskStatus::Backlog).unwrap();
    assert!(reworked.agent_id.is_empty());
    assert!(reworked.ownership_ok());
}

#[test]
fn available_gates_on_dependencies() {
    let fx = fixture();
    let first = fx
        .tasks
        .create(
            TaskSpec::new("first", "d", Role::Implementation).priority(Priority::High),
            &fx.session_id,
            &chat(),
        )
        .unwrap();
    fx.clock.advance_ms(10);
    fx.tasks
        .create(
            TaskSpec::new("second", "d", Role::Implementation).depends_on([first.id.clone()]),
            &fx.session_id,
            &chat(),
        )
        .unwrap();

    // Dependent task is held back while its dependency is open.
    let available = fx.tasks.available(None).unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, first.id);

    let agent = AgentId::new("implementation-1");
    fx.tasks.claim(&first.id, &agent).unwrap();
    assert!(fx.tasks.available(None).unwrap().is_empty());

    fx.tasks.complete(&first.id, "ok", None).unwrap();
    let available = fx.tasks.available(None).unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, "task-002");
}

#[test]
fn available_sorts_priority_then_age() {
    let fx = fixture();
    fx.tasks
        .create(TaskSpec::new("old-low", "d", Role::Testing), &fx.session_id, &chat())
        .unwrap();
    fx.clock.advance_ms(10);
    fx.tasks
        .create(
            TaskSpec::new("new-high", "d", Role::Testing).priority(Priority::High),
            &fx.session_id,
            &chat(),
        )
        .unwrap();
    fx.clock.advance_ms(10);
    fx.tasks
        .create(
            TaskSpec::new("newer-high", "d", Role::Testing).priority(Priority::High),
            &fx.session_id,
            &chat(),
        )
        .unwrap();

    let titles: Vec<String> = fx
        .tasks
        .available(None)
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["new-high", "newer-high", "old-low"]);
}

#[test]
fn available_filters_by_role() {
    let fx = fixture();
    fx.create("impl work", Role::Implementation);
    fx.create("test work", Role::Testing);

    let available = fx.tasks.available(Some(Role::Testing)).unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].title, "test work");
}

#[test]
fn recent_orders_by_update_time() {
    let fx = fixture();
    let a = fx.create("a", Role::Implementation);
    fx.clock.advance_ms(10);
    let b = fx.create("b", Role::Implementation);
    fx.clock.advance_ms(10);

    // Touching `a` makes it the most recent.
    fx.tasks.claim(&a.id, &AgentId::new("implementation-1")).unwrap();

    let recent = fx.tasks.recent(Some(Role::Implementation), 10).unwrap();
    assert_eq!(recent[0].id, a.id);
    assert_eq!(recent[1].id, b.id);

    let limited = fx.tasks.recent(None, 1).unwrap();
    assert_eq!(limited.len(), 1);
}

#[test]
fn list_filters_by_status() {
    let fx = fixture();
    let task = fx.create("t", Role::Implementation);
    fx.create("u", Role::Implementation);
    fx.tasks.claim(&task.id, &AgentId::new("implementation-1")).unwrap();

    assert_eq!(fx.tasks.list(Some(TaskStatus::Wip)).unwrap().len(), 1);
    assert_eq!(fx.tasks.list(Some(TaskStatus::Backlog)).unwrap().len(), 1);
    assert_eq!(fx.tasks.list(None).unwrap().len(), 2);
}

#[test]
fn get_unknown_task_is_not_found() {
    let fx = fixture();
    let err = fx.tasks.get(&TaskId::new("task-404")).unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}
