//! Dependency gating of the available queue.

use crate::prelude::*;
use smith_core::{AgentId, Priority, TaskSpec, TaskStatus};

#[test]
fn dependent_task_is_gated_until_dependency_is_done() {
    let world = World::new();
    let coord = &world.coordinator;

    let first = coord
        .create_task(
            TaskSpec::new("first", "d", smith_core::Role::Implementation)
                .priority(Priority::High),
            &chat_agent(),
        )
        .unwrap();
    world.clock.advance_ms(10);
    let second = coord
        .create_task(
            TaskSpec::new("second", "d", smith_core::Role::Implementation)
                .depends_on([first.id.clone()]),
            &chat_agent(),
        )
        .unwrap();

    // Before task-001 is done, available() never includes task-002.
    let available = coord.tasks.available(None).unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, first.id);

    let agent = AgentId::new("implementation-1");
    coord.tasks.claim(&first.id, &agent).unwrap();
    assert!(coord.tasks.available(None).unwrap().is_empty());

    // After completing task-001, task-002 leads the queue.
    coord.tasks.complete(&first.id, "ok", None).unwrap();
    let available = coord.tasks.available(None).unwrap();
    assert_eq!(available.first().map(|t| t.id.clone()), Some(second.id));
}

#[test]
fn available_never_returns_a_task_with_open_dependencies() {
    let world = World::new();
    let coord = &world.coordinator;

    // A chain a <- b <- c plus one free task.
    let a = coord
        .create_task(TaskSpec::new("a", "d", smith_core::Role::Testing), &chat_agent())
        .unwrap();
    let b = coord
        .create_task(
            TaskSpec::new("b", "d", smith_core::Role::Testing).depends_on([a.id.clone()]),
            &chat_agent(),
        )
        .unwrap();
    coord
        .create_task(
            TaskSpec::new("c", "d", smith_core::Role::Testing).depends_on([b.id.clone()]),
            &chat_agent(),
        )
        .unwrap();
    coord
        .create_task(TaskSpec::new("free", "d", smith_core::Role::Testing), &chat_agent())
        .unwrap();

    let agent = AgentId::new("testing-1");
    loop {
        let available = coord.tasks.available(None).unwrap();
        // The invariant under test: nothing gated is ever offered.
        for task in &available {
            for dep in &task.depends_on {
                assert_eq!(
                    coord.tasks.get(dep).unwrap().status,
                    TaskStatus::Done,
                    "{} offered with open dependency {}",
                    task.id,
                    dep
                );
            }
        }
        let Some(next) = available.into_iter().next() else {
            break;
        };
        coord.tasks.claim(&next.id, &agent).unwrap();
        coord.tasks.complete(&next.id, "ok", None).unwrap();
    }

    // Everything drained.
    assert_eq!(coord.task_stats().unwrap().done, 4);
}

#[test]
fn dependencies_must_exist_so_cycles_cannot_form() {
    let world = World::new();
    let err = world
        .coordinator
        .create_task(
            TaskSpec::new("t", "d", smith_core::Role::Planning)
                .depends_on([smith_core::TaskId::new("task-999")]),
            &chat_agent(),
        )
        .unwrap_err();
    assert!(matches!(err, smith_core::CoreError::NotFound(_)));
}
