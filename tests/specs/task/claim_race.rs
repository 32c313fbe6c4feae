//! Exactly-once claim under contention.

use crate::prelude::*;
use smith_core::{AgentId, CoreError, TaskSpec, TaskStatus};
use std::sync::Arc;

#[test]
fn exactly_one_of_two_claimers_wins() {
    let world = World::new();
    let coord = &world.coordinator;
    let task = coord
        .create_task(
            TaskSpec::new("contested", "d", smith_core::Role::Implementation),
            &chat_agent(),
        )
        .unwrap();

    let first = coord.tasks.claim(&task.id, &AgentId::new("implementation-1"));
    let second = coord.tasks.claim(&task.id, &AgentId::new("implementation-2"));

    assert!(first.is_ok());
    match second {
        Err(CoreError::InvalidState(_)) => {}
        other => panic!("loser should see InvalidState, got {:?}", other),
    }

    // Both observe the winner's ownership in the next read.
    let observed = coord.tasks.get(&task.id).unwrap();
    assert_eq!(observed.status, TaskStatus::Wip);
    assert_eq!(observed.agent_id, "implementation-1");
}

#[test]
fn concurrent_claims_from_many_threads_have_a_single_winner() {
    let world = World::new();
    let coord = Arc::new(world.coordinator.clone());
    let task = coord
        .create_task(
            TaskSpec::new("hot", "d", smith_core::Role::Testing),
            &chat_agent(),
        )
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let coord = Arc::clone(&coord);
        let task_id = task.id.clone();
        handles.push(std::thread::spawn(move || {
            coord
                .tasks
                .claim(&task_id, &AgentId::new(format!("testing-{}", i)))
                .is_ok()
        }));
    }

    let wins: usize = handles
        .into_iter()
        .map(|h| h.join().unwrap() as usize)
        .sum();
    assert_eq!(wins, 1, "claim must succeed for exactly one agent");

    let observed = coord.tasks.get(&task.id).unwrap();
    assert_eq!(observed.status, TaskStatus::Wip);
    assert!(!observed.agent_id.is_empty());
}

#[test]
fn task_claimed_fires_at_most_once_per_task() {
    let world = World::new();
    let coord = &world.coordinator;
    let task = coord
        .create_task(
            TaskSpec::new("once", "d", smith_core::Role::Review),
            &chat_agent(),
        )
        .unwrap();

    let _ = coord.tasks.claim(&task.id, &AgentId::new("review-1"));
    let _ = coord.tasks.claim(&task.id, &AgentId::new("review-2"));

    let claims = coord
        .events
        .query(
            &smith_core::EventFilter::since(0)
                .types([smith_core::EventType::TaskClaimed])
                .task(task.id.clone()),
        )
        .unwrap();
    assert_eq!(claims.len(), 1);
}
