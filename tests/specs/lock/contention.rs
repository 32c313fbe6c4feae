//! File-lock exclusion between concurrent agents.

use crate::prelude::*;
use serde_json::json;
use smith_core::{AgentId, CoreError, TaskId};
use smith_safety::AutoLevel;
use smith_tools::{fs_tools::ReplaceInFile, Tool};

#[test]
fn at_most_one_lock_per_path() {
    let world = World::new();
    let locks = &world.coordinator.locks;
    let path = std::path::Path::new("/w/src/a.rs");

    locks
        .acquire(path, &AgentId::new("implementation-1"), &TaskId::new("task-001"))
        .unwrap();
    let err = locks
        .acquire(path, &AgentId::new("implementation-2"), &TaskId::new("task-002"))
        .unwrap_err();
    assert!(matches!(err, CoreError::LockHeld { .. }));

    // The lock table is keyed by path: no duplicates possible.
    let held = locks.list().unwrap();
    let mut paths: Vec<_> = held.iter().map(|l| l.file_path.clone()).collect();
    paths.dedup();
    assert_eq!(paths.len(), held.len());
}

#[tokio::test]
async fn contended_edit_fails_and_leaves_the_file_untouched() {
    let world = World::new();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("src/a.rs");
    std::fs::create_dir_all(target.parent().unwrap()).unwrap();
    std::fs::write(&target, "fn original() {}\n").unwrap();

    // Agent A holds the lock for its task.
    world
        .coordinator
        .locks
        .acquire(&target, &AgentId::new("implementation-A"), &TaskId::new("task-001"))
        .unwrap();

    // Agent B's replace tool hits LockHeld with the owner named.
    let ctx_b = world
        .tool_ctx(dir.path(), "implementation-B", AutoLevel::High)
        .with_task(TaskId::new("task-002"));
    let result = ReplaceInFile
        .execute(
            &ctx_b,
            json!({"path": "src/a.rs", "old_text": "original", "new_text": "stolen"}),
        )
        .await;

    assert!(!result.success);
    let error = result.error.unwrap();
    assert!(error.contains("implementation-A"));
    assert!(error.contains("task-001"));

    // Byte-identical after B's failed attempt.
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "fn original() {}\n"
    );
}

#[test]
fn release_all_leaves_nothing_owned_by_the_agent() {
    let world = World::new();
    let locks = &world.coordinator.locks;
    let agent = AgentId::new("implementation-1");
    let rival = AgentId::new("implementation-2");

    for path in ["/w/a.rs", "/w/b.rs", "/w/c.rs"] {
        locks
            .acquire(std::path::Path::new(path), &agent, &TaskId::new("task-001"))
            .unwrap();
    }
    locks
        .acquire(std::path::Path::new("/w/d.rs"), &rival, &TaskId::new("task-002"))
        .unwrap();

    locks.release_all(&agent).unwrap();

    let held = locks.list().unwrap();
    assert!(held.iter().all(|l| l.agent_id != agent));
    assert_eq!(held.len(), 1);
}
