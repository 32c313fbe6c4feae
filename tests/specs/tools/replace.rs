//! Replace-exactly-once semantics.

use crate::prelude::*;
use serde_json::json;
use smith_safety::AutoLevel;
use smith_tools::{fs_tools::ReplaceInFile, Tool};

#[tokio::test]
async fn ambiguous_replacement_refuses_and_preserves_bytes() {
    let world = World::new();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("f.txt"), "foo foo\n").unwrap();
    let ctx = world.tool_ctx(dir.path(), "implementation-1", AutoLevel::High);

    let result = ReplaceInFile
        .execute(
            &ctx,
            json!({"path": "f.txt", "old_text": "foo", "new_text": "bar"}),
        )
        .await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("appears 2 times"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("f.txt")).unwrap(),
        "foo foo\n"
    );
}

#[tokio::test]
async fn zero_matches_also_refuse() {
    let world = World::new();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("f.txt"), "content\n").unwrap();
    let ctx = world.tool_ctx(dir.path(), "implementation-1", AutoLevel::High);

    let result = ReplaceInFile
        .execute(
            &ctx,
            json!({"path": "f.txt", "old_text": "ghost", "new_text": "x"}),
        )
        .await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("appears 0 times"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("f.txt")).unwrap(),
        "content\n"
    );
}

#[tokio::test]
async fn unique_match_is_replaced() {
    let world = World::new();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("f.txt"), "one foo here\n").unwrap();
    let ctx = world.tool_ctx(dir.path(), "implementation-1", AutoLevel::High);

    let result = ReplaceInFile
        .execute(
            &ctx,
            json!({"path": "f.txt", "old_text": "foo", "new_text": "bar"}),
        )
        .await;

    assert!(result.success);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("f.txt")).unwrap(),
        "one bar here\n"
    );
}
