//! Workspace containment across the file tool family.

use crate::prelude::*;
use serde_json::json;
use smith_safety::AutoLevel;
use smith_tools::{fs_tools, Tool};

#[tokio::test]
async fn every_file_tool_rejects_escaping_paths() {
    let world = World::new();
    let dir = tempfile::tempdir().unwrap();
    let ctx = world.tool_ctx(dir.path(), "implementation-1", AutoLevel::High);

    let attempts: Vec<(&str, serde_json::Value)> = vec![
        ("read_file", json!({"path": "../outside.txt"})),
        ("read_file_lines", json!({"path": "../o.txt", "start": 1, "end": 2})),
        ("write_file", json!({"path": "../../etc/pwned", "content": "x"})),
        ("append_to_file", json!({"path": "../escape.log", "content": "x"})),
        ("replace_in_file", json!({"path": "/etc/passwd", "old_text": "root", "new_text": "x"})),
        ("replace_all_in_file", json!({"path": "../f", "old_text": "a", "new_text": "b"})),
        ("move_file", json!({"from": "../steal.txt", "to": "here.txt"})),
        ("move_file", json!({"from": "here.txt", "to": "../exfil.txt"})),
        ("delete_file", json!({"path": "../../victim"})),
        ("list_files", json!({"path": ".."})),
        ("file_exists", json!({"path": "../probe"})),
        ("diff_files", json!({"a": "../a", "b": "../b"})),
    ];

    for tool in fs_tools::all() {
        for (name, params) in attempts.iter().filter(|(n, _)| *n == tool.name()) {
            let result = tool.execute(&ctx, params.clone()).await;
            assert!(!result.success, "{} accepted an escaping path", name);
            assert!(
                result.error.unwrap().contains("escapes workspace"),
                "{} failed for another reason",
                name
            );
        }
    }
}

#[tokio::test]
async fn search_tools_reject_escaping_roots() {
    let world = World::new();
    let dir = tempfile::tempdir().unwrap();
    let ctx = world.tool_ctx(dir.path(), "implementation-1", AutoLevel::High);

    let result = smith_tools::search_tools::SearchFiles
        .execute(&ctx, json!({"pattern": "x", "path": "../.."}))
        .await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("escapes workspace"));
}

#[tokio::test]
async fn paths_inside_the_workspace_are_served() {
    let world = World::new();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ok.txt"), "fine").unwrap();
    let ctx = world.tool_ctx(dir.path(), "implementation-1", AutoLevel::High);

    let result = fs_tools::ReadFile
        .execute(&ctx, json!({"path": "ok.txt"}))
        .await;
    assert!(result.success);
    assert_eq!(result.output, "fine");
}
