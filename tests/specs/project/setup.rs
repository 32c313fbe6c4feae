//! Project bootstrap: `.smith/` layout, layered config, durable store.

use smith_config::{init_project_dir, store_path, Config, CONFIG_FILE_NAME};
use smith_core::{AgentId, FakeClock, Role, TaskSpec, TaskStatus};
use smith_safety::AutoLevel;
use smith_storage::Coordinator;
use std::sync::Arc;

#[test]
fn init_lays_out_the_state_dir_with_gitignore() {
    let project = tempfile::tempdir().unwrap();
    let dir = init_project_dir(project.path()).unwrap();

    let gitignore = std::fs::read_to_string(dir.join(".gitignore")).unwrap();
    assert!(gitignore.contains("smith.db"));

    // The store file lands inside the ignored directory.
    assert!(store_path(project.path()).starts_with(&dir));
}

#[test]
fn store_survives_a_process_restart() {
    let project = tempfile::tempdir().unwrap();
    init_project_dir(project.path()).unwrap();
    let db = store_path(project.path());

    let task_id = {
        let coordinator =
            Coordinator::open(&db, Arc::new(FakeClock::at(1_785_542_400_000))).unwrap();
        coordinator
            .create_task(
                TaskSpec::new("persisted", "d", Role::Planning),
                &AgentId::new("chat"),
            )
            .unwrap()
            .id
    };

    // A fresh coordinator over the same file sees the task, the
    // session, and the event log.
    let reopened = Coordinator::open(&db, Arc::new(FakeClock::at(1_785_542_500_000))).unwrap();
    let task = reopened.tasks.get(&task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Backlog);
    assert_eq!(reopened.current_session().unwrap(), task.session_id);
    assert_eq!(reopened.recent_events(0).unwrap().len(), 1);
}

#[test]
fn project_config_overrides_user_defaults_field_wise() {
    let home = tempfile::tempdir().unwrap();
    let project = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join(CONFIG_FILE_NAME),
        "provider: copilot\nmodel: gpt-4.1\nsafety_level: low\n",
    )
    .unwrap();
    let smith_dir = init_project_dir(project.path()).unwrap();
    std::fs::write(smith_dir.join(CONFIG_FILE_NAME), "safety_level: high\n").unwrap();

    let config = Config::load_layered(home.path(), &smith_dir).unwrap();
    assert_eq!(config.provider.as_deref(), Some("copilot"));
    assert_eq!(config.model.as_deref(), Some("gpt-4.1"));
    assert_eq!(config.safety_level, AutoLevel::High);
}
