// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! System prompt assembly.
//!
//! Worker prompts fold in the task, memory from recent same-role tasks
//! (learnings and blockers), and the tool inventory, so an agent picks
//! up where the last attempt left off.

use smith_core::{Role, Task};

fn role_charter(role: Role) -> &'static str {
    match role {
        Role::Planning => {
            "You are the planning agent. Break work into small, dependency-ordered \
             tasks with create_task; do not implement anything yourself."
        }
        Role::Implementation => {
            "You are the implementation agent. Make the code change the task asks \
             for, keeping edits minimal and consistent with the surrounding code."
        }
        Role::Testing => {
            "You are the testing agent. Write or run tests for the task's change \
             and report failures precisely. Queue follow-up tasks for bugs you find."
        }
        Role::Review => {
            "You are the review agent. Read the change, judge correctness and \
             style, and either approve or queue rework tasks with concrete notes."
        }
    }
}

/// System prompt for a worker agent about to execute `task`.
pub fn agent_system_prompt(role: Role, task: &Task, recent: &[Task], tool_inventory: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(role_charter(role));
    prompt.push_str("\n\n## Current task\n");
    prompt.push_str(&format!("{}: {}\n{}\n", task.id, task.title, task.description));
    if !task.error.is_empty() {
        prompt.push_str(&format!("\nA previous attempt failed: {}\n", task.error));
    }
    if !task.memory.learnings.is_empty() {
        prompt.push_str(&format!("\nLearnings so far: {}\n", task.memory.learnings));
    }
    if !task.memory.blockers.is_empty() {
        prompt.push_str(&format!(
            "Known blockers: {}\n",
            task.memory.blockers.join("; ")
        ));
    }

    let mut memory_lines = Vec::new();
    for other in recent.iter().filter(|t| t.id != task.id) {
        if !other.memory.learnings.is_empty() {
            memory_lines.push(format!("- {}: {}", other.id, other.memory.learnings));
        }
        for blocker in &other.memory.blockers {
            memory_lines.push(format!("- {} blocker: {}", other.id, blocker));
        }
    }
    if !memory_lines.is_empty() {
        prompt.push_str("\n## Memory from recent tasks\n");
        prompt.push_str(&memory_lines.join("\n"));
        prompt.push('\n');
    }

    prompt.push_str("\n## Tools\n");
    prompt.push_str(tool_inventory);
    prompt.push_str(
        "\n\nWork the task to completion, then reply with a short summary of \
         what you did. Reply with text only when you are finished.",
    );
    prompt
}

/// System prompt for the foreground chat session.
pub fn chat_system_prompt(tool_inventory: &str) -> String {
    format!(
        "You are smith, a coding assistant coordinating a team of background \
         agents (planning, implementation, testing, review). For substantial \
         work, enqueue tasks with create_task so agents pick them up; answer \
         small questions directly. Tools available:\n{}",
        tool_inventory
    )
}

/// System prompt for a synchronous cross-role consultation.
pub fn consult_system_prompt(role: Role) -> String {
    format!(
        "{}\n\nAnswer the following question from a teammate directly and \
         concisely. Do not use tools.",
        role_charter(role)
    )
}

#[cfg(test)]
#[path = "prompts_tests.rs"]
mod tests;
