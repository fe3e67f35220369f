use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use stepgraph::parser::save_steps;
use stepgraph::step::StepId;

use super::load_store;

/// Set or clear a step's completed flag.
pub fn run(dir: &Path, id: &str, completed: bool) -> Result<()> {
    let (mut graph, path) = load_store(dir)?;

    let step_id = StepId::from(id);
    let step = graph
        .get_step_mut(&step_id)
        .ok_or_else(|| anyhow::anyhow!("Step '{}' not found", id))?;

    if step.completed == completed {
        let state = if completed { "done" } else { "not done" };
        println!("Step '{}' is already {}", id, state);
        return Ok(());
    }

    step.completed = completed;
    step.completed_at = completed.then(|| Utc::now().to_rfc3339());

    save_steps(&graph, &path).context("Failed to save steps")?;

    if completed {
        println!("Marked '{}' as done", id);
    } else {
        println!("Marked '{}' as to do", id);
    }
    Ok(())
}
