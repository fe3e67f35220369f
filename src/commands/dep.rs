use anyhow::{Context, Result};
use std::path::Path;
use stepgraph::check::check_cycles;
use stepgraph::parser::save_steps;
use stepgraph::step::StepId;

use super::load_store;

/// Add a dependency edge: `step` requires `dependency` first.
pub fn run_add(dir: &Path, step: &str, dependency: &str) -> Result<()> {
    if step == dependency {
        anyhow::bail!("Step '{}' cannot depend on itself", step);
    }

    let (mut graph, path) = load_store(dir)?;

    let dep_id = StepId::from(dependency);
    if !graph.contains(&dep_id) {
        anyhow::bail!("Step '{}' not found", dependency);
    }

    let step_id = StepId::from(step);
    let entry = graph
        .get_step_mut(&step_id)
        .ok_or_else(|| anyhow::anyhow!("Step '{}' not found", step))?;

    if entry.dependencies.contains(&dep_id) {
        println!("Step '{}' already depends on '{}'", step, dependency);
        return Ok(());
    }
    entry.dependencies.push(dep_id);

    // Cycles are tolerated by the layout (the closing edge is dropped at
    // render time), but worth flagging at the point they appear.
    if !check_cycles(&graph).is_empty() {
        eprintln!(
            "Warning: '{}' -> '{}' closes a dependency cycle",
            step, dependency
        );
    }

    save_steps(&graph, &path).context("Failed to save steps")?;

    println!("Step '{}' now depends on '{}'", step, dependency);
    Ok(())
}

/// Remove a dependency edge.
pub fn run_remove(dir: &Path, step: &str, dependency: &str) -> Result<()> {
    let (mut graph, path) = load_store(dir)?;

    let step_id = StepId::from(step);
    let dep_id = StepId::from(dependency);
    let entry = graph
        .get_step_mut(&step_id)
        .ok_or_else(|| anyhow::anyhow!("Step '{}' not found", step))?;

    let before = entry.dependencies.len();
    entry.dependencies.retain(|dep| dep != &dep_id);
    if entry.dependencies.len() == before {
        anyhow::bail!("Step '{}' does not depend on '{}'", step, dependency);
    }

    save_steps(&graph, &path).context("Failed to save steps")?;

    println!("Step '{}' no longer depends on '{}'", step, dependency);
    Ok(())
}
