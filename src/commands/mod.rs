pub mod add;
pub mod check;
pub mod dep;
pub mod done;
pub mod graph;
pub mod init;
pub mod list;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use stepgraph::StepGraph;
use stepgraph::parser::load_steps;

pub fn steps_path(dir: &Path) -> PathBuf {
    dir.join("steps.jsonl")
}

/// Load the step store from the given directory.
/// Returns the graph and the path to the steps file (needed for save_steps).
pub fn load_store(dir: &Path) -> Result<(StepGraph, PathBuf)> {
    let path = steps_path(dir);
    if !path.exists() {
        anyhow::bail!("Stepgraph not initialized. Run 'sg init' first.");
    }
    let graph = load_steps(&path).context("Failed to load steps")?;
    Ok((graph, path))
}
