use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn run(dir: &Path) -> Result<()> {
    if dir.exists() {
        anyhow::bail!("Stepgraph already initialized at {}", dir.display());
    }

    fs::create_dir_all(dir).context("Failed to create stepgraph directory")?;

    let steps_path = dir.join("steps.jsonl");
    fs::write(&steps_path, "").context("Failed to create steps.jsonl")?;

    println!("Initialized stepgraph at {}", dir.display());
    Ok(())
}
