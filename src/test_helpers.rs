use crate::parser::save_steps;
use crate::step::{Step, StepGraph, StepId};
use std::path::{Path, PathBuf};

/// Create a step with the given id and title, with all other fields defaulted.
pub fn make_step(id: &str, title: &str) -> Step {
    Step {
        id: StepId::from(id),
        title: title.to_string(),
        ..Step::default()
    }
}

/// Create a step with the given id, title, and dependency ids.
pub fn make_step_with_deps(id: &str, title: &str, deps: &[&str]) -> Step {
    Step {
        id: StepId::from(id),
        title: title.to_string(),
        dependencies: deps.iter().map(|dep| StepId::from(*dep)).collect(),
        ..Step::default()
    }
}

/// Create a `.stepgraph` directory structure at `dir`, populate it with
/// the given steps, and return the path to the steps file.
pub fn setup_store(dir: &Path, steps: Vec<Step>) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join("steps.jsonl");
    let mut graph = StepGraph::new();
    for step in steps {
        graph.add_step(step);
    }
    save_steps(&graph, &path).unwrap();
    path
}
