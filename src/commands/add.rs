use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use stepgraph::parser::save_steps;
use stepgraph::step::{Step, StepGraph, StepId};

use super::load_store;

pub fn run(
    dir: &Path,
    title: &str,
    id: Option<&str>,
    description: Option<&str>,
    depends_on: &[String],
) -> Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("Step title cannot be empty");
    }

    let (mut graph, path) = load_store(dir)?;

    let step_id = match id {
        Some(id) => {
            let step_id = StepId::from(id);
            if graph.contains(&step_id) {
                anyhow::bail!("Step '{}' already exists", id);
            }
            step_id
        }
        None => generate_id(title, &graph),
    };

    let dependencies: Vec<StepId> = depends_on
        .iter()
        .map(|dep| StepId::from(dep.as_str()))
        .collect();
    for dep in &dependencies {
        if !graph.contains(dep) {
            eprintln!(
                "Warning: dependency '{}' does not exist (tolerated, ignored by layout)",
                dep
            );
        }
    }

    let step = Step {
        id: step_id.clone(),
        title: title.to_string(),
        description: description.map(|d| d.to_string()),
        completed: false,
        dependencies,
        created_at: Some(Utc::now().to_rfc3339()),
        completed_at: None,
    };
    graph.add_step(step);

    save_steps(&graph, &path).context("Failed to save steps")?;

    println!("Added step '{}'", step_id);
    Ok(())
}

fn generate_id(title: &str, graph: &StepGraph) -> StepId {
    // Generate a slug from the title
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .take(3)
        .collect::<Vec<_>>()
        .join("-");

    let base_id = if slug.is_empty() {
        "step".to_string()
    } else {
        slug
    };

    // Ensure uniqueness
    let candidate = StepId::from(base_id.as_str());
    if !graph.contains(&candidate) {
        return candidate;
    }

    for i in 2..1000 {
        let candidate = StepId::from(format!("{}-{}", base_id, i));
        if !graph.contains(&candidate) {
            return candidate;
        }
    }

    // Fallback to timestamp
    StepId::from(format!(
        "step-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepgraph::test_helpers::make_step;

    #[test]
    fn test_id_slug_from_simple_title() {
        let graph = StepGraph::new();
        let id = generate_id("Build the widget", &graph);
        assert_eq!(id.as_str(), "build-the-widget");
    }

    #[test]
    fn test_id_slug_truncates_to_three_words() {
        let graph = StepGraph::new();
        let id = generate_id("Build the widget for the demo", &graph);
        assert_eq!(id.as_str(), "build-the-widget");
    }

    #[test]
    fn test_id_slug_strips_punctuation() {
        let graph = StepGraph::new();
        let id = generate_id("Fix: bug #42!", &graph);
        assert_eq!(id.as_str(), "fix-bug-42");
    }

    #[test]
    fn test_id_falls_back_for_empty_slug() {
        let graph = StepGraph::new();
        let id = generate_id("!!!", &graph);
        assert_eq!(id.as_str(), "step");
    }

    #[test]
    fn test_id_conflict_appends_counter() {
        let mut graph = StepGraph::new();
        graph.add_step(make_step("paint", "Paint"));
        let id = generate_id("Paint", &graph);
        assert_eq!(id.as_str(), "paint-2");
    }
}
