use anyhow::Result;
use std::path::Path;

use super::load_store;

pub fn run(dir: &Path, completed: Option<bool>, json: bool) -> Result<()> {
    let (graph, _) = load_store(dir)?;

    let steps: Vec<_> = graph
        .steps()
        .filter(|step| completed.is_none_or(|wanted| step.completed == wanted))
        .collect();

    if json {
        let output: Vec<_> = steps
            .iter()
            .map(|step| {
                serde_json::json!({
                    "id": step.id,
                    "title": step.title,
                    "completed": step.completed,
                    "dependencies": step.dependencies,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if steps.is_empty() {
        println!("No steps found");
    } else {
        for step in steps {
            let marker = if step.completed { "[x]" } else { "[ ]" };
            if step.dependencies.is_empty() {
                println!("{} {}  {}", marker, step.id, step.title);
            } else {
                let deps: Vec<&str> = step.dependencies.iter().map(|d| d.as_str()).collect();
                println!(
                    "{} {}  {} (depends on: {})",
                    marker,
                    step.id,
                    step.title,
                    deps.join(", ")
                );
            }
        }
    }

    Ok(())
}
