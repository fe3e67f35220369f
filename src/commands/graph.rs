use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;
use stepgraph::layout::{Layout, layout_steps};
use stepgraph::step::Step;

use super::load_store;

/// Output format for the graph command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Grid,
    Dot,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grid" => Ok(OutputFormat::Grid),
            "dot" => Ok(OutputFormat::Dot),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown format: {}. Use 'grid', 'dot', or 'json'.",
                s
            )),
        }
    }
}

pub fn run(dir: &Path, format: OutputFormat) -> Result<()> {
    let (graph, _) = load_store(dir)?;

    let steps: Vec<Step> = graph.steps().cloned().collect();
    let layout = layout_steps(&steps);

    let output = match format {
        OutputFormat::Grid => render_grid(&layout),
        OutputFormat::Dot => render_dot(&steps),
        OutputFormat::Json => serde_json::to_string_pretty(&layout)?,
    };
    println!("{}", output);

    Ok(())
}

const MAX_TITLE_WIDTH: usize = 24;

/// Render the layout as an aligned text table, dependencies in the
/// leftmost columns.
fn render_grid(layout: &Layout) -> String {
    if layout.is_empty() {
        return "No steps to draw".to_string();
    }

    let cell = |step: &Step| {
        let marker = if step.completed { "[x]" } else { "[ ]" };
        let mut title = step.title.clone();
        if title.chars().count() > MAX_TITLE_WIDTH {
            title = title.chars().take(MAX_TITLE_WIDTH - 1).collect::<String>() + "…";
        }
        format!("{} {}", marker, title)
    };

    let widths: Vec<usize> = layout
        .iter()
        .map(|column| {
            column
                .iter()
                .map(|entry| cell(&entry.step).chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let height = layout
        .iter()
        .flat_map(|column| column.iter().map(|entry| entry.row_index + 1))
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(height);
    for row in 0..height {
        let mut line = String::new();
        for (col, column) in layout.iter().enumerate() {
            let text = column
                .iter()
                .find(|entry| entry.row_index == row)
                .map(|entry| cell(&entry.step))
                .unwrap_or_default();
            let pad = widths[col] + 2 - text.chars().count();
            line.push_str(&text);
            line.push_str(&" ".repeat(pad));
        }
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

/// Render the steps as DOT for Graphviz.
fn render_dot(steps: &[Step]) -> String {
    let known: HashSet<&str> = steps.iter().map(|s| s.id.as_str()).collect();
    let mut lines = Vec::new();

    lines.push("digraph steps {".to_string());
    lines.push("  rankdir=LR;".to_string());
    lines.push("  node [shape=box];".to_string());
    lines.push(String::new());

    for step in steps {
        let style = if step.completed {
            "style=filled, fillcolor=lightgreen"
        } else {
            "style=filled, fillcolor=white"
        };
        let label = format!("{}\\n{}", step.id, escape_dot(&step.title));
        lines.push(format!("  \"{}\" [label=\"{}\", {}];", step.id, label, style));
    }

    lines.push(String::new());
    for step in steps {
        for dep in &step.dependencies {
            if known.contains(dep.as_str()) {
                lines.push(format!("  \"{}\" -> \"{}\";", dep, step.id));
            }
        }
    }

    lines.push("}".to_string());
    lines.join("\n")
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
