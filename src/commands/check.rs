use anyhow::Result;
use std::path::Path;
use stepgraph::check::check_all;

use super::load_store;

pub fn run(dir: &Path, json: bool) -> Result<()> {
    let (graph, _) = load_store(dir)?;

    let result = check_all(&graph);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.cycles.is_empty() && result.orphan_refs.is_empty() {
        println!("No issues found ({} steps)", graph.len());
        return Ok(());
    }

    for cycle in &result.cycles {
        let ids: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
        println!("Cycle: {}", ids.join(" -> "));
    }
    for orphan in &result.orphan_refs {
        println!(
            "Orphan reference: '{}' depends on missing step '{}'",
            orphan.from, orphan.to
        );
    }

    if !result.ok {
        anyhow::bail!("Graph has orphan references");
    }
    Ok(())
}
