use crate::step::{StepGraph, StepId};
use serde::Serialize;
use std::collections::HashSet;

/// Result of checking the graph for issues
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    pub cycles: Vec<Vec<StepId>>,
    pub orphan_refs: Vec<OrphanRef>,
    pub ok: bool,
}

/// A dependency reference to a non-existent step
#[derive(Debug, Clone, Serialize)]
pub struct OrphanRef {
    pub from: StepId,
    pub to: StepId,
}

/// Check for cycles in step dependencies
pub fn check_cycles(graph: &StepGraph) -> Vec<Vec<StepId>> {
    let mut cycles = Vec::new();
    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for step in graph.steps() {
        if !visited.contains(&step.id) {
            find_cycles(
                graph,
                &step.id,
                &mut visited,
                &mut rec_stack,
                &mut path,
                &mut cycles,
            );
        }
    }

    cycles
}

fn find_cycles(
    graph: &StepGraph,
    id: &StepId,
    visited: &mut HashSet<StepId>,
    rec_stack: &mut HashSet<StepId>,
    path: &mut Vec<StepId>,
    cycles: &mut Vec<Vec<StepId>>,
) {
    visited.insert(id.clone());
    rec_stack.insert(id.clone());
    path.push(id.clone());

    if let Some(step) = graph.get_step(id) {
        for dep in &step.dependencies {
            if !visited.contains(dep) {
                find_cycles(graph, dep, visited, rec_stack, path, cycles);
            } else if rec_stack.contains(dep) {
                // Found a cycle - extract the cycle from path
                if let Some(pos) = path.iter().position(|x| x == dep) {
                    cycles.push(path[pos..].to_vec());
                }
            }
        }
    }

    path.pop();
    rec_stack.remove(id);
}

/// Check for dependency references to non-existent steps
pub fn check_orphans(graph: &StepGraph) -> Vec<OrphanRef> {
    let mut orphans = Vec::new();

    for step in graph.steps() {
        for dep in &step.dependencies {
            if graph.get_step(dep).is_none() {
                orphans.push(OrphanRef {
                    from: step.id.clone(),
                    to: dep.clone(),
                });
            }
        }
    }

    orphans
}

/// Run all checks and return a summary
pub fn check_all(graph: &StepGraph) -> CheckResult {
    let cycles = check_cycles(graph);
    let orphan_refs = check_orphans(graph);

    // Cycles are warnings, not errors - layout removes them structurally,
    // so only orphan refs make the graph invalid
    let ok = orphan_refs.is_empty();

    CheckResult {
        cycles,
        orphan_refs,
        ok,
    }
}
