use std::collections::HashSet;

use tracing::debug;

use super::normalize::NormalizedGraph;
use crate::step::StepId;

/// Group steps into topological layers by backward frontier expansion.
///
/// The expansion starts from the terminal steps (nothing depends on them)
/// and walks dependency edges; the result is reversed so layer 0 holds
/// steps with no outstanding prerequisites and the final layer holds the
/// terminals. Every retained dependency of a step in layer k sits in some
/// layer < k.
pub(super) fn assign_layers(graph: &NormalizedGraph) -> Vec<Vec<StepId>> {
    let mut current: Vec<StepId> = graph
        .iter()
        .filter(|node| node.depended_by.is_empty())
        .map(|node| node.id.clone())
        .collect();

    // Frontier k+1 is the concatenation of frontier k's dependency lists,
    // duplicates included; a step reachable along paths of different
    // lengths shows up once per path until deduplication below.
    let mut frontiers: Vec<Vec<StepId>> = Vec::new();
    loop {
        let mut next: Vec<StepId> = Vec::new();
        for id in &current {
            next.extend(graph.dependencies_of(id).iter().cloned());
        }
        frontiers.push(std::mem::take(&mut current));
        if next.is_empty() {
            break;
        }
        current = next;
    }

    // Reverse to shallowest-first order, then keep only the first
    // occurrence of each step.
    let mut seen: HashSet<StepId> = HashSet::new();
    let mut layers: Vec<Vec<StepId>> = Vec::with_capacity(frontiers.len());
    for frontier in frontiers.into_iter().rev() {
        let mut kept = Vec::new();
        for id in frontier {
            if seen.insert(id.clone()) {
                kept.push(id);
            }
        }
        layers.push(kept);
    }

    debug!(layers = layers.len(), steps = seen.len(), "assigned layers");
    layers
}
