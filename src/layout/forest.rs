use std::cmp::Ordering;
use std::collections::HashSet;

use super::normalize::NormalizedGraph;
use crate::step::StepId;

/// A step plus the subtrees for its dependencies drawn from the
/// next-shallower layer.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct TreeEntry {
    pub id: StepId,
    pub dependencies: Vec<TreeEntry>,
}

/// Decompose the layered graph into trees rooted at the terminal steps.
///
/// A step wanted by more than one parent is kept under whichever parent
/// reaches it first in a pre-order walk of the sorted forest; later
/// occurrences are pruned together with their subtrees, so each step
/// appears in the forest exactly once.
pub(super) fn build_forest(layers: &[Vec<StepId>], graph: &NormalizedGraph) -> Vec<TreeEntry> {
    let Some((roots, below)) = layers.split_last() else {
        return Vec::new();
    };

    // Build bottom-up, one layer at a time; entries for layer k reuse the
    // finished subtrees from layer k-1. A node's children come only from
    // the immediately preceding layer, so no deep recursion is needed.
    let mut previous: Vec<TreeEntry> = Vec::new();
    for layer in below {
        previous = layer
            .iter()
            .map(|id| TreeEntry {
                id: id.clone(),
                dependencies: claim_children(id, &previous, graph),
            })
            .collect();
    }

    let mut forest: Vec<TreeEntry> = roots
        .iter()
        .map(|id| TreeEntry {
            id: id.clone(),
            dependencies: claim_children(id, &previous, graph),
        })
        .collect();
    forest.sort_by(|a, b| attention_order(graph, &a.id, &b.id));

    prune_duplicates(&mut forest);
    forest
}

/// Child subtrees for `id`: the candidates (one finished entry per member
/// of the preceding layer) that appear in its dependency list, sorted.
fn claim_children(
    id: &StepId,
    candidates: &[TreeEntry],
    graph: &NormalizedGraph,
) -> Vec<TreeEntry> {
    let deps = graph.dependencies_of(id);
    let mut children: Vec<TreeEntry> = candidates
        .iter()
        .filter(|candidate| deps.contains(&candidate.id))
        .cloned()
        .collect();
    children.sort_by(|a, b| attention_order(graph, &a.id, &b.id));
    children
}

/// Sibling order: steps with more dependers first, shorter title on ties.
/// Remaining ties keep layer order (the sorts are stable).
fn attention_order(graph: &NormalizedGraph, a: &StepId, b: &StepId) -> Ordering {
    graph
        .depended_by_of(b)
        .len()
        .cmp(&graph.depended_by_of(a).len())
        .then(graph.title_of(a).len().cmp(&graph.title_of(b).len()))
}

/// Remove duplicate occurrences across the forest, first claim wins.
fn prune_duplicates(forest: &mut [TreeEntry]) {
    let mut claimed: HashSet<StepId> = HashSet::new();

    for tree in forest.iter_mut() {
        claimed.insert(tree.id.clone());

        // Pre-order walk with an explicit stack; children are pushed in
        // reverse so the leftmost subtree is fully processed first.
        let mut stack: Vec<&mut TreeEntry> = vec![tree];
        while let Some(node) = stack.pop() {
            let kept: Vec<TreeEntry> = node
                .dependencies
                .drain(..)
                .filter(|child| claimed.insert(child.id.clone()))
                .collect();
            node.dependencies = kept;
            for child in node.dependencies.iter_mut().rev() {
                stack.push(child);
            }
        }
    }
}
