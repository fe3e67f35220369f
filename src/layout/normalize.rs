use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::step::{Step, StepId};

/// A step indexed for layout: its retained dependency edges plus the
/// computed reverse (depended-by) edges.
#[derive(Debug, Clone)]
pub(super) struct IndexedStep {
    pub id: StepId,
    pub title: String,
    pub dependencies: Vec<StepId>,
    pub depended_by: Vec<StepId>,
}

/// The normalized graph: indexed both ways, acyclic, insertion-ordered.
#[derive(Debug, Default)]
pub(super) struct NormalizedGraph {
    order: Vec<StepId>,
    nodes: HashMap<StepId, IndexedStep>,
}

impl NormalizedGraph {
    fn insert(&mut self, node: IndexedStep) {
        let id = node.id.clone();
        if self.nodes.insert(id.clone(), node).is_none() {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: &StepId) -> Option<&IndexedStep> {
        self.nodes.get(id)
    }

    fn get_mut(&mut self, id: &StepId) -> Option<&mut IndexedStep> {
        self.nodes.get_mut(id)
    }

    /// Iterate nodes in input order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexedStep> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn dependencies_of(&self, id: &StepId) -> &[StepId] {
        self.nodes
            .get(id)
            .map(|node| node.dependencies.as_slice())
            .unwrap_or(&[])
    }

    pub fn depended_by_of(&self, id: &StepId) -> &[StepId] {
        self.nodes
            .get(id)
            .map(|node| node.depended_by.as_slice())
            .unwrap_or(&[])
    }

    pub fn title_of(&self, id: &StepId) -> &str {
        self.nodes.get(id).map(|node| node.title.as_str()).unwrap_or("")
    }
}

/// Index the input steps and remove cycle-closing edges.
///
/// Dependency ids with no matching step are dropped here; every later
/// stage sees only edges between known steps.
pub(super) fn normalize(steps: &[Step]) -> NormalizedGraph {
    let known: HashSet<&StepId> = steps.iter().map(|step| &step.id).collect();

    let mut graph = NormalizedGraph::default();
    for step in steps {
        graph.insert(IndexedStep {
            id: step.id.clone(),
            title: step.title.clone(),
            dependencies: step
                .dependencies
                .iter()
                .filter(|dep| known.contains(dep))
                .cloned()
                .collect(),
            depended_by: Vec::new(),
        });
    }

    for step in steps {
        for dep in &step.dependencies {
            if known.contains(dep) {
                if let Some(node) = graph.get_mut(dep) {
                    node.depended_by.push(step.id.clone());
                }
            }
        }
    }

    clear_cycles(graph)
}

fn dependency_edges(node: &IndexedStep) -> &[StepId] {
    &node.dependencies
}

fn depended_by_edges(node: &IndexedStep) -> &[StepId] {
    &node.depended_by
}

/// Rebuild the graph keeping only edges that do not close a cycle.
///
/// Each edge kind is checked independently against the pre-removal graph;
/// on pathological inputs the surviving dependency and depended-by edge
/// sets can disagree.
fn clear_cycles(graph: NormalizedGraph) -> NormalizedGraph {
    let mut cleaned = NormalizedGraph::default();

    for node in graph.iter() {
        let dependencies: Vec<StepId> = node
            .dependencies
            .iter()
            .filter(|&dep| {
                let keep = !loops_back(&graph, &node.id, dep, dependency_edges);
                if !keep {
                    debug!(step = %node.id, dependency = %dep, "dropped cycle-closing dependency edge");
                }
                keep
            })
            .cloned()
            .collect();

        let depended_by: Vec<StepId> = node
            .depended_by
            .iter()
            .filter(|&dep| !loops_back(&graph, &node.id, dep, depended_by_edges))
            .cloned()
            .collect();

        cleaned.insert(IndexedStep {
            id: node.id.clone(),
            title: node.title.clone(),
            dependencies,
            depended_by,
        });
    }

    cleaned
}

/// Breadth-first reachability: does following `first` and then edges of
/// the same kind eventually arrive back at `origin`? Each node is visited
/// at most once.
fn loops_back(
    graph: &NormalizedGraph,
    origin: &StepId,
    first: &StepId,
    edges: fn(&IndexedStep) -> &[StepId],
) -> bool {
    let mut seen: HashSet<&StepId> = HashSet::new();
    let mut to_check: VecDeque<&StepId> = VecDeque::new();
    to_check.push_back(first);

    while let Some(id) = to_check.pop_front() {
        let Some(node) = graph.get(id) else { continue };
        if !seen.insert(id) {
            continue;
        }

        let next = edges(node);
        if next.contains(origin) {
            return true;
        }
        to_check.extend(next.iter());
    }

    false
}
