//! Deterministic grid layout for step dependency graphs.
//!
//! Turns an arbitrary (possibly cyclic, possibly malformed) list of steps
//! into a column-major grid in five stages:
//!
//! 1. Normalization: index the graph both ways, drop cycle-closing edges
//! 2. Layering: topological depth buckets, terminal steps last
//! 3. Forest: decompose the layers into trees rooted at terminal steps
//! 4. Grid: pre-order tree packing plus two compaction passes
//! 5. Resolution: invert and transpose the grid into the public `Layout`
//!
//! The whole pipeline is a pure, single-threaded computation: no I/O, no
//! shared state, identical output for identical input.

mod forest;
mod grid;
mod layering;
mod normalize;

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::step::{Step, StepId};

/// One occupied cell of the final layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutEntry {
    /// Row the step occupies within its column; gaps are allowed.
    pub row_index: usize,
    /// The step exactly as supplied by the caller.
    pub step: Step,
    /// Steps that declare this step as a dependency, after cycle removal.
    pub depended_by: Vec<StepId>,
}

/// A single column, ordered by row.
pub type LayoutColumn = Vec<LayoutEntry>;

/// Column-major layout: every retained dependency lands in an earlier
/// column than the steps that declare it.
pub type Layout = Vec<LayoutColumn>;

/// Compute the grid layout for a set of steps.
///
/// Dependency ids with no matching step are ignored; cyclic references
/// are removed structurally. Every input step appears in exactly one cell
/// of the result.
pub fn layout_steps(steps: &[Step]) -> Layout {
    let graph = normalize::normalize(steps);
    let layers = layering::assign_layers(&graph);
    let trees = forest::build_forest(&layers, &graph);

    let mut grid = grid::Grid::new();
    for tree in &trees {
        grid.add_tree(tree);
    }
    grid.pushback(&graph);
    grid.minimize_distances(&graph);

    debug!(
        steps = steps.len(),
        columns = grid.width(),
        "layout computed"
    );
    resolve(&grid, steps, &graph)
}

/// Turn the internal grid into the externally consumed layout: columns
/// come out deepest-dependency first, each entry carries its grid row and
/// the caller's step plus the computed depended-by list. Unoccupied cells
/// and fully empty columns are omitted.
fn resolve(grid: &grid::Grid, steps: &[Step], graph: &normalize::NormalizedGraph) -> Layout {
    let by_id: HashMap<&StepId, &Step> = steps.iter().map(|step| (&step.id, step)).collect();

    let mut layout = Layout::new();
    for column in grid.columns_inverted_transposed() {
        let mut resolved = LayoutColumn::new();
        for (row_index, cell) in column.into_iter().enumerate() {
            if let Some(id) = cell {
                resolved.push(LayoutEntry {
                    row_index,
                    step: by_id[id].clone(),
                    depended_by: graph.depended_by_of(id).to_vec(),
                });
            }
        }
        if !resolved.is_empty() {
            layout.push(resolved);
        }
    }

    layout
}
