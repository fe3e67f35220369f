use std::collections::HashMap;

use super::forest::TreeEntry;
use super::normalize::NormalizedGraph;
use crate::step::StepId;

/// Sparse (column, row) placement table with a reverse id -> position index.
///
/// Column 0 holds tree roots; columns grow with tree depth. Rows and
/// columns extend on demand. Writing to an occupied cell indicates a
/// forest-stage defect and panics.
#[derive(Debug, Default)]
pub(super) struct Grid {
    rows: Vec<Vec<Option<StepId>>>,
    width: usize,
    index: HashMap<StepId, (usize, usize)>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn entry(&self, x: usize, y: usize) -> Option<&StepId> {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .and_then(|cell| cell.as_ref())
    }

    /// A cell past the current bounds counts as free; moving there extends
    /// the table.
    fn is_free(&self, x: usize, y: usize) -> bool {
        self.entry(x, y).is_none()
    }

    fn place(&mut self, id: StepId, x: usize, y: usize) {
        while y >= self.rows.len() {
            self.rows.push(Vec::new());
        }
        let row = &mut self.rows[y];
        if x >= row.len() {
            row.resize(x + 1, None);
        }
        if row.len() > self.width {
            self.width = row.len();
        }
        if let Some(existing) = &row[x] {
            panic!("grid cell ({x}, {y}) already holds '{existing}', cannot place '{id}'");
        }
        self.index.insert(id.clone(), (x, y));
        row[x] = Some(id);
    }

    fn shift(&mut self, (from_x, from_y): (usize, usize), (to_x, to_y): (usize, usize)) {
        let Some(id) = self.rows[from_y][from_x].take() else {
            panic!("no entry at ({from_x}, {from_y}) to move");
        };
        self.place(id, to_x, to_y);
    }

    /// Place a tree below everything already in the grid, pre-order.
    ///
    /// A step shares its row with its first dependency; each later sibling
    /// starts on the row after the previous subtree's last occupied row.
    pub fn add_tree(&mut self, tree: &TreeEntry) {
        let mut y = self.height();
        self.place(tree.id.clone(), 0, y);

        // (entry, column, next child index)
        let mut stack: Vec<(&TreeEntry, usize, usize)> = vec![(tree, 0, 0)];
        while let Some(frame) = stack.last_mut() {
            let (entry, x, next) = *frame;
            if next < entry.dependencies.len() {
                frame.2 += 1;
                if next > 0 {
                    y += 1;
                }
                let child = &entry.dependencies[next];
                self.place(child.id.clone(), x + 1, y);
                stack.push((child, x + 1, 0));
            } else {
                stack.pop();
            }
        }
    }

    /// Push column-0 roots as close to their dependencies as possible.
    ///
    /// A root moves to one column short of its nearest dependency, bounded
    /// by the last column; a root with no dependencies moves all the way
    /// to the last column.
    pub fn pushback(&mut self, graph: &NormalizedGraph) {
        let mut y = 0;
        while y < self.height() {
            if let Some(id) = self.entry(0, y).cloned() {
                let mut bound = self.width - 1;
                for dep in graph.dependencies_of(&id) {
                    if let Some(&(dep_x, _)) = self.index.get(dep) {
                        bound = bound.min(dep_x.saturating_sub(1));
                    }
                }
                if bound > 0 {
                    self.shift_to_column(&id, bound);
                }
            }
            y += 1;
        }
    }

    /// Greedily move each dependent step to the row nearest the average of
    /// its dependencies' rows. Columns are processed right to left so a
    /// reposition is not undone by later repositioning of the steps it
    /// depends on.
    pub fn minimize_distances(&mut self, graph: &NormalizedGraph) {
        for x in (0..self.width).rev() {
            let mut y = 0;
            while y < self.height() {
                if let Some(id) = self.entry(x, y).cloned() {
                    let rows: Vec<usize> = graph
                        .dependencies_of(&id)
                        .iter()
                        .filter_map(|dep| self.index.get(dep).map(|&(_, dep_y)| dep_y))
                        .collect();
                    if !rows.is_empty() {
                        let average = rows.iter().sum::<usize>() / rows.len();
                        self.shift_to_row(&id, average);
                    }
                }
                y += 1;
            }
        }
    }

    /// Move `id` into column `x`, at the free row nearest its current row,
    /// probing downward before upward at each distance.
    fn shift_to_column(&mut self, id: &StepId, x: usize) {
        let (from_x, from_y) = self.index[id];
        for diff in 0..=from_y {
            if self.is_free(x, from_y + diff) {
                self.shift((from_x, from_y), (x, from_y + diff));
                return;
            }
            if let Some(above) = from_y.checked_sub(diff) {
                if self.is_free(x, above) {
                    self.shift((from_x, from_y), (x, above));
                    return;
                }
            }
        }
    }

    /// Move `id` within its column to the free row nearest `target`,
    /// probing downward before upward, searching no further than the
    /// distance back to its current row.
    fn shift_to_row(&mut self, id: &StepId, target: usize) {
        let (x, from_y) = self.index[id];
        for diff in 0..target.abs_diff(from_y) {
            if self.is_free(x, target + diff) {
                self.shift((x, from_y), (x, target + diff));
                return;
            }
            if let Some(above) = target.checked_sub(diff) {
                if self.is_free(x, above) {
                    self.shift((x, from_y), (x, above));
                    return;
                }
            }
        }
    }

    /// Emit columns right to left, each top to bottom: the inverted,
    /// transposed view consumed by the resolver.
    pub fn columns_inverted_transposed(&self) -> Vec<Vec<Option<&StepId>>> {
        (0..self.width)
            .rev()
            .map(|x| (0..self.height()).map(|y| self.entry(x, y)).collect())
            .collect()
    }
}
