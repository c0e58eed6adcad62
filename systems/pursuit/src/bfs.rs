//! Breadth-first search over the occupancy grid.

use std::collections::{HashMap, VecDeque};

use cinderfall_core::{CellCoord, CellState, Path};
use cinderfall_world::GridMap;

/// Column and row offsets explored from every cell, in discovery order.
const NEIGHBOURS: [(i64, i64); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Reusable breadth-first path search over a [`GridMap`].
///
/// Each query marks the goal on a private copy of the grid, so the world's
/// occupancy cells never see `Visited` or `Goal` markings. Buffers are kept
/// between queries to avoid reallocating on every blink.
#[derive(Debug, Default)]
pub struct GridPathfinder {
    scratch: Vec<CellState>,
    frontier: VecDeque<CellCoord>,
    parents: HashMap<CellCoord, Option<CellCoord>>,
    expanded: usize,
}

impl GridPathfinder {
    /// Finds a shortest four-directional route from `start` to `goal`.
    ///
    /// The returned path is stored goal first and still contains `start`, so
    /// the first pop yields the start cell itself. An unreachable goal, an
    /// out-of-range cell or `start == goal` all produce an empty path.
    pub fn find_path(&mut self, grid: &GridMap, start: CellCoord, goal: CellCoord) -> Path {
        self.expanded = 0;
        if start == goal {
            return Path::empty();
        }
        let (Some(start_index), Some(goal_index)) = (grid.index(start), grid.index(goal)) else {
            return Path::empty();
        };

        self.scratch.clear();
        self.scratch.extend_from_slice(grid.cells());
        self.scratch[goal_index] = CellState::Goal;
        if self.scratch[start_index] == CellState::Empty {
            self.scratch[start_index] = CellState::Visited;
        }

        self.frontier.clear();
        self.parents.clear();
        self.frontier.push_back(start);
        let _ = self.parents.insert(start, None);

        let path = self.search(grid);
        let apart = start.manhattan_distance(goal);
        debug_assert!(
            path.is_empty() || path.steps() >= apart as usize,
            "{start:?} -> {goal:?} shorter than {apart} cells"
        );
        log::debug!(
            "path search {start:?} -> {goal:?} ({apart} apart): {} steps after expanding {} cells",
            path.steps(),
            self.expanded
        );
        path
    }

    /// Number of cells dequeued by the most recent search.
    #[must_use]
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    fn search(&mut self, grid: &GridMap) -> Path {
        let (columns, rows) = grid.dimensions();
        while let Some(cell) = self.frontier.pop_front() {
            self.expanded += 1;
            let Some(index) = grid.index(cell) else {
                continue;
            };
            if self.scratch[index] == CellState::Goal {
                return self.reconstruct(cell);
            }

            for (column_step, row_step) in NEIGHBOURS {
                let Some(next) = neighbour(cell, column_step, row_step, columns, rows) else {
                    continue;
                };
                let Some(next_index) = grid.index(next) else {
                    continue;
                };
                let state = self.scratch[next_index];
                if matches!(state, CellState::Blocked | CellState::Visited)
                    || self.parents.contains_key(&next)
                {
                    continue;
                }
                if state == CellState::Empty {
                    self.scratch[next_index] = CellState::Visited;
                }
                let _ = self.parents.insert(next, Some(cell));
                self.frontier.push_back(next);
            }
        }
        Path::empty()
    }

    fn reconstruct(&self, goal: CellCoord) -> Path {
        let mut cells = vec![goal];
        let mut cursor = self.parents.get(&goal).copied().flatten();
        while let Some(cell) = cursor {
            cells.push(cell);
            cursor = self.parents.get(&cell).copied().flatten();
        }
        Path::from_goal_first(cells)
    }
}

fn neighbour(
    cell: CellCoord,
    column_step: i64,
    row_step: i64,
    columns: u32,
    rows: u32,
) -> Option<CellCoord> {
    let column = i64::from(cell.column()) + column_step;
    let row = i64::from(cell.row()) + row_step;
    if column < 0 || row < 0 || column >= i64::from(columns) || row >= i64::from(rows) {
        return None;
    }
    Some(CellCoord::new(
        u32::try_from(column).ok()?,
        u32::try_from(row).ok()?,
    ))
}
