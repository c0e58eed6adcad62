//! Occupancy grid covering the playable world.

use cinderfall_core::{CellCoord, CellState, GridConfig, Rect, Vec2, WorldBounds};

/// Fixed-resolution occupancy grid populated once from static level geometry.
///
/// A world coordinate maps to the nearest grid line by scaling and rounding,
/// so cell `(c, r)` is anchored at `(c * cell_width, r * cell_height)`. Both
/// directions clamp instead of rejecting out-of-range input.
#[derive(Clone, Debug, PartialEq)]
pub struct GridMap {
    columns: u32,
    rows: u32,
    bounds: WorldBounds,
    cells: Vec<CellState>,
}

impl GridMap {
    /// Creates an empty grid spanning the provided world bounds.
    #[must_use]
    pub fn new(grid: GridConfig, bounds: WorldBounds) -> Self {
        let count = usize::try_from(grid.columns)
            .ok()
            .zip(usize::try_from(grid.rows).ok())
            .and_then(|(columns, rows)| columns.checked_mul(rows))
            .unwrap_or(0);
        Self {
            columns: grid.columns,
            rows: grid.rows,
            bounds,
            cells: vec![CellState::Empty; count],
        }
    }

    /// Number of columns and rows.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Size of a single cell in world units.
    #[must_use]
    pub fn cell_size(&self) -> Vec2 {
        Vec2::new(
            self.bounds.width / self.columns.max(1) as f32,
            self.bounds.height / self.rows.max(1) as f32,
        )
    }

    /// Maps a world position to the nearest cell, clamped to the grid.
    #[must_use]
    pub fn world_to_grid(&self, position: Vec2) -> CellCoord {
        let scaled = position / self.cell_size();
        CellCoord::new(
            clamp_index(scaled.x.round(), self.columns),
            clamp_index(scaled.y.round(), self.rows),
        )
    }

    /// Maps a cell back to its anchor in world space, clamped to the bounds.
    #[must_use]
    pub fn grid_to_world(&self, cell: CellCoord) -> Vec2 {
        let size = self.cell_size();
        Vec2::new(
            (cell.column() as f32 * size.x).clamp(0.0, self.bounds.width),
            (cell.row() as f32 * size.y).clamp(0.0, self.bounds.height),
        )
    }

    /// Marks every cell covered by the rectangle as blocked.
    ///
    /// Returns the number of cells that were not blocked before. A rectangle
    /// smaller than a cell still blocks the cell it rounds into.
    pub fn mark_blocked(&mut self, rect: Rect) -> usize {
        let first = self.world_to_grid(rect.min());
        let last = self.world_to_grid(rect.max());
        let mut newly_blocked = 0;
        for row in first.row()..=last.row() {
            for column in first.column()..=last.column() {
                if let Some(index) = self.index(CellCoord::new(column, row)) {
                    if self.cells[index] != CellState::Blocked {
                        self.cells[index] = CellState::Blocked;
                        newly_blocked += 1;
                    }
                }
            }
        }
        newly_blocked
    }

    /// State of the cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        self.index(cell).map(|index| self.cells[index])
    }

    /// Reports whether the cell is covered by level geometry.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        self.state(cell) == Some(CellState::Blocked)
    }

    /// Row-major cell states.
    #[must_use]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Row-major index of the cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let columns = usize::try_from(self.columns).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(columns)?.checked_add(column)
    }
}

fn clamp_index(value: f32, dimension: u32) -> u32 {
    let upper = dimension.saturating_sub(1);
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= upper as f32 {
        upper
    } else {
        value as u32
    }
}
