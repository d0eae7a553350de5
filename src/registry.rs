//! # Board Registry
//!
//! The authoritative index of occupied cells. Every piece on the board is
//! registered here exactly once; lookups by id, by cell and by scan order
//! all go through this index instead of rescanning the scene.
//!
//! ## Invariants
//!
//! - At most one piece per cell. Violations are fatal programming errors,
//!   not recoverable conditions.
//! - `cells` and `pieces` agree: a cell slot holds an id iff the piece
//!   table holds that id.
//! - Iteration order is cell scan order (row-major), so every consumer
//!   sees pieces in the same deterministic order.

use std::collections::HashMap;

use ndarray::Array2;

use crate::config::EngineConfig;
use crate::piece::{Piece, PieceId, Side, StatBlock, Vec2};

/// Index of occupied cells and the pieces occupying them.
#[derive(Clone, Debug)]
pub struct BoardRegistry {
    /// Cell grid, `[row, col]`, holding the occupying piece id if any.
    cells: Array2<Option<PieceId>>,
    /// Piece table keyed by id.
    pieces: HashMap<PieceId, Piece>,
    next_id: u32,
    origin: Vec2,
    cell_size: f32,
}

impl BoardRegistry {
    pub fn new(config: &EngineConfig) -> Self {
        BoardRegistry {
            cells: Array2::from_elem((config.rows, config.cols), None),
            pieces: HashMap::new(),
            next_id: 0,
            origin: config.origin,
            cell_size: config.cell_size,
        }
    }

    /// Map a world position to its cell, or `None` if it falls outside the
    /// board (or is not a finite coordinate).
    pub fn cell_of(&self, position: Vec2) -> Option<(usize, usize)> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return None;
        }
        let col = ((position.x - self.origin.x) / self.cell_size).round();
        let row = ((position.y - self.origin.y) / self.cell_size).round();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        let (rows, cols) = self.cells.dim();
        if row >= rows || col >= cols {
            return None;
        }
        Some((row, col))
    }

    /// Register a new piece.
    ///
    /// Rejects positions outside the board and destination cells that are
    /// already occupied; rejected placements change no state.
    pub fn insert(
        &mut self,
        position: Vec2,
        stats: StatBlock,
        placed_by: Side,
    ) -> Result<PieceId, String> {
        let (row, col) = self.cell_of(position).ok_or_else(|| {
            format!(
                "Position ({}, {}) is outside the board",
                position.x, position.y
            )
        })?;
        if let Some(occupant) = self.cells[[row, col]] {
            return Err(format!(
                "Cell ({}, {}) is already occupied by piece {}",
                row, col, occupant
            ));
        }

        let id = PieceId(self.next_id);
        self.next_id += 1;
        self.cells[[row, col]] = Some(id);
        self.pieces.insert(
            id,
            Piece {
                id,
                position,
                stats,
                placed_by,
                border_color: None,
            },
        );
        Ok(id)
    }

    /// Remove a piece from the board, returning it if it was present.
    pub fn remove(&mut self, id: PieceId) -> Option<Piece> {
        let piece = self.pieces.remove(&id)?;
        if let Some(cell) = self.cell_of(piece.position) {
            if self.cells[[cell.0, cell.1]] == Some(id) {
                self.cells[[cell.0, cell.1]] = None;
            }
        }
        Some(piece)
    }

    /// Remove every piece. Used on board reset.
    pub fn clear(&mut self) {
        self.cells.fill(None);
        self.pieces.clear();
    }

    #[inline]
    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(&id)
    }

    #[inline]
    pub fn contains(&self, id: PieceId) -> bool {
        self.pieces.contains_key(&id)
    }

    /// The piece occupying a cell, if any.
    ///
    /// A cell slot that references a missing piece means the registry's
    /// exclusivity bookkeeping was corrupted; that is a fatal error.
    pub fn piece_at(&self, row: usize, col: usize) -> Option<&Piece> {
        let id = self.cells[[row, col]]?;
        match self.pieces.get(&id) {
            Some(piece) => Some(piece),
            None => {
                eprintln!(
                    "ERROR: registry cell ({}, {}) references missing piece {}",
                    row, col, id
                );
                panic!("board registry invariant violation: cell occupied by unknown piece");
            }
        }
    }

    /// Iterate pieces in cell scan order (row-major). Empty cells are
    /// skipped.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> + '_ {
        let (rows, cols) = self.cells.dim();
        (0..rows)
            .flat_map(move |row| (0..cols).map(move |col| (row, col)))
            .filter_map(move |(row, col)| self.piece_at(row, col))
    }

    #[inline]
    pub fn occupied_count(&self) -> usize {
        self.pieces.len()
    }

    /// Whether every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.pieces.len() == self.cells.len()
    }

    /// Snapshot of the cell grid as piece ids, `-1` for empty cells.
    /// Exported to hosts for display and debugging.
    pub fn occupancy_grid(&self) -> Array2<i32> {
        self.cells
            .map(|slot| slot.map(|id| id.0 as i32).unwrap_or(-1))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
