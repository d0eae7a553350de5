//! # Adjacency Resolver
//!
//! Finds the orthogonal neighbors of a board position using tolerance
//! bands over continuous world coordinates. Two pieces are adjacent when
//! they are aligned on exactly one axis (within `alignment_tolerance`) and
//! separated by roughly one cell (`adjacent_distance` within
//! `distance_tolerance`) on the other. Diagonal pieces never qualify.
//!
//! The scan runs over the registry in cell order, so the returned list is
//! deterministic for a given board state.

use smallvec::SmallVec;

use crate::config::EngineConfig;
use crate::piece::{Direction, PieceId, Vec2};
use crate::registry::BoardRegistry;

/// A qualified orthogonal neighbor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub id: PieceId,
    /// Direction from the queried position toward the neighbor. The
    /// querying piece's `facing(direction)` stat faces the neighbor's
    /// `facing(direction.opposite())` stat.
    pub direction: Direction,
    /// Euclidean center distance.
    pub distance: f32,
}

/// Neighbor list on the stack; an orthogonal grid has at most four.
pub type NeighborList = SmallVec<[Neighbor; 4]>;

/// Find the orthogonal neighbors of `position`.
///
/// # Arguments
/// * `position` - Query position (usually a piece's own position)
/// * `exclude` - Piece to skip, so a piece never neighbors itself
///
/// # Returns
/// Qualified neighbors in registry scan order.
pub fn find_orthogonal_neighbors(
    position: Vec2,
    exclude: Option<PieceId>,
    registry: &BoardRegistry,
    config: &EngineConfig,
) -> NeighborList {
    let mut neighbors = NeighborList::new();

    for piece in registry.iter() {
        if Some(piece.id) == exclude {
            continue;
        }
        let dx = piece.position.x - position.x;
        let dy = piece.position.y - position.y;

        let direction = if dy.abs() <= config.alignment_tolerance && in_band(dx.abs(), config) {
            if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dx.abs() <= config.alignment_tolerance && in_band(dy.abs(), config) {
            if dy > 0.0 {
                Direction::Top
            } else {
                Direction::Down
            }
        } else {
            continue;
        };

        neighbors.push(Neighbor {
            id: piece.id,
            direction,
            distance: position.distance(piece.position),
        });
    }

    neighbors
}

/// Whether an axis offset sits inside the adjacent-distance band.
#[inline]
fn in_band(offset: f32, config: &EngineConfig) -> bool {
    (offset - config.adjacent_distance).abs() <= config.distance_tolerance
}

#[cfg(test)]
#[path = "adjacency_tests.rs"]
mod adjacency_tests;
