//! # Engine Events
//!
//! One-way notifications emitted to collaborators. The animation layer
//! replays captures in emission order; the scoring collaborator counts one
//! point per capture for the new owner; the game-end checker combines
//! `BoardFull` with the chains-in-progress flag.

use crate::piece::{Direction, PieceId, Side};

/// Notification emitted by the engine, drained in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// A piece changed sides. Scoring attributes one point to `new_owner`.
    Captured {
        piece: PieceId,
        new_owner: Side,
        /// Facing direction of the winning battle, attacker toward target.
        direction: Direction,
    },
    /// Every cell is occupied. Emitted once, by the placement that filled
    /// the last cell; cascades may still be in flight.
    BoardFull,
}
