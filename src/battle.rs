//! # Battle Evaluator
//!
//! Decides the outcome of a battle between two adjacent pieces across
//! their shared edge. Pure and stateless: the caller supplies the pieces
//! and the facing direction, the evaluator only compares the facing stat
//! pair.

use crate::config::EngineConfig;
use crate::ownership::side_of;
use crate::piece::{Direction, Piece};

/// Outcome of a battle between two opposing pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleOutcome {
    AttackerWins,
    DefenderWins,
    /// Equal facing stats; no capture in either direction.
    Tie,
}

/// Evaluate a battle between `attacker` and an adjacent `defender`.
///
/// `direction` points from the attacker toward the defender, so the
/// attacker's `facing(direction)` stat meets the defender's
/// `facing(direction.opposite())` stat.
///
/// Same-side pairs never battle: the ownership check runs before any stat
/// comparison and short-circuits to `None`.
pub fn evaluate(
    attacker: &Piece,
    defender: &Piece,
    direction: Direction,
    config: &EngineConfig,
) -> Option<BattleOutcome> {
    if side_of(attacker, config) == side_of(defender, config) {
        return None;
    }

    let attack = attacker.stats.facing(direction);
    let defense = defender.stats.facing(direction.opposite());

    Some(if attack > defense {
        BattleOutcome::AttackerWins
    } else if defense > attack {
        BattleOutcome::DefenderWins
    } else {
        BattleOutcome::Tie
    })
}

#[cfg(test)]
#[path = "battle_tests.rs"]
mod battle_tests;
