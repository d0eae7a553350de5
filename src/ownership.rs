//! # Ownership Classifier
//!
//! Decides which side a piece currently belongs to. The structural
//! `placed_by` tag records who placed the piece; once a piece has been
//! captured its border is repainted in the captor's color, and the repaint
//! wins over the structural tag. A piece's effective side is whoever
//! captured it most recently, not its original placer.

use crate::config::EngineConfig;
use crate::piece::{Piece, Side};

/// Effective side of a piece.
///
/// Border-color override first: a border matching a side's capture color
/// (within `color_tolerance`) classifies the piece regardless of who
/// placed it. Unpainted pieces, and borders matching neither capture
/// color, fall back to the structural tag.
pub fn side_of(piece: &Piece, config: &EngineConfig) -> Side {
    if let Some(border) = piece.border_color {
        if border.approx_eq(config.capture_color_a, config.color_tolerance) {
            return Side::A;
        }
        if border.approx_eq(config.capture_color_b, config.color_tolerance) {
            return Side::B;
        }
    }
    piece.placed_by
}

#[cfg(test)]
#[path = "ownership_tests.rs"]
mod ownership_tests;
