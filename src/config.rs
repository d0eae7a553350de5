//! # Engine Configuration
//!
//! Immutable configuration for a capture engine instance: board geometry,
//! adjacency tolerances, cascade timing and the capture border colors used
//! by the ownership classifier.
//!
//! All fields are public so hosts and tests can tune individual values
//! after construction; `validate` re-checks a hand-edited config.

use crate::piece::{Color, Side, Vec2};

/// Immutable engine configuration.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Number of cell columns.
    pub cols: usize,
    /// Number of cell rows.
    pub rows: usize,
    /// World position of the center of cell (row 0, col 0).
    pub origin: Vec2,
    /// Distance between the centers of two adjacent cells.
    pub cell_size: f32,

    // Adjacency tolerances
    /// Expected center distance between two adjacent pieces.
    pub adjacent_distance: f32,
    /// Allowed deviation from `adjacent_distance` along the dominant axis.
    pub distance_tolerance: f32,
    /// Allowed offset on the perpendicular axis for two pieces to count as
    /// aligned.
    pub alignment_tolerance: f32,

    // Cascade timing (seconds of engine clock)
    /// One-time delay before the first capture of a chain.
    pub base_capture_delay: f32,
    /// Ripple delay per unit of distance from the chain's trigger point.
    pub ripple_delay_per_unit: f32,
    /// Settle delay between a capture and the recheck of its neighbors.
    pub settle_delay: f32,

    // Capture border colors
    /// Border repaint applied to pieces captured by side A.
    pub capture_color_a: Color,
    /// Border repaint applied to pieces captured by side B.
    pub capture_color_b: Color,
    /// Per-channel tolerance when matching a border color to a side.
    pub color_tolerance: f32,
}

impl EngineConfig {
    /// Standard 4x4 board with unit cells at the world origin.
    pub fn standard() -> Result<Self, String> {
        Self::with_dims(4, 4)
    }

    /// Config for an arbitrary `cols x rows` board.
    ///
    /// # Arguments
    /// * `cols` - Number of cell columns (at least 1)
    /// * `rows` - Number of cell rows (at least 1)
    pub fn with_dims(cols: usize, rows: usize) -> Result<Self, String> {
        let config = EngineConfig {
            cols,
            rows,
            origin: Vec2::new(0.0, 0.0),
            cell_size: 1.0,
            adjacent_distance: 1.0,
            distance_tolerance: 0.1,
            alignment_tolerance: 0.5,
            base_capture_delay: 0.25,
            ripple_delay_per_unit: 0.15,
            settle_delay: 0.4,
            capture_color_a: Color::new(0.2, 0.4, 1.0),
            capture_color_b: Color::new(1.0, 0.25, 0.2),
            color_tolerance: 0.05,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the config invariants. Constructors call this; hosts that
    /// tweak public fields afterwards should call it again.
    pub fn validate(&self) -> Result<(), String> {
        if self.cols == 0 || self.rows == 0 {
            return Err(format!(
                "Board must have at least one cell, got {}x{}",
                self.cols, self.rows
            ));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(format!("Cell size must be positive, got {}", self.cell_size));
        }
        if !(self.adjacent_distance.is_finite() && self.adjacent_distance > 0.0) {
            return Err(format!(
                "Adjacent distance must be positive, got {}",
                self.adjacent_distance
            ));
        }
        if self.distance_tolerance < 0.0 || self.distance_tolerance >= self.adjacent_distance {
            return Err(format!(
                "Distance tolerance {} must be in [0, {})",
                self.distance_tolerance, self.adjacent_distance
            ));
        }
        // Alignment must not overlap the distance band, otherwise a single
        // offset could qualify on both axes at once.
        if self.alignment_tolerance < 0.0
            || self.alignment_tolerance >= self.adjacent_distance - self.distance_tolerance
        {
            return Err(format!(
                "Alignment tolerance {} must be in [0, {})",
                self.alignment_tolerance,
                self.adjacent_distance - self.distance_tolerance
            ));
        }
        for (name, value) in [
            ("base_capture_delay", self.base_capture_delay),
            ("ripple_delay_per_unit", self.ripple_delay_per_unit),
            ("settle_delay", self.settle_delay),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("{} must be non-negative, got {}", name, value));
            }
        }
        if self.color_tolerance < 0.0 || self.color_tolerance >= 0.5 {
            return Err(format!(
                "Color tolerance {} must be in [0, 0.5)",
                self.color_tolerance
            ));
        }
        if self
            .capture_color_a
            .approx_eq(self.capture_color_b, self.color_tolerance * 2.0)
        {
            return Err("Capture colors for the two sides are indistinguishable".to_string());
        }
        Ok(())
    }

    /// Total number of cells on the board.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Border color repainted onto pieces captured by `side`.
    #[inline]
    pub fn capture_color(&self, side: Side) -> Color {
        match side {
            Side::A => self.capture_color_a,
            Side::B => self.capture_color_b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_is_valid() {
        let config = EngineConfig::standard().unwrap();
        assert_eq!(config.cols, 4);
        assert_eq!(config.rows, 4);
        assert_eq!(config.cell_count(), 16);
    }

    #[test]
    fn zero_dims_rejected() {
        assert!(EngineConfig::with_dims(0, 4).is_err());
        assert!(EngineConfig::with_dims(4, 0).is_err());
    }

    #[test]
    fn overlapping_tolerances_rejected() {
        let mut config = EngineConfig::standard().unwrap();
        config.alignment_tolerance = 0.95;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_delay_rejected() {
        let mut config = EngineConfig::standard().unwrap();
        config.settle_delay = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn capture_color_lookup() {
        let config = EngineConfig::standard().unwrap();
        assert_eq!(config.capture_color(Side::A), config.capture_color_a);
        assert_eq!(config.capture_color(Side::B), config.capture_color_b);
    }
}
