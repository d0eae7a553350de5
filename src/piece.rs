//! # Piece Model
//!
//! Value types shared by every engine component: sides, facing directions,
//! directional stat blocks, continuous board positions, border colors and
//! the piece record itself.
//!
//! Pieces are created when a placement is accepted and destroyed only when
//! removed by an external effect or when the board is cleared. The
//! `placed_by` tag never changes after placement; the *effective* side of a
//! piece is decided by the ownership classifier, which also looks at the
//! border color repainted on capture.

use std::fmt;

/// One of the two competing sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The opposing side.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Orthogonal facing direction between two adjacent pieces.
///
/// Directions are expressed from the attacker's point of view: a defender
/// sitting to the attacker's right is at `Direction::Right`, and the
/// attacker's right stat faces the defender's left stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All four directions in scan order.
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// The direction facing back toward the attacker.
    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// Unit world-space offset `(dx, dy)` toward this direction.
    #[inline]
    pub fn offset(self) -> (f32, f32) {
        match self {
            Direction::Top => (0.0, 1.0),
            Direction::Right => (1.0, 0.0),
            Direction::Down => (0.0, -1.0),
            Direction::Left => (-1.0, 0.0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Top => "top",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        write!(f, "{}", name)
    }
}

/// The four directional strengths carried by a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatBlock {
    pub top: u32,
    pub right: u32,
    pub down: u32,
    pub left: u32,
}

impl StatBlock {
    #[inline]
    pub fn new(top: u32, right: u32, down: u32, left: u32) -> Self {
        StatBlock {
            top,
            right,
            down,
            left,
        }
    }

    /// The strength on the edge facing `direction`.
    #[inline]
    pub fn facing(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Down => self.down,
            Direction::Left => self.left,
        }
    }
}

/// Continuous 2D world position.
///
/// Placements arrive already snapped by the input layer, but adjacency is
/// still resolved with tolerances rather than integer cell math.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// RGB border color with channels in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    #[inline]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }

    /// Per-channel comparison within `tolerance`.
    #[inline]
    pub fn approx_eq(self, other: Color, tolerance: f32) -> bool {
        (self.r - other.r).abs() <= tolerance
            && (self.g - other.g).abs() <= tolerance
            && (self.b - other.b).abs() <= tolerance
    }
}

/// Engine-assigned piece identity.
///
/// Ids are handed out monotonically and never reused, so a stale id held
/// across a removal simply fails lookup instead of aliasing another piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A piece on the board.
#[derive(Clone, Debug)]
pub struct Piece {
    pub id: PieceId,
    /// World position, fixed at placement time.
    pub position: Vec2,
    /// Current directional strengths; external effects may rewrite these.
    pub stats: StatBlock,
    /// Side that placed the piece. Never changes; the effective side of a
    /// captured piece comes from the border color instead.
    pub placed_by: Side,
    /// Border repaint applied when the piece was last captured.
    pub border_color: Option<Color>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposites_pair_up() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
        }
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(Direction::Top.opposite(), Direction::Down);
        assert_eq!(Side::A.opponent(), Side::B);
        assert_eq!(Side::B.opponent(), Side::A);
    }

    #[test]
    fn facing_picks_the_matching_edge() {
        let stats = StatBlock::new(1, 2, 3, 4);
        assert_eq!(stats.facing(Direction::Top), 1);
        assert_eq!(stats.facing(Direction::Right), 2);
        assert_eq!(stats.facing(Direction::Down), 3);
        assert_eq!(stats.facing(Direction::Left), 4);
    }

    #[test]
    fn offsets_match_directions() {
        assert_eq!(Direction::Top.offset(), (0.0, 1.0));
        assert_eq!(Direction::Down.offset(), (0.0, -1.0));
        assert_eq!(Direction::Right.offset(), (1.0, 0.0));
        assert_eq!(Direction::Left.offset(), (-1.0, 0.0));
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn color_tolerance_is_per_channel() {
        let a = Color::new(0.2, 0.4, 1.0);
        assert!(a.approx_eq(Color::new(0.24, 0.36, 1.0), 0.05));
        assert!(!a.approx_eq(Color::new(0.3, 0.4, 1.0), 0.05));
    }
}
