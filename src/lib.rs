//! # tileclash
//!
//! Capture resolution and cascade scheduling engine for a turn-based
//! tile-capture board game. Pieces carry four directional strengths;
//! placing a piece battles its orthogonal neighbors, captures flip
//! ownership, and captures can chain outward in a timed, distance-ordered
//! ripple.
//!
//! The crate owns the board registry, adjacency resolution, battle
//! evaluation, ownership classification, turn protection and the cascade
//! scheduler. Rendering, input, decks and scoring live in the host; they
//! feed placements and turn boundaries in and consume capture events out.
//!
//! ## Quick Start
//!
//! ```rust
//! use tileclash::{CaptureEngine, EngineConfig, EngineEvent, Side, StatBlock, Vec2};
//!
//! let config = EngineConfig::standard().unwrap();
//! let mut engine = CaptureEngine::new(config);
//!
//! // Defender placed on a previous turn.
//! let defender = engine
//!     .place(StatBlock::new(1, 1, 1, 3), Side::B, Vec2::new(1.0, 0.0))
//!     .unwrap();
//! engine.turn_ended();
//!
//! // The attacker's right edge (5) beats the defender's left edge (3).
//! engine.turn_started();
//! engine
//!     .place(StatBlock::new(1, 5, 1, 1), Side::A, Vec2::new(0.0, 0.0))
//!     .unwrap();
//! engine.settle();
//!
//! let events = engine.drain_events();
//! assert!(matches!(
//!     events[0],
//!     EngineEvent::Captured { new_owner: Side::A, .. }
//! ));
//! assert_eq!(engine.side_of(defender), Some(Side::A));
//! ```

pub mod adjacency;
pub mod battle;
pub mod cascade;
pub mod config;
pub mod engine;
pub mod events;
pub mod metrics;
pub mod ownership;
pub mod piece;
pub mod registry;
pub mod turn;

#[cfg(feature = "python")]
mod py_api;

// Re-export the key types for convenience
pub use adjacency::{find_orthogonal_neighbors, Neighbor, NeighborList};
pub use battle::{evaluate, BattleOutcome};
pub use cascade::{CaptureCandidate, CascadeScheduler, SchedulerState};
pub use config::EngineConfig;
pub use engine::CaptureEngine;
pub use events::EngineEvent;
pub use metrics::EngineMetrics;
pub use ownership::side_of;
pub use piece::{Color, Direction, Piece, PieceId, Side, StatBlock, Vec2};
pub use registry::BoardRegistry;
pub use turn::TurnTracker;
