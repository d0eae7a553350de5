//! # Capture Engine
//!
//! The engine facade owned by the host. It wires the board registry, the
//! turn tracker and the cascade scheduler together behind one placement
//! entry point, a clock, and an event queue.
//!
//! The engine is single-threaded by contract: the surrounding turn system
//! serializes placements, and the host drives time by calling `advance`
//! from its frame loop (or `settle` in headless use). Scheduled cascade
//! delays are cooperative yield points on that clock, so rendering keeps
//! running while a cascade ripples out.

use std::collections::VecDeque;

use ndarray::Array2;

use crate::cascade::{CascadeScheduler, SchedulerState};
use crate::config::EngineConfig;
use crate::events::EngineEvent;
use crate::metrics::EngineMetrics;
use crate::ownership::side_of;
use crate::piece::{Piece, PieceId, Side, StatBlock, Vec2};
use crate::registry::BoardRegistry;
use crate::turn::TurnTracker;

/// Capture resolution engine for one board.
#[derive(Debug)]
pub struct CaptureEngine {
    config: EngineConfig,
    registry: BoardRegistry,
    turn: TurnTracker,
    scheduler: CascadeScheduler,
    events: VecDeque<EngineEvent>,
    metrics: EngineMetrics,
}

impl CaptureEngine {
    /// Create an engine for a validated config.
    pub fn new(config: EngineConfig) -> Self {
        let registry = BoardRegistry::new(&config);
        CaptureEngine {
            config,
            registry,
            turn: TurnTracker::new(),
            scheduler: CascadeScheduler::new(),
            events: VecDeque::new(),
            metrics: EngineMetrics::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // PLACEMENT
    // ========================================================================

    /// Accept one player placement.
    ///
    /// The position is assumed final/snapped by the input layer. Invalid
    /// placements (outside the board, occupied cell, non-finite
    /// coordinates) are rejected with no state change.
    ///
    /// # Returns
    /// The id of the placed piece. Capture notifications arrive through
    /// the event queue as the cascade resolves on the engine clock.
    pub fn place(
        &mut self,
        stats: StatBlock,
        owner: Side,
        position: Vec2,
    ) -> Result<PieceId, String> {
        let id = self.registry.insert(position, stats, owner)?;
        self.turn.mark_placed_this_turn(id);

        self.scheduler
            .on_placement(id, &self.registry, &self.config, &self.metrics);

        if self.registry.is_full() {
            self.events.push_back(EngineEvent::BoardFull);
        }
        Ok(id)
    }

    // ========================================================================
    // CLOCK & EVENTS
    // ========================================================================

    /// Advance the engine clock by `dt` seconds, resolving every cascade
    /// step that falls due.
    pub fn advance(&mut self, dt: f64) {
        self.scheduler.advance(
            dt,
            &mut self.registry,
            &self.turn,
            &self.config,
            &mut self.events,
            &self.metrics,
        );
    }

    /// Run the clock forward until every in-flight chain has settled.
    /// Headless/test convenience; frame-driven hosts use `advance`.
    pub fn settle(&mut self) {
        while let Some(due) = self.scheduler.next_due() {
            self.scheduler.advance_to(
                due,
                &mut self.registry,
                &self.turn,
                &self.config,
                &mut self.events,
                &self.metrics,
            );
        }
    }

    /// Drain pending notifications in emission order.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    /// Whether any cascade is still resolving. Game-end checks wait for
    /// this to go false.
    #[inline]
    pub fn chains_in_progress(&self) -> bool {
        self.scheduler.chains_in_progress()
    }

    #[inline]
    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    #[inline]
    pub fn clock(&self) -> f64 {
        self.scheduler.clock()
    }

    // ========================================================================
    // TURN BOUNDARIES
    // ========================================================================

    /// Turn boundary notification from the turn system.
    pub fn turn_started(&mut self) {
        self.turn.clear_turn();
    }

    /// Turn boundary notification from the turn system.
    pub fn turn_ended(&mut self) {
        self.turn.clear_turn();
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    #[inline]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.registry.get(id)
    }

    /// Effective side of a piece (capture repaints win over the placer
    /// tag), or `None` for a stale id.
    pub fn side_of(&self, id: PieceId) -> Option<Side> {
        self.registry
            .get(id)
            .map(|piece| side_of(piece, &self.config))
    }

    pub fn stats_of(&self, id: PieceId) -> Option<StatBlock> {
        self.registry.get(id).map(|piece| piece.stats)
    }

    #[inline]
    pub fn piece_count(&self) -> usize {
        self.registry.occupied_count()
    }

    #[inline]
    pub fn is_board_full(&self) -> bool {
        self.registry.is_full()
    }

    /// Cell grid snapshot: piece ids, `-1` for empty cells.
    pub fn occupancy_grid(&self) -> Array2<i32> {
        self.registry.occupancy_grid()
    }

    #[inline]
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    // ========================================================================
    // EXTERNAL EFFECTS
    // ========================================================================

    /// Rewrite a piece's directional strengths (external effects do this).
    pub fn set_stats(&mut self, id: PieceId, stats: StatBlock) -> Result<(), String> {
        match self.registry.get_mut(id) {
            Some(piece) => {
                piece.stats = stats;
                Ok(())
            }
            None => Err(format!("No piece {} on the board", id)),
        }
    }

    /// Remove a piece from the board. Any capture of it still pending on
    /// the timeline is skipped when it falls due.
    pub fn remove(&mut self, id: PieceId) -> Result<(), String> {
        match self.registry.remove(id) {
            Some(_) => Ok(()),
            None => Err(format!("No piece {} on the board", id)),
        }
    }

    /// Clear the board. Pending cascade steps drain as stale skips on the
    /// next clock advance; started cascades are never aborted outright.
    pub fn clear_board(&mut self) {
        self.registry.clear();
        self.turn.clear_turn();
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
