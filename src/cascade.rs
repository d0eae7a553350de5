//! # Cascade Scheduler
//!
//! The state machine that turns a placement into an ordered, timed
//! sequence of captures.
//!
//! ## Resolution model
//!
//! A placement is evaluated against its orthogonal neighbors in both
//! directions: neighbors that lose become capture candidates, and the
//! placed piece itself becomes a candidate if a neighbor beats it. The
//! candidate set is sorted by distance from the trigger point and resolved
//! on the engine timeline: one base delay before the first capture, then a
//! ripple delay proportional to the distance gap between consecutive
//! candidates. Each capture is followed by a settle delay, after which the
//! captured piece's neighbors are rechecked for secondary captures; any
//! found start a sub-chain that recurses into the same schedule.
//!
//! ## Protections
//!
//! Rechecks skip pieces already inside the current chain (the cycle guard
//! that bounds every cascade) and pieces placed during the current turn.
//! Neither protection applies to the direct battle of a placement.
//!
//! ## Timeline
//!
//! Delays are cooperative yield points, not blocking waits: entries sit in
//! a queue ordered by `(due time, sequence)` and fire as the host advances
//! the engine clock. Processing uses each entry's own due time as "now",
//! so the capture sequence is identical no matter how the host batches its
//! clock advances.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::adjacency::find_orthogonal_neighbors;
use crate::battle::{evaluate, BattleOutcome};
use crate::config::EngineConfig;
use crate::events::EngineEvent;
use crate::metrics::EngineMetrics;
use crate::ownership::side_of;
use crate::piece::{Direction, PieceId, Side};
use crate::registry::BoardRegistry;
use crate::turn::TurnTracker;

/// Observable scheduler phase. Coarse by design: it reflects the most
/// recent transition, and `Idle` holds exactly when no chain is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    CollectingCandidates,
    Scheduling,
    Resolving,
    AwaitingAnimation,
    Rechecking,
}

/// A pending capture: who takes which piece, at what distance from the
/// chain's trigger point, across which facing edge. Produced by battle
/// evaluation, consumed once by the scheduler, then discarded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureCandidate {
    pub target: PieceId,
    pub captor: Side,
    pub distance: f32,
    pub direction: Direction,
}

/// One level of an in-flight cascade.
#[derive(Debug)]
struct Chain {
    parent: Option<u32>,
    /// Piece whose capture spawned this chain; `None` for the root chain
    /// of a placement. Leaves the in-chain set when this chain completes.
    origin_piece: Option<PieceId>,
    /// Nesting depth below the placement that started the cascade.
    depth: usize,
    /// Pending timeline entries plus live child chains. The chain
    /// completes when this returns to zero.
    outstanding: u32,
}

#[derive(Debug)]
enum TimelineAction {
    Resolve {
        chain: u32,
        candidate: CaptureCandidate,
    },
    Recheck {
        chain: u32,
        piece: PieceId,
    },
}

#[derive(Debug)]
struct TimelineEntry {
    due: f64,
    seq: u64,
    action: TimelineAction,
}

impl PartialEq for TimelineEntry {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for TimelineEntry {}

impl PartialOrd for TimelineEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimelineEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.due
            .total_cmp(&other.due)
            .then(self.seq.cmp(&other.seq))
    }
}

/// The cascade scheduler: collects candidates, sequences them on the
/// timeline, applies captures and recurses into sub-chains.
#[derive(Debug)]
pub struct CascadeScheduler {
    clock: f64,
    seq: u64,
    timeline: BinaryHeap<Reverse<TimelineEntry>>,
    chains: HashMap<u32, Chain>,
    next_chain_id: u32,
    active_chains: u32,
    /// Cycle guard: pieces scheduled or captured in the current cascade.
    /// Cleared when the active-chain counter returns to zero.
    in_chain: HashSet<PieceId>,
    state: SchedulerState,
}

impl CascadeScheduler {
    pub fn new() -> Self {
        CascadeScheduler {
            clock: 0.0,
            seq: 0,
            timeline: BinaryHeap::new(),
            chains: HashMap::new(),
            next_chain_id: 0,
            active_chains: 0,
            in_chain: HashSet::new(),
            state: SchedulerState::Idle,
        }
    }

    /// Whether any chain is still resolving. The game-end checker defers
    /// its verdict while this is true.
    #[inline]
    pub fn chains_in_progress(&self) -> bool {
        self.active_chains > 0
    }

    #[inline]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    #[inline]
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Due time of the next timeline entry, if any.
    pub fn next_due(&self) -> Option<f64> {
        self.timeline.peek().map(|entry| entry.0.due)
    }

    // ========================================================================
    // CANDIDATE COLLECTION
    // ========================================================================

    /// Evaluate a fresh placement against its neighbors and start the root
    /// chain of the cascade, if any battle produced a capture.
    pub fn on_placement(
        &mut self,
        placed: PieceId,
        registry: &BoardRegistry,
        config: &EngineConfig,
        metrics: &EngineMetrics,
    ) {
        self.state = SchedulerState::CollectingCandidates;

        let candidates = self.collect_direct_candidates(placed, registry, config, metrics);
        let now = self.clock;
        self.begin_chain(now, None, None, candidates, config, metrics);

        if self.active_chains == 0 {
            self.state = SchedulerState::Idle;
        }
    }

    /// Direct battles triggered by a placement.
    ///
    /// Every opposite-side orthogonal neighbor battles the placed piece:
    /// a losing neighbor becomes a candidate for the placing side, and a
    /// winning neighbor makes the placed piece itself a candidate. No
    /// turn protection applies here; that guard is for cascade steps.
    fn collect_direct_candidates(
        &mut self,
        placed: PieceId,
        registry: &BoardRegistry,
        config: &EngineConfig,
        metrics: &EngineMetrics,
    ) -> Vec<CaptureCandidate> {
        let mut candidates = Vec::new();
        let piece = match registry.get(placed) {
            Some(piece) => piece,
            None => return candidates,
        };
        let placing_side = side_of(piece, config);

        for neighbor in find_orthogonal_neighbors(piece.position, Some(placed), registry, config) {
            let other = match registry.get(neighbor.id) {
                Some(other) => other,
                None => continue,
            };
            let outcome = evaluate(piece, other, neighbor.direction, config);
            if outcome.is_some() {
                metrics.record_battle();
            }
            match outcome {
                Some(BattleOutcome::AttackerWins) => candidates.push(CaptureCandidate {
                    target: neighbor.id,
                    captor: placing_side,
                    distance: neighbor.distance,
                    direction: neighbor.direction,
                }),
                Some(BattleOutcome::DefenderWins) => candidates.push(CaptureCandidate {
                    target: placed,
                    captor: side_of(other, config),
                    distance: neighbor.distance,
                    direction: neighbor.direction.opposite(),
                }),
                Some(BattleOutcome::Tie) | None => {}
            }
        }

        candidates
    }

    /// Secondary battles around a freshly captured piece.
    ///
    /// Skips neighbors already in the current chain (cycle guard) and
    /// neighbors placed this turn; same-side pairs never battle.
    fn collect_recheck_candidates(
        &self,
        captured: PieceId,
        registry: &BoardRegistry,
        turn: &TurnTracker,
        config: &EngineConfig,
        metrics: &EngineMetrics,
    ) -> Vec<CaptureCandidate> {
        let mut candidates = Vec::new();
        let piece = match registry.get(captured) {
            Some(piece) => piece,
            None => return candidates,
        };
        let attacker_side = side_of(piece, config);

        for neighbor in find_orthogonal_neighbors(piece.position, Some(captured), registry, config)
        {
            if self.in_chain.contains(&neighbor.id) {
                continue;
            }
            if turn.is_protected(neighbor.id) {
                continue;
            }
            let other = match registry.get(neighbor.id) {
                Some(other) => other,
                None => continue,
            };
            let outcome = evaluate(piece, other, neighbor.direction, config);
            if outcome.is_some() {
                metrics.record_battle();
            }
            if let Some(BattleOutcome::AttackerWins) = outcome {
                candidates.push(CaptureCandidate {
                    target: neighbor.id,
                    captor: attacker_side,
                    distance: neighbor.distance,
                    direction: neighbor.direction,
                });
            }
        }

        candidates
    }

    // ========================================================================
    // SCHEDULING
    // ========================================================================

    /// Sort candidates by distance from the trigger point and lay them out
    /// on the timeline as a new chain starting at `now`. Empty candidate
    /// sets start nothing.
    ///
    /// `now` is the trigger instant (the placement clock, or the due time
    /// of the recheck that spawned a sub-chain), so schedules never depend
    /// on how far the host's last clock batch overshot.
    #[allow(clippy::too_many_arguments)]
    fn begin_chain(
        &mut self,
        now: f64,
        parent: Option<u32>,
        origin_piece: Option<PieceId>,
        mut candidates: Vec<CaptureCandidate>,
        config: &EngineConfig,
        metrics: &EngineMetrics,
    ) {
        if candidates.is_empty() {
            return;
        }
        self.state = SchedulerState::Scheduling;

        // Stable sort: equal distances keep discovery order.
        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let chain_id = self.next_chain_id;
        self.next_chain_id += 1;
        let depth = parent
            .map(|id| self.chain(id).depth + 1)
            .unwrap_or(0);

        self.active_chains += 1;
        metrics.record_chain_started(depth);

        for candidate in &candidates {
            self.in_chain.insert(candidate.target);
        }

        // Absolute due times: base delay before the first capture, then a
        // ripple gap proportional to the distance step.
        let outstanding = candidates.len() as u32;
        let mut due = now
            + config.base_capture_delay as f64
            + candidates[0].distance as f64 * config.ripple_delay_per_unit as f64;
        let mut previous_distance = candidates[0].distance;
        for candidate in candidates {
            let gap = (candidate.distance - previous_distance).max(0.0);
            due += gap as f64 * config.ripple_delay_per_unit as f64;
            previous_distance = candidate.distance;
            self.schedule(
                due,
                TimelineAction::Resolve {
                    chain: chain_id,
                    candidate,
                },
            );
        }

        self.chains.insert(
            chain_id,
            Chain {
                parent,
                origin_piece,
                depth,
                outstanding,
            },
        );
        if let Some(parent_id) = parent {
            self.chain_mut(parent_id).outstanding += 1;
        }
    }

    fn schedule(&mut self, due: f64, action: TimelineAction) {
        let seq = self.seq;
        self.seq += 1;
        self.timeline.push(Reverse(TimelineEntry { due, seq, action }));
    }

    // ========================================================================
    // CLOCK ADVANCEMENT
    // ========================================================================

    /// Advance the engine clock by `dt`, firing every timeline entry that
    /// falls due.
    #[allow(clippy::too_many_arguments)]
    pub fn advance(
        &mut self,
        dt: f64,
        registry: &mut BoardRegistry,
        turn: &TurnTracker,
        config: &EngineConfig,
        events: &mut VecDeque<EngineEvent>,
        metrics: &EngineMetrics,
    ) {
        let target = self.clock + dt.max(0.0);
        self.advance_to(target, registry, turn, config, events, metrics);
    }

    /// Advance the engine clock to an absolute time.
    #[allow(clippy::too_many_arguments)]
    pub fn advance_to(
        &mut self,
        target: f64,
        registry: &mut BoardRegistry,
        turn: &TurnTracker,
        config: &EngineConfig,
        events: &mut VecDeque<EngineEvent>,
        metrics: &EngineMetrics,
    ) {
        if target > self.clock {
            self.clock = target;
        }

        loop {
            let due_now = match self.timeline.peek() {
                Some(Reverse(entry)) if entry.due <= self.clock => true,
                _ => false,
            };
            if !due_now {
                break;
            }
            let Reverse(entry) = self.timeline.pop().expect("peeked timeline entry vanished");
            // Follow-on delays are measured from the entry's own due time,
            // not from wherever the host's clock batch landed.
            let now = entry.due;
            match entry.action {
                TimelineAction::Resolve { chain, candidate } => {
                    self.resolve(now, chain, candidate, registry, config, events, metrics);
                    self.finish_unit(chain);
                }
                TimelineAction::Recheck { chain, piece } => {
                    self.recheck(now, piece, chain, registry, turn, config, metrics);
                    self.finish_unit(chain);
                }
            }
        }
    }

    // ========================================================================
    // RESOLUTION
    // ========================================================================

    /// Apply one scheduled capture.
    ///
    /// A candidate whose target vanished, or whose target already belongs
    /// to the captor, is skipped; the rest of the chain continues.
    #[allow(clippy::too_many_arguments)]
    fn resolve(
        &mut self,
        now: f64,
        chain_id: u32,
        candidate: CaptureCandidate,
        registry: &mut BoardRegistry,
        config: &EngineConfig,
        events: &mut VecDeque<EngineEvent>,
        metrics: &EngineMetrics,
    ) {
        self.state = SchedulerState::Resolving;

        let piece = match registry.get_mut(candidate.target) {
            Some(piece) => piece,
            None => {
                eprintln!(
                    "tileclash: skipping capture of vanished piece {}",
                    candidate.target
                );
                metrics.record_candidate_skipped();
                return;
            }
        };
        if side_of(piece, config) == candidate.captor {
            // Already flipped by an overlapping chain; nothing to take.
            metrics.record_candidate_skipped();
            return;
        }

        piece.border_color = Some(config.capture_color(candidate.captor));

        events.push_back(EngineEvent::Captured {
            piece: candidate.target,
            new_owner: candidate.captor,
            direction: candidate.direction,
        });
        metrics.record_capture();

        // Let the flip animation settle before hunting for secondary
        // captures around the piece.
        self.state = SchedulerState::AwaitingAnimation;
        self.chain_mut(chain_id).outstanding += 1;
        self.schedule(
            now + config.settle_delay as f64,
            TimelineAction::Recheck {
                chain: chain_id,
                piece: candidate.target,
            },
        );
    }

    /// Recheck a captured piece's neighbors and spawn a sub-chain for any
    /// secondary captures.
    #[allow(clippy::too_many_arguments)]
    fn recheck(
        &mut self,
        now: f64,
        piece: PieceId,
        chain_id: u32,
        registry: &BoardRegistry,
        turn: &TurnTracker,
        config: &EngineConfig,
        metrics: &EngineMetrics,
    ) {
        self.state = SchedulerState::Rechecking;

        let candidates = self.collect_recheck_candidates(piece, registry, turn, config, metrics);
        if !candidates.is_empty() {
            self.begin_chain(now, Some(chain_id), Some(piece), candidates, config, metrics);
        }
    }

    // ========================================================================
    // CHAIN BOOKKEEPING
    // ========================================================================

    /// One unit of a chain's outstanding work finished.
    fn finish_unit(&mut self, chain_id: u32) {
        let outstanding = {
            let chain = self.chain_mut(chain_id);
            chain.outstanding -= 1;
            chain.outstanding
        };
        if outstanding == 0 {
            self.complete_chain(chain_id);
        }
    }

    /// A chain exhausted its candidates, rechecks and sub-chains.
    fn complete_chain(&mut self, chain_id: u32) {
        let chain = self
            .chains
            .remove(&chain_id)
            .expect("completed chain missing from chain table");
        self.active_chains -= 1;

        // The initiating piece stays guarded until its whole sub-chain is
        // exhausted, then becomes fair game for later cascades.
        if let Some(origin) = chain.origin_piece {
            self.in_chain.remove(&origin);
        }

        if self.active_chains == 0 {
            self.in_chain.clear();
            self.state = SchedulerState::Idle;
        }

        if let Some(parent) = chain.parent {
            self.finish_unit(parent);
        }
    }

    fn chain(&self, chain_id: u32) -> &Chain {
        self.chains
            .get(&chain_id)
            .expect("scheduler chain table out of sync")
    }

    fn chain_mut(&mut self, chain_id: u32) -> &mut Chain {
        self.chains
            .get_mut(&chain_id)
            .expect("scheduler chain table out of sync")
    }
}

impl Default for CascadeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "cascade_tests.rs"]
mod cascade_tests;
