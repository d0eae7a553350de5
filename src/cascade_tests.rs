//! Tests for cascade collection, scheduling and resolution.

use super::*;
use crate::piece::{StatBlock, Vec2};

mod tests {
    use super::*;

    fn create_test_config() -> EngineConfig {
        EngineConfig::standard().unwrap()
    }

    /// Config with every delay zeroed so one `advance(0)` resolves a
    /// whole cascade.
    fn instant_config() -> EngineConfig {
        let mut config = create_test_config();
        config.base_capture_delay = 0.0;
        config.ripple_delay_per_unit = 0.0;
        config.settle_delay = 0.0;
        config
    }

    fn place(
        registry: &mut BoardRegistry,
        x: f32,
        y: f32,
        stats: StatBlock,
        side: Side,
    ) -> PieceId {
        registry.insert(Vec2::new(x, y), stats, side).unwrap()
    }

    fn captured_pieces(events: &VecDeque<EngineEvent>) -> Vec<PieceId> {
        events
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Captured { piece, .. } => Some(*piece),
                _ => None,
            })
            .collect()
    }

    // ========================================================================
    // Ordering & timing
    // ========================================================================

    #[test]
    fn captures_resolve_in_ascending_distance_order() {
        let config = instant_config();
        let mut registry = BoardRegistry::new(&config);
        let metrics = EngineMetrics::new();
        let turn = TurnTracker::new();
        let mut events = VecDeque::new();

        // Three isolated targets so no secondary captures muddy the order.
        let near = place(&mut registry, 0.0, 0.0, StatBlock::new(1, 1, 1, 1), Side::B);
        let far = place(&mut registry, 2.0, 0.0, StatBlock::new(1, 1, 1, 1), Side::B);
        let mid = place(&mut registry, 0.0, 2.0, StatBlock::new(1, 1, 1, 1), Side::B);

        let mut scheduler = CascadeScheduler::new();
        scheduler.begin_chain(
            0.0,
            None,
            None,
            vec![
                CaptureCandidate {
                    target: near,
                    captor: Side::A,
                    distance: 1.0,
                    direction: Direction::Left,
                },
                CaptureCandidate {
                    target: far,
                    captor: Side::A,
                    distance: 2.0,
                    direction: Direction::Left,
                },
                CaptureCandidate {
                    target: mid,
                    captor: Side::A,
                    distance: 1.5,
                    direction: Direction::Left,
                },
            ],
            &config,
            &metrics,
        );
        assert!(scheduler.chains_in_progress());

        scheduler.advance(1.0, &mut registry, &turn, &config, &mut events, &metrics);

        // [1.0, 2.0, 1.5] resolves as [1.0, 1.5, 2.0].
        assert_eq!(captured_pieces(&events), vec![near, mid, far]);
        assert!(!scheduler.chains_in_progress());
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn ripple_delays_follow_distance_gaps() {
        let config = create_test_config();
        let mut registry = BoardRegistry::new(&config);
        let metrics = EngineMetrics::new();
        let turn = TurnTracker::new();
        let mut events = VecDeque::new();

        let near = place(&mut registry, 0.0, 0.0, StatBlock::new(1, 1, 1, 1), Side::B);
        let far = place(&mut registry, 2.0, 0.0, StatBlock::new(1, 1, 1, 1), Side::B);

        let mut scheduler = CascadeScheduler::new();
        scheduler.begin_chain(
            0.0,
            None,
            None,
            vec![
                CaptureCandidate {
                    target: near,
                    captor: Side::A,
                    distance: 1.0,
                    direction: Direction::Left,
                },
                CaptureCandidate {
                    target: far,
                    captor: Side::A,
                    distance: 2.0,
                    direction: Direction::Left,
                },
            ],
            &config,
            &metrics,
        );

        // First capture waits out base (0.25) + 1.0 * ripple (0.15).
        scheduler.advance(0.3, &mut registry, &turn, &config, &mut events, &metrics);
        assert!(events.is_empty());

        scheduler.advance(0.15, &mut registry, &turn, &config, &mut events, &metrics);
        assert_eq!(captured_pieces(&events), vec![near]);
        assert_eq!(scheduler.state(), SchedulerState::AwaitingAnimation);

        // Second capture follows one distance gap (0.15) later.
        scheduler.advance(0.15, &mut registry, &turn, &config, &mut events, &metrics);
        assert_eq!(captured_pieces(&events), vec![near, far]);

        // Settle rechecks are still pending, so the cascade is not done.
        assert!(scheduler.chains_in_progress());
        scheduler.advance(2.0, &mut registry, &turn, &config, &mut events, &metrics);
        assert!(!scheduler.chains_in_progress());
        assert_eq!(captured_pieces(&events).len(), 2);
    }

    #[test]
    fn base_delay_holds_back_the_first_capture() {
        let config = create_test_config();
        let mut registry = BoardRegistry::new(&config);
        let metrics = EngineMetrics::new();
        let turn = TurnTracker::new();
        let mut events = VecDeque::new();

        let target = place(&mut registry, 0.0, 0.0, StatBlock::new(1, 1, 1, 1), Side::B);
        let mut scheduler = CascadeScheduler::new();
        scheduler.begin_chain(
            0.0,
            None,
            None,
            vec![CaptureCandidate {
                target,
                captor: Side::A,
                distance: 1.0,
                direction: Direction::Left,
            }],
            &config,
            &metrics,
        );

        scheduler.advance(0.39, &mut registry, &turn, &config, &mut events, &metrics);
        assert!(events.is_empty());
        scheduler.advance(0.02, &mut registry, &turn, &config, &mut events, &metrics);
        assert_eq!(captured_pieces(&events), vec![target]);
    }

    // ========================================================================
    // Placement-triggered cascades
    // ========================================================================

    #[test]
    fn placement_without_battles_stays_idle() {
        let config = instant_config();
        let mut registry = BoardRegistry::new(&config);
        let metrics = EngineMetrics::new();

        let placed = place(&mut registry, 0.0, 0.0, StatBlock::new(5, 5, 5, 5), Side::A);
        let mut scheduler = CascadeScheduler::new();
        scheduler.on_placement(placed, &registry, &config, &metrics);

        assert!(!scheduler.chains_in_progress());
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.next_due().is_none());
    }

    #[test]
    fn two_level_chain_captures_in_order() {
        let config = instant_config();
        let mut registry = BoardRegistry::new(&config);
        let metrics = EngineMetrics::new();
        let mut turn = TurnTracker::new();
        let mut events = VecDeque::new();

        // Row layout: P -> Q -> R. P beats Q (5 > 3); flipped Q beats R
        // (7 > 6).
        let q = place(&mut registry, 1.0, 0.0, StatBlock::new(1, 7, 1, 3), Side::B);
        let r = place(&mut registry, 2.0, 0.0, StatBlock::new(1, 1, 1, 6), Side::B);
        let p = place(&mut registry, 0.0, 0.0, StatBlock::new(1, 5, 1, 1), Side::A);
        turn.mark_placed_this_turn(p);

        let mut scheduler = CascadeScheduler::new();
        scheduler.on_placement(p, &registry, &config, &metrics);
        scheduler.advance(0.0, &mut registry, &turn, &config, &mut events, &metrics);

        assert_eq!(
            events.iter().cloned().collect::<Vec<_>>(),
            vec![
                EngineEvent::Captured {
                    piece: q,
                    new_owner: Side::A,
                    direction: Direction::Right,
                },
                EngineEvent::Captured {
                    piece: r,
                    new_owner: Side::A,
                    direction: Direction::Right,
                },
            ]
        );

        // Both flips are visible through the border repaint.
        assert_eq!(side_of(registry.get(q).unwrap(), &config), Side::A);
        assert_eq!(side_of(registry.get(r).unwrap(), &config), Side::A);

        // The cascade fully unwound.
        assert!(!scheduler.chains_in_progress());
        assert!(scheduler.in_chain.is_empty());
    }

    #[test]
    fn placed_piece_can_lose_its_own_placement_battle() {
        let config = instant_config();
        let mut registry = BoardRegistry::new(&config);
        let metrics = EngineMetrics::new();
        let mut turn = TurnTracker::new();
        let mut events = VecDeque::new();

        let q = place(&mut registry, 1.0, 0.0, StatBlock::new(1, 1, 1, 9), Side::B);
        let p = place(&mut registry, 0.0, 0.0, StatBlock::new(1, 1, 1, 1), Side::A);
        turn.mark_placed_this_turn(p);

        let mut scheduler = CascadeScheduler::new();
        scheduler.on_placement(p, &registry, &config, &metrics);
        scheduler.advance(0.0, &mut registry, &turn, &config, &mut events, &metrics);

        // Turn protection does not shield the placed piece from the
        // direct battle it started.
        assert_eq!(
            events.iter().cloned().collect::<Vec<_>>(),
            vec![EngineEvent::Captured {
                piece: p,
                new_owner: Side::B,
                direction: Direction::Left,
            }]
        );
        assert_eq!(side_of(registry.get(p).unwrap(), &config), Side::B);
        assert_eq!(side_of(registry.get(q).unwrap(), &config), Side::B);
    }

    #[test]
    fn tie_battles_capture_nothing() {
        let config = instant_config();
        let mut registry = BoardRegistry::new(&config);
        let metrics = EngineMetrics::new();
        let turn = TurnTracker::new();
        let mut events = VecDeque::new();

        place(&mut registry, 1.0, 0.0, StatBlock::new(1, 1, 1, 3), Side::B);
        let p = place(&mut registry, 0.0, 0.0, StatBlock::new(1, 3, 1, 1), Side::A);

        let mut scheduler = CascadeScheduler::new();
        scheduler.on_placement(p, &registry, &config, &metrics);
        scheduler.advance(0.0, &mut registry, &turn, &config, &mut events, &metrics);

        assert!(events.is_empty());
        assert!(!scheduler.chains_in_progress());
    }

    // ========================================================================
    // Guards
    // ========================================================================

    #[test]
    fn cycle_guard_stops_reciprocal_recaptures() {
        let config = instant_config();
        let mut registry = BoardRegistry::new(&config);
        let metrics = EngineMetrics::new();
        // No turn protection at all: the in-chain guard has to bound the
        // cascade on its own.
        let turn = TurnTracker::new();
        let mut events = VecDeque::new();

        // W beats the placed piece from the left while the placed piece
        // beats Q on the right. Once both resolve, the placed piece (now
        // B) would re-take Q (now A) on its recheck; only the in-chain
        // guard stops the flip-flop.
        let w = place(&mut registry, 0.0, 1.0, StatBlock::new(1, 9, 1, 1), Side::B);
        let q = place(&mut registry, 2.0, 1.0, StatBlock::new(1, 1, 1, 3), Side::B);
        let p = place(&mut registry, 1.0, 1.0, StatBlock::new(5, 5, 5, 5), Side::A);

        let mut scheduler = CascadeScheduler::new();
        scheduler.on_placement(p, &registry, &config, &metrics);
        scheduler.advance(0.0, &mut registry, &turn, &config, &mut events, &metrics);

        // Exactly two captures: P falls to W, Q falls to P's side. The
        // rechecks of P and Q both want to keep flipping, but every
        // neighbor is already part of the chain.
        assert_eq!(captured_pieces(&events), vec![p, q]);
        assert_eq!(side_of(registry.get(p).unwrap(), &config), Side::B);
        assert_eq!(side_of(registry.get(q).unwrap(), &config), Side::A);
        assert_eq!(side_of(registry.get(w).unwrap(), &config), Side::B);
        assert!(!scheduler.chains_in_progress());
        assert!(scheduler.in_chain.is_empty());
    }

    #[test]
    fn rechecks_skip_pieces_placed_this_turn() {
        let config = instant_config();
        let mut registry = BoardRegistry::new(&config);
        let metrics = EngineMetrics::new();
        let mut turn = TurnTracker::new();
        let mut events = VecDeque::new();

        // Q falls to the direct battle; the cascade would take S next,
        // but S was placed this turn.
        let q = place(&mut registry, 1.0, 0.0, StatBlock::new(1, 9, 1, 3), Side::B);
        let s = place(&mut registry, 2.0, 0.0, StatBlock::new(1, 1, 1, 1), Side::B);
        let p = place(&mut registry, 0.0, 0.0, StatBlock::new(1, 5, 1, 1), Side::A);
        turn.mark_placed_this_turn(s);
        turn.mark_placed_this_turn(p);

        let mut scheduler = CascadeScheduler::new();
        scheduler.on_placement(p, &registry, &config, &metrics);
        scheduler.advance(0.0, &mut registry, &turn, &config, &mut events, &metrics);

        assert_eq!(captured_pieces(&events), vec![q]);
        assert_eq!(side_of(registry.get(s).unwrap(), &config), Side::B);
        assert!(!scheduler.chains_in_progress());
    }

    // ========================================================================
    // Failure semantics
    // ========================================================================

    #[test]
    fn vanished_target_is_skipped_not_fatal() {
        let config = create_test_config();
        let mut registry = BoardRegistry::new(&config);
        let metrics = EngineMetrics::new();
        let turn = TurnTracker::new();
        let mut events = VecDeque::new();

        let doomed = place(&mut registry, 0.0, 0.0, StatBlock::new(1, 1, 1, 1), Side::B);
        let survivor = place(&mut registry, 2.0, 0.0, StatBlock::new(1, 1, 1, 1), Side::B);

        let mut scheduler = CascadeScheduler::new();
        scheduler.begin_chain(
            0.0,
            None,
            None,
            vec![
                CaptureCandidate {
                    target: doomed,
                    captor: Side::A,
                    distance: 1.0,
                    direction: Direction::Left,
                },
                CaptureCandidate {
                    target: survivor,
                    captor: Side::A,
                    distance: 2.0,
                    direction: Direction::Left,
                },
            ],
            &config,
            &metrics,
        );

        // The first target disappears before its capture falls due.
        registry.remove(doomed);
        scheduler.advance(5.0, &mut registry, &turn, &config, &mut events, &metrics);

        // The chain carries on past the stale candidate.
        assert_eq!(captured_pieces(&events), vec![survivor]);
        assert!(!scheduler.chains_in_progress());
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn candidate_already_on_captor_side_is_dropped() {
        let config = instant_config();
        let mut registry = BoardRegistry::new(&config);
        let metrics = EngineMetrics::new();
        let turn = TurnTracker::new();
        let mut events = VecDeque::new();

        let target = place(&mut registry, 0.0, 0.0, StatBlock::new(1, 1, 1, 1), Side::A);

        let mut scheduler = CascadeScheduler::new();
        scheduler.begin_chain(
            0.0,
            None,
            None,
            vec![CaptureCandidate {
                target,
                captor: Side::A,
                distance: 1.0,
                direction: Direction::Left,
            }],
            &config,
            &metrics,
        );
        scheduler.advance(0.0, &mut registry, &turn, &config, &mut events, &metrics);

        assert!(events.is_empty());
        assert!(registry.get(target).unwrap().border_color.is_none());
        assert!(!scheduler.chains_in_progress());
    }
}
