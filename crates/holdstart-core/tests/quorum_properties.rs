//! Property tests for the hold timers and the quorum decision.

use holdstart_core::{Classification, HoldPolicy, ParticipantId, ReadinessCoordinator};
use proptest::prelude::*;

/// Valid threshold policies, grace and no-grace.
fn threshold_policy() -> impl Strategy<Value = HoldPolicy> {
    (0.01f64..10.0, 0.01f64..10.0, 0.0f64..5.0, any::<bool>()).prop_map(
        |(active, extra, grace, with_grace)| {
            let start = active + extra;
            if with_grace {
                HoldPolicy::GraceThreshold {
                    active,
                    start,
                    grace,
                }
            } else {
                HoldPolicy::Threshold { active, start }
            }
        },
    )
}

/// Time steps that `advance` must reject.
fn invalid_step() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        -1000.0f64..=0.0,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

/// One driver action against a coordinator.
#[derive(Debug, Clone)]
enum Action {
    SetPressed(u32, bool),
    Advance(f64),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u32..6, any::<bool>()).prop_map(|(id, pressed)| Action::SetPressed(id, pressed)),
        (0.01f64..4.0).prop_map(Action::Advance),
    ]
}

fn apply(c: &mut ReadinessCoordinator, actions: &[Action]) {
    for action in actions {
        match *action {
            Action::SetPressed(id, pressed) => c.set_pressed(ParticipantId(id), pressed),
            Action::Advance(elapsed) => c.advance(elapsed).unwrap(),
        }
    }
}

proptest! {
    #[test]
    fn fresh_fleet_is_out_for_any_valid_policy(policy in threshold_policy()) {
        let c = ReadinessCoordinator::with_policy(policy).unwrap();
        let id = ParticipantId(0);
        prop_assert_eq!(c.level(id), 0.0);
        prop_assert_eq!(c.classification(id), Classification::Out);
        prop_assert!(!c.is_pressed(id));
        prop_assert!(!c.should_start());
    }

    #[test]
    fn held_level_is_monotone_and_saturates(
        policy in threshold_policy(),
        steps in proptest::collection::vec(0.001f64..3.0, 1..40),
    ) {
        let start = match policy {
            HoldPolicy::Threshold { start, .. }
            | HoldPolicy::GraceThreshold { start, .. } => start,
            HoldPolicy::DelayCounter { .. } => unreachable!(),
        };
        let mut c = ReadinessCoordinator::with_policy(policy).unwrap();
        let id = ParticipantId(0);
        c.press(id);
        let mut previous = 0.0;
        for step in steps {
            c.advance(step).unwrap();
            let level = c.level(id);
            prop_assert!(level >= previous);
            prop_assert!(level <= start);
            previous = level;
        }
    }

    #[test]
    fn released_level_is_monotone_down_to_zero(
        policy in threshold_policy(),
        hold in 0.1f64..20.0,
        steps in proptest::collection::vec(0.001f64..3.0, 1..40),
    ) {
        let mut c = ReadinessCoordinator::with_policy(policy).unwrap();
        let id = ParticipantId(0);
        c.press(id);
        c.advance(hold).unwrap();
        c.release(id);
        // First released step may snap; from then on it only falls.
        let mut previous = f64::MAX;
        for step in steps {
            c.advance(step).unwrap();
            let level = c.level(id);
            prop_assert!(level <= previous);
            prop_assert!(level >= 0.0);
            previous = level;
        }
    }

    #[test]
    fn grace_snap_bounds_the_level_after_one_released_step(
        active in 0.01f64..5.0,
        extra in 0.01f64..5.0,
        grace in 0.0f64..3.0,
        step in 0.001f64..2.0,
    ) {
        let start = active + extra;
        let mut c = ReadinessCoordinator::new(active, start, grace).unwrap();
        let id = ParticipantId(0);
        c.press(id);
        c.advance(start + 1.0).unwrap(); // charge past full
        c.release(id);
        c.advance(step).unwrap();
        // One tick of release can never leave the level above the floor.
        prop_assert!(c.level(id) <= grace);
    }

    #[test]
    fn invalid_step_never_mutates(
        actions in proptest::collection::vec(action(), 0..30),
        bad in invalid_step(),
    ) {
        let mut c = ReadinessCoordinator::new(1.0, 2.0, 0.5).unwrap();
        apply(&mut c, &actions);
        let before = c.snapshot();
        prop_assert!(c.advance(bad).is_err());
        prop_assert_eq!(c.snapshot(), before);
    }

    #[test]
    fn should_start_matches_the_quorum_rules(
        actions in proptest::collection::vec(action(), 0..60),
    ) {
        let mut c = ReadinessCoordinator::new(1.0, 2.0, 0.5).unwrap();
        apply(&mut c, &actions);
        let started = c.count_in(Classification::Start);
        let waiting = c.count_in(Classification::Wait);
        prop_assert_eq!(c.should_start(), started >= 2 && waiting == 0);
        prop_assert_eq!(c.startable_participants().len(), started);
    }
}
