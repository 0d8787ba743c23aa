//! Property tests for command bounds and integral behaviour.

use std::time::Duration;

use approx::assert_relative_eq;
use drishti::{Detection, ManualClock, NavigatorConfig, NavigatorState, Pid, PidGains};
use proptest::prelude::*;

use super::{manual_navigator, seen};

fn gains() -> impl Strategy<Value = PidGains> {
    (-1e3f32..1e3, -1e3f32..1e3, -1e3f32..1e3).prop_map(|(kp, ki, kd)| PidGains::new(kp, ki, kd))
}

/// `None` stands for a lost target.
fn detection() -> impl Strategy<Value = Option<(f32, f32)>> {
    prop::option::weighted(0.8, (0.0f32..640.0, 0.0f32..40_000.0))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_commands_stay_within_caps(
        turn_gains in gains(),
        forward_gains in gains(),
        max_fwd in 0.01f32..2.0,
        max_turn in 0.01f32..4.0,
        search_fraction in -1.0f32..=1.0,
        steps in prop::collection::vec((detection(), 0u64..200_000_000), 1..40),
    ) {
        let config = NavigatorConfig {
            turn_gains,
            forward_gains,
            max_forward_velocity: max_fwd,
            max_turn_velocity: max_turn,
            search_turn_rate: search_fraction * max_turn,
            ..Default::default()
        };
        let (mut nav, clock) = manual_navigator(config);

        for (det, dt_nanos) in steps {
            clock.advance(Duration::from_nanos(dt_nanos));
            let det = match det {
                Some((cx, area)) => seen(cx, area),
                None => Detection::missing(),
            };
            let cmd = nav.compute_command(&det);

            prop_assert!(cmd.forward >= 0.0 && cmd.forward <= max_fwd, "forward {}", cmd.forward);
            prop_assert!(cmd.turn.abs() <= max_turn, "turn {}", cmd.turn);
            if nav.state() == NavigatorState::Arrived {
                prop_assert!(cmd.is_stop());
            }
        }
    }

    #[test]
    fn test_lost_target_always_searches(
        prior in prop::collection::vec((0.0f32..640.0, 0.0f32..40_000.0), 0..10),
    ) {
        let (mut nav, clock) = manual_navigator(NavigatorConfig::default());
        for (cx, area) in prior {
            clock.advance_secs(0.05);
            nav.compute_command(&seen(cx, area));
        }

        let cmd = nav.compute_command(&Detection::missing());
        prop_assert_eq!(nav.state(), NavigatorState::Searching);
        prop_assert_eq!((cmd.forward, cmd.turn), (0.0, 0.3));
    }

    #[test]
    fn test_unclamped_integral_grows_without_bound(error in 1.0f32..500.0, n in 10usize..200) {
        let clock = ManualClock::new();
        let mut pid = Pid::with_clock(PidGains::new(0.0, 1.0, 0.0), clock.clone());

        let mut previous = 0.0;
        for _ in 0..n {
            clock.advance(Duration::from_millis(50));
            let out = pid.step(error);
            prop_assert!(out > previous);
            previous = out;
        }
        prop_assert!((pid.integral() - error * 0.05 * n as f32).abs() <= 1e-3 * pid.integral());
    }
}

#[test]
fn test_windup_before_clamp_engages() {
    let config = NavigatorConfig {
        integral_limit: Some(50.0),
        ..Default::default()
    };
    let (mut nav, clock) = manual_navigator(config);

    // 100 px error, 0.1 s per step: +10 per step until the limit.
    let mut integrals = Vec::new();
    for _ in 0..8 {
        clock.advance_secs(0.1);
        nav.compute_command(&seen(420.0, 5000.0));
        integrals.push(nav.turn_pid().integral());
    }

    for (i, value) in integrals.iter().take(5).enumerate() {
        assert_relative_eq!(*value, 10.0 * (i + 1) as f32, epsilon = 1e-3);
    }
    for value in &integrals[5..] {
        assert_relative_eq!(*value, 50.0);
    }
}

#[test]
fn test_default_config_has_no_integral_limit() {
    let (mut nav, clock) = manual_navigator(NavigatorConfig::default());
    assert_eq!(nav.turn_pid().integral_limit(), None);

    for _ in 0..1000 {
        clock.advance_secs(0.1);
        nav.compute_command(&seen(420.0, 5000.0));
    }
    assert_relative_eq!(nav.turn_pid().integral(), 10_000.0, max_relative = 1e-3);
}
