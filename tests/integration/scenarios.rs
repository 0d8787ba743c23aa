//! Navigator behaviour on hand-written detection sequences.

use approx::assert_relative_eq;
use drishti::{Detection, NavigatorConfig, NavigatorState, VelocityCommand};

use super::{manual_navigator, seen};

#[test]
fn test_off_centre_right_turns_right_and_drives() {
    let config = NavigatorConfig::default();
    let (max_fwd, max_turn) = (config.max_forward_velocity, config.max_turn_velocity);
    let (mut nav, clock) = manual_navigator(config);
    clock.advance_secs(0.05);

    let cmd = nav.compute_command(&seen(640.0, 5000.0));

    assert_eq!(nav.state(), NavigatorState::Approaching);
    assert!(cmd.forward > 0.0 && cmd.forward <= max_fwd);
    assert!(cmd.turn < 0.0);
    assert!(cmd.turn >= -max_turn);
}

#[test]
fn test_area_at_threshold_arrives() {
    let (mut nav, _clock) = manual_navigator(NavigatorConfig::default());

    let cmd = nav.compute_command(&seen(320.0, 20_000.0));

    assert_eq!(nav.state(), NavigatorState::Arrived);
    assert_eq!(cmd, VelocityCommand::stop());
    assert!(nav.arrived());
}

#[test]
fn test_approach_lose_then_arrive() {
    let (mut nav, clock) = manual_navigator(NavigatorConfig::default());
    let mut states = Vec::new();

    clock.advance_secs(0.05);
    nav.compute_command(&seen(500.0, 5000.0));
    states.push(nav.state());

    clock.advance_secs(0.05);
    let search = nav.compute_command(&Detection::missing());
    states.push(nav.state());

    clock.advance_secs(0.05);
    let last = nav.compute_command(&seen(320.0, 25_000.0));
    states.push(nav.state());

    assert_eq!(
        states,
        vec![
            NavigatorState::Approaching,
            NavigatorState::Searching,
            NavigatorState::Arrived
        ]
    );
    assert_eq!(search, VelocityCommand::new(0.0, 0.3));
    assert_eq!(last, VelocityCommand::stop());
}

#[test]
fn test_dropout_keeps_pid_history() {
    let (mut nav, clock) = manual_navigator(NavigatorConfig::default());

    clock.advance_secs(0.1);
    nav.compute_command(&seen(420.0, 5000.0));
    let integral = nav.turn_pid().integral();
    assert_relative_eq!(integral, 100.0 * 0.1, epsilon = 1e-4);

    clock.advance_secs(0.1);
    nav.compute_command(&Detection::missing());
    assert_relative_eq!(nav.turn_pid().integral(), integral);
    assert_relative_eq!(nav.turn_pid().prev_error(), 100.0);
}

#[test]
fn test_restart_begins_new_episode() {
    let (mut nav, clock) = manual_navigator(NavigatorConfig::default());
    clock.advance_secs(0.1);
    nav.compute_command(&seen(320.0, 30_000.0));
    assert!(nav.arrived());

    nav.restart();

    assert_eq!(nav.state(), NavigatorState::Searching);
    assert_eq!(nav.turn_pid().integral(), 0.0);
    assert_eq!(nav.forward_pid().integral(), 0.0);
}

#[test]
fn test_config_file_drives_navigator() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drishti.toml");
    std::fs::write(
        &path,
        r#"
[navigator]
arrive_area_threshold = 5000.0
search_turn_rate = -0.5
"#,
    )
    .unwrap();

    let config = drishti::DrishtiConfig::load(&path).unwrap();
    let (mut nav, _clock) = manual_navigator(config.navigator);

    assert_eq!(
        nav.compute_command(&Detection::missing()),
        VelocityCommand::new(0.0, -0.5)
    );
    nav.compute_command(&seen(320.0, 5000.0));
    assert!(nav.arrived());
}
