use std::collections::BTreeMap;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use pickban::config::MatchRules;
use pickban::domain::map_pool::{GameMode, MapPool};
use pickban::domain::state::{MapStatus, Side, TeamSlot};
use pickban::domain::{ActionRequest, MatchStatus, SeriesLength};
use pickban::errors::domain::{ConflictKind, ConsistencyKind, DomainError, ForbiddenKind, NotFoundKind};
use pickban::ErrorCode;
use pickban::AppError;

use crate::support::auth::{referee_actor, team_actor};
use crate::support::draft::{ban, bo3_script, MatchSetup};
use crate::support::test_state::build_test_state_with_rules;
use crate::support::build_test_state;

fn action(body: serde_json::Value) -> ActionRequest {
    serde_json::from_value(body).expect("valid action")
}

/// Built-in rules with one map too many for the Overload decider.
fn ambiguous_decider_rules() -> MatchRules {
    let builtin = MatchRules::builtin().unwrap();
    let mut modes: BTreeMap<GameMode, Vec<String>> = BTreeMap::new();
    for (mode, maps) in builtin.map_pool.modes() {
        modes.insert(mode, maps.to_vec());
    }
    modes
        .get_mut(&GameMode::Overload)
        .unwrap()
        .push("Hacienda".to_string());
    let mut rules = builtin;
    rules.map_pool = MapPool::new(modes);
    rules
}

#[test]
fn consistency_failure_freezes_the_match_until_restart() {
    let ts = build_test_state_with_rules(ambiguous_decider_rules());
    let state = &ts.state;
    let setup = MatchSetup::new();
    setup.create_and_start(state, SeriesLength::Bo3);
    setup.play(state, &bo3_script()[..9]);

    let before = state.flow().snapshot(&setup.match_id).unwrap();
    let err = state
        .flow()
        .submit_action(
            &team_actor(&setup.role_b),
            &setup.match_id,
            &action(ban("Exposure")),
            None,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Consistency(ConsistencyKind::DeciderAmbiguous, _)
    ));
    let app_err = AppError::from(err);
    assert_eq!(app_err.code(), ErrorCode::InternalConsistency);
    assert_eq!(app_err.status().as_u16(), 500);

    // The failed action left the draft untouched but the match is frozen.
    let frozen = state.flow().snapshot(&setup.match_id).unwrap();
    assert_eq!(frozen.status, MatchStatus::Faulted);
    assert!(frozen.fault.as_deref().unwrap().contains("Overload"));
    assert_eq!(frozen.step, before.step);
    assert_eq!(frozen.maps, before.maps);
    assert!(frozen.version > before.version);

    // Every later write sees the fault, referees included.
    for actor in [team_actor(&setup.role_b), referee_actor()] {
        let err = state
            .flow()
            .submit_action(&actor, &setup.match_id, &action(ban("Scar")), None)
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Consistency(ConsistencyKind::MatchFaulted, _)
        ));
    }
    let still = state.flow().snapshot(&setup.match_id).unwrap();
    assert_eq!(still.version, frozen.version, "re-rejection does not bump");

    // A referee restart clears the fault and begins a fresh draft.
    let restarted = state
        .flow()
        .start_series(&referee_actor(), &setup.match_id, SeriesLength::Bo3)
        .unwrap();
    assert_eq!(restarted.status, MatchStatus::PickBan);
    assert_eq!(restarted.fault, None);
    assert_eq!(restarted.step, 0);
}

#[test]
fn only_one_of_two_racing_actions_wins_the_step() {
    let ts = build_test_state();
    let setup = Arc::new(MatchSetup::new());
    setup.create_and_start(&ts.state, SeriesLength::Bo3);
    let state = Arc::new(ts.state.clone());

    // Two captains of team A try to fill step 1 with different maps.
    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = ["Blackheart", "Exposure"]
        .into_iter()
        .map(|map| {
            let state = Arc::clone(&state);
            let setup = Arc::clone(&setup);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let captain = team_actor(&setup.role_a);
                barrier.wait();
                state
                    .flow()
                    .submit_action(&captain, &setup.match_id, &action(ban(map)), None)
                    .map(|_| map)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners: Vec<&str> = results
        .iter()
        .filter_map(|r| r.as_ref().ok().copied())
        .collect();
    assert_eq!(winners.len(), 1, "{results:?}");

    // The loser arrives on team B's step.
    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(
        matches!(loser, DomainError::Forbidden(ForbiddenKind::NotYourTurn, _)),
        "{loser:?}"
    );

    let snap = state.flow().snapshot(&setup.match_id).unwrap();
    assert_eq!(snap.step, 1);
    let banned: Vec<_> = snap
        .maps
        .iter()
        .filter(|m| m.status == MapStatus::Banned)
        .collect();
    assert_eq!(banned.len(), 1);
    assert_eq!(banned[0].name, winners[0]);
}

#[test]
fn action_queued_behind_end_match_finds_the_match_gone() {
    let ts = build_test_state();
    let setup = Arc::new(MatchSetup::new());
    setup.create_and_start(&ts.state, SeriesLength::Bo3);
    let state = Arc::new(ts.state.clone());

    // Hold the match so both calls fetch the handle and then wait on it,
    // end_match first.
    let handle = state.matches.get(&setup.match_id).unwrap();
    let guard = handle.lock();

    let ender = {
        let state = Arc::clone(&state);
        let setup = Arc::clone(&setup);
        thread::spawn(move || state.flow().end_match(&referee_actor(), &setup.match_id))
    };
    thread::sleep(Duration::from_millis(100));
    let actor = {
        let state = Arc::clone(&state);
        let setup = Arc::clone(&setup);
        thread::spawn(move || {
            state.flow().submit_action(
                &team_actor(&setup.role_a),
                &setup.match_id,
                &action(ban("Blackheart")),
                None,
            )
        })
    };
    thread::sleep(Duration::from_millis(100));
    drop(guard);

    ender.join().unwrap().expect("end_match succeeds");
    let err = actor.join().unwrap().unwrap_err();
    assert!(
        matches!(err, DomainError::NotFound(NotFoundKind::Match, _)),
        "{err:?}"
    );

    let stale = handle.lock();
    assert!(stale.ended);
    assert_eq!(stale.step, 0, "ended match was not mutated");
    assert!(state.matches.get(&setup.match_id).is_err());
}

#[test]
fn stale_handle_cannot_touch_a_recreated_match() {
    let ts = build_test_state();
    let setup = MatchSetup::new();
    setup.create_and_start(&ts.state, SeriesLength::Bo3);
    let old = ts.state.matches.get(&setup.match_id).unwrap();

    ts.state.flow().end_match(&referee_actor(), &setup.match_id).unwrap();
    setup.create_and_start(&ts.state, SeriesLength::Bo5);

    assert!(old.lock().ended);
    let fresh = ts.state.flow().snapshot(&setup.match_id).unwrap();
    assert_eq!(fresh.version, 1);
    assert_eq!(ts.state.flow().list_matches().len(), 1);
    ts.state.flow().end_match(&referee_actor(), &setup.match_id).unwrap();
    assert!(ts.state.flow().end_match(&referee_actor(), &setup.match_id).is_err());
}

#[test]
fn stale_version_is_reported_before_flow_checks() {
    let ts = build_test_state();
    let setup = MatchSetup::new();
    setup.create_and_start(&ts.state, SeriesLength::Bo3);
    setup.play(&ts.state, &bo3_script());

    // Pick & ban is over, but the caller's version is what is wrong.
    let err = ts
        .state
        .flow()
        .submit_action(
            &team_actor(&setup.role_a),
            &setup.match_id,
            &action(ban("Den")),
            Some(1),
        )
        .unwrap_err();
    assert!(
        matches!(err, DomainError::Conflict(ConflictKind::StaleVersion, _)),
        "{err:?}"
    );
}

#[test]
fn summary_records_bans_sides_and_winner() {
    let mut ts = build_test_state();
    let setup = MatchSetup::new();
    setup.create_and_start(&ts.state, SeriesLength::Bo3);
    setup.play(&ts.state, &bo3_script());

    let flow = ts.state.flow();
    for (slot, winner) in [(1, TeamSlot::B), (2, TeamSlot::B)] {
        let submission = serde_json::from_value(serde_json::json!({
            "slot": slot,
            "winner": winner,
        }))
        .unwrap();
        flow.submit_result(&team_actor(&setup.role_a), &setup.match_id, &submission)
            .unwrap();
    }

    let summary = ts.exports.try_recv().expect("exported");
    assert_eq!(summary.team_a, "Alpha");
    assert_eq!(summary.team_b, "Bravo");
    assert_eq!(summary.winner, Some(TeamSlot::B));
    assert_eq!(summary.winner_name.as_deref(), Some("Bravo"));
    assert_eq!(summary.series, Some(SeriesLength::Bo3));
    assert_eq!(
        summary.bans[&TeamSlot::A],
        vec!["HP Blackheart", "SnD Den", "Overload Den"]
    );
    assert_eq!(
        summary.bans[&TeamSlot::B],
        vec!["HP Colossus", "SnD Colossus", "Overload Exposure"]
    );

    let first = &summary.maps[0];
    assert_eq!(first.view.map, "Den");
    assert_eq!(first.view.side_a, Some(Side::Defense));
    assert_eq!(first.view.side_b, Some(Side::Attack));
    assert_eq!(first.winner, Some(TeamSlot::B));

    let decider = &summary.maps[2];
    assert_eq!(decider.view.mode, GameMode::Overload);
    assert_eq!(decider.view.map, "Scar");
    assert_eq!(decider.winner, None);
}
