//! Pipeline-level behavior: overlapping transitions, preloading, keyboard
//! gating, construction failures and the forced-active recovery path.

use std::cell::Cell;
use std::rc::Rc;

use causeway_core::{NavDirection, NavOptions, Params, ViewState};
use causeway_nav::NavError;
use causeway_testing::NavRobot;

/// Pushes the first page on a manual-loader robot and settles it.
fn boot(robot: &NavRobot, page: &str) {
    let future = robot
        .controller()
        .push(page, Params::new(), NavOptions::new());
    robot.loader.resolve_next();
    robot.settle();
    assert_eq!(future.result(), Some(Ok(())));
}

#[test]
fn the_newest_push_wins_when_constructions_overlap() {
    let robot = NavRobot::manual();
    boot(&robot, "a");

    let nav = robot.controller();
    let b = robot.record("b");
    let c = robot.record("c");
    let first = nav.insert_pages(usize::MAX, vec![b.clone()], NavOptions::new());
    let second = nav.insert_pages(usize::MAX, vec![c.clone()], NavOptions::new());
    assert_eq!(robot.loader.pending(), 2);

    robot.loader.resolve_next();
    robot.loader.resolve_next();
    robot.settle();

    robot.assert_stack(&["a", "b", "c"]);
    assert_eq!(c.state(), ViewState::Active);
    assert_eq!(b.state(), ViewState::Inactive);

    // the superseded push resolves quietly and its view never enters
    assert_eq!(first.result(), Some(Ok(())));
    assert_eq!(second.result(), Some(Ok(())));
    let events = robot.events.entries();
    assert!(
        !events.iter().any(|event| event == "b:will_enter"),
        "superseded view ran enter hooks: {events:?}"
    );
    assert_eq!(
        robot.router.events(),
        vec![
            (NavDirection::Forward, Some("a".to_owned())),
            (NavDirection::Forward, Some("c".to_owned())),
        ]
    );
}

#[test]
fn racing_inserts_supersede_before_the_first_view_enters() {
    let robot = NavRobot::manual();
    boot(&robot, "a");

    let nav = robot.controller();
    let b = robot.record("b");
    let c = robot.record("c");
    let first = nav.insert_pages(0, vec![b.clone()], NavOptions::new());
    let second = nav.insert_pages(0, vec![c.clone()], NavOptions::new());

    robot.loader.resolve_next();
    robot.loader.resolve_next();
    robot.settle();

    // c took the transition over; everything it covered was cleaned out
    robot.assert_stack(&["c"]);
    assert_eq!(c.state(), ViewState::Active);
    assert_eq!(first.result(), Some(Ok(())));
    assert_eq!(second.result(), Some(Ok(())));

    let events = robot.events.entries();
    assert!(
        !events.iter().any(|event| event == "b:will_enter" || event == "b:did_enter"),
        "superseded view ran enter hooks: {events:?}"
    );
    let teardowns = robot.loader.teardowns();
    assert!(teardowns.contains(&"a".to_owned()));
    assert!(teardowns.contains(&"b".to_owned()));
}

#[test]
fn preload_builds_content_without_hooks_or_motion() {
    let robot = NavRobot::new();
    robot.push("home");

    let nav = robot.controller();
    let detail = robot.record("detail");
    let calls_before = robot.app.calls().len();
    let future = nav.insert_pages(
        usize::MAX,
        vec![detail.clone()],
        NavOptions::new().preload(),
    );
    robot.settle();

    robot.assert_stack(&["home", "detail"]);
    assert_eq!(future.result(), Some(Ok(())));
    assert_eq!(detail.state(), ViewState::Active);
    assert_eq!(robot.events.entries(), vec!["detail:loaded".to_owned()]);

    let new_calls = &robot.app.calls()[calls_before..];
    assert!(
        new_calls.iter().all(|(enabled, _)| *enabled),
        "preload blocked input: {new_calls:?}"
    );
}

#[test]
fn an_open_keyboard_defers_completion_until_it_acknowledges() {
    let robot = NavRobot::new();
    robot.push("home");
    robot.keyboard.set_open(true);

    let nav = robot.controller();
    let future = nav.push("detail", Params::new(), NavOptions::new());
    robot.settle();

    assert_eq!(robot.keyboard.close_calls(), 1);
    assert!(robot.keyboard.is_waiting());
    assert!(!future.is_resolved());
    assert_eq!(
        nav.get_by_index(1).unwrap().state(),
        ViewState::TransEnter,
        "the entering view must not be confirmed while the keyboard is up"
    );

    robot.keyboard.ack();

    assert_eq!(future.result(), Some(Ok(())));
    assert_eq!(nav.get_by_index(1).unwrap().state(), ViewState::Active);
    robot.assert_stack(&["home", "detail"]);
}

#[test]
fn a_failed_construction_restores_the_previous_view() {
    let robot = NavRobot::manual();
    boot(&robot, "home");

    let nav = robot.controller();
    let broken = robot.record("broken");
    let future = nav.insert_pages(usize::MAX, vec![broken], NavOptions::new());
    robot.loader.fail_next("missing view");
    robot.settle();

    assert_eq!(
        future.result(),
        Some(Err(NavError::LoadFailed {
            page: "broken".to_owned(),
            reason: "missing view".to_owned(),
        }))
    );
    robot.assert_stack(&["home"]);
    assert_eq!(nav.active().unwrap().state(), ViewState::Active);
    assert!(!nav.is_transitioning());
    assert!(robot.loader.teardowns().contains(&"broken".to_owned()));

    // the stack keeps working afterwards
    let retry = nav.push("next", Params::new(), NavOptions::new());
    robot.loader.resolve_next();
    robot.settle();
    assert_eq!(retry.result(), Some(Ok(())));
    robot.assert_stack(&["home", "next"]);
}

#[test]
fn removing_the_leaving_view_fast_forwards_the_transition() {
    let robot = NavRobot::new();
    robot.push("a");

    let nav = robot.controller();
    let push = nav.push("b", Params::new(), NavOptions::new());
    robot.pump(2);
    assert_eq!(nav.get_by_index(1).unwrap().state(), ViewState::TransEnter);
    assert_eq!(nav.get_by_index(0).unwrap().state(), ViewState::TransLeave);

    // the in-flight push is rushed to its end, then the survivor is
    // promoted without animation
    let removal = nav.remove(1, 1, NavOptions::new());
    robot.settle();

    robot.assert_stack(&["a"]);
    assert_eq!(nav.active().unwrap().page().unwrap().name(), "a");
    assert_eq!(push.result(), Some(Ok(())));
    assert_eq!(removal.result(), Some(Ok(())));

    let teardowns = robot.loader.teardowns();
    assert_eq!(teardowns.iter().filter(|page| *page == "b").count(), 1);
    assert_eq!(
        robot.router.events().last(),
        Some(&(NavDirection::Back, Some("a".to_owned())))
    );
    assert!(!nav.is_transitioning());
}

#[test]
fn the_first_transition_snaps_and_later_ones_animate() {
    let robot = NavRobot::new();
    robot.push("root");
    assert!(
        robot.app.calls().iter().all(|(enabled, _)| *enabled),
        "the very first view must appear without an animation"
    );

    robot.push("detail");
    assert!(
        robot.app.calls().contains(&(false, 300)),
        "a full-length transition must block input for its duration"
    );
}

#[test]
fn the_master_animation_switch_forces_instant_transitions() {
    let robot = NavRobot::new();
    robot.push("a");

    let nav = robot.controller();
    let mut config = nav.config();
    config.animate = false;
    nav.set_config(config);

    let calls_before = robot.app.calls().len();
    robot.push("b");

    robot.assert_stack(&["a", "b"]);
    let new_calls = &robot.app.calls()[calls_before..];
    assert!(new_calls.iter().all(|(enabled, _)| *enabled));
}

#[test]
fn a_configured_delay_still_reaches_completion() {
    let robot = NavRobot::new();
    robot.push("a");

    let nav = robot.controller();
    let mut config = nav.config();
    config.transition_delay_ms = 40;
    nav.set_config(config);

    let future = robot.push("b");
    assert_eq!(future.result(), Some(Ok(())));
    robot.assert_stack(&["a", "b"]);
    assert_eq!(nav.active().unwrap().page().unwrap().name(), "b");
}

#[test]
fn completion_callbacks_fire_for_pending_and_settled_futures() {
    let robot = NavRobot::manual();
    let nav = robot.controller();

    let future = nav.push("a", Params::new(), NavOptions::new());
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    future.on_complete(move |result| {
        assert_eq!(result, Ok(()));
        flag.set(true);
    });
    assert!(!fired.get());

    robot.loader.resolve_next();
    robot.settle();
    assert!(fired.get());

    let errored = nav.remove(9, 1, NavOptions::new());
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    errored.on_complete(move |result| {
        assert!(result.is_err());
        flag.set(true);
    });
    assert!(fired.get(), "settled futures call back immediately");
}
