//! Edge-swipe back gesture: commit, cancel, guards and losing the stack to
//! a programmatic navigation mid-gesture.

use causeway_core::{NavDirection, NavOptions, Params, ViewState};
use causeway_testing::NavRobot;

/// Two settled views with a lifecycle recorder on the top one.
fn two_view_robot() -> NavRobot {
    let robot = NavRobot::new();
    robot.push("a");
    let top = robot.record("b");
    robot
        .controller()
        .insert_pages(usize::MAX, vec![top], NavOptions::new());
    robot.settle();
    robot.assert_stack(&["a", "b"]);
    robot
}

#[test]
fn a_committed_swipe_pops_the_active_view() {
    let robot = two_view_robot();
    let nav = robot.controller();

    nav.swipe_back_start();
    robot.pump(1);
    nav.swipe_back_progress(0.6);
    nav.swipe_back_end(true, 1.2);
    robot.settle();

    robot.assert_stack(&["a"]);
    assert_eq!(nav.active().unwrap().page().unwrap().name(), "a");
    assert!(robot.loader.teardowns().contains(&"b".to_owned()));

    let events = robot.events.entries();
    assert!(events.contains(&"b:did_leave".to_owned()));
    assert!(events.contains(&"b:did_unload".to_owned()));
    assert_eq!(
        robot.router.events().last(),
        Some(&(NavDirection::Back, Some("a".to_owned())))
    );
    assert!(robot.app.enabled());
    assert!(!nav.is_transitioning());
    assert!(!nav.can_swipe_back(), "a lone root view cannot swipe back");
}

#[test]
fn a_cancelled_swipe_restores_the_active_view() {
    let robot = two_view_robot();
    let nav = robot.controller();
    let events_before = robot.router.events().len();

    nav.swipe_back_start();
    robot.pump(1);
    nav.swipe_back_progress(0.2);
    nav.swipe_back_end(false, 0.0);
    robot.settle();

    robot.assert_stack(&["a", "b"]);
    assert_eq!(nav.active().unwrap().page().unwrap().name(), "b");
    assert_eq!(nav.get_by_index(0).unwrap().state(), ViewState::Inactive);
    assert!(!robot.loader.teardowns().contains(&"b".to_owned()));

    // the kept view re-runs its enter hooks; no route change happened
    let events = robot.events.entries();
    assert!(events.contains(&"b:will_enter".to_owned()));
    assert_eq!(robot.router.events().len(), events_before);
    assert!(robot.app.enabled());
    assert!(!nav.is_transitioning());
}

#[test]
fn a_gesture_overtaken_by_navigation_settles_without_touching_the_stack() {
    let robot = two_view_robot();
    let nav = robot.controller();

    nav.swipe_back_start();
    robot.pump(1);
    nav.swipe_back_progress(0.3);

    // a programmatic push takes the stack over mid-drag
    nav.push("c", Params::new(), NavOptions::new());
    robot.settle();
    robot.assert_stack(&["a", "b", "c"]);

    nav.swipe_back_end(true, 1.0);
    robot.settle();

    // the stale gesture must not pop anything or re-route
    robot.assert_stack(&["a", "b", "c"]);
    assert_eq!(nav.active().unwrap().page().unwrap().name(), "c");
    assert_eq!(nav.get_by_index(0).unwrap().state(), ViewState::Inactive);
    assert_eq!(nav.get_by_index(1).unwrap().state(), ViewState::Inactive);
    assert!(!robot.loader.teardowns().contains(&"b".to_owned()));
    assert!(!robot
        .router
        .events()
        .contains(&(NavDirection::Back, Some("a".to_owned()))));
}

#[test]
fn a_release_before_staging_lands_still_settles_the_gesture() {
    let robot = two_view_robot();
    let nav = robot.controller();

    // finger up within the same frame the gesture started
    nav.swipe_back_start();
    nav.swipe_back_end(true, 1.0);
    robot.settle();

    robot.assert_stack(&["a"]);
    assert_eq!(nav.active().unwrap().state(), ViewState::Active);
    assert!(robot.loader.teardowns().contains(&"b".to_owned()));
    assert!(robot.app.enabled());
    assert!(!nav.is_transitioning());

    // the stack keeps working afterwards
    nav.push("c", Params::new(), NavOptions::new());
    robot.settle();
    robot.assert_stack(&["a", "c"]);
    nav.pop(NavOptions::new())
        .on_complete(|result| assert!(result.is_ok()));
    robot.settle();
    robot.assert_stack(&["a"]);
}

#[test]
fn the_gesture_is_ignored_on_a_root_view() {
    let robot = NavRobot::new();
    robot.push("a");

    let nav = robot.controller();
    nav.swipe_back_start();
    robot.pump(1);
    nav.swipe_back_end(true, 1.0);
    robot.settle();

    robot.assert_stack(&["a"]);
    assert_eq!(nav.active().unwrap().state(), ViewState::Active);
}

#[test]
fn the_gesture_is_ignored_while_a_transition_runs() {
    let robot = two_view_robot();
    let nav = robot.controller();

    let push = nav.push("c", Params::new(), NavOptions::new());
    robot.pump(2);
    assert!(nav.is_transitioning());
    nav.swipe_back_start();
    robot.settle();

    assert_eq!(push.result(), Some(Ok(())));
    robot.assert_stack(&["a", "b", "c"]);
    assert_eq!(nav.active().unwrap().page().unwrap().name(), "c");
}

#[test]
fn the_gesture_is_ignored_when_disabled() {
    let robot = two_view_robot();
    let nav = robot.controller();
    nav.set_swipe_back_enabled(false);

    nav.swipe_back_start();
    robot.pump(1);
    nav.swipe_back_end(true, 1.0);
    robot.settle();

    robot.assert_stack(&["a", "b"]);
    assert_eq!(nav.active().unwrap().page().unwrap().name(), "b");
}

#[test]
fn progress_and_release_without_a_gesture_are_no_ops() {
    let robot = two_view_robot();
    let nav = robot.controller();

    nav.swipe_back_progress(0.5);
    nav.swipe_back_end(true, 1.0);
    robot.settle();

    robot.assert_stack(&["a", "b"]);
    assert_eq!(nav.active().unwrap().page().unwrap().name(), "b");
}
