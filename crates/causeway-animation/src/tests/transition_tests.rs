use super::*;

use causeway_core::Runtime;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const FRAME: u64 = 16_666_667;

fn pump(runtime: &Runtime, frames: u32, clock: &Cell<u64>) {
    for _ in 0..frames {
        clock.set(clock.get() + FRAME);
        runtime.advance_frame(clock.get());
    }
}

#[test]
fn easing_linear_is_identity() {
    assert_eq!(Easing::Linear.transform(0.0), 0.0);
    assert_eq!(Easing::Linear.transform(0.5), 0.5);
    assert_eq!(Easing::Linear.transform(1.0), 1.0);
}

#[test]
fn easing_curves_hit_their_endpoints() {
    for easing in [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::FastOutSlowIn,
    ] {
        assert!(easing.transform(0.0).abs() < 0.01, "{easing:?} start");
        assert!((easing.transform(1.0) - 1.0).abs() < 0.01, "{easing:?} end");
    }
}

#[test]
fn play_reports_intermediate_progress_and_completes() {
    let runtime = Runtime::new();
    let clock = Cell::new(0u64);
    let mut animation =
        TransitionAnimation::new(runtime.clone(), TransitionSpec::linear(100));

    let samples = Rc::new(RefCell::new(Vec::new()));
    let samples_obs = Rc::clone(&samples);
    animation.set_progress_observer(move |value| samples_obs.borrow_mut().push(value));

    let done = Rc::new(Cell::new(false));
    let done_cb = Rc::clone(&done);
    animation.play(Box::new(move || done_cb.set(true)));

    pump(&runtime, 12, &clock);
    assert!(done.get());
    let samples = samples.borrow();
    assert!(samples.iter().any(|value| *value > 0.0 && *value < 1.0));
    assert_eq!(*samples.last().unwrap(), 1.0);
}

#[test]
fn zero_duration_completes_on_first_frame_without_motion() {
    let runtime = Runtime::new();
    let clock = Cell::new(0u64);
    let mut animation = TransitionAnimation::new(runtime.clone(), TransitionSpec::linear(300));
    animation.set_duration_ms(0);

    let done = Rc::new(Cell::new(false));
    let done_cb = Rc::clone(&done);
    animation.play(Box::new(move || done_cb.set(true)));
    assert!(!done.get(), "completion must be asynchronous");

    pump(&runtime, 1, &clock);
    assert!(done.get());
    assert_eq!(animation.fraction(), 1.0);
}

#[test]
fn fast_forward_finishes_an_in_flight_playback() {
    let runtime = Runtime::new();
    let clock = Cell::new(0u64);
    let mut animation = TransitionAnimation::new(runtime.clone(), TransitionSpec::linear(10_000));

    let play_done = Rc::new(Cell::new(false));
    let play_cb = Rc::clone(&play_done);
    animation.play(Box::new(move || play_cb.set(true)));
    pump(&runtime, 2, &clock);
    assert!(!play_done.get());

    let ff_done = Rc::new(Cell::new(false));
    let ff_cb = Rc::clone(&ff_done);
    animation.fast_forward(Box::new(move || ff_cb.set(true)));
    pump(&runtime, 1, &clock);
    assert!(play_done.get());
    assert!(ff_done.get());
    assert_eq!(animation.fraction(), 1.0);
}

#[test]
fn fast_forward_when_idle_completes_immediately() {
    let runtime = Runtime::new();
    let mut animation = TransitionAnimation::new(runtime, TransitionSpec::linear(100));
    let done = Rc::new(Cell::new(false));
    let done_cb = Rc::clone(&done);
    animation.fast_forward(Box::new(move || done_cb.set(true)));
    assert!(done.get(), "no pending playback, callback fires synchronously");
}

#[test]
fn scrub_then_commit_reaches_the_end() {
    let runtime = Runtime::new();
    let clock = Cell::new(0u64);
    let mut animation = TransitionAnimation::new(runtime.clone(), TransitionSpec::linear(200));

    animation.progress_start();
    animation.progress(0.4);
    assert!((animation.fraction() - 0.4).abs() < f32::EPSILON);
    animation.progress(1.7);
    assert_eq!(animation.fraction(), 1.0);
    animation.progress(0.6);

    let done = Rc::new(Cell::new(false));
    let done_cb = Rc::clone(&done);
    animation.progress_end(true, 2.0, Box::new(move || done_cb.set(true)));
    pump(&runtime, 6, &clock);
    assert!(done.get());
    assert_eq!(animation.fraction(), 1.0);
}

#[test]
fn scrub_then_cancel_returns_to_the_start() {
    let runtime = Runtime::new();
    let clock = Cell::new(0u64);
    let mut animation = TransitionAnimation::new(runtime.clone(), TransitionSpec::linear(200));

    animation.progress_start();
    animation.progress(0.3);

    let done = Rc::new(Cell::new(false));
    let done_cb = Rc::clone(&done);
    animation.progress_end(false, 1.0, Box::new(move || done_cb.set(true)));
    pump(&runtime, 8, &clock);
    assert!(done.get());
    assert_eq!(animation.fraction(), 0.0);
}

#[test]
fn dispose_drops_pending_completion() {
    let runtime = Runtime::new();
    let clock = Cell::new(0u64);
    let mut animation = TransitionAnimation::new(runtime.clone(), TransitionSpec::linear(100));

    let done = Rc::new(Cell::new(false));
    let done_cb = Rc::clone(&done);
    animation.play(Box::new(move || done_cb.set(true)));
    animation.dispose();

    pump(&runtime, 12, &clock);
    assert!(!done.get());
}

#[test]
fn factory_falls_back_to_default_spec_for_unknown_names() {
    use crate::NavTransitionFactory;
    use causeway_core::{PageKind, Params};

    let runtime = Runtime::new();
    let factory = NavTransitionFactory::new(runtime);
    factory.register("modal-slide-up", TransitionSpec::linear(450));

    let entering = ViewRecord::new(PageKind::new("a"), Params::new());
    let leaving = ViewRecord::placeholder();

    let known = factory.create(
        &entering,
        &leaving,
        &NavOptions::new().animation("modal-slide-up"),
    );
    assert_eq!(known.duration_ms(), 450);

    let unknown = factory.create(&entering, &leaving, &NavOptions::new().animation("nope"));
    assert_eq!(unknown.duration_ms(), TransitionSpec::default().duration_ms);
}
