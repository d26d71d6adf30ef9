//! Frame-driven transition playback with gesture scrubbing.

use std::cell::RefCell;
use std::rc::Rc;

use causeway_core::{FrameCallbackRegistration, NavOptions, Runtime, ViewRecord};

use crate::Easing;

/// Duration and curve for one transition style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionSpec {
    pub duration_ms: u64,
    pub easing: Easing,
}

impl TransitionSpec {
    pub fn tween(duration_ms: u64, easing: Easing) -> Self {
        Self {
            duration_ms,
            easing,
        }
    }

    pub fn linear(duration_ms: u64) -> Self {
        Self::tween(duration_ms, Easing::Linear)
    }
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self::tween(300, Easing::FastOutSlowIn)
    }
}

/// One playable transition between an entering and a leaving view.
///
/// The navigation pipeline drives this interface; implementations report
/// completion asynchronously (never re-entrantly from `play`).
pub trait TransitionHandle {
    fn duration_ms(&self) -> u64;

    /// Overrides the duration. The pipeline forces `0` for non-animated
    /// transitions so end-state styles apply with no visual motion.
    fn set_duration_ms(&mut self, duration_ms: u64);

    /// Plays from the current progress to completion.
    fn play(&mut self, on_done: Box<dyn FnOnce()>);

    /// Jumps an in-flight playback to its end. `on_done` fires after the
    /// playback's own completion callbacks.
    fn fast_forward(&mut self, on_done: Box<dyn FnOnce()>);

    /// Switches to gesture scrubbing; any scheduled playback stops.
    fn progress_start(&mut self);

    /// Scrubs to `fraction` in `[0, 1]`. Scrubbed motion is linear.
    fn progress(&mut self, fraction: f32);

    /// Finishes a scrub by animating to the end (`commit`) or back to the
    /// start. `velocity` scales the remaining duration (gesture momentum).
    fn progress_end(&mut self, commit: bool, velocity: f32, on_done: Box<dyn FnOnce()>);

    /// Releases resources; pending callbacks are dropped.
    fn dispose(&mut self);
}

/// Builds transition handles for the pipeline. Keyed by the animation name
/// carried in [`NavOptions`].
pub trait TransitionFactory {
    fn create(
        &self,
        entering: &ViewRecord,
        leaving: &ViewRecord,
        options: &NavOptions,
    ) -> Box<dyn TransitionHandle>;
}

/// Stock [`TransitionHandle`] backed by the runtime's frame clock.
pub struct TransitionAnimation {
    state: Rc<RefCell<PlayState>>,
}

struct PlayState {
    runtime: Runtime,
    duration_ms: u64,
    easing: Easing,
    fraction: f32,
    segment_start: f32,
    segment_target: f32,
    segment_ms: u64,
    start_nanos: Option<u64>,
    finish_asap: bool,
    registration: Option<FrameCallbackRegistration>,
    on_done: Vec<Box<dyn FnOnce()>>,
    observer: Option<Rc<dyn Fn(f32)>>,
    disposed: bool,
}

impl TransitionAnimation {
    pub fn new(runtime: Runtime, spec: TransitionSpec) -> Self {
        Self {
            state: Rc::new(RefCell::new(PlayState {
                runtime,
                duration_ms: spec.duration_ms,
                easing: spec.easing,
                fraction: 0.0,
                segment_start: 0.0,
                segment_target: 1.0,
                segment_ms: spec.duration_ms,
                start_nanos: None,
                finish_asap: false,
                registration: None,
                on_done: Vec::new(),
                observer: None,
                disposed: false,
            })),
        }
    }

    /// Current progress fraction in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        self.state.borrow().fraction
    }

    /// Observes every progress change with the eased output fraction.
    pub fn set_progress_observer(&self, observer: impl Fn(f32) + 'static) {
        self.state.borrow_mut().observer = Some(Rc::new(observer));
    }

    fn begin_segment(&self, target: f32, segment_ms: u64, on_done: Box<dyn FnOnce()>) {
        {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                drop(state);
                on_done();
                return;
            }
            state.segment_start = state.fraction;
            state.segment_target = target;
            state.segment_ms = segment_ms;
            state.start_nanos = None;
            state.on_done.push(on_done);
        }
        Self::schedule(&self.state);
    }

    fn schedule(state: &Rc<RefCell<PlayState>>) {
        let runtime = {
            let state = state.borrow();
            if state.registration.is_some() || state.disposed {
                return;
            }
            state.runtime.clone()
        };
        let weak = Rc::downgrade(state);
        let registration = runtime.with_frame_nanos(move |frame_time_nanos| {
            if let Some(state) = weak.upgrade() {
                Self::on_frame(&state, frame_time_nanos);
            }
        });
        state.borrow_mut().registration = Some(registration);
    }

    fn on_frame(state: &Rc<RefCell<PlayState>>, frame_time_nanos: u64) {
        let mut finished_callbacks = Vec::new();
        let mut reschedule = false;
        let notify = {
            let mut state = state.borrow_mut();
            state.registration = None;
            if state.disposed {
                return;
            }

            let start = *state.start_nanos.get_or_insert(frame_time_nanos);
            let elapsed_ms = frame_time_nanos.saturating_sub(start) / 1_000_000;
            let done = state.finish_asap || state.segment_ms == 0 || elapsed_ms >= state.segment_ms;

            if done {
                state.fraction = state.segment_target;
                state.finish_asap = false;
                state.start_nanos = None;
                finished_callbacks = std::mem::take(&mut state.on_done);
            } else {
                let linear = elapsed_ms as f32 / state.segment_ms as f32;
                let span = state.segment_target - state.segment_start;
                state.fraction = state.segment_start + span * linear;
                reschedule = true;
            }
            state.easing.transform(state.fraction)
        };

        let observer = state.borrow().observer.clone();
        if let Some(observer) = observer {
            observer(notify);
        }
        for callback in finished_callbacks {
            callback();
        }
        if reschedule {
            Self::schedule(state);
        }
    }
}

impl TransitionHandle for TransitionAnimation {
    fn duration_ms(&self) -> u64 {
        self.state.borrow().duration_ms
    }

    fn set_duration_ms(&mut self, duration_ms: u64) {
        let mut state = self.state.borrow_mut();
        state.duration_ms = duration_ms;
        state.segment_ms = duration_ms;
    }

    fn play(&mut self, on_done: Box<dyn FnOnce()>) {
        let duration_ms = self.state.borrow().duration_ms;
        self.begin_segment(1.0, duration_ms, on_done);
    }

    fn fast_forward(&mut self, on_done: Box<dyn FnOnce()>) {
        let run_now = {
            let mut state = self.state.borrow_mut();
            let playing = state.registration.is_some() || !state.on_done.is_empty();
            if playing {
                state.finish_asap = true;
                state.on_done.push(on_done);
                None
            } else {
                Some(on_done)
            }
        };
        match run_now {
            Some(on_done) => on_done(),
            None => Self::schedule(&self.state),
        }
    }

    fn progress_start(&mut self) {
        let mut state = self.state.borrow_mut();
        if let Some(registration) = state.registration.take() {
            registration.cancel();
        }
        state.start_nanos = None;
    }

    fn progress(&mut self, fraction: f32) {
        let value = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.fraction = fraction.clamp(0.0, 1.0);
            state.fraction
        };
        let observer = self.state.borrow().observer.clone();
        if let Some(observer) = observer {
            observer(value);
        }
    }

    fn progress_end(&mut self, commit: bool, velocity: f32, on_done: Box<dyn FnOnce()>) {
        let (target, segment_ms) = {
            let state = self.state.borrow();
            let target = if commit { 1.0 } else { 0.0 };
            let remaining = (target - state.fraction).abs();
            let rate = velocity.abs().max(1.0);
            let segment_ms = (remaining * state.duration_ms as f32 / rate) as u64;
            (target, segment_ms)
        };
        self.begin_segment(target, segment_ms, on_done);
    }

    fn dispose(&mut self) {
        let mut state = self.state.borrow_mut();
        if let Some(registration) = state.registration.take() {
            registration.cancel();
        }
        state.on_done.clear();
        state.observer = None;
        state.disposed = true;
    }
}

#[cfg(test)]
#[path = "tests/transition_tests.rs"]
mod tests;
