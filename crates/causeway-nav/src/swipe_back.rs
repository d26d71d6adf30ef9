//! Edge-swipe back gesture.
//!
//! The gesture recognizer feeds raw progress into these entry points. Start
//! stages the active/previous pair through the first two pipeline phases,
//! then scrubs a transition handle directly; release settles it forward or
//! back. One gesture per stack: a second start while one is staging or
//! dragging is ignored.

use std::cell::RefCell;
use std::rc::Rc;

use causeway_core::{NavDirection, NavOptions, ViewRecord, ViewState};

use crate::controller::{NavController, SharedTransition};
use crate::pipeline::TransitionRun;

/// Input stays blocked this long past the last gesture event before the
/// guard lifts on its own.
const SWIPE_GUARD_MS: u64 = 700;
/// Rolling guard while the finger is down; refreshed on every progress
/// event.
const SWIPE_DRAG_GUARD_MS: u64 = 4000;

pub(crate) enum SwipeState {
    Idle,
    /// Waiting for the staged pipeline phases to finish. A release that
    /// lands in this window is held here and settled by the continuation.
    Staging { pending_release: Option<(bool, f32)> },
    Dragging(ActiveSwipe),
}

pub(crate) struct ActiveSwipe {
    handle: SharedTransition,
    entering: ViewRecord,
    leaving: ViewRecord,
    /// Transaction id of the staged run; a newer id at settle time means
    /// the gesture lost the stack to a programmatic navigation.
    trans_id: u64,
}

impl NavController {
    /// Begins the back gesture. No-op when swipe-back is unavailable, a
    /// transition is running, or a gesture is already active.
    pub fn swipe_back_start(&self) {
        if !self.can_swipe_back() || self.is_transitioning() {
            return;
        }
        let started = self.with_swipe_state(|swipe| {
            if matches!(swipe, SwipeState::Idle) {
                *swipe = SwipeState::Staging { pending_release: None };
                true
            } else {
                false
            }
        });
        if !started {
            return;
        }

        let pair = self.active().and_then(|leaving| {
            self.get_previous(&leaving).map(|entering| (entering, leaving))
        });
        let Some((entering, leaving)) = pair else {
            self.with_swipe_state(|swipe| *swipe = SwipeState::Idle);
            return;
        };

        let collaborators = self.collaborators();
        collaborators.app.set_enabled(false, SWIPE_GUARD_MS);
        self.set_transitioning(true, SWIPE_GUARD_MS);

        let opts = NavOptions::new()
            .direction(NavDirection::Back)
            .animation(leaving.transition_name(NavDirection::Back));

        log::debug!("swipe-back staging: {:?} -> {:?}", leaving.page(), entering.page());

        let nav = self.clone();
        let staged_entering = entering.clone();
        let staged_leaving = leaving.clone();
        let staged_opts = opts.clone();
        TransitionRun::start_staged(
            self,
            entering,
            leaving,
            opts,
            Box::new(move |trans_id| {
                let Some(trans_id) = trans_id else {
                    // superseded while staging; the newer transition owns
                    // the stack
                    nav.with_swipe_state(|swipe| *swipe = SwipeState::Idle);
                    return;
                };
                let handle = nav.collaborators().transitions.create(
                    &staged_entering,
                    &staged_leaving,
                    &staged_opts,
                );
                let handle: SharedTransition = Rc::new(RefCell::new(handle));
                handle.borrow_mut().progress_start();
                let active = ActiveSwipe {
                    handle,
                    entering: staged_entering.clone(),
                    leaving: staged_leaving.clone(),
                    trans_id,
                };
                // the finger may already be up; a release recorded while
                // staging settles the gesture right away
                let pending = nav.with_swipe_state(|swipe| match swipe {
                    SwipeState::Staging { pending_release } => pending_release.take(),
                    _ => None,
                });
                match pending {
                    Some((commit, velocity)) => {
                        nav.with_swipe_state(|swipe| *swipe = SwipeState::Idle);
                        nav.finish_swipe(active, commit, velocity);
                    }
                    None => {
                        nav.with_swipe_state(|swipe| *swipe = SwipeState::Dragging(active));
                    }
                }
            }),
        );
    }

    /// Scrubs the staged transition to `value` in `[0, 1]`.
    pub fn swipe_back_progress(&self, value: f32) {
        let handle = self.with_swipe_state(|swipe| match swipe {
            SwipeState::Dragging(active) => Some(active.handle.clone()),
            _ => None,
        });
        let Some(handle) = handle else {
            return;
        };
        self.collaborators().app.set_enabled(false, SWIPE_DRAG_GUARD_MS);
        self.set_transitioning(true, SWIPE_DRAG_GUARD_MS);
        handle.borrow_mut().progress(value);
    }

    /// Releases the gesture. `commit` pops the view; otherwise the stack
    /// animates back to where it was. `velocity` carries the gesture
    /// momentum into the settle animation.
    pub fn swipe_back_end(&self, commit: bool, velocity: f32) {
        let swipe = self.with_swipe_state(|swipe| {
            match std::mem::replace(swipe, SwipeState::Idle) {
                SwipeState::Dragging(active) => Some(active),
                SwipeState::Staging { .. } => {
                    // staged phases have not landed yet; hold the release
                    // for the continuation
                    *swipe = SwipeState::Staging {
                        pending_release: Some((commit, velocity)),
                    };
                    None
                }
                SwipeState::Idle => None,
            }
        });
        let Some(swipe) = swipe else {
            return;
        };
        self.finish_swipe(swipe, commit, velocity);
    }

    fn finish_swipe(&self, swipe: ActiveSwipe, commit: bool, velocity: f32) {
        self.collaborators().app.set_enabled(false, SWIPE_GUARD_MS);
        self.set_transitioning(true, SWIPE_GUARD_MS);

        let nav = self.clone();
        let handle = swipe.handle.clone();
        handle
            .borrow_mut()
            .progress_end(commit, velocity, Box::new(move || nav.settle_swipe(swipe, commit)));
    }

    fn settle_swipe(&self, swipe: ActiveSwipe, commit: bool) {
        let stale = self.current_trans_id() != swipe.trans_id;
        if stale {
            // a programmatic navigation took over mid-gesture; just drop
            // anything still marked in-flight by the staging
            if swipe.entering.state() == ViewState::TransEnter {
                swipe.entering.set_state(ViewState::Inactive);
            }
            if swipe.leaving.state() == ViewState::TransLeave {
                swipe.leaving.set_state(ViewState::Inactive);
            }
            swipe.handle.borrow_mut().dispose();
            return;
        }

        if commit {
            swipe.entering.set_state(ViewState::Active);
            swipe.leaving.set_state(ViewState::Inactive);
            swipe.entering.did_enter();
            swipe.leaving.did_leave();
            swipe.leaving.did_unload();
            self.evict(&swipe.leaving);
            swipe.leaving.destroy();
            self.collaborators()
                .router
                .state_change(NavDirection::Back, &swipe.entering);
            self.restore_visibility(&swipe.entering);
            log::debug!("swipe-back committed to {:?}", swipe.entering.page());
        } else {
            swipe.leaving.set_state(ViewState::Active);
            swipe.entering.set_state(ViewState::Inactive);
            swipe.leaving.will_enter();
            swipe.leaving.did_enter();
            swipe.entering.did_leave();
            self.restore_visibility(&swipe.leaving);
            log::debug!("swipe-back cancelled, {:?} stays", swipe.leaving.page());
        }

        self.collaborators().app.set_enabled(true, 0);
        self.set_transitioning(false, 0);
        swipe.handle.borrow_mut().dispose();
    }

    /// Shows exactly `active` and its predecessor.
    fn restore_visibility(&self, active: &ViewRecord) {
        let renderer = self.collaborators().renderer;
        let previous = self.get_previous(active);
        for view in self.views_snapshot() {
            let show = view.ptr_eq(active)
                || previous.as_ref().is_some_and(|previous| view.ptr_eq(previous));
            renderer.set_visible(&view, show);
        }
    }
}
