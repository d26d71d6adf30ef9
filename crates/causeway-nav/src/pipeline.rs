//! The five-phase transition pipeline.
//!
//! A [`TransitionRun`] carries one transition request through render,
//! post-render, before-transition, after-transition and completion. The
//! phases are chained through the runtime's frame clock and the async
//! collaborators, with an abort checkpoint at each resumption: when a newer
//! request has demoted this run's entering record back to `Inactive`, the
//! run falls through to completion, where the transaction-id check makes it
//! a no-op.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use causeway_core::{
    FrameCallbackRegistration, NavDirection, NavOptions, ViewRecord, ViewState,
};

use crate::controller::NavController;
use crate::error::NavError;
use crate::future::NavResolver;

/// Base stacking order when the counterpart view gives no reference point.
pub(crate) const BASE_Z_INDEX: i32 = 10;
/// How long a controller stays "transitioning" while waiting on content
/// construction, if the loader never reports back.
pub(crate) const TRANSITION_FALLBACK_MS: u64 = 500;
/// Upper bound on waiting for the keyboard-close acknowledgment.
pub(crate) const KEYBOARD_WAIT_MS: u64 = 32;
/// Transitions shorter than this never block input; the block would flicker.
pub(crate) const INPUT_BLOCK_THRESHOLD_MS: u64 = 64;

/// Continuation invoked by a staged (gesture-driven) run once phases 1 and 2
/// finish. `Some(id)` carries the run's transaction id; `None` means the run
/// was superseded before staging completed.
pub(crate) type StagedContinuation = Box<dyn FnOnce(Option<u64>)>;

pub(crate) struct TransitionRun {
    nav: NavController,
    trans_id: u64,
    entering: ViewRecord,
    leaving: ViewRecord,
    opts: NavOptions,
    animate: Cell<bool>,
    was_transitioning: Cell<bool>,
    resolver: RefCell<Option<NavResolver>>,
    frame_reg: RefCell<Option<FrameCallbackRegistration>>,
    staged: RefCell<Option<StagedContinuation>>,
}

impl TransitionRun {
    /// Kicks off a transition that plays to completion.
    pub(crate) fn start(
        nav: &NavController,
        entering: Option<ViewRecord>,
        leaving: Option<ViewRecord>,
        opts: NavOptions,
        resolver: NavResolver,
    ) {
        Self::launch(nav, entering, leaving, opts, Some(resolver), None);
    }

    /// Kicks off a staged run: phases 1 and 2 only, then hands control to
    /// `staged`. The swipe-back controller drives the animation itself.
    pub(crate) fn start_staged(
        nav: &NavController,
        entering: ViewRecord,
        leaving: ViewRecord,
        opts: NavOptions,
        staged: StagedContinuation,
    ) {
        Self::launch(nav, Some(entering), Some(leaving), opts, None, Some(staged));
    }

    fn launch(
        nav: &NavController,
        entering: Option<ViewRecord>,
        leaving: Option<ViewRecord>,
        opts: NavOptions,
        resolver: Option<NavResolver>,
        staged: Option<StagedContinuation>,
    ) {
        let trans_id = nav.next_trans_id();
        let leaving = leaving.unwrap_or_else(ViewRecord::placeholder);
        let entering = entering.unwrap_or_else(|| {
            let placeholder = ViewRecord::placeholder();
            placeholder.mark_loaded();
            placeholder
        });

        // skip-cache marks the record the caller never wants parked in the
        // stack: the entering view on the way in, the leaving view on its
        // dismissal
        if opts.skip_cache {
            match opts.direction {
                Some(NavDirection::Back) => leaving.set_cacheable(false),
                _ => entering.set_cacheable(false),
            }
        }

        // a single-view stack that has never shown anything, a disabled
        // master switch, and preloads all snap straight to the end state
        let config = nav.config();
        let animate = opts.animate_or(true)
            && config.animate
            && !opts.preload
            && !(nav.len() == 1 && !nav.is_initialized());

        let run = Rc::new(TransitionRun {
            nav: nav.clone(),
            trans_id,
            entering,
            leaving,
            opts,
            animate: Cell::new(animate),
            was_transitioning: Cell::new(false),
            resolver: RefCell::new(resolver),
            frame_reg: RefCell::new(None),
            staged: RefCell::new(staged),
        });

        log::debug!(
            "transition {} begins: {:?} -> {:?}",
            run.trans_id,
            run.leaving.page(),
            run.entering.page()
        );

        if run.entering.ptr_eq(&run.leaving) {
            // nothing to move; skip straight to completion
            run.complete(None);
            return;
        }
        run.render();
    }

    fn direction(&self) -> NavDirection {
        self.opts.direction_or(NavDirection::Forward)
    }

    /// A newer request demoted this run's entering record; nothing visible
    /// belongs to this run anymore.
    fn superseded(&self) -> bool {
        self.entering.state() == ViewState::Inactive
    }

    /// Phase 1: stage the pair and make sure the entering content exists.
    /// Runs synchronously with the launch, so no checkpoint yet; the first
    /// one comes after the async construction.
    fn render(self: &Rc<Self>) {
        self.entering.set_state(ViewState::InitEnter);
        self.leaving.set_state(ViewState::InitLeave);
        self.was_transitioning.set(self.nav.is_transitioning());

        if self.entering.is_loaded() {
            self.post_render();
            return;
        }

        self.nav.set_transitioning(true, TRANSITION_FALLBACK_MS);
        let run = Rc::clone(self);
        let loader = self.nav.collaborators().loader;
        loader.construct(
            &self.entering,
            Box::new(move |result| match result {
                Ok(()) => {
                    run.entering.mark_loaded();
                    run.post_render();
                }
                Err(reason) => run.fail_load(reason),
            }),
        );
    }

    /// Phase 2: stacking order, visibility, will-enter/will-leave, then one
    /// frame for the embedder to settle before movement starts.
    fn post_render(self: &Rc<Self>) {
        if self.superseded() {
            return self.complete(Some(self.direction()));
        }

        if self.opts.preload {
            // preloads build content only: no hooks, no frame wait
            self.animate.set(false);
            self.after_tick();
            return;
        }

        self.apply_z_index();

        let renderer = self.nav.collaborators().renderer;
        if self.was_transitioning.get() {
            // another transition may still reference the other views, so
            // only make sure this pair is visible
            renderer.set_visible(&self.entering, true);
            renderer.set_visible(&self.leaving, true);
        } else {
            for view in self.nav.views_snapshot() {
                let show = view.ptr_eq(&self.entering) || view.ptr_eq(&self.leaving);
                renderer.set_visible(&view, show);
            }
        }

        self.entering.will_enter();
        self.leaving.will_leave();

        let run = Rc::clone(self);
        let registration = self.nav.runtime().with_frame_nanos(move |_| {
            run.frame_reg.borrow_mut().take();
            run.after_tick();
        });
        *self.frame_reg.borrow_mut() = Some(registration);
    }

    fn after_tick(self: &Rc<Self>) {
        if let Some(staged) = self.staged.borrow_mut().take() {
            if self.superseded() {
                staged(None);
            } else {
                self.entering.set_state(ViewState::TransEnter);
                self.leaving.set_state(ViewState::TransLeave);
                staged(Some(self.trans_id));
            }
            return;
        }
        self.before_transition();
    }

    /// Phase 3: mark the pair in-flight, build the animation, gate input
    /// and play.
    fn before_transition(self: &Rc<Self>) {
        if self.superseded() {
            return self.complete(Some(self.direction()));
        }

        self.entering.set_state(ViewState::TransEnter);
        self.leaving.set_state(ViewState::TransLeave);

        let collaborators = self.nav.collaborators();
        let handle = collaborators
            .transitions
            .create(&self.entering, &self.leaving, &self.opts);
        let handle = Rc::new(RefCell::new(handle));
        if !self.animate.get() {
            handle.borrow_mut().set_duration_ms(0);
        }

        let duration_ms = handle.borrow().duration_ms();
        let block_input = duration_ms >= INPUT_BLOCK_THRESHOLD_MS;
        collaborators.app.set_enabled(!block_input, duration_ms);
        self.nav.set_transitioning(block_input, duration_ms);
        self.nav.set_last_trans(handle.clone());

        let run = Rc::clone(self);
        let play_handle = handle.clone();
        let play = move || {
            let done_handle = play_handle.clone();
            play_handle.borrow_mut().play(Box::new(move || {
                done_handle.borrow_mut().dispose();
                run.after_transition();
            }));
        };

        let delay_ms = self.nav.config().transition_delay_ms;
        if delay_ms > 0 && self.animate.get() {
            let deadline = self.nav.runtime().now_millis() + delay_ms;
            self.wait_until(deadline, Box::new(play));
        } else {
            play();
        }
    }

    /// Phase 4: did-enter/did-leave, then give the keyboard a chance to get
    /// out of the way before the new view is confirmed.
    fn after_transition(self: &Rc<Self>) {
        if !self.opts.preload {
            self.entering.did_enter();
            self.leaving.did_leave();
        }

        if self.superseded() {
            return self.complete(Some(self.direction()));
        }

        let keyboard = self.nav.collaborators().keyboard;
        if self.opts.keyboard_close && keyboard.is_open() {
            keyboard.close();
            let run = Rc::clone(self);
            keyboard.on_close(
                Box::new(move || run.complete(Some(run.direction()))),
                KEYBOARD_WAIT_MS,
            );
        } else {
            self.complete(Some(self.direction()));
        }
    }

    /// Phase 5: commit if this is still the newest transition, otherwise
    /// only downgrade whatever this run left in flight.
    fn complete(self: &Rc<Self>, direction: Option<NavDirection>) {
        if self.nav.current_trans_id() == self.trans_id {
            if self.entering.state() != ViewState::RemoveAfterTrans {
                self.entering.set_state(ViewState::Active);
            }
            if !matches!(
                self.leaving.state(),
                ViewState::RemoveAfterTrans | ViewState::ForceActive
            ) {
                self.leaving.set_state(ViewState::Inactive);
            }

            self.nav.cleanup();

            // exactly the confirmed view and its predecessor stay rendered
            let renderer = self.nav.collaborators().renderer;
            let previous = self.nav.get_previous(&self.entering);
            for view in self.nav.views_snapshot() {
                let show = view.ptr_eq(&self.entering)
                    || previous.as_ref().is_some_and(|previous| view.ptr_eq(previous));
                renderer.set_visible(&view, show);
            }

            self.nav.mark_initialized();
            self.nav.collaborators().app.set_enabled(true, 0);
            self.nav.set_transitioning(false, 0);
            self.nav.clear_last_trans();

            if let Some(direction) = direction {
                self.nav
                    .collaborators()
                    .router
                    .state_change(direction, &self.entering);
            }
            log::debug!("transition {} committed", self.trans_id);
        } else {
            // a newer transition owns the stack now; just make sure this
            // run's pair is not left marked in-flight
            if self.entering.state() == ViewState::TransEnter {
                self.entering.set_state(ViewState::Inactive);
            }
            if self.leaving.state() == ViewState::TransLeave {
                self.leaving.set_state(ViewState::Inactive);
            }
            log::debug!("transition {} superseded", self.trans_id);
        }

        if let Some(resolver) = self.resolver.borrow_mut().take() {
            resolver.resolve(Ok(()));
        }
        if let Some(staged) = self.staged.borrow_mut().take() {
            staged(None);
        }
    }

    /// Construction failed: drop the unloadable record, restore the leaving
    /// view and report the error on the operation's future.
    fn fail_load(self: &Rc<Self>, reason: String) {
        let page = self
            .entering
            .page()
            .map(|page| page.name().to_owned())
            .unwrap_or_default();
        log::warn!("failed to construct page {page}: {reason}");

        self.nav.evict(&self.entering);
        self.entering.destroy();
        if !self.leaving.is_placeholder() && self.leaving.state() == ViewState::InitLeave {
            self.leaving.set_state(ViewState::Active);
        }
        self.nav.set_transitioning(false, 0);

        if let Some(resolver) = self.resolver.borrow_mut().take() {
            resolver.resolve(Err(NavError::LoadFailed { page, reason }));
        }
        if let Some(staged) = self.staged.borrow_mut().take() {
            staged(None);
        }
    }

    /// Entering views stack directly above (forward) or below (back) the
    /// reference view: the latest record still animating in if there is
    /// one, otherwise the leaving view.
    fn apply_z_index(&self) {
        let reference = self
            .nav
            .get_by_state(ViewState::TransEnter)
            .unwrap_or_else(|| self.leaving.clone());
        let z_index = if reference.is_placeholder() || !reference.is_loaded() {
            BASE_Z_INDEX
        } else if self.direction() == NavDirection::Back {
            reference.z_index() - 1
        } else {
            reference.z_index() + 1
        };
        self.entering.set_z_index(z_index);
        self.nav
            .collaborators()
            .renderer
            .set_z_index(&self.entering, z_index);
    }

    /// Walks frames until the logical clock passes `deadline_ms`.
    fn wait_until(self: &Rc<Self>, deadline_ms: u64, then: Box<dyn FnOnce()>) {
        let run = Rc::clone(self);
        let registration = self.nav.runtime().with_frame_nanos(move |_| {
            run.frame_reg.borrow_mut().take();
            if run.nav.runtime().now_millis() >= deadline_ms {
                then();
            } else {
                run.wait_until(deadline_ms, then);
            }
        });
        *self.frame_reg.borrow_mut() = Some(registration);
    }
}
