//! The public navigation API.
//!
//! A [`NavController`] owns one [`NavStack`] and turns the public operations
//! (push, pop, set-pages, present, remove) into stack mutations plus a
//! transition run. All state lives behind a single `Rc<RefCell<_>>`, so the
//! controller handle is cheap to clone into callbacks; no method holds the
//! borrow across a lifecycle hook or collaborator call.

use std::cell::RefCell;
use std::rc::Rc;

use causeway_core::{
    NavDirection, NavOptions, NavStack, PageKind, Params, Runtime, ViewRecord, ViewState,
};

use causeway_animation::TransitionHandle;

use crate::collaborators::Collaborators;
use crate::config::NavConfig;
use crate::error::NavError;
use crate::future::{completion_pair, NavFuture};
use crate::pipeline::TransitionRun;
use crate::swipe_back::SwipeState;

/// Composition role of a controller within the host tree. Overlays can only
/// be presented onto a plain stack at the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostKind {
    Stack,
    Tabs,
}

pub(crate) type SharedTransition = Rc<RefCell<Box<dyn TransitionHandle>>>;

pub(crate) struct NavInner {
    kind: HostKind,
    parent: Option<NavController>,
    stack: NavStack,
    runtime: Runtime,
    collaborators: Collaborators,
    config: NavConfig,
    /// Highest transaction id issued so far; only the newest transition may
    /// commit its end state.
    trans_ids: u64,
    /// Frame-clock deadline until which the controller counts as
    /// transitioning. Zero when idle.
    trans_deadline_ms: u64,
    /// Whether the first transition has completed.
    init: bool,
    last_trans: Option<SharedTransition>,
    pub(crate) swipe: SwipeState,
}

/// Cheaply cloneable handle to one navigation stack and its pipeline.
#[derive(Clone)]
pub struct NavController {
    inner: Rc<RefCell<NavInner>>,
}

impl NavController {
    /// `id` identifies this controller to its records; the embedder keeps
    /// ids unique across controllers.
    pub fn new(id: u64, kind: HostKind, runtime: Runtime, collaborators: Collaborators) -> Self {
        Self {
            inner: Rc::new(RefCell::new(NavInner {
                kind,
                parent: None,
                stack: NavStack::new(id),
                runtime,
                collaborators,
                config: NavConfig::default(),
                trans_ids: 0,
                trans_deadline_ms: 0,
                init: false,
                last_trans: None,
                swipe: SwipeState::Idle,
            })),
        }
    }

    pub fn config(&self) -> NavConfig {
        self.inner.borrow().config
    }

    pub fn set_config(&self, config: NavConfig) {
        self.inner.borrow_mut().config = config;
    }

    /// Nests this controller under `parent` for root-host resolution.
    pub fn set_parent(&self, parent: &NavController) {
        self.inner.borrow_mut().parent = Some(parent.clone());
    }

    pub fn kind(&self) -> HostKind {
        self.inner.borrow().kind
    }

    /// Root-most controller reachable through parent links.
    pub fn root_host(&self) -> NavController {
        let mut current = self.clone();
        loop {
            let parent = current.inner.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    // ---- stack operations ------------------------------------------------

    /// Pushes a page onto the end of the stack and transitions to it.
    pub fn push(
        &self,
        page: impl Into<PageKind>,
        params: Params,
        opts: NavOptions,
    ) -> NavFuture {
        self.insert_views(usize::MAX, vec![ViewRecord::new(page.into(), params)], opts)
    }

    /// Inserts a page at `index` (clamped; past-the-end appends). The
    /// inserted page becomes the enter candidate; it only stays put when
    /// another view above it is already active or queued to enter.
    pub fn insert(
        &self,
        index: usize,
        page: impl Into<PageKind>,
        params: Params,
        opts: NavOptions,
    ) -> NavFuture {
        self.insert_views(index, vec![ViewRecord::new(page.into(), params)], opts)
    }

    /// Inserts several records at `index`; the last one becomes the
    /// candidate active view.
    pub fn insert_pages(
        &self,
        index: usize,
        views: Vec<ViewRecord>,
        opts: NavOptions,
    ) -> NavFuture {
        self.insert_views(index, views, opts)
    }

    /// Displays an overlay record on the root-most host. Fails when the
    /// root host is a tab container. The record is excluded from the view
    /// cache and carries auto-derived options for its later dismissal.
    pub fn present(&self, view: ViewRecord, opts: NavOptions) -> NavFuture {
        let root = self.root_host();
        if root.kind() == HostKind::Tabs {
            log::warn!("present: root host is a tab container; overlay rejected");
            return NavFuture::resolved(Err(NavError::PresentRequiresStack));
        }

        let mut opts = opts;
        opts.keyboard_close = false;
        opts.skip_cache = true;
        opts.direction = Some(NavDirection::Forward);
        if opts.animation.is_none() {
            opts.animation = Some(view.transition_name(NavDirection::Forward));
        }

        view.set_leaving_opts(
            NavOptions::new()
                .direction(NavDirection::Back)
                .animation(view.transition_name(NavDirection::Back))
                .keyboard_close(false)
                .skip_cache(),
        );

        root.insert_views(usize::MAX, vec![view], opts)
    }

    /// Navigates back one view. The record to dismiss is whichever is
    /// furthest along: mid-enter, queued to enter, or active.
    pub fn pop(&self, opts: NavOptions) -> NavFuture {
        let (index, len) = {
            let inner = self.inner.borrow();
            let target = pop_target(&inner.stack);
            (
                target.and_then(|view| inner.stack.index_of(&view)),
                inner.stack.len(),
            )
        };
        match index {
            Some(index) if index > 0 => self.remove(index, 1, opts),
            // the root view is not poppable
            _ => NavFuture::resolved(Err(NavError::RemoveOutOfRange { index: 0, len })),
        }
    }

    /// Pops every view above `view`.
    pub fn pop_to(&self, view: &ViewRecord, opts: NavOptions) -> NavFuture {
        let (start, active_index, len) = {
            let inner = self.inner.borrow();
            let target = pop_target(&inner.stack);
            (
                inner.stack.index_of(view),
                target.and_then(|target| inner.stack.index_of(&target)),
                inner.stack.len(),
            )
        };
        let Some(start) = start else {
            return NavFuture::resolved(Err(NavError::RemoveOutOfRange { index: len, len }));
        };
        match active_index {
            Some(active_index) if active_index > start => {
                self.remove(start + 1, active_index - start, opts)
            }
            _ => NavFuture::resolved(Ok(())),
        }
    }

    pub fn pop_to_root(&self, opts: NavOptions) -> NavFuture {
        let first = self.first();
        match first {
            Some(first) => self.pop_to(&first, opts),
            None => NavFuture::resolved(Err(NavError::RemoveOutOfRange { index: 0, len: 0 })),
        }
    }

    /// Replaces the whole stack with `views`. Defaults to a non-animated,
    /// backward-styled switch.
    pub fn set_pages(&self, views: Vec<ViewRecord>, opts: NavOptions) -> NavFuture {
        if views.is_empty() {
            return NavFuture::resolved(Err(NavError::InvalidPages));
        }

        let (leaving, doomed) = {
            let mut inner = self.inner.borrow_mut();
            let len = inner.stack.len();
            inner.stack.mark_removals(0, len)
        };
        self.finalize_removed(doomed);

        let entering = {
            let mut inner = self.inner.borrow_mut();
            inner.stack.insert(0, views)
        };
        let Some(entering) = entering else {
            return NavFuture::resolved(Err(NavError::InvalidPages));
        };

        let mut opts = opts;
        if opts.animate != Some(true) {
            opts.animate = Some(false);
        }
        if opts.direction.is_none() {
            opts.direction = Some(NavDirection::Back);
        }

        let (future, resolver) = completion_pair();
        TransitionRun::start(self, Some(entering), leaving, opts, resolver);
        future
    }

    pub fn set_root(
        &self,
        page: impl Into<PageKind>,
        params: Params,
        opts: NavOptions,
    ) -> NavFuture {
        self.set_pages(vec![ViewRecord::new(page.into(), params)], opts)
    }

    /// Removes `count` records starting at `start`. Removing the active
    /// view animates back to the nearest surviving predecessor; removals
    /// strictly below the active view complete without a transition.
    pub fn remove(&self, start: usize, count: usize, opts: NavOptions) -> NavFuture {
        let len = self.len();
        if start >= len {
            return NavFuture::resolved(Err(NavError::RemoveOutOfRange { index: start, len }));
        }

        let mut opts = opts;
        if opts.direction.is_none() {
            opts.direction = Some(NavDirection::Back);
        }
        let direction = opts.direction_or(NavDirection::Back);

        let (leaving, doomed) = {
            let mut inner = self.inner.borrow_mut();
            inner.stack.mark_removals(start, count)
        };
        self.finalize_removed(doomed);

        if let Some(leaving) = leaving {
            // a dismissal applies whatever options `present` installed
            if let Some(installed) = leaving.leaving_opts() {
                opts.keyboard_close = installed.keyboard_close;
                opts.skip_cache = installed.skip_cache;
                if opts.animation.is_none() {
                    opts.animation = installed.animation.clone();
                }
            }
            if opts.animation.is_none() {
                opts.animation = Some(leaving.transition_name(direction));
            }
            let entering = self.get_by_state(ViewState::InitEnter);
            let (future, resolver) = completion_pair();
            TransitionRun::start(self, entering, Some(leaving), opts, resolver);
            return future;
        }

        if let Some(forced) = self.get_by_state(ViewState::ForceActive) {
            // removal raced an in-flight transition: rush that transition to
            // its end, then promote the forced record without animation
            if opts.animation.is_none() {
                opts.animation = Some(forced.transition_name(direction));
            }
            let last_trans = self.inner.borrow_mut().last_trans.take();
            if let Some(handle) = last_trans {
                let (future, resolver) = completion_pair();
                let nav = self.clone();
                let keep = handle.clone();
                handle.borrow_mut().fast_forward(Box::new(move || {
                    let mut opts = opts;
                    opts.animate = Some(false);
                    TransitionRun::start(&nav, Some(forced), None, opts, resolver);
                    drop(keep);
                }));
                return future;
            }
            return NavFuture::resolved(Ok(()));
        }

        // only records below the active view were removed
        NavFuture::resolved(Ok(()))
    }

    fn insert_views(&self, index: usize, views: Vec<ViewRecord>, opts: NavOptions) -> NavFuture {
        if views.is_empty() {
            return NavFuture::resolved(Err(NavError::InvalidPages));
        }

        let entering = {
            let mut inner = self.inner.borrow_mut();
            inner.stack.insert(index, views)
        };
        let Some(entering) = entering else {
            return NavFuture::resolved(Err(NavError::InvalidPages));
        };

        let mut opts = opts;
        if opts.direction.is_none() {
            opts.direction = Some(NavDirection::Forward);
        }
        if opts.animation.is_none() {
            let direction = opts.direction_or(NavDirection::Forward);
            opts.animation = Some(entering.transition_name(direction));
        }

        // walk down from the top: if the first enter-or-active record is the
        // new one it needs to transition in; otherwise it was inserted below
        // the current view and nothing moves
        let needs_transition = {
            let inner = self.inner.borrow();
            inner
                .stack
                .views()
                .iter()
                .rev()
                .find(|view| {
                    matches!(view.state(), ViewState::Active | ViewState::InitEnter)
                })
                .is_some_and(|view| view.ptr_eq(&entering))
        };
        if !needs_transition {
            return NavFuture::resolved(Ok(()));
        }

        let leaving = self.get_by_state(ViewState::InitLeave);
        let (future, resolver) = completion_pair();
        TransitionRun::start(self, Some(entering), leaving, opts, resolver);
        future
    }

    fn finalize_removed(&self, doomed: Vec<ViewRecord>) {
        for view in doomed {
            view.will_leave();
            view.did_leave();
            view.did_unload();
            self.inner.borrow_mut().stack.evict(&view);
            view.destroy();
        }
    }

    // ---- queries ---------------------------------------------------------

    pub fn len(&self) -> usize {
        self.inner.borrow().stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().stack.is_empty()
    }

    pub fn active(&self) -> Option<ViewRecord> {
        self.inner.borrow().stack.get_active()
    }

    pub fn first(&self) -> Option<ViewRecord> {
        self.inner.borrow().stack.first()
    }

    pub fn last(&self) -> Option<ViewRecord> {
        self.inner.borrow().stack.last()
    }

    pub fn get_by_index(&self, index: usize) -> Option<ViewRecord> {
        self.inner.borrow().stack.get_by_index(index)
    }

    pub fn get_previous(&self, view: &ViewRecord) -> Option<ViewRecord> {
        self.inner.borrow().stack.get_previous(view)
    }

    pub fn index_of(&self, view: &ViewRecord) -> Option<usize> {
        self.inner.borrow().stack.index_of(view)
    }

    /// Whether the active view accepts the back affordance. A root view
    /// has nowhere to go back to, whatever its flag says.
    pub fn can_go_back(&self) -> bool {
        self.active()
            .map(|view| view.enable_back() && self.get_previous(&view).is_some())
            .unwrap_or(false)
    }

    pub fn is_swipe_back_enabled(&self) -> bool {
        self.inner.borrow().config.swipe_back_enabled
    }

    pub fn set_swipe_back_enabled(&self, enabled: bool) {
        self.inner.borrow_mut().config.swipe_back_enabled = enabled;
    }

    pub fn can_swipe_back(&self) -> bool {
        self.is_swipe_back_enabled() && self.can_go_back()
    }

    /// Whether a transition is currently believed to be in flight. Backed
    /// by a frame-clock deadline so a transition that never reports back
    /// cannot wedge the controller.
    pub fn is_transitioning(&self) -> bool {
        let inner = self.inner.borrow();
        inner.runtime.now_millis() < inner.trans_deadline_ms
    }

    // ---- pipeline internals ----------------------------------------------

    pub fn runtime(&self) -> Runtime {
        self.inner.borrow().runtime.clone()
    }

    pub(crate) fn collaborators(&self) -> Collaborators {
        self.inner.borrow().collaborators.clone()
    }

    pub(crate) fn next_trans_id(&self) -> u64 {
        let mut inner = self.inner.borrow_mut();
        inner.trans_ids += 1;
        inner.trans_ids
    }

    pub(crate) fn current_trans_id(&self) -> u64 {
        self.inner.borrow().trans_ids
    }

    pub(crate) fn set_transitioning(&self, transitioning: bool, fallback_ms: u64) {
        let mut inner = self.inner.borrow_mut();
        inner.trans_deadline_ms = if transitioning {
            inner.runtime.now_millis() + fallback_ms
        } else {
            0
        };
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.inner.borrow().init
    }

    pub(crate) fn mark_initialized(&self) {
        self.inner.borrow_mut().init = true;
    }

    pub(crate) fn set_last_trans(&self, handle: SharedTransition) {
        self.inner.borrow_mut().last_trans = Some(handle);
    }

    pub(crate) fn clear_last_trans(&self) {
        self.inner.borrow_mut().last_trans = None;
    }

    pub(crate) fn get_by_state(&self, state: ViewState) -> Option<ViewRecord> {
        self.inner.borrow().stack.get_by_state(state)
    }

    pub(crate) fn views_snapshot(&self) -> Vec<ViewRecord> {
        self.inner.borrow().stack.views().to_vec()
    }

    pub(crate) fn evict(&self, view: &ViewRecord) -> bool {
        self.inner.borrow_mut().stack.evict(view)
    }

    pub(crate) fn with_swipe_state<R>(&self, f: impl FnOnce(&mut SwipeState) -> R) -> R {
        f(&mut self.inner.borrow_mut().swipe)
    }

    /// Evicts and destroys every record the finished transition left
    /// unreachable: all `RemoveAfterTrans` records plus every `Inactive`
    /// record above the active one or marked non-cacheable. `ForceActive`
    /// records survive; a queued follow-up transition owns them.
    pub(crate) fn cleanup(&self) {
        let doomed: Vec<ViewRecord> = {
            let inner = self.inner.borrow();
            let floor = inner
                .stack
                .get_active()
                .and_then(|active| inner.stack.index_of(&active))
                .map(|index| index + 1)
                .unwrap_or(0);
            inner
                .stack
                .views()
                .iter()
                .enumerate()
                .filter(|(index, view)| {
                    view.state() == ViewState::RemoveAfterTrans
                        || (view.state() == ViewState::Inactive
                            && (*index >= floor || !view.cacheable()))
                })
                .map(|(_, view)| view.clone())
                .collect()
        };
        for view in doomed {
            self.inner.borrow_mut().stack.evict(&view);
            view.destroy();
        }
    }
}

/// The record a pop dismisses, in order of how far along it is.
fn pop_target(stack: &NavStack) -> Option<ViewRecord> {
    stack
        .get_by_state(ViewState::TransEnter)
        .or_else(|| stack.get_by_state(ViewState::InitEnter))
        .or_else(|| stack.get_active())
}
