//! One navigable screen instance and its lifecycle state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::{NavDirection, NavOptions, Params};

/// Default transition styles a record declares unless overridden.
pub const DEFAULT_FORWARD_TRANSITION: &str = "push-transition";
pub const DEFAULT_BACK_TRANSITION: &str = "pop-transition";

/// Lifecycle state of a [`ViewRecord`] within its stack.
///
/// After any completed mutation a stack holds at most one record in each of
/// `Active`, `InitEnter`, `InitLeave`, `TransEnter` and `TransLeave`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewState {
    /// In history but not shown and not part of any pending transition.
    Inactive,
    /// Queued to animate in once the current transition request starts.
    InitEnter,
    /// Queued to animate out.
    InitLeave,
    /// Currently animating in.
    TransEnter,
    /// Currently animating out.
    TransLeave,
    /// The one confirmed visible view.
    Active,
    /// Marked for synchronous eviction; no animation will reference it.
    Remove,
    /// Mid-transition when removal was requested; evicted once the visible
    /// transition finishes.
    RemoveAfterTrans,
    /// Must become the next confirmed active view once the in-flight
    /// transition settles; set when removal races an ongoing transition.
    ForceActive,
}

impl ViewState {
    /// Whether the record is visibly animating right now.
    pub fn mid_transition(self) -> bool {
        matches!(self, ViewState::TransEnter | ViewState::TransLeave)
    }

    pub fn marked_for_removal(self) -> bool {
        matches!(self, ViewState::Remove | ViewState::RemoveAfterTrans)
    }
}

/// Identifies a page component type. Construction of the actual content is
/// the content loader's concern; the core only carries the name through.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PageKind(Rc<str>);

impl PageKind {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PageKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Debug for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageKind({})", self.0)
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Page lifecycle callbacks, fired by the engine as the record moves
/// through its states. All methods default to no-ops; pages implement the
/// ones they care about.
pub trait PageEvents {
    /// Content was constructed. Fires once per record, never again for a
    /// cached view.
    fn loaded(&self) {}
    fn will_enter(&self) {}
    fn did_enter(&self) {}
    fn will_leave(&self) {}
    fn did_leave(&self) {}
    fn did_unload(&self) {}
}

type DestroyHooks = SmallVec<[Box<dyn FnOnce()>; 2]>;

/// Cheaply cloneable handle to one screen instance. A record belongs to at
/// most one [`crate::NavStack`] at a time; ownership transfers on
/// [`ViewRecord::set_nav`].
#[derive(Clone)]
pub struct ViewRecord {
    inner: Rc<RefCell<ViewInner>>,
}

struct ViewInner {
    page: Option<PageKind>,
    params: Params,
    state: ViewState,
    id: u64,
    nav_id: Option<u64>,
    z_index: i32,
    loaded: bool,
    destroyed: bool,
    cacheable: bool,
    enable_back: bool,
    forward_transition: Rc<str>,
    back_transition: Rc<str>,
    leaving_opts: Option<NavOptions>,
    events: Option<Rc<dyn PageEvents>>,
    destroy_hooks: DestroyHooks,
}

impl ViewRecord {
    pub fn new(page: PageKind, params: Params) -> Self {
        Self::build(Some(page), params)
    }

    /// Synthetic stand-in for a missing entering or leaving view, so the
    /// transition pipeline never special-cases "no counterpart".
    pub fn placeholder() -> Self {
        Self::build(None, Params::new())
    }

    fn build(page: Option<PageKind>, params: Params) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ViewInner {
                page,
                params,
                state: ViewState::Inactive,
                id: 0,
                nav_id: None,
                z_index: 0,
                loaded: false,
                destroyed: false,
                cacheable: true,
                enable_back: true,
                forward_transition: Rc::from(DEFAULT_FORWARD_TRANSITION),
                back_transition: Rc::from(DEFAULT_BACK_TRANSITION),
                leaving_opts: None,
                events: None,
                destroy_hooks: SmallVec::new(),
            })),
        }
    }

    /// Identity comparison; two handles are the same record when they share
    /// the same backing allocation.
    pub fn ptr_eq(&self, other: &ViewRecord) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn page(&self) -> Option<PageKind> {
        self.inner.borrow().page.clone()
    }

    pub fn is_placeholder(&self) -> bool {
        self.inner.borrow().page.is_none()
    }

    pub fn params(&self) -> Params {
        self.inner.borrow().params.clone()
    }

    pub fn state(&self) -> ViewState {
        self.inner.borrow().state
    }

    pub fn set_state(&self, state: ViewState) {
        self.inner.borrow_mut().state = state;
    }

    /// Stack-scoped sequence number, assigned on insertion.
    pub fn id(&self) -> u64 {
        self.inner.borrow().id
    }

    pub(crate) fn set_id(&self, id: u64) {
        self.inner.borrow_mut().id = id;
    }

    pub fn nav_id(&self) -> Option<u64> {
        self.inner.borrow().nav_id
    }

    /// Transfers ownership to the stack identified by `nav_id`.
    pub fn set_nav(&self, nav_id: u64) {
        self.inner.borrow_mut().nav_id = Some(nav_id);
    }

    pub fn z_index(&self) -> i32 {
        self.inner.borrow().z_index
    }

    pub fn set_z_index(&self, z_index: i32) {
        self.inner.borrow_mut().z_index = z_index;
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.borrow().loaded
    }

    /// Marks the content as constructed and fires the `loaded` lifecycle
    /// event the first time. Idempotent: cached views are never re-marked.
    pub fn mark_loaded(&self) {
        let events = {
            let mut inner = self.inner.borrow_mut();
            if inner.loaded {
                return;
            }
            inner.loaded = true;
            inner.events.clone()
        };
        if let Some(events) = events {
            events.loaded();
        }
    }

    /// Whether this record may stay parked in the stack while inactive.
    /// Overlays opt out; once dismissed or buried they are torn down.
    pub fn cacheable(&self) -> bool {
        self.inner.borrow().cacheable
    }

    pub fn set_cacheable(&self, cacheable: bool) {
        self.inner.borrow_mut().cacheable = cacheable;
    }

    /// Whether the back affordance (and swipe-back) applies to this view.
    pub fn enable_back(&self) -> bool {
        self.inner.borrow().enable_back
    }

    pub fn set_enable_back(&self, enable: bool) {
        self.inner.borrow_mut().enable_back = enable;
    }

    /// Declared animation name for transitions in `direction`.
    pub fn transition_name(&self, direction: NavDirection) -> Rc<str> {
        let inner = self.inner.borrow();
        match direction {
            NavDirection::Forward => inner.forward_transition.clone(),
            NavDirection::Back => inner.back_transition.clone(),
        }
    }

    pub fn set_transition_names(&self, forward: impl Into<Rc<str>>, back: impl Into<Rc<str>>) {
        let mut inner = self.inner.borrow_mut();
        inner.forward_transition = forward.into();
        inner.back_transition = back.into();
    }

    /// Options to apply when this view is later dismissed; installed by
    /// `present` so the eventual pop derives the matching back transition.
    pub fn leaving_opts(&self) -> Option<NavOptions> {
        self.inner.borrow().leaving_opts.clone()
    }

    pub fn set_leaving_opts(&self, opts: NavOptions) {
        self.inner.borrow_mut().leaving_opts = Some(opts);
    }

    pub fn set_events(&self, events: Rc<dyn PageEvents>) {
        self.inner.borrow_mut().events = Some(events);
    }

    /// Registers a cleanup action run exactly once at destroy time.
    /// Collaborators use this to tear down whatever they built for the view.
    pub fn add_destroy_hook(&self, hook: impl FnOnce() + 'static) {
        let mut inner = self.inner.borrow_mut();
        if inner.destroyed {
            drop(inner);
            hook();
            return;
        }
        inner.destroy_hooks.push(Box::new(hook));
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.borrow().destroyed
    }

    /// Runs destroy hooks in registration order. Idempotent.
    pub fn destroy(&self) {
        let hooks = {
            let mut inner = self.inner.borrow_mut();
            if inner.destroyed {
                return;
            }
            inner.destroyed = true;
            inner.events = None;
            std::mem::take(&mut inner.destroy_hooks)
        };
        for hook in hooks {
            hook();
        }
    }

    fn events(&self) -> Option<Rc<dyn PageEvents>> {
        let inner = self.inner.borrow();
        if inner.destroyed {
            None
        } else {
            inner.events.clone()
        }
    }

    pub fn will_enter(&self) {
        if let Some(events) = self.events() {
            events.will_enter();
        }
    }

    pub fn did_enter(&self) {
        if let Some(events) = self.events() {
            events.did_enter();
        }
    }

    pub fn will_leave(&self) {
        if let Some(events) = self.events() {
            events.will_leave();
        }
    }

    pub fn did_leave(&self) {
        if let Some(events) = self.events() {
            events.did_leave();
        }
    }

    pub fn did_unload(&self) {
        if let Some(events) = self.events() {
            events.did_unload();
        }
    }
}

impl fmt::Debug for ViewRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ViewRecord")
            .field("page", &inner.page)
            .field("state", &inner.state)
            .field("id", &inner.id)
            .field("loaded", &inner.loaded)
            .finish()
    }
}

impl PartialEq for ViewRecord {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
