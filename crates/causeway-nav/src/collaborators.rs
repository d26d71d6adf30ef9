//! Contracts between the navigation engine and its embedder.
//!
//! The engine never touches a widget tree, a keyboard or a URL bar itself;
//! it drives these traits and an embedder wires in real implementations.
//! Every optional collaborator has a no-op default so a bare controller is
//! usable in tests and headless setups.

use std::rc::Rc;

use causeway_core::{NavDirection, Runtime, ViewRecord};

use causeway_animation::{NavTransitionFactory, TransitionFactory};

/// Outcome reported by a content loader.
pub type LoadResult = Result<(), String>;

/// Builds the page content for a view record.
///
/// Construction is asynchronous: the loader calls `done` once the content
/// exists (or failed). Implementations register a destroy hook on the record
/// to tear down whatever they built. The engine never asks twice for the
/// same record; a loaded record re-enters from cache.
pub trait ContentLoader {
    fn construct(&self, view: &ViewRecord, done: Box<dyn FnOnce(LoadResult)>);
}

/// Applies visibility and stacking order to a view's content.
pub trait ViewRenderer {
    fn set_visible(&self, view: &ViewRecord, visible: bool) {
        let _ = (view, visible);
    }

    fn set_z_index(&self, view: &ViewRecord, z_index: i32) {
        let _ = (view, z_index);
    }
}

/// On-screen keyboard, queried at the end of a transition so a stale
/// keyboard never covers the new active view.
pub trait Keyboard {
    fn is_open(&self) -> bool {
        false
    }

    fn close(&self) {}

    /// Calls `done` when the keyboard finishes closing, or after
    /// `timeout_ms` if no acknowledgment arrives.
    fn on_close(&self, done: Box<dyn FnOnce()>, timeout_ms: u64) {
        let _ = timeout_ms;
        done();
    }
}

/// Observes confirmed navigation state changes (for URL sync and the like).
/// Fire-and-forget: the engine never waits on it.
pub trait Router {
    fn state_change(&self, direction: NavDirection, view: &ViewRecord) {
        let _ = (direction, view);
    }
}

/// Global input guard. Disabled during transitions long enough to be
/// visible; `fallback_ms` bounds how long input may stay blocked if the
/// matching enable never arrives.
pub trait AppInput {
    fn set_enabled(&self, enabled: bool, fallback_ms: u64) {
        let _ = (enabled, fallback_ms);
    }
}

/// Loader that reports every page as constructed immediately. Useful for
/// controllers whose pages carry no external content.
pub struct ImmediateLoader;

impl ContentLoader for ImmediateLoader {
    fn construct(&self, _view: &ViewRecord, done: Box<dyn FnOnce(LoadResult)>) {
        done(Ok(()));
    }
}

struct NullRenderer;
impl ViewRenderer for NullRenderer {}

struct NullKeyboard;
impl Keyboard for NullKeyboard {}

struct NullRouter;
impl Router for NullRouter {}

struct NullAppInput;
impl AppInput for NullAppInput {}

/// Bundle of everything the engine calls out to.
#[derive(Clone)]
pub struct Collaborators {
    pub loader: Rc<dyn ContentLoader>,
    pub renderer: Rc<dyn ViewRenderer>,
    pub keyboard: Rc<dyn Keyboard>,
    pub router: Rc<dyn Router>,
    pub app: Rc<dyn AppInput>,
    pub transitions: Rc<dyn TransitionFactory>,
}

impl Collaborators {
    /// All-defaults bundle: immediate loads, stock transitions, no-op
    /// renderer/keyboard/router/input guard.
    pub fn headless(runtime: &Runtime) -> Self {
        Self {
            loader: Rc::new(ImmediateLoader),
            renderer: Rc::new(NullRenderer),
            keyboard: Rc::new(NullKeyboard),
            router: Rc::new(NullRouter),
            app: Rc::new(NullAppInput),
            transitions: Rc::new(NavTransitionFactory::new(runtime.clone())),
        }
    }

    pub fn with_loader(mut self, loader: Rc<dyn ContentLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_renderer(mut self, renderer: Rc<dyn ViewRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_keyboard(mut self, keyboard: Rc<dyn Keyboard>) -> Self {
        self.keyboard = keyboard;
        self
    }

    pub fn with_router(mut self, router: Rc<dyn Router>) -> Self {
        self.router = router;
        self
    }

    pub fn with_app(mut self, app: Rc<dyn AppInput>) -> Self {
        self.app = app;
        self
    }

    pub fn with_transitions(mut self, transitions: Rc<dyn TransitionFactory>) -> Self {
        self.transitions = transitions;
        self
    }
}
