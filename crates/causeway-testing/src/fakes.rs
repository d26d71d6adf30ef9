//! Recording and manually-driven collaborators.
//!
//! Each fake is a cheap clone over shared state, so a test keeps one handle
//! while the controller drives the other.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use causeway_core::{NavDirection, PageEvents, ViewRecord};
use causeway_nav::{AppInput, ContentLoader, Keyboard, LoadResult, Router, ViewRenderer};

fn page_name(view: &ViewRecord) -> Option<String> {
    view.page().map(|page| page.name().to_owned())
}

/// Content loader whose completions the test controls. In auto mode every
/// construction succeeds immediately; in manual mode it parks until the
/// test resolves or fails it.
#[derive(Clone)]
pub struct ManualLoader {
    inner: Rc<RefCell<LoaderState>>,
}

struct LoaderState {
    auto: bool,
    pending: VecDeque<(ViewRecord, Box<dyn FnOnce(LoadResult)>)>,
    constructed: Vec<String>,
    teardowns: Vec<String>,
}

impl ManualLoader {
    pub fn auto() -> Self {
        Self::with_mode(true)
    }

    pub fn manual() -> Self {
        Self::with_mode(false)
    }

    fn with_mode(auto: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LoaderState {
                auto,
                pending: VecDeque::new(),
                constructed: Vec::new(),
                teardowns: Vec::new(),
            })),
        }
    }

    /// Number of constructions waiting on the test.
    pub fn pending(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Completes the oldest pending construction. Returns `false` when
    /// nothing was waiting.
    pub fn resolve_next(&self) -> bool {
        let next = self.inner.borrow_mut().pending.pop_front();
        match next {
            Some((_, done)) => {
                done(Ok(()));
                true
            }
            None => false,
        }
    }

    /// Fails the oldest pending construction.
    pub fn fail_next(&self, reason: &str) -> bool {
        let next = self.inner.borrow_mut().pending.pop_front();
        match next {
            Some((_, done)) => {
                done(Err(reason.to_owned()));
                true
            }
            None => false,
        }
    }

    /// Pages constructed so far, in order.
    pub fn constructed(&self) -> Vec<String> {
        self.inner.borrow().constructed.clone()
    }

    /// Pages whose destroy hook has fired, in order.
    pub fn teardowns(&self) -> Vec<String> {
        self.inner.borrow().teardowns.clone()
    }
}

impl ContentLoader for ManualLoader {
    fn construct(&self, view: &ViewRecord, done: Box<dyn FnOnce(LoadResult)>) {
        let name = page_name(view).unwrap_or_default();
        let hook_inner = self.inner.clone();
        let hook_name = name.clone();
        view.add_destroy_hook(move || {
            hook_inner.borrow_mut().teardowns.push(hook_name);
        });

        {
            let mut inner = self.inner.borrow_mut();
            inner.constructed.push(name);
            if !inner.auto {
                inner.pending.push_back((view.clone(), done));
                return;
            }
        }
        done(Ok(()));
    }
}

/// One renderer instruction, by page name (`None` for placeholders).
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOp {
    Visible { page: Option<String>, visible: bool },
    ZIndex { page: Option<String>, z_index: i32 },
}

/// Renderer that records every instruction it receives.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    ops: Rc<RefCell<Vec<RenderOp>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<RenderOp> {
        self.ops.borrow().clone()
    }

    pub fn clear(&self) {
        self.ops.borrow_mut().clear();
    }

    /// Pages left visible once all recorded instructions are applied.
    pub fn visible_pages(&self) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        let mut visible: Vec<(String, bool)> = Vec::new();
        for op in self.ops.borrow().iter() {
            if let RenderOp::Visible {
                page: Some(page),
                visible: shown,
            } = op
            {
                match visible.iter_mut().find(|(name, _)| name == page) {
                    Some(entry) => entry.1 = *shown,
                    None => {
                        order.push(page.clone());
                        visible.push((page.clone(), *shown));
                    }
                }
            }
        }
        order
            .into_iter()
            .filter(|page| {
                visible
                    .iter()
                    .any(|(name, shown)| name == page && *shown)
            })
            .collect()
    }
}

impl ViewRenderer for RecordingRenderer {
    fn set_visible(&self, view: &ViewRecord, visible: bool) {
        self.ops.borrow_mut().push(RenderOp::Visible {
            page: page_name(view),
            visible,
        });
    }

    fn set_z_index(&self, view: &ViewRecord, z_index: i32) {
        self.ops.borrow_mut().push(RenderOp::ZIndex {
            page: page_name(view),
            z_index,
        });
    }
}

/// Keyboard the test opens, and whose close acknowledgment the test sends.
#[derive(Clone, Default)]
pub struct TestKeyboard {
    inner: Rc<RefCell<KeyboardState>>,
}

#[derive(Default)]
struct KeyboardState {
    open: bool,
    close_calls: usize,
    waiting: Option<Box<dyn FnOnce()>>,
}

impl TestKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_open(&self, open: bool) {
        self.inner.borrow_mut().open = open;
    }

    pub fn close_calls(&self) -> usize {
        self.inner.borrow().close_calls
    }

    /// Whether the engine is parked waiting on the close acknowledgment.
    pub fn is_waiting(&self) -> bool {
        self.inner.borrow().waiting.is_some()
    }

    /// Acknowledges the close and releases the waiting transition.
    pub fn ack(&self) {
        let waiting = {
            let mut inner = self.inner.borrow_mut();
            inner.open = false;
            inner.waiting.take()
        };
        if let Some(done) = waiting {
            done();
        }
    }
}

impl Keyboard for TestKeyboard {
    fn is_open(&self) -> bool {
        self.inner.borrow().open
    }

    fn close(&self) {
        self.inner.borrow_mut().close_calls += 1;
    }

    fn on_close(&self, done: Box<dyn FnOnce()>, _timeout_ms: u64) {
        let mut inner = self.inner.borrow_mut();
        if inner.open {
            inner.waiting = Some(done);
        } else {
            drop(inner);
            done();
        }
    }
}

/// Router that records each confirmed state change.
#[derive(Clone, Default)]
pub struct TestRouter {
    events: Rc<RefCell<Vec<(NavDirection, Option<String>)>>>,
}

impl TestRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(NavDirection, Option<String>)> {
        self.events.borrow().clone()
    }
}

impl Router for TestRouter {
    fn state_change(&self, direction: NavDirection, view: &ViewRecord) {
        self.events.borrow_mut().push((direction, page_name(view)));
    }
}

/// Input guard that records enable/disable calls.
#[derive(Clone, Default)]
pub struct TestApp {
    calls: Rc<RefCell<Vec<(bool, u64)>>>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(bool, u64)> {
        self.calls.borrow().clone()
    }

    /// Last commanded state; input starts enabled.
    pub fn enabled(&self) -> bool {
        self.calls
            .borrow()
            .last()
            .map(|(enabled, _)| *enabled)
            .unwrap_or(true)
    }
}

impl AppInput for TestApp {
    fn set_enabled(&self, enabled: bool, fallback_ms: u64) {
        self.calls.borrow_mut().push((enabled, fallback_ms));
    }
}

/// Shared log of page lifecycle events, labelled per view.
#[derive(Clone, Default)]
pub struct EventLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a recording [`PageEvents`] on `view` under `label`.
    pub fn attach(&self, view: &ViewRecord, label: &str) {
        view.set_events(Rc::new(Recorder {
            label: label.to_owned(),
            entries: self.entries.clone(),
        }));
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

struct Recorder {
    label: String,
    entries: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    fn log(&self, event: &str) {
        self.entries
            .borrow_mut()
            .push(format!("{}:{event}", self.label));
    }
}

impl PageEvents for Recorder {
    fn loaded(&self) {
        self.log("loaded");
    }

    fn will_enter(&self) {
        self.log("will_enter");
    }

    fn did_enter(&self) {
        self.log("did_enter");
    }

    fn will_leave(&self) {
        self.log("will_leave");
    }

    fn did_leave(&self) {
        self.log("did_leave");
    }

    fn did_unload(&self) {
        self.log("did_unload");
    }
}
