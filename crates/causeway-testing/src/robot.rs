//! Robot harness: a controller wired to fakes plus a pumped frame loop.

use std::cell::Cell;
use std::rc::Rc;

use causeway_core::{NavOptions, Params, Runtime, ViewRecord};
use causeway_nav::{Collaborators, HostKind, NavController, NavFuture};

use crate::fakes::{EventLog, ManualLoader, RecordingRenderer, TestApp, TestKeyboard, TestRouter};

const FRAME_NANOS: u64 = 16_000_000;
const SETTLE_FRAME_CAP: u32 = 240;

/// Bundles a runtime, a controller and recording collaborators, and drives
/// the frame loop the way an embedder would.
pub struct NavRobot {
    runtime: Runtime,
    nav: NavController,
    pub loader: ManualLoader,
    pub renderer: RecordingRenderer,
    pub keyboard: TestKeyboard,
    pub router: TestRouter,
    pub app: TestApp,
    pub events: EventLog,
    clock_nanos: Cell<u64>,
}

impl NavRobot {
    /// Controller whose page constructions complete immediately.
    pub fn new() -> Self {
        Self::with_loader(ManualLoader::auto())
    }

    /// Controller whose page constructions wait for the test.
    pub fn manual() -> Self {
        Self::with_loader(ManualLoader::manual())
    }

    fn with_loader(loader: ManualLoader) -> Self {
        let runtime = Runtime::new();
        let renderer = RecordingRenderer::new();
        let keyboard = TestKeyboard::new();
        let router = TestRouter::new();
        let app = TestApp::new();

        let collaborators = Collaborators::headless(&runtime)
            .with_loader(Rc::new(loader.clone()))
            .with_renderer(Rc::new(renderer.clone()))
            .with_keyboard(Rc::new(keyboard.clone()))
            .with_router(Rc::new(router.clone()))
            .with_app(Rc::new(app.clone()));
        let nav = NavController::new(1, HostKind::Stack, runtime.clone(), collaborators);

        Self {
            runtime,
            nav,
            loader,
            renderer,
            keyboard,
            router,
            app,
            events: EventLog::new(),
            clock_nanos: Cell::new(0),
        }
    }

    pub fn controller(&self) -> NavController {
        self.nav.clone()
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime.clone()
    }

    /// Advances the frame clock by `frames` frames of ~16 ms.
    pub fn pump(&self, frames: u32) {
        for _ in 0..frames {
            self.clock_nanos.set(self.clock_nanos.get() + FRAME_NANOS);
            self.runtime.advance_frame(self.clock_nanos.get());
        }
    }

    /// Pumps until the runtime has no scheduled work. Work parked on a
    /// collaborator (a manual load, an unacknowledged keyboard) does not
    /// count; release it first.
    pub fn settle(&self) {
        for _ in 0..SETTLE_FRAME_CAP {
            if !self.runtime.has_pending_work() {
                return;
            }
            self.pump(1);
        }
    }

    /// Pushes `page` with default options and settles.
    pub fn push(&self, page: &str) -> NavFuture {
        let future = self.nav.push(page, Params::new(), NavOptions::new());
        self.settle();
        future
    }

    /// Builds a record and registers its lifecycle log under the page name.
    pub fn record(&self, page: &str) -> ViewRecord {
        let view = ViewRecord::new(page.into(), Params::new());
        self.events.attach(&view, page);
        view
    }

    /// Page names currently in the stack, in history order.
    pub fn stack_pages(&self) -> Vec<String> {
        (0..self.nav.len())
            .filter_map(|index| self.nav.get_by_index(index))
            .filter_map(|view| view.page().map(|page| page.name().to_owned()))
            .collect()
    }

    pub fn assert_stack(&self, expected: &[&str]) {
        assert_eq!(self.stack_pages(), expected);
    }
}

impl Default for NavRobot {
    fn default() -> Self {
        Self::new()
    }
}
