//! Core services and data model for the Causeway navigation engine.
//!
//! Everything here is single-threaded: the runtime is a cooperative task
//! queue plus a frame clock pumped by the embedder, and the navigation
//! stack is plain mutable state behind cheaply cloneable handles. The
//! asynchronous transition machinery lives in `causeway-nav` and only
//! suspends at points the runtime controls.

mod options;
mod params;
mod runtime;
mod stack;
mod view;

pub use options::{NavDirection, NavOptions};
pub use params::Params;
pub use runtime::{FrameCallbackId, FrameCallbackRegistration, Runtime};
pub use stack::NavStack;
pub use view::{
    PageEvents, PageKind, ViewRecord, ViewState, DEFAULT_BACK_TRANSITION,
    DEFAULT_FORWARD_TRANSITION,
};
