//! Navigation engine for Causeway: an ordered view history, a five-phase
//! transition pipeline and an edge-swipe back gesture, driven entirely by
//! the embedder's frame loop.
//!
//! The engine is headless. Everything that touches a screen, a keyboard or
//! a URL goes through the [`Collaborators`] traits; the default bundle
//! makes a controller fully usable without any of them.

mod collaborators;
mod config;
mod controller;
mod error;
mod future;
mod pipeline;
mod swipe_back;

pub use collaborators::{
    AppInput, Collaborators, ContentLoader, ImmediateLoader, Keyboard, LoadResult, Router,
    ViewRenderer,
};
pub use config::NavConfig;
pub use controller::{HostKind, NavController};
pub use error::{NavError, NavResult};
pub use future::{NavFuture, NavResolver};
