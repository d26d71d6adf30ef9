//! Animation support for Causeway navigation transitions.
//!
//! The navigation pipeline only talks to [`TransitionHandle`] and
//! [`TransitionFactory`]; the frame-driven implementation here covers the
//! stock push/pop styles. Embedders with their own animation engine can
//! provide a different factory.

mod easing;
mod factory;
mod transition;

pub use easing::Easing;
pub use factory::NavTransitionFactory;
pub use transition::{TransitionAnimation, TransitionFactory, TransitionHandle, TransitionSpec};
