//! Testing utilities and harness for Causeway navigation.

pub mod fakes;
pub mod robot;

pub use fakes::*;
pub use robot::*;
