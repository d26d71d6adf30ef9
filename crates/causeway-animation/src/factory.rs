//! Name-keyed registry of transition styles.

use std::cell::RefCell;

use causeway_core::{NavOptions, Runtime, ViewRecord};
use rustc_hash::FxHashMap;

use crate::{TransitionAnimation, TransitionFactory, TransitionHandle, TransitionSpec};

/// Default [`TransitionFactory`]. Looks up the animation name from the
/// navigation options; unknown or missing names fall back to the default
/// spec, so a misdeclared style degrades to a stock transition instead of
/// failing the navigation call.
pub struct NavTransitionFactory {
    runtime: Runtime,
    specs: RefCell<FxHashMap<String, TransitionSpec>>,
    fallback: TransitionSpec,
}

impl NavTransitionFactory {
    pub fn new(runtime: Runtime) -> Self {
        let factory = Self {
            runtime,
            specs: RefCell::new(FxHashMap::default()),
            fallback: TransitionSpec::default(),
        };
        factory.register(
            causeway_core::DEFAULT_FORWARD_TRANSITION,
            TransitionSpec::default(),
        );
        factory.register(
            causeway_core::DEFAULT_BACK_TRANSITION,
            TransitionSpec::default(),
        );
        factory
    }

    /// Registers or replaces a named transition style.
    pub fn register(&self, name: &str, spec: TransitionSpec) {
        self.specs.borrow_mut().insert(name.to_owned(), spec);
    }

    fn spec_for(&self, name: Option<&str>) -> TransitionSpec {
        match name {
            Some(name) => self.specs.borrow().get(name).copied().unwrap_or_else(|| {
                log::debug!("no transition style named {name:?}, using the default");
                self.fallback
            }),
            None => self.fallback,
        }
    }
}

impl TransitionFactory for NavTransitionFactory {
    fn create(
        &self,
        _entering: &ViewRecord,
        _leaving: &ViewRecord,
        options: &NavOptions,
    ) -> Box<dyn TransitionHandle> {
        let spec = self.spec_for(options.animation.as_deref());
        Box::new(TransitionAnimation::new(self.runtime.clone(), spec))
    }
}
