//! Ephemeral transition descriptor options.

use std::rc::Rc;

/// Direction a transition animates in. `Forward` stacks the entering view
/// above the leaving one, `Back` slides it in underneath.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavDirection {
    Forward,
    Back,
}

/// Options for a single navigation call. Unset fields are defaulted by the
/// operation that consumes them: `Forward` for push/insert, `Back` for
/// remove/set-pages, animation name from the participating record's declared
/// transition style.
#[derive(Clone, Debug)]
pub struct NavOptions {
    pub direction: Option<NavDirection>,
    /// Whether to animate. `None` means "operation default".
    pub animate: Option<bool>,
    /// Animation name override, resolved by the transition factory.
    pub animation: Option<Rc<str>>,
    /// Preloads run no lifecycle hooks and no visible transition.
    pub preload: bool,
    /// When `false`, an open on-screen keyboard is left open at completion.
    pub keyboard_close: bool,
    /// Skip the view cache; the record is evicted once it leaves.
    pub skip_cache: bool,
}

impl NavOptions {
    pub fn new() -> Self {
        Self {
            direction: None,
            animate: None,
            animation: None,
            preload: false,
            keyboard_close: true,
            skip_cache: false,
        }
    }

    pub fn direction(mut self, direction: NavDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn animate(mut self, animate: bool) -> Self {
        self.animate = Some(animate);
        self
    }

    pub fn animation(mut self, name: impl Into<Rc<str>>) -> Self {
        self.animation = Some(name.into());
        self
    }

    pub fn preload(mut self) -> Self {
        self.preload = true;
        self
    }

    pub fn keyboard_close(mut self, close: bool) -> Self {
        self.keyboard_close = close;
        self
    }

    pub fn skip_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }

    /// Resolved direction, falling back to the given operation default.
    pub fn direction_or(&self, default: NavDirection) -> NavDirection {
        self.direction.unwrap_or(default)
    }

    /// Resolved animate flag; operations that animate by default pass `true`.
    pub fn animate_or(&self, default: bool) -> bool {
        self.animate.unwrap_or(default)
    }
}

impl Default for NavOptions {
    fn default() -> Self {
        Self::new()
    }
}
