//! Per-controller configuration.

/// Tuning knobs held by each controller instance. No process-wide defaults;
/// embedders that want shared settings clone one config around.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavConfig {
    /// Master animation switch. `false` forces every transition to apply
    /// its end state with zero duration.
    pub animate: bool,
    /// Whether the edge-swipe back gesture is available at all.
    pub swipe_back_enabled: bool,
    /// Progress fraction past which a released swipe commits the pop.
    pub swipe_back_threshold: f32,
    /// Extra delay before a transition starts playing, for embedders whose
    /// render needs a beat after the will-enter hooks.
    pub transition_delay_ms: u64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            animate: true,
            swipe_back_enabled: true,
            swipe_back_threshold: 0.5,
            transition_delay_ms: 0,
        }
    }
}
