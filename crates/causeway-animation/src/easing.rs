//! Easing curves for transition playback.

/// Easing applied to a transition's linear time fraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    /// No easing; scrubbed (gesture-driven) progress is always linear.
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Material-style standard curve; the default for stock transitions.
    FastOutSlowIn,
}

impl Easing {
    /// Maps a linear fraction in `[0, 1]` through the curve.
    pub fn transform(self, fraction: f32) -> f32 {
        match self {
            Easing::Linear => fraction,
            Easing::EaseIn => bezier(0.42, 0.0, 1.0, 1.0, fraction),
            Easing::EaseOut => bezier(0.0, 0.0, 0.58, 1.0, fraction),
            Easing::EaseInOut => bezier(0.42, 0.0, 0.58, 1.0, fraction),
            Easing::FastOutSlowIn => bezier(0.4, 0.0, 0.2, 1.0, fraction),
        }
    }
}

/// Cubic bezier easing with control points `(x1, y1)` and `(x2, y2)`.
///
/// Solves for the curve parameter matching the x fraction with a few
/// Newton-Raphson steps, falling back to bisection when the derivative
/// degenerates near flat regions of the curve.
fn bezier(x1: f32, y1: f32, x2: f32, y2: f32, fraction: f32) -> f32 {
    if fraction <= 0.0 {
        return 0.0;
    }
    if fraction >= 1.0 {
        return 1.0;
    }

    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;
    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    let curve = |a: f32, b: f32, c: f32, t: f32| ((a * t + b) * t + c) * t;
    let slope = |a: f32, b: f32, c: f32, t: f32| (3.0 * a * t + 2.0 * b) * t + c;

    let mut t = fraction;
    let mut converged = false;
    for _ in 0..8 {
        let x = curve(ax, bx, cx, t) - fraction;
        if x.abs() < 1e-6 {
            converged = true;
            break;
        }
        let dx = slope(ax, bx, cx, t);
        if dx.abs() < 1e-6 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }

    if !converged {
        let mut lo = 0.0f32;
        let mut hi = 1.0f32;
        t = fraction;
        for _ in 0..16 {
            let delta = curve(ax, bx, cx, t) - fraction;
            if delta.abs() < 1e-6 {
                break;
            }
            if delta > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
            t = 0.5 * (lo + hi);
        }
    }

    curve(ay, by, cy, t)
}
