//! Split-pane resizing.
//!
//! Pointer moves arrive far faster than a layout should change. The pane
//! applies the first move of a drag immediately and then at most one
//! update per interval, always converging on the newest pointer position.

use std::time::Duration;

use tokio::time::Instant;

use crate::debounce::Throttle;

/// Default share of the width given to the editor, in percent.
pub const DEFAULT_RATIO: f64 = 65.0;

/// Horizontal extent of the container being split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub width: f64,
}

impl Bounds {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    /// Percentage of the width left of `x`, clamped to `[0, 100]`.
    ///
    /// `None` for degenerate bounds.
    pub fn ratio_at(&self, x: f64) -> Option<f64> {
        if self.width.is_nan() || self.width <= 0.0 || !self.left.is_finite() || !x.is_finite() {
            return None;
        }
        Some((100.0 * (x - self.left) / self.width).clamp(0.0, 100.0))
    }
}

#[derive(Debug, Clone)]
pub struct SplitPane {
    ratio: f64,
    resizing: bool,
    throttle: Throttle<f64>,
}

impl Default for SplitPane {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl SplitPane {
    pub fn new(interval: Duration) -> Self {
        Self {
            ratio: DEFAULT_RATIO,
            resizing: false,
            throttle: Throttle::new(interval),
        }
    }

    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    #[inline]
    pub fn is_resizing(&self) -> bool {
        self.resizing
    }

    pub fn start_resize(&mut self) {
        self.resizing = true;
    }

    /// Feed a pointer position. Returns the new ratio when it was applied
    /// immediately.
    ///
    /// Ignored unless a drag is in progress.
    pub fn pointer_move(&mut self, x: f64, bounds: Bounds, now: Instant) -> Option<f64> {
        if !self.resizing {
            return None;
        }
        let ratio = bounds.ratio_at(x)?;
        let applied = self.throttle.offer(ratio, now)?;
        self.ratio = applied;
        Some(applied)
    }

    /// When a held update becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.throttle.deadline()
    }

    /// Apply the held update if it is due.
    pub fn poll(&mut self, now: Instant) -> Option<f64> {
        let ratio = self.throttle.fire_if_due(now)?;
        self.ratio = ratio;
        Some(ratio)
    }

    /// End the drag, applying any held update. Returns the final ratio.
    pub fn stop_resize(&mut self) -> f64 {
        if let Some(ratio) = self.throttle.flush() {
            self.ratio = ratio;
        }
        self.resizing = false;
        self.ratio
    }
}
