//! # Width estimation for tags.
//!
//! [`WidthPolicy`] computes a tag's display width as an additive budget:
//! measured domain text at a reference scale, measured decimal count at a
//! smaller scale, plus fixed allowances for the icon, padding, a count-badge
//! minimum and the dismiss control — clamped to `[min, max]`.
//!
//! The measurement primitive itself is the render surface's capability,
//! injected via [`MeasureText`]. The policy owns only the budget and the
//! clamp. Two properties hold for any monotonic measurer:
//! - the result is non-decreasing in text length and in the digit count of
//!   the occurrence counter;
//! - the result always lands within `[min, max]`.
//!
//! # Example
//! ```rust
//! use taglet::{CharWidthMeasure, WidthPolicy};
//!
//! let policy = WidthPolicy::default();
//! let w = policy.estimate(&CharWidthMeasure, "tracker.example", 12);
//! assert!(w >= policy.min && w <= policy.max);
//! ```

/// Text measurement capability supplied by the render collaborator.
///
/// Given a string and a scale factor, returns the rendered width in the
/// surface's layout units. Implementations should be cheap and monotonic in
/// text length; they are called synchronously on the event path.
pub trait MeasureText: Send + Sync {
    /// Returns the rendered width of `text` at `scale`.
    fn measure(&self, text: &str, scale: f32) -> f32;
}

/// Embedded per-character approximation.
///
/// Usable when no real text shaper is wired in (tests, headless callers).
/// Treats every character as `BASE_CHAR_WIDTH` units before scaling.
#[derive(Debug, Default, Clone, Copy)]
pub struct CharWidthMeasure;

/// Average glyph advance at scale 1.0 for the approximation.
const BASE_CHAR_WIDTH: f32 = 7.2;

impl MeasureText for CharWidthMeasure {
    fn measure(&self, text: &str, scale: f32) -> f32 {
        text.chars().count() as f32 * BASE_CHAR_WIDTH * scale
    }
}

/// Additive width budget and clamping policy.
///
/// Encapsulates the fixed allowances and the `[min, max]` clamp:
/// - `min` / `max` — hard bounds of the final width;
/// - `text_scale` / `count_scale` — reference scales for the two measured
///   parts (the counter renders smaller than the domain text);
/// - `icon_allowance`, `padding`, `dismiss_allowance` — fixed reservations;
/// - `badge_min` — floor for the count badge, so single digits still get a
///   round badge.
#[derive(Clone, Copy, Debug)]
pub struct WidthPolicy {
    /// Lower bound of the final width.
    pub min: f32,
    /// Upper bound of the final width.
    pub max: f32,
    /// Reference scale for the domain text.
    pub text_scale: f32,
    /// Reference scale for the decimal count (smaller than the text).
    pub count_scale: f32,
    /// Fixed reservation for the icon.
    pub icon_allowance: f32,
    /// Fixed inner padding.
    pub padding: f32,
    /// Minimum width of the count badge.
    pub badge_min: f32,
    /// Fixed reservation for the dismiss control.
    pub dismiss_allowance: f32,
}

impl Default for WidthPolicy {
    /// Reference values: bounds 280..400 layout units, text at full scale,
    /// count at 0.75, and fixed allowances for icon/padding/badge/dismiss.
    fn default() -> Self {
        Self {
            min: 280.0,
            max: 400.0,
            text_scale: 1.0,
            count_scale: 0.75,
            icon_allowance: 28.0,
            padding: 24.0,
            badge_min: 22.0,
            dismiss_allowance: 18.0,
        }
    }
}

impl WidthPolicy {
    /// Estimates the display width for a tag showing `text` and `count`.
    ///
    /// Sums the fixed allowances with the two measured parts and clamps the
    /// result to `[min, max]`. The count badge never measures below
    /// `badge_min`. Crossed bounds (`min > max`) resolve to `max` instead
    /// of panicking.
    pub fn estimate(&self, measure: &dyn MeasureText, text: &str, count: u32) -> f32 {
        let text_w = measure.measure(text, self.text_scale);
        let count_w = measure
            .measure(&count.to_string(), self.count_scale)
            .max(self.badge_min);

        let total =
            self.icon_allowance + self.padding + self.dismiss_allowance + text_w + count_w;
        // Not f32::clamp: that panics on min > max, and the bounds are
        // caller-settable public fields.
        total.max(self.min).min(self.max)
    }
}
