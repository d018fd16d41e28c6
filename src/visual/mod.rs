//! Deterministic visual attribute derivation.
//!
//! Two pure leaves used by the manager when a tag is created or merged:
//! - [`ColorClass`]: stable domain → palette-class assignment
//! - [`WidthPolicy`] + [`MeasureText`]: bounded additive width budget
//!
//! Neither knows how a tag is painted; they only decide *what* attributes a
//! tag should carry.

mod color;
mod width;

pub use color::ColorClass;
pub use width::{CharWidthMeasure, MeasureText, WidthPolicy};
