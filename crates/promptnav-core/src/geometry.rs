#![forbid(unsafe_code)]

//! Panel geometry primitives.
//!
//! All values are CSS pixels relative to the viewport, the same space as
//! `PointerEvent.clientX/clientY` and `getBoundingClientRect()`.

use serde::{Deserialize, Serialize};

/// A pointer sample in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Top-left corner of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelPosition {
    pub x: f64,
    pub y: f64,
}

impl PanelPosition {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rendered panel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelSize {
    pub width: f64,
    pub height: f64,
}

impl PanelSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Position and size of the panel shell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelGeometry {
    pub position: PanelPosition,
    pub size: PanelSize,
}

impl PanelGeometry {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            position: PanelPosition::new(x, y),
            size: PanelSize::new(width, height),
        }
    }

    /// Copy with a different top-left corner.
    #[must_use]
    pub const fn with_position(self, position: PanelPosition) -> Self {
        Self {
            position,
            size: self.size,
        }
    }

    /// Copy with different dimensions.
    #[must_use]
    pub const fn with_size(self, size: PanelSize) -> Self {
        Self {
            position: self.position,
            size,
        }
    }
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self::new(20.0, 80.0, 300.0, 400.0)
    }
}

/// Lower bounds applied while resizing.
///
/// The minimum height should not drop below the panel header, otherwise the
/// drag handle disappears and the panel cannot be moved again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeLimits {
    pub min_width: f64,
    pub min_height: f64,
}

impl SizeLimits {
    /// Clamp a requested size. Non-finite components fall back to the minimum.
    #[must_use]
    pub fn clamp(&self, size: PanelSize) -> PanelSize {
        PanelSize {
            width: clamp_axis(size.width, self.min_width),
            height: clamp_axis(size.height, self.min_height),
        }
    }
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            min_width: 160.0,
            min_height: 48.0,
        }
    }
}

fn clamp_axis(value: f64, min: f64) -> f64 {
    if value.is_finite() { value.max(min) } else { min }
}
