//! # Graph Layout
//!
//! Geometry of the build-up graph. The chart is drawn sideways: time runs
//! down the page (the X axis of the data), pressure runs across it (the Y
//! axis of the data).
//!
//! ```text
//!  ┌──────────────────────────────────────────────┐  ─┬─
//!  │        25K     50K    ...    200K  (rotated) │   │ top_margin
//!  │      ┌──────┬──────┬── ... ──┬──────┐        │  ─┼─
//!  │   0  ├ ─ ─ ─┼─ ─ ─ ┼─ ─ ... ─┼─ ─ ─ ┤        │   │
//!  │      │      │      │         │      │        │   │
//!  │   2  ├ ─ ─ ─┼─ ─ ─ ┼─ ─ ... ─┼─ ─ ─ ┤        │   │ graph_height
//!  │  ...                                         │   │
//!  │      └──────┴──────┴── ... ──┴──────┘        │  ─┼─
//!  │                  TIME                        │   │ bottom_margin
//!  └──────────────────────────────────────────────┘  ─┴─
//!  ├──────┤ left_margin
//!         ├────── graph_width ─────────────┤
//! ```

use serde::{Deserialize, Serialize};

use crate::error::PressplotError;

/// Immutable description of where everything goes on the canvas.
///
/// `graph_width` is derived: `grid_y_spacing * (y_max / y_step)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphLayout {
    /// Canvas width in dots (multiple of 8)
    pub width: u16,
    /// Plottable height in dots; also the reduced series length
    pub graph_height: u16,
    pub left_margin: u16,
    pub top_margin: u16,
    pub bottom_margin: u16,
    /// Time axis maximum (seconds)
    pub x_max: u16,
    pub x_step: u16,
    /// Pressure axis maximum
    pub y_max: u16,
    pub y_step: u16,
    /// Dots between horizontal grid lines (time divisions)
    pub grid_x_spacing: u16,
    /// Dots between vertical grid lines (pressure divisions)
    pub grid_y_spacing: u16,
}

impl GraphLayout {
    /// 80 mm paper, 0..30 s by 2, 0..200 by 25.
    pub const REFERENCE: Self = Self {
        width: 512,
        graph_height: 1200,
        left_margin: 30,
        top_margin: 70,
        bottom_margin: 40,
        x_max: 30,
        x_step: 2,
        y_max: 200,
        y_step: 25,
        grid_x_spacing: 80,
        grid_y_spacing: 60,
    };

    /// Number of time divisions (`x_max / x_step`).
    #[inline]
    pub fn x_divisions(&self) -> u16 {
        self.x_max.checked_div(self.x_step).unwrap_or(0)
    }

    /// Number of pressure divisions (`y_max / y_step`).
    #[inline]
    pub fn y_divisions(&self) -> u16 {
        self.y_max.checked_div(self.y_step).unwrap_or(0)
    }

    /// Width of the plot area in dots.
    #[inline]
    pub fn graph_width(&self) -> u32 {
        self.grid_y_spacing as u32 * self.y_divisions() as u32
    }

    /// Full canvas height: top margin, plot and bottom margin.
    #[inline]
    pub fn canvas_height(&self) -> u32 {
        self.top_margin as u32 + self.graph_height as u32 + self.bottom_margin as u32
    }

    /// First row below the plot area.
    #[inline]
    pub fn graph_bottom(&self) -> i32 {
        self.top_margin as i32 + self.graph_height as i32
    }

    /// Check the layout before anything is allocated.
    ///
    /// ## Errors
    ///
    /// [`PressplotError::Config`] when a step is zero, the plot is wider
    /// than `width - left_margin`, the width is not a multiple of 8, or the
    /// canvas would not fit a raster header.
    pub fn validate(&self) -> Result<(), PressplotError> {
        if self.x_step == 0 || self.y_step == 0 {
            return Err(PressplotError::Config(
                "axis steps must be non-zero".into(),
            ));
        }
        if self.y_max == 0 {
            return Err(PressplotError::Config("y_max must be non-zero".into()));
        }
        if self.width % 8 != 0 {
            return Err(PressplotError::Config(format!(
                "width {} is not a multiple of 8",
                self.width
            )));
        }
        let available = self.width.saturating_sub(self.left_margin) as u32;
        if self.graph_width() > available {
            return Err(PressplotError::Config(format!(
                "graph width {} exceeds {} available dots (width {} - left margin {})",
                self.graph_width(),
                available,
                self.width,
                self.left_margin
            )));
        }
        if self.canvas_height() > u16::MAX as u32 {
            return Err(PressplotError::Config(format!(
                "canvas height {} exceeds {}",
                self.canvas_height(),
                u16::MAX
            )));
        }
        Ok(())
    }
}

impl Default for GraphLayout {
    fn default() -> Self {
        Self::REFERENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_geometry() {
        let layout = GraphLayout::REFERENCE;
        assert_eq!(layout.x_divisions(), 15);
        assert_eq!(layout.y_divisions(), 8);
        assert_eq!(layout.graph_width(), 480);
        assert_eq!(layout.canvas_height(), 1310);
        assert_eq!(layout.graph_bottom(), 1270);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_step() {
        let layout = GraphLayout {
            y_step: 0,
            ..GraphLayout::REFERENCE
        };
        assert_eq!(layout.y_divisions(), 0);
        assert!(matches!(layout.validate(), Err(PressplotError::Config(_))));
    }

    #[test]
    fn test_rejects_too_wide_graph() {
        let layout = GraphLayout {
            grid_y_spacing: 61,
            ..GraphLayout::REFERENCE
        };
        // 61 * 8 = 488 > 512 - 30
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_rejects_unaligned_width() {
        let layout = GraphLayout {
            width: 510,
            grid_y_spacing: 50,
            ..GraphLayout::REFERENCE
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_reference_values() {
        let layout: GraphLayout = serde_json::from_str(r#"{"graph_height": 600}"#).unwrap();
        assert_eq!(layout.graph_height, 600);
        assert_eq!(layout.width, 512);
        assert_eq!(layout.y_max, 200);
    }
}
