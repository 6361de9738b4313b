//! # Graph Renderer
//!
//! Draws the build-up chart onto a [`FrameBuffer`]: grid, rotated axis
//! labels, the `TIME` caption and the reduced data curve.
//!
//! All labels are rotated 90° so they read along the paper feed direction.

use super::framebuffer::FrameBuffer;
use super::layout::GraphLayout;
use super::reduce;

/// Unit suffix of pressure labels
pub const Y_LABEL_SUFFIX: &str = "K";

/// Caption under the plot
pub const BOTTOM_CAPTION: &str = "TIME";

/// Scale of axis labels
pub const LABEL_SCALE: u8 = 2;

/// Scale of the bottom caption
pub const CAPTION_SCALE: u8 = 1;

/// Row of the pressure labels in the top margin
const Y_LABEL_TOP: i32 = 5;

/// Pressure labels sit left of their grid line by this much
const Y_LABEL_OFFSET: i32 = 13;

/// Column of the time labels in the left margin
const X_LABEL_LEFT: i32 = 10;

/// Time labels start this far above their grid line
const X_LABEL_OFFSET: i32 = 3;

/// Time labels closer than this to the plot bottom are dropped
const X_LABEL_BOTTOM_CLEARANCE: i32 = 10;

/// Caption position relative to the canvas center and the plot bottom
const CAPTION_CENTER_OFFSET: i32 = 15;
const CAPTION_GAP: i32 = 5;

/// Renderer borrowing a framebuffer for the duration of a job.
///
/// ## Example
///
/// ```
/// use pressplot::render::{CurvePattern, CurveSynthesizer, FrameBuffer, GraphLayout, GraphRenderer};
///
/// let layout = GraphLayout::REFERENCE;
/// let mut fb = FrameBuffer::new(layout.width, layout.canvas_height() as u16)?;
/// let series = CurveSynthesizer::new(layout.y_max as f32, 7).generate(3000, CurvePattern::Quadratic)?;
///
/// let mut graph = GraphRenderer::new(&mut fb, &layout);
/// graph.draw_y_axis_labels();
/// graph.draw_grid(true);
/// graph.draw_x_axis_labels();
/// graph.draw_bottom_label();
/// graph.draw_curve(&series, 2);
/// # Ok::<(), pressplot::error::PressplotError>(())
/// ```
pub struct GraphRenderer<'a> {
    fb: &'a mut FrameBuffer,
    layout: &'a GraphLayout,
}

impl<'a> GraphRenderer<'a> {
    pub fn new(fb: &'a mut FrameBuffer, layout: &'a GraphLayout) -> Self {
        Self { fb, layout }
    }

    pub fn layout(&self) -> &GraphLayout {
        self.layout
    }

    /// Horizontal position of pressure division `i`.
    #[inline]
    fn division_x(&self, i: u16) -> i32 {
        self.layout.left_margin as i32 + i as i32 * self.layout.grid_y_spacing as i32
    }

    /// Vertical position of time division `i`.
    #[inline]
    fn division_y(&self, i: u16) -> i32 {
        self.layout.top_margin as i32 + i as i32 * self.layout.grid_x_spacing as i32
    }

    /// `"25K"`, `"50K"`, ... across the top margin. Division 0 has no label.
    pub fn draw_y_axis_labels(&mut self) {
        for i in 1..=self.layout.y_divisions() {
            let value = i as u32 * self.layout.y_step as u32;
            let label = format!("{}{}", value, Y_LABEL_SUFFIX);
            let x = self.division_x(i) - Y_LABEL_OFFSET;
            self.fb.draw_text(&label, x, Y_LABEL_TOP, LABEL_SCALE, true);
        }
    }

    /// One horizontal line per time division across the plot width, one
    /// vertical line per pressure division down the plot height.
    ///
    /// Horizontal lines at or below the plot bottom are skipped.
    pub fn draw_grid(&mut self, dashed: bool) {
        let left = self.layout.left_margin as i32;
        let right = left + self.layout.graph_width() as i32;
        let top = self.layout.top_margin as i32;
        let bottom = self.layout.graph_bottom();

        for i in 0..=self.layout.x_divisions() {
            let y = self.division_y(i);
            if y < bottom {
                self.fb.draw_horizontal_line(y, left, right, dashed);
            }
        }

        for i in 0..=self.layout.y_divisions() {
            let x = self.division_x(i);
            self.fb.draw_vertical_line(x, top, bottom, dashed);
        }
    }

    /// `"0"`, `"2"`, ... down the left margin.
    pub fn draw_x_axis_labels(&mut self) {
        let cutoff = self.layout.graph_bottom() - X_LABEL_BOTTOM_CLEARANCE;

        for i in 0..=self.layout.x_divisions() {
            let y = self.division_y(i);
            if y >= cutoff {
                continue;
            }
            let value = i as u32 * self.layout.x_step as u32;
            self.fb
                .draw_text(&value.to_string(), X_LABEL_LEFT, y - X_LABEL_OFFSET, LABEL_SCALE, true);
        }
    }

    /// The `TIME` caption in the bottom margin.
    pub fn draw_bottom_label(&mut self) {
        let x = self.layout.width as i32 / 2 - CAPTION_CENTER_OFFSET;
        let y = self.layout.graph_bottom() + CAPTION_GAP;
        self.fb.draw_text(BOTTOM_CAPTION, x, y, CAPTION_SCALE, true);
    }

    /// Plot `series` sideways: sample `i` of the reduced series sits on row
    /// `top_margin + i`, its value maps to `left_margin + value * graph_width / y_max`.
    ///
    /// Consecutive points are joined with [`FrameBuffer::draw_line`].
    pub fn draw_curve(&mut self, series: &[f32], thickness: u8) {
        if series.is_empty() || self.layout.y_max == 0 {
            log::warn!("Empty series, curve not drawn");
            return;
        }

        let reduced = reduce::reduce(series, self.layout.graph_height as usize);
        let y_max = self.layout.y_max as f32;
        let scale = self.layout.graph_width() as f32 / y_max;
        let left = self.layout.left_margin as i32;
        let top = self.layout.top_margin as i32;

        let mut prev: Option<(i32, i32)> = None;
        for (i, &value) in reduced.iter().enumerate() {
            let x = left + (value.clamp(0.0, y_max) * scale) as i32;
            let y = top + i as i32;
            if let Some((px, py)) = prev {
                self.fb.draw_line(px, py, x, y, thickness);
            }
            prev = Some((x, y));
        }

        log::debug!(
            "Curve drawn: {} samples reduced to {} rows",
            series.len(),
            reduced.len()
        );
    }

    /// Everything, in print order: pressure labels, grid, time labels,
    /// caption, curve.
    pub fn draw_all(&mut self, series: &[f32], thickness: u8, dashed_grid: bool) {
        self.draw_y_axis_labels();
        self.draw_grid(dashed_grid);
        self.draw_x_axis_labels();
        self.draw_bottom_label();
        self.draw_curve(series, thickness);
    }
}
