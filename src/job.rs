//! # Print Job
//!
//! One build-up graph, from curve generation to the cut.
//!
//! ## Sequence
//!
//! ```text
//! initialize ─► generate + render ─► configure ─► [title, feed 8] ─► raster ─► [footer] ─► feed ─► cut
//!  Initializing      Rendering        Configuring                  Printing      Finishing
//! ```
//!
//! A job that fails before the raster is sent never sends it: allocation
//! and layout errors surface from the render step, which runs entirely
//! in memory.

use serde::{Deserialize, Serialize};

use crate::dispatch::{Phase, StatusCell};
use crate::error::PressplotError;
use crate::printer::{PrinterDriver, TransferReport};
use crate::protocol::commands::Alignment;
use crate::render::curve::RISE_DENOMINATOR;
use crate::render::{CurvePattern, CurveSynthesizer, FrameBuffer, GraphLayout, GraphRenderer};
use crate::transport::Transport;

/// Samples per job when not specified (100 Hz over 30 s)
pub const DEFAULT_POINTS: usize = 3000;

/// Curve line thickness when not specified
pub const DEFAULT_THICKNESS: u8 = 2;

/// Lines fed after the raster, before the cut
pub const FINAL_FEED_LINES: u8 = 3;

/// Lines fed between the title and the raster
pub const TITLE_FEED_LINES: u8 = 8;

/// Lines fed between the raster and the footer
const FOOTER_FEED_LINES: u8 = 2;

/// Print head settings sent before each job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintSettings {
    /// 0-15, higher is darker
    pub density: u8,
    /// 0-7
    pub break_time: u8,
    /// Dots, at least 24
    pub line_height: u8,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            density: 10,
            break_time: 2,
            line_height: 24,
        }
    }
}

/// A single graph print.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphJob {
    pub pattern: CurvePattern,
    pub num_points: usize,
    pub seed: u32,
    pub thickness: u8,
    pub dashed_grid: bool,
    /// Printed centered in double size above the graph
    pub title: Option<String>,
    /// Printed centered in double size below the graph
    pub footer: Option<String>,
}

impl GraphJob {
    pub fn new(pattern: CurvePattern, seed: u32) -> Self {
        Self {
            pattern,
            num_points: DEFAULT_POINTS,
            seed,
            thickness: DEFAULT_THICKNESS,
            dashed_grid: true,
            title: None,
            footer: None,
        }
    }

    /// Generate the series and draw the full graph into a new framebuffer.
    ///
    /// ## Errors
    ///
    /// - [`PressplotError::Config`] for an invalid layout
    /// - [`PressplotError::Allocation`] if the series or the framebuffer
    ///   cannot be allocated
    pub fn render(&self, layout: &GraphLayout) -> Result<FrameBuffer, PressplotError> {
        layout.validate()?;
        if layout.x_max as usize != RISE_DENOMINATOR {
            log::warn!(
                "X axis spans {} but the curve always rises over 26/30 of its samples",
                layout.x_max
            );
        }

        let series =
            CurveSynthesizer::new(layout.y_max as f32, self.seed).generate(self.num_points, self.pattern)?;

        let mut fb = FrameBuffer::new(layout.width, layout.canvas_height() as u16)?;
        GraphRenderer::new(&mut fb, layout).draw_all(&series, self.thickness, self.dashed_grid);

        log::info!(
            "Rendered {} graph: {} points, seed {}, {}x{}",
            self.pattern,
            self.num_points,
            self.seed,
            fb.width(),
            fb.height()
        );
        Ok(fb)
    }

    /// Print the job, publishing progress to `status`.
    ///
    /// On error the phase is set to [`Phase::Error`] and the driver is left
    /// ready for the next job; nothing is retried.
    pub fn run<T: Transport>(
        &self,
        driver: &mut PrinterDriver<T>,
        layout: &GraphLayout,
        settings: &PrintSettings,
        status: &StatusCell,
    ) -> Result<TransferReport, PressplotError> {
        let result = self.run_steps(driver, layout, settings, status);
        match &result {
            Ok(_) => {
                status.set(Phase::Done);
            }
            Err(e) => {
                log::warn!("Job failed: {}", e);
                status.set(Phase::Error);
            }
        }
        result
    }

    fn run_steps<T: Transport>(
        &self,
        driver: &mut PrinterDriver<T>,
        layout: &GraphLayout,
        settings: &PrintSettings,
        status: &StatusCell,
    ) -> Result<TransferReport, PressplotError> {
        status.set(Phase::Initializing);
        driver.initialize()?;

        status.set(Phase::Rendering);
        let fb = self.render(layout)?;

        status.set(Phase::Configuring);
        driver.configure(settings.density, settings.break_time, settings.line_height);
        if let Some(title) = &self.title {
            print_banner(driver, title);
            driver.feed(TITLE_FEED_LINES);
            driver.print_text("");
        }

        status.set(Phase::Printing);
        let report = driver.print_framebuffer(&fb)?;
        drop(fb);

        status.set(Phase::Finishing);
        if let Some(footer) = &self.footer {
            driver.feed(FOOTER_FEED_LINES);
            print_banner(driver, footer);
        }
        driver.feed(FINAL_FEED_LINES);
        driver.cut();

        Ok(report)
    }
}

/// Centered double-size line, then back to normal left-aligned text.
fn print_banner<T: Transport>(driver: &mut PrinterDriver<T>, text: &str) {
    driver.set_alignment(Alignment::Center);
    driver.set_font_size(2, 2);
    driver.print_text(text);
    driver.set_font_size(1, 1);
    driver.set_alignment(Alignment::Left);
}
