//! # Build-up Curve Synthesis
//!
//! Produces a synthetic pressure series: a rising segment shaped by a
//! [`CurvePattern`] plus bounded noise, followed by a sudden release to zero.
//!
//! ## Rise length
//!
//! The rise always covers `num_points * 26 / 30` samples, i.e. 26 s of a
//! 30 s window. This fraction is fixed and does not follow the X axis of
//! the [`GraphLayout`](super::GraphLayout).
//!
//! ## Determinism
//!
//! Noise comes from a 31-bit linear congruential generator ([`Lcg`]) whose
//! seed is a constructor argument, so the same `(y_max, seed, num_points,
//! pattern)` always produces the same series.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PressplotError;

/// Numerator of the rise fraction (seconds of rise)
pub const RISE_NUMERATOR: usize = 26;

/// Denominator of the rise fraction (seconds of the X window)
pub const RISE_DENOMINATOR: usize = 30;

/// Noise amplitude of the quadratic pattern
pub const QUADRATIC_NOISE: f32 = 3.0;

/// Noise amplitude of the linear pattern
pub const LINEAR_NOISE: f32 = 8.0;

const LCG_MULTIPLIER: u32 = 1_103_515_245;
const LCG_INCREMENT: u32 = 12_345;
const LCG_MASK: u32 = 0x7FFF_FFFF;

/// 31-bit linear congruential generator.
///
/// `state = (1103515245 * state + 12345) mod 2^31`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Advance and return the new 31-bit state.
    #[inline]
    pub fn next_raw(&mut self) -> u32 {
        self.state = LCG_MULTIPLIER
            .wrapping_mul(self.state)
            .wrapping_add(LCG_INCREMENT)
            & LCG_MASK;
        self.state
    }

    /// Next value in `[min, max]`.
    #[inline]
    pub fn next_in_range(&mut self, min: f32, max: f32) -> f32 {
        let r = self.next_raw() as f32 / LCG_MASK as f32;
        min + r * (max - min)
    }
}

/// Shape of the rising segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CurvePattern {
    /// `y_max * p²`, smooth acceleration, noise ±3
    #[default]
    Quadratic = 1,
    /// `y_max * p`, steady rise, noise ±8
    Linear = 2,
}

impl CurvePattern {
    pub const ALL: [CurvePattern; 2] = [CurvePattern::Quadratic, CurvePattern::Linear];

    pub fn name(self) -> &'static str {
        match self {
            CurvePattern::Quadratic => "quadratic",
            CurvePattern::Linear => "linear",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CurvePattern::Quadratic => "smooth acceleration (y_max * p^2), noise +/-3",
            CurvePattern::Linear => "steady rise (y_max * p), noise +/-8",
        }
    }

    /// Base value at rise progress `p` in `[0, 1)`.
    #[inline]
    fn base(self, y_max: f32, p: f32) -> f32 {
        match self {
            CurvePattern::Quadratic => y_max * p * p,
            CurvePattern::Linear => y_max * p,
        }
    }

    #[inline]
    fn noise_amplitude(self) -> f32 {
        match self {
            CurvePattern::Quadratic => QUADRATIC_NOISE,
            CurvePattern::Linear => LINEAR_NOISE,
        }
    }
}

impl TryFrom<u8> for CurvePattern {
    type Error = PressplotError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CurvePattern::Quadratic),
            2 => Ok(CurvePattern::Linear),
            other => Err(PressplotError::InvalidPattern(format!(
                "pattern {} (expected 1 = quadratic or 2 = linear)",
                other
            ))),
        }
    }
}

impl FromStr for CurvePattern {
    type Err = PressplotError;

    /// Accepts the pattern name or its numeric id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quadratic" | "1" => Ok(CurvePattern::Quadratic),
            "linear" | "2" => Ok(CurvePattern::Linear),
            other => Err(PressplotError::InvalidPattern(format!(
                "'{}' (expected quadratic or linear)",
                other
            ))),
        }
    }
}

impl fmt::Display for CurvePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of rising samples in a series of `num_points`.
#[inline]
pub fn rise_len(num_points: usize) -> usize {
    // Split so the product cannot overflow for any count
    num_points / RISE_DENOMINATOR * RISE_NUMERATOR
        + num_points % RISE_DENOMINATOR * RISE_NUMERATOR / RISE_DENOMINATOR
}

/// Generator of synthetic build-up series.
///
/// ## Example
///
/// ```
/// use pressplot::render::{CurvePattern, CurveSynthesizer};
///
/// let mut synth = CurveSynthesizer::new(200.0, 42);
/// let series = synth.generate(30, CurvePattern::Quadratic)?;
///
/// assert_eq!(series.len(), 30);
/// assert!(series[26..].iter().all(|&v| v == 0.0));
/// # Ok::<(), pressplot::error::PressplotError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CurveSynthesizer {
    y_max: f32,
    rng: Lcg,
}

impl CurveSynthesizer {
    pub fn new(y_max: f32, seed: u32) -> Self {
        Self {
            y_max,
            rng: Lcg::new(seed),
        }
    }

    pub fn y_max(&self) -> f32 {
        self.y_max
    }

    /// Generate `num_points` samples following `pattern`.
    ///
    /// Rising samples are `base + noise`, clamped to `[0, y_max]`; every
    /// sample after the rise is exactly 0.
    ///
    /// ## Errors
    ///
    /// [`PressplotError::Allocation`] if the series cannot be reserved.
    pub fn generate(&mut self, num_points: usize, pattern: CurvePattern) -> Result<Vec<f32>, PressplotError> {
        let mut series = Vec::new();
        series.try_reserve_exact(num_points).map_err(|e| {
            PressplotError::Allocation(format!("{} samples for the curve series: {}", num_points, e))
        })?;

        let rise = rise_len(num_points);
        let amplitude = pattern.noise_amplitude();

        for i in 0..rise {
            let progress = i as f32 / rise as f32;
            let noise = self.rng.next_in_range(-amplitude, amplitude);
            let value = pattern.base(self.y_max, progress) + noise;
            series.push(value.clamp(0.0, self.y_max));
        }
        series.resize(num_points, 0.0);

        log::debug!(
            "Generated {} points ({} pattern, {} rising)",
            num_points,
            pattern,
            rise
        );
        Ok(series)
    }

    /// Like [`generate`](Self::generate) but takes the raw pattern id.
    ///
    /// ## Errors
    ///
    /// [`PressplotError::InvalidPattern`] for ids other than 1 and 2, and
    /// the allocation errors of [`generate`](Self::generate).
    pub fn generate_raw(&mut self, num_points: usize, pattern: u8) -> Result<Vec<f32>, PressplotError> {
        let pattern = CurvePattern::try_from(pattern)?;
        self.generate(num_points, pattern)
    }
}
