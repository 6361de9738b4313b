//! Series reduction: fit an arbitrarily long series to a pixel height.
//!
//! Two passes, always in this order:
//!
//! 1. [`downsample_max`]: max-pooling over contiguous windows, so peaks
//!    survive compression (a plain average would flatten the pressure spike
//!    right before release).
//! 2. [`moving_average`]: centered box filter of width
//!    [`SMOOTHING_WINDOW`], truncated at both ends.

/// Width of the centered moving average
pub const SMOOTHING_WINDOW: usize = 11;

/// Fit `series` to exactly `target` samples.
///
/// When `series` is longer, window `i` covers
/// `[floor(i * r), floor((i + 1) * r))` with `r = len / target` and keeps
/// its maximum. Shorter series are copied and zero-padded.
pub fn downsample_max(series: &[f32], target: usize) -> Vec<f32> {
    if series.len() <= target {
        let mut out = series.to_vec();
        out.resize(target, 0.0);
        return out;
    }

    let len = series.len();
    (0..target)
        .map(|i| {
            let start = window_edge(i, len, target);
            let end = window_edge(i + 1, len, target);
            series[start..end].iter().fold(0.0f32, |acc, &v| acc.max(v))
        })
        .collect()
}

/// `floor(i * len / target)`, exact for any series length.
#[inline]
fn window_edge(i: usize, len: usize, target: usize) -> usize {
    (i as u128 * len as u128 / target as u128) as usize
}

/// Centered moving average of width `window` (`window / 2` on each side).
///
/// Near the ends the window is clipped to the series and the divisor is
/// the number of samples actually covered. Windows below 2 return the
/// input unchanged.
pub fn moving_average(series: &[f32], window: usize) -> Vec<f32> {
    if window < 2 {
        return series.to_vec();
    }
    let half = window / 2;
    let len = series.len();

    (0..len)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(len);
            let slice = &series[lo..hi];
            slice.iter().sum::<f32>() / slice.len() as f32
        })
        .collect()
}

/// Downsample to `target` then smooth with [`SMOOTHING_WINDOW`].
///
/// ```
/// use pressplot::render::reduce;
///
/// let series: Vec<f32> = (0..3000).map(|i| i as f32).collect();
/// assert_eq!(reduce::reduce(&series, 1200).len(), 1200);
/// ```
pub fn reduce(series: &[f32], target: usize) -> Vec<f32> {
    moving_average(&downsample_max(series, target), SMOOTHING_WINDOW)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_downsample_pairs() {
        assert_eq!(downsample_max(&[5.0, 1.0, 5.0, 1.0], 2), vec![5.0, 5.0]);
    }

    #[test]
    fn test_reduce_pairs() {
        // Downsample gives [5, 5]; the smoother averages over both samples
        let out = reduce(&[5.0, 1.0, 5.0, 1.0], 2);
        assert_eq!(out, vec![5.0, 5.0]);
    }

    #[test]
    fn test_downsample_pads_short_series() {
        assert_eq!(downsample_max(&[1.0, 2.0], 5), vec![1.0, 2.0, 0.0, 0.0, 0.0]);
        assert_eq!(downsample_max(&[], 3), vec![0.0; 3]);
    }

    #[test]
    fn test_downsample_uneven_ratio() {
        // r = 7/3: windows [0,2) [2,4) [4,7)
        let series = [1.0, 9.0, 2.0, 3.0, 4.0, 8.0, 0.0];
        assert_eq!(downsample_max(&series, 3), vec![9.0, 3.0, 8.0]);
    }

    #[test]
    fn test_downsample_keeps_global_peak() {
        let mut series = vec![1.0f32; 3000];
        series[1777] = 150.0;
        let out = downsample_max(&series, 1200);
        assert_eq!(out.len(), 1200);
        let peak = out.iter().cloned().fold(f32::MIN, f32::max);
        assert_eq!(peak, 150.0);
    }

    #[test]
    fn test_reduce_length() {
        for (len, target) in [(0, 10), (5, 10), (10, 10), (3000, 1200), (1201, 1200)] {
            let series = vec![1.0f32; len];
            assert_eq!(reduce(&series, target).len(), target, "len = {}", len);
        }
    }

    #[test]
    fn test_moving_average_edges() {
        let out = moving_average(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 12.0], 11);
        // Index 0 covers [0, 6) -> 0; index 6 covers [1, 7) -> 12 / 6
        assert!(approx(out[0], 0.0));
        assert!(approx(out[6], 2.0));
        // Index 2 covers [0, 7) -> 12 / 7
        assert!(approx(out[2], 12.0 / 7.0));
    }

    #[test]
    fn test_moving_average_constant_is_identity() {
        let series = vec![42.0f32; 50];
        let out = moving_average(&series, SMOOTHING_WINDOW);
        assert!(out.iter().all(|&v| approx(v, 42.0)));
    }

    #[test]
    fn test_moving_average_preserves_interior_sum() {
        // A spike far from the edges spreads over 11 samples without loss
        let mut series = vec![0.0f32; 100];
        series[50] = 11.0;
        let out = moving_average(&series, SMOOTHING_WINDOW);
        let total: f32 = out.iter().sum();
        assert!(approx(total, 11.0));
        assert!(out[45..=55].iter().all(|&v| approx(v, 1.0)));
        assert!(approx(out[44], 0.0) && approx(out[56], 0.0));
    }

    #[test]
    fn test_window_edges_exact_for_long_series() {
        // Past 2^24 samples a float ratio no longer lands on exact edges
        let len = (1usize << 40) + 7;
        assert_eq!(window_edge(0, len, 1200), 0);
        assert_eq!(window_edge(1199, len, 1200), 1199 * len / 1200);
        assert_eq!(window_edge(1200, len, 1200), len);
        for i in 0..1200 {
            assert!(window_edge(i, len, 1200) <= window_edge(i + 1, len, 1200));
        }
    }

    #[test]
    fn test_reduce_preserves_sum_of_generated_series() {
        let series = crate::render::CurveSynthesizer::new(200.0, 42)
            .generate(3000, crate::render::CurvePattern::Quadratic)
            .unwrap();
        let pooled = downsample_max(&series, 1200);
        let smoothed = reduce(&series, 1200);

        let before: f32 = pooled.iter().sum();
        let after: f32 = smoothed.iter().sum();
        // Only the truncated windows at both ends can move mass; the curve
        // starts near zero and ends at zero, so the loss stays tiny
        assert!(before > 0.0);
        assert!((before - after).abs() / before < 0.005, "{} vs {}", before, after);
    }

    #[test]
    fn test_small_window_is_passthrough() {
        let series = [3.0, 1.0, 4.0];
        assert_eq!(moving_average(&series, 1), series.to_vec());
    }
}
