//! Point series backing the multiplier chart.

use liftoff_types::game::constants::{CHART_BASELINE, CHART_LOG_SCALE, CHART_X_STEP};
use liftoff_types::{ChartPoint, Multiplier};

/// Vertical coordinate of the curve for a multiplier, clamped to the chart.
pub fn curve_height(multiplier: Multiplier) -> f64 {
    let y = CHART_BASELINE - CHART_LOG_SCALE * multiplier.as_f64().ln();
    y.clamp(0.0, CHART_BASELINE)
}

/// Ordered samples of the rendered curve.
///
/// `x` grows by a fixed step per sample. When the newest sample passes the
/// viewport edge the whole series shifts left and samples that scrolled out
/// are dropped, keeping one so the line still enters from the left border.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointSeries {
    points: Vec<ChartPoint>,
}

impl PointSeries {
    /// Series holding only the origin sample.
    pub fn with_origin() -> Self {
        Self {
            points: vec![ChartPoint::new(0.0, CHART_BASELINE)],
        }
    }

    pub fn reset_to_origin(&mut self) {
        self.points.clear();
        self.points.push(ChartPoint::new(0.0, CHART_BASELINE));
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<ChartPoint> {
        self.points.last().copied()
    }

    /// Append the sample for `multiplier` one step right of the newest sample.
    pub fn push_sample(&mut self, multiplier: Multiplier) -> ChartPoint {
        let x = self.points.last().map_or(0.0, |last| last.x + CHART_X_STEP);
        let point = ChartPoint::new(x, curve_height(multiplier));
        self.points.push(point);
        point
    }

    /// Shift the series so the newest sample sits at `width`.
    ///
    /// Returns whether anything moved. Calling it again with the same width is
    /// a no-op.
    pub fn clamp_to_viewport(&mut self, width: f64) -> bool {
        if width.is_nan() {
            return false;
        }
        let width = width.max(0.0);
        let Some(last) = self.points.last().copied() else {
            return false;
        };
        if last.x <= width {
            return false;
        }

        let overflow = last.x - width;
        for point in self.points.iter_mut() {
            point.x -= overflow;
        }
        if let Some(newest) = self.points.last_mut() {
            newest.x = width;
        }

        let first_visible = self
            .points
            .iter()
            .position(|point| point.x >= 0.0)
            .unwrap_or(self.points.len() - 1);
        if first_visible > 1 {
            self.points.drain(..first_visible - 1);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grown(ticks: usize) -> PointSeries {
        let mut series = PointSeries::with_origin();
        let mut multiplier = Multiplier::ONE;
        for _ in 0..ticks {
            multiplier = multiplier.advanced();
            series.push_sample(multiplier);
        }
        series
    }

    #[test]
    fn test_origin_and_first_sample() {
        let mut series = PointSeries::with_origin();
        assert_eq!(series.points(), &[ChartPoint::new(0.0, 400.0)]);

        let point = series.push_sample(Multiplier::from_hundredths(101));
        assert_eq!(point.x, 5.0);
        let expected = 400.0 - 50.0 * 1.01f64.ln();
        assert!((point.y - expected).abs() < 1e-9);
    }

    #[test]
    fn test_height_is_clamped() {
        assert_eq!(curve_height(Multiplier::ONE), 400.0);
        // ln(10_000) * 50 > 400
        assert_eq!(curve_height(Multiplier::from_hundredths(1_000_000)), 0.0);
    }

    #[test]
    fn test_x_grows_monotonically() {
        let series = grown(40);
        assert_eq!(series.len(), 41);
        for pair in series.points().windows(2) {
            assert!(pair[1].x > pair[0].x);
        }
    }

    #[test]
    fn test_clamp_noop_within_viewport() {
        let mut series = grown(10);
        let before = series.clone();
        assert!(!series.clamp_to_viewport(500.0));
        assert_eq!(series, before);
    }

    #[test]
    fn test_clamp_shifts_newest_to_edge() {
        let mut series = grown(100); // newest at x = 500
        assert!(series.clamp_to_viewport(300.0));
        assert_eq!(series.last().unwrap().x, 300.0);
        // exactly one sample left of the border survives
        let negative = series.points().iter().filter(|p| p.x < 0.0).count();
        assert_eq!(negative, 1);
        assert!(series.points()[1].x >= 0.0);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        for width in [0.0, 12.5, 137.3, 333.3, 499.0] {
            let mut series = grown(120);
            series.clamp_to_viewport(width);
            let once = series.clone();
            assert!(!series.clamp_to_viewport(width));
            assert_eq!(series, once, "width {width}");
        }
    }

    #[test]
    fn test_clamp_ignores_empty_and_nan() {
        let mut series = PointSeries::default();
        assert!(!series.clamp_to_viewport(10.0));
        let mut series = grown(5);
        assert!(!series.clamp_to_viewport(f64::NAN));
    }
}
