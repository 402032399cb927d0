//! Chart (price-action) pattern detector
//!
//! Works on fixed-width windows around a candidate center bar rather than on
//! fractal swing points. Tops measure peaks on bar highs and troughs on bar
//! lows; bottoms do the reverse. Each pattern is tested independently, so one
//! window may report several patterns.

use crate::{Direction, PatternId, PatternKind, PatternMatch, PatternPoint, OHLCV};

/// Double/triple peaks must lie within this fraction of each other.
pub const PEAK_TOLERANCE: f64 = 0.03;
/// Troughs between peaks must be at least this fraction beyond the weakest peak.
pub const TROUGH_DEPTH: f64 = 0.03;
/// Head must exceed each shoulder by this fraction.
pub const HEAD_RATIO: f64 = 0.05;
/// Inverse head must undercut each shoulder by this fraction.
pub const INVERSE_HEAD_RATIO: f64 = 0.02;
/// Shoulders must lie within this fraction of each other.
pub const SHOULDER_TOLERANCE: f64 = 0.05;
/// Wedge end range must be below this fraction of the start range.
pub const WEDGE_CONTRACTION: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartPattern {
    HeadAndShoulders,
    InverseHeadAndShoulders,
    DoubleTop,
    DoubleBottom,
    TripleTop,
    TripleBottom,
    RisingWedge,
    FallingWedge,
}

impl ChartPattern {
    /// Evaluation order
    pub const ALL: [ChartPattern; 8] = [
        ChartPattern::HeadAndShoulders,
        ChartPattern::InverseHeadAndShoulders,
        ChartPattern::DoubleTop,
        ChartPattern::DoubleBottom,
        ChartPattern::TripleTop,
        ChartPattern::TripleBottom,
        ChartPattern::RisingWedge,
        ChartPattern::FallingWedge,
    ];

    pub fn id(self) -> PatternId {
        match self {
            ChartPattern::HeadAndShoulders => PatternId::HEAD_AND_SHOULDERS,
            ChartPattern::InverseHeadAndShoulders => PatternId::INVERSE_HEAD_AND_SHOULDERS,
            ChartPattern::DoubleTop => PatternId::DOUBLE_TOP,
            ChartPattern::DoubleBottom => PatternId::DOUBLE_BOTTOM,
            ChartPattern::TripleTop => PatternId::TRIPLE_TOP,
            ChartPattern::TripleBottom => PatternId::TRIPLE_BOTTOM,
            ChartPattern::RisingWedge => PatternId::RISING_WEDGE,
            ChartPattern::FallingWedge => PatternId::FALLING_WEDGE,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            ChartPattern::HeadAndShoulders
            | ChartPattern::DoubleTop
            | ChartPattern::TripleTop
            | ChartPattern::RisingWedge => Direction::Bearish,
            ChartPattern::InverseHeadAndShoulders
            | ChartPattern::DoubleBottom
            | ChartPattern::TripleBottom
            | ChartPattern::FallingWedge => Direction::Bullish,
        }
    }

    /// Bars on each side of the center that the window spans.
    pub fn half_width(self) -> usize {
        match self {
            ChartPattern::HeadAndShoulders
            | ChartPattern::InverseHeadAndShoulders
            | ChartPattern::TripleTop
            | ChartPattern::TripleBottom => 3,
            ChartPattern::DoubleTop
            | ChartPattern::DoubleBottom
            | ChartPattern::RisingWedge
            | ChartPattern::FallingWedge => 2,
        }
    }

    /// Test the window centered on `center`.
    pub fn detect_at<T: OHLCV>(self, bars: &[T], center: usize) -> Option<PatternMatch> {
        let half = self.half_width();
        if center < half || center + half >= bars.len() {
            return None;
        }
        let w = Window { bars, center };

        let points = match self {
            ChartPattern::HeadAndShoulders => head_and_shoulders(&w)?,
            ChartPattern::InverseHeadAndShoulders => inverse_head_and_shoulders(&w)?,
            ChartPattern::DoubleTop => double_top(&w)?,
            ChartPattern::DoubleBottom => double_bottom(&w)?,
            ChartPattern::TripleTop => triple_top(&w)?,
            ChartPattern::TripleBottom => triple_bottom(&w)?,
            ChartPattern::RisingWedge => rising_wedge(&w)?,
            ChartPattern::FallingWedge => falling_wedge(&w)?,
        };

        Some(PatternMatch {
            pattern_id: self.id(),
            kind: PatternKind::Chart,
            direction: self.direction(),
            points,
        })
    }
}

/// Every chart pattern over the whole sequence, by center index then
/// [`ChartPattern::ALL`] order.
pub fn detect_chart_patterns<T: OHLCV>(bars: &[T]) -> Vec<PatternMatch> {
    let mut results = Vec::new();
    for center in 0..bars.len() {
        for pattern in ChartPattern::ALL {
            if let Some(m) = pattern.detect_at(bars, center) {
                results.push(m);
            }
        }
    }
    results
}

// ============================================================
// WINDOW ACCESS
// ============================================================

/// Offsets are relative to the center; callers have checked the bounds.
struct Window<'a, T> {
    bars: &'a [T],
    center: usize,
}

impl<T: OHLCV> Window<'_, T> {
    fn index(&self, offset: isize) -> usize {
        self.center.wrapping_add_signed(offset)
    }

    fn high(&self, offset: isize) -> f64 {
        self.bars[self.index(offset)].high()
    }

    fn low(&self, offset: isize) -> f64 {
        self.bars[self.index(offset)].low()
    }

    fn is_peak(&self, offset: isize) -> bool {
        let h = self.high(offset);
        h > self.high(offset - 1) && h > self.high(offset + 1)
    }

    fn is_valley(&self, offset: isize) -> bool {
        let l = self.low(offset);
        l < self.low(offset - 1) && l < self.low(offset + 1)
    }

    fn high_point(&self, offset: isize) -> PatternPoint {
        PatternPoint::new(self.index(offset), self.high(offset))
    }

    fn low_point(&self, offset: isize) -> PatternPoint {
        PatternPoint::new(self.index(offset), self.low(offset))
    }
}

/// Spread of `values` relative to their largest magnitude is within `tolerance`.
fn within(values: &[f64], tolerance: f64) -> bool {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    max - min <= max.abs().max(min.abs()) * tolerance
}

// ============================================================
// HEAD AND SHOULDERS
// ============================================================

fn head_and_shoulders<T: OHLCV>(w: &Window<'_, T>) -> Option<Vec<PatternPoint>> {
    if !(w.is_peak(-2) && w.is_peak(0) && w.is_peak(2)) {
        return None;
    }
    let (left, head, right) = (w.high(-2), w.high(0), w.high(2));
    if head < left * (1.0 + HEAD_RATIO) || head < right * (1.0 + HEAD_RATIO) {
        return None;
    }
    if !within(&[left, right], SHOULDER_TOLERANCE) {
        return None;
    }
    if w.low(-1) >= left.min(right) || w.low(1) >= left.min(right) {
        return None;
    }
    Some(vec![
        w.high_point(-2),
        w.low_point(-1),
        w.high_point(0),
        w.low_point(1),
        w.high_point(2),
    ])
}

fn inverse_head_and_shoulders<T: OHLCV>(w: &Window<'_, T>) -> Option<Vec<PatternPoint>> {
    if !(w.is_valley(-2) && w.is_valley(0) && w.is_valley(2)) {
        return None;
    }
    let (left, head, right) = (w.low(-2), w.low(0), w.low(2));
    if head > left * (1.0 - INVERSE_HEAD_RATIO) || head > right * (1.0 - INVERSE_HEAD_RATIO) {
        return None;
    }
    if !within(&[left, right], SHOULDER_TOLERANCE) {
        return None;
    }
    if w.high(-1) <= left.max(right) || w.high(1) <= left.max(right) {
        return None;
    }
    Some(vec![
        w.low_point(-2),
        w.high_point(-1),
        w.low_point(0),
        w.high_point(1),
        w.low_point(2),
    ])
}

// ============================================================
// DOUBLE / TRIPLE TOPS AND BOTTOMS
// ============================================================

fn double_top<T: OHLCV>(w: &Window<'_, T>) -> Option<Vec<PatternPoint>> {
    if !(w.is_peak(-1) && w.is_peak(1)) {
        return None;
    }
    let (first, second) = (w.high(-1), w.high(1));
    if !within(&[first, second], PEAK_TOLERANCE) {
        return None;
    }
    if w.low(0) > first.min(second) * (1.0 - TROUGH_DEPTH) {
        return None;
    }
    Some(vec![w.high_point(-1), w.low_point(0), w.high_point(1)])
}

fn double_bottom<T: OHLCV>(w: &Window<'_, T>) -> Option<Vec<PatternPoint>> {
    if !(w.is_valley(-1) && w.is_valley(1)) {
        return None;
    }
    let (first, second) = (w.low(-1), w.low(1));
    if !within(&[first, second], PEAK_TOLERANCE) {
        return None;
    }
    if w.high(0) < first.max(second) * (1.0 + TROUGH_DEPTH) {
        return None;
    }
    Some(vec![w.low_point(-1), w.high_point(0), w.low_point(1)])
}

fn triple_top<T: OHLCV>(w: &Window<'_, T>) -> Option<Vec<PatternPoint>> {
    if !(w.is_peak(-2) && w.is_peak(0) && w.is_peak(2)) {
        return None;
    }
    let peaks = [w.high(-2), w.high(0), w.high(2)];
    if !within(&peaks, PEAK_TOLERANCE) {
        return None;
    }
    let floor = peaks.iter().copied().fold(f64::INFINITY, f64::min) * (1.0 - TROUGH_DEPTH);
    if w.low(-1) > floor || w.low(1) > floor {
        return None;
    }
    Some(vec![
        w.high_point(-2),
        w.low_point(-1),
        w.high_point(0),
        w.low_point(1),
        w.high_point(2),
    ])
}

fn triple_bottom<T: OHLCV>(w: &Window<'_, T>) -> Option<Vec<PatternPoint>> {
    if !(w.is_valley(-2) && w.is_valley(0) && w.is_valley(2)) {
        return None;
    }
    let troughs = [w.low(-2), w.low(0), w.low(2)];
    if !within(&troughs, PEAK_TOLERANCE) {
        return None;
    }
    let ceiling =
        troughs.iter().copied().fold(f64::NEG_INFINITY, f64::max) * (1.0 + TROUGH_DEPTH);
    if w.high(-1) < ceiling || w.high(1) < ceiling {
        return None;
    }
    Some(vec![
        w.low_point(-2),
        w.high_point(-1),
        w.low_point(0),
        w.high_point(1),
        w.low_point(2),
    ])
}

// ============================================================
// WEDGES
// ============================================================

/// Envelope geometry over the 4-step span from offset -2 to +2.
struct Envelope {
    upper_slope: f64,
    lower_slope: f64,
    contracted: bool,
}

fn envelope<T: OHLCV>(w: &Window<'_, T>) -> Option<Envelope> {
    let start_range = w.high(-2) - w.low(-2);
    let end_range = w.high(2) - w.low(2);
    if start_range.is_nan() || start_range <= 0.0 || end_range < 0.0 {
        return None;
    }
    Some(Envelope {
        upper_slope: (w.high(2) - w.high(-2)) / 4.0,
        lower_slope: (w.low(2) - w.low(-2)) / 4.0,
        contracted: end_range < start_range * WEDGE_CONTRACTION,
    })
}

fn wedge_points<T: OHLCV>(w: &Window<'_, T>) -> Vec<PatternPoint> {
    vec![
        w.high_point(-2),
        w.high_point(2),
        w.low_point(-2),
        w.low_point(2),
    ]
}

fn rising_wedge<T: OHLCV>(w: &Window<'_, T>) -> Option<Vec<PatternPoint>> {
    let env = envelope(w)?;
    let monotone = (-2..2).all(|k| w.high(k + 1) >= w.high(k) && w.low(k + 1) >= w.low(k));
    if env.upper_slope > 0.0
        && env.lower_slope > env.upper_slope
        && env.contracted
        && monotone
    {
        return Some(wedge_points(w));
    }
    None
}

fn falling_wedge<T: OHLCV>(w: &Window<'_, T>) -> Option<Vec<PatternPoint>> {
    let env = envelope(w)?;
    let monotone = (-2..2).all(|k| w.high(k + 1) <= w.high(k) && w.low(k + 1) <= w.low(k));
    if env.lower_slope < 0.0
        && env.upper_slope < env.lower_slope
        && env.contracted
        && monotone
    {
        return Some(wedge_points(w));
    }
    None
}
