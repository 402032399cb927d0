//! Harmonic (XABCD) pattern detector
//!
//! Two stages: fractal swing points are extracted from the bars, then every
//! run of consecutive alternating swings is measured against Fibonacci leg
//! ratios. Five-point runs are classified as Gartley, Butterfly, Bat, Crab or
//! Shark; four-point runs as Cypher.

use crate::{Direction, PatternId, PatternKind, PatternMatch, PatternPoint, OHLCV};

/// Bars compared on each side of a swing candidate.
pub const SWING_SPAN: usize = 2;
/// Absolute tolerance on every leg ratio.
pub const RATIO_TOLERANCE: f64 = 0.2;

// ============================================================
// SWING POINTS
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwingKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingPoint {
    pub index: usize,
    pub value: f64,
    pub kind: SwingKind,
}

impl SwingPoint {
    pub fn new(index: usize, value: f64, kind: SwingKind) -> Self {
        Self { index, value, kind }
    }

    fn point(&self) -> PatternPoint {
        PatternPoint::new(self.index, self.value)
    }
}

/// Fractal swing points in index order.
///
/// A high swing's high strictly exceeds the highs of the [`SWING_SPAN`] bars
/// on either side; a low swing mirrors this on lows. A bar satisfying both is
/// reported as a high and then a low.
pub fn find_swing_points<T: OHLCV>(bars: &[T]) -> Vec<SwingPoint> {
    let mut swings = Vec::new();
    if bars.len() < 2 * SWING_SPAN + 1 {
        return swings;
    }

    for i in SWING_SPAN..bars.len() - SWING_SPAN {
        let neighbours = (i - SWING_SPAN..=i + SWING_SPAN).filter(|&j| j != i);

        let high = bars[i].high();
        if neighbours.clone().all(|j| high > bars[j].high()) {
            swings.push(SwingPoint::new(i, high, SwingKind::High));
        }
        let low = bars[i].low();
        if neighbours.clone().all(|j| low < bars[j].low()) {
            swings.push(SwingPoint::new(i, low, SwingKind::Low));
        }
    }
    swings
}

// ============================================================
// PATTERN TABLE
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HarmonicPattern {
    Gartley,
    Butterfly,
    Bat,
    Crab,
    Shark,
    Cypher,
}

impl HarmonicPattern {
    /// Five-point patterns, in tie-break order.
    pub const FIVE_POINT: [HarmonicPattern; 5] = [
        HarmonicPattern::Gartley,
        HarmonicPattern::Butterfly,
        HarmonicPattern::Bat,
        HarmonicPattern::Crab,
        HarmonicPattern::Shark,
    ];

    pub fn id(self) -> PatternId {
        match self {
            HarmonicPattern::Gartley => PatternId::GARTLEY,
            HarmonicPattern::Butterfly => PatternId::BUTTERFLY,
            HarmonicPattern::Bat => PatternId::BAT,
            HarmonicPattern::Crab => PatternId::CRAB,
            HarmonicPattern::Shark => PatternId::SHARK,
            HarmonicPattern::Cypher => PatternId::CYPHER,
        }
    }

    /// Target leg ratios: `AB/XA`, `BC/AB` and, for five-point patterns, `CD/BC`.
    pub fn ratios(self) -> &'static [f64] {
        match self {
            HarmonicPattern::Gartley => &[0.618, 0.382, 1.272],
            HarmonicPattern::Butterfly => &[0.786, 0.382, 1.618],
            HarmonicPattern::Bat => &[0.382, 0.886, 1.618],
            HarmonicPattern::Crab => &[0.382, 0.886, 2.618],
            HarmonicPattern::Shark => &[1.13, 1.618, 1.27],
            HarmonicPattern::Cypher => &[0.382, 1.414],
        }
    }
}

// ============================================================
// MATCHING
// ============================================================

fn alternating(run: &[SwingPoint]) -> bool {
    run.windows(2).all(|w| w[0].kind != w[1].kind)
}

/// Successive leg ratios of `run`; `None` if any divisor leg is zero or the
/// ratio is not finite.
fn leg_ratios(run: &[SwingPoint]) -> Option<Vec<f64>> {
    let legs: Vec<f64> = run
        .windows(2)
        .map(|w| (w[1].value - w[0].value).abs())
        .collect();
    legs.windows(2)
        .map(|pair| {
            if pair[0] == 0.0 {
                return None;
            }
            let ratio = pair[1] / pair[0];
            ratio.is_finite().then_some(ratio)
        })
        .collect()
}

fn within_tolerance(actual: f64, target: f64) -> bool {
    (actual - target).abs() <= RATIO_TOLERANCE
}

fn direction_of(x: &SwingPoint) -> Direction {
    match x.kind {
        SwingKind::Low => Direction::Bullish,
        SwingKind::High => Direction::Bearish,
    }
}

fn to_match(pattern: HarmonicPattern, run: &[SwingPoint]) -> PatternMatch {
    PatternMatch {
        pattern_id: pattern.id(),
        kind: PatternKind::Harmonic,
        direction: direction_of(&run[0]),
        points: run.iter().map(SwingPoint::point).collect(),
    }
}

/// Best five-point pattern for `XABCD`.
///
/// Candidates are the patterns whose `AB/XA` and `BC/AB` targets are both
/// within tolerance; among them the one closest on `CD/BC` wins. Earlier
/// entries of [`HarmonicPattern::FIVE_POINT`] win ties.
fn classify_five(run: &[SwingPoint]) -> Option<HarmonicPattern> {
    let ratios = leg_ratios(run)?;
    let (ab_xa, bc_ab, cd_bc) = (ratios[0], ratios[1], ratios[2]);

    let mut best: Option<(HarmonicPattern, f64)> = None;
    for pattern in HarmonicPattern::FIVE_POINT {
        let target = pattern.ratios();
        if !within_tolerance(ab_xa, target[0]) || !within_tolerance(bc_ab, target[1]) {
            continue;
        }
        let error = (cd_bc - target[2]).abs();
        if best.map_or(true, |(_, e)| error < e) {
            best = Some((pattern, error));
        }
    }
    best.map(|(pattern, _)| pattern)
}

fn is_cypher(run: &[SwingPoint]) -> bool {
    let Some(ratios) = leg_ratios(run) else {
        return false;
    };
    let target = HarmonicPattern::Cypher.ratios();
    within_tolerance(ratios[0], target[0]) && within_tolerance(ratios[1], target[1])
}

/// Classify every alternating run of swing points.
///
/// Results are ordered by the run's starting swing; at each start the
/// five-point match (if any) precedes the Cypher match.
pub fn detect_from_swings(swings: &[SwingPoint]) -> Vec<PatternMatch> {
    let mut results = Vec::new();
    for start in 0..swings.len() {
        if let Some(run) = swings.get(start..start + 5) {
            if alternating(run) {
                if let Some(pattern) = classify_five(run) {
                    results.push(to_match(pattern, run));
                }
            }
        }
        if let Some(run) = swings.get(start..start + 4) {
            if alternating(run) && is_cypher(run) {
                results.push(to_match(HarmonicPattern::Cypher, run));
            }
        }
    }
    results
}

/// Swing extraction followed by [`detect_from_swings`].
pub fn detect_harmonic_patterns<T: OHLCV>(bars: &[T]) -> Vec<PatternMatch> {
    detect_from_swings(&find_swing_points(bars))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swings(values: &[f64], first: SwingKind) -> Vec<SwingPoint> {
        let mut kind = first;
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let s = SwingPoint::new(i * 2, v, kind);
                kind = match kind {
                    SwingKind::High => SwingKind::Low,
                    SwingKind::Low => SwingKind::High,
                };
                s
            })
            .collect()
    }

    #[test]
    fn test_gartley_from_swings() {
        let run = swings(&[100.0, 140.0, 120.0, 130.0, 110.0], SwingKind::Low);
        let found = detect_from_swings(&run);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pattern_id, PatternId::GARTLEY);
        assert_eq!(found[0].direction, Direction::Bullish);
        assert_eq!(found[0].points.len(), 5);
    }

    #[test]
    fn test_bearish_when_x_is_high() {
        let run = swings(&[140.0, 100.0, 120.0, 110.0, 130.0], SwingKind::High);
        let found = detect_from_swings(&run);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].direction, Direction::Bearish);
    }

    #[test]
    fn test_closest_third_ratio_wins() {
        // AB/XA = 0.5, BC/AB = 0.8: Bat and Crab are both candidates,
        // CD/BC = 2.5 is closer to Crab.
        let run = swings(&[100.0, 200.0, 150.0, 190.0, 90.0], SwingKind::Low);
        let found = detect_from_swings(&run);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pattern_id, PatternId::CRAB);
    }

    #[test]
    fn test_cypher() {
        // AB/XA = 0.4, BC/AB = 1.4
        let run = swings(&[100.0, 150.0, 130.0, 158.0], SwingKind::Low);
        let found = detect_from_swings(&run);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pattern_id, PatternId::CYPHER);
        assert_eq!(found[0].points.len(), 4);
    }

    #[test]
    fn test_zero_leg_is_skipped() {
        let run = swings(&[100.0, 100.0, 120.0, 130.0, 110.0], SwingKind::Low);
        assert!(detect_from_swings(&run).is_empty());
    }

    #[test]
    fn test_non_alternating_run_is_skipped() {
        let mut run = swings(&[100.0, 140.0, 120.0, 130.0, 110.0], SwingKind::Low);
        run[3].kind = SwingKind::Low;
        assert!(detect_from_swings(&run).is_empty());
    }

    #[test]
    fn test_swing_extraction_is_strict() {
        let flat: Vec<crate::Bar> = (0..7)
            .map(|i| crate::Bar::new(i, 10.0, 10.0, 10.0, 10.0, 0.0))
            .collect();
        assert!(find_swing_points(&flat).is_empty());
    }
}
