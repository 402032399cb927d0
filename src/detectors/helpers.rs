//! Per-bar primitives and fixed thresholds shared by the candlestick rules.
//!
//! Every threshold is a fraction of the bar's total range (high - low), except
//! [`NEAR_TOLERANCE`], which is relative to the compared prices. These values
//! define the identity of each pattern and are not tunable.

use crate::{OHLCVExt, OHLCV};

// ============================================================
// THRESHOLDS
// ============================================================

/// Body is doji-like: body <= range * DOJI_BODY_RATIO
pub const DOJI_BODY_RATIO: f64 = 0.05;
/// Body is small: body <= range * SMALL_BODY_RATIO
pub const SMALL_BODY_RATIO: f64 = 0.3;
/// Body is large: body >= range * LARGE_BODY_RATIO
pub const LARGE_BODY_RATIO: f64 = 0.6;
/// Body fills the bar: body >= range * MARUBOZU_BODY_RATIO
pub const MARUBOZU_BODY_RATIO: f64 = 0.9;
/// Dominant shadow of a hammer/star: shadow >= range * LONG_SHADOW_RATIO
pub const LONG_SHADOW_RATIO: f64 = 0.6;
/// Dragonfly/gravestone shadow: shadow >= range * VERY_LONG_SHADOW_RATIO
pub const VERY_LONG_SHADOW_RATIO: f64 = 0.7;
/// Negligible shadow: shadow <= range * SHORT_SHADOW_RATIO
pub const SHORT_SHADOW_RATIO: f64 = 0.05;
/// Both legs of a long-legged doji: shadow >= range * LONG_LEG_RATIO
pub const LONG_LEG_RATIO: f64 = 0.3;
/// Two prices are "equal": |a - b| <= max(|a|, |b|) * NEAR_TOLERANCE
pub const NEAR_TOLERANCE: f64 = 0.01;

/// First bar index the candlestick classifier evaluates.
pub const CANDLE_FIRST_INDEX: usize = 2;

// ============================================================
// CANDLE SHAPE
// ============================================================

/// Geometric primitives of one bar, computed once per scan.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CandleShape {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub body: f64,
    pub range: f64,
    pub upper_shadow: f64,
    pub lower_shadow: f64,
}

impl CandleShape {
    pub fn of<B: OHLCV + ?Sized>(bar: &B) -> Self {
        Self {
            open: bar.open(),
            high: bar.high(),
            low: bar.low(),
            close: bar.close(),
            body: bar.body(),
            range: bar.range(),
            upper_shadow: bar.upper_shadow(),
            lower_shadow: bar.lower_shadow(),
        }
    }

    /// Ratio rules are only meaningful on bars with a positive range.
    #[inline]
    pub fn has_range(&self) -> bool {
        self.range > 0.0
    }

    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    #[inline]
    pub fn is_doji(&self) -> bool {
        self.has_range() && self.body <= self.range * DOJI_BODY_RATIO
    }

    #[inline]
    pub fn is_small_body(&self) -> bool {
        self.has_range() && self.body <= self.range * SMALL_BODY_RATIO
    }

    #[inline]
    pub fn is_large_body(&self) -> bool {
        self.has_range() && self.body >= self.range * LARGE_BODY_RATIO
    }

    #[inline]
    pub fn is_marubozu(&self) -> bool {
        self.has_range() && self.body >= self.range * MARUBOZU_BODY_RATIO
    }

    #[inline]
    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    #[inline]
    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    #[inline]
    pub fn body_mid(&self) -> f64 {
        (self.open + self.close) / 2.0
    }

    /// Body lies within `outer`'s body (edges inclusive).
    #[inline]
    pub fn body_inside(&self, outer: &CandleShape) -> bool {
        self.body_top() <= outer.body_top() && self.body_bottom() >= outer.body_bottom()
    }
}

// ============================================================
// COMPARISONS
// ============================================================

/// Prices equal within [`NEAR_TOLERANCE`].
#[inline]
pub fn near(a: f64, b: f64) -> bool {
    (a - b).abs() <= a.abs().max(b.abs()) * NEAR_TOLERANCE
}

/// Whole-bar gap up: current low above previous high.
#[inline]
pub fn gap_up(prev: &CandleShape, curr: &CandleShape) -> bool {
    curr.low > prev.high
}

/// Whole-bar gap down: current high below previous low.
#[inline]
pub fn gap_down(prev: &CandleShape, curr: &CandleShape) -> bool {
    curr.high < prev.low
}

/// Real-body gap up.
#[inline]
pub fn body_gap_up(prev: &CandleShape, curr: &CandleShape) -> bool {
    curr.body_bottom() > prev.body_top()
}

/// Real-body gap down.
#[inline]
pub fn body_gap_down(prev: &CandleShape, curr: &CandleShape) -> bool {
    curr.body_top() < prev.body_bottom()
}

/// Short-term trend leading into `index`, from the two preceding closes.
///
/// `Some(true)` when falling, `Some(false)` when rising, `None` when flat or
/// not enough history.
#[inline]
pub fn falling_into(shapes: &[CandleShape], index: usize) -> Option<bool> {
    if index < 2 {
        return None;
    }
    let older = shapes.get(index - 2)?.close;
    let newer = shapes.get(index - 1)?.close;
    if older > newer {
        Some(true)
    } else if older < newer {
        Some(false)
    } else {
        None
    }
}

/// The `N` shapes ending at `index`, oldest first.
#[inline]
pub fn window<const N: usize>(shapes: &[CandleShape], index: usize) -> Option<[&CandleShape; N]> {
    if index + 1 < N || index >= shapes.len() {
        return None;
    }
    let start = index + 1 - N;
    Some(std::array::from_fn(|k| &shapes[start + k]))
}
