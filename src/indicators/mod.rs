//! Indicator functions
//!
//! Every indicator is a pure transform from a bar sequence and its parameters
//! to an output series of the same length. Warm-up and degenerate indices are
//! absent (`None`), never `NaN`. Warm-up lengths differ per indicator:
//!
//! | Indicator    | First defined index                         |
//! |--------------|---------------------------------------------|
//! | SMA / WMA    | `p - 1`                                     |
//! | ROC          | `p`                                         |
//! | Stochastic   | `%K`: `k - 1`, `%D`: `k + d - 2`            |
//! | ADX          | DI: `p`, ADX: `2p`                          |
//! | Bollinger    | `p - 1`                                     |
//! | Donchian     | `p - 1`                                     |
//! | Ichimoku     | each line after its own window              |
//! | Parabolic SAR| `0`                                         |
//! | Supertrend   | `p - 1`                                     |

pub mod bands;
pub mod moving_average;
pub mod oscillator;
pub mod trend;

pub use bands::{BandValue, Bollinger, Donchian, Ichimoku, IchimokuValue};
pub use moving_average::{Sma, Wma};
pub use oscillator::{Adx, AdxValue, Macd, MacdValue, Roc, StochValue, Stochastic};
pub use trend::{atr, ParabolicSar, SarState, Supertrend, SupertrendState, SupertrendValue};

use serde::Serialize;

use crate::OHLCV;

// ============================================================
// CONTRACT
// ============================================================

/// Where the renderer draws a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesClass {
    /// Overlaid on the price pane
    Price,
    /// Own pane with its own scale
    Normal,
}

/// How an indicator walks the bar sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Each output depends only on a trailing window of bars.
    Windowed,
    /// Output depends on state carried bar-to-bar from index 0.
    Sequential,
}

/// One output row of an indicator.
pub trait IndicatorRecord: Copy {
    /// Field names, in [`values`](IndicatorRecord::values) order.
    const FIELDS: &'static [&'static str];

    /// Record with every field absent.
    fn absent() -> Self;

    fn values(&self) -> Vec<Option<f64>>;
}

impl IndicatorRecord for Option<f64> {
    const FIELDS: &'static [&'static str] = &["value"];

    fn absent() -> Self {
        None
    }

    fn values(&self) -> Vec<Option<f64>> {
        vec![*self]
    }
}

/// Pure indicator transform.
pub trait Indicator {
    type Output: IndicatorRecord;

    /// Registry key
    const NAME: &'static str;
    /// Chart label
    const SHORT_NAME: &'static str;
    const SERIES: SeriesClass;
    const TRANSFORM: TransformKind;

    /// Output has exactly `bars.len()` records.
    fn calc<T: OHLCV>(&self, bars: &[T]) -> Vec<Self::Output>;
}

/// Type-erased output row handed to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub values: Vec<Option<f64>>,
}

impl OutputRecord {
    pub fn from_record<R: IndicatorRecord>(record: &R) -> Self {
        Self {
            values: record.values(),
        }
    }

    pub fn absent(fields: usize) -> Self {
        Self {
            values: vec![None; fields],
        }
    }

    pub fn get(&self, field: usize) -> Option<f64> {
        self.values.get(field).copied().flatten()
    }

    pub fn is_absent(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

// ============================================================
// WINDOW HELPERS
// ============================================================

/// First index of the `len`-bar window ending at `end`, if it fits.
#[inline]
pub(crate) fn window_start(end: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    (end + 1).checked_sub(len)
}

pub(crate) fn highest_high<T: OHLCV>(bars: &[T], end: usize, len: usize) -> Option<f64> {
    let start = window_start(end, len)?;
    bars.get(start..=end)?
        .iter()
        .map(|b| b.high())
        .reduce(f64::max)
}

pub(crate) fn lowest_low<T: OHLCV>(bars: &[T], end: usize, len: usize) -> Option<f64> {
    let start = window_start(end, len)?;
    bars.get(start..=end)?
        .iter()
        .map(|b| b.low())
        .reduce(f64::min)
}

/// `(highest high + lowest low) / 2` over the window.
pub(crate) fn midpoint<T: OHLCV>(bars: &[T], end: usize, len: usize) -> Option<f64> {
    Some((highest_high(bars, end, len)? + lowest_low(bars, end, len)?) / 2.0)
}

pub(crate) fn closes<T: OHLCV>(bars: &[T]) -> Vec<f64> {
    bars.iter().map(|b| b.close()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bar;

    #[test]
    fn test_window_start() {
        assert_eq!(window_start(4, 5), Some(0));
        assert_eq!(window_start(3, 5), None);
        assert_eq!(window_start(3, 0), None);
    }

    #[test]
    fn test_midpoint() {
        let bars = vec![
            Bar::new(0, 10.0, 12.0, 9.0, 11.0, 0.0),
            Bar::new(1, 11.0, 15.0, 10.0, 14.0, 0.0),
        ];
        assert_eq!(highest_high(&bars, 1, 2), Some(15.0));
        assert_eq!(lowest_low(&bars, 1, 2), Some(9.0));
        assert_eq!(midpoint(&bars, 1, 2), Some(12.0));
        assert_eq!(midpoint(&bars, 1, 3), None);
    }

    #[test]
    fn test_output_record() {
        let rec = OutputRecord::from_record(&Some(1.5));
        assert_eq!(rec.get(0), Some(1.5));
        assert_eq!(rec.get(1), None);
        assert!(OutputRecord::absent(3).is_absent());
    }
}
