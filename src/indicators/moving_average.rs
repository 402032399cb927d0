//! Moving averages: SMA, WMA and the EMA helper used by MACD.

use super::{closes, Indicator, SeriesClass, TransformKind};
use crate::{Period, OHLCV};

/// Simple Moving Average of closes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sma {
    pub period: Period,
}

impl Sma {
    pub fn new(period: Period) -> Self {
        Self { period }
    }
}

impl Default for Sma {
    fn default() -> Self {
        Self::new(Period::new_const(20))
    }
}

impl Indicator for Sma {
    type Output = Option<f64>;

    const NAME: &'static str = "SMA";
    const SHORT_NAME: &'static str = "SMA";
    const SERIES: SeriesClass = SeriesClass::Price;
    const TRANSFORM: TransformKind = TransformKind::Windowed;

    fn calc<T: OHLCV>(&self, bars: &[T]) -> Vec<Option<f64>> {
        sma(&closes(bars), self.period.get())
    }
}

/// Running-sum SMA over raw values; absent before index `period - 1`.
pub(crate) fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= period {
            sum -= values[i - period];
        }
        if i + 1 >= period {
            out[i] = Some(sum / period as f64);
        }
    }
    out
}

/// Linearly Weighted Moving Average of closes (weight `p` on the newest bar)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wma {
    pub period: Period,
}

impl Wma {
    pub fn new(period: Period) -> Self {
        Self { period }
    }
}

impl Default for Wma {
    fn default() -> Self {
        Self::new(Period::new_const(20))
    }
}

impl Indicator for Wma {
    type Output = Option<f64>;

    const NAME: &'static str = "WMA";
    const SHORT_NAME: &'static str = "WMA";
    const SERIES: SeriesClass = SeriesClass::Price;
    const TRANSFORM: TransformKind = TransformKind::Windowed;

    fn calc<T: OHLCV>(&self, bars: &[T]) -> Vec<Option<f64>> {
        let p = self.period.get();
        let divisor = p as f64 * (p as f64 + 1.0) / 2.0;
        let mut out = vec![None; bars.len()];
        for i in p.saturating_sub(1)..bars.len() {
            let start = i + 1 - p;
            let weighted: f64 = bars[start..=i]
                .iter()
                .enumerate()
                .map(|(k, b)| (k + 1) as f64 * b.close())
                .sum();
            out[i] = Some(weighted / divisor);
        }
        out
    }
}

/// Exponential moving average over a series with possible leading gaps.
///
/// Seeded with the first present input, then `k = 2 / (p + 1)`. Absent inputs
/// after the seed produce absent outputs without disturbing the carried value.
/// Entirely absent when `period` is 0 or exceeds the series length.
pub(crate) fn ema(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || period > values.len() {
        return out;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut prev: Option<f64> = None;
    for (i, v) in values.iter().enumerate() {
        let Some(v) = *v else {
            continue;
        };
        let next = match prev {
            None => v,
            Some(p) => v * k + p * (1.0 - k),
        };
        prev = Some(next);
        out[i] = Some(next);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_values() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_ema_seeds_on_first_present_value() {
        let out = ema(&[None, None, Some(10.0), Some(20.0)], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(10.0));
        // k = 0.5
        assert_eq!(out[3], Some(15.0));
    }

    #[test]
    fn test_ema_period_guards() {
        assert!(ema(&[Some(1.0), Some(2.0)], 0).iter().all(Option::is_none));
        assert!(ema(&[Some(1.0), Some(2.0)], 3).iter().all(Option::is_none));
    }

    #[test]
    fn test_wma_max_period_is_absent() {
        let bars: Vec<crate::Bar> = (0..4).map(|i| crate::Bar::new(i, 1.0, 1.0, 1.0, 1.0, 0.0)).collect();
        let out = Wma::new(Period::new_const(usize::MAX)).calc(&bars);
        assert_eq!(out, vec![None; 4]);
    }
}
