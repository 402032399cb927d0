//! Oscillators: MACD, ROC, Stochastic, ADX / +DI / -DI

use serde::Serialize;

use super::moving_average::ema;
use super::{highest_high, lowest_low, Indicator, IndicatorRecord, SeriesClass, TransformKind};
use crate::{OHLCVExt, Period, OHLCV};

/// Stochastic %K when the window's high-low range is zero.
pub const STOCH_FLAT_VALUE: f64 = 50.0;

// ============================================================
// MACD
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MacdValue {
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

impl IndicatorRecord for MacdValue {
    const FIELDS: &'static [&'static str] = &["macd", "signal", "histogram"];

    fn absent() -> Self {
        Self::default()
    }

    fn values(&self) -> Vec<Option<f64>> {
        vec![self.macd, self.signal, self.histogram]
    }
}

/// Moving Average Convergence/Divergence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub fast: Period,
    pub slow: Period,
    pub signal: Period,
}

impl Macd {
    pub fn new(fast: Period, slow: Period, signal: Period) -> Self {
        Self { fast, slow, signal }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(Period::new_const(12), Period::new_const(26), Period::new_const(9))
    }
}

impl Indicator for Macd {
    type Output = MacdValue;

    const NAME: &'static str = "MACD";
    const SHORT_NAME: &'static str = "MACD";
    const SERIES: SeriesClass = SeriesClass::Normal;
    const TRANSFORM: TransformKind = TransformKind::Sequential;

    fn calc<T: OHLCV>(&self, bars: &[T]) -> Vec<MacdValue> {
        let closes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close())).collect();
        let fast = ema(&closes, self.fast.get());
        let slow = ema(&closes, self.slow.get());

        let macd: Vec<Option<f64>> = fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| Some((*f)? - (*s)?))
            .collect();

        // absent MACD counts as 0 only for seeding the signal line
        let seeded: Vec<Option<f64>> = macd.iter().map(|m| Some(m.unwrap_or(0.0))).collect();
        let signal = ema(&seeded, self.signal.get());

        macd.iter()
            .zip(&signal)
            .map(|(&m, &s)| {
                let signal = m.and(s);
                MacdValue {
                    macd: m,
                    signal,
                    histogram: m.zip(signal).map(|(m, s)| m - s),
                }
            })
            .collect()
    }
}

// ============================================================
// ROC
// ============================================================

/// Rate of Change in percent against the close `p` bars back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roc {
    pub period: Period,
}

impl Roc {
    pub fn new(period: Period) -> Self {
        Self { period }
    }
}

impl Default for Roc {
    fn default() -> Self {
        Self::new(Period::new_const(12))
    }
}

impl Indicator for Roc {
    type Output = Option<f64>;

    const NAME: &'static str = "ROC";
    const SHORT_NAME: &'static str = "ROC";
    const SERIES: SeriesClass = SeriesClass::Normal;
    const TRANSFORM: TransformKind = TransformKind::Windowed;

    fn calc<T: OHLCV>(&self, bars: &[T]) -> Vec<Option<f64>> {
        let p = self.period.get();
        let mut out = vec![None; bars.len()];
        for i in p..bars.len() {
            let base = bars[i - p].close();
            out[i] = Some(if base == 0.0 {
                0.0
            } else {
                (bars[i].close() - base) / base * 100.0
            });
        }
        out
    }
}

// ============================================================
// STOCHASTIC
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StochValue {
    pub k: Option<f64>,
    pub d: Option<f64>,
}

impl IndicatorRecord for StochValue {
    const FIELDS: &'static [&'static str] = &["k", "d"];

    fn absent() -> Self {
        Self::default()
    }

    fn values(&self) -> Vec<Option<f64>> {
        vec![self.k, self.d]
    }
}

/// Stochastic oscillator (%K over `k_period`, %D as SMA of %K over `d_period`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stochastic {
    pub k_period: Period,
    pub d_period: Period,
}

impl Stochastic {
    pub fn new(k_period: Period, d_period: Period) -> Self {
        Self { k_period, d_period }
    }
}

impl Default for Stochastic {
    fn default() -> Self {
        Self::new(Period::new_const(14), Period::new_const(3))
    }
}

impl Indicator for Stochastic {
    type Output = StochValue;

    const NAME: &'static str = "STOCH";
    const SHORT_NAME: &'static str = "KD";
    const SERIES: SeriesClass = SeriesClass::Normal;
    const TRANSFORM: TransformKind = TransformKind::Windowed;

    fn calc<T: OHLCV>(&self, bars: &[T]) -> Vec<StochValue> {
        let (kp, dp) = (self.k_period.get(), self.d_period.get());

        let k: Vec<Option<f64>> = (0..bars.len())
            .map(|i| {
                let hh = highest_high(bars, i, kp)?;
                let ll = lowest_low(bars, i, kp)?;
                let range = hh - ll;
                Some(if range == 0.0 {
                    STOCH_FLAT_VALUE
                } else {
                    (bars[i].close() - ll) / range * 100.0
                })
            })
            .collect();

        (0..bars.len())
            .map(|i| {
                let d = (i + 1)
                    .checked_sub(dp)
                    .and_then(|start| k[start..=i].iter().copied().sum::<Option<f64>>())
                    .map(|sum| sum / dp as f64);
                StochValue { k: k[i], d }
            })
            .collect()
    }
}

// ============================================================
// ADX
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AdxValue {
    pub adx: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
}

impl IndicatorRecord for AdxValue {
    const FIELDS: &'static [&'static str] = &["adx", "plus_di", "minus_di"];

    fn absent() -> Self {
        Self::default()
    }

    fn values(&self) -> Vec<Option<f64>> {
        vec![self.adx, self.plus_di, self.minus_di]
    }
}

/// Average Directional Index with +DI / -DI
///
/// DI uses plain trailing sums over `p` bars starting at index 1, so DI is
/// first defined at `p`; ADX averages `p` DX values and first appears at `2p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adx {
    pub period: Period,
}

impl Adx {
    pub fn new(period: Period) -> Self {
        Self { period }
    }
}

impl Default for Adx {
    fn default() -> Self {
        Self::new(Period::new_const(14))
    }
}

impl Indicator for Adx {
    type Output = AdxValue;

    const NAME: &'static str = "ADX";
    const SHORT_NAME: &'static str = "ADX";
    const SERIES: SeriesClass = SeriesClass::Normal;
    const TRANSFORM: TransformKind = TransformKind::Windowed;

    fn calc<T: OHLCV>(&self, bars: &[T]) -> Vec<AdxValue> {
        let p = self.period.get();
        let n = bars.len();

        // per-bar TR / +DM / -DM, index 0 unused
        let mut tr = vec![0.0; n];
        let mut plus_dm = vec![0.0; n];
        let mut minus_dm = vec![0.0; n];
        for i in 1..n {
            let (curr, prev) = (&bars[i], &bars[i - 1]);
            tr[i] = curr.true_range(Some(prev.close()));
            let up = curr.high() - prev.high();
            let down = prev.low() - curr.low();
            if up > down && up > 0.0 {
                plus_dm[i] = up;
            }
            if down > up && down > 0.0 {
                minus_dm[i] = down;
            }
        }

        let mut out = vec![AdxValue::default(); n];
        let mut dx: Vec<Option<f64>> = vec![None; n];
        for i in p..n {
            let window = i + 1 - p..=i;
            let tr_sum: f64 = tr[window.clone()].iter().sum();
            if tr_sum == 0.0 {
                continue;
            }
            let plus = plus_dm[window.clone()].iter().sum::<f64>() / tr_sum * 100.0;
            let minus = minus_dm[window].iter().sum::<f64>() / tr_sum * 100.0;
            let di_sum = plus + minus;
            dx[i] = Some(if di_sum == 0.0 {
                0.0
            } else {
                (plus - minus).abs() / di_sum * 100.0
            });
            out[i].plus_di = Some(plus);
            out[i].minus_di = Some(minus);
        }

        for i in p.saturating_mul(2)..n {
            out[i].adx = dx[i + 1 - p..=i]
                .iter()
                .copied()
                .sum::<Option<f64>>()
                .map(|sum| sum / p as f64);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bar;

    fn close_bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64, c, c + 1.0, c - 1.0, c, 0.0))
            .collect()
    }

    #[test]
    fn test_roc_zero_base_guard() {
        let bars = close_bars(&[0.0, 5.0, 10.0]);
        let out = Roc::new(Period::new_const(1)).calc(&bars);
        assert_eq!(out, vec![None, Some(0.0), Some(100.0)]);
    }

    #[test]
    fn test_stochastic_flat_window_is_fifty() {
        let bars: Vec<Bar> = (0..5).map(|i| Bar::new(i, 10.0, 10.0, 10.0, 10.0, 0.0)).collect();
        let out = Stochastic::new(Period::new_const(3), Period::new_const(2)).calc(&bars);
        assert_eq!(out[1].k, None);
        assert_eq!(out[2].k, Some(STOCH_FLAT_VALUE));
        assert_eq!(out[2].d, None);
        assert_eq!(out[3].d, Some(STOCH_FLAT_VALUE));
    }

    #[test]
    fn test_macd_absent_until_slow_ema() {
        let bars = close_bars(&[1.0, 2.0, 3.0]);
        let out = Macd::new(Period::new_const(2), Period::new_const(5), Period::new_const(2))
            .calc(&bars);
        assert!(out.iter().all(|v| v.macd.is_none() && v.histogram.is_none()));
    }

    #[test]
    fn test_adx_warmup() {
        let bars = close_bars(&(0..12).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let out = Adx::new(Period::new_const(3)).calc(&bars);
        assert!(out[2].plus_di.is_none());
        assert!(out[3].plus_di.is_some());
        assert!(out[5].adx.is_none());
        assert!(out[6].adx.is_some());
        // steady uptrend: all movement is positive
        assert_eq!(out[6].adx, Some(100.0));
        assert_eq!(out[6].minus_di, Some(0.0));
    }

    #[test]
    fn test_adx_max_period_is_absent() {
        let bars = close_bars(&[1.0, 2.0, 3.0]);
        let out = Adx::new(Period::new_const(usize::MAX)).calc(&bars);
        assert!(out.iter().all(|v| *v == AdxValue::default()));
    }
}
