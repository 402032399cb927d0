//! Trend-flip state machines: Parabolic SAR and Supertrend
//!
//! Unlike the windowed family these carry state from bar to bar, so each one
//! exposes its per-bar state struct alongside the plain output series.

use serde::Serialize;

use super::{Indicator, IndicatorRecord, SeriesClass, TransformKind};
use crate::{Direction, OHLCVExt, Period, OHLCV};

/// Average True Range with Wilder smoothing.
///
/// Absent before `period - 1`; the mean of the first `period` true ranges at
/// `period - 1`; `(prev * (p - 1) + tr) / p` afterwards. The first bar's true
/// range is its plain range.
pub fn atr<T: OHLCV>(bars: &[T], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; bars.len()];
    if period == 0 || period > bars.len() {
        return out;
    }
    let p = period as f64;
    let mut prev_close = None;
    let mut seed_sum = 0.0;
    let mut prev_atr = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        let tr = bar.true_range(prev_close);
        prev_close = Some(bar.close());
        if i + 1 < period {
            seed_sum += tr;
            continue;
        }
        prev_atr = if i + 1 == period {
            (seed_sum + tr) / p
        } else {
            (prev_atr * (p - 1.0) + tr) / p
        };
        out[i] = Some(prev_atr);
    }
    out
}

// ============================================================
// PARABOLIC SAR
// ============================================================

/// Parabolic SAR state after processing one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SarState {
    pub is_up: bool,
    pub acceleration: f64,
    pub extreme_point: f64,
    pub sar: f64,
}

impl SarState {
    fn seed<T: OHLCV>(bar: &T, step: f64) -> Self {
        Self {
            is_up: true,
            acceleration: step,
            extreme_point: bar.high(),
            sar: bar.low(),
        }
    }

    fn advance<T: OHLCV>(&mut self, bar: &T, step: f64, max_step: f64) {
        self.sar += self.acceleration * (self.extreme_point - self.sar);

        if self.is_up {
            if bar.low() < self.sar {
                self.is_up = false;
                self.sar = self.extreme_point;
                self.extreme_point = bar.low();
                self.acceleration = step;
            } else if bar.high() > self.extreme_point {
                self.extreme_point = bar.high();
                self.acceleration = (self.acceleration + step).min(max_step);
            }
        } else if bar.high() > self.sar {
            self.is_up = true;
            self.sar = self.extreme_point;
            self.extreme_point = bar.high();
            self.acceleration = step;
        } else if bar.low() < self.extreme_point {
            self.extreme_point = bar.low();
            self.acceleration = (self.acceleration + step).min(max_step);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParabolicSar {
    pub step: f64,
    pub max_step: f64,
}

impl ParabolicSar {
    pub fn new(step: f64, max_step: f64) -> Self {
        Self { step, max_step }
    }

    /// State after each bar; the first entry is the seed.
    pub fn states<T: OHLCV>(&self, bars: &[T]) -> Vec<SarState> {
        let Some(first) = bars.first() else {
            return Vec::new();
        };
        let mut state = SarState::seed(first, self.step);
        let mut out = Vec::with_capacity(bars.len());
        out.push(state);
        for bar in &bars[1..] {
            state.advance(bar, self.step, self.max_step);
            out.push(state);
        }
        out
    }
}

impl Default for ParabolicSar {
    fn default() -> Self {
        Self::new(0.02, 0.2)
    }
}

impl Indicator for ParabolicSar {
    type Output = Option<f64>;

    const NAME: &'static str = "SAR";
    const SHORT_NAME: &'static str = "SAR";
    const SERIES: SeriesClass = SeriesClass::Price;
    const TRANSFORM: TransformKind = TransformKind::Sequential;

    fn calc<T: OHLCV>(&self, bars: &[T]) -> Vec<Option<f64>> {
        self.states(bars).iter().map(|s| Some(s.sar)).collect()
    }
}

// ============================================================
// SUPERTREND
// ============================================================

/// Supertrend state after one bar with a defined ATR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SupertrendState {
    pub is_up: bool,
    pub value: f64,
    pub upper_band: f64,
    pub lower_band: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SupertrendValue {
    pub value: Option<f64>,
    pub direction: Option<Direction>,
}

impl IndicatorRecord for SupertrendValue {
    const FIELDS: &'static [&'static str] = &["value", "direction"];

    fn absent() -> Self {
        Self::default()
    }

    /// Direction is encoded as `1.0` (up) / `-1.0` (down).
    fn values(&self) -> Vec<Option<f64>> {
        let direction = self.direction.map(|d| if d.is_bullish() { 1.0 } else { -1.0 });
        vec![self.value, direction]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Supertrend {
    pub atr_period: Period,
    pub multiplier: f64,
}

impl Supertrend {
    pub fn new(atr_period: Period, multiplier: f64) -> Self {
        Self {
            atr_period,
            multiplier,
        }
    }

    /// State per bar; `None` until the ATR is defined.
    pub fn states<T: OHLCV>(&self, bars: &[T]) -> Vec<Option<SupertrendState>> {
        let atr = atr(bars, self.atr_period.get());
        let mut prev: Option<SupertrendState> = None;

        bars.iter()
            .zip(atr)
            .map(|(bar, atr)| {
                let atr = atr?;
                let mid = bar.median_price();
                let upper_band = mid + self.multiplier * atr;
                let lower_band = mid - self.multiplier * atr;
                let close = bar.close();

                let is_up = match prev {
                    None => close >= mid,
                    Some(p) if close > p.value => true,
                    Some(p) if close < p.value => false,
                    Some(p) => p.is_up,
                };
                let state = SupertrendState {
                    is_up,
                    value: if is_up { lower_band } else { upper_band },
                    upper_band,
                    lower_band,
                };
                prev = Some(state);
                Some(state)
            })
            .collect()
    }
}

impl Default for Supertrend {
    fn default() -> Self {
        Self::new(Period::new_const(10), 3.0)
    }
}

impl Indicator for Supertrend {
    type Output = SupertrendValue;

    const NAME: &'static str = "SUPERTREND";
    const SHORT_NAME: &'static str = "ST";
    const SERIES: SeriesClass = SeriesClass::Price;
    const TRANSFORM: TransformKind = TransformKind::Sequential;

    fn calc<T: OHLCV>(&self, bars: &[T]) -> Vec<SupertrendValue> {
        self.states(bars)
            .into_iter()
            .map(|state| match state {
                Some(s) => SupertrendValue {
                    value: Some(s.value),
                    direction: Some(if s.is_up {
                        Direction::Bullish
                    } else {
                        Direction::Bearish
                    }),
                },
                None => SupertrendValue::absent(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bar;

    fn bar(i: i64, high: f64, low: f64, close: f64) -> Bar {
        Bar::new(i, close, high, low, close, 0.0)
    }

    #[test]
    fn test_atr_seed_then_wilder() {
        let bars = vec![
            bar(0, 12.0, 10.0, 11.0), // tr 2
            bar(1, 13.0, 11.0, 12.0), // tr 2
            bar(2, 16.0, 12.0, 15.0), // tr 4
        ];
        let out = atr(&bars, 2);
        assert_eq!(out, vec![None, Some(2.0), Some(3.0)]);
        assert!(atr(&bars, 4).iter().all(Option::is_none));
    }

    #[test]
    fn test_sar_seed_and_flip() {
        let bars = vec![
            bar(0, 10.0, 9.0, 9.5),
            bar(1, 11.0, 10.0, 10.5),
            bar(2, 9.0, 7.0, 7.5),
        ];
        let states = ParabolicSar::default().states(&bars);
        assert_eq!(states[0].sar, 9.0);
        assert!(states[1].is_up);
        assert_eq!(states[1].extreme_point, 11.0);
        assert!((states[1].acceleration - 0.04).abs() < 1e-12);

        assert!(!states[2].is_up);
        assert_eq!(states[2].sar, 11.0);
        assert_eq!(states[2].extreme_point, 7.0);
        assert_eq!(states[2].acceleration, 0.02);
    }

    #[test]
    fn test_supertrend_first_bar_seeds_from_own_bands() {
        let bars = vec![bar(0, 12.0, 10.0, 11.5), bar(1, 12.0, 10.0, 10.2)];
        let out = Supertrend::new(Period::new_const(1), 1.0).calc(&bars);
        // mid 11, atr 2: up, value at lower band
        assert_eq!(out[0].value, Some(9.0));
        assert_eq!(out[0].direction, Some(Direction::Bullish));
        // close 10.2 stays above 9.0: still up
        assert_eq!(out[1].direction, Some(Direction::Bullish));
    }
}
