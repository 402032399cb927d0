//! Bands and channels: Bollinger, Donchian, Ichimoku

use serde::Serialize;

use super::{closes, highest_high, lowest_low, midpoint, window_start};
use super::{Indicator, IndicatorRecord, SeriesClass, TransformKind};
use crate::{Direction, Period, OHLCV};

/// Upper / middle / lower band row shared by Bollinger and Donchian.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BandValue {
    pub upper: Option<f64>,
    pub middle: Option<f64>,
    pub lower: Option<f64>,
}

impl BandValue {
    fn new(upper: f64, middle: f64, lower: f64) -> Self {
        Self {
            upper: Some(upper),
            middle: Some(middle),
            lower: Some(lower),
        }
    }
}

impl IndicatorRecord for BandValue {
    const FIELDS: &'static [&'static str] = &["upper", "middle", "lower"];

    fn absent() -> Self {
        Self::default()
    }

    fn values(&self) -> Vec<Option<f64>> {
        vec![self.upper, self.middle, self.lower]
    }
}

// ============================================================
// BOLLINGER
// ============================================================

/// Bollinger Bands: mean of closes +/- `multiplier` population standard deviations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bollinger {
    pub period: Period,
    pub multiplier: f64,
}

impl Bollinger {
    pub fn new(period: Period, multiplier: f64) -> Self {
        Self { period, multiplier }
    }
}

impl Default for Bollinger {
    fn default() -> Self {
        Self::new(Period::new_const(20), 2.0)
    }
}

impl Indicator for Bollinger {
    type Output = BandValue;

    const NAME: &'static str = "BOLL";
    const SHORT_NAME: &'static str = "BOLL";
    const SERIES: SeriesClass = SeriesClass::Price;
    const TRANSFORM: TransformKind = TransformKind::Windowed;

    fn calc<T: OHLCV>(&self, bars: &[T]) -> Vec<BandValue> {
        let p = self.period.get();
        let closes = closes(bars);
        (0..closes.len())
            .map(|i| {
                let Some(start) = window_start(i, p) else {
                    return BandValue::absent();
                };
                let window = &closes[start..=i];
                let mean = window.iter().sum::<f64>() / p as f64;
                let variance = window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / p as f64;
                let width = self.multiplier * variance.sqrt();
                BandValue::new(mean + width, mean, mean - width)
            })
            .collect()
    }
}

// ============================================================
// DONCHIAN
// ============================================================

/// Donchian Channel: highest high / lowest low over the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Donchian {
    pub period: Period,
}

impl Donchian {
    pub fn new(period: Period) -> Self {
        Self { period }
    }
}

impl Default for Donchian {
    fn default() -> Self {
        Self::new(Period::new_const(20))
    }
}

impl Indicator for Donchian {
    type Output = BandValue;

    const NAME: &'static str = "DC";
    const SHORT_NAME: &'static str = "DC";
    const SERIES: SeriesClass = SeriesClass::Price;
    const TRANSFORM: TransformKind = TransformKind::Windowed;

    fn calc<T: OHLCV>(&self, bars: &[T]) -> Vec<BandValue> {
        let p = self.period.get();
        (0..bars.len())
            .map(|i| match (highest_high(bars, i, p), lowest_low(bars, i, p)) {
                (Some(upper), Some(lower)) => BandValue::new(upper, (upper + lower) / 2.0, lower),
                _ => BandValue::absent(),
            })
            .collect()
    }
}

// ============================================================
// ICHIMOKU
// ============================================================

/// Ichimoku lines at their own bar; forward/backward displacement is left to
/// the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct IchimokuValue {
    pub tenkan: Option<f64>,
    pub kijun: Option<f64>,
    pub span_a: Option<f64>,
    pub span_b: Option<f64>,
    pub chikou: Option<f64>,
}

impl IchimokuValue {
    /// Cloud colour between span A and span B: bullish when A is on top.
    pub fn cloud(&self) -> Option<Direction> {
        let (a, b) = (self.span_a?, self.span_b?);
        Some(if a >= b {
            Direction::Bullish
        } else {
            Direction::Bearish
        })
    }
}

impl IndicatorRecord for IchimokuValue {
    const FIELDS: &'static [&'static str] = &["tenkan", "kijun", "span_a", "span_b", "chikou"];

    fn absent() -> Self {
        Self::default()
    }

    fn values(&self) -> Vec<Option<f64>> {
        vec![self.tenkan, self.kijun, self.span_a, self.span_b, self.chikou]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ichimoku {
    pub tenkan: Period,
    pub kijun: Period,
    pub senkou: Period,
}

impl Ichimoku {
    pub fn new(tenkan: Period, kijun: Period, senkou: Period) -> Self {
        Self {
            tenkan,
            kijun,
            senkou,
        }
    }
}

impl Default for Ichimoku {
    fn default() -> Self {
        Self::new(Period::new_const(9), Period::new_const(26), Period::new_const(52))
    }
}

impl Indicator for Ichimoku {
    type Output = IchimokuValue;

    const NAME: &'static str = "ICHIMOKU";
    const SHORT_NAME: &'static str = "ICHI";
    const SERIES: SeriesClass = SeriesClass::Price;
    const TRANSFORM: TransformKind = TransformKind::Windowed;

    fn calc<T: OHLCV>(&self, bars: &[T]) -> Vec<IchimokuValue> {
        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let tenkan = midpoint(bars, i, self.tenkan.get());
                let kijun = midpoint(bars, i, self.kijun.get());
                IchimokuValue {
                    tenkan,
                    kijun,
                    span_a: tenkan.zip(kijun).map(|(t, k)| (t + k) / 2.0),
                    span_b: midpoint(bars, i, self.senkou.get()),
                    chikou: Some(bar.close()),
                }
            })
            .collect()
    }
}
