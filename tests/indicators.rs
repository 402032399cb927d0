//! Integration tests for indicator computations.

use chartlab::prelude::*;

const EPS: f64 = 1e-9;

fn period(p: usize) -> Period {
    Period::new(p).unwrap()
}

fn constant(n: usize, price: f64) -> Vec<Bar> {
    (0..n)
        .map(|i| Bar::new(i as i64, price, price + 1.0, price - 1.0, price, 1.0))
        .collect()
}

/// Deterministic zig-zag around a slow drift
fn zigzag(n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let base = 100.0 + i as f64 * 0.3 + if i % 4 < 2 { 2.5 } else { -2.5 };
            let close = base + if i % 3 == 0 { 0.8 } else { -0.6 };
            let high = base.max(close) + 1.0 + (i % 5) as f64 * 0.2;
            let low = base.min(close) - 1.0 - (i % 7) as f64 * 0.1;
            Bar::new(i as i64 * 60, base, high, low, close, 500.0)
        })
        .collect()
}

// ============================================================
// MOVING AVERAGES
// ============================================================

#[test]
fn test_constant_series_sma_wma() {
    let bars = constant(30, 42.5);
    for out in [
        Sma::new(period(7)).calc(&bars),
        Wma::new(period(7)).calc(&bars),
    ] {
        assert_eq!(out.len(), bars.len());
        assert!(out[..6].iter().all(Option::is_none));
        for v in out[6..].iter() {
            assert!((v.unwrap() - 42.5).abs() < EPS);
        }
    }
}

#[test]
fn test_wma_weights_newest_bar() {
    let bars: Vec<Bar> = [1.0, 2.0, 3.0]
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(i as i64, c, c, c, c, 0.0))
        .collect();
    let out = Wma::new(period(3)).calc(&bars);
    // (1*1 + 2*2 + 3*3) / 6
    assert!((out[2].unwrap() - 14.0 / 6.0).abs() < EPS);
}

// ============================================================
// OSCILLATORS
// ============================================================

#[test]
fn test_adx_first_defined_at_two_periods() {
    let bars = zigzag(60);
    let p = 7;
    let out = Adx::new(period(p)).calc(&bars);

    assert!(out[..2 * p].iter().all(|v| v.adx.is_none()));
    assert!(out[2 * p].adx.is_some());
    assert!(out[p - 1].plus_di.is_none());
    assert!(out[p].plus_di.is_some());

    for v in &out {
        for di in [v.plus_di, v.minus_di].into_iter().flatten() {
            assert!((0.0..=100.0).contains(&di));
        }
    }
}

#[test]
fn test_macd_histogram_is_difference() {
    let bars = zigzag(80);
    for v in Macd::default().calc(&bars) {
        if let (Some(m), Some(s), Some(h)) = (v.macd, v.signal, v.histogram) {
            assert!((h - (m - s)).abs() < EPS);
        }
    }
}

#[test]
fn test_stochastic_within_bounds() {
    let bars = zigzag(50);
    let out = Stochastic::default().calc(&bars);
    assert!(out[12].k.is_none());
    assert!(out[13].k.is_some());
    assert!(out[14].d.is_none());
    assert!(out[15].d.is_some());
    for v in out.iter().filter_map(|v| v.k) {
        assert!((0.0..=100.0).contains(&v));
    }
}

// ============================================================
// BANDS
// ============================================================

#[test]
fn test_bollinger_band_ordering() {
    let bars = zigzag(60);
    for v in Bollinger::default().calc(&bars) {
        if let (Some(u), Some(m), Some(l)) = (v.upper, v.middle, v.lower) {
            assert!(u >= m && m >= l);
        }
    }
}

#[test]
fn test_donchian_tracks_extremes() {
    let bars = zigzag(30);
    let out = Donchian::new(period(5)).calc(&bars);
    let i = 20;
    let hh = bars[16..=20].iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let ll = bars[16..=20].iter().map(|b| b.low).fold(f64::MAX, f64::min);
    assert_eq!(out[i].upper, Some(hh));
    assert_eq!(out[i].lower, Some(ll));
    assert_eq!(out[i].middle, Some((hh + ll) / 2.0));
}

// ============================================================
// TREND
// ============================================================

#[test]
fn test_psar_defined_from_first_bar() {
    let bars = zigzag(40);
    let out = ParabolicSar::default().calc(&bars);
    assert_eq!(out[0], Some(bars[0].low));
    assert!(out.iter().all(Option::is_some));
}

#[test]
fn test_supertrend_sits_on_band_for_its_direction() {
    let bars = zigzag(60);
    let st = Supertrend::default();
    let out = st.calc(&bars);
    let atr = atr(&bars, 10);

    assert!(out[8].value.is_none());
    for (i, v) in out.iter().enumerate().skip(9) {
        let (value, direction) = (v.value.unwrap(), v.direction.unwrap());
        let mid = (bars[i].high + bars[i].low) / 2.0;
        let offset = st.multiplier * atr[i].unwrap();
        let expected = if direction.is_bullish() { mid - offset } else { mid + offset };
        assert!((value - expected).abs() < EPS);
    }
}

// ============================================================
// BOUNDARIES
// ============================================================

#[test]
fn test_period_longer_than_series_is_all_absent() {
    let bars = zigzag(10);
    let long = period(50);

    assert!(Sma::new(long).calc(&bars).iter().all(Option::is_none));
    assert!(Wma::new(long).calc(&bars).iter().all(Option::is_none));
    assert!(Roc::new(long).calc(&bars).iter().all(Option::is_none));
    assert!(Stochastic::new(long, period(3))
        .calc(&bars)
        .iter()
        .all(|v| v.k.is_none() && v.d.is_none()));
    assert!(Adx::new(long).calc(&bars).iter().all(|v| *v == AdxValue::default()));
    assert!(Bollinger::new(long, 2.0)
        .calc(&bars)
        .iter()
        .all(|v| *v == BandValue::default()));
    assert!(Donchian::new(long).calc(&bars).iter().all(|v| v.upper.is_none()));
    assert!(Supertrend::new(long, 3.0).calc(&bars).iter().all(|v| v.value.is_none()));

    let ichi = Ichimoku::new(long, long, long).calc(&bars);
    assert_eq!(ichi.len(), bars.len());
    assert!(ichi.iter().all(|v| v.tenkan.is_none() && v.span_b.is_none()));
}

#[test]
fn test_empty_series() {
    let bars: Vec<Bar> = Vec::new();
    assert!(Sma::default().calc(&bars).is_empty());
    assert!(ParabolicSar::default().calc(&bars).is_empty());
    assert!(Supertrend::default().calc(&bars).is_empty());
}

#[test]
fn test_every_builtin_is_deterministic_and_aligned() {
    let bars = zigzag(120);
    let registry = IndicatorRegistry::with_builtins();
    for name in registry.names() {
        let template = registry.get(name).unwrap();
        let first = template.compute(&bars, &template.default_params);
        let second = template.compute(&bars, &template.default_params);
        assert_eq!(first.len(), bars.len(), "{name}");
        assert_eq!(first, second, "{name}");
        assert!(first
            .iter()
            .all(|r| r.values.len() == template.fields.len()));
    }
}
