//! Two-bar candlestick rules
//!
//! Engulfing, Harami (+Cross), Piercing Line / Dark Cloud Cover, Tweezers,
//! Meeting Lines, Separating Lines and On-Neck.

use super::helpers::{near, window, CandleShape};
use crate::{candle_match, Direction, PatternDetector, PatternId, PatternMatch};

// ============================================================
// ENGULFING / HARAMI
// ============================================================

/// Engulfing - second body swallows the first, opposite colour
#[derive(Debug, Clone, Copy, Default)]
pub struct EngulfingDetector;

impl PatternDetector for EngulfingDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::BULLISH_ENGULFING, PatternId::BEARISH_ENGULFING]
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [prev, curr] = window::<2>(shapes, index)?;
        if curr.body <= prev.body {
            return None;
        }

        if prev.is_bearish()
            && curr.is_bullish()
            && curr.open <= prev.close
            && curr.close >= prev.open
        {
            return candle_match(PatternId::BULLISH_ENGULFING, Direction::Bullish, shapes, index);
        }

        if prev.is_bullish()
            && curr.is_bearish()
            && curr.open >= prev.close
            && curr.close <= prev.open
        {
            return candle_match(PatternId::BEARISH_ENGULFING, Direction::Bearish, shapes, index);
        }

        None
    }
}

/// Harami - small body held inside a large previous body
///
/// A doji inside the mother bar is reported as Harami Cross instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaramiDetector;

impl PatternDetector for HaramiDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[
            PatternId::BULLISH_HARAMI,
            PatternId::BEARISH_HARAMI,
            PatternId::BULLISH_HARAMI_CROSS,
            PatternId::BEARISH_HARAMI_CROSS,
        ]
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [prev, curr] = window::<2>(shapes, index)?;
        if !prev.is_large_body() || !curr.body_inside(prev) || curr.body >= prev.body {
            return None;
        }

        if curr.is_doji() {
            return if prev.is_bearish() {
                candle_match(PatternId::BULLISH_HARAMI_CROSS, Direction::Bullish, shapes, index)
            } else if prev.is_bullish() {
                candle_match(PatternId::BEARISH_HARAMI_CROSS, Direction::Bearish, shapes, index)
            } else {
                None
            };
        }

        if !curr.is_small_body() {
            return None;
        }
        if prev.is_bearish() && curr.is_bullish() {
            candle_match(PatternId::BULLISH_HARAMI, Direction::Bullish, shapes, index)
        } else if prev.is_bullish() && curr.is_bearish() {
            candle_match(PatternId::BEARISH_HARAMI, Direction::Bearish, shapes, index)
        } else {
            None
        }
    }
}

// ============================================================
// PIERCING / DARK CLOUD
// ============================================================

/// Piercing Line - opens below a long black body, closes past its midpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct PiercingDetector;

impl PatternDetector for PiercingDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::PIERCING_LINE]
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [prev, curr] = window::<2>(shapes, index)?;
        if prev.is_bearish()
            && prev.is_large_body()
            && curr.is_bullish()
            && curr.open < prev.close
            && curr.close > prev.body_mid()
            && curr.close < prev.open
        {
            return candle_match(PatternId::PIERCING_LINE, Direction::Bullish, shapes, index);
        }
        None
    }
}

/// Dark Cloud Cover - opens above a long white body, closes below its midpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct DarkCloudCoverDetector;

impl PatternDetector for DarkCloudCoverDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::DARK_CLOUD_COVER]
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [prev, curr] = window::<2>(shapes, index)?;
        if prev.is_bullish()
            && prev.is_large_body()
            && curr.is_bearish()
            && curr.open > prev.close
            && curr.close < prev.body_mid()
            && curr.close > prev.open
        {
            return candle_match(PatternId::DARK_CLOUD_COVER, Direction::Bearish, shapes, index);
        }
        None
    }
}

// ============================================================
// MATCHING-PRICE PAIRS
// ============================================================

/// Tweezer Top / Bottom - opposite colours sharing the same extreme
#[derive(Debug, Clone, Copy, Default)]
pub struct TweezerDetector;

impl PatternDetector for TweezerDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::TWEEZER_TOP, PatternId::TWEEZER_BOTTOM]
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [prev, curr] = window::<2>(shapes, index)?;
        if prev.is_bullish() && curr.is_bearish() && near(prev.high, curr.high) {
            return candle_match(PatternId::TWEEZER_TOP, Direction::Bearish, shapes, index);
        }
        if prev.is_bearish() && curr.is_bullish() && near(prev.low, curr.low) {
            return candle_match(PatternId::TWEEZER_BOTTOM, Direction::Bullish, shapes, index);
        }
        None
    }
}

/// Meeting Lines - two long opposite bodies closing at the same price
#[derive(Debug, Clone, Copy, Default)]
pub struct MeetingLinesDetector;

impl PatternDetector for MeetingLinesDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::BULLISH_MEETING_LINES, PatternId::BEARISH_MEETING_LINES]
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [prev, curr] = window::<2>(shapes, index)?;
        if !prev.is_large_body() || !curr.is_large_body() || !near(prev.close, curr.close) {
            return None;
        }
        if prev.is_bearish() && curr.is_bullish() {
            candle_match(PatternId::BULLISH_MEETING_LINES, Direction::Bullish, shapes, index)
        } else if prev.is_bullish() && curr.is_bearish() {
            candle_match(PatternId::BEARISH_MEETING_LINES, Direction::Bearish, shapes, index)
        } else {
            None
        }
    }
}

/// Separating Lines - opposite colours opening at the same price, second long
#[derive(Debug, Clone, Copy, Default)]
pub struct SeparatingLinesDetector;

impl PatternDetector for SeparatingLinesDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[
            PatternId::BULLISH_SEPARATING_LINES,
            PatternId::BEARISH_SEPARATING_LINES,
        ]
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [prev, curr] = window::<2>(shapes, index)?;
        if !curr.is_large_body() || !near(prev.open, curr.open) {
            return None;
        }
        if prev.is_bearish() && curr.is_bullish() {
            candle_match(PatternId::BULLISH_SEPARATING_LINES, Direction::Bullish, shapes, index)
        } else if prev.is_bullish() && curr.is_bearish() {
            candle_match(PatternId::BEARISH_SEPARATING_LINES, Direction::Bearish, shapes, index)
        } else {
            None
        }
    }
}

/// On-Neck - white bar opening below a long black bar, closing at its low
#[derive(Debug, Clone, Copy, Default)]
pub struct OnNeckDetector;

impl PatternDetector for OnNeckDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::ON_NECK]
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [prev, curr] = window::<2>(shapes, index)?;
        if prev.is_bearish()
            && prev.is_large_body()
            && curr.is_bullish()
            && curr.open < prev.low
            && near(curr.close, prev.low)
        {
            return candle_match(PatternId::ON_NECK, Direction::Bearish, shapes, index);
        }
        None
    }
}
