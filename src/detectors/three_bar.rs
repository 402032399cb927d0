//! Three-bar candlestick rules
//!
//! Morning/Evening Star (+Doji variants), Three White Soldiers / Black Crows,
//! Three Inside/Outside Up/Down, Abandoned Baby, Stick Sandwich, Tasuki Gaps
//! and Unique Three River.

use super::helpers::{
    body_gap_down, body_gap_up, gap_down, gap_up, near, window, CandleShape, LONG_SHADOW_RATIO,
};
use crate::{candle_match, Direction, PatternDetector, PatternId, PatternMatch};

// ============================================================
// STARS
// ============================================================

/// Morning Star - long black, small body gapping down, white closing into the first body
#[derive(Debug, Clone, Copy, Default)]
pub struct MorningStarDetector;

impl PatternDetector for MorningStarDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::MORNING_STAR, PatternId::MORNING_DOJI_STAR]
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [first, star, last] = window::<3>(shapes, index)?;
        if !(first.is_bearish()
            && first.is_large_body()
            && star.is_small_body()
            && body_gap_down(first, star)
            && last.is_bullish()
            && last.close > first.body_mid())
        {
            return None;
        }
        let id = if star.is_doji() {
            PatternId::MORNING_DOJI_STAR
        } else {
            PatternId::MORNING_STAR
        };
        candle_match(id, Direction::Bullish, shapes, index)
    }
}

/// Evening Star - long white, small body gapping up, black closing into the first body
#[derive(Debug, Clone, Copy, Default)]
pub struct EveningStarDetector;

impl PatternDetector for EveningStarDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::EVENING_STAR, PatternId::EVENING_DOJI_STAR]
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [first, star, last] = window::<3>(shapes, index)?;
        if !(first.is_bullish()
            && first.is_large_body()
            && star.is_small_body()
            && body_gap_up(first, star)
            && last.is_bearish()
            && last.close < first.body_mid())
        {
            return None;
        }
        let id = if star.is_doji() {
            PatternId::EVENING_DOJI_STAR
        } else {
            PatternId::EVENING_STAR
        };
        candle_match(id, Direction::Bearish, shapes, index)
    }
}

// ============================================================
// SOLDIERS / CROWS
// ============================================================

/// Three White Soldiers - three long white bodies, each opening inside the previous
/// body and closing higher
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeWhiteSoldiersDetector;

impl PatternDetector for ThreeWhiteSoldiersDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::THREE_WHITE_SOLDIERS]
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let bars = window::<3>(shapes, index)?;
        if !bars.iter().all(|b| b.is_bullish() && b.is_large_body()) {
            return None;
        }
        let advancing = bars.windows(2).all(|w| {
            let (prev, curr) = (w[0], w[1]);
            curr.close > prev.close && curr.open >= prev.open && curr.open <= prev.close
        });
        if !advancing {
            return None;
        }
        candle_match(PatternId::THREE_WHITE_SOLDIERS, Direction::Bullish, shapes, index)
    }
}

/// Three Black Crows - three long black bodies, each opening inside the previous
/// body and closing lower
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeBlackCrowsDetector;

impl PatternDetector for ThreeBlackCrowsDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::THREE_BLACK_CROWS]
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let bars = window::<3>(shapes, index)?;
        if !bars.iter().all(|b| b.is_bearish() && b.is_large_body()) {
            return None;
        }
        let declining = bars.windows(2).all(|w| {
            let (prev, curr) = (w[0], w[1]);
            curr.close < prev.close && curr.open <= prev.open && curr.open >= prev.close
        });
        if !declining {
            return None;
        }
        candle_match(PatternId::THREE_BLACK_CROWS, Direction::Bearish, shapes, index)
    }
}

// ============================================================
// THREE INSIDE / OUTSIDE
// ============================================================

/// Three Inside Up/Down - harami confirmed by a third bar closing beyond the first open
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeInsideDetector;

impl PatternDetector for ThreeInsideDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::THREE_INSIDE_UP, PatternId::THREE_INSIDE_DOWN]
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [first, second, third] = window::<3>(shapes, index)?;
        if !first.is_large_body() || !second.body_inside(first) || second.body >= first.body {
            return None;
        }
        if first.is_bearish()
            && second.is_bullish()
            && third.is_bullish()
            && third.close > first.open
        {
            return candle_match(PatternId::THREE_INSIDE_UP, Direction::Bullish, shapes, index);
        }
        if first.is_bullish()
            && second.is_bearish()
            && third.is_bearish()
            && third.close < first.open
        {
            return candle_match(PatternId::THREE_INSIDE_DOWN, Direction::Bearish, shapes, index);
        }
        None
    }
}

/// Three Outside Up/Down - engulfing confirmed by a third bar closing beyond the second
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeOutsideDetector;

impl PatternDetector for ThreeOutsideDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::THREE_OUTSIDE_UP, PatternId::THREE_OUTSIDE_DOWN]
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [first, second, third] = window::<3>(shapes, index)?;
        if second.body <= first.body {
            return None;
        }
        if first.is_bearish()
            && second.is_bullish()
            && second.open <= first.close
            && second.close >= first.open
            && third.is_bullish()
            && third.close > second.close
        {
            return candle_match(PatternId::THREE_OUTSIDE_UP, Direction::Bullish, shapes, index);
        }
        if first.is_bullish()
            && second.is_bearish()
            && second.open >= first.close
            && second.close <= first.open
            && third.is_bearish()
            && third.close < second.close
        {
            return candle_match(PatternId::THREE_OUTSIDE_DOWN, Direction::Bearish, shapes, index);
        }
        None
    }
}

// ============================================================
// GAP PATTERNS
// ============================================================

/// Abandoned Baby - doji isolated by whole-bar gaps on both sides
#[derive(Debug, Clone, Copy, Default)]
pub struct AbandonedBabyDetector;

impl PatternDetector for AbandonedBabyDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[
            PatternId::BULLISH_ABANDONED_BABY,
            PatternId::BEARISH_ABANDONED_BABY,
        ]
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [first, baby, last] = window::<3>(shapes, index)?;
        if !first.is_large_body() || !baby.is_doji() {
            return None;
        }
        if first.is_bearish() && gap_down(first, baby) && last.is_bullish() && gap_up(baby, last) {
            return candle_match(
                PatternId::BULLISH_ABANDONED_BABY,
                Direction::Bullish,
                shapes,
                index,
            );
        }
        if first.is_bullish() && gap_up(first, baby) && last.is_bearish() && gap_down(baby, last) {
            return candle_match(
                PatternId::BEARISH_ABANDONED_BABY,
                Direction::Bearish,
                shapes,
                index,
            );
        }
        None
    }
}

/// Stick Sandwich - white bar between two black bars closing at the same price
#[derive(Debug, Clone, Copy, Default)]
pub struct StickSandwichDetector;

impl PatternDetector for StickSandwichDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::STICK_SANDWICH]
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [first, middle, last] = window::<3>(shapes, index)?;
        if first.is_bearish()
            && middle.is_bullish()
            && last.is_bearish()
            && middle.low > first.close
            && near(first.close, last.close)
        {
            return candle_match(PatternId::STICK_SANDWICH, Direction::Bullish, shapes, index);
        }
        None
    }
}

/// Upside/Downside Tasuki Gap - gap in trend direction, third bar retraces into
/// the gap without closing it
#[derive(Debug, Clone, Copy, Default)]
pub struct TasukiGapDetector;

impl PatternDetector for TasukiGapDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::UPSIDE_TASUKI_GAP, PatternId::DOWNSIDE_TASUKI_GAP]
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [first, second, third] = window::<3>(shapes, index)?;

        if first.is_bullish()
            && second.is_bullish()
            && gap_up(first, second)
            && third.is_bearish()
            && third.open > second.open
            && third.open < second.close
            && third.close < second.open
            && third.close > first.high
        {
            return candle_match(PatternId::UPSIDE_TASUKI_GAP, Direction::Bullish, shapes, index);
        }

        if first.is_bearish()
            && second.is_bearish()
            && gap_down(first, second)
            && third.is_bullish()
            && third.open < second.open
            && third.open > second.close
            && third.close > second.open
            && third.close < first.low
        {
            return candle_match(PatternId::DOWNSIDE_TASUKI_GAP, Direction::Bearish, shapes, index);
        }

        None
    }
}

/// Unique Three River - long black, black hammer-like bar making a new low,
/// small white bar closing below the second close
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueThreeRiverDetector;

impl PatternDetector for UniqueThreeRiverDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::UNIQUE_THREE_RIVER]
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [first, second, third] = window::<3>(shapes, index)?;
        if first.is_bearish()
            && first.is_large_body()
            && second.is_bearish()
            && second.has_range()
            && second.body_inside(first)
            && second.low < first.low
            && second.lower_shadow >= second.range * LONG_SHADOW_RATIO
            && third.is_bullish()
            && third.is_small_body()
            && third.close < second.close
        {
            return candle_match(PatternId::UNIQUE_THREE_RIVER, Direction::Bullish, shapes, index);
        }
        None
    }
}
