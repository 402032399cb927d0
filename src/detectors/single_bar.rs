//! Single-bar candlestick rules
//!
//! Doji family, Hammer / Hanging Man, Inverted Hammer / Shooting Star and
//! Marubozu. Hammer-type shapes are named by the two closes leading into the
//! bar: falling gives the bullish name, rising the bearish one.

use super::helpers::{
    falling_into, CandleShape, LONG_LEG_RATIO, LONG_SHADOW_RATIO, SHORT_SHADOW_RATIO,
    VERY_LONG_SHADOW_RATIO,
};
use crate::{candle_match, Direction, PatternDetector, PatternId, PatternMatch};

// ============================================================
// DOJI FAMILY
// ============================================================

/// Doji - open and close (almost) equal
#[derive(Debug, Clone, Copy, Default)]
pub struct DojiDetector;

impl PatternDetector for DojiDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::DOJI]
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let bar = shapes.get(index)?;
        if !bar.is_doji() {
            return None;
        }
        candle_match(PatternId::DOJI, Direction::Neutral, shapes, index)
    }
}

/// Dragonfly Doji - doji at the top of a long lower shadow
#[derive(Debug, Clone, Copy, Default)]
pub struct DragonflyDojiDetector;

impl PatternDetector for DragonflyDojiDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::DRAGONFLY_DOJI]
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let bar = shapes.get(index)?;
        if !bar.is_doji()
            || bar.upper_shadow > bar.range * SHORT_SHADOW_RATIO
            || bar.lower_shadow < bar.range * VERY_LONG_SHADOW_RATIO
        {
            return None;
        }
        candle_match(PatternId::DRAGONFLY_DOJI, Direction::Bullish, shapes, index)
    }
}

/// Gravestone Doji - doji at the bottom of a long upper shadow
#[derive(Debug, Clone, Copy, Default)]
pub struct GravestoneDojiDetector;

impl PatternDetector for GravestoneDojiDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::GRAVESTONE_DOJI]
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let bar = shapes.get(index)?;
        if !bar.is_doji()
            || bar.lower_shadow > bar.range * SHORT_SHADOW_RATIO
            || bar.upper_shadow < bar.range * VERY_LONG_SHADOW_RATIO
        {
            return None;
        }
        candle_match(PatternId::GRAVESTONE_DOJI, Direction::Bearish, shapes, index)
    }
}

/// Long-Legged Doji - doji with substantial shadows on both sides
#[derive(Debug, Clone, Copy, Default)]
pub struct LongLeggedDojiDetector;

impl PatternDetector for LongLeggedDojiDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::LONG_LEGGED_DOJI]
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let bar = shapes.get(index)?;
        let leg = bar.range * LONG_LEG_RATIO;
        if !bar.is_doji() || bar.upper_shadow < leg || bar.lower_shadow < leg {
            return None;
        }
        candle_match(PatternId::LONG_LEGGED_DOJI, Direction::Neutral, shapes, index)
    }
}

// ============================================================
// HAMMER FAMILY
// ============================================================

/// Hammer (after a decline) / Hanging Man (after an advance)
///
/// Small body on top of a long lower shadow, negligible upper shadow.
#[derive(Debug, Clone, Copy, Default)]
pub struct HammerDetector;

impl PatternDetector for HammerDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::HAMMER, PatternId::HANGING_MAN]
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let bar = shapes.get(index)?;
        if !bar.is_small_body()
            || bar.lower_shadow < bar.range * LONG_SHADOW_RATIO
            || bar.upper_shadow > bar.range * SHORT_SHADOW_RATIO
        {
            return None;
        }
        match falling_into(shapes, index)? {
            true => candle_match(PatternId::HAMMER, Direction::Bullish, shapes, index),
            false => candle_match(PatternId::HANGING_MAN, Direction::Bearish, shapes, index),
        }
    }
}

/// Inverted Hammer (after a decline) / Shooting Star (after an advance)
///
/// Small body below a long upper shadow, negligible lower shadow.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvertedHammerDetector;

impl PatternDetector for InvertedHammerDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::INVERTED_HAMMER, PatternId::SHOOTING_STAR]
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let bar = shapes.get(index)?;
        if !bar.is_small_body()
            || bar.upper_shadow < bar.range * LONG_SHADOW_RATIO
            || bar.lower_shadow > bar.range * SHORT_SHADOW_RATIO
        {
            return None;
        }
        match falling_into(shapes, index)? {
            true => candle_match(PatternId::INVERTED_HAMMER, Direction::Bullish, shapes, index),
            false => candle_match(PatternId::SHOOTING_STAR, Direction::Bearish, shapes, index),
        }
    }
}

// ============================================================
// MARUBOZU
// ============================================================

/// Marubozu - body covers (nearly) the whole range
#[derive(Debug, Clone, Copy, Default)]
pub struct MarubozuDetector;

impl PatternDetector for MarubozuDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::BULLISH_MARUBOZU, PatternId::BEARISH_MARUBOZU]
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let bar = shapes.get(index)?;
        if !bar.is_marubozu() {
            return None;
        }
        if bar.is_bullish() {
            candle_match(PatternId::BULLISH_MARUBOZU, Direction::Bullish, shapes, index)
        } else if bar.is_bearish() {
            candle_match(PatternId::BEARISH_MARUBOZU, Direction::Bearish, shapes, index)
        } else {
            None
        }
    }
}
