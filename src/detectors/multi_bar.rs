//! Five-bar continuation rules: Rising / Falling Three Methods

use super::helpers::{window, CandleShape};
use crate::{candle_match, Direction, PatternDetector, PatternId, PatternMatch};

/// Rising/Falling Three Methods
///
/// Long bar, three small bodies contained in its range, then a long bar in the
/// original direction closing beyond the first close.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiseFallThreeMethodsDetector;

impl PatternDetector for RiseFallThreeMethodsDetector {
    fn ids(&self) -> &'static [PatternId] {
        &[PatternId::RISING_THREE_METHODS, PatternId::FALLING_THREE_METHODS]
    }

    fn min_bars(&self) -> usize {
        5
    }

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
        let [first, a, b, c, last] = window::<5>(shapes, index)?;
        if !first.is_large_body() || !last.is_large_body() {
            return None;
        }
        let contained = [a, b, c]
            .iter()
            .all(|m| m.is_small_body() && m.high <= first.high && m.low >= first.low);
        if !contained {
            return None;
        }

        if first.is_bullish() && last.is_bullish() && last.close > first.close {
            return candle_match(PatternId::RISING_THREE_METHODS, Direction::Bullish, shapes, index);
        }
        if first.is_bearish() && last.is_bearish() && last.close < first.close {
            return candle_match(
                PatternId::FALLING_THREE_METHODS,
                Direction::Bearish,
                shapes,
                index,
            );
        }
        None
    }
}
