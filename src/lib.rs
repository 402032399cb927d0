//! # chartlab - indicator and pattern engine for candlestick charts
//!
//! Deterministic numeric transforms over a bar sequence (moving averages,
//! oscillators, bands, trend-flip state machines) plus three pattern
//! detectors (candlestick rules, chart patterns, harmonic XABCD patterns).
//! Output is shaped for a rendering collaborator: indicators register through
//! [`registry::IndicatorRegistry`], detector matches become
//! [`annotation::Annotation`]s.
//!
//! ## Quick Start
//!
//! ```rust
//! use chartlab::prelude::*;
//!
//! let bars: Vec<Bar> = (0..40)
//!     .map(|i| {
//!         let p = 100.0 + (i as f64 * 0.7).sin() * 5.0;
//!         Bar::new(i, p, p + 1.0, p - 1.0, p + 0.3, 1_000.0)
//!     })
//!     .collect();
//!
//! // Indicators are pure functions of (bars, params)
//! let sma = Sma::new(Period::new(10).unwrap()).calc(&bars);
//! assert_eq!(sma.len(), bars.len());
//!
//! // Pattern detection
//! let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
//! let matches = engine.scan(&bars).unwrap();
//! let annotations = chartlab::annotation::to_annotations(&bars, &matches);
//! assert_eq!(annotations.len(), matches.len());
//! ```

pub mod annotation;
pub mod detectors;
pub mod indicators;
pub mod params;
pub mod registry;

pub mod prelude {
    pub use crate::{
        // Annotations
        annotation::{Annotation, AnnotationMetadata, AnnotationPoint, AnnotationSink},
        // Detectors
        detectors::*,
        // Indicators
        indicators::*,
        // Parameters
        params::{ParamMeta, ParamType, ParameterizedIndicator},
        // Registry
        registry::{ChartSession, IndicatorId, IndicatorRegistry, IndicatorTemplate, StyleSpec},
        // Parallel
        scan_parallel,
        // Types
        Bar,
        CandleDetector,
        ChartError,
        Direction,
        EngineBuilder,
        EngineConfig,
        OHLCVExt,
        PatternDetector,
        PatternEngine,
        PatternId,
        PatternKind,
        PatternMatch,
        PatternPoint,
        Period,
        Result,
        ScanError,
        ScanResult,
        OHLCV,
    };
}

use serde::{Deserialize, Serialize};

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, ChartError>;

/// Errors surfaced at the engine boundary.
///
/// Indicator and detector bodies never produce these for data-shape issues;
/// insufficient data or degenerate divisions yield absent values instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },

    #[error("Timestamp at index {index} is not strictly increasing")]
    NonMonotonicTimestamp { index: usize },

    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("Unknown indicator instance: {0}")]
    UnknownInstance(u64),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Window length (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(ChartError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn timestamp(&self) -> i64;
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;
}

impl<B: OHLCV + ?Sized> OHLCV for &B {
    fn timestamp(&self) -> i64 {
        (**self).timestamp()
    }

    fn open(&self) -> f64 {
        (**self).open()
    }

    fn high(&self) -> f64 {
        (**self).high()
    }

    fn low(&self) -> f64 {
        (**self).low()
    }

    fn close(&self) -> f64 {
        (**self).close()
    }

    fn volume(&self) -> f64 {
        (**self).volume()
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Midpoint of the bar's high/low range.
    #[inline]
    fn median_price(&self) -> f64 {
        (self.high() + self.low()) / 2.0
    }

    /// True range against the previous close, or plain range for the first bar.
    #[inline]
    fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => self
                .range()
                .max((self.high() - pc).abs())
                .max((self.low() - pc).abs()),
            None => self.range(),
        }
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close(), self.volume()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(ChartError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(ChartError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if self.low() > self.open().min(self.close()) {
            return Err(ChartError::InvalidOHLCV {
                index: 0,
                reason: "low above body",
            });
        }
        if self.high() < self.open().max(self.close()) {
            return Err(ChartError::InvalidOHLCV {
                index: 0,
                reason: "high below body",
            });
        }
        if self.volume() < 0.0 {
            return Err(ChartError::InvalidOHLCV {
                index: 0,
                reason: "negative volume",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV + ?Sized> OHLCVExt for T {}

/// Validate a whole bar sequence: every bar consistent, timestamps strictly increasing.
pub fn validate_bars<T: OHLCV>(bars: &[T]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            ChartError::InvalidOHLCV { reason, .. } => ChartError::InvalidOHLCV { index: i, reason },
            other => other,
        })?;
        if i > 0 && bar.timestamp() <= bars[i - 1].timestamp() {
            return Err(ChartError::NonMonotonicTimestamp { index: i });
        }
    }
    Ok(())
}

/// Plain OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OHLCV for Bar {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

// ============================================================
// PATTERN MATCH - result of detection
// ============================================================

/// Which detector family produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Candlestick,
    Chart,
    Harmonic,
}

/// Unique identifier for a pattern type (its display name)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub &'static str);

impl PatternId {
    // Candlestick patterns, in rule-evaluation order
    pub const DOJI: Self = Self("Doji");
    pub const DRAGONFLY_DOJI: Self = Self("Dragonfly Doji");
    pub const GRAVESTONE_DOJI: Self = Self("Gravestone Doji");
    pub const LONG_LEGGED_DOJI: Self = Self("Long-Legged Doji");
    pub const HAMMER: Self = Self("Hammer");
    pub const HANGING_MAN: Self = Self("Hanging Man");
    pub const INVERTED_HAMMER: Self = Self("Inverted Hammer");
    pub const SHOOTING_STAR: Self = Self("Shooting Star");
    pub const BULLISH_MARUBOZU: Self = Self("Bullish Marubozu");
    pub const BEARISH_MARUBOZU: Self = Self("Bearish Marubozu");
    pub const BULLISH_ENGULFING: Self = Self("Bullish Engulfing");
    pub const BEARISH_ENGULFING: Self = Self("Bearish Engulfing");
    pub const BULLISH_HARAMI: Self = Self("Bullish Harami");
    pub const BEARISH_HARAMI: Self = Self("Bearish Harami");
    pub const BULLISH_HARAMI_CROSS: Self = Self("Bullish Harami Cross");
    pub const BEARISH_HARAMI_CROSS: Self = Self("Bearish Harami Cross");
    pub const PIERCING_LINE: Self = Self("Piercing Line");
    pub const DARK_CLOUD_COVER: Self = Self("Dark Cloud Cover");
    pub const TWEEZER_TOP: Self = Self("Tweezer Top");
    pub const TWEEZER_BOTTOM: Self = Self("Tweezer Bottom");
    pub const BULLISH_MEETING_LINES: Self = Self("Bullish Meeting Lines");
    pub const BEARISH_MEETING_LINES: Self = Self("Bearish Meeting Lines");
    pub const BULLISH_SEPARATING_LINES: Self = Self("Bullish Separating Lines");
    pub const BEARISH_SEPARATING_LINES: Self = Self("Bearish Separating Lines");
    pub const ON_NECK: Self = Self("On-Neck");
    pub const MORNING_STAR: Self = Self("Morning Star");
    pub const MORNING_DOJI_STAR: Self = Self("Morning Doji Star");
    pub const EVENING_STAR: Self = Self("Evening Star");
    pub const EVENING_DOJI_STAR: Self = Self("Evening Doji Star");
    pub const THREE_WHITE_SOLDIERS: Self = Self("Three White Soldiers");
    pub const THREE_BLACK_CROWS: Self = Self("Three Black Crows");
    pub const THREE_INSIDE_UP: Self = Self("Three Inside Up");
    pub const THREE_INSIDE_DOWN: Self = Self("Three Inside Down");
    pub const THREE_OUTSIDE_UP: Self = Self("Three Outside Up");
    pub const THREE_OUTSIDE_DOWN: Self = Self("Three Outside Down");
    pub const BULLISH_ABANDONED_BABY: Self = Self("Bullish Abandoned Baby");
    pub const BEARISH_ABANDONED_BABY: Self = Self("Bearish Abandoned Baby");
    pub const STICK_SANDWICH: Self = Self("Stick Sandwich");
    pub const UPSIDE_TASUKI_GAP: Self = Self("Upside Tasuki Gap");
    pub const DOWNSIDE_TASUKI_GAP: Self = Self("Downside Tasuki Gap");
    pub const UNIQUE_THREE_RIVER: Self = Self("Unique Three River");
    pub const RISING_THREE_METHODS: Self = Self("Rising Three Methods");
    pub const FALLING_THREE_METHODS: Self = Self("Falling Three Methods");

    // Chart patterns
    pub const HEAD_AND_SHOULDERS: Self = Self("Head and Shoulders");
    pub const INVERSE_HEAD_AND_SHOULDERS: Self = Self("Inverse Head and Shoulders");
    pub const DOUBLE_TOP: Self = Self("Double Top");
    pub const DOUBLE_BOTTOM: Self = Self("Double Bottom");
    pub const TRIPLE_TOP: Self = Self("Triple Top");
    pub const TRIPLE_BOTTOM: Self = Self("Triple Bottom");
    pub const RISING_WEDGE: Self = Self("Rising Wedge");
    pub const FALLING_WEDGE: Self = Self("Falling Wedge");

    // Harmonic patterns
    pub const GARTLEY: Self = Self("Gartley");
    pub const BUTTERFLY: Self = Self("Butterfly");
    pub const BAT: Self = Self("Bat");
    pub const CRAB: Self = Self("Crab");
    pub const SHARK: Self = Self("Shark");
    pub const CYPHER: Self = Self("Cypher");

    /// Returns the string identifier
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for PatternId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for PatternId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

/// Direction/bias of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

/// One vertex of a detected pattern: an index into the bar sequence and a price
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatternPoint {
    pub index: usize,
    pub value: f64,
}

impl PatternPoint {
    #[inline]
    pub fn new(index: usize, value: f64) -> Self {
        Self { index, value }
    }
}

/// Result of pattern detection
///
/// Candlestick matches carry a single point; chart and harmonic matches carry
/// the ordered vertices defining the pattern's shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    pub pattern_id: PatternId,
    pub kind: PatternKind,
    pub direction: Direction,
    pub points: Vec<PatternPoint>,
}

impl PatternMatch {
    /// Index of the last (most recent) vertex.
    pub fn end_index(&self) -> Option<usize> {
        self.points.iter().map(|p| p.index).max()
    }

    /// Index of the first (oldest) vertex.
    pub fn start_index(&self) -> Option<usize> {
        self.points.iter().map(|p| p.index).min()
    }
}

// ============================================================
// PATTERN DETECTOR TRAITS
// ============================================================

use detectors::helpers::CandleShape;

/// Candlestick rule over precomputed per-bar shapes.
///
/// `detect` is called for every index the engine evaluates; implementations
/// must return `None` (never panic) when the lookback window is not available.
pub trait PatternDetector: Send + Sync {
    /// Every pattern id this detector can emit.
    fn ids(&self) -> &'static [PatternId];

    /// Bars needed ending at the evaluated index.
    fn min_bars(&self) -> usize;

    fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch>;
}

/// Build a single-point candlestick match anchored at `index`.
///
/// Bullish signals sit on the bar's low, everything else on its high.
pub(crate) fn candle_match(
    id: PatternId,
    direction: Direction,
    shapes: &[CandleShape],
    index: usize,
) -> Option<PatternMatch> {
    let shape = shapes.get(index)?;
    let value = if direction.is_bullish() {
        shape.low
    } else {
        shape.high
    };
    Some(PatternMatch {
        pattern_id: id,
        kind: PatternKind::Candlestick,
        direction,
        points: vec![PatternPoint::new(index, value)],
    })
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate CandleDetector enum without boilerplate
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin candlestick detectors - fast path via enum dispatch
        #[derive(Debug, Clone)]
        pub enum CandleDetector {
            $($variant($detector)),*
        }

        impl CandleDetector {
            #[inline]
            pub fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
                match self {
                    $(Self::$variant(d) => PatternDetector::detect(d, shapes, index)),*
                }
            }

            #[inline]
            pub fn ids(&self) -> &'static [PatternId] {
                match self {
                    $(Self::$variant(d) => PatternDetector::ids(d)),*
                }
            }

            #[inline]
            pub fn min_bars(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::min_bars(d)),*
                }
            }

            /// Every builtin detector in rule-evaluation order.
            pub fn all() -> Vec<CandleDetector> {
                vec![$(Self::$variant(<$detector>::default())),*]
            }
        }
    };
}

// Declaration order is the rule-evaluation order
define_builtin_detectors! {
    // Single bar
    Doji(DojiDetector),
    DragonflyDoji(DragonflyDojiDetector),
    GravestoneDoji(GravestoneDojiDetector),
    LongLeggedDoji(LongLeggedDojiDetector),
    Hammer(HammerDetector),
    InvertedHammer(InvertedHammerDetector),
    Marubozu(MarubozuDetector),

    // Two bar
    Engulfing(EngulfingDetector),
    Harami(HaramiDetector),
    Piercing(PiercingDetector),
    DarkCloudCover(DarkCloudCoverDetector),
    Tweezer(TweezerDetector),
    MeetingLines(MeetingLinesDetector),
    SeparatingLines(SeparatingLinesDetector),
    OnNeck(OnNeckDetector),

    // Three bar
    MorningStar(MorningStarDetector),
    EveningStar(EveningStarDetector),
    ThreeWhiteSoldiers(ThreeWhiteSoldiersDetector),
    ThreeBlackCrows(ThreeBlackCrowsDetector),
    ThreeInside(ThreeInsideDetector),
    ThreeOutside(ThreeOutsideDetector),
    AbandonedBaby(AbandonedBabyDetector),
    StickSandwich(StickSandwichDetector),
    TasukiGap(TasukiGapDetector),
    UniqueThreeRiver(UniqueThreeRiverDetector),

    // Multi-bar
    RiseFallThreeMethods(RiseFallThreeMethodsDetector),
}

// ============================================================
// PATTERN ENGINE
// ============================================================

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub candlesticks: bool,
    pub chart_patterns: bool,
    pub harmonics: bool,
    pub validate_data: bool,
    /// Keep only these pattern names
    pub pattern_filter: Option<Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            candlesticks: true,
            chart_patterns: true,
            harmonics: true,
            validate_data: false,
            pattern_filter: None,
        }
    }
}

/// Main pattern detection engine
pub struct PatternEngine {
    builtin: Vec<CandleDetector>,
    custom: Vec<Box<dyn PatternDetector>>,
    config: EngineConfig,
}

impl PatternEngine {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Precompute candle primitives for all bars.
    #[inline]
    pub fn compute_shapes<T: OHLCV>(&self, bars: &[T]) -> Vec<CandleShape> {
        bars.iter().map(CandleShape::of).collect()
    }

    /// Candlestick matches at a single bar index, in rule-evaluation order.
    pub fn scan_at(&self, shapes: &[CandleShape], index: usize) -> Vec<PatternMatch> {
        let mut results = Vec::new();
        if index < CANDLE_FIRST_INDEX || index >= shapes.len() {
            return results;
        }

        // Fast path: builtin detectors (enum dispatch, no vtable)
        for detector in &self.builtin {
            if index + 1 >= detector.min_bars() {
                if let Some(m) = detector.detect(shapes, index) {
                    if self.should_include(&m) {
                        results.push(m);
                    }
                }
            }
        }

        // Slow path: custom detectors (vtable)
        for detector in &self.custom {
            if index + 1 >= detector.min_bars() {
                if let Some(m) = detector.detect(shapes, index) {
                    if self.should_include(&m) {
                        results.push(m);
                    }
                }
            }
        }

        results
    }

    /// Candlestick matches grouped by bar index.
    pub fn scan_candles_grouped<T: OHLCV>(&self, bars: &[T]) -> Vec<Vec<PatternMatch>> {
        let shapes = self.compute_shapes(bars);
        (0..bars.len()).map(|i| self.scan_at(&shapes, i)).collect()
    }

    /// Run every enabled detector over the full bar sequence.
    ///
    /// Output order: candlestick matches by index, then chart patterns, then
    /// harmonic patterns.
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<PatternMatch>> {
        if self.config.validate_data {
            validate_bars(bars)?;
        }

        let mut results = Vec::new();

        if self.config.candlesticks {
            let shapes = self.compute_shapes(bars);
            for i in 0..bars.len() {
                results.extend(self.scan_at(&shapes, i));
            }
        }
        let candles = results.len();

        if self.config.chart_patterns {
            results.extend(
                detectors::chart::detect_chart_patterns(bars)
                    .into_iter()
                    .filter(|m| self.should_include(m)),
            );
        }
        let charts = results.len() - candles;

        if self.config.harmonics {
            results.extend(
                detectors::harmonic::detect_harmonic_patterns(bars)
                    .into_iter()
                    .filter(|m| self.should_include(m)),
            );
        }

        tracing::debug!(
            bars = bars.len(),
            candlestick = candles,
            chart = charts,
            harmonic = results.len() - candles - charts,
            "pattern scan complete"
        );

        Ok(results)
    }

    fn should_include(&self, m: &PatternMatch) -> bool {
        match self.config.pattern_filter {
            Some(ref filter) => filter.iter().any(|name| name == m.pattern_id.as_str()),
            None => true,
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(ref filter) = self.config.pattern_filter {
            if filter.is_empty() {
                return Err(ChartError::InvalidConfig(
                    "pattern filter must name at least one pattern".into(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternEngine instances
#[derive(Default)]
pub struct EngineBuilder {
    builtin: Vec<CandleDetector>,
    custom: Vec<Box<dyn PatternDetector>>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a (possibly deserialised) configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Add every builtin candlestick rule in evaluation order
    pub fn with_all_defaults(mut self) -> Self {
        self.builtin = CandleDetector::all();
        self
    }

    /// Add a builtin detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: CandleDetector) -> Self {
        self.builtin.push(detector);
        self
    }

    /// Add a custom detector (slow path)
    pub fn add_custom<D: PatternDetector + 'static>(mut self, detector: D) -> Self {
        self.custom.push(Box::new(detector));
        self
    }

    pub fn candlesticks(mut self, enable: bool) -> Self {
        self.config.candlesticks = enable;
        self
    }

    pub fn chart_patterns(mut self, enable: bool) -> Self {
        self.config.chart_patterns = enable;
        self
    }

    pub fn harmonics(mut self, enable: bool) -> Self {
        self.config.harmonics = enable;
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Filter to specific patterns only
    pub fn only_patterns(mut self, ids: impl IntoIterator<Item = PatternId>) -> Self {
        self.config.pattern_filter = Some(ids.into_iter().map(|id| id.0.to_string()).collect());
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<PatternEngine> {
        let engine = PatternEngine {
            builtin: self.builtin,
            custom: self.custom,
            config: self.config,
        };
        engine.validate()?;
        Ok(engine)
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub patterns: Vec<PatternMatch>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: ChartError,
}

/// Scan independent instruments on the rayon pool.
///
/// Each instrument is still a single, sequential full scan.
pub fn scan_parallel<'a, T, I>(
    engine: &PatternEngine,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .scan(bars)
                .map(|patterns| ScanResult {
                    symbol: symbol.to_string(),
                    patterns,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(t: i64, o: f64, h: f64, l: f64, c: f64) -> Bar {
        Bar::new(t, o, h, l, c, 1000.0)
    }

    fn make_sideways(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| bar(i as i64, 100.0, 102.0, 98.0, 101.0))
            .collect()
    }

    #[test]
    fn test_period_validation() {
        assert!(Period::new(1).is_ok());
        assert!(Period::new(100).is_ok());
        assert!(Period::new(0).is_err());
    }

    #[test]
    fn test_ohlcv_ext() {
        let b = bar(0, 100.0, 110.0, 90.0, 105.0);
        assert_eq!(b.body(), 5.0);
        assert_eq!(b.range(), 20.0);
        assert_eq!(b.upper_shadow(), 5.0);
        assert_eq!(b.lower_shadow(), 10.0);
        assert_eq!(b.median_price(), 100.0);
        assert!(b.is_bullish());
        assert!(!b.is_bearish());
    }

    #[test]
    fn test_true_range_uses_previous_close() {
        let b = bar(1, 100.0, 102.0, 99.0, 101.0);
        assert_eq!(b.true_range(None), 3.0);
        assert_eq!(b.true_range(Some(95.0)), 7.0);
        assert_eq!(b.true_range(Some(110.0)), 11.0);
    }

    #[test]
    fn test_validate_bars() {
        let bars = make_sideways(5);
        assert!(validate_bars(&bars).is_ok());

        let mut broken = bars.clone();
        broken[3].low = 101.5;
        assert_eq!(
            validate_bars(&broken),
            Err(ChartError::InvalidOHLCV {
                index: 3,
                reason: "low above body"
            })
        );

        let mut unordered = bars;
        unordered[2].timestamp = 1;
        assert_eq!(
            validate_bars(&unordered),
            Err(ChartError::NonMonotonicTimestamp { index: 2 })
        );
    }

    #[test]
    fn test_engine_builder() {
        let engine = EngineBuilder::new().with_all_defaults().build();
        assert!(engine.is_ok());
    }

    #[test]
    fn test_empty_filter_rejected() {
        let engine = EngineBuilder::new()
            .only_patterns(Vec::<PatternId>::new())
            .build();
        assert!(matches!(engine, Err(ChartError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_scan() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let bars: Vec<Bar> = vec![];
        let patterns = engine.scan(&bars).unwrap();
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_doji_not_evaluated_before_index_two() {
        let engine = EngineBuilder::new()
            .add(CandleDetector::Doji(DojiDetector))
            .build()
            .unwrap();

        let bars: Vec<Bar> = (0..3)
            .map(|i| bar(i, 100.0, 102.0, 98.0, 100.0))
            .collect();
        let grouped = engine.scan_candles_grouped(&bars);
        assert!(grouped[0].is_empty());
        assert!(grouped[1].is_empty());
        assert_eq!(grouped[2][0].pattern_id, PatternId::DOJI);
    }

    #[test]
    fn test_pattern_filter() {
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .only_patterns([PatternId::BULLISH_MARUBOZU])
            .build()
            .unwrap();

        let bars: Vec<Bar> = (0..3)
            .map(|i| bar(i, 100.0, 102.0, 98.0, 100.0))
            .collect();
        let patterns = engine.scan(&bars).unwrap();
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_validate_data_rejects_bad_bars() {
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .validate_data(true)
            .build()
            .unwrap();

        let mut bars = make_sideways(4);
        bars[1].high = f64::NAN;
        assert!(matches!(
            engine.scan(&bars),
            Err(ChartError::InvalidOHLCV { index: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_bars_do_not_crash_without_validation() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let bars = vec![
            bar(0, 100.0, 90.0, 110.0, 100.0),
            bar(1, f64::NAN, 1.0, 2.0, 3.0),
            bar(2, 100.0, 100.0, 100.0, 100.0),
            bar(3, -5.0, -10.0, 10.0, 0.0),
            bar(4, 100.0, 90.0, 110.0, 100.0),
        ];
        assert!(engine.scan(&bars).is_ok());
    }

    struct AlwaysDetector;

    impl PatternDetector for AlwaysDetector {
        fn ids(&self) -> &'static [PatternId] {
            &[PatternId("Always")]
        }

        fn min_bars(&self) -> usize {
            1
        }

        fn detect(&self, shapes: &[CandleShape], index: usize) -> Option<PatternMatch> {
            candle_match(PatternId("Always"), Direction::Neutral, shapes, index)
        }
    }

    #[test]
    fn test_custom_detector_runs_after_builtins() {
        let engine = EngineBuilder::new()
            .add(CandleDetector::Doji(DojiDetector))
            .add_custom(AlwaysDetector)
            .build()
            .unwrap();

        let bars: Vec<Bar> = (0..3)
            .map(|i| bar(i, 100.0, 102.0, 98.0, 100.0))
            .collect();
        let shapes = engine.compute_shapes(&bars);
        let ids: Vec<_> = engine
            .scan_at(&shapes, 2)
            .into_iter()
            .map(|m| m.pattern_id)
            .collect();
        assert_eq!(ids, vec![PatternId::DOJI, PatternId("Always")]);
    }

    #[test]
    fn test_engine_config_from_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "harmonics": false, "pattern_filter": ["Doji"] }"#).unwrap();
        assert!(config.candlesticks);
        assert!(config.chart_patterns);
        assert!(!config.harmonics);

        let engine = EngineBuilder::from_config(config)
            .with_all_defaults()
            .build()
            .unwrap();
        assert!(!engine.config().harmonics);
    }

    #[test]
    fn test_parallel_scan_matches_sequential() {
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .validate_data(true)
            .build()
            .unwrap();

        let bars1 = make_sideways(30);
        let bars2: Vec<Bar> = (0..30)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.8).sin() * 6.0;
                bar(i, base, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect();
        let mut broken = make_sideways(10);
        broken[4].high = broken[4].low - 1.0;

        let instruments: Vec<(&str, &[Bar])> =
            vec![("AAPL", &bars1), ("GOOGL", &bars2), ("BROKEN", &broken)];

        let (results, errors) = scan_parallel(&engine, instruments);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].symbol, "AAPL");
        assert_eq!(results[0].patterns, engine.scan(&bars1).unwrap());
        assert_eq!(results[1].symbol, "GOOGL");
        assert_eq!(results[1].patterns, engine.scan(&bars2).unwrap());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].symbol, "BROKEN");
        assert!(matches!(errors[0].error, ChartError::InvalidOHLCV { index: 4, .. }));
    }

    #[test]
    fn test_builtin_ids_unique_and_in_rule_order() {
        let ids: Vec<PatternId> = CandleDetector::all()
            .iter()
            .flat_map(|d| d.ids().iter().copied())
            .collect();
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());

        assert_eq!(ids.len(), 43);
        assert_eq!(ids[0], PatternId::DOJI);
        assert_eq!(ids[4], PatternId::HAMMER);
        assert_eq!(ids[10], PatternId::BULLISH_ENGULFING);
        assert_eq!(ids[25], PatternId::MORNING_STAR);
        assert_eq!(ids[42], PatternId::FALLING_THREE_METHODS);

        for d in CandleDetector::all() {
            assert!((1..=5).contains(&d.min_bars()));
        }
    }

    #[test]
    fn test_pattern_match_serializes_for_renderer() {
        let m = PatternMatch {
            pattern_id: PatternId::DOUBLE_TOP,
            kind: PatternKind::Chart,
            direction: Direction::Bearish,
            points: vec![PatternPoint::new(3, 110.0)],
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["pattern_id"], "Double Top");
        assert_eq!(json["kind"], "chart");
        assert_eq!(json["direction"], "bearish");
        assert_eq!(json["points"][0]["index"], 3);
    }
}
