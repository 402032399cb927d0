//! Pattern detectors
//!
//! # Pattern Categories
//!
//! - **Single-bar**: Doji family, Hammer / Hanging Man, Inverted Hammer / Shooting Star, Marubozu
//! - **Two-bar**: Engulfing, Harami (+Cross), Piercing / Dark Cloud, Tweezers, Meeting / Separating Lines, On-Neck
//! - **Three-bar**: Stars, Soldiers / Crows, Three Inside / Outside, Abandoned Baby, Stick Sandwich, Tasuki Gaps, Unique Three River
//! - **Multi-bar**: Rising / Falling Three Methods
//! - **Chart**: Head and Shoulders, Double / Triple Tops and Bottoms, Wedges
//! - **Harmonic**: Gartley, Butterfly, Bat, Crab, Shark, Cypher

pub mod helpers;

pub mod chart;
pub mod harmonic;
pub mod multi_bar;
pub mod single_bar;
pub mod three_bar;
pub mod two_bar;

pub use chart::{detect_chart_patterns, ChartPattern};
pub use harmonic::{
    detect_from_swings, detect_harmonic_patterns, find_swing_points, HarmonicPattern, SwingKind,
    SwingPoint,
};
pub use helpers::*;
pub use multi_bar::*;
pub use single_bar::*;
pub use three_bar::*;
pub use two_bar::*;
