//! Parameter metadata for indicators
//!
//! Parameters travel as an ordered `&[f64]` tuple (e.g. `[fast, slow, signal]`).
//! [`ParamMeta`] describes each slot for the settings boundary, which validates
//! user input before it reaches the engine. [`ParameterizedIndicator::from_params`]
//! is the engine-side gate: pathological tuples yield `None` and the caller
//! degrades to absent output.
//!
//! # Example
//!
//! ```rust
//! use chartlab::params::ParameterizedIndicator;
//! use chartlab::prelude::*;
//!
//! for param in Macd::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! assert!(Macd::from_params(&[12.0, 26.0, 9.0]).is_some());
//! assert!(Macd::from_params(&[12.0, -1.0, 9.0]).is_none());
//! ```

use crate::indicators::{
  Adx, Bollinger, Donchian, Ichimoku, Indicator, Macd, ParabolicSar, Roc, Sma, Stochastic,
  Supertrend, Wma,
};
use crate::{ChartError, Period, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Window length (positive integer)
  Period,
  /// Positive real factor (band multiplier, SAR step)
  Factor,
}

/// Metadata for a single indicator parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "fast")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Accepted range at the settings boundary: (min, max)
  pub range: (f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  pub const fn factor(
    name: &'static str,
    default: f64,
    range: (f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Factor, default, range, description }
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max) = self.range;
    if !value.is_finite() {
      return Err(ChartError::InvalidValue("parameter must be finite"));
    }
    if value < min || value > max {
      return Err(ChartError::OutOfRange { field: self.name, value, min, max });
    }
    if self.param_type == ParamType::Period && value.fract() != 0.0 {
      return Err(ChartError::InvalidValue("Period must be a positive integer"));
    }
    Ok(())
  }
}

/// Validate a whole parameter tuple against its metadata.
pub fn validate_params(meta: &[ParamMeta], params: &[f64]) -> Result<()> {
  if meta.len() != params.len() {
    return Err(ChartError::InvalidConfig(format!(
      "expected {} parameters, got {}",
      meta.len(),
      params.len()
    )));
  }
  meta.iter().zip(params).try_for_each(|(m, &v)| m.validate(v))
}

/// Default parameter tuple.
pub fn defaults(meta: &[ParamMeta]) -> Vec<f64> {
  meta.iter().map(|m| m.default).collect()
}

// ============================================================
// PARAMETERIZED INDICATOR TRAIT
// ============================================================

/// Indicator constructible from an ordered parameter tuple
pub trait ParameterizedIndicator: Indicator + Sized {
  /// Metadata for every slot, in tuple order
  fn param_meta() -> &'static [ParamMeta];

  /// `None` when a slot is missing, non-finite, or not a usable value.
  fn from_params(params: &[f64]) -> Option<Self>;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Period in slot `idx`: finite, integral and >= 1.
pub fn period_at(params: &[f64], idx: usize) -> Option<Period> {
  let value = *params.get(idx)?;
  if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
    return None;
  }
  Period::new(value as usize).ok()
}

/// Factor in slot `idx`: finite and > 0.
pub fn factor_at(params: &[f64], idx: usize) -> Option<f64> {
  let value = *params.get(idx)?;
  (value.is_finite() && value > 0.0).then_some(value)
}

// ============================================================
// BUILTIN IMPLS
// ============================================================

const PERIOD_RANGE: (f64, f64) = (1.0, 500.0);

impl ParameterizedIndicator for Sma {
  fn param_meta() -> &'static [ParamMeta] {
    const META: &[ParamMeta] = &[ParamMeta::period("period", 20.0, PERIOD_RANGE, "Window length")];
    META
  }

  fn from_params(params: &[f64]) -> Option<Self> {
    Some(Self::new(period_at(params, 0)?))
  }
}

impl ParameterizedIndicator for Wma {
  fn param_meta() -> &'static [ParamMeta] {
    const META: &[ParamMeta] = &[ParamMeta::period("period", 20.0, PERIOD_RANGE, "Window length")];
    META
  }

  fn from_params(params: &[f64]) -> Option<Self> {
    Some(Self::new(period_at(params, 0)?))
  }
}

impl ParameterizedIndicator for Macd {
  fn param_meta() -> &'static [ParamMeta] {
    const META: &[ParamMeta] = &[
      ParamMeta::period("fast", 12.0, PERIOD_RANGE, "Fast EMA length"),
      ParamMeta::period("slow", 26.0, PERIOD_RANGE, "Slow EMA length"),
      ParamMeta::period("signal", 9.0, PERIOD_RANGE, "Signal EMA length"),
    ];
    META
  }

  fn from_params(params: &[f64]) -> Option<Self> {
    Some(Self::new(period_at(params, 0)?, period_at(params, 1)?, period_at(params, 2)?))
  }
}

impl ParameterizedIndicator for Roc {
  fn param_meta() -> &'static [ParamMeta] {
    const META: &[ParamMeta] = &[ParamMeta::period("period", 12.0, PERIOD_RANGE, "Lookback")];
    META
  }

  fn from_params(params: &[f64]) -> Option<Self> {
    Some(Self::new(period_at(params, 0)?))
  }
}

impl ParameterizedIndicator for Stochastic {
  fn param_meta() -> &'static [ParamMeta] {
    const META: &[ParamMeta] = &[
      ParamMeta::period("k", 14.0, PERIOD_RANGE, "%K window"),
      ParamMeta::period("d", 3.0, PERIOD_RANGE, "%D smoothing"),
    ];
    META
  }

  fn from_params(params: &[f64]) -> Option<Self> {
    Some(Self::new(period_at(params, 0)?, period_at(params, 1)?))
  }
}

impl ParameterizedIndicator for Adx {
  fn param_meta() -> &'static [ParamMeta] {
    const META: &[ParamMeta] = &[ParamMeta::period("period", 14.0, PERIOD_RANGE, "DI window")];
    META
  }

  fn from_params(params: &[f64]) -> Option<Self> {
    Some(Self::new(period_at(params, 0)?))
  }
}

impl ParameterizedIndicator for Bollinger {
  fn param_meta() -> &'static [ParamMeta] {
    const META: &[ParamMeta] = &[
      ParamMeta::period("period", 20.0, PERIOD_RANGE, "Window length"),
      ParamMeta::factor("multiplier", 2.0, (0.1, 10.0), "Standard deviations"),
    ];
    META
  }

  fn from_params(params: &[f64]) -> Option<Self> {
    Some(Self::new(period_at(params, 0)?, factor_at(params, 1)?))
  }
}

impl ParameterizedIndicator for Donchian {
  fn param_meta() -> &'static [ParamMeta] {
    const META: &[ParamMeta] = &[ParamMeta::period("period", 20.0, PERIOD_RANGE, "Window length")];
    META
  }

  fn from_params(params: &[f64]) -> Option<Self> {
    Some(Self::new(period_at(params, 0)?))
  }
}

impl ParameterizedIndicator for Ichimoku {
  fn param_meta() -> &'static [ParamMeta] {
    const META: &[ParamMeta] = &[
      ParamMeta::period("tenkan", 9.0, PERIOD_RANGE, "Conversion line window"),
      ParamMeta::period("kijun", 26.0, PERIOD_RANGE, "Base line window"),
      ParamMeta::period("senkou", 52.0, PERIOD_RANGE, "Leading span B window"),
    ];
    META
  }

  fn from_params(params: &[f64]) -> Option<Self> {
    Some(Self::new(period_at(params, 0)?, period_at(params, 1)?, period_at(params, 2)?))
  }
}

impl ParameterizedIndicator for ParabolicSar {
  fn param_meta() -> &'static [ParamMeta] {
    const META: &[ParamMeta] = &[
      ParamMeta::factor("step", 0.02, (0.001, 1.0), "Acceleration step"),
      ParamMeta::factor("max_step", 0.2, (0.001, 1.0), "Acceleration cap"),
    ];
    META
  }

  /// Also rejects `step > max_step`.
  fn from_params(params: &[f64]) -> Option<Self> {
    let step = factor_at(params, 0)?;
    let max_step = factor_at(params, 1)?;
    (step <= max_step).then(|| Self::new(step, max_step))
  }
}

impl ParameterizedIndicator for Supertrend {
  fn param_meta() -> &'static [ParamMeta] {
    const META: &[ParamMeta] = &[
      ParamMeta::period("atr_period", 10.0, PERIOD_RANGE, "ATR length"),
      ParamMeta::factor("multiplier", 3.0, (0.1, 20.0), "ATR multiplier"),
    ];
    META
  }

  fn from_params(params: &[f64]) -> Option<Self> {
    Some(Self::new(period_at(params, 0)?, factor_at(params, 1)?))
  }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_param_meta_period() {
    let meta = ParamMeta::period("test_period", 14.0, (10.0, 20.0), "Test period parameter");

    assert_eq!(meta.name, "test_period");
    assert_eq!(meta.param_type, ParamType::Period);
    assert_eq!(meta.default, 14.0);
  }

  #[test]
  fn test_validate_period() {
    let meta = ParamMeta::period("test", 14.0, (10.0, 20.0), "Test");

    assert!(meta.validate(14.0).is_ok());
    assert!(meta.validate(10.0).is_ok());
    assert!(meta.validate(20.0).is_ok());
    assert!(meta.validate(8.0).is_err());
    assert!(meta.validate(22.0).is_err());
    assert!(meta.validate(14.5).is_err());
    assert!(meta.validate(f64::NAN).is_err());
  }

  #[test]
  fn test_validate_factor() {
    let meta = ParamMeta::factor("test", 2.0, (0.1, 10.0), "Test");

    assert!(meta.validate(2.5).is_ok());
    assert!(matches!(meta.validate(0.0), Err(ChartError::OutOfRange { field: "test", .. })));
  }

  #[test]
  fn test_validate_params_arity() {
    assert!(validate_params(Macd::param_meta(), &[12.0, 26.0, 9.0]).is_ok());
    assert!(matches!(
      validate_params(Macd::param_meta(), &[12.0, 26.0]),
      Err(ChartError::InvalidConfig(_))
    ));
  }

  #[test]
  fn test_period_at_helper() {
    assert_eq!(period_at(&[20.0], 0).map(Period::get), Some(20));
    assert_eq!(period_at(&[20.0], 1), None);
    assert_eq!(period_at(&[0.0], 0), None);
    assert_eq!(period_at(&[-3.0], 0), None);
    assert_eq!(period_at(&[2.5], 0), None);
    assert_eq!(period_at(&[f64::INFINITY], 0), None);
  }

  #[test]
  fn test_factor_at_helper() {
    assert_eq!(factor_at(&[2.0], 0), Some(2.0));
    assert_eq!(factor_at(&[0.0], 0), None);
    assert_eq!(factor_at(&[f64::NAN], 0), None);
  }

  #[test]
  fn test_defaults_round_trip_into_builtins() {
    assert_eq!(Macd::from_params(&defaults(Macd::param_meta())), Some(Macd::default()));
    assert_eq!(
      Supertrend::from_params(&defaults(Supertrend::param_meta())),
      Some(Supertrend::default())
    );
    assert_eq!(ParabolicSar::from_params(&[0.5, 0.2]), None);
  }
}
