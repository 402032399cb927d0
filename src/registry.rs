//! Indicator registration and per-chart indicator instances
//!
//! [`IndicatorRegistry`] holds one [`IndicatorTemplate`] per name. Registering
//! a name twice is a no-op: the first definition wins and the attempt is
//! logged. [`ChartSession`] owns the bar sequence and the live instances; a
//! parameter change or a data update recomputes from index 0, a style change
//! never does.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::indicators::{IndicatorRecord, OutputRecord, SeriesClass, TransformKind};
use crate::indicators::{
    Adx, Bollinger, Donchian, Ichimoku, Macd, ParabolicSar, Roc, Sma, Stochastic, Supertrend, Wma,
};
use crate::params::{defaults, validate_params, ParamMeta, ParameterizedIndicator};
use crate::{Bar, ChartError, Result};

/// Type-erased indicator computation: `(bars, params) -> one record per bar`.
pub type CalcFn = fn(&[Bar], &[f64]) -> Vec<OutputRecord>;

// ============================================================
// TEMPLATES
// ============================================================

/// Everything the rendering collaborator needs to register an indicator.
#[derive(Debug, Clone)]
pub struct IndicatorTemplate {
    pub name: &'static str,
    pub short_name: &'static str,
    pub series: SeriesClass,
    pub transform: TransformKind,
    pub default_params: Vec<f64>,
    pub fields: &'static [&'static str],
    pub param_meta: &'static [ParamMeta],
    pub calc: CalcFn,
}

impl IndicatorTemplate {
    pub fn of<I: ParameterizedIndicator>() -> Self {
        Self {
            name: I::NAME,
            short_name: I::SHORT_NAME,
            series: I::SERIES,
            transform: I::TRANSFORM,
            default_params: defaults(I::param_meta()),
            fields: <I::Output as IndicatorRecord>::FIELDS,
            param_meta: I::param_meta(),
            calc: calc_erased::<I>,
        }
    }

    /// Run the computation. Always returns `bars.len()` records.
    pub fn compute(&self, bars: &[Bar], params: &[f64]) -> Vec<OutputRecord> {
        (self.calc)(bars, params)
    }

    pub fn validate_params(&self, params: &[f64]) -> Result<()> {
        validate_params(self.param_meta, params)
    }

    fn same_definition(&self, other: &IndicatorTemplate) -> bool {
        self.short_name == other.short_name
            && self.series == other.series
            && self.transform == other.transform
            && self.default_params == other.default_params
            && self.fields == other.fields
    }
}

fn calc_erased<I: ParameterizedIndicator>(bars: &[Bar], params: &[f64]) -> Vec<OutputRecord> {
    match I::from_params(params) {
        Some(indicator) => indicator
            .calc(bars)
            .iter()
            .map(OutputRecord::from_record)
            .collect(),
        None => vec![OutputRecord::absent(<I::Output as IndicatorRecord>::FIELDS.len()); bars.len()],
    }
}

// ============================================================
// REGISTRY
// ============================================================

#[derive(Debug, Clone, Default)]
pub struct IndicatorRegistry {
    templates: HashMap<&'static str, IndicatorTemplate>,
}

impl IndicatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with every builtin indicator.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(IndicatorTemplate::of::<Sma>());
        registry.register(IndicatorTemplate::of::<Wma>());
        registry.register(IndicatorTemplate::of::<Macd>());
        registry.register(IndicatorTemplate::of::<Roc>());
        registry.register(IndicatorTemplate::of::<Stochastic>());
        registry.register(IndicatorTemplate::of::<Adx>());
        registry.register(IndicatorTemplate::of::<Bollinger>());
        registry.register(IndicatorTemplate::of::<Donchian>());
        registry.register(IndicatorTemplate::of::<Ichimoku>());
        registry.register(IndicatorTemplate::of::<ParabolicSar>());
        registry.register(IndicatorTemplate::of::<Supertrend>());
        registry
    }

    /// Register `template` unless its name is taken.
    ///
    /// Returns `true` if the template was added. An existing entry is never
    /// replaced.
    pub fn register(&mut self, template: IndicatorTemplate) -> bool {
        if let Some(existing) = self.templates.get(template.name) {
            if existing.same_definition(&template) {
                debug!(indicator = template.name, "indicator already registered, skipping");
            } else {
                warn!(
                    indicator = template.name,
                    existing = existing.short_name,
                    incoming = template.short_name,
                    "conflicting indicator registration ignored"
                );
            }
            return false;
        }
        self.templates.insert(template.name, template);
        true
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorTemplate> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.templates.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

// ============================================================
// SESSION
// ============================================================

/// Handle to an indicator instance inside a [`ChartSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndicatorId(pub u64);

/// Cosmetic settings; never reach `calc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSpec {
    pub color: Option<String>,
    pub line_width: f64,
    pub visible: bool,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            color: None,
            line_width: 1.0,
            visible: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorInstance {
    pub id: IndicatorId,
    pub name: &'static str,
    pub params: Vec<f64>,
    pub style: StyleSpec,
    pub output: Vec<OutputRecord>,
}

/// Bar sequence plus its indicator instances
#[derive(Debug, Clone)]
pub struct ChartSession {
    registry: IndicatorRegistry,
    bars: Vec<Bar>,
    instances: BTreeMap<IndicatorId, IndicatorInstance>,
    next_id: u64,
    calc_count: u64,
}

impl Default for ChartSession {
    fn default() -> Self {
        Self::new(IndicatorRegistry::with_builtins())
    }
}

impl ChartSession {
    pub fn new(registry: IndicatorRegistry) -> Self {
        Self {
            registry,
            bars: Vec::new(),
            instances: BTreeMap::new(),
            next_id: 1,
            calc_count: 0,
        }
    }

    pub fn registry(&self) -> &IndicatorRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut IndicatorRegistry {
        &mut self.registry
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Replace the bar sequence and recompute every instance.
    ///
    /// Timestamps must be strictly increasing; on error the session is left
    /// unchanged. Bar contents are not checked, indicators tolerate any values.
    pub fn set_bars(&mut self, bars: Vec<Bar>) -> Result<()> {
        if let Some(i) = bars.windows(2).position(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(ChartError::NonMonotonicTimestamp { index: i + 1 });
        }
        self.bars = bars;
        let ids: Vec<IndicatorId> = self.instances.keys().copied().collect();
        for id in ids {
            self.recompute(id)?;
        }
        Ok(())
    }

    /// New instance with the template's default parameters.
    pub fn create_indicator(&mut self, name: &str) -> Result<IndicatorId> {
        let params = self.template(name)?.default_params.clone();
        self.create_indicator_with(name, params, StyleSpec::default())
    }

    pub fn create_indicator_with(
        &mut self,
        name: &str,
        params: Vec<f64>,
        style: StyleSpec,
    ) -> Result<IndicatorId> {
        let template = self.template(name)?;
        template.validate_params(&params)?;
        let name = template.name;

        let id = IndicatorId(self.next_id);
        self.next_id += 1;
        self.instances.insert(
            id,
            IndicatorInstance {
                id,
                name,
                params,
                style,
                output: Vec::new(),
            },
        );
        self.recompute(id)?;
        Ok(id)
    }

    /// Replace parameters and recompute.
    pub fn override_params(&mut self, id: IndicatorId, params: Vec<f64>) -> Result<()> {
        let name = self.instance_ref(id)?.name;
        self.template(name)?.validate_params(&params)?;
        self.instance_mut(id)?.params = params;
        self.recompute(id)
    }

    /// Replace styling only; output is left untouched.
    pub fn override_style(&mut self, id: IndicatorId, style: StyleSpec) -> Result<()> {
        let instance = self.instance_mut(id)?;
        trace!(indicator = instance.name, id = id.0, "style updated");
        instance.style = style;
        Ok(())
    }

    pub fn remove_indicator(&mut self, id: IndicatorId) -> Result<IndicatorInstance> {
        self.instances
            .remove(&id)
            .ok_or(ChartError::UnknownInstance(id.0))
    }

    pub fn instance(&self, id: IndicatorId) -> Option<&IndicatorInstance> {
        self.instances.get(&id)
    }

    pub fn output(&self, id: IndicatorId) -> Option<&[OutputRecord]> {
        self.instances.get(&id).map(|i| i.output.as_slice())
    }

    /// Instances in creation order.
    pub fn instances(&self) -> impl Iterator<Item = &IndicatorInstance> {
        self.instances.values()
    }

    /// Number of `calc` invocations so far.
    pub fn calc_count(&self) -> u64 {
        self.calc_count
    }

    fn template(&self, name: &str) -> Result<&IndicatorTemplate> {
        self.registry
            .get(name)
            .ok_or_else(|| ChartError::UnknownIndicator(name.to_string()))
    }

    fn instance_ref(&self, id: IndicatorId) -> Result<&IndicatorInstance> {
        self.instances.get(&id).ok_or(ChartError::UnknownInstance(id.0))
    }

    fn instance_mut(&mut self, id: IndicatorId) -> Result<&mut IndicatorInstance> {
        self.instances
            .get_mut(&id)
            .ok_or(ChartError::UnknownInstance(id.0))
    }

    fn recompute(&mut self, id: IndicatorId) -> Result<()> {
        let instance = self
            .instances
            .get_mut(&id)
            .ok_or(ChartError::UnknownInstance(id.0))?;
        let template = self
            .registry
            .get(instance.name)
            .ok_or_else(|| ChartError::UnknownIndicator(instance.name.to_string()))?;

        instance.output = template.compute(&self.bars, &instance.params);
        self.calc_count += 1;
        debug!(
            indicator = instance.name,
            id = id.0,
            bars = self.bars.len(),
            "indicator recomputed"
        );
        Ok(())
    }
}
