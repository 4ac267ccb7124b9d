//! Heterogeneous receiving-vessel mixes and Monte-Carlo call sequences.
//!
//! A [`StochasticConfig`] names vessel types (volume ranges) and
//! distribution scenarios (probability-weighted shares over the types).
//! [`VesselSampler`] draws sequences of bunkering calls from them with a
//! seeded generator, so a seed always reproduces the same scenario set.

use crate::stats::{mean, std_dev, Summary};
use bunkeropt_core::errors::{BunkerError, BunkerResult};
use indexmap::IndexMap;
use rand::distributions::Uniform;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Shares of a scenario must sum to one within this tolerance.
pub const SHARE_TOLERANCE: f64 = 0.01;

/// Truncated-normal draws give up after this many rejections and clamp.
const MAX_REJECTIONS: usize = 10_000;

/// Bunkering volume range of one vessel category (m³).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselType {
    pub min_volume: f64,
    pub max_volume: f64,
    pub mean_volume: f64,
    #[serde(default)]
    pub std_volume: f64,
}

impl VesselType {
    pub fn new(min_volume: f64, max_volume: f64, mean_volume: f64, std_volume: f64) -> Self {
        Self {
            min_volume,
            max_volume,
            mean_volume,
            std_volume,
        }
    }

    /// Normal draw restricted to `[min, max]` by rejection.
    pub fn sample_truncated_normal<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let Ok(normal) = Normal::new(self.mean_volume, self.std_volume) else {
            return self.mean_volume;
        };
        if self.std_volume == 0.0 {
            return self.mean_volume;
        }
        for _ in 0..MAX_REJECTIONS {
            let value = normal.sample(rng);
            if (self.min_volume..=self.max_volume).contains(&value) {
                return value;
            }
        }
        self.mean_volume.clamp(self.min_volume, self.max_volume)
    }

    pub fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        Uniform::new_inclusive(self.min_volume, self.max_volume).sample(rng)
    }
}

/// Probability-weighted mix of vessel types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionScenario {
    #[serde(default)]
    pub description: String,
    /// Share of calls per vessel type, in draw order.
    pub shares: IndexMap<String, f64>,
    /// Weight of the scenario when scenarios are mixed.
    ///
    /// Default: 1.0
    #[serde(default = "default_probability")]
    pub probability: f64,
}

fn default_probability() -> f64 {
    1.0
}

impl DistributionScenario {
    pub fn new(description: &str, shares: &[(&str, f64)], probability: f64) -> Self {
        Self {
            description: description.to_string(),
            shares: shares.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            probability,
        }
    }

    /// Share-weighted mean of the type mean volumes (m³).
    pub fn weighted_mean_volume(&self, types: &IndexMap<String, VesselType>) -> f64 {
        self.shares
            .iter()
            .filter_map(|(name, share)| types.get(name).map(|t| share * t.mean_volume))
            .sum()
    }

    /// Pick a vessel type by cumulative share for a uniform draw `r`.
    ///
    /// Falls back to the last type when rounding leaves `r` above the total.
    pub fn select_type(&self, r: f64) -> Option<&str> {
        let mut cumulative = 0.0;
        for (name, share) in &self.shares {
            cumulative += share;
            if r <= cumulative {
                return Some(name.as_str());
            }
        }
        self.shares.keys().last().map(String::as_str)
    }
}

/// How a call volume is drawn once its vessel type is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SamplingMethod {
    /// Every call takes its type's mean volume.
    #[default]
    #[serde(rename = "discrete")]
    Discrete,
    #[serde(rename = "continuous:truncated_normal")]
    TruncatedNormal,
    #[serde(rename = "continuous:uniform")]
    Uniform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParameters {
    /// Default: `discrete`
    pub method: SamplingMethod,
    /// Monte-Carlo scenarios per candidate.
    ///
    /// Default: 100
    pub n_monte_carlo: usize,
    /// Default: 42
    pub random_seed: u64,
    /// Bunkering calls drawn per scenario.
    ///
    /// Default: 600
    pub calls_per_scenario: usize,
}

impl Default for SamplingParameters {
    fn default() -> Self {
        Self {
            method: SamplingMethod::Discrete,
            n_monte_carlo: 100,
            random_seed: 42,
            calls_per_scenario: 600,
        }
    }
}

/// Contents of `stochastic.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticConfig {
    pub vessel_types: IndexMap<String, VesselType>,
    pub distribution_scenarios: IndexMap<String, DistributionScenario>,
    /// Scenario used when a single distribution is requested.
    ///
    /// Default: `balanced`
    pub default_scenario: String,
    pub sampling: SamplingParameters,
}

impl Default for StochasticConfig {
    fn default() -> Self {
        let vessel_types = [
            ("small", VesselType::new(1000.0, 2500.0, 1500.0, 300.0)),
            ("medium", VesselType::new(2500.0, 6000.0, 4000.0, 700.0)),
            ("large", VesselType::new(6000.0, 15_000.0, 10_000.0, 2000.0)),
        ]
        .into_iter()
        .map(|(name, t)| (name.to_string(), t))
        .collect();

        let distribution_scenarios = [
            (
                "balanced",
                DistributionScenario::new(
                    "Balanced mix",
                    &[("small", 0.30), ("medium", 0.50), ("large", 0.20)],
                    0.5,
                ),
            ),
            (
                "high_large",
                DistributionScenario::new(
                    "Large vessel dominated",
                    &[("small", 0.15), ("medium", 0.35), ("large", 0.50)],
                    0.25,
                ),
            ),
            (
                "high_small",
                DistributionScenario::new(
                    "Small vessel dominated",
                    &[("small", 0.50), ("medium", 0.40), ("large", 0.10)],
                    0.25,
                ),
            ),
        ]
        .into_iter()
        .map(|(name, s)| (name.to_string(), s))
        .collect();

        Self {
            vessel_types,
            distribution_scenarios,
            default_scenario: "balanced".to_string(),
            sampling: SamplingParameters::default(),
        }
    }
}

impl StochasticConfig {
    pub fn from_toml_str(document: &str) -> BunkerResult<Self> {
        let config: StochasticConfig = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> BunkerResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| BunkerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every type and scenario; all violations are reported together.
    pub fn validate(&self) -> BunkerResult<()> {
        let mut errors = Vec::new();

        if self.vessel_types.is_empty() {
            errors.push("vessel_types must not be empty".to_string());
        }
        for (name, t) in &self.vessel_types {
            if !(t.min_volume > 0.0 && t.min_volume <= t.mean_volume && t.mean_volume <= t.max_volume) {
                errors.push(format!(
                    "vessel_types.{name} needs 0 < min_volume <= mean_volume <= max_volume"
                ));
            }
            if !(t.std_volume >= 0.0 && t.std_volume.is_finite()) {
                errors.push(format!("vessel_types.{name}.std_volume must be non-negative"));
            }
        }

        if self.distribution_scenarios.is_empty() {
            errors.push("distribution_scenarios must not be empty".to_string());
        }
        for (name, scenario) in &self.distribution_scenarios {
            let total: f64 = scenario.shares.values().sum();
            if (total - 1.0).abs() > SHARE_TOLERANCE {
                errors.push(format!(
                    "distribution_scenarios.{name}: shares must sum to 1.0, got {total}"
                ));
            }
            if scenario.shares.values().any(|s| *s < 0.0) {
                errors.push(format!("distribution_scenarios.{name}: shares must be non-negative"));
            }
            for type_name in scenario.shares.keys() {
                if !self.vessel_types.contains_key(type_name) {
                    errors.push(format!(
                        "distribution_scenarios.{name}: unknown vessel type {type_name}"
                    ));
                }
            }
            if !(scenario.probability >= 0.0 && scenario.probability.is_finite()) {
                errors.push(format!(
                    "distribution_scenarios.{name}.probability must be non-negative"
                ));
            }
        }
        let total_probability: f64 = self.distribution_scenarios.values().map(|s| s.probability).sum();
        if !self.distribution_scenarios.is_empty() && total_probability <= 0.0 {
            errors.push("distribution scenario probabilities must not all be zero".to_string());
        }

        if !self.distribution_scenarios.contains_key(&self.default_scenario) {
            errors.push(format!(
                "default_scenario {} is not a distribution scenario",
                self.default_scenario
            ));
        }
        if self.sampling.n_monte_carlo == 0 {
            errors.push("sampling.n_monte_carlo must be positive".to_string());
        }
        if self.sampling.calls_per_scenario == 0 {
            errors.push("sampling.calls_per_scenario must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(BunkerError::InvalidParameters(errors))
        }
    }

    pub fn scenario(&self, name: &str) -> BunkerResult<&DistributionScenario> {
        self.distribution_scenarios
            .get(name)
            .ok_or_else(|| BunkerError::UnknownScenario(name.to_string()))
    }

    /// Weighted mean call volume of a distribution scenario (m³).
    pub fn weighted_mean_volume(&self, name: &str) -> BunkerResult<f64> {
        Ok(self.scenario(name)?.weighted_mean_volume(&self.vessel_types))
    }
}

/// One bunkering call of a Monte-Carlo scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselCall {
    pub vessel_type: String,
    pub volume: f64,
}

/// A sampled sequence of calls and its totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloScenario {
    pub scenario_id: usize,
    pub distribution_scenario: String,
    pub calls: Vec<VesselCall>,
    pub total_demand: f64,
}

impl MonteCarloScenario {
    fn new(scenario_id: usize, distribution_scenario: &str, calls: Vec<VesselCall>) -> Self {
        let total_demand = calls.iter().map(|c| c.volume).sum();
        Self {
            scenario_id,
            distribution_scenario: distribution_scenario.to_string(),
            calls,
            total_demand,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// Mean call volume (m³); zero for an empty sequence.
    pub fn mean_volume(&self) -> f64 {
        if self.calls.is_empty() {
            0.0
        } else {
            self.total_demand / self.calls.len() as f64
        }
    }

    pub fn demand_by_type(&self) -> IndexMap<String, f64> {
        let mut totals = IndexMap::new();
        for call in &self.calls {
            *totals.entry(call.vessel_type.clone()).or_insert(0.0) += call.volume;
        }
        totals
    }

    pub fn call_count_by_type(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for call in &self.calls {
            *counts.entry(call.vessel_type.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Seeded generator of vessel-call sequences.
pub struct VesselSampler<'a> {
    config: &'a StochasticConfig,
    rng: ChaCha8Rng,
}

impl<'a> VesselSampler<'a> {
    /// Sampler seeded from `sampling.random_seed`.
    pub fn new(config: &'a StochasticConfig) -> Self {
        Self::with_seed(config, config.sampling.random_seed)
    }

    pub fn with_seed(config: &'a StochasticConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &StochasticConfig {
        self.config
    }

    /// Draw `n_calls` calls from one distribution scenario.
    pub fn call_sequence(&mut self, scenario_name: &str, n_calls: usize) -> BunkerResult<Vec<VesselCall>> {
        let config = self.config;
        let scenario = config.scenario(scenario_name)?;
        let method = config.sampling.method;
        let mut calls = Vec::with_capacity(n_calls);
        for _ in 0..n_calls {
            let r: f64 = self.rng.gen();
            let type_name = scenario
                .select_type(r)
                .ok_or_else(|| BunkerError::UnknownScenario(scenario_name.to_string()))?;
            let vessel = config
                .vessel_types
                .get(type_name)
                .ok_or_else(|| BunkerError::Error(format!("Unknown vessel type: {type_name}")))?;
            let volume = match method {
                SamplingMethod::Discrete => vessel.mean_volume,
                SamplingMethod::TruncatedNormal => vessel.sample_truncated_normal(&mut self.rng),
                SamplingMethod::Uniform => vessel.sample_uniform(&mut self.rng),
            };
            calls.push(VesselCall {
                vessel_type: type_name.to_string(),
                volume,
            });
        }
        Ok(calls)
    }

    /// Generate `n_scenarios` Monte-Carlo scenarios.
    ///
    /// # Arguments
    ///
    /// * `n_scenarios` - Number of scenarios; `sampling.n_monte_carlo` when `None`
    /// * `scenario_name` - Draw every scenario from this distribution. When
    ///   `None`, each scenario first picks a distribution by normalised
    ///   probability
    /// * `calls_per_scenario` - Calls per scenario; `sampling.calls_per_scenario` when `None`
    pub fn monte_carlo(
        &mut self,
        n_scenarios: Option<usize>,
        scenario_name: Option<&str>,
        calls_per_scenario: Option<usize>,
    ) -> BunkerResult<Vec<MonteCarloScenario>> {
        let config = self.config;
        let n_scenarios = n_scenarios.unwrap_or(config.sampling.n_monte_carlo);
        let n_calls = calls_per_scenario.unwrap_or(config.sampling.calls_per_scenario);

        let names: Vec<&str> = config.distribution_scenarios.keys().map(String::as_str).collect();
        let weights: Vec<f64> = config
            .distribution_scenarios
            .values()
            .map(|s| s.probability)
            .collect();
        let total_weight: f64 = weights.iter().sum();

        (0..n_scenarios)
            .map(|id| -> BunkerResult<MonteCarloScenario> {
                let name = match scenario_name {
                    Some(name) => name,
                    None => {
                        let r = self.rng.gen::<f64>() * total_weight;
                        pick_weighted(&names, &weights, r)
                            .ok_or_else(|| BunkerError::Error("No distribution scenarios".to_string()))?
                    }
                };
                let calls = self.call_sequence(name, n_calls)?;
                Ok(MonteCarloScenario::new(id, name, calls))
            })
            .collect()
    }
}

fn pick_weighted<'n>(names: &[&'n str], weights: &[f64], r: f64) -> Option<&'n str> {
    let mut cumulative = 0.0;
    for (name, weight) in names.iter().zip(weights) {
        cumulative += weight;
        if r < cumulative {
            return Some(*name);
        }
    }
    names.last().copied()
}

/// Demand statistics of one distribution within a scenario set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupStatistics {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioStatistics {
    /// Total demand over all scenarios.
    pub total: Summary,
    pub by_distribution: IndexMap<String, GroupStatistics>,
    pub n_scenarios: usize,
}

pub fn scenario_statistics(scenarios: &[MonteCarloScenario]) -> ScenarioStatistics {
    let demands: Vec<f64> = scenarios.iter().map(|s| s.total_demand).collect();
    let mut groups: IndexMap<String, Vec<f64>> = IndexMap::new();
    for s in scenarios {
        groups
            .entry(s.distribution_scenario.clone())
            .or_default()
            .push(s.total_demand);
    }
    ScenarioStatistics {
        total: Summary::from_values(&demands),
        by_distribution: groups
            .into_iter()
            .map(|(name, values)| {
                let stats = GroupStatistics {
                    count: values.len(),
                    mean: mean(&values),
                    std: std_dev(&values),
                };
                (name, stats)
            })
            .collect(),
        n_scenarios: scenarios.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn defaults_validate() {
        let config = StochasticConfig::default();
        config.validate().unwrap();
        assert_eq!(config.sampling.n_monte_carlo, 100);
        assert!(is_close!(config.weighted_mean_volume("balanced").unwrap(), 4450.0));
        assert!(is_close!(config.weighted_mean_volume("high_large").unwrap(), 6625.0));
    }

    #[test]
    fn shares_must_sum_to_one() {
        let mut config = StochasticConfig::default();
        config.distribution_scenarios["balanced"].shares["large"] = 0.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("shares must sum to 1.0"));
    }

    #[test]
    fn unknown_scenario_is_an_error() {
        let config = StochasticConfig::default();
        assert!(matches!(
            config.weighted_mean_volume("nope"),
            Err(BunkerError::UnknownScenario(_))
        ));
    }

    #[test]
    fn type_selection_follows_cumulative_shares() {
        let scenario = StochasticConfig::default().distribution_scenarios["balanced"].clone();
        assert_eq!(scenario.select_type(0.0), Some("small"));
        assert_eq!(scenario.select_type(0.3), Some("small"));
        assert_eq!(scenario.select_type(0.31), Some("medium"));
        assert_eq!(scenario.select_type(0.95), Some("large"));
        assert_eq!(scenario.select_type(1.5), Some("large"));
    }

    #[test]
    fn discrete_sampling_uses_mean_volumes() {
        let config = StochasticConfig::default();
        let mut sampler = VesselSampler::new(&config);
        let calls = sampler.call_sequence("balanced", 200).unwrap();
        assert_eq!(calls.len(), 200);
        for call in &calls {
            assert_eq!(call.volume, config.vessel_types[&call.vessel_type].mean_volume);
        }
    }

    #[test]
    fn continuous_samples_stay_in_range() {
        for method in [SamplingMethod::TruncatedNormal, SamplingMethod::Uniform] {
            let mut config = StochasticConfig::default();
            config.sampling.method = method;
            let mut sampler = VesselSampler::new(&config);
            for call in sampler.call_sequence("high_large", 300).unwrap() {
                let t = config.vessel_types[&call.vessel_type];
                assert!(call.volume >= t.min_volume && call.volume <= t.max_volume);
            }
        }
    }

    #[test]
    fn same_seed_same_scenarios() {
        let config = StochasticConfig::default();
        let a = VesselSampler::new(&config).monte_carlo(Some(5), None, Some(50)).unwrap();
        let b = VesselSampler::new(&config).monte_carlo(Some(5), None, Some(50)).unwrap();
        assert_eq!(a, b);
        let c = VesselSampler::with_seed(&config, 7).monte_carlo(Some(5), None, Some(50)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn scenario_bookkeeping() {
        let config = StochasticConfig::default();
        let scenarios = VesselSampler::new(&config)
            .monte_carlo(Some(4), Some("high_small"), Some(100))
            .unwrap();
        assert_eq!(scenarios.len(), 4);
        for (i, s) in scenarios.iter().enumerate() {
            assert_eq!(s.scenario_id, i);
            assert_eq!(s.distribution_scenario, "high_small");
            assert_eq!(s.call_count(), 100);
            assert_eq!(s.call_count_by_type().values().sum::<usize>(), 100);
            assert!(is_close!(s.demand_by_type().values().sum::<f64>(), s.total_demand));
        }
        let stats = scenario_statistics(&scenarios);
        assert_eq!(stats.n_scenarios, 4);
        assert_eq!(stats.by_distribution["high_small"].count, 4);
    }

    #[test]
    fn reads_toml_document() {
        let config = StochasticConfig::from_toml_str(
            r#"
            default_scenario = "only"

            [vessel_types.feeder]
            min_volume = 500.0
            max_volume = 1500.0
            mean_volume = 1000.0

            [distribution_scenarios.only]
            shares = { feeder = 1.0 }

            [sampling]
            method = "continuous:uniform"
            n_monte_carlo = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.sampling.method, SamplingMethod::Uniform);
        assert_eq!(config.sampling.random_seed, 42);
        assert_eq!(config.distribution_scenarios["only"].probability, 1.0);
        assert_eq!(config.weighted_mean_volume("only").unwrap(), 1000.0);
    }
}
