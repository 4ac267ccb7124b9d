//! Studies layered on the bunkeropt planning core
//!
//! Each driver copies a base parameter bundle, perturbs it and re-solves
//! through `bunkeropt-core`, either as a full catalogue sweep or for a
//! frozen (shuttle, pump) candidate.
//!
//! # Module Organisation
//!
//! - `sensitivity`: one-at-a-time, tornado, two-way and pump-rate studies
//! - `breakeven`: crossover of two cases along distance, demand and vessel mix
//! - `demand_scenarios`: sweep optima under alternative fleet growth
//! - `vessels`: vessel-type mixes and the seeded Monte-Carlo sampler
//! - `stochastic`: expected-cost optimum with VSS and EVPI
//! - `evaluate`, `stats`: shared re-solve helper and summary statistics

pub mod breakeven;
pub mod demand_scenarios;
pub mod evaluate;
pub mod sensitivity;
pub mod stats;
pub mod stochastic;
pub mod vessels;

pub use breakeven::{BreakEvenAnalyzer, BreakEvenResult};
pub use evaluate::CandidateChoice;
pub use sensitivity::{SensitivityAnalyzer, VariationMode};
pub use stochastic::{StochasticOptimizer, StochasticResult};
pub use vessels::{StochasticConfig, VesselSampler};
