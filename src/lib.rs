//! Ammonia bunkering fleet planner
//!
//! Runner layer on top of [`bunkeropt_core`] and [`bunkeropt_analysis`]:
//! configuration discovery, run-mode dispatch and CSV output.
//!
//! # Module Organisation
//!
//! - `runner`: run modes of a planning case (`single`, `all`, and the fixed-candidate simulations)
//! - `studies`: sensitivity, break-even, demand-scenario, stochastic and verification studies
//! - `output`: CSV writers
//!
//! # Exit status
//!
//! The `bunkeropt` binary exits with 0 when every run found a feasible plan,
//! 1 when some run had no feasible candidate and 2 on configuration or I/O
//! faults.

pub mod output;
pub mod runner;
pub mod studies;

pub use runner::{run, run_case, CaseOutcome, ExecutionOverrides};
