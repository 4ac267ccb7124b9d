//! Sensitivity of the system cost to single parameters and parameter pairs.
//!
//! Parameters are addressed by dotted path (`economy.fuel_price`). Every
//! variation works on a copy of the base bundle and re-solves either the
//! sweep optimum or a frozen candidate. Infeasible variations record an
//! NPC of `+∞`.

use crate::evaluate::{evaluate, lco_or_infinity, npc_or_infinity, CandidateChoice};
use bunkeropt_core::errors::{BunkerError, BunkerResult};
use bunkeropt_core::table::{Cell, Table};
use bunkeropt_core::{run_sweep, Parameters, ScenarioRow};
use indexmap::IndexMap;
use ndarray::Array2;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

/// Parameters swept by [`SensitivityAnalyzer::full_analysis`].
pub const DEFAULT_PARAMETERS: [&str; 5] = [
    "economy.fuel_price",
    "operations.max_annual_hours_per_vessel",
    "operations.travel_time_hours",
    "bunkering.bunker_volume_per_call",
    "propulsion.sfoc",
];

/// Default relative variations for single-parameter tables.
pub const DEFAULT_VARIATIONS: [f64; 5] = [-0.2, -0.1, 0.0, 0.1, 0.2];

/// Default tornado half-width.
pub const DEFAULT_TORNADO_RANGE: f64 = 0.2;

/// How a variation maps onto a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VariationMode {
    /// `base · (1 + v)`
    Relative,
    /// `v` replaces the value
    Absolute,
}

impl VariationMode {
    pub fn apply(&self, base: f64, variation: f64) -> f64 {
        match self {
            VariationMode::Relative => base * (1.0 + variation),
            VariationMode::Absolute => variation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityPoint {
    pub variation: f64,
    pub value: f64,
    pub npc: f64,
    pub lco: f64,
    /// Change against the baseline NPC (%).
    pub npc_change_pct: f64,
}

/// Result of varying one parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityResult {
    pub parameter: String,
    pub mode: VariationMode,
    pub base_value: f64,
    pub base_npc: f64,
    pub points: Vec<SensitivityPoint>,
    /// `(ΔNPC/NPC) / (Δvalue/value)` from the neighbours of the base point.
    pub elasticity: Option<f64>,
}

impl SensitivityResult {
    pub fn to_table(&self) -> BunkerResult<Table> {
        let mut table = Table::new([
            "Variation",
            "Parameter_Value",
            "NPC_USDm",
            "LCO_USD_per_ton",
            "NPC_Change_Pct",
        ]);
        for point in &self.points {
            table.push_row(vec![
                point.variation.into(),
                point.value.into(),
                point.npc.into(),
                point.lco.into(),
                point.npc_change_pct.into(),
            ])?;
        }
        Ok(table)
    }
}

/// One bar of a tornado chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TornadoEntry {
    pub parameter: String,
    pub base_value: f64,
    pub low_npc: f64,
    pub high_npc: f64,
    pub swing: f64,
    pub swing_pct: f64,
}

/// Tornado entries sorted by descending swing.
pub fn tornado_table(entries: &[TornadoEntry]) -> BunkerResult<Table> {
    let mut table = Table::new([
        "Parameter",
        "Base_Value",
        "Low_NPC_USDm",
        "High_NPC_USDm",
        "Swing_USDm",
        "Swing_Pct",
    ]);
    for entry in entries {
        table.push_row(vec![
            entry.parameter.as_str().into(),
            entry.base_value.into(),
            entry.low_npc.into(),
            entry.high_npc.into(),
            entry.swing.into(),
            entry.swing_pct.into(),
        ])?;
    }
    Ok(table)
}

/// NPC over the outer product of two variation lists.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoWayResult {
    pub row_parameter: String,
    pub column_parameter: String,
    pub row_values: Vec<f64>,
    pub column_values: Vec<f64>,
    /// `npc[[i, j]]` for row value `i` and column value `j`.
    pub npc: Array2<f64>,
}

impl TwoWayResult {
    /// Pivot with `name=value` labels.
    pub fn to_table(&self) -> BunkerResult<Table> {
        let mut columns = vec![self.row_parameter.clone()];
        columns.extend(
            self.column_values
                .iter()
                .map(|v| format!("{}={v}", self.column_parameter)),
        );
        let mut table = Table::new(columns);
        for (i, value) in self.row_values.iter().enumerate() {
            let mut row = vec![Cell::Text(format!("{}={value}", self.row_parameter))];
            row.extend(self.npc.row(i).iter().map(|npc| Cell::Number(*npc)));
            table.push_row(row)?;
        }
        Ok(table)
    }
}

/// Tornado plus one single-parameter result per parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FullAnalysis {
    pub tornado: Vec<TornadoEntry>,
    pub single: IndexMap<String, SensitivityResult>,
}

/// Runs sensitivity studies against one base bundle.
#[derive(Debug, Clone)]
pub struct SensitivityAnalyzer<'a> {
    params: &'a Parameters,
    choice: CandidateChoice,
    base: ScenarioRow,
}

impl<'a> SensitivityAnalyzer<'a> {
    /// Solve the baseline.
    ///
    /// # Arguments
    ///
    /// * `params` - Base parameter bundle
    /// * `choice` - Candidate re-solved for every variation
    ///
    /// # Returns
    ///
    /// The analyzer, or `NoFeasibleSolution` if the baseline is infeasible.
    pub fn new(params: &'a Parameters, choice: CandidateChoice) -> BunkerResult<Self> {
        let base = evaluate(params, choice)?
            .ok_or_else(|| BunkerError::NoFeasibleSolution(format!("{} baseline", params.case_id)))?;
        info!(
            case = %params.case_id,
            npc_musd = base.npc_total,
            "Sensitivity baseline solved"
        );
        Ok(Self {
            params,
            choice,
            base,
        })
    }

    pub fn base(&self) -> &ScenarioRow {
        &self.base
    }

    fn solve_with(&self, path: &str, value: f64) -> BunkerResult<Option<ScenarioRow>> {
        self.solve_varied(&self.params.with_value(path, value)?)
    }

    /// Re-solve a varied bundle; a variation outside the valid range counts as infeasible.
    fn solve_varied(&self, params: &Parameters) -> BunkerResult<Option<ScenarioRow>> {
        match params.validate() {
            Ok(()) => evaluate(params, self.choice),
            Err(BunkerError::InvalidParameters(reasons)) => {
                warn!(case = %params.case_id, ?reasons, "Variation outside the valid range");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn change_pct(&self, npc: f64) -> f64 {
        (npc - self.base.npc_total) / self.base.npc_total * 100.0
    }

    /// Re-solve for every variation of one parameter.
    ///
    /// # Arguments
    ///
    /// * `path` - Dotted parameter path
    /// * `variations` - Multipliers (relative) or replacement values (absolute)
    /// * `mode` - How variations are applied
    ///
    /// # Returns
    ///
    /// One point per variation, in input order.
    pub fn single_parameter(
        &self,
        path: &str,
        variations: &[f64],
        mode: VariationMode,
    ) -> BunkerResult<SensitivityResult> {
        if variations.is_empty() {
            return Err(BunkerError::InvalidVariations(format!("no variations for {path}")));
        }
        let base_value = self.params.get_value(path)?;

        let points = variations
            .par_iter()
            .map(|&variation| -> BunkerResult<SensitivityPoint> {
                let value = mode.apply(base_value, variation);
                let row = self.solve_with(path, value)?;
                let npc = npc_or_infinity(row.as_ref());
                Ok(SensitivityPoint {
                    variation,
                    value,
                    npc,
                    lco: lco_or_infinity(row.as_ref()),
                    npc_change_pct: self.change_pct(npc),
                })
            })
            .collect::<BunkerResult<Vec<_>>>()?;

        Ok(SensitivityResult {
            parameter: path.to_string(),
            mode,
            base_value,
            base_npc: self.base.npc_total,
            elasticity: elasticity(&points, base_value, self.base.npc_total),
            points,
        })
    }

    /// Swing of NPC for `±range` around the base value of each parameter.
    pub fn tornado(&self, paths: &[&str], range: f64) -> BunkerResult<Vec<TornadoEntry>> {
        if !(range > 0.0 && range < 1.0) {
            return Err(BunkerError::InvalidVariations(format!(
                "tornado range must be in (0, 1), got {range}"
            )));
        }
        let mut entries = paths
            .par_iter()
            .map(|path| -> BunkerResult<TornadoEntry> {
                let base_value = self.params.get_value(path)?;
                let low_npc =
                    npc_or_infinity(self.solve_with(path, base_value * (1.0 - range))?.as_ref());
                let high_npc =
                    npc_or_infinity(self.solve_with(path, base_value * (1.0 + range))?.as_ref());
                let swing = (high_npc - low_npc).abs();
                Ok(TornadoEntry {
                    parameter: path.to_string(),
                    base_value,
                    low_npc,
                    high_npc,
                    swing,
                    swing_pct: swing / self.base.npc_total * 100.0,
                })
            })
            .collect::<BunkerResult<Vec<_>>>()?;
        entries.sort_by(|a, b| b.swing.total_cmp(&a.swing));
        Ok(entries)
    }

    /// NPC over the outer product of two variation lists.
    pub fn two_way(
        &self,
        row: (&str, &[f64]),
        column: (&str, &[f64]),
        mode: VariationMode,
    ) -> BunkerResult<TwoWayResult> {
        let (row_path, row_variations) = row;
        let (column_path, column_variations) = column;
        if row_variations.is_empty() || column_variations.is_empty() {
            return Err(BunkerError::InvalidVariations(
                "two-way analysis needs variations on both axes".to_string(),
            ));
        }
        let row_base = self.params.get_value(row_path)?;
        let column_base = self.params.get_value(column_path)?;
        let row_values: Vec<f64> = row_variations.iter().map(|v| mode.apply(row_base, *v)).collect();
        let column_values: Vec<f64> = column_variations
            .iter()
            .map(|v| mode.apply(column_base, *v))
            .collect();

        let cells: Vec<(usize, usize)> = (0..row_values.len())
            .flat_map(|i| (0..column_values.len()).map(move |j| (i, j)))
            .collect();
        let npcs = cells
            .par_iter()
            .map(|&(i, j)| -> BunkerResult<f64> {
                let params = self
                    .params
                    .with_value(row_path, row_values[i])?
                    .with_value(column_path, column_values[j])?;
                Ok(npc_or_infinity(self.solve_varied(&params)?.as_ref()))
            })
            .collect::<BunkerResult<Vec<f64>>>()?;

        let npc = Array2::from_shape_vec((row_values.len(), column_values.len()), npcs)
            .map_err(|e| BunkerError::Error(e.to_string()))?;
        Ok(TwoWayResult {
            row_parameter: row_path.to_string(),
            column_parameter: column_path.to_string(),
            row_values,
            column_values,
            npc,
        })
    }

    /// Cheapest shuttle for each pump rate of the catalogue.
    pub fn pump_rate_sensitivity(&self) -> BunkerResult<Table> {
        let mut table = Table::new([
            "Pump_Rate_m3ph",
            "Min_NPC_USDm",
            "Optimal_Shuttle_cbm",
            "LCO_USD_per_ton",
        ]);
        let rows = self
            .params
            .pumps
            .available_flow_rates
            .par_iter()
            .map(|&pump| -> BunkerResult<(f64, Option<ScenarioRow>)> {
                let mut params = self.params.clone();
                params.pumps.available_flow_rates = vec![pump];
                Ok((pump, run_sweep(&params)?.optimal().cloned()))
            })
            .collect::<BunkerResult<Vec<_>>>()?;

        for (pump, best) in rows {
            table.push_row(vec![
                pump.into(),
                npc_or_infinity(best.as_ref()).into(),
                best.as_ref().map(|r| r.shuttle_size).into(),
                lco_or_infinity(best.as_ref()).into(),
            ])?;
        }
        Ok(table)
    }

    /// Default tornado plus a single-parameter table per default parameter.
    pub fn full_analysis(&self) -> BunkerResult<FullAnalysis> {
        let tornado = self.tornado(&DEFAULT_PARAMETERS, DEFAULT_TORNADO_RANGE)?;
        let mut single = IndexMap::new();
        for path in DEFAULT_PARAMETERS {
            let result = self.single_parameter(path, &DEFAULT_VARIATIONS, VariationMode::Relative)?;
            single.insert(path.to_string(), result);
        }
        Ok(FullAnalysis { tornado, single })
    }
}

/// Central-difference elasticity around the base point.
///
/// Needs the base value among the points and a finite neighbour on each side.
fn elasticity(points: &[SensitivityPoint], base_value: f64, base_npc: f64) -> Option<f64> {
    if base_value == 0.0 || !points.iter().any(|p| p.value == base_value) {
        return None;
    }
    let finite = |p: &&SensitivityPoint| p.npc.is_finite();
    let below = points
        .iter()
        .filter(finite)
        .filter(|p| p.value < base_value)
        .max_by(|a, b| a.value.total_cmp(&b.value))?;
    let above = points
        .iter()
        .filter(finite)
        .filter(|p| p.value > base_value)
        .min_by(|a, b| a.value.total_cmp(&b.value))?;

    let npc_change = (above.npc - below.npc) / base_npc;
    let value_change = (above.value - below.value) / base_value;
    Some(npc_change / value_change)
}
