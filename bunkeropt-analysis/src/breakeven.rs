//! Where the cost curves of two supply-chain configurations cross.
//!
//! Case A is usually port storage (C1) and case B a remote supply site
//! (C2/C3). Each axis sweeps one driver, re-optimises both cases at every
//! sample and reports the first crossover of `NPC_B − NPC_A`.

use crate::evaluate::npc_or_infinity;
use bunkeropt_core::errors::{BunkerError, BunkerResult};
use bunkeropt_core::table::{Cell, Table};
use bunkeropt_core::{run_sweep, Parameters, ScenarioRow};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

/// Transit speed used when a case has no distance to derive it from (kn).
pub const DEFAULT_SPEED_KNOTS: f64 = 15.0;

/// Vessel volumes (small, medium, large) used by the mix axis (m³).
pub const DEFAULT_MIX_VOLUMES: (f64, f64, f64) = (1500.0, 4000.0, 10_000.0);

/// Share of the non-large calls made by small vessels.
const SMALL_SHARE_OF_REST: f64 = 0.3;

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

pub fn default_distances() -> Vec<f64> {
    linspace(10.0, 100.0, 10)
}

pub fn default_start_vessels() -> Vec<f64> {
    linspace(50.0, 500.0, 10)
}

pub fn default_large_shares() -> Vec<f64> {
    linspace(0.1, 0.5, 9)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakEvenPoint {
    pub value: f64,
    pub npc_a: f64,
    pub npc_b: f64,
}

impl BreakEvenPoint {
    /// `NPC_B − NPC_A`; positive when A is cheaper.
    pub fn difference(&self) -> f64 {
        self.npc_b - self.npc_a
    }
}

/// Samples along one axis and the first crossover, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakEvenResult {
    pub parameter: String,
    pub case_a: String,
    pub case_b: String,
    pub points: Vec<BreakEvenPoint>,
    pub crossover: Option<f64>,
    /// Case that is cheaper before the crossover.
    pub cheaper_below: Option<String>,
}

impl BreakEvenResult {
    fn new(parameter: &str, case_a: &str, case_b: &str, points: Vec<BreakEvenPoint>) -> Self {
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let differences: Vec<f64> = points.iter().map(BreakEvenPoint::difference).collect();
        let crossover = find_crossover(&values, &differences);
        let cheaper_below = crossover.and_then(|_| {
            differences
                .iter()
                .find(|d| d.is_finite() && **d != 0.0)
                .map(|d| if *d > 0.0 { case_a } else { case_b }.to_string())
        });
        info!(parameter, case_a, case_b, ?crossover, "Break-even sweep finished");
        Self {
            parameter: parameter.to_string(),
            case_a: case_a.to_string(),
            case_b: case_b.to_string(),
            points,
            crossover,
            cheaper_below,
        }
    }

    /// `{param}, {A}_NPC_USDm, {B}_NPC_USDm, Difference_USDm, Preferred_Case`
    pub fn to_table(&self) -> BunkerResult<Table> {
        let mut table = Table::new([
            self.parameter.clone(),
            format!("{}_NPC_USDm", self.case_a),
            format!("{}_NPC_USDm", self.case_b),
            "Difference_USDm".to_string(),
            "Preferred_Case".to_string(),
        ]);
        for point in &self.points {
            let difference = point.difference();
            let preferred = if !difference.is_finite() && point.npc_a == point.npc_b {
                Cell::Empty
            } else if difference >= 0.0 {
                Cell::from(self.case_a.as_str())
            } else {
                Cell::from(self.case_b.as_str())
            };
            table.push_row(vec![
                point.value.into(),
                point.npc_a.into(),
                point.npc_b.into(),
                difference.into(),
                preferred,
            ])?;
        }
        Ok(table)
    }
}

/// First zero of a sampled curve by linear interpolation.
///
/// Non-finite samples are skipped. Returns `None` without a sign change.
pub fn find_crossover(values: &[f64], differences: &[f64]) -> Option<f64> {
    let samples: Vec<(f64, f64)> = values
        .iter()
        .zip(differences)
        .filter(|(_, d)| d.is_finite())
        .map(|(x, d)| (*x, *d))
        .collect();
    if let Some((x, _)) = samples.iter().find(|(_, d)| *d == 0.0) {
        return Some(*x);
    }
    samples.windows(2).find_map(|pair| {
        let (x0, d0) = pair[0];
        let (x1, d1) = pair[1];
        (d0.signum() != d1.signum()).then(|| x0 + (x1 - x0) * (-d0) / (d1 - d0))
    })
}

/// Compares two cases along break-even axes.
#[derive(Debug, Clone)]
pub struct BreakEvenAnalyzer<'a> {
    case_a: &'a Parameters,
    case_b: &'a Parameters,
}

impl<'a> BreakEvenAnalyzer<'a> {
    pub fn new(case_a: &'a Parameters, case_b: &'a Parameters) -> Self {
        Self { case_a, case_b }
    }

    /// Transit speed of `params`, from its distance if set.
    pub fn speed_knots(params: &Parameters) -> f64 {
        params
            .operations
            .distance_nm
            .map(|d| d / params.operations.travel_time_hours)
            .unwrap_or(DEFAULT_SPEED_KNOTS)
    }

    fn optimum(params: &Parameters) -> BunkerResult<Option<ScenarioRow>> {
        Ok(run_sweep(params)?.optimal().cloned())
    }

    fn sweep_axis<F>(&self, parameter: &str, values: &[f64], adjust: F) -> BunkerResult<BreakEvenResult>
    where
        F: Fn(&Parameters, f64) -> BunkerResult<Parameters> + Sync,
    {
        let points = values
            .par_iter()
            .map(|&value| -> BunkerResult<BreakEvenPoint> {
                let a = adjust(self.case_a, value)?;
                let b = adjust(self.case_b, value)?;
                Ok(BreakEvenPoint {
                    value,
                    npc_a: npc_or_infinity(Self::optimum(&a)?.as_ref()),
                    npc_b: npc_or_infinity(Self::optimum(&b)?.as_ref()),
                })
            })
            .collect::<BunkerResult<Vec<_>>>()?;
        Ok(BreakEvenResult::new(
            parameter,
            &self.case_a.case_id,
            &self.case_b.case_id,
            points,
        ))
    }

    /// Vary the one-way distance of case B at fixed speed; case A is unchanged.
    ///
    /// # Arguments
    ///
    /// * `distances` - One-way distances (nm)
    /// * `speed_knots` - Transit speed; derived from case B when `None`
    pub fn distance(&self, distances: &[f64], speed_knots: Option<f64>) -> BunkerResult<BreakEvenResult> {
        let speed = speed_knots.unwrap_or_else(|| Self::speed_knots(self.case_b));
        let base_a = Self::optimum(self.case_a)?;
        let npc_a = npc_or_infinity(base_a.as_ref());

        let points = distances
            .par_iter()
            .map(|&distance| -> BunkerResult<BreakEvenPoint> {
                let b = at_distance(self.case_b, distance, speed);
                Ok(BreakEvenPoint {
                    value: distance,
                    npc_a,
                    npc_b: npc_or_infinity(Self::optimum(&b)?.as_ref()),
                })
            })
            .collect::<BunkerResult<Vec<_>>>()?;
        Ok(BreakEvenResult::new(
            "Distance_nm",
            &self.case_a.case_id,
            &self.case_b.case_id,
            points,
        ))
    }

    /// Scale demand in both cases; end vessels keep each case's growth ratio.
    pub fn demand(&self, start_vessels: &[f64]) -> BunkerResult<BreakEvenResult> {
        self.sweep_axis("Start_Vessels", start_vessels, |params, start| {
            Ok(with_start_vessels(params, start))
        })
    }

    /// Vary the share of large vessels; the rest splits 30/70 small/medium.
    ///
    /// The mix sets the mean call volume of both cases.
    pub fn vessel_mix(
        &self,
        large_shares: &[f64],
        volumes: (f64, f64, f64),
    ) -> BunkerResult<BreakEvenResult> {
        if large_shares.iter().any(|s| !(0.0..=1.0).contains(s)) {
            return Err(BunkerError::InvalidVariations(
                "large-vessel shares must be in [0, 1]".to_string(),
            ));
        }
        self.sweep_axis("Large_Vessel_Share", large_shares, |params, share| {
            let mut params = params.clone();
            params.bunkering.bunker_volume_per_call = mix_volume(share, volumes);
            Ok(params)
        })
    }

    /// Distance axis with each case pinned to its own shuttle size.
    ///
    /// A size left as `None` defaults to that case's sweep optimum at its
    /// base configuration. Pump rates are still optimised.
    pub fn heterogeneous_distance(
        &self,
        distances: &[f64],
        shuttle_a: Option<f64>,
        shuttle_b: Option<f64>,
        speed_knots: Option<f64>,
    ) -> BunkerResult<BreakEvenResult> {
        let pin = |params: &Parameters, size: Option<f64>| -> BunkerResult<Parameters> {
            let size = match size {
                Some(size) => size,
                None => Self::optimum(params)?
                    .map(|row| row.shuttle_size)
                    .ok_or_else(|| BunkerError::NoFeasibleSolution(params.case_id.clone()))?,
            };
            let mut pinned = params.clone();
            pinned.shuttle.available_sizes = vec![size];
            Ok(pinned)
        };
        let pinned_a = pin(self.case_a, shuttle_a)?;
        let pinned_b = pin(self.case_b, shuttle_b)?;
        let speed = speed_knots.unwrap_or_else(|| Self::speed_knots(self.case_b));
        BreakEvenAnalyzer::new(&pinned_a, &pinned_b).distance(distances, Some(speed))
    }
}

/// Copy of `params` with the one-way distance set at `speed_knots`.
pub fn at_distance(params: &Parameters, distance_nm: f64, speed_knots: f64) -> Parameters {
    let mut params = params.clone();
    params.operations.distance_nm = Some(distance_nm);
    params.operations.travel_time_hours = distance_nm / speed_knots;
    params
}

/// Copy of `params` with demand scaled to `start` vessels.
pub fn with_start_vessels(params: &Parameters, start: f64) -> Parameters {
    let shipping = &params.shipping;
    let ratio = if shipping.start_vessels > 0 {
        f64::from(shipping.end_vessels) / f64::from(shipping.start_vessels)
    } else {
        1.0
    };
    let mut params = params.clone();
    params.shipping.start_vessels = start.round().max(0.0) as u32;
    params.shipping.end_vessels = (start * ratio).round().max(0.0) as u32;
    params
}

/// Mean call volume for a large-vessel share.
pub fn mix_volume(large_share: f64, (small, medium, large): (f64, f64, f64)) -> f64 {
    let rest = 1.0 - large_share;
    rest * SMALL_SHARE_OF_REST * small + rest * (1.0 - SMALL_SHARE_OF_REST) * medium + large_share * large
}

/// Per-case optimum: `Case, Optimal_Shuttle_m3, Optimal_Pump_m3ph, NPC_USDm, LCO_USD_per_ton`.
pub fn compare_cases(cases: &[Parameters]) -> BunkerResult<Table> {
    let optima = cases
        .par_iter()
        .map(|params| -> BunkerResult<(String, Option<ScenarioRow>)> {
            Ok((params.case_id.clone(), run_sweep(params)?.optimal().cloned()))
        })
        .collect::<BunkerResult<Vec<_>>>()?;

    let mut table = Table::new([
        "Case",
        "Optimal_Shuttle_m3",
        "Optimal_Pump_m3ph",
        "NPC_USDm",
        "LCO_USD_per_ton",
    ]);
    for (case_id, best) in optima {
        table.push_row(vec![
            case_id.into(),
            best.as_ref().map(|r| r.shuttle_size).into(),
            best.as_ref().map(|r| r.pump_size).into(),
            best.as_ref().map(|r| r.npc_total).into(),
            best.as_ref().map(|r| r.lco_usd_per_ton).into(),
        ])?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn crossover_is_interpolated() {
        let x = [10.0, 20.0, 30.0];
        let d = [-10.0, -5.0, 5.0];
        assert!(is_close!(find_crossover(&x, &d).unwrap(), 25.0));
    }

    #[test]
    fn no_sign_change_means_no_crossover() {
        assert!(find_crossover(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(find_crossover(&[], &[]).is_none());
    }

    #[test]
    fn infinite_samples_are_skipped() {
        let x = [10.0, 20.0, 30.0];
        let d = [-10.0, f64::INFINITY, 10.0];
        assert!(is_close!(find_crossover(&x, &d).unwrap(), 20.0));
    }

    #[test]
    fn exact_zero_is_the_crossover() {
        assert_eq!(find_crossover(&[1.0, 2.0, 3.0], &[-1.0, 0.0, 1.0]), Some(2.0));
    }

    #[test]
    fn default_grids() {
        let distances = default_distances();
        assert_eq!(distances.len(), 10);
        assert_eq!(distances[0], 10.0);
        assert_eq!(distances[9], 100.0);
        assert_eq!(default_large_shares().len(), 9);
        assert!(is_close!(default_large_shares()[4], 0.3));
    }

    #[test]
    fn mix_volume_splits_remaining_share() {
        let v = mix_volume(0.2, DEFAULT_MIX_VOLUMES);
        assert!(is_close!(v, 0.8 * 0.3 * 1500.0 + 0.8 * 0.7 * 4000.0 + 0.2 * 10_000.0));
    }

    #[test]
    fn speed_derives_from_distance() {
        let mut params = Parameters::default();
        assert_eq!(BreakEvenAnalyzer::speed_knots(&params), DEFAULT_SPEED_KNOTS);
        params.operations.distance_nm = Some(59.0);
        params.operations.travel_time_hours = 3.93;
        assert!(is_close!(BreakEvenAnalyzer::speed_knots(&params), 59.0 / 3.93));
        let moved = at_distance(&params, 30.0, 15.0);
        assert_eq!(moved.operations.travel_time_hours, 2.0);
    }

    #[test]
    fn demand_scaling_keeps_growth_ratio() {
        let params = Parameters::default();
        let scaled = with_start_vessels(&params, 100.0);
        assert_eq!(scaled.shipping.start_vessels, 100);
        assert_eq!(scaled.shipping.end_vessels, 1000);
    }

    #[test]
    fn table_prefers_cheaper_case() {
        let result = BreakEvenResult::new(
            "Distance_nm",
            "case_1",
            "case_2",
            vec![
                BreakEvenPoint { value: 10.0, npc_a: 100.0, npc_b: 90.0 },
                BreakEvenPoint { value: 20.0, npc_a: 100.0, npc_b: 110.0 },
            ],
        );
        assert!(is_close!(result.crossover.unwrap(), 15.0));
        assert_eq!(result.cheaper_below.as_deref(), Some("case_2"));
        let table = result.to_table().unwrap();
        assert_eq!(table.columns()[1], "case_1_NPC_USDm");
        assert_eq!(table.cell(0, "Preferred_Case").and_then(Cell::as_str), Some("case_2"));
        assert_eq!(table.cell(1, "Preferred_Case").and_then(Cell::as_str), Some("case_1"));
    }
}
