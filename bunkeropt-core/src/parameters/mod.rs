//! Parameter bundle for one planning case.
//!
//! A bundle is partitioned into groups mirroring the TOML configuration
//! files. Every group provides defaults matching the base case, so a case
//! file only needs to list the values it changes.
//!
//! Case files are layered on top of `base.toml`: tables merge recursively,
//! any other value in the case file replaces the base value.

mod access;
mod economy;
mod equipment;
mod execution;
mod operations;
mod shipping;

pub use economy::{EconomyParameters, TimePeriodParameters};
pub use equipment::{PropulsionParameters, PumpParameters, ShuttleParameters, TankStorageParameters};
pub use execution::{ExecutionParameters, RunMode};
pub use operations::{ConstraintParameters, OperationsParameters, ShoreSupplyParameters};
pub use shipping::{AmmoniaParameters, BunkeringParameters, ShippingParameters};

use crate::errors::{BunkerError, BunkerResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Case identifiers whose configuration file carries a site suffix.
const CASE_ALIASES: &[(&str, &str)] = &[("case_2", "case_2_ulsan"), ("case_3", "case_3_yeosu")];

/// Supply-chain topology, derived from `operations.has_storage_at_busan`.
///
/// The two topologies share one cost model and differ in exactly three
/// places, all of which live in this impl block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// C1: port-resident storage tank, shuttles ferry inside the port.
    PortStorage,
    /// C2/C3: shuttles sail from a remote production site.
    RemoteSupply,
}

impl Topology {
    pub fn from_storage_flag(has_storage_at_port: bool) -> Self {
        if has_storage_at_port {
            Topology::PortStorage
        } else {
            Topology::RemoteSupply
        }
    }

    /// Short label used in log messages.
    pub fn label(&self) -> &'static str {
        match self {
            Topology::PortStorage => "port storage",
            Topology::RemoteSupply => "remote supply",
        }
    }

    /// Travel legs charged for propulsion fuel per cycle.
    pub fn travel_factor(&self) -> f64 {
        match self {
            Topology::PortStorage => 1.0,
            Topology::RemoteSupply => 2.0,
        }
    }

    /// Volume pumped per bunkering event: one call, or one shuttle load.
    pub fn pumping_volume(&self, bunker_volume: f64, shuttle_size: f64) -> f64 {
        match self {
            Topology::PortStorage => bunker_volume,
            Topology::RemoteSupply => shuttle_size,
        }
    }

    /// Volume delivered per unit of annual activity (a call, or a trip).
    pub fn delivery_volume(&self, bunker_volume: f64, shuttle_size: f64) -> f64 {
        match self {
            Topology::PortStorage => bunker_volume,
            Topology::RemoteSupply => shuttle_size,
        }
    }
}

/// Complete, immutable input of one planning case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Parameters {
    /// Identifier used for output directories.
    ///
    /// Default: `case_1`
    pub case_id: String,
    /// Human readable description of the case.
    pub case_name: String,
    pub economy: EconomyParameters,
    pub time_period: TimePeriodParameters,
    pub shipping: ShippingParameters,
    pub ammonia: AmmoniaParameters,
    pub operations: OperationsParameters,
    pub propulsion: PropulsionParameters,
    pub shuttle: ShuttleParameters,
    pub pumps: PumpParameters,
    pub tank_storage: TankStorageParameters,
    pub bunkering: BunkeringParameters,
    pub constraints: ConstraintParameters,
    pub shore_supply: ShoreSupplyParameters,
    pub execution: ExecutionParameters,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            case_id: "case_1".to_string(),
            case_name: "Port storage with in-port shuttles".to_string(),
            economy: EconomyParameters::default(),
            time_period: TimePeriodParameters::default(),
            shipping: ShippingParameters::default(),
            ammonia: AmmoniaParameters::default(),
            operations: OperationsParameters::default(),
            propulsion: PropulsionParameters::default(),
            shuttle: ShuttleParameters::default(),
            pumps: PumpParameters::default(),
            tank_storage: TankStorageParameters::default(),
            bunkering: BunkeringParameters::default(),
            constraints: ConstraintParameters::default(),
            shore_supply: ShoreSupplyParameters::default(),
            execution: ExecutionParameters::default(),
        }
    }
}

impl Parameters {
    /// Parse a bundle from a TOML document and validate it.
    pub fn from_toml_str(document: &str) -> BunkerResult<Self> {
        let params: Parameters = toml::from_str(document)?;
        params.validate()?;
        Ok(params)
    }

    /// Load `base.toml` from `config_dir`, merge the case file over it and validate.
    ///
    /// The case file is `<case_id>.toml`, or its aliased name for cases with
    /// a site suffix (`case_2` resolves to `case_2_ulsan.toml`).
    pub fn load_case(config_dir: &Path, case_id: &str) -> BunkerResult<Self> {
        let mut merged = read_toml(&config_dir.join("base.toml"))?;
        let case_file = config_dir.join(format!("{}.toml", resolve_case_alias(case_id)));
        merge_toml(&mut merged, read_toml(&case_file)?);

        if let toml::Value::Table(table) = &mut merged {
            if !table.contains_key("case_id") {
                table.insert("case_id".to_string(), toml::Value::String(case_id.to_string()));
            }
        }

        let params = merged.try_into::<Parameters>()?;
        params.validate()?;
        Ok(params)
    }

    pub fn topology(&self) -> Topology {
        Topology::from_storage_flag(self.operations.has_storage_at_busan)
    }

    pub fn project_years(&self) -> usize {
        self.time_period.project_years()
    }

    /// Copy of the bundle whose catalogues contain only the given candidate.
    pub fn with_candidate(&self, shuttle_size: f64, pump_size: f64) -> Self {
        let mut params = self.clone();
        params.shuttle.available_sizes = vec![shuttle_size];
        params.pumps.available_flow_rates = vec![pump_size];
        params
    }

    /// Check every invariant and report all violations at once.
    pub fn validate(&self) -> BunkerResult<()> {
        let mut errors = Vec::new();

        let mut unit_interval = |name: &str, value: f64, open_low: bool| {
            let ok = if open_low {
                value > 0.0 && value < 1.0
            } else {
                (0.0..1.0).contains(&value)
            };
            if !ok || !value.is_finite() {
                let range = if open_low { "(0, 1)" } else { "[0, 1)" };
                errors.push(format!("{name} must be in {range}, got {value}"));
            }
        };
        unit_interval("economy.discount_rate", self.economy.discount_rate, false);
        unit_interval(
            "economy.annualization_interest_rate",
            self.economy.annualization_interest_rate,
            true,
        );
        unit_interval("shuttle.fixed_opex_ratio", self.shuttle.fixed_opex_ratio, false);
        unit_interval("shuttle.equipment_ratio", self.shuttle.equipment_ratio, false);
        unit_interval("bunkering.fixed_opex_ratio", self.bunkering.fixed_opex_ratio, false);
        unit_interval("tank_storage.fixed_opex_ratio", self.tank_storage.fixed_opex_ratio, false);

        let mut positive = |name: &str, value: f64| {
            if !(value > 0.0 && value.is_finite()) {
                errors.push(format!("{name} must be positive, got {value}"));
            }
        };
        positive("ammonia.density_storage", self.ammonia.density_storage);
        positive("shipping.voyages_per_year", self.shipping.voyages_per_year);
        positive("shipping.kg_per_voyage", self.shipping.kg_per_voyage);
        positive("operations.travel_time_hours", self.operations.travel_time_hours);
        positive(
            "operations.max_annual_hours_per_vessel",
            self.operations.max_annual_hours_per_vessel,
        );
        positive("operations.tank_safety_factor", self.operations.tank_safety_factor);
        positive("operations.daily_peak_factor", self.operations.daily_peak_factor);
        positive("propulsion.sfoc", self.propulsion.sfoc);
        positive("propulsion.pump_delta_pressure", self.propulsion.pump_delta_pressure);
        positive("shuttle.ref_capex", self.shuttle.ref_capex);
        positive("shuttle.ref_size", self.shuttle.ref_size);
        positive("shuttle.capex_scaling_exponent", self.shuttle.capex_scaling_exponent);
        positive("bunkering.bunker_volume_per_call", self.bunkering.bunker_volume_per_call);
        positive(
            "constraints.max_call_duration_hours",
            self.constraints.max_call_duration_hours,
        );
        if self.tank_storage.enabled {
            positive("tank_storage.size_tons", self.tank_storage.size_tons);
        }
        if self.shore_supply.enabled {
            positive("shore_supply.pump_rate_m3ph", self.shore_supply.pump_rate_m3ph);
        }
        if let Some(distance) = self.operations.distance_nm {
            positive("operations.distance_nm", distance);
        }

        let non_negative = [
            ("economy.fuel_price", self.economy.fuel_price),
            ("economy.electricity_price", self.economy.electricity_price),
            ("operations.setup_time_hours", self.operations.setup_time_hours),
            ("operations.port_entry_hours", self.operations.port_entry_hours),
            ("operations.port_exit_hours", self.operations.port_exit_hours),
            ("operations.vessel_movement_hours", self.operations.vessel_movement_hours),
            ("propulsion.pump_power_cost", self.propulsion.pump_power_cost),
            ("tank_storage.cost_per_kg", self.tank_storage.cost_per_kg),
            (
                "tank_storage.cooling_energy_kwh_per_kg",
                self.tank_storage.cooling_energy_kwh_per_kg,
            ),
            (
                "shore_supply.loading_time_fixed_hours",
                self.shore_supply.loading_time_fixed_hours,
            ),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                errors.push(format!("{name} must be non-negative, got {value}"));
            }
        }

        let efficiency = self.propulsion.pump_efficiency;
        if !(efficiency > 0.0 && efficiency <= 1.0) {
            errors.push(format!(
                "propulsion.pump_efficiency must be in (0, 1], got {efficiency}"
            ));
        }

        if self.time_period.end_year < self.time_period.start_year {
            errors.push(format!(
                "time_period.end_year ({}) must not precede start_year ({})",
                self.time_period.end_year, self.time_period.start_year
            ));
        }

        if self.shuttle.available_sizes.is_empty() {
            errors.push("shuttle.available_sizes must not be empty".to_string());
        }
        if self.shuttle.available_sizes.iter().any(|s| *s <= 0.0) {
            errors.push("shuttle.available_sizes must all be positive".to_string());
        }
        if self.pumps.available_flow_rates.is_empty() {
            errors.push("pumps.available_flow_rates must not be empty".to_string());
        }
        if self.pumps.available_flow_rates.iter().any(|p| *p <= 0.0) {
            errors.push("pumps.available_flow_rates must all be positive".to_string());
        }
        if self.shuttle.mcr_map.len() < 2 {
            errors.push(format!(
                "shuttle.mcr_map needs at least two points, got {}",
                self.shuttle.mcr_map.len()
            ));
        }
        if self
            .shuttle
            .mcr_map
            .iter()
            .any(|(size, mcr)| *size <= 0.0 || *mcr <= 0.0)
        {
            errors.push("shuttle.mcr_map sizes and ratings must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(BunkerError::InvalidParameters(errors))
        }
    }
}

/// Map a case identifier onto its configuration file stem.
pub fn resolve_case_alias(case_id: &str) -> &str {
    CASE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == case_id)
        .map(|(_, stem)| *stem)
        .unwrap_or(case_id)
}

fn read_toml(path: &Path) -> BunkerResult<toml::Value> {
    let text = fs::read_to_string(path).map_err(|source| BunkerError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Recursively merge `overlay` into `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Parameters::default().validate().unwrap();
    }

    #[test]
    fn project_years_spans_inclusive_window() {
        assert_eq!(Parameters::default().project_years(), 21);
    }

    #[test]
    fn validation_aggregates_all_errors() {
        let mut params = Parameters::default();
        params.economy.discount_rate = 1.5;
        params.shuttle.mcr_map.truncate(1);
        params.pumps.available_flow_rates.clear();

        let err = params.validate().unwrap_err();
        match err {
            BunkerError::InvalidParameters(errors) => {
                assert_eq!(errors.len(), 3, "{errors:?}");
                assert!(errors.iter().any(|e| e.contains("discount_rate")));
                assert!(errors.iter().any(|e| e.contains("mcr_map")));
                assert!(errors.iter().any(|e| e.contains("available_flow_rates")));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn partial_document_falls_back_to_defaults() {
        let params = Parameters::from_toml_str(
            r#"
            case_id = "case_2"

            [operations]
            has_storage_at_busan = false
            travel_time_hours = 3.93
            "#,
        )
        .unwrap();
        assert_eq!(params.topology(), Topology::RemoteSupply);
        assert_eq!(params.operations.setup_time_hours, 2.0);
        assert_eq!(params.economy, EconomyParameters::default());
    }

    #[test]
    fn merge_replaces_scalars_and_keeps_siblings() {
        let mut base: toml::Value = toml::from_str(
            r#"
            [economy]
            fuel_price = 700.0
            discount_rate = 0.0
            "#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
            [economy]
            fuel_price = 600.0
            "#,
        )
        .unwrap();
        merge_toml(&mut base, overlay);
        assert_eq!(base["economy"]["fuel_price"].as_float(), Some(600.0));
        assert_eq!(base["economy"]["discount_rate"].as_float(), Some(0.0));
    }

    #[test]
    fn aliases_resolve_remote_cases() {
        assert_eq!(resolve_case_alias("case_2"), "case_2_ulsan");
        assert_eq!(resolve_case_alias("case_3"), "case_3_yeosu");
        assert_eq!(resolve_case_alias("case_1"), "case_1");
    }

    #[test]
    fn topology_branches_are_consistent() {
        let c1 = Topology::PortStorage;
        let c2 = Topology::RemoteSupply;
        assert_eq!(c1.travel_factor(), 1.0);
        assert_eq!(c2.travel_factor(), 2.0);
        assert_eq!(c1.pumping_volume(5000.0, 2500.0), 5000.0);
        assert_eq!(c2.pumping_volume(5000.0, 25000.0), 25000.0);
        assert_eq!(c2.delivery_volume(5000.0, 25000.0), 25000.0);
    }
}
