//! Unit costs of shuttles, pumps, fuel and port storage.
//!
//! All monetary values are in USD; conversion to millions happens only when
//! result rows are built.

use crate::parameters::Parameters;

/// Equivalent-annual-cost multiplier, `(1 - (1 + r)^-n) / r`.
///
/// Tends to `n` as `r → 0`; a zero rate returns `n` exactly.
pub fn annuity_factor(rate: f64, years: usize) -> f64 {
    let n = years as f64;
    if rate.abs() < 1e-12 {
        return n;
    }
    (1.0 - (1.0 + rate).powf(-n)) / rate
}

/// NPV weight of costs incurred `offset` years after the first planning year.
pub fn discount_factor(rate: f64, offset: i32) -> f64 {
    (1.0 + rate).powi(-offset)
}

/// Per-unit costs of one (shuttle, pump) candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCosts {
    pub mcr_kw: f64,
    /// Per shuttle added.
    pub shuttle_capex: f64,
    /// Per shuttle in service per year.
    pub shuttle_fixed_opex: f64,
    /// Bunkering equipment and cargo pump, per shuttle added.
    pub bunkering_capex: f64,
    pub bunkering_fixed_opex: f64,
    pub shuttle_fuel_cost_per_cycle: f64,
    /// Per call (C1) or per trip (C2/C3).
    pub pump_fuel_cost_per_event: f64,
    pub tank_enabled: bool,
    /// Per tank added.
    pub tank_capex: f64,
    /// Per tank in service per year.
    pub tank_fixed_opex: f64,
    pub tank_variable_opex: f64,
    pub tank_volume_m3: f64,
}

/// Cost formulas evaluated against one parameter bundle.
#[derive(Debug, Clone, Copy)]
pub struct CostCalculator<'a> {
    params: &'a Parameters,
}

impl<'a> CostCalculator<'a> {
    pub fn new(params: &'a Parameters) -> Self {
        Self { params }
    }

    /// `C_ref · (S / S_ref)^α`
    pub fn shuttle_capex(&self, shuttle_size: f64) -> f64 {
        let shuttle = &self.params.shuttle;
        shuttle.ref_capex * (shuttle_size / shuttle.ref_size).powf(shuttle.capex_scaling_exponent)
    }

    pub fn shuttle_fixed_opex(&self, shuttle_size: f64) -> f64 {
        self.params.shuttle.fixed_opex_ratio * self.shuttle_capex(shuttle_size)
    }

    /// Bunkering equipment carried by the shuttle (hoses, arms, ESD).
    pub fn equipment_cost(&self, shuttle_size: f64) -> f64 {
        self.params.shuttle.equipment_ratio * self.shuttle_capex(shuttle_size)
    }

    /// Hydraulic power `ΔP · Q / η` in kW, with `ΔP` in bar and `Q` in m³/h.
    pub fn pump_power_kw(&self, pump_size: f64) -> f64 {
        let propulsion = &self.params.propulsion;
        let delta_p_pa = propulsion.pump_delta_pressure * 1e5;
        let flow_m3s = pump_size / 3600.0;
        delta_p_pa * flow_m3s / propulsion.pump_efficiency / 1000.0
    }

    pub fn pump_capex(&self, pump_size: f64) -> f64 {
        self.pump_power_kw(pump_size) * self.params.propulsion.pump_power_cost
    }

    pub fn bunkering_capex(&self, shuttle_size: f64, pump_size: f64) -> f64 {
        self.equipment_cost(shuttle_size) + self.pump_capex(pump_size)
    }

    pub fn bunkering_fixed_opex(&self, shuttle_size: f64, pump_size: f64) -> f64 {
        self.params.bunkering.fixed_opex_ratio * self.bunkering_capex(shuttle_size, pump_size)
    }

    /// Propulsion fuel per cycle (ton), `MCR · SFOC · T · travel_factor / 10⁶`.
    pub fn shuttle_fuel_per_cycle(&self, mcr_kw: f64) -> f64 {
        let travel = self.params.operations.travel_time_hours;
        let factor = self.params.topology().travel_factor();
        mcr_kw * self.params.propulsion.sfoc * travel * factor / 1e6
    }

    /// Pump fuel per bunkering event (ton).
    ///
    /// The pumping time is `V/P` per call on C1 and `S/P` per trip on C2/C3.
    pub fn pump_fuel_per_event(&self, shuttle_size: f64, pump_size: f64) -> f64 {
        let volume = self
            .params
            .topology()
            .pumping_volume(self.params.bunkering.bunker_volume_per_call, shuttle_size);
        let pumping_hours = volume / pump_size;
        self.pump_power_kw(pump_size) * pumping_hours * self.params.propulsion.sfoc / 1e6
    }

    pub fn fuel_cost(&self, tons: f64) -> f64 {
        tons * self.params.economy.fuel_price
    }

    pub fn tank_capex(&self) -> f64 {
        let tank = &self.params.tank_storage;
        tank.size_tons * 1000.0 * tank.cost_per_kg
    }

    pub fn tank_fixed_opex(&self) -> f64 {
        self.params.tank_storage.fixed_opex_ratio * self.tank_capex()
    }

    /// Yearly refrigeration electricity of one full tank.
    pub fn tank_variable_opex(&self) -> f64 {
        let tank = &self.params.tank_storage;
        tank.size_tons * 1000.0 * tank.cooling_energy_kwh_per_kg * self.params.economy.electricity_price
    }

    pub fn tank_volume_m3(&self) -> f64 {
        self.params.tank_storage.size_tons / self.params.ammonia.density_storage
    }

    pub fn annuity_factor(&self) -> f64 {
        annuity_factor(
            self.params.economy.annualization_interest_rate,
            self.params.project_years(),
        )
    }

    /// Equivalent uniform annual cost of a present value.
    pub fn annualize(&self, value: f64) -> f64 {
        value / self.annuity_factor()
    }

    pub fn discount_factor(&self, year: i32) -> f64 {
        discount_factor(
            self.params.economy.discount_rate,
            year - self.params.time_period.start_year,
        )
    }

    /// Every unit cost the planner needs for one candidate.
    pub fn unit_costs(&self, shuttle_size: f64, pump_size: f64, mcr_kw: f64) -> UnitCosts {
        let tank_enabled = self.params.tank_storage.enabled;
        let tank = |value: f64| if tank_enabled { value } else { 0.0 };
        UnitCosts {
            mcr_kw,
            shuttle_capex: self.shuttle_capex(shuttle_size),
            shuttle_fixed_opex: self.shuttle_fixed_opex(shuttle_size),
            bunkering_capex: self.bunkering_capex(shuttle_size, pump_size),
            bunkering_fixed_opex: self.bunkering_fixed_opex(shuttle_size, pump_size),
            shuttle_fuel_cost_per_cycle: self.fuel_cost(self.shuttle_fuel_per_cycle(mcr_kw)),
            pump_fuel_cost_per_event: self
                .fuel_cost(self.pump_fuel_per_event(shuttle_size, pump_size)),
            tank_enabled,
            tank_capex: tank(self.tank_capex()),
            tank_fixed_opex: tank(self.tank_fixed_opex()),
            tank_variable_opex: tank(self.tank_variable_opex()),
            tank_volume_m3: self.tank_volume_m3(),
        }
    }
}
