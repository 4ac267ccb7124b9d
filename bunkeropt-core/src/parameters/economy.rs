//! Economic and planning-horizon parameters.

use serde::{Deserialize, Serialize};

/// Prices and the two interest rates used by the cost model.
///
/// The NPV discount rate and the capital annualization rate are kept apart:
/// the first weights yearly cash flows in the objective, the second converts a
/// capital sum into an equivalent uniform annual charge for reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EconomyParameters {
    /// Discount rate applied to yearly costs, in [0, 1).
    ///
    /// Default: 0.0
    pub discount_rate: f64,

    /// Interest rate used for the annuity factor, in (0, 1).
    ///
    /// Default: 0.07
    pub annualization_interest_rate: f64,

    /// Marine fuel price (USD/ton).
    ///
    /// Default: 700.0
    pub fuel_price: f64,

    /// Electricity price for tank refrigeration (USD/kWh).
    ///
    /// Default: 0.0769
    pub electricity_price: f64,
}

impl Default for EconomyParameters {
    fn default() -> Self {
        Self {
            discount_rate: 0.0,
            annualization_interest_rate: 0.07,
            fuel_price: 700.0,
            electricity_price: 0.0769,
        }
    }
}

/// Planning window, inclusive at both ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimePeriodParameters {
    /// Default: 2030
    pub start_year: i32,
    /// Default: 2050
    pub end_year: i32,
}

impl TimePeriodParameters {
    /// Number of modelled years, `end - start + 1`.
    pub fn project_years(&self) -> usize {
        (self.end_year - self.start_year + 1).max(0) as usize
    }

    /// Calendar years of the planning window in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start_year..=self.end_year
    }
}

impl Default for TimePeriodParameters {
    fn default() -> Self {
        Self {
            start_year: 2030,
            end_year: 2050,
        }
    }
}
