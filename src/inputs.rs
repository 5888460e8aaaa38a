use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// `version` identifies the parameter set a result was computed under so
// callers can tell stale simulations apart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalParameters {
    pub employer_rate_pct: f64,
    pub indirect_costs_annual: f64,
    pub billable_hours_per_year: u32,
    pub workday_hours: f64,
    pub version: u32,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            employer_rate_pct: 45.0,
            indirect_costs_annual: 0.0,
            billable_hours_per_year: 1600,
            workday_hours: 8.0,
            version: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientMarginPolicy {
    pub target_margin_pct: f64,
    pub min_margin_pct: f64,
    pub discount_pct: f64,
    pub forced_vacation_days: f64,
}

impl Default for ClientMarginPolicy {
    fn default() -> Self {
        Self {
            target_margin_pct: 30.0,
            min_margin_pct: 20.0,
            discount_pct: 0.0,
            forced_vacation_days: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostInputs {
    pub annual_salary: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationInputs {
    pub globals: GlobalParameters,
    pub policy: ClientMarginPolicy,
    pub cost: CostInputs,
}

impl SimulationInputs {
    pub fn numeric_parameter(&self, key: &ParameterKey) -> f64 {
        match key {
            ParameterKey::EmployerRatePct => self.globals.employer_rate_pct,
            ParameterKey::IndirectCostsAnnual => self.globals.indirect_costs_annual,
            ParameterKey::BillableHoursPerYear => f64::from(self.globals.billable_hours_per_year),
            ParameterKey::AnnualSalary => self.cost.annual_salary,
            ParameterKey::TargetMarginPct => self.policy.target_margin_pct,
            ParameterKey::MinMarginPct => self.policy.min_margin_pct,
            ParameterKey::DiscountPct => self.policy.discount_pct,
            ParameterKey::ForcedVacationDays => self.policy.forced_vacation_days,
        }
    }

    pub fn apply_numeric_change(&mut self, key: &ParameterKey, to: f64) -> bool {
        match key {
            ParameterKey::EmployerRatePct => self.globals.employer_rate_pct = to,
            ParameterKey::IndirectCostsAnnual => self.globals.indirect_costs_annual = to,
            ParameterKey::BillableHoursPerYear => {
                // whole hours only, so `changes_applied` never misreports
                if to < 0.0 || to > f64::from(u32::MAX) || to.fract() != 0.0 {
                    return false;
                }
                self.globals.billable_hours_per_year = to as u32;
            }
            ParameterKey::AnnualSalary => self.cost.annual_salary = to,
            ParameterKey::TargetMarginPct => self.policy.target_margin_pct = to,
            ParameterKey::MinMarginPct => self.policy.min_margin_pct = to,
            ParameterKey::DiscountPct => self.policy.discount_pct = to,
            ParameterKey::ForcedVacationDays => self.policy.forced_vacation_days = to,
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKey {
    EmployerRatePct,
    IndirectCostsAnnual,
    BillableHoursPerYear,
    AnnualSalary,
    TargetMarginPct,
    MinMarginPct,
    DiscountPct,
    ForcedVacationDays,
}

impl Display for ParameterKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::EmployerRatePct => "employer_rate_pct",
            Self::IndirectCostsAnnual => "indirect_costs_annual",
            Self::BillableHoursPerYear => "billable_hours_per_year",
            Self::AnnualSalary => "annual_salary",
            Self::TargetMarginPct => "target_margin_pct",
            Self::MinMarginPct => "min_margin_pct",
            Self::DiscountPct => "discount_pct",
            Self::ForcedVacationDays => "forced_vacation_days",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Error)]
#[error("unknown parameter key: {0}")]
pub struct ParameterParseError(pub String);

impl FromStr for ParameterKey {
    type Err = ParameterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "employer_rate_pct" | "employer_rate" => Ok(Self::EmployerRatePct),
            "indirect_costs_annual" | "indirect_costs" => Ok(Self::IndirectCostsAnnual),
            "billable_hours_per_year" | "billable_hours" => Ok(Self::BillableHoursPerYear),
            "annual_salary" | "salary" => Ok(Self::AnnualSalary),
            "target_margin_pct" | "target_margin" => Ok(Self::TargetMarginPct),
            "min_margin_pct" | "min_margin" => Ok(Self::MinMarginPct),
            "discount_pct" | "discount" => Ok(Self::DiscountPct),
            "forced_vacation_days" | "vacation_days" => Ok(Self::ForcedVacationDays),
            _ => Err(ParameterParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_parameter_aliases() {
        assert_eq!(
            ParameterKey::from_str("discount").expect("parse failed"),
            ParameterKey::DiscountPct
        );
        assert_eq!(
            ParameterKey::from_str("vacation-days").expect("parse failed"),
            ParameterKey::ForcedVacationDays
        );
        assert!(ParameterKey::from_str("headcount").is_err());
    }

    #[test]
    fn applies_numeric_changes() {
        let mut inputs = SimulationInputs {
            globals: GlobalParameters::default(),
            policy: ClientMarginPolicy::default(),
            cost: CostInputs {
                annual_salary: 80_000.0,
            },
        };
        assert!(inputs.apply_numeric_change(&ParameterKey::DiscountPct, 12.5));
        assert_eq!(inputs.policy.discount_pct, 12.5);
        assert!(!inputs.apply_numeric_change(&ParameterKey::BillableHoursPerYear, -10.0));
        assert_eq!(inputs.globals.billable_hours_per_year, 1600);
    }

    #[test]
    fn rejects_fractional_billable_hours() {
        let mut inputs = SimulationInputs {
            globals: GlobalParameters::default(),
            policy: ClientMarginPolicy::default(),
            cost: CostInputs {
                annual_salary: 80_000.0,
            },
        };
        assert!(!inputs.apply_numeric_change(&ParameterKey::BillableHoursPerYear, 1550.9));
        assert_eq!(inputs.globals.billable_hours_per_year, 1600);
        assert!(inputs.apply_numeric_change(&ParameterKey::BillableHoursPerYear, 1550.0));
        assert_eq!(inputs.globals.billable_hours_per_year, 1550);
    }
}
