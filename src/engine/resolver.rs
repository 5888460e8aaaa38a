use crate::engine::{margin_at, EngineError, Target};
use crate::inputs::{ClientMarginPolicy, CostInputs, GlobalParameters};

// Deterministic: identical inputs always produce bit-identical output.
pub fn resolve_target(
    globals: &GlobalParameters,
    policy: &ClientMarginPolicy,
    cost: &CostInputs,
) -> Result<Target, EngineError> {
    validate(globals, policy, cost)?;

    // Vacation days convert to hours through the standard workday length
    // and come straight off the annual billable hours.
    let effective_hours = f64::from(globals.billable_hours_per_year)
        - policy.forced_vacation_days * globals.workday_hours;
    if effective_hours <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "forced vacation days ({}) exceed the billable year ({} h)",
            policy.forced_vacation_days, globals.billable_hours_per_year
        )));
    }

    // Indirect costs are expressed per resource, so they are added once.
    let loaded_annual_cost = cost.annual_salary * (1.0 + globals.employer_rate_pct / 100.0)
        + globals.indirect_costs_annual;
    let hourly_cost = loaded_annual_cost / effective_hours;

    let target_rate_before_discount = hourly_cost * (1.0 + policy.target_margin_pct / 100.0);
    let target_rate_after_discount =
        target_rate_before_discount * (1.0 - policy.discount_pct / 100.0);
    let is_within_objective =
        margin_at(target_rate_after_discount, hourly_cost) >= policy.min_margin_pct;

    Ok(Target {
        hourly_cost,
        target_rate_before_discount,
        target_rate_after_discount,
        target_margin_pct: policy.target_margin_pct,
        min_margin_pct: policy.min_margin_pct,
        discount_pct: policy.discount_pct,
        forced_vacation_days: policy.forced_vacation_days,
        globals: globals.clone(),
        is_within_objective,
    })
}

fn validate(
    globals: &GlobalParameters,
    policy: &ClientMarginPolicy,
    cost: &CostInputs,
) -> Result<(), EngineError> {
    if cost.annual_salary <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "annual salary must be positive, got {}",
            cost.annual_salary
        )));
    }
    if globals.billable_hours_per_year == 0 {
        return Err(EngineError::InvalidInput(
            "billable hours per year must be positive".to_string(),
        ));
    }
    if globals.workday_hours <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "workday hours must be positive, got {}",
            globals.workday_hours
        )));
    }
    if globals.employer_rate_pct < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "employer rate must be non-negative, got {}",
            globals.employer_rate_pct
        )));
    }
    if globals.indirect_costs_annual < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "indirect costs must be non-negative, got {}",
            globals.indirect_costs_annual
        )));
    }
    for (label, value) in [
        ("target margin", policy.target_margin_pct),
        ("min margin", policy.min_margin_pct),
        ("discount", policy.discount_pct),
    ] {
        if !(0.0..=100.0).contains(&value) {
            return Err(EngineError::InvalidInput(format!(
                "{label} must be within [0, 100], got {value}"
            )));
        }
    }
    if policy.min_margin_pct > policy.target_margin_pct {
        return Err(EngineError::InvalidInput(format!(
            "min margin ({}) exceeds target margin ({})",
            policy.min_margin_pct, policy.target_margin_pct
        )));
    }
    if policy.forced_vacation_days < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "forced vacation days must be non-negative, got {}",
            policy.forced_vacation_days
        )));
    }
    Ok(())
}
