use serde::{Deserialize, Serialize};

use crate::engine::resolver::resolve_target;
use crate::engine::{EngineError, Target};
use crate::inputs::{ParameterKey, SimulationInputs};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterChange {
    pub parameter: ParameterKey,
    pub from: f64,
    pub to: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfResult {
    pub changes_applied: Vec<ParameterChange>,
    pub before: Target,
    pub after: Target,
    // delta of the after-discount target rate, currency per hour
    pub rate_delta_per_hour: f64,
    pub hourly_cost_delta: f64,
    pub objective_gained: bool,
    pub objective_lost: bool,
}

// The input bundle is cloned, never mutated.
pub fn simulate_whatif(
    inputs: &SimulationInputs,
    target_changes: &[(ParameterKey, f64)],
) -> Result<WhatIfResult, EngineError> {
    let before = resolve_target(&inputs.globals, &inputs.policy, &inputs.cost)?;

    let mut changed = inputs.clone();
    let mut changes_applied = Vec::new();
    for (parameter, to) in target_changes {
        let from = changed.numeric_parameter(parameter);
        if changed.apply_numeric_change(parameter, *to) {
            changes_applied.push(ParameterChange {
                parameter: parameter.clone(),
                from,
                to: *to,
            });
        }
    }

    let after = resolve_target(&changed.globals, &changed.policy, &changed.cost)?;
    Ok(WhatIfResult {
        rate_delta_per_hour: after.target_rate_after_discount - before.target_rate_after_discount,
        hourly_cost_delta: after.hourly_cost - before.hourly_cost,
        objective_gained: !before.is_within_objective && after.is_within_objective,
        objective_lost: before.is_within_objective && !after.is_within_objective,
        changes_applied,
        before,
        after,
    })
}
