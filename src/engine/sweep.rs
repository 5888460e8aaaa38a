use crate::engine::evaluator::evaluate_proposal;
use crate::engine::{EngineError, Proposal, Target};

// Evaluates a ladder of proposed rates from `from` to `to` inclusive,
// stepping by `step`. `max_rungs` bounds the ladder so a degenerate
// range cannot pin a worker or exhaust memory.
pub fn sweep_rates(
    target: &Target,
    from: f64,
    to: f64,
    step: f64,
    max_rungs: usize,
) -> Result<Vec<Proposal>, EngineError> {
    if step <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "sweep step must be positive, got {step}"
        )));
    }
    if from <= 0.0 || to < from {
        return Err(EngineError::InvalidInput(format!(
            "sweep range must satisfy 0 < from <= to, got [{from}, {to}]"
        )));
    }
    if max_rungs == 0 {
        return Err(EngineError::InvalidInput(
            "sweep rung limit must be positive".to_string(),
        ));
    }

    let rungs = (((to - from) / step + 1e-9).floor() as u64).saturating_add(1);
    if rungs > max_rungs as u64 {
        return Err(EngineError::InvalidInput(format!(
            "sweep of [{from}, {to}] by {step} needs {rungs} rungs, limit is {max_rungs}"
        )));
    }

    let mut proposals = Vec::with_capacity(rungs as usize);
    for rung in 0..rungs {
        let rate = from + rung as f64 * step;
        proposals.push(evaluate_proposal(target, rate)?);
    }
    Ok(proposals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resolver::resolve_target;
    use crate::engine::RateStatus;
    use crate::inputs::{ClientMarginPolicy, CostInputs, GlobalParameters};

    fn target() -> Target {
        resolve_target(
            &GlobalParameters {
                employer_rate_pct: 65.0,
                indirect_costs_annual: 0.0,
                billable_hours_per_year: 1600,
                workday_hours: 8.0,
                version: 1,
            },
            &ClientMarginPolicy {
                target_margin_pct: 25.0,
                min_margin_pct: 15.0,
                discount_pct: 0.0,
                forced_vacation_days: 0.0,
            },
            &CostInputs {
                annual_salary: 80_000.0,
            },
        )
        .expect("resolve failed")
    }

    #[test]
    fn sweep_covers_inclusive_range() {
        let proposals = sweep_rates(&target(), 100.0, 120.0, 5.0, 10_000).expect("sweep failed");
        assert_eq!(proposals.len(), 5);
        assert_eq!(proposals[0].rate, 100.0);
        assert_eq!(proposals[4].rate, 120.0);
    }

    #[test]
    fn sweep_crosses_classification_bands() {
        // hourly cost 82.5: compliant from 110, excellent from ~117.86
        let proposals = sweep_rates(&target(), 105.0, 120.0, 5.0, 10_000).expect("sweep failed");
        assert_eq!(proposals[0].status, RateStatus::BelowObjective);
        assert_eq!(proposals[1].status, RateStatus::Compliant);
        assert_eq!(proposals[3].status, RateStatus::Excellent);
    }

    #[test]
    fn rejects_degenerate_ranges() {
        assert!(sweep_rates(&target(), 100.0, 90.0, 5.0, 10_000).is_err());
        assert!(sweep_rates(&target(), 100.0, 120.0, 0.0, 10_000).is_err());
        assert!(sweep_rates(&target(), 0.0, 120.0, 5.0, 10_000).is_err());
    }

    #[test]
    fn rejects_ladders_over_the_rung_limit() {
        // 1e9 / 1e-3 rungs would otherwise iterate ~1e12 times
        let result = sweep_rates(&target(), 1.0, 1e9, 1e-3, 10_000);
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));

        let result = sweep_rates(&target(), 100.0, 120.0, 5.0, 4);
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
        assert!(sweep_rates(&target(), 100.0, 120.0, 5.0, 5).is_ok());
    }
}
