use crate::engine::{margin_at, EngineError, Proposal, RateStatus, Target};

pub fn evaluate_proposal(target: &Target, proposed_rate: f64) -> Result<Proposal, EngineError> {
    if proposed_rate <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "proposed rate must be positive, got {proposed_rate}"
        )));
    }
    if target.hourly_cost <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "target hourly cost must be positive, got {}",
            target.hourly_cost
        )));
    }

    let margin_pct = margin_at(proposed_rate, target.hourly_cost);
    let diff_vs_target = margin_pct - target.target_margin_pct;
    let discount_delta_pct = (proposed_rate - target.target_rate_before_discount)
        / target.target_rate_before_discount
        * 100.0;

    Ok(Proposal {
        rate: proposed_rate,
        margin_pct,
        margin_per_hour: proposed_rate - target.hourly_cost,
        diff_vs_target,
        discount_delta_pct,
        premium_vs_target_per_hour: proposed_rate - target.target_rate_after_discount,
        status: RateStatus::classify(diff_vs_target),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resolver::resolve_target;
    use crate::inputs::{ClientMarginPolicy, CostInputs, GlobalParameters};

    const EPS: f64 = 1e-9;

    fn reference_target(discount_pct: f64) -> Target {
        let globals = GlobalParameters {
            employer_rate_pct: 65.0,
            indirect_costs_annual: 0.0,
            billable_hours_per_year: 1600,
            workday_hours: 8.0,
            version: 1,
        };
        let policy = ClientMarginPolicy {
            target_margin_pct: 25.0,
            min_margin_pct: 10.0,
            discount_pct,
            forced_vacation_days: 0.0,
        };
        resolve_target(
            &globals,
            &policy,
            &CostInputs {
                annual_salary: 80_000.0,
            },
        )
        .expect("resolve failed")
    }

    #[test]
    fn scores_reference_scenario_as_compliant() {
        let target = reference_target(0.0);
        let proposal = evaluate_proposal(&target, 110.0).expect("evaluate failed");
        assert!((proposal.margin_pct - 25.0).abs() < 1e-6);
        assert!(proposal.diff_vs_target.abs() < 1e-6);
        assert!((proposal.margin_per_hour - 27.5).abs() < EPS);
        assert_eq!(proposal.status, RateStatus::Compliant);
    }

    #[test]
    fn discount_delta_measures_distance_from_gross_target() {
        let target = reference_target(0.0);
        let proposal = evaluate_proposal(&target, 92.8125).expect("evaluate failed");
        // 92.8125 sits 10% under the gross target of 103.125
        assert!((proposal.discount_delta_pct + 10.0).abs() < EPS);
    }

    #[test]
    fn evaluating_at_discounted_target_compresses_margin() {
        let target = reference_target(10.0);
        let proposal =
            evaluate_proposal(&target, target.target_rate_after_discount).expect("evaluate failed");
        assert!(proposal.margin_pct < target.target_margin_pct);
        assert!(proposal.premium_vs_target_per_hour.abs() < EPS);
    }

    #[test]
    fn five_points_of_headroom_is_excellent() {
        let target = reference_target(0.0);
        // margin at 120 is 31.25%, 6.25 points over target
        let proposal = evaluate_proposal(&target, 120.0).expect("evaluate failed");
        assert!((proposal.diff_vs_target - 6.25).abs() < 1e-9);
        assert_eq!(proposal.status, RateStatus::Excellent);
    }

    #[test]
    fn below_cost_rate_is_below_objective() {
        let target = reference_target(0.0);
        let proposal = evaluate_proposal(&target, 60.0).expect("evaluate failed");
        assert!(proposal.margin_pct < 0.0);
        assert!(proposal.margin_per_hour < 0.0);
        assert_eq!(proposal.status, RateStatus::BelowObjective);
    }

    #[test]
    fn rejects_non_positive_rate() {
        let target = reference_target(0.0);
        assert!(matches!(
            evaluate_proposal(&target, 0.0),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            evaluate_proposal(&target, -5.0),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_non_positive_hourly_cost() {
        let mut target = reference_target(0.0);
        target.hourly_cost = 0.0;
        assert!(matches!(
            evaluate_proposal(&target, 100.0),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
