use anyhow::Result;

use crate::engine::{Proposal, Target};

pub fn target_to_csv(target: &Target) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "hourly_cost",
        "target_rate_before_discount",
        "target_rate_after_discount",
        "target_margin_pct",
        "min_margin_pct",
        "discount_pct",
        "forced_vacation_days",
        "within_objective",
        "globals_version",
    ])?;
    writer.write_record([
        format!("{:.4}", target.hourly_cost),
        format!("{:.4}", target.target_rate_before_discount),
        format!("{:.4}", target.target_rate_after_discount),
        format!("{:.2}", target.target_margin_pct),
        format!("{:.2}", target.min_margin_pct),
        format!("{:.2}", target.discount_pct),
        format!("{}", target.forced_vacation_days),
        target.is_within_objective.to_string(),
        target.globals.version.to_string(),
    ])?;
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn proposals_to_csv(proposals: &[Proposal]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "rate",
        "margin_pct",
        "margin_per_hour",
        "diff_vs_target",
        "discount_delta_pct",
        "premium_vs_target_per_hour",
        "status",
    ])?;
    for proposal in proposals {
        writer.write_record([
            format!("{:.4}", proposal.rate),
            format!("{:.4}", proposal.margin_pct),
            format!("{:.4}", proposal.margin_per_hour),
            format!("{:.4}", proposal.diff_vs_target),
            format!("{:.4}", proposal.discount_delta_pct),
            format!("{:.4}", proposal.premium_vs_target_per_hour),
            proposal.status.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluator::evaluate_proposal;
    use crate::engine::resolver::resolve_target;
    use crate::inputs::{ClientMarginPolicy, CostInputs, GlobalParameters};

    #[test]
    fn proposals_csv_has_header_and_rows() {
        let target = resolve_target(
            &GlobalParameters::default(),
            &ClientMarginPolicy::default(),
            &CostInputs {
                annual_salary: 80_000.0,
            },
        )
        .expect("resolve failed");
        let proposal = evaluate_proposal(&target, 120.0).expect("evaluate failed");
        let rendered = proposals_to_csv(&[proposal]).expect("csv failed");
        let mut lines = rendered.lines();
        assert!(lines
            .next()
            .expect("missing header")
            .starts_with("rate,margin_pct"));
        assert_eq!(lines.count(), 1);
    }
}
