use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::engine::whatif::WhatIfResult;
use crate::engine::{Proposal, RateStatus, Target};
use crate::output::format::{
    format_percent, format_rate, format_signed_currency, format_signed_percent,
};

pub fn render_target_table(target: &Target) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![
        "Hourly cost".to_string(),
        format_rate(target.hourly_cost),
    ]);
    table.add_row(vec![
        "Target rate (gross)".to_string(),
        format_rate(target.target_rate_before_discount),
    ]);
    table.add_row(vec![
        "Target rate (after discount)".to_string(),
        format_rate(target.target_rate_after_discount),
    ]);
    table.add_row(vec![
        "Target margin".to_string(),
        format_percent(target.target_margin_pct),
    ]);
    table.add_row(vec![
        "Min margin".to_string(),
        format_percent(target.min_margin_pct),
    ]);
    table.add_row(vec![
        "Discount".to_string(),
        format_percent(target.discount_pct),
    ]);
    table.add_row(vec![
        "Forced vacation days".to_string(),
        format!("{}", target.forced_vacation_days),
    ]);
    table.add_row(Row::from(vec![
        Cell::new("Within objective"),
        objective_cell(target.is_within_objective),
    ]));
    table.to_string()
}

pub fn render_proposal_table(target: &Target, proposal: &Proposal) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Rate",
        "Margin",
        "Margin/h",
        "vs Target",
        "Discount delta",
        "Premium/h",
        "Status",
    ]);
    table.add_row(proposal_row(proposal));

    let mut out = table.to_string();
    out.push_str(&format!(
        "\nTarget: {} gross, {} after discount (cost {})",
        format_rate(target.target_rate_before_discount),
        format_rate(target.target_rate_after_discount),
        format_rate(target.hourly_cost)
    ));
    out
}

pub fn render_sweep_table(proposals: &[Proposal]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Rate",
        "Margin",
        "Margin/h",
        "vs Target",
        "Discount delta",
        "Premium/h",
        "Status",
    ]);
    for proposal in proposals {
        table.add_row(proposal_row(proposal));
    }
    table.to_string()
}

pub fn render_whatif_table(result: &WhatIfResult) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Parameter", "From", "To"]);
    for change in &result.changes_applied {
        table.add_row(vec![
            change.parameter.to_string(),
            format!("{}", change.from),
            format!("{}", change.to),
        ]);
    }

    let mut out = table.to_string();
    out.push_str(&format!(
        "\nTarget rate after discount: {} -> {} ({}/h)\nHourly cost: {} -> {}\nWithin objective: {} -> {}",
        format_rate(result.before.target_rate_after_discount),
        format_rate(result.after.target_rate_after_discount),
        format_signed_currency(result.rate_delta_per_hour),
        format_rate(result.before.hourly_cost),
        format_rate(result.after.hourly_cost),
        yes_no(result.before.is_within_objective),
        yes_no(result.after.is_within_objective),
    ));
    if result.objective_gained {
        out.push_str("\nObjective GAINED");
    }
    if result.objective_lost {
        out.push_str("\nObjective LOST");
    }
    out
}

fn proposal_row(proposal: &Proposal) -> Row {
    Row::from(vec![
        Cell::new(format_rate(proposal.rate)),
        Cell::new(format_percent(proposal.margin_pct)),
        Cell::new(format_signed_currency(proposal.margin_per_hour)),
        Cell::new(format_signed_percent(proposal.diff_vs_target)),
        Cell::new(format_signed_percent(proposal.discount_delta_pct)),
        Cell::new(format_signed_currency(proposal.premium_vs_target_per_hour)),
        status_cell(proposal.status),
    ])
}

fn status_cell(status: RateStatus) -> Cell {
    let cell = Cell::new(status.to_string().to_uppercase());
    match status {
        RateStatus::Excellent => cell.fg(Color::Green),
        RateStatus::Compliant => cell.fg(Color::Yellow),
        RateStatus::BelowObjective => cell.fg(Color::Red),
    }
}

fn objective_cell(within: bool) -> Cell {
    if within {
        Cell::new("YES").fg(Color::Green)
    } else {
        Cell::new("NO").fg(Color::Red)
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "YES"
    } else {
        "NO"
    }
}
