use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use margin_oracle::config::{Config, ConfigOverrides};
use margin_oracle::engine::evaluator::evaluate_proposal;
use margin_oracle::engine::resolver::resolve_target;
use margin_oracle::engine::sweep::sweep_rates;
use margin_oracle::engine::whatif::{simulate_whatif, WhatIfResult};
use margin_oracle::engine::{Proposal, Target};
use margin_oracle::inputs::{CostInputs, ParameterKey, SimulationInputs};
use margin_oracle::output::csv::{proposals_to_csv, target_to_csv};
use margin_oracle::output::json::render_json;
use margin_oracle::output::table::{
    render_proposal_table, render_sweep_table, render_target_table, render_whatif_table,
};
use margin_oracle::server::run_server;
use tracing::warn;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "margin-oracle",
    about = "Target rate and margin simulation for profitability governance"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(flatten)]
    inputs: InputArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct InputArgs {
    #[arg(long)]
    salary: Option<f64>,
    #[arg(long = "target-margin")]
    target_margin_pct: Option<f64>,
    #[arg(long = "min-margin")]
    min_margin_pct: Option<f64>,
    #[arg(long = "discount")]
    discount_pct: Option<f64>,
    #[arg(long = "vacation-days")]
    forced_vacation_days: Option<f64>,
    #[arg(long = "employer-rate")]
    employer_rate_pct: Option<f64>,
    #[arg(long = "indirect-costs")]
    indirect_costs_annual: Option<f64>,
    #[arg(long = "billable-hours")]
    billable_hours_per_year: Option<u32>,
    #[arg(long = "business-unit")]
    business_unit: Option<String>,
}

impl From<&InputArgs> for ConfigOverrides {
    fn from(value: &InputArgs) -> Self {
        Self {
            employer_rate_pct: value.employer_rate_pct,
            indirect_costs_annual: value.indirect_costs_annual,
            billable_hours_per_year: value.billable_hours_per_year,
            target_margin_pct: value.target_margin_pct,
            min_margin_pct: value.min_margin_pct,
            discount_pct: value.discount_pct,
            forced_vacation_days: value.forced_vacation_days,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    Target,
    Propose {
        #[arg(long)]
        rate: f64,
    },
    Sweep {
        #[arg(long)]
        from: f64,
        #[arg(long)]
        to: f64,
        #[arg(long)]
        step: Option<f64>,
    },
    Whatif {
        #[arg(long = "discount")]
        discount_pct: Option<f64>,
        #[arg(long = "vacation-days")]
        forced_vacation_days: Option<f64>,
        #[arg(long = "employer-rate")]
        employer_rate_pct: Option<f64>,
        #[arg(long = "indirect-costs")]
        indirect_costs_annual: Option<f64>,
        #[arg(long = "billable-hours")]
        billable_hours_per_year: Option<f64>,
        #[arg(long = "target-margin")]
        target_margin_pct: Option<f64>,
        #[arg(long = "min-margin")]
        min_margin_pct: Option<f64>,
        #[arg(long = "salary")]
        annual_salary: Option<f64>,
    },
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3001)]
        port: u16,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides::from(&cli.inputs));

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }
    if let Commands::Serve { host, port } = &cli.command {
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, addr).await;
    }

    let auth = config.authorization_context();
    if !auth.may_submit(cli.inputs.business_unit.as_deref()) {
        return Err(anyhow!(
            "actor is not entitled to business unit {}",
            cli.inputs.business_unit.as_deref().unwrap_or("<none>")
        ));
    }

    let annual_salary = cli
        .inputs
        .salary
        .ok_or_else(|| anyhow!("--salary is required for this command"))?;
    let inputs = SimulationInputs {
        globals: config.global_parameters(),
        policy: config.default_policy(),
        cost: CostInputs { annual_salary },
    };

    match &cli.command {
        Commands::Target => {
            let target = resolve_target(&inputs.globals, &inputs.policy, &inputs.cost)?;
            print_target(&target, cli.output)?;
        }
        Commands::Propose { rate } => {
            let target = resolve_target(&inputs.globals, &inputs.policy, &inputs.cost)?;
            let proposal = evaluate_proposal(&target, *rate)?;
            print_proposal(&target, &proposal, cli.output)?;
        }
        Commands::Sweep { from, to, step } => {
            let target = resolve_target(&inputs.globals, &inputs.policy, &inputs.cost)?;
            let step = step.unwrap_or(config.analysis.sweep_step);
            let proposals = sweep_rates(
                &target,
                *from,
                *to,
                step,
                config.analysis.max_sweep_rungs,
            )?;
            print_sweep(&proposals, cli.output)?;
        }
        Commands::Whatif {
            discount_pct,
            forced_vacation_days,
            employer_rate_pct,
            indirect_costs_annual,
            billable_hours_per_year,
            target_margin_pct,
            min_margin_pct,
            annual_salary,
        } => {
            let mut changes = Vec::new();
            if let Some(v) = discount_pct {
                changes.push((ParameterKey::DiscountPct, *v));
            }
            if let Some(v) = forced_vacation_days {
                changes.push((ParameterKey::ForcedVacationDays, *v));
            }
            if let Some(v) = employer_rate_pct {
                changes.push((ParameterKey::EmployerRatePct, *v));
            }
            if let Some(v) = indirect_costs_annual {
                changes.push((ParameterKey::IndirectCostsAnnual, *v));
            }
            if let Some(v) = billable_hours_per_year {
                changes.push((ParameterKey::BillableHoursPerYear, *v));
            }
            if let Some(v) = target_margin_pct {
                changes.push((ParameterKey::TargetMarginPct, *v));
            }
            if let Some(v) = min_margin_pct {
                changes.push((ParameterKey::MinMarginPct, *v));
            }
            if let Some(v) = annual_salary {
                changes.push((ParameterKey::AnnualSalary, *v));
            }
            if changes.is_empty() {
                return Err(anyhow!(
                    "at least one --<parameter> change is required for whatif"
                ));
            }
            let result = simulate_whatif(&inputs, &changes)?;
            print_whatif(&result, cli.output)?;
        }
        Commands::Config { .. } => {}
        Commands::Serve { .. } => unreachable!("serve command handled before dispatch"),
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &PathBuf) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn print_target(target: &Target, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_target_table(target)),
        OutputFormat::Json => println!("{}", render_json(target)?),
        OutputFormat::Csv => println!("{}", target_to_csv(target)?),
    }
    Ok(())
}

fn print_proposal(target: &Target, proposal: &Proposal, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_proposal_table(target, proposal)),
        OutputFormat::Json => println!("{}", render_json(proposal)?),
        OutputFormat::Csv => println!("{}", proposals_to_csv(std::slice::from_ref(proposal))?),
    }
    Ok(())
}

fn print_sweep(proposals: &[Proposal], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_sweep_table(proposals)),
        OutputFormat::Json => println!("{}", render_json(proposals)?),
        OutputFormat::Csv => println!("{}", proposals_to_csv(proposals)?),
    }
    Ok(())
}

fn print_whatif(result: &WhatIfResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_whatif_table(result)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => {
            warn!("CSV output for whatif not implemented, using JSON");
            println!("{}", render_json(result)?);
        }
    }
    Ok(())
}
