use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::engine::evaluator::evaluate_proposal;
use crate::engine::resolver::resolve_target;
use crate::engine::sweep::sweep_rates;
use crate::engine::whatif::{simulate_whatif, WhatIfResult};
use crate::engine::{EngineError, Proposal, Target};
use crate::inputs::{CostInputs, ParameterKey, SimulationInputs};

#[derive(Clone)]
struct ApiState {
    config: Config,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

// Policy and global fields fall back to the config defaults when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
struct SimulationRequest {
    annual_salary: f64,
    target_margin_pct: Option<f64>,
    min_margin_pct: Option<f64>,
    discount_pct: Option<f64>,
    forced_vacation_days: Option<f64>,
    employer_rate_pct: Option<f64>,
    indirect_costs_annual: Option<f64>,
    billable_hours_per_year: Option<u32>,
    business_unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProposalRequest {
    #[serde(flatten)]
    simulation: SimulationRequest,
    rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct SweepRequest {
    #[serde(flatten)]
    simulation: SimulationRequest,
    from: f64,
    to: f64,
    step: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ParameterChangeInput {
    parameter: String,
    to: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct WhatIfRequest {
    #[serde(flatten)]
    simulation: SimulationRequest,
    #[serde(default)]
    changes: Vec<ParameterChangeInput>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct TargetResponse {
    target: Target,
}

#[derive(Debug, Serialize)]
struct ProposalResponse {
    target: Target,
    proposal: Proposal,
}

#[derive(Debug, Serialize)]
struct SweepResponse {
    target: Target,
    proposals: Vec<Proposal>,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let state = ApiState { config };
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/v1/target", post(target))
        .route("/v1/proposal", post(proposal))
        .route("/v1/sweep", post(sweep))
        .route("/v1/whatif", post(whatif))
        .route("/v1/config", get(show_config))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn target(
    State(state): State<ApiState>,
    Json(request): Json<SimulationRequest>,
) -> ApiResult<TargetResponse> {
    let inputs = resolve_inputs(&state, &request)?;
    let target = resolve_target(&inputs.globals, &inputs.policy, &inputs.cost)?;
    Ok(ok(TargetResponse { target }))
}

async fn proposal(
    State(state): State<ApiState>,
    Json(request): Json<ProposalRequest>,
) -> ApiResult<ProposalResponse> {
    let inputs = resolve_inputs(&state, &request.simulation)?;
    let target = resolve_target(&inputs.globals, &inputs.policy, &inputs.cost)?;
    let proposal = evaluate_proposal(&target, request.rate)?;
    Ok(ok(ProposalResponse { target, proposal }))
}

async fn sweep(
    State(state): State<ApiState>,
    Json(request): Json<SweepRequest>,
) -> ApiResult<SweepResponse> {
    let inputs = resolve_inputs(&state, &request.simulation)?;
    let target = resolve_target(&inputs.globals, &inputs.policy, &inputs.cost)?;
    let step = request.step.unwrap_or(state.config.analysis.sweep_step);
    let proposals = sweep_rates(
        &target,
        request.from,
        request.to,
        step,
        state.config.analysis.max_sweep_rungs,
    )?;
    Ok(ok(SweepResponse { target, proposals }))
}

async fn whatif(
    State(state): State<ApiState>,
    Json(request): Json<WhatIfRequest>,
) -> ApiResult<WhatIfResult> {
    let inputs = resolve_inputs(&state, &request.simulation)?;
    if request.changes.is_empty() {
        return Err(ApiError::bad_request(
            "at least one parameter change is required",
        ));
    }
    let changes = request
        .changes
        .iter()
        .map(|change| {
            ParameterKey::from_str(&change.parameter)
                .map(|parameter| (parameter, change.to))
                .map_err(|error| ApiError::bad_request(error.to_string()))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let result = simulate_whatif(&inputs, &changes)?;
    Ok(ok(result))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn resolve_inputs(
    state: &ApiState,
    request: &SimulationRequest,
) -> std::result::Result<SimulationInputs, ApiError> {
    let auth = state.config.authorization_context();
    if !auth.may_submit(request.business_unit.as_deref()) {
        return Err(ApiError::forbidden(format!(
            "actor is not entitled to business unit {}",
            request.business_unit.as_deref().unwrap_or("<none>")
        )));
    }

    let mut globals = state.config.global_parameters();
    if let Some(v) = request.employer_rate_pct {
        globals.employer_rate_pct = v;
    }
    if let Some(v) = request.indirect_costs_annual {
        globals.indirect_costs_annual = v;
    }
    if let Some(v) = request.billable_hours_per_year {
        globals.billable_hours_per_year = v;
    }

    let mut policy = state.config.default_policy();
    if let Some(v) = request.target_margin_pct {
        policy.target_margin_pct = v;
    }
    if let Some(v) = request.min_margin_pct {
        policy.min_margin_pct = v;
    }
    if let Some(v) = request.discount_pct {
        policy.discount_pct = v;
    }
    if let Some(v) = request.forced_vacation_days {
        policy.forced_vacation_days = v;
    }

    Ok(SimulationInputs {
        globals,
        policy,
        cost: CostInputs {
            annual_salary: request.annual_salary,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_for(role: &str, units: &[&str]) -> ApiState {
        let mut config = Config::default();
        config.auth.role = role.to_string();
        config.auth.business_units = units.iter().map(|u| u.to_string()).collect();
        ApiState { config }
    }

    #[test]
    fn request_overrides_config_defaults() {
        let state = state_for("admin", &[]);
        let request = SimulationRequest {
            annual_salary: 80_000.0,
            discount_pct: Some(12.0),
            billable_hours_per_year: Some(1500),
            ..SimulationRequest::default()
        };
        let inputs = resolve_inputs(&state, &request).expect("resolve failed");
        assert_eq!(inputs.policy.discount_pct, 12.0);
        assert_eq!(inputs.globals.billable_hours_per_year, 1500);
        assert_eq!(inputs.cost.annual_salary, 80_000.0);
    }

    #[test]
    fn scoped_actor_is_rejected_for_foreign_unit() {
        let state = state_for("member", &["NA-DELIVERY"]);
        let request = SimulationRequest {
            annual_salary: 80_000.0,
            business_unit: Some("EU-CONSULTING".to_string()),
            ..SimulationRequest::default()
        };
        let error = resolve_inputs(&state, &request).expect_err("expected forbidden");
        assert_eq!(error.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn oversized_sweep_request_is_rejected() {
        let state = state_for("admin", &[]);
        let request = SweepRequest {
            simulation: SimulationRequest {
                annual_salary: 80_000.0,
                ..SimulationRequest::default()
            },
            from: 1.0,
            to: 1e9,
            step: Some(1e-3),
        };
        let error = sweep(State(state), Json(request))
            .await
            .expect_err("expected bad request");
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = health().await;
        assert!(response.0.ok);
        assert_eq!(response.0.data.status, "ok");
    }
}
