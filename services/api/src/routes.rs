use crate::infra::{deserialize_date, deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use prototype_config::accounts::{
    apply_weight_adjustments, at_risk_arr, category_percentages, composite_score, csv_template,
    default_indicators, followup_queue, overall_risk_score, template_columns, CategoryPercentages,
    HealthLevel, NpsAccount, NpsAccountImporter, RenewalAccount, RenewalMetrics, RenewalOutcome,
    RiskIndicator,
};
use prototype_config::discovery::nps::NpsHubConfig;
use prototype_config::discovery::renewal::{
    calculate_risk_score, renewal_milestones, should_flag_as_risk, RenewalStage,
    RenewalTrackerConfig,
};
use prototype_config::discovery::risk::{ClientType, RiskAssessmentConfig};
use prototype_config::discovery::{
    standard_templates, transform, transform_for, AnswerMap, DiscoveryIssue, QuestionTemplate,
    ToolConfiguration, ToolKind,
};
use prototype_config::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;

#[derive(Debug, Deserialize)]
pub(crate) struct TransformRequest {
    pub(crate) tool: String,
    #[serde(default)]
    pub(crate) answers: AnswerMap,
    #[serde(default)]
    pub(crate) templates: Option<Vec<QuestionTemplate>>,
    #[serde(default)]
    pub(crate) include_issues: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TransformResponse {
    pub(crate) catalog_id: &'static str,
    pub(crate) label: &'static str,
    #[serde(flatten)]
    pub(crate) configuration: ToolConfiguration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) issues: Option<Vec<DiscoveryIssue>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NpsSummaryRequest {
    #[serde(default)]
    pub(crate) answers: AnswerMap,
    #[serde(default)]
    pub(crate) templates: Option<Vec<QuestionTemplate>>,
    pub(crate) csv: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NpsSummaryResponse {
    pub(crate) today: NaiveDate,
    pub(crate) account_count: usize,
    pub(crate) composite_score: i32,
    pub(crate) categories: CategoryPercentages,
    pub(crate) at_risk_arr: f64,
    pub(crate) flagged_accounts: Vec<String>,
    pub(crate) followups: Vec<FollowupEntry>,
    pub(crate) visible_columns: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FollowupEntry {
    pub(crate) account_id: String,
    pub(crate) account_name: String,
    pub(crate) score: u8,
    pub(crate) owner: Option<String>,
    pub(crate) due: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NpsTemplateRequest {
    #[serde(default)]
    pub(crate) answers: AnswerMap,
    #[serde(default)]
    pub(crate) templates: Option<Vec<QuestionTemplate>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RenewalSummaryRequest {
    #[serde(default)]
    pub(crate) answers: AnswerMap,
    #[serde(default)]
    pub(crate) templates: Option<Vec<QuestionTemplate>>,
    #[serde(default)]
    pub(crate) accounts: Vec<RenewalAccountInput>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RenewalAccountInput {
    pub(crate) id: String,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) arr: f64,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) contract_end: NaiveDate,
    #[serde(default)]
    pub(crate) risk_factors: Vec<String>,
    #[serde(default)]
    pub(crate) outcome: Option<String>,
    #[serde(default)]
    pub(crate) expansion_arr: Option<f64>,
    #[serde(default)]
    pub(crate) owner: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenewalSummaryResponse {
    pub(crate) today: NaiveDate,
    pub(crate) metrics: RenewalMetrics,
    pub(crate) milestones: Vec<String>,
    pub(crate) accounts: Vec<RenewalAccountView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenewalAccountView {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) days_to_renewal: i64,
    pub(crate) stage: RenewalStage,
    pub(crate) stage_label: &'static str,
    pub(crate) risk_score: u32,
    pub(crate) at_risk: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) outcome: Option<RenewalOutcome>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RiskScoreRequest {
    #[serde(default)]
    pub(crate) answers: AnswerMap,
    #[serde(default)]
    pub(crate) templates: Option<Vec<QuestionTemplate>>,
    #[serde(default)]
    pub(crate) indicators: Option<Vec<RiskIndicator>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RiskScoreResponse {
    pub(crate) client_type: ClientType,
    pub(crate) overall_risk_score: f64,
    pub(crate) health_level: HealthLevel,
    pub(crate) health_label: &'static str,
    pub(crate) exceeds_threshold: bool,
    pub(crate) indicators: Vec<RiskIndicator>,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/discovery/transform", post(transform_endpoint))
        .route("/api/v1/nps/summary", post(nps_summary_endpoint))
        .route("/api/v1/nps/template", post(nps_template_endpoint))
        .route("/api/v1/renewal/summary", post(renewal_summary_endpoint))
        .route("/api/v1/risk/score", post(risk_score_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn templates_or_standard(
    templates: Option<Vec<QuestionTemplate>>,
    kind: ToolKind,
) -> Vec<QuestionTemplate> {
    templates.unwrap_or_else(|| standard_templates(kind))
}

pub(crate) async fn transform_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<TransformRequest>,
) -> Result<Json<TransformResponse>, AppError> {
    let TransformRequest {
        tool,
        answers,
        templates,
        include_issues,
    } = payload;

    let kind: ToolKind = tool.parse()?;
    let templates = templates_or_standard(templates, kind);
    let outcome = transform_for(kind, &answers, &templates);
    let issues = include_issues
        .unwrap_or(state.reporting.report_issues)
        .then_some(outcome.issues);

    Ok(Json(TransformResponse {
        catalog_id: kind.catalog_id(),
        label: kind.label(),
        configuration: outcome.configuration,
        issues,
    }))
}

pub(crate) fn summarize_nps(
    accounts: &[NpsAccount],
    config: &NpsHubConfig,
    today: NaiveDate,
) -> NpsSummaryResponse {
    let followups = followup_queue(accounts)
        .into_iter()
        .map(|account| FollowupEntry {
            account_id: account.id.clone(),
            account_name: account.name.clone(),
            score: account.score,
            owner: account.owner.clone(),
            due: account.followup_due,
        })
        .collect();

    NpsSummaryResponse {
        today,
        account_count: accounts.len(),
        composite_score: composite_score(accounts),
        categories: category_percentages(accounts),
        at_risk_arr: at_risk_arr(accounts, today),
        flagged_accounts: accounts
            .iter()
            .filter(|account| account.flagged)
            .map(|account| account.name.clone())
            .collect(),
        followups,
        visible_columns: template_columns(config),
    }
}

pub(crate) async fn nps_summary_endpoint(
    Json(payload): Json<NpsSummaryRequest>,
) -> Result<Json<NpsSummaryResponse>, AppError> {
    let NpsSummaryRequest {
        answers,
        templates,
        csv,
        today,
    } = payload;

    let templates = templates_or_standard(templates, ToolKind::Nps);
    let config: NpsHubConfig = transform(&answers, &templates);
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let accounts =
        NpsAccountImporter::from_reader(Cursor::new(csv.into_bytes()), &config, today)?;

    Ok(Json(summarize_nps(&accounts, &config, today)))
}

pub(crate) async fn nps_template_endpoint(
    Json(payload): Json<NpsTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let templates = templates_or_standard(payload.templates, ToolKind::Nps);
    let config: NpsHubConfig = transform(&payload.answers, &templates);
    let today = payload.today.unwrap_or_else(|| Local::now().date_naive());
    let body = csv_template(&config, today)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        body,
    ))
}

pub(crate) fn build_renewal_accounts(
    inputs: Vec<RenewalAccountInput>,
    config: &RenewalTrackerConfig,
    today: NaiveDate,
) -> Vec<RenewalAccount> {
    inputs
        .into_iter()
        .map(|input| {
            let risk_score = calculate_risk_score(input.risk_factors.as_slice(), Some(config));
            let mut account =
                RenewalAccount::new(input.id, input.name, input.arr, input.contract_end, today)
                    .with_risk_score(risk_score);
            account.risk_factors = input.risk_factors;
            account.owner = input.owner;
            if let Some(outcome) = input.outcome.filter(|outcome| !outcome.trim().is_empty()) {
                account = account.with_outcome(outcome, input.expansion_arr);
            }
            account
        })
        .collect()
}

pub(crate) fn summarize_renewals(
    accounts: &[RenewalAccount],
    config: &RenewalTrackerConfig,
    today: NaiveDate,
) -> RenewalSummaryResponse {
    let views = accounts
        .iter()
        .map(|account| {
            let stage = account.stage(Some(config));
            RenewalAccountView {
                id: account.id.clone(),
                name: account.name.clone(),
                days_to_renewal: account.days_to_renewal,
                stage,
                stage_label: stage.label(),
                risk_score: account.risk_score,
                at_risk: account.is_open() && should_flag_as_risk(account.risk_score, Some(config)),
                outcome: account.outcome.as_deref().map(RenewalOutcome::classify),
            }
        })
        .collect();

    RenewalSummaryResponse {
        today,
        metrics: RenewalMetrics::compute(accounts, config),
        milestones: renewal_milestones(Some(config)),
        accounts: views,
    }
}

pub(crate) async fn renewal_summary_endpoint(
    Json(payload): Json<RenewalSummaryRequest>,
) -> Result<Json<RenewalSummaryResponse>, AppError> {
    let RenewalSummaryRequest {
        answers,
        templates,
        accounts,
        today,
    } = payload;

    let templates = templates_or_standard(templates, ToolKind::Renewal);
    let config: RenewalTrackerConfig = transform(&answers, &templates);
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let accounts = build_renewal_accounts(accounts, &config, today);

    Ok(Json(summarize_renewals(&accounts, &config, today)))
}

pub(crate) fn score_risk(
    config: &RiskAssessmentConfig,
    indicators: Option<Vec<RiskIndicator>>,
) -> RiskScoreResponse {
    let indicators = indicators.unwrap_or_else(|| default_indicators(config.client_type));
    let adjusted = apply_weight_adjustments(&indicators, config);
    let score = overall_risk_score(&adjusted);
    let health_level = HealthLevel::from_score(score);

    RiskScoreResponse {
        client_type: config.client_type,
        overall_risk_score: score,
        health_level,
        health_label: health_level.label(),
        exceeds_threshold: score >= f64::from(config.risk_threshold),
        indicators: adjusted,
    }
}

pub(crate) async fn risk_score_endpoint(
    Json(payload): Json<RiskScoreRequest>,
) -> Result<Json<RiskScoreResponse>, AppError> {
    let templates = templates_or_standard(payload.templates, ToolKind::RiskAssessment);
    let config: RiskAssessmentConfig = transform(&payload.answers, &templates);

    if payload
        .indicators
        .as_ref()
        .is_some_and(|indicators| indicators.is_empty())
    {
        return Err(AppError::InvalidRequest(
            "indicators must not be an empty list".to_string(),
        ));
    }

    Ok(Json(score_risk(&config, payload.indicators)))
}
