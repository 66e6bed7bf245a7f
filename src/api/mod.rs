use axum::{
    Router,
    extract::{Json, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    Debt, ExtraPayments, PayoffResult, PayoffSummary, Strategy, StrategyComparison,
    compare_strategies, simulate,
};

mod cli;
mod error;

pub use cli::{Cli, Command, RunArgs, execute_run};
pub use error::{ApiError, ApiResult};

const DEFAULT_FIXED_TOTAL: bool = true;
const DEFAULT_STRATEGY: Strategy = Strategy::Avalanche;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliStrategy {
    Avalanche,
    Snowball,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Avalanche => Strategy::Avalanche,
            CliStrategy::Snowball => Strategy::Snowball,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiStrategy {
    #[serde(alias = "Avalanche", alias = "highest-rate")]
    Avalanche,
    #[serde(alias = "Snowball", alias = "lowest-balance")]
    Snowball,
}

impl From<ApiStrategy> for Strategy {
    fn from(value: ApiStrategy) -> Self {
        match value {
            ApiStrategy::Avalanche => Strategy::Avalanche,
            ApiStrategy::Snowball => Strategy::Snowball,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DebtPayload {
    id: Option<String>,
    name: Option<String>,
    balance: Option<f64>,
    #[serde(alias = "min_payment")]
    min_payment: Option<f64>,
    #[serde(alias = "interest_rate")]
    interest_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ExtraPaymentsPayload {
    #[serde(alias = "per_month")]
    per_month: Option<f64>,
    #[serde(alias = "per_year")]
    per_year: Option<f64>,
    #[serde(alias = "one_time")]
    one_time: Option<f64>,
    #[serde(alias = "one_time_month")]
    one_time_month: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PayoffPayload {
    debts: Vec<DebtPayload>,
    #[serde(alias = "extra_payments")]
    extra_payments: Option<ExtraPaymentsPayload>,
    #[serde(alias = "fixed_total")]
    fixed_total: Option<bool>,
    strategy: Option<ApiStrategy>,
    #[serde(alias = "start_date")]
    start_date: Option<String>,
}

/// Validated inputs for one engine run.
#[derive(Debug, Clone)]
pub struct PayoffRequest {
    pub debts: Vec<Debt>,
    pub extra: ExtraPayments,
    pub fixed_total: bool,
    pub strategy: Strategy,
    pub start: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffResponse {
    pub result: Option<PayoffResult>,
    pub summary: Option<PayoffSummary>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn payload_from_json(json: &str) -> ApiResult<PayoffPayload> {
    serde_json::from_str::<PayoffPayload>(json).map_err(|e| ApiError::InvalidJson(e.to_string()))
}

fn checked_amount(field: String, value: Option<f64>) -> ApiResult<f64> {
    let value = value.unwrap_or(0.0);
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::InvalidAmount { field, value });
    }
    Ok(value)
}

fn parse_start_date(raw: Option<&str>, today: NaiveDate) -> ApiResult<NaiveDate> {
    match raw.map(str::trim) {
        None | Some("") => Ok(today),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::InvalidDate(raw.to_string())),
    }
}

/// Turns a wire payload into engine inputs. Missing amounts default to zero;
/// inactive debts pass through and are dropped by the engine.
pub fn build_request(payload: PayoffPayload, today: NaiveDate) -> ApiResult<PayoffRequest> {
    let mut debts = Vec::with_capacity(payload.debts.len());
    for (index, debt) in payload.debts.into_iter().enumerate() {
        let label = |field: &str| format!("debts[{index}].{field}");
        debts.push(Debt {
            id: debt.id.unwrap_or_else(|| (index + 1).to_string()),
            name: debt.name.unwrap_or_default(),
            balance: checked_amount(label("balance"), debt.balance)?,
            min_payment: checked_amount(label("minPayment"), debt.min_payment)?,
            interest_rate: checked_amount(label("interestRate"), debt.interest_rate)?,
        });
    }

    let extra_payload = payload.extra_payments.unwrap_or_default();
    let extra = ExtraPayments {
        per_month: checked_amount("extraPayments.perMonth".to_string(), extra_payload.per_month)?,
        per_year: checked_amount("extraPayments.perYear".to_string(), extra_payload.per_year)?,
        one_time: checked_amount("extraPayments.oneTime".to_string(), extra_payload.one_time)?,
        one_time_month: extra_payload.one_time_month.unwrap_or(0),
    };

    Ok(PayoffRequest {
        debts,
        extra,
        fixed_total: payload.fixed_total.unwrap_or(DEFAULT_FIXED_TOTAL),
        strategy: payload.strategy.map(Strategy::from).unwrap_or(DEFAULT_STRATEGY),
        start: parse_start_date(payload.start_date.as_deref(), today)?,
    })
}

pub fn build_payoff_response(request: &PayoffRequest) -> PayoffResponse {
    let result = simulate(
        &request.debts,
        &request.extra,
        request.fixed_total,
        request.strategy,
        request.start,
    );
    let summary = result.as_ref().map(PayoffResult::summary);
    PayoffResponse { result, summary }
}

pub fn build_comparison_response(request: &PayoffRequest) -> Option<StrategyComparison> {
    compare_strategies(
        &request.debts,
        &request.extra,
        request.fixed_total,
        request.start,
    )
}

fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/payoff", post(payoff_handler))
        .route("/api/compare", post(compare_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    log::info!("payoff HTTP API listening on http://{addr}");
    log::info!("Local access: http://127.0.0.1:{port}/api/health");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn payoff_handler(payload: Result<Json<PayoffPayload>, JsonRejection>) -> Response {
    match request_from_body(payload) {
        Ok(request) => {
            let response = build_payoff_response(&request);
            match &response.summary {
                Some(summary) => log::info!(
                    "payoff: {} debts, {:?} -> {} months, {:?}",
                    request.debts.len(),
                    request.strategy,
                    summary.total_months,
                    summary.status
                ),
                None => log::info!("payoff: nothing to simulate"),
            }
            json_response(StatusCode::OK, response)
        }
        Err(err) => err.into_response(),
    }
}

async fn compare_handler(payload: Result<Json<PayoffPayload>, JsonRejection>) -> Response {
    match request_from_body(payload) {
        Ok(request) => json_response(StatusCode::OK, build_comparison_response(&request)),
        Err(err) => err.into_response(),
    }
}

fn request_from_body(payload: Result<Json<PayoffPayload>, JsonRejection>) -> ApiResult<PayoffRequest> {
    let Json(payload) = payload.map_err(|rejection| ApiError::InvalidJson(rejection.body_text()))?;
    build_request(payload, Local::now().date_naive()).inspect_err(|err| {
        log::warn!("rejected payload: {err}");
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status(), &self.to_string())
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CompletionStatus;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).expect("valid date")
    }

    fn request_from_json(json: &str) -> ApiResult<PayoffRequest> {
        build_request(payload_from_json(json)?, today())
    }

    const SAMPLE: &str = r#"{
      "debts": [
        { "id": "1", "name": "Auto loan", "balance": 25000, "minPayment": 519, "interestRate": 4.9 },
        { "id": "3", "name": "Credit card 1", "balance": 6000, "minPayment": 150, "interestRate": 18.99 },
        { "id": "5", "name": "", "balance": 0, "minPayment": 0, "interestRate": 0 }
      ],
      "extraPayments": { "perMonth": 100, "perYear": 0, "oneTime": 0, "oneTimeMonth": 5 },
      "fixedTotal": true,
      "strategy": "snowball",
      "startDate": "2026-01-01"
    }"#;

    #[test]
    fn payload_parses_web_keys() {
        let request = request_from_json(SAMPLE).expect("json should parse");

        assert_eq!(request.debts.len(), 3);
        assert_eq!(request.debts[1].name, "Credit card 1");
        assert_eq!(request.debts[1].min_payment, 150.0);
        assert_eq!(request.debts[1].interest_rate, 18.99);
        assert_eq!(request.extra.per_month, 100.0);
        assert_eq!(request.extra.one_time_month, 5);
        assert!(request.fixed_total);
        assert_eq!(request.strategy, Strategy::Snowball);
        assert_eq!(
            request.start,
            NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date")
        );
    }

    #[test]
    fn payload_accepts_snake_case_aliases() {
        let json = r#"{
          "debts": [{ "name": "Card", "balance": 900, "min_payment": 90, "interest_rate": 12 }],
          "extra_payments": { "per_month": 10, "one_time": 50, "one_time_month": 3 },
          "fixed_total": false
        }"#;
        let request = request_from_json(json).expect("json should parse");
        assert_eq!(request.debts[0].min_payment, 90.0);
        assert_eq!(request.debts[0].id, "1");
        assert_eq!(request.extra.per_month, 10.0);
        assert_eq!(request.extra.one_time, 50.0);
        assert_eq!(request.extra.one_time_month, 3);
        assert!(!request.fixed_total);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let request = request_from_json(r#"{ "debts": [{ "balance": 100 }] }"#)
            .expect("json should parse");
        assert_eq!(request.extra, ExtraPayments::default());
        assert!(request.fixed_total);
        assert_eq!(request.strategy, Strategy::Avalanche);
        assert_eq!(request.start, today());
        assert_eq!(request.debts[0].min_payment, 0.0);
    }

    #[test]
    fn negative_amounts_are_rejected_with_field_name() {
        let json = r#"{ "debts": [{ "balance": 100, "minPayment": -5 }] }"#;
        let err = request_from_json(json).expect_err("must reject negative minimum");
        assert!(err.to_string().contains("debts[0].minPayment"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let json = r#"{ "extraPayments": { "perYear": -1 } }"#;
        let err = request_from_json(json).expect_err("must reject negative extra");
        assert!(err.to_string().contains("extraPayments.perYear"));
    }

    #[test]
    fn bad_start_date_is_rejected() {
        let err = request_from_json(r#"{ "startDate": "03/2026" }"#)
            .expect_err("must reject date format");
        assert!(matches!(err, ApiError::InvalidDate(_)));
    }

    #[test]
    fn unknown_strategy_is_invalid_json() {
        let err = request_from_json(r#"{ "strategy": "random" }"#)
            .expect_err("must reject unknown strategy");
        assert!(matches!(err, ApiError::InvalidJson(_)));
    }

    #[test]
    fn payoff_response_serialization_contains_expected_fields() {
        let request = request_from_json(SAMPLE).expect("json should parse");
        let response = build_payoff_response(&request);
        let summary = response.summary.as_ref().expect("active debts");
        assert_eq!(summary.status, CompletionStatus::Completed);

        let json = serde_json::to_string(&response).expect("response should serialize");
        for key in [
            "\"totalMonths\"",
            "\"totalInterestPaid\"",
            "\"payoffDate\"",
            "\"payoffOrder\"",
            "\"schedule\"",
            "\"chartData\"",
            "\"remainingBalance\"",
            "\"extraAvailable\"",
            "\"status\":\"completed\"",
        ] {
            assert!(json.contains(key), "missing {key}");
        }
    }

    #[test]
    fn empty_debt_list_serializes_null_result() {
        let request = request_from_json(r#"{ "debts": [] }"#).expect("json should parse");
        let json = serde_json::to_string(&build_payoff_response(&request))
            .expect("response should serialize");
        assert_eq!(json, r#"{"result":null,"summary":null}"#);
    }

    #[test]
    fn comparison_response_reports_both_strategies() {
        let request = request_from_json(SAMPLE).expect("json should parse");
        let comparison = build_comparison_response(&request).expect("active debts");
        let json = serde_json::to_string(&comparison).expect("comparison should serialize");
        assert!(json.contains("\"avalanche\""));
        assert!(json.contains("\"snowball\""));
        assert!(json.contains("\"interestSavedByAvalanche\""));
        assert!(json.contains("\"recommended\""));
    }

    #[tokio::test]
    async fn payoff_handler_returns_ok_with_no_store() {
        let payload = payload_from_json(SAMPLE).expect("json should parse");
        let response = payoff_handler(Ok(Json(payload))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some("no-store".as_bytes())
        );
    }

    #[tokio::test]
    async fn payoff_handler_rejects_invalid_amounts() {
        let payload = payload_from_json(r#"{ "debts": [{ "balance": -10 }] }"#)
            .expect("json should parse");
        let response = payoff_handler(Ok(Json(payload))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
