use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, warn};

use super::domain::PiiField;
use super::report::{ReportCompiler, ReportError, ReportInput};
use crate::error::AppError;

/// Router exposing the flow catalog and report compilation.
pub fn onboarding_router(compiler: Arc<ReportCompiler>) -> Router {
    Router::new()
        .route("/api/v1/flows", get(list_flows_handler))
        .route("/api/v1/flows/:flow_name", get(show_flow_handler))
        .route("/api/v1/reports", post(report_handler))
        .route("/api/v1/reports/summary", post(summary_handler))
        .with_state(compiler)
}

pub(crate) async fn list_flows_handler(State(compiler): State<Arc<ReportCompiler>>) -> Response {
    let resolver = compiler.resolver();
    let flows: Vec<_> = resolver
        .catalog()
        .definitions()
        .map(|definition| {
            json!({
                "name": definition.name,
                "requiredSteps": definition.required_steps,
                "fieldVisibility": resolver.field_visibility(Some(&definition.name)),
            })
        })
        .collect();

    let payload = json!({
        "default": resolver.catalog().default_flow().name,
        "flows": flows,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn show_flow_handler(
    State(compiler): State<Arc<ReportCompiler>>,
    Path(flow_name): Path<String>,
) -> Response {
    let resolver = compiler.resolver();
    let definition = resolver.definition(Some(&flow_name));
    let fallback = resolver.catalog().get(&flow_name).is_none();

    let payload = json!({
        "requested": flow_name,
        "resolved": definition.name,
        "fallback": fallback,
        "requiredSteps": definition.required_steps,
        "fieldVisibility": resolver.field_visibility(Some(&flow_name)),
        "placeholder": resolver.placeholder_for(PiiField::Address),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn report_handler(
    State(compiler): State<Arc<ReportCompiler>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let input: ReportInput = serde_json::from_slice(&body)?;
    let applicant_id = input.applicant.id.clone();

    let worker = Arc::clone(&compiler);
    let report = tokio::task::spawn_blocking(move || worker.compile(&input))
        .await
        .map_err(|err| {
            warn!(applicant_id = %applicant_id, error = %err, "report worker failed");
            ReportError::Encode(format!("report worker failed: {err}"))
        })??;

    info!(
        applicant_id = %applicant_id,
        filename = %report.filename,
        "serving verification report"
    );

    let headers = [
        (header::CONTENT_TYPE, mime::APPLICATION_PDF.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report.filename),
        ),
        (
            HeaderName::from_static("x-report-overall-status"),
            report.overall_status.label().to_string(),
        ),
    ];
    Ok((StatusCode::OK, headers, report.bytes).into_response())
}

pub(crate) async fn summary_handler(
    State(compiler): State<Arc<ReportCompiler>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let input: ReportInput = serde_json::from_slice(&body)?;
    let summary = compiler.summarize(&input);
    Ok((StatusCode::OK, Json(summary)).into_response())
}
