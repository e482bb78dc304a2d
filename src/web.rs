use axum::{
    extract::{Form, Query, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{
    api_errors::AppError,
    app_state::AppState,
    check_record::CheckRecord,
    classifier::{Method, Verdict},
    errors::PhishError,
    input_validator::validate_submission,
    log_store::read_recent,
    sanitize::sanitize_url,
    views::{self, CheckOutcome},
};

pub const FORM_EXPIRED_MESSAGE: &str = "⚠️ Your form has expired. Please submit it again.";

#[derive(Debug, Default, Deserialize)]
pub struct CheckForm {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiCheckRequest {
    pub url: String,
    pub method: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiCheckResponse {
    pub verdict: Verdict,
    pub label: String,
    pub method: Method,
    pub sanitized_url: String,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

/// Build the router serving the form, dashboard and JSON API.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index).post(submit_check))
        .route("/about", get(about))
        .route("/dashboard", get(dashboard))
        .route("/healthz", get(healthz))
        .route("/api/check", post(api_check))
        .route("/api/logs", get(api_logs))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(st): State<Arc<AppState>>) -> Html<String> {
    Html(views::render_index(&st.csrf.generate_token(), None))
}

async fn about() -> Html<String> {
    Html(views::render_about())
}

fn verdict_message(method: Method, verdict: Verdict) -> &'static str {
    match (method, verdict) {
        (Method::Keyword, Verdict::Threat) => "🚨 Phishing Detected!",
        (Method::Keyword, Verdict::Safe) => "✅ Safe URL",
        (Method::Remote, Verdict::Threat) => "🚨 Google marked this site as unsafe!",
        (Method::Remote, Verdict::Safe) => "✅ Google says this site is safe.",
    }
}

fn validation_outcome(err: &PhishError) -> CheckOutcome {
    match err {
        PhishError::Validation { field, message } if field == "method" => CheckOutcome {
            message: format!("❌ {message}"),
            method_used: "Error".to_string(),
        },
        other => CheckOutcome {
            message: format!("⚠️ {}", other.user_message()),
            method_used: "Input Validation".to_string(),
        },
    }
}

async fn run_form_check(st: &AppState, form: &CheckForm) -> CheckOutcome {
    let submission = match validate_submission(&form.url, &form.method) {
        Ok(s) => s,
        Err(e) => return validation_outcome(&e),
    };

    let message = match st.classifier.classify(&submission.url, submission.method).await {
        Ok(verdict) => verdict_message(submission.method, verdict).to_string(),
        Err(e) => e.user_message(),
    };

    CheckOutcome {
        message,
        method_used: submission.method.display_name().to_string(),
    }
}

async fn submit_check(State(st): State<Arc<AppState>>, Form(form): Form<CheckForm>) -> Html<String> {
    let outcome = if st.csrf.validate_token(&form.csrf_token) {
        run_form_check(&st, &form).await
    } else {
        tracing::info!("rejected form submission with invalid token");
        CheckOutcome {
            message: FORM_EXPIRED_MESSAGE.to_string(),
            method_used: "Input Validation".to_string(),
        }
    };

    Html(views::render_index(&st.csrf.generate_token(), Some(&outcome)))
}

async fn load_recent(st: &AppState, limit: usize) -> Result<Vec<CheckRecord>, AppError> {
    let path = st.log_path.clone();
    tokio::task::spawn_blocking(move || read_recent(&path, limit))
        .await
        .map_err(|e| AppError::internal(format!("log reader task failed: {e}")))
}

async fn dashboard(State(st): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let records = load_recent(&st, st.dashboard_limit).await?;
    Ok(Html(views::render_dashboard(&records)))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn api_check(
    State(st): State<Arc<AppState>>,
    Json(req): Json<ApiCheckRequest>,
) -> Result<Json<ApiCheckResponse>, AppError> {
    let submission = validate_submission(&req.url, &req.method)?;
    let verdict = st.classifier.classify(&submission.url, submission.method).await?;

    Ok(Json(ApiCheckResponse {
        verdict,
        label: verdict.label().to_string(),
        method: submission.method,
        sanitized_url: sanitize_url(&submission.url),
    }))
}

async fn api_logs(
    State(st): State<Arc<AppState>>,
    Query(q): Query<LogsQuery>,
) -> Result<Json<Vec<CheckRecord>>, AppError> {
    let limit = q.limit.unwrap_or(st.dashboard_limit).clamp(1, st.dashboard_limit);
    Ok(Json(load_recent(&st, limit).await?))
}

async fn not_found() -> AppError {
    AppError::not_found("no such route")
}
