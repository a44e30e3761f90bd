use crate::api_errors::AppError;
use crate::app_state::AppState;
use crate::fields::{FEATURE_COLUMNS, FIELD_SPECS};
use crate::pipeline::{Outcome, Prediction};
use crate::request::RawRequest;
use axum::{
    extract::{rejection::JsonRejection, Form, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use minijinja::{context, Environment};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

const INDEX_TEMPLATE: &str = "index.html";
const INDEX_SOURCE: &str = include_str!("../templates/index.html");

/// Build the router: form page, JSON API, versioned alias and health checks
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // form page
        .route("/", get(index))
        .route("/predict", post(predict_form))
        // JSON API
        .route("/api/predict", post(predict_json))
        .route("/api/fields", get(field_contract))
        // versioned alias
        .route("/v1/predict", post(predict_json))
        // health endpoints
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving obesity-level predictor on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let page = render_page(&state.templates, &HashMap::new(), &state.context.outcome(None))
        .map_err(|e| AppError::internal(format!("failed to render page: {e}")))?;
    Ok(Html(page))
}

async fn predict_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Html<String>, AppError> {
    let raw = RawRequest::from_form(form.clone());
    let outcome = state.context.outcome(Some(&raw));
    let page = render_page(&state.templates, &form, &outcome)
        .map_err(|e| AppError::internal(format!("failed to render page: {e}")))?;
    Ok(Html(page))
}

async fn predict_json(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawRequest>, JsonRejection>,
) -> Result<Json<Prediction>, AppError> {
    let Json(raw) = payload?;
    let prediction = state.context.submit(&raw)?;
    Ok(Json(prediction))
}

async fn field_contract() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "columns": FEATURE_COLUMNS,
        "fields": FIELD_SPECS,
    }))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn readyz(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.readiness())
}

/// Template environment for the form page. `.html` templates are
/// auto-escaped.
pub fn page_templates() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_loader(|name| match name {
        INDEX_TEMPLATE => Ok(Some(INDEX_SOURCE.to_string())),
        _ => Ok(None),
    });
    env
}

/// Render the whole page. `submitted` holds the values to put back into the
/// inputs; fields absent from it show their defaults.
pub fn render_page(
    templates: &Environment<'static>,
    submitted: &HashMap<String, String>,
    outcome: &Outcome,
) -> Result<String, minijinja::Error> {
    let values: HashMap<&str, String> = FIELD_SPECS
        .iter()
        .map(|spec| {
            let value = submitted
                .get(spec.name)
                .cloned()
                .unwrap_or_else(|| spec.default_value());
            (spec.name, value)
        })
        .collect();

    templates.get_template(INDEX_TEMPLATE)?.render(context! {
        fields => FIELD_SPECS,
        values => values,
        message => outcome.message(),
        is_error => outcome.is_error(),
    })
}
