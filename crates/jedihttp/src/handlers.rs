//! Route handlers.
//!
//! Each analysis route parses the JSON body itself, so a malformed body is
//! reported through [`ApiError`] like any other failure, then runs the engine
//! on the blocking pool.

use crate::analysis::{AnalysisError, Analyzer};
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{AnalysisRequest, CompletionsResponse, DefinitionsResponse};
use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::debug;

/// State shared by the route handlers
#[derive(Clone)]
pub struct AppState {
    /// Engine behind the analysis routes
    pub analyzer: Arc<dyn Analyzer>,
}

impl AppState {
    /// Wrap `analyzer` for the router.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self { analyzer }
    }
}

/// `POST /healthy`
pub async fn healthy() -> Json<bool> {
    debug!("received /healthy request");
    Json(true)
}

/// `POST /ready`
pub async fn ready() -> Json<bool> {
    debug!("received /ready request");
    Json(true)
}

/// `POST /completions`
pub async fn completions(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<CompletionsResponse>> {
    debug!("received /completions request");
    let request = parse_request(&body)?;
    let completions = analyze(state.analyzer, move |a| a.completions(&request)).await?;
    Ok(Json(CompletionsResponse { completions }))
}

/// `POST /gotodefinition`
pub async fn goto_definition(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<DefinitionsResponse>> {
    debug!("received /gotodefinition request");
    let request = parse_request(&body)?;
    let definitions = analyze(state.analyzer, move |a| a.goto_definitions(&request)).await?;
    Ok(Json(DefinitionsResponse { definitions }))
}

/// `POST /gotoassignment`
pub async fn goto_assignment(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<DefinitionsResponse>> {
    debug!("received /gotoassignment request");
    let request = parse_request(&body)?;
    let definitions = analyze(state.analyzer, move |a| a.goto_assignments(&request)).await?;
    Ok(Json(DefinitionsResponse { definitions }))
}

/// `POST /usages`
pub async fn usages(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<DefinitionsResponse>> {
    debug!("received /usages request");
    let request = parse_request(&body)?;
    let definitions = analyze(state.analyzer, move |a| a.usages(&request)).await?;
    Ok(Json(DefinitionsResponse { definitions }))
}

fn parse_request(body: &[u8]) -> ApiResult<AnalysisRequest> {
    Ok(serde_json::from_slice(body)?)
}

/// Run `op` against `analyzer` on the blocking pool.
async fn analyze<T, F>(analyzer: Arc<dyn Analyzer>, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn Analyzer) -> Result<T, AnalysisError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || op(analyzer.as_ref()))
        .await
        .map_err(join_error)?;
    Ok(result?)
}

fn join_error(err: JoinError) -> ApiError {
    if err.is_panic() {
        ApiError::from_panic(err.into_panic().as_ref())
    } else {
        ApiError::Internal(format!("analysis task did not complete: {}", err))
    }
}
