//! Forwarding proxy
//!
//! A thin pass-through between survey clients and the spreadsheet-backed
//! script endpoint. It keeps the endpoint URL out of clients, maps the
//! public query surface onto the script's `action` dispatch, and mirrors
//! the script's convention of answering JSON with failures shaped as
//! `{"status":"error","message":...}`. No business logic, no persistence.

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::ProxyConfig;

#[derive(Clone)]
pub struct ProxyState {
    client: Client,
    upstream: Url,
}

impl ProxyState {
    pub fn new(upstream: Url) -> Self {
        Self {
            client: Client::new(),
            upstream,
        }
    }
}

/// The three forwarding routes under `/api`.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/submit", post(forward_submit))
        .route("/api/summary", get(forward_summary))
        .route("/api/group", get(forward_group))
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ProxyConfig) -> Result<()> {
    let upstream = Url::parse(&config.upstream)
        .with_context(|| format!("invalid upstream endpoint: {}", config.upstream))?;
    let app = router(ProxyState::new(upstream));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("proxy listening on {}", config.bind_addr);
    axum::serve(listener, app).await.context("proxy server exited")?;
    Ok(())
}

/// Transport failures toward the upstream become a 500 in the script's own
/// error shape.
#[derive(Debug)]
struct ProxyError(anyhow::Error);

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("upstream error: {}", self.0),
        )
    }
}

impl<E> From<E> for ProxyError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "status": "error", "message": message }))).into_response()
}

/// Upstream text passed through untouched, declared as JSON.
fn json_passthrough(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// Body arrives as raw bytes: submitting clients may post JSON under a
/// `text/plain` content type, and a parse failure must still answer in the
/// script's JSON error shape.
async fn forward_submit(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let row: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                &format!("invalid JSON body: {err}"),
            ));
        }
    };
    debug!("forwarding submission row");
    let text = state
        .client
        .post(state.upstream.clone())
        .json(&row)
        .send()
        .await?
        .text()
        .await?;
    Ok(json_passthrough(StatusCode::OK, text))
}

#[derive(Debug, Default, Deserialize)]
struct SummaryParams {
    mode: Option<String>,
    g: Option<String>,
    image_id: Option<String>,
}

async fn forward_summary(
    State(state): State<ProxyState>,
    Query(params): Query<SummaryParams>,
) -> Result<Response, ProxyError> {
    let url = match summary_url(&state.upstream, &params) {
        Ok(url) => url,
        Err(message) => return Ok(error_response(StatusCode::BAD_REQUEST, message)),
    };
    debug!(mode = params.mode.as_deref().unwrap_or(""), "forwarding summary query");
    let text = state
        .client
        .get(url)
        .header(header::ACCEPT, "application/json")
        .send()
        .await?
        .text()
        .await?;
    Ok(json_passthrough(StatusCode::OK, text))
}

async fn forward_group(State(state): State<ProxyState>) -> Result<Response, ProxyError> {
    let upstream = state.client.get(group_url(&state.upstream)).send().await?;
    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::OK);
    let text = upstream.text().await?;
    Ok(json_passthrough(status, text))
}

/// Upstream URL for the rotation-group counter.
fn group_url(upstream: &Url) -> Url {
    let mut url = upstream.clone();
    url.query_pairs_mut().append_pair("action", "nextGroup");
    url
}

/// Map the public summary parameters onto the script's `action` dispatch.
fn summary_url(upstream: &Url, params: &SummaryParams) -> Result<Url, &'static str> {
    let mut url = upstream.clone();
    match params.mode.as_deref() {
        Some("list") => {
            let g = params.g.as_deref().ok_or("require g")?;
            url.query_pairs_mut()
                .append_pair("action", "summaryListByGroup")
                .append_pair("g", g);
        }
        Some("image") => {
            let (Some(g), Some(image_id)) = (params.g.as_deref(), params.image_id.as_deref())
            else {
                return Err("require g & image_id");
            };
            url.query_pairs_mut()
                .append_pair("action", "summaryByImage")
                .append_pair("g", g)
                .append_pair("image_id", image_id);
        }
        _ => return Err("unknown mode"),
    }
    Ok(url)
}
