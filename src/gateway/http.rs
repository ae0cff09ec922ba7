//! HTTP gateway
//!
//! Speaks to the forwarding proxy (or any service exposing the same
//! `/submit`, `/summary` and `/group` contract). Script-style backends
//! report their own failures as HTTP 200 with `{"status":"error"}`, so both
//! the HTTP status and the body status are checked.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{GatewayError, GatewayResult, ImageSummary, SummaryList, SurveyGateway};
use crate::assignment::GroupId;
use crate::session::SubmissionRecord;

pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// `base_url` is the proxy root, e.g. `http://127.0.0.1:8788/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn backend_error(body: &Value) -> Option<GatewayError> {
        if body.get("status").and_then(Value::as_str) == Some("error") {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unspecified backend failure")
                .to_string();
            return Some(GatewayError::Backend(message));
        }
        None
    }
}

#[async_trait]
impl SurveyGateway for HttpGateway {
    async fn submit(&self, record: &SubmissionRecord) -> GatewayResult<()> {
        debug!(key = %record.key, trial_no = record.trial_no, "submitting trial row");
        let response = self
            .client
            .post(self.endpoint("submit"))
            .json(record)
            .send()
            .await?
            .error_for_status()?;

        // A body that is not JSON counts as accepted; only an explicit
        // error status from the backend fails the submission.
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if let Some(err) = Self::backend_error(&body) {
            return Err(err);
        }
        Ok(())
    }

    async fn summary_list(&self, group: GroupId) -> GatewayResult<SummaryList> {
        let g = group.get().to_string();
        let response = self
            .client
            .get(self.endpoint("summary"))
            .query(&[("mode", "list"), ("g", g.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response
            .json()
            .await
            .map_err(|err| GatewayError::Malformed(err.to_string()))?;
        if let Some(err) = Self::backend_error(&body) {
            return Err(err);
        }
        // Sparse or odd-shaped payloads degrade to the empty summary.
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    async fn summary_by_image(&self, group: GroupId, stimulus_id: u32) -> GatewayResult<ImageSummary> {
        let g = group.get().to_string();
        let id = stimulus_id.to_string();
        let response = self
            .client
            .get(self.endpoint("summary"))
            .query(&[("mode", "image"), ("g", g.as_str()), ("image_id", id.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response
            .json()
            .await
            .map_err(|err| GatewayError::Malformed(err.to_string()))?;
        if let Some(err) = Self::backend_error(&body) {
            return Err(err);
        }
        Ok(serde_json::from_value(body).unwrap_or_default())
    }
}
