//! Backend gateway
//!
//! The session engine's only window onto the collecting backend: submit one
//! row, or read aggregate counts back. Everything behind the trait is
//! best-effort from the session's point of view; callers log failures and
//! carry on, they never let a backend hiccup strand a participant mid-trial.

mod http;

pub use http::HttpGateway;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assignment::GroupId;
use crate::session::rating::Dimension;
use crate::session::SubmissionRecord;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered but reported a failure of its own.
    #[error("backend error: {0}")]
    Backend(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[async_trait]
pub trait SurveyGateway: Send + Sync {
    /// Deliver one submission row. Idempotent on the backend via `key`.
    async fn submit(&self, record: &SubmissionRecord) -> GatewayResult<()>;

    /// Per-stimulus response counts for a group.
    async fn summary_list(&self, group: GroupId) -> GatewayResult<SummaryList>;

    /// Rating distribution for one stimulus of a group.
    async fn summary_by_image(&self, group: GroupId, stimulus_id: u32) -> GatewayResult<ImageSummary>;
}

/// rating value ("1".."5") to response count
pub type RatingCounts = BTreeMap<String, u64>;

/// How many responses each stimulus of a group has received so far.
/// Missing fields read as empty; a sparse answer is a valid answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryList {
    #[serde(default)]
    pub images: Vec<ImageCount>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageCount {
    pub image_id: u32,
    #[serde(default)]
    pub n: u64,
}

/// Per-dimension rating histogram for one stimulus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageSummary {
    #[serde(default)]
    pub counts: BTreeMap<String, RatingCounts>,
}

impl ImageSummary {
    /// Count for one dimension/rating cell; absent cells read as zero.
    pub fn count(&self, dimension: Dimension, rating: u8) -> u64 {
        self.counts
            .get(dimension.as_key())
            .and_then(|histogram| histogram.get(&rating.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Total responses recorded under one dimension.
    pub fn dimension_total(&self, dimension: Dimension) -> u64 {
        self.counts
            .get(dimension.as_key())
            .map(|histogram| histogram.values().sum())
            .unwrap_or(0)
    }
}
