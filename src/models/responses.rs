use crate::models::domain::{ConsistencyReport, RankedMatch};
use serde::{Deserialize, Serialize};

/// Response for the run-matching endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMatchingResponse {
    #[serde(rename = "clientId")]
    pub client_id: i64,
    pub matches: Vec<RankedMatch>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    /// Per-criterion consistency diagnostics for the alternative matrices
    #[serde(rename = "criterionConsistency")]
    pub criterion_consistency: Vec<ConsistencyReport>,
}

/// Response for the persisted-results endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    #[serde(rename = "clientId")]
    pub client_id: i64,
    pub results: Vec<RankedMatch>,
}

/// Response for the score-submission endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitScoresResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "scoresSaved")]
    pub scores_saved: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
