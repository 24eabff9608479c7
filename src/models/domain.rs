use serde::{Deserialize, Serialize};

/// A user's rating vector: one score in [1, 9] per criterion, ordered by the
/// criteria registry's ordinal position. Scores are validated upstream; the
/// engine treats the vector as an immutable snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingProfile {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub scores: Vec<u8>,
}

/// A matching criterion from the registry.
///
/// `position` is the explicit ordinal that fixes this criterion's index in
/// every rating vector and alternative-matrix set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub id: i64,
    pub position: i32,
    pub name: String,
    pub description: String,
}

/// One row of a persisted ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    #[serde(rename = "therapistId")]
    pub therapist_id: i64,
    pub score: f64,
    pub rank: i32,
}

/// Consistency diagnostics for one pairwise matrix evaluation.
///
/// Audit data only; no gating behavior is attached to the consistency ratio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConsistencyReport {
    #[serde(rename = "lambdaMax")]
    pub lambda_max: f64,
    pub ci: f64,
    pub cr: f64,
}

/// Power-iteration solver settings
#[derive(Debug, Clone, Copy)]
pub struct SolverOptions {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-5,
        }
    }
}
