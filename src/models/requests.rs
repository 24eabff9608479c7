use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to run the matching algorithm for a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMatchingRequest {
    #[serde(alias = "client_id", rename = "clientId")]
    pub client_id: i64,
}

/// Request to submit or replace a user's full rating vector
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitScoresRequest {
    #[validate(length(min = 1))]
    pub scores: Vec<u8>,
}

impl SubmitScoresRequest {
    /// Every score within the 1..=9 rating scale
    pub fn scores_in_range(&self) -> bool {
        self.scores.iter().all(|&s| (1..=9).contains(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_scores_pass() {
        let req = SubmitScoresRequest {
            scores: vec![1, 5, 9],
        };
        assert!(req.validate().is_ok());
        assert!(req.scores_in_range());
    }

    #[test]
    fn test_out_of_range_score_detected() {
        let req = SubmitScoresRequest {
            scores: vec![1, 5, 10],
        };
        assert!(!req.scores_in_range());

        let req = SubmitScoresRequest {
            scores: vec![0, 5, 9],
        };
        assert!(!req.scores_in_range());
    }

    #[test]
    fn test_empty_scores_rejected() {
        let req = SubmitScoresRequest { scores: vec![] };
        assert!(req.validate().is_err());
    }
}
