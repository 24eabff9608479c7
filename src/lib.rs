//! Therapair Algo - AHP-based therapist matching service
//!
//! This library provides the core matching algorithm used by the Therapair
//! platform. A client's criterion ratings are compared against therapists'
//! self-ratings through pairwise comparison matrices (Analytic Hierarchy
//! Process), and therapists are ranked by their global priority weight.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{build_matrices, local_weights, MatchOutcome, Matcher, PairwiseMatrix};
pub use crate::models::{ConsistencyReport, RankedMatch, RatingProfile, SolverOptions};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let weights = local_weights(&PairwiseMatrix::ones(3));
        assert_eq!(weights.len(), 3);
    }
}
