use crate::core::eigen::{consistency, local_weights};
use crate::core::matrix::{build_matrices, MatrixSet};
use crate::models::{ConsistencyReport, RankedMatch, RatingProfile, SolverOptions};

/// Result of one ranking run
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Ranked matches, best first, ranks 1-based with no gaps
    pub matches: Vec<RankedMatch>,
    /// Candidates considered before eligibility filtering
    pub total_candidates: usize,
    /// Consistency diagnostics for each per-criterion alternative matrix
    pub criterion_consistency: Vec<ConsistencyReport>,
}

/// AHP matching orchestrator
///
/// # Pipeline stages
/// 1. Build pairwise comparison matrices from the rating vectors
/// 2. Solve each matrix for local weights and consistency
/// 3. Aggregate per-criterion weights into one global score per therapist
/// 4. Sort descending and assign ranks
#[derive(Debug, Clone)]
pub struct Matcher {
    options: SolverOptions,
}

impl Matcher {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    pub fn with_default_options() -> Self {
        Self {
            options: SolverOptions::default(),
        }
    }

    /// Rank candidate therapists for a client.
    ///
    /// Therapists whose vector length differs from the client's are excluded
    /// up front. An empty client vector or zero eligible therapists yields an
    /// empty outcome, never an error.
    ///
    /// The run is deterministic: therapists enter the matrices in ascending
    /// id order and the descending score sort is stable, so equal global
    /// scores rank in ascending therapist-id order.
    pub fn rank(&self, client: &RatingProfile, therapists: &[RatingProfile]) -> MatchOutcome {
        let total_candidates = therapists.len();

        if client.scores.is_empty() {
            tracing::warn!(client_id = client.user_id, "client has no rating vector");
            return MatchOutcome {
                matches: Vec::new(),
                total_candidates,
                criterion_consistency: Vec::new(),
            };
        }

        // Stage 1: matrices
        let set = build_matrices(&client.scores, therapists);
        let k = set.therapist_ids.len();

        if k == 0 {
            tracing::info!(
                client_id = client.user_id,
                total_candidates,
                "no eligible therapists"
            );
            return MatchOutcome {
                matches: Vec::new(),
                total_candidates,
                criterion_consistency: Vec::new(),
            };
        }

        self.log_hierarchy_consistency(client.user_id, &set);

        // Stage 2 & 3: per-criterion local weights, averaged into a global
        // score. The criteria matrix is all-ones, so its local weights are
        // uniform 1/n and the weighted sum reduces to an unweighted mean.
        let n_criteria = set.alternatives.len();
        let mut global_scores = vec![0.0f64; k];
        let mut criterion_consistency = Vec::with_capacity(n_criteria);

        for (criterion_idx, matrix) in set.alternatives.iter().enumerate() {
            let report = consistency(matrix, &self.options);
            tracing::debug!(
                stage = "alternatives",
                criterion = criterion_idx,
                dim = matrix.dim(),
                lambda_max = report.lambda_max,
                ci = report.ci,
                cr = report.cr,
                "solved alternative matrix"
            );

            let weights = local_weights(matrix);
            for (score, weight) in global_scores.iter_mut().zip(&weights) {
                *score += weight / n_criteria as f64;
            }
            criterion_consistency.push(report);
        }

        // Stage 4: sort and rank. Stable sort preserves ascending-id order
        // among equal scores.
        let mut scored: Vec<(i64, f64)> = set
            .therapist_ids
            .iter()
            .copied()
            .zip(global_scores)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let matches = scored
            .into_iter()
            .enumerate()
            .map(|(idx, (therapist_id, score))| RankedMatch {
                therapist_id,
                score,
                rank: (idx + 1) as i32,
            })
            .collect();

        MatchOutcome {
            matches,
            total_candidates,
            criterion_consistency,
        }
    }

    /// Consistency diagnostics for the expert and criteria levels of the
    /// hierarchy. Both are all-ones matrices by construction, so this is
    /// audit logging rather than gating.
    fn log_hierarchy_consistency(&self, client_id: i64, set: &MatrixSet) {
        let expert = consistency(&set.expert, &self.options);
        tracing::debug!(
            stage = "expert",
            client_id,
            dim = set.expert.dim(),
            lambda_max = expert.lambda_max,
            ci = expert.ci,
            cr = expert.cr,
            "solved expert matrix"
        );

        let criteria = consistency(&set.criteria, &self.options);
        tracing::debug!(
            stage = "criteria",
            client_id,
            dim = set.criteria.dim(),
            lambda_max = criteria.lambda_max,
            ci = criteria.ci,
            cr = criteria.cr,
            "solved criteria matrix"
        );
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: i64, scores: &[u8]) -> RatingProfile {
        RatingProfile {
            user_id: id,
            scores: scores.to_vec(),
        }
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let matcher = Matcher::with_default_options();
        let client = profile(100, &[5, 5, 5]);
        let therapists = vec![profile(1, &[5, 5, 5]), profile(2, &[1, 1, 1])];

        let outcome = matcher.rank(&client, &therapists);

        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.matches[0].therapist_id, 1);
        assert_eq!(outcome.matches[0].rank, 1);
        assert_eq!(outcome.matches[1].rank, 2);
        assert!(outcome.matches[0].score > outcome.matches[1].score);
    }

    #[test]
    fn test_scores_sum_to_one() {
        let matcher = Matcher::with_default_options();
        let client = profile(100, &[2, 8, 4]);
        let therapists = vec![
            profile(1, &[2, 8, 4]),
            profile(2, &[9, 1, 9]),
            profile(3, &[3, 7, 5]),
        ];

        let outcome = matcher.rank(&client, &therapists);
        let sum: f64 = outcome.matches.iter().map(|m| m.score).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_vector_not_in_output() {
        let matcher = Matcher::with_default_options();
        let client = profile(100, &[5, 5, 5]);
        let therapists = vec![profile(1, &[5, 5, 5]), profile(2, &[5, 5])];

        let outcome = matcher.rank(&client, &therapists);

        assert_eq!(outcome.total_candidates, 2);
        assert_eq!(outcome.matches.len(), 1);
        assert!(outcome.matches.iter().all(|m| m.therapist_id != 2));
    }

    #[test]
    fn test_no_eligible_therapists_is_empty_not_error() {
        let matcher = Matcher::with_default_options();
        let client = profile(100, &[5, 5, 5]);

        let outcome = matcher.rank(&client, &[profile(1, &[5])]);
        assert!(outcome.matches.is_empty());
        assert!(outcome.criterion_consistency.is_empty());

        let outcome = matcher.rank(&client, &[]);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_empty_client_vector_is_empty_not_error() {
        let matcher = Matcher::with_default_options();
        let client = profile(100, &[]);

        let outcome = matcher.rank(&client, &[profile(1, &[])]);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_ties_broken_by_ascending_id() {
        let matcher = Matcher::with_default_options();
        let client = profile(100, &[5]);
        // Both deviate by 2, perfectly symmetric
        let therapists = vec![profile(7, &[7]), profile(3, &[3])];

        let outcome = matcher.rank(&client, &therapists);

        assert_eq!(outcome.matches[0].therapist_id, 3);
        assert_eq!(outcome.matches[1].therapist_id, 7);
        assert!((outcome.matches[0].score - outcome.matches[1].score).abs() < 1e-12);
    }

    #[test]
    fn test_ranks_are_one_based_and_gapless() {
        let matcher = Matcher::with_default_options();
        let client = profile(100, &[4, 6]);
        let therapists: Vec<RatingProfile> = (1..=5)
            .map(|i| profile(i, &[(i as u8), (9 - i as u8)]))
            .collect();

        let outcome = matcher.rank(&client, &therapists);

        let ranks: Vec<i32> = outcome.matches.iter().map(|m| m.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_rerun_is_deterministic() {
        let matcher = Matcher::with_default_options();
        let client = profile(100, &[1, 9, 3, 7]);
        let therapists = vec![
            profile(4, &[2, 8, 3, 7]),
            profile(1, &[9, 1, 9, 1]),
            profile(9, &[1, 9, 3, 7]),
        ];

        let first = matcher.rank(&client, &therapists);
        let second = matcher.rank(&client, &therapists);

        let ids = |o: &MatchOutcome| o.matches.iter().map(|m| m.therapist_id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_consistency_reported_per_criterion() {
        let matcher = Matcher::with_default_options();
        let client = profile(100, &[2, 8, 4]);
        let therapists = vec![profile(1, &[2, 8, 4]), profile(2, &[9, 1, 9])];

        let outcome = matcher.rank(&client, &therapists);
        assert_eq!(outcome.criterion_consistency.len(), 3);
    }
}
