use crate::models::RatingProfile;

/// A positive reciprocal pairwise comparison matrix.
///
/// Invariants: square, `m[i][i] == 1`, and `m[i][j] == 1 / m[j][i]` for all
/// i != j. All entries are strictly positive. The matrix builder below is the
/// only constructor used by the pipeline, and it upholds these by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseMatrix {
    dim: usize,
    data: Vec<f64>,
}

impl PairwiseMatrix {
    /// Create a k×k matrix filled with ones (every pair equally preferred)
    pub fn ones(dim: usize) -> Self {
        Self {
            dim,
            data: vec![1.0; dim * dim],
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.dim + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.dim + col] = value;
    }

    /// Row as a slice (rows are stored contiguously)
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.dim..(row + 1) * self.dim]
    }

    /// All entries strictly positive
    pub fn is_positive(&self) -> bool {
        self.data.iter().all(|&v| v > 0.0)
    }

    /// Unit diagonal and `m[i][j] * m[j][i] == 1` within `tolerance`
    pub fn is_reciprocal(&self, tolerance: f64) -> bool {
        for i in 0..self.dim {
            if (self.get(i, i) - 1.0).abs() > tolerance {
                return false;
            }
            for j in (i + 1)..self.dim {
                if (self.get(i, j) * self.get(j, i) - 1.0).abs() > tolerance {
                    return false;
                }
            }
        }
        true
    }
}

/// The full set of comparison matrices for one matching run
///
/// `therapist_ids` fixes the row/column order of every alternative matrix:
/// ascending therapist id. Downstream weight vectors use the same order.
#[derive(Debug, Clone)]
pub struct MatrixSet {
    /// 1×1 — a single client acts as the only expert
    pub expert: PairwiseMatrix,
    /// n×n all-ones — criteria are a priori equally important
    pub criteria: PairwiseMatrix,
    /// One k×k matrix per criterion, comparing the k eligible therapists
    pub alternatives: Vec<PairwiseMatrix>,
    /// Row/column order of the alternative matrices, ascending id
    pub therapist_ids: Vec<i64>,
}

/// Build the expert, criteria, and per-criterion alternative matrices from a
/// client's rating vector and the candidate therapists' rating vectors.
///
/// A therapist participates only if their vector length equals the client's;
/// mismatched vectors are dropped, not rejected. With zero eligible
/// therapists the alternative set comes back empty and the caller treats the
/// run as "no ranking possible".
///
/// Pure function: inputs are not mutated.
pub fn build_matrices(client_scores: &[u8], therapists: &[RatingProfile]) -> MatrixSet {
    let n_criteria = client_scores.len();

    let expert = PairwiseMatrix::ones(1);
    let criteria = PairwiseMatrix::ones(n_criteria);

    // Eligible therapists in ascending id order, with their per-criterion
    // absolute deviation from the client's desired score. The explicit sort
    // makes row order (and therefore tie-breaking later) deterministic.
    let mut eligible: Vec<(&RatingProfile, Vec<u8>)> = therapists
        .iter()
        .filter(|t| t.scores.len() == n_criteria)
        .map(|t| {
            let diffs = t
                .scores
                .iter()
                .zip(client_scores)
                .map(|(ts, cs)| ts.abs_diff(*cs))
                .collect();
            (t, diffs)
        })
        .collect();
    eligible.sort_by_key(|(t, _)| t.user_id);

    let therapist_ids: Vec<i64> = eligible.iter().map(|(t, _)| t.user_id).collect();
    let k = therapist_ids.len();

    if k == 0 || n_criteria == 0 {
        return MatrixSet {
            expert,
            criteria,
            alternatives: Vec::new(),
            therapist_ids,
        };
    }

    let mut alternatives = Vec::with_capacity(n_criteria);
    for criterion_idx in 0..n_criteria {
        let mut matrix = PairwiseMatrix::ones(k);

        for i in 0..k {
            for j in (i + 1)..k {
                let diff_i = eligible[i].1[criterion_idx];
                let diff_j = eligible[j].1[criterion_idx];

                // The therapist with the smaller deviation is preferred; the
                // preference strength grows linearly with the deviation gap.
                // Equal deviations leave the pair at indifference (1).
                if diff_i < diff_j {
                    let strength = f64::from(diff_j - diff_i) + 1.0;
                    matrix.set(i, j, strength);
                    matrix.set(j, i, 1.0 / strength);
                } else if diff_j < diff_i {
                    let strength = f64::from(diff_i - diff_j) + 1.0;
                    matrix.set(j, i, strength);
                    matrix.set(i, j, 1.0 / strength);
                }
            }
        }

        alternatives.push(matrix);
    }

    MatrixSet {
        expert,
        criteria,
        alternatives,
        therapist_ids,
    }
}
