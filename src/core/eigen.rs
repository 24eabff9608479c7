use crate::core::matrix::PairwiseMatrix;
use crate::models::{ConsistencyReport, SolverOptions};

/// Random consistency index (RI) by matrix size, indexed by k.
///
/// Standard AHP table for k = 1..=10. Sizes 1 and 2 are always perfectly
/// consistent, so their RI is 0 and CR is defined as 0.
const RANDOM_INDEX: [f64; 11] = [
    0.0, 0.0, 0.0, 0.52, 0.89, 1.11, 1.25, 1.35, 1.40, 1.45, 1.49,
];

/// RI for a k×k matrix.
///
/// Beyond the tabulated sizes we fall back to the closed-form approximation
/// RI(k) ≈ 1.98 * (k - 2) / k rather than treating large matrices as
/// perfectly consistent.
#[inline]
fn random_index(k: usize) -> f64 {
    match RANDOM_INDEX.get(k) {
        Some(&ri) => ri,
        None => 1.98 * (k as f64 - 2.0) / k as f64,
    }
}

/// Estimate the principal eigenvalue of a positive reciprocal matrix by power
/// iteration and derive the consistency index (CI) and ratio (CR).
///
/// Starting from the all-ones vector, each step multiplies by the matrix and
/// takes the elementwise ratio of successive iterates. Iteration stops once
/// every ratio component moves by less than `tolerance`, or after
/// `max_iterations` steps; non-convergence is not an error and the last
/// estimate is used. `lambda_max` is the mean of the final ratio vector,
/// which approximates the Perron–Frobenius eigenvalue since every entry is
/// strictly positive.
pub fn consistency(matrix: &PairwiseMatrix, options: &SolverOptions) -> ConsistencyReport {
    assert!(
        matrix.is_positive(),
        "pairwise matrix must have strictly positive entries"
    );

    let k = matrix.dim();
    let mut x = vec![1.0; k];
    let mut ratios = vec![0.0; k];
    let mut prev_ratios = vec![0.0; k];

    for _ in 0..options.max_iterations {
        let x_next = multiply(matrix, &x);

        for i in 0..k {
            ratios[i] = x_next[i] / x[i];
        }

        let converged = ratios
            .iter()
            .zip(&prev_ratios)
            .all(|(r, p)| (r - p).abs() < options.tolerance);
        if converged {
            break;
        }

        prev_ratios.copy_from_slice(&ratios);
        x = x_next;
    }

    let lambda_max = ratios.iter().sum::<f64>() / k as f64;

    let ci = if k > 1 {
        (lambda_max - k as f64) / (k as f64 - 1.0)
    } else {
        0.0
    };

    let ri = random_index(k);
    let cr = if ri != 0.0 { ci / ri } else { 0.0 };

    ConsistencyReport {
        lambda_max,
        ci,
        cr,
    }
}

/// Local priority weights by the geometric-mean (row) method.
///
/// Each row's geometric mean is normalized so the weights sum to 1. For a
/// positive matrix every weight is strictly positive.
pub fn local_weights(matrix: &PairwiseMatrix) -> Vec<f64> {
    assert!(
        matrix.is_positive(),
        "pairwise matrix must have strictly positive entries"
    );

    let k = matrix.dim();
    let exponent = 1.0 / k as f64;

    let geometric_means: Vec<f64> = (0..k)
        .map(|i| matrix.row(i).iter().product::<f64>().powf(exponent))
        .collect();

    let total: f64 = geometric_means.iter().sum();
    geometric_means.into_iter().map(|g| g / total).collect()
}

/// Local priority weights as the normalized principal eigenvector, computed
/// by the same power iteration used for the consistency estimate.
///
/// Agrees with [`local_weights`] in rank order for well-formed matrices;
/// kept as a cross-check on the geometric-mean method.
pub fn eigenvector_weights(matrix: &PairwiseMatrix, options: &SolverOptions) -> Vec<f64> {
    assert!(
        matrix.is_positive(),
        "pairwise matrix must have strictly positive entries"
    );

    let k = matrix.dim();
    let mut x = vec![1.0; k];
    let mut prev_ratios = vec![0.0; k];

    for _ in 0..options.max_iterations {
        let x_next = multiply(matrix, &x);

        let ratios: Vec<f64> = x_next.iter().zip(&x).map(|(n, o)| n / o).collect();
        let converged = ratios
            .iter()
            .zip(&prev_ratios)
            .all(|(r, p)| (r - p).abs() < options.tolerance);

        // Renormalize every step so the iterate cannot overflow
        let sum: f64 = x_next.iter().sum();
        x = x_next.into_iter().map(|v| v / sum).collect();

        if converged {
            break;
        }
        prev_ratios = ratios;
    }

    x
}

#[inline]
fn multiply(matrix: &PairwiseMatrix, x: &[f64]) -> Vec<f64> {
    (0..matrix.dim())
        .map(|i| {
            matrix
                .row(i)
                .iter()
                .zip(x)
                .map(|(m, v)| m * v)
                .sum::<f64>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_from_rows(rows: &[&[f64]]) -> PairwiseMatrix {
        let dim = rows.len();
        let mut m = PairwiseMatrix::ones(dim);
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                m.set(i, j, v);
            }
        }
        m
    }

    #[test]
    fn test_all_ones_matrix_is_perfectly_consistent() {
        for k in 1..=6 {
            let m = PairwiseMatrix::ones(k);
            let report = consistency(&m, &SolverOptions::default());
            assert!(
                (report.lambda_max - k as f64).abs() < 1e-9,
                "lambda_max for all-ones {k}x{k} should be {k}, got {}",
                report.lambda_max
            );
            assert!(report.ci.abs() < 1e-9);
            assert!(report.cr.abs() < 1e-9);
        }
    }

    #[test]
    fn test_one_by_one_matrix() {
        let m = PairwiseMatrix::ones(1);
        let report = consistency(&m, &SolverOptions::default());
        assert!((report.lambda_max - 1.0).abs() < 1e-9);
        assert_eq!(report.ci, 0.0);
        assert_eq!(report.cr, 0.0);
    }

    #[test]
    fn test_local_weights_sum_to_one() {
        let m = matrix_from_rows(&[
            &[1.0, 3.0, 5.0],
            &[1.0 / 3.0, 1.0, 2.0],
            &[0.2, 0.5, 1.0],
        ]);
        let weights = local_weights(&m);
        let sum: f64 = weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(weights.iter().all(|&w| w >= 0.0));
    }

    #[test]
    fn test_local_weights_uniform_for_all_ones() {
        let weights = local_weights(&PairwiseMatrix::ones(4));
        for w in weights {
            assert!((w - 0.25).abs() < 1e-9);
        }
    }

    #[test]
    fn test_dominant_row_gets_largest_weight() {
        let m = matrix_from_rows(&[
            &[1.0, 4.0, 6.0],
            &[0.25, 1.0, 3.0],
            &[1.0 / 6.0, 1.0 / 3.0, 1.0],
        ]);
        let weights = local_weights(&m);
        assert!(weights[0] > weights[1]);
        assert!(weights[1] > weights[2]);
    }

    #[test]
    fn test_consistency_of_inconsistent_matrix_is_positive() {
        // 1>2 by 2, 2>3 by 3, but 1>3 only by 2: clearly intransitive strength
        let m = matrix_from_rows(&[
            &[1.0, 2.0, 2.0],
            &[0.5, 1.0, 3.0],
            &[0.5, 1.0 / 3.0, 1.0],
        ]);
        let report = consistency(&m, &SolverOptions::default());
        assert!(report.lambda_max > 3.0);
        assert!(report.ci > 0.0);
        assert!(report.cr > 0.0);
    }

    #[test]
    fn test_cross_method_rank_agreement() {
        let m = matrix_from_rows(&[
            &[1.0, 3.0, 0.5, 2.0],
            &[1.0 / 3.0, 1.0, 0.25, 0.5],
            &[2.0, 4.0, 1.0, 3.0],
            &[0.5, 2.0, 1.0 / 3.0, 1.0],
        ]);
        let opts = SolverOptions::default();
        let geo = local_weights(&m);
        let eig = eigenvector_weights(&m, &opts);

        let order = |w: &[f64]| {
            let mut idx: Vec<usize> = (0..w.len()).collect();
            idx.sort_by(|&a, &b| w[b].partial_cmp(&w[a]).unwrap());
            idx
        };
        assert_eq!(order(&geo), order(&eig));
    }

    #[test]
    fn test_random_index_extends_beyond_table() {
        assert_eq!(random_index(3), 0.52);
        assert_eq!(random_index(10), 1.49);
        // Approximation for sizes the table does not cover
        let ri_12 = random_index(12);
        assert!(ri_12 > 1.49 && ri_12 < 1.98);
    }

    #[test]
    #[should_panic(expected = "strictly positive")]
    fn test_non_positive_matrix_panics() {
        let mut m = PairwiseMatrix::ones(2);
        m.set(0, 1, 0.0);
        local_weights(&m);
    }
}
