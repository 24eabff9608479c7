// Core algorithm exports
pub mod eigen;
pub mod matrix;
pub mod ranker;

pub use eigen::{consistency, eigenvector_weights, local_weights};
pub use matrix::{build_matrices, MatrixSet, PairwiseMatrix};
pub use ranker::{MatchOutcome, Matcher};
