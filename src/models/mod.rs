// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{ConsistencyReport, Criterion, RankedMatch, RatingProfile, SolverOptions};
pub use requests::{RunMatchingRequest, SubmitScoresRequest};
pub use responses::{
    ErrorResponse, HealthResponse, ResultsResponse, RunMatchingResponse, SubmitScoresResponse,
};
