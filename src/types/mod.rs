// src/types/mod.rs
pub mod response;
pub mod results;

pub use results::{CustomResult, DatasetResultSet, JobMatch, MatchOutcome, Settled, Workflow};
