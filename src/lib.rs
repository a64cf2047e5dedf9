//! Client for an external résumé matching service.
//!
//! A résumé is matched either against the service's posting dataset or
//! against one pasted job description. [`core::Orchestrator`] runs both
//! workflows independently and keeps the latest settled result of each in a
//! [`core::ResultStateManager`].

pub mod core;
pub mod environment;
pub mod error;
pub mod report;
pub mod types;

pub use crate::core::{ConsistencyPolicy, MatchingClient, Orchestrator, ResumeFile, WorkflowOutcome};
pub use environment::EnvironmentConfig;
pub use error::{MatchFailure, ValidationError};
pub use types::{CustomResult, DatasetResultSet, JobMatch, MatchOutcome, Workflow};
