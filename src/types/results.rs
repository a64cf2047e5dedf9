// src/types/results.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::error::MatchFailure;

/// Normalized result of one request to the matching service.
pub type MatchOutcome<T> = Result<T, MatchFailure>;

/// The two independent matching workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    /// Résumé against the service's fixed posting collection
    Dataset,
    /// Résumé against a single user-supplied job description
    Custom,
}

impl Workflow {
    pub fn endpoint(self) -> &'static str {
        match self {
            Workflow::Dataset => "/match",
            Workflow::Custom => "/match_custom",
        }
    }

    /// Notice shown when a request fails without a server message.
    pub fn generic_failure_notice(self) -> &'static str {
        match self {
            Workflow::Dataset => "There was an error matching your resume.",
            Workflow::Custom => {
                "There was an error matching your resume to the custom job description."
            }
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Workflow::Dataset => write!(f, "dataset"),
            Workflow::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobMatch {
    pub title: String,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub match_score: f64,
    pub job_posting_url: Option<String>,
}

/// Dataset mode result. Matches keep the order the service ranked them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetResultSet {
    pub matches: Vec<JobMatch>,
    pub matched_keywords: Vec<String>,
    pub suggested_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomResult {
    pub match_score: f64,
    pub matched_keywords: Vec<String>,
    pub suggested_keywords: Vec<String>,
    /// Normalized job text echoed back by the service
    pub job_description: String,
}

/// A result together with the request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settled<T> {
    pub value: T,
    pub request_id: Uuid,
    pub sequence: u64,
    pub settled_at: DateTime<Utc>,
}

impl<T> Settled<T> {
    pub fn new(value: T, request_id: Uuid, sequence: u64) -> Self {
        Self {
            value,
            request_id,
            sequence,
            settled_at: Utc::now(),
        }
    }
}
