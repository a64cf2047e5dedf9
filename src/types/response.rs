// src/types/response.rs
//! Wire formats of the matching service. Every field is optional and decoded
//! on its own: a missing or wrong-typed field becomes empty without
//! discarding its siblings, and unreadable match records are skipped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::types::results::{CustomResult, DatasetResultSet, JobMatch};

/// Field of the wrong type decodes as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Array whose unreadable elements are dropped; a non-array is `None`.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| T::deserialize(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

// ===== Service Response Types =====

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatasetMatchResponse {
    #[serde(deserialize_with = "lenient_list")]
    pub matches: Option<Vec<JobMatchRecord>>,
    #[serde(deserialize_with = "lenient_list")]
    pub matched_keywords: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list")]
    pub suggested_keywords: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobMatchRecord {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub company_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub match_score: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub job_posting_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CustomMatchResponse {
    #[serde(deserialize_with = "lenient")]
    pub job_description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub match_score: Option<f64>,
    #[serde(deserialize_with = "lenient_list")]
    pub matched_keywords: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list")]
    pub suggested_keywords: Option<Vec<String>>,
}

/// Error envelope used by the service on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ErrorResponse {
    pub error: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// The server-supplied message, if it is a non-empty string.
    pub fn usable_message(&self) -> Option<&str> {
        match &self.error {
            Some(serde_json::Value::String(message)) if !message.trim().is_empty() => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<JobMatchRecord> for JobMatch {
    fn from(record: JobMatchRecord) -> Self {
        JobMatch {
            title: record.title.unwrap_or_default(),
            company_name: present(record.company_name),
            location: present(record.location),
            match_score: record.match_score.unwrap_or(0.0),
            job_posting_url: present(record.job_posting_url),
        }
    }
}

impl From<DatasetMatchResponse> for DatasetResultSet {
    fn from(response: DatasetMatchResponse) -> Self {
        DatasetResultSet {
            matches: response
                .matches
                .unwrap_or_default()
                .into_iter()
                .map(JobMatch::from)
                .collect(),
            matched_keywords: response.matched_keywords.unwrap_or_default(),
            suggested_keywords: response.suggested_keywords.unwrap_or_default(),
        }
    }
}

impl From<CustomMatchResponse> for CustomResult {
    fn from(response: CustomMatchResponse) -> Self {
        CustomResult {
            match_score: response.match_score.unwrap_or(0.0),
            matched_keywords: response.matched_keywords.unwrap_or_default(),
            suggested_keywords: response.suggested_keywords.unwrap_or_default(),
            job_description: response.job_description.unwrap_or_default(),
        }
    }
}
