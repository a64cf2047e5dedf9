// src/report.rs
//! Plain-text rendering of settled results

use crate::core::result_state::{CustomSlot, DatasetSlot};
use crate::types::{CustomResult, DatasetResultSet, JobMatch};

/// Scores are always shown with three decimals.
pub fn format_score(score: f64) -> String {
    // Avoid printing "-0.000"
    let score = if score == 0.0 { 0.0 } else { score };
    format!("{:.3}", score)
}

fn join_keywords(keywords: &[String]) -> String {
    keywords.join(", ")
}

fn render_job(rank: usize, job: &JobMatch) -> String {
    let mut heading = format!("{}. {}", rank, job.title);
    if let Some(company) = &job.company_name {
        heading.push_str(&format!(" at {}", company));
    }
    if let Some(location) = &job.location {
        heading.push_str(&format!(" in {}", location));
    }

    let link = match &job.job_posting_url {
        Some(url) => format!("View Posting: {}", url),
        None => "No link available".to_string(),
    };

    format!(
        "{}\n   Score: {}\n   {}",
        heading,
        format_score(job.match_score),
        link
    )
}

pub fn render_dataset(results: &DatasetResultSet) -> String {
    let mut out = String::from("Top Matches (Dataset)\n");
    if results.matches.is_empty() {
        out.push_str("No matches returned.\n");
    }
    for (i, job) in results.matches.iter().enumerate() {
        out.push_str(&render_job(i + 1, job));
        out.push('\n');
    }
    out.push_str(&format!(
        "Matched Keywords: {}\nSuggested Keywords: {}\n",
        join_keywords(&results.matched_keywords),
        join_keywords(&results.suggested_keywords)
    ));
    out
}

pub fn render_custom(result: &CustomResult) -> String {
    format!(
        "Custom Job Match\nMatch Score: {}\nMatched Keywords: {}\nSuggested Keywords: {}\n",
        format_score(result.match_score),
        join_keywords(&result.matched_keywords),
        join_keywords(&result.suggested_keywords)
    )
}

/// Empty string when the workflow never succeeded.
pub fn render_dataset_slot(slot: &DatasetSlot) -> String {
    slot.as_ref()
        .map(|settled| render_dataset(&settled.value))
        .unwrap_or_default()
}

pub fn render_custom_slot(slot: &CustomSlot) -> String {
    slot.as_ref()
        .map(|settled| render_custom(&settled.value))
        .unwrap_or_default()
}
