// src/core/request_builder.rs
//! Builds multipart payloads for the two matching endpoints

use reqwest::multipart::{Form, Part};
use tracing::warn;

use crate::core::file_store::{ResumeFile, FALLBACK_MIME};
use crate::error::ValidationError;
use crate::types::Workflow;

pub const RESUME_FIELD: &str = "resume";
pub const JOB_DESCRIPTION_FIELD: &str = "job_description";

/// Owned snapshot of everything a request sends. Built before the request is
/// dispatched, so later changes to the file store do not leak into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPayload {
    pub workflow: Workflow,
    pub resume: ResumeFile,
    pub job_description: Option<String>,
}

impl MatchPayload {
    /// Field names in the order they are appended to the form.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = vec![RESUME_FIELD];
        if self.job_description.is_some() {
            fields.push(JOB_DESCRIPTION_FIELD);
        }
        fields
    }

    fn resume_part(&self) -> Result<Part, reqwest::Error> {
        let part = || {
            Part::bytes(self.resume.bytes.clone()).file_name(self.resume.file_name.clone())
        };
        match part().mime_str(&self.resume.mime) {
            Ok(part) => Ok(part),
            Err(_) => {
                warn!(
                    "Unparseable MIME type '{}' for {}, sending as {}",
                    self.resume.mime, self.resume.file_name, FALLBACK_MIME
                );
                part().mime_str(FALLBACK_MIME)
            }
        }
    }

    pub fn to_form(&self) -> Result<Form, reqwest::Error> {
        let part = self.resume_part()?;

        let mut form = Form::new().part(RESUME_FIELD, part);
        if let Some(text) = &self.job_description {
            form = form.text(JOB_DESCRIPTION_FIELD, text.clone());
        }
        Ok(form)
    }
}

pub fn build_dataset(resume: Option<&ResumeFile>) -> Result<MatchPayload, ValidationError> {
    let resume = resume.ok_or(ValidationError::MissingResume)?;
    Ok(MatchPayload {
        workflow: Workflow::Dataset,
        resume: resume.clone(),
        job_description: None,
    })
}

/// The job text is sent exactly as typed; only blank text is rejected.
pub fn build_custom(
    resume: Option<&ResumeFile>,
    job_description: &str,
) -> Result<MatchPayload, ValidationError> {
    let resume = resume.ok_or(ValidationError::MissingResume)?;
    if job_description.trim().is_empty() {
        return Err(ValidationError::MissingJobText);
    }
    Ok(MatchPayload {
        workflow: Workflow::Custom,
        resume: resume.clone(),
        job_description: Some(job_description.to_string()),
    })
}
