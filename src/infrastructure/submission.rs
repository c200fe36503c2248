//! Transport for the flattened survey record.
//!
//! One POST per user action; retrying is entirely up to the user. When no
//! endpoint is configured the client stands in for the external collector
//! and reports success, matching the survey's demo mode.

use std::time::Duration;

use crate::domain::SurveyRecord;

/// Environment variable naming the collector endpoint.
pub const ENDPOINT_ENV: &str = "ECOSURVEY_ENDPOINT";

pub struct SubmissionClient {
    endpoint: Option<String>,
    http: reqwest::blocking::Client,
}

impl SubmissionClient {
    pub fn new(endpoint: Option<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self { endpoint, http }
    }

    /// Reads the endpoint from `ECOSURVEY_ENDPOINT`, if set.
    pub fn from_env() -> Self {
        Self::new(std::env::var(ENDPOINT_ENV).ok())
    }

    /// Makes exactly one submission attempt with the given record.
    pub fn submit(&self, record: &SurveyRecord) -> Result<(), String> {
        let Some(endpoint) = &self.endpoint else {
            // Demo mode: no collector configured, accept the record.
            return Ok(());
        };

        let response = self
            .http
            .post(endpoint)
            .json(record)
            .send()
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("HTTP {}", response.status()))
        }
    }
}
