use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::digest::config::{CapabilityConfig, TOKEN_ENV_VARS};
use crate::digest::response::parse_response;
use crate::digest::segmenter::Segment;
use crate::error::CapabilityError;

/// A text-to-text service that condenses one segment at a time.
pub trait SummarizationBackend {
    fn label(&self) -> &str;
    fn summarize_segment(&self, segment: &Segment) -> Result<String, CapabilityError>;
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    min_length: u32,
    max_length: u32,
    do_sample: bool,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

pub struct InferenceClient {
    client: Client,
    api_token: String,
    config: CapabilityConfig,
}

impl InferenceClient {
    pub fn new(config: &CapabilityConfig, api_token: String) -> Result<Self, CapabilityError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_token,
            config: config.clone(),
        })
    }

    fn request_for<'a>(&self, segment: &'a Segment) -> InferenceRequest<'a> {
        InferenceRequest {
            inputs: &segment.text,
            parameters: InferenceParameters {
                min_length: self.config.min_length,
                max_length: self.config.max_length,
                do_sample: self.config.do_sample,
            },
            options: InferenceOptions {
                wait_for_model: self.config.wait_for_model,
            },
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> CapabilityError {
        if error.is_timeout() {
            CapabilityError::Timeout(self.config.timeout_secs)
        } else {
            error.into()
        }
    }
}

impl SummarizationBackend for InferenceClient {
    fn label(&self) -> &str {
        &self.config.model_label
    }

    fn summarize_segment(&self, segment: &Segment) -> Result<String, CapabilityError> {
        let payload = self.request_for(segment);
        debug!(
            segment = segment.index,
            chars = segment.char_len(),
            url = %self.config.api_url,
            "submitting segment"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .map_err(|err| self.transport_error(err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CapabilityError::Status(status.as_u16()));
        }

        let body = response.text().map_err(|err| self.transport_error(err))?;
        let json: Value =
            serde_json::from_str(&body).map_err(|err| CapabilityError::Malformed(err.to_string()))?;
        parse_response(&json).into_text()
    }
}

/// Installed when no credential is configured; every call fails fast.
pub struct MissingCredentialBackend {
    label: String,
}

impl MissingCredentialBackend {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl SummarizationBackend for MissingCredentialBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn summarize_segment(&self, _segment: &Segment) -> Result<String, CapabilityError> {
        Err(CapabilityError::ConfigurationMissing(
            TOKEN_ENV_VARS.join(" or "),
        ))
    }
}

pub fn build_backend(
    config: &CapabilityConfig,
    api_token: Option<String>,
) -> Result<Box<dyn SummarizationBackend>, CapabilityError> {
    match api_token {
        Some(token) => Ok(Box::new(InferenceClient::new(config, token)?)),
        None => Ok(Box::new(MissingCredentialBackend::new(
            config.model_label.clone(),
        ))),
    }
}
