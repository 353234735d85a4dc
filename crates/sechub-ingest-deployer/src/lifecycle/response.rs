//! Custom-resource response document and delivery to the pre-signed URL

use super::event::CustomResourceEvent;
use backon::{ExponentialBuilder, Retryable};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Timeout for a single PUT attempt
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Response document size limit enforced by CloudFormation
const MAX_REASON_LEN: usize = 2048;

/// Response delivery failures
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Response request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Response URL returned HTTP {0}")]
    HttpStatus(u16),
}

impl ResponseError {
    fn is_retryable(&self) -> bool {
        match self {
            ResponseError::Encode(_) => false,
            ResponseError::Request(_) => true,
            ResponseError::HttpStatus(code) => *code >= 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// Document CloudFormation expects at the `ResponseURL`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: BTreeMap<String, String>,
}

impl CustomResourceResponse {
    pub fn success(
        event: &CustomResourceEvent,
        physical_resource_id: impl Into<String>,
        data: BTreeMap<String, String>,
    ) -> Self {
        Self {
            status: ResponseStatus::Success,
            reason: String::new(),
            physical_resource_id: physical_resource_id.into(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data,
        }
    }

    pub fn failed(
        event: &CustomResourceEvent,
        physical_resource_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            status: ResponseStatus::Failed,
            reason: truncate_reason(reason.into()),
            physical_resource_id: physical_resource_id.into(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data: BTreeMap::new(),
        }
    }

    /// FAILED response built from a payload that did not parse as an event.
    ///
    /// Returns the response URL with the document, or `None` when the payload
    /// has no usable `ResponseURL`.
    pub fn failed_for_raw(
        payload: &serde_json::Value,
        fallback_physical_id: &str,
        reason: impl Into<String>,
    ) -> Option<(String, Self)> {
        let field = |key: &str| payload.get(key).and_then(|v| v.as_str()).unwrap_or_default();
        let url = field("ResponseURL");
        if url.is_empty() {
            return None;
        }

        let physical_id = match field("PhysicalResourceId") {
            "" => fallback_physical_id,
            id => id,
        };

        Some((
            url.to_string(),
            Self {
                status: ResponseStatus::Failed,
                reason: truncate_reason(reason.into()),
                physical_resource_id: physical_id.to_string(),
                stack_id: field("StackId").to_string(),
                request_id: field("RequestId").to_string(),
                logical_resource_id: field("LogicalResourceId").to_string(),
                no_echo: false,
                data: BTreeMap::new(),
            },
        ))
    }
}

fn truncate_reason(mut reason: String) -> String {
    if reason.len() > MAX_REASON_LEN {
        let mut cut = MAX_REASON_LEN;
        while !reason.is_char_boundary(cut) {
            cut -= 1;
        }
        reason.truncate(cut);
    }
    reason
}

/// Destination for response documents
pub trait ResponseSink: Send + Sync {
    fn send(
        &self,
        url: &str,
        response: &CustomResourceResponse,
    ) -> impl Future<Output = Result<(), ResponseError>> + Send;
}

/// Sends response documents to CloudFormation over HTTPS
pub struct Responder {
    client: reqwest::Client,
}

impl Responder {
    pub fn new() -> Result<Self, ResponseError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }

    async fn try_send(&self, url: &str, body: &str) -> Result<(), ResponseError> {
        // The pre-signed URL is signed without a content type
        let response = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, "")
            .body(body.to_string())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ResponseError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

impl ResponseSink for Responder {
    /// PUT the response to the pre-signed URL, retrying transient failures.
    async fn send(&self, url: &str, response: &CustomResourceResponse) -> Result<(), ResponseError> {
        let body = serde_json::to_string(response)?;

        (|| async { self.try_send(url, &body).await })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_secs(1))
                    .with_max_delay(Duration::from_secs(8))
                    .with_max_times(4),
            )
            .when(ResponseError::is_retryable)
            .notify(|e, dur| {
                warn!(delay = ?dur, error = %e, "Response delivery failed, retrying...");
            })
            .await?;

        info!(
            status = %response.status,
            physical_resource_id = %response.physical_resource_id,
            request_id = %response.request_id,
            "Sent custom resource response"
        );
        Ok(())
    }
}
