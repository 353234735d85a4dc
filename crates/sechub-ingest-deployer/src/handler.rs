//! One Lambda invocation: parse, dispatch, respond

use crate::aws::error::suggestion_for;
use crate::aws::operations::{AccountDirectory, StackSetOperations};
use crate::config::{ConfigError, DeployerConfig};
use crate::lifecycle::{
    CustomResourceEvent, CustomResourceResponse, InvocationContext, LifecycleController,
    RequestType, ResponseSink, ResponseStatus,
};
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Physical id reported when nothing better is known
const UNKNOWN_PHYSICAL_ID: &str = "sechub-ingest-unprovisioned";

/// Time left until a runtime deadline given in milliseconds since the epoch
pub fn remaining_until(deadline_ms: u64, now_ms: i64) -> Duration {
    let left = i128::from(deadline_ms) - i128::from(now_ms);
    Duration::from_millis(u64::try_from(left.max(0)).unwrap_or(u64::MAX))
}

/// Configured delete delay, cut short so the response still goes out by `respond_by`
fn delete_response_delay(configured: Duration, respond_by: Option<Instant>) -> Duration {
    match respond_by {
        Some(at) => configured.min(at.saturating_duration_since(Instant::now())),
        None => configured,
    }
}

/// Long-lived state shared by every invocation of a warm function
pub struct Deployer<S, A, R> {
    controller: LifecycleController<S, A>,
    responder: R,
    config: Result<DeployerConfig, ConfigError>,
}

impl<S, A, R> Deployer<S, A, R>
where
    S: StackSetOperations,
    A: AccountDirectory,
    R: ResponseSink,
{
    /// Config errors are kept and reported on every event instead of
    /// aborting the cold start, so CloudFormation still gets an answer.
    pub fn new(
        controller: LifecycleController<S, A>,
        responder: R,
        config: Result<DeployerConfig, ConfigError>,
    ) -> Self {
        Self {
            controller,
            responder,
            config,
        }
    }

    /// Handle one payload.
    ///
    /// `remaining` is the time left before the runtime kills the function.
    /// Returns the status sent to CloudFormation, or `None` for payloads that
    /// are not lifecycle events.
    pub async fn handle(
        &self,
        payload: serde_json::Value,
        function_arn: &str,
        remaining: Option<Duration>,
    ) -> Result<Option<ResponseStatus>> {
        let event = match CustomResourceEvent::from_payload(payload.clone()) {
            Ok(Some(event)) => event,
            Ok(None) => {
                info!("Payload has no RequestType, ignoring");
                return Ok(None);
            }
            Err(e) => {
                error!(error = %e, "Malformed custom resource event");
                let Some((url, response)) = CustomResourceResponse::failed_for_raw(
                    &payload,
                    UNKNOWN_PHYSICAL_ID,
                    format!("Malformed custom resource event: {e}"),
                ) else {
                    return Err(e).context("Malformed event without a ResponseURL");
                };
                self.respond(&url, &response).await?;
                return Ok(Some(ResponseStatus::Failed));
            }
        };

        info!(
            request_type = %event.request_type,
            request_id = %event.request_id,
            logical_resource_id = %event.logical_resource_id,
            properties = event.resource_properties.len(),
            "Received custom resource event"
        );

        // Work must stop `deadline_margin` before the runtime kills the function
        let respond_by = match (&self.config, remaining) {
            (Ok(config), Some(left)) => {
                Some(Instant::now() + left.saturating_sub(config.deadline_margin))
            }
            _ => None,
        };

        let response = self.process(&event, function_arn, respond_by).await;

        if event.request_type == RequestType::Delete {
            if let Ok(config) = &self.config {
                // Let CloudWatch receive the logs before the stack deletes the function
                let delay = delete_response_delay(config.delete_response_delay, respond_by);
                if delay < config.delete_response_delay {
                    warn!(delay = ?delay, "Shortening delete response delay to meet the deadline");
                }
                info!(delay = ?delay, "Delaying delete response");
                tokio::time::sleep(delay).await;
            }
        }

        self.respond(&event.response_url, &response).await?;
        Ok(Some(response.status))
    }

    async fn process(
        &self,
        event: &CustomResourceEvent,
        function_arn: &str,
        respond_by: Option<Instant>,
    ) -> CustomResourceResponse {
        let fallback_id = event
            .physical_resource_id
            .clone()
            .unwrap_or_else(|| UNKNOWN_PHYSICAL_ID.to_string());

        let config = match &self.config {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "Invalid configuration");
                return CustomResourceResponse::failed(
                    event,
                    fallback_id,
                    format!("Invalid configuration: {e}"),
                );
            }
        };

        let invocation = match InvocationContext::from_function_arn(function_arn) {
            Ok(invocation) => invocation,
            Err(e) => {
                error!(error = %e, "Cannot determine management account and region");
                return CustomResourceResponse::failed(event, fallback_id, e.to_string());
            }
        };

        let cancel = CancellationToken::new();
        let guard = respond_by.map(|at| {
            let token = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep_until(at).await;
                warn!("Approaching function deadline, cancelling outstanding work");
                token.cancel();
            })
        });

        let result = self
            .controller
            .handle(
                event.request_type,
                config,
                &invocation,
                event.physical_resource_id.as_deref(),
                Some(&cancel),
            )
            .await;

        if let Some(guard) = guard {
            guard.abort();
        }

        match result {
            Ok(outcome) => CustomResourceResponse::success(
                event,
                outcome.physical_resource_id(),
                outcome.response_data(),
            ),
            Err(e) => {
                let physical_id = event
                    .physical_resource_id
                    .clone()
                    .unwrap_or_else(|| config.identity().to_string());
                let e = anyhow::Error::new(e);
                let mut reason = format!("{e:#}");
                if let Some(hint) = suggestion_for(&e) {
                    reason.push_str(". ");
                    reason.push_str(hint);
                }
                error!(error = %reason, "Lifecycle event failed");
                CustomResourceResponse::failed(event, physical_id, reason)
            }
        }
    }

    async fn respond(&self, url: &str, response: &CustomResourceResponse) -> Result<()> {
        self.responder
            .send(url, response)
            .await
            .context("Failed to send custom resource response")
    }
}
