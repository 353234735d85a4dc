//! CloudFormation stack-set client

use super::context::{AwsContext, FromAwsContext};
use super::error::{AwsError, classify_sdk_error};
use super::operations::StackSetOperations;
use super::types::{
    CreateStackSetRequest, InstanceTarget, OperationHandle, StackSetCreation, StackSetPresence,
};
use anyhow::{Context, Result, bail};
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::types::{
    Capability, Parameter, RegionConcurrencyType, StackSetOperationPreferences, Tag,
};
use backon::{ExponentialBuilder, Retryable};
use sechub_ingest_common::defaults::{FAILURE_TOLERANCE_COUNT, MAX_CONCURRENT_COUNT};
use sechub_ingest_common::{OperationStatus, StackSetIdentity, StackSummary, StackTag};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// CloudFormation client for the ingest stack-set and its instances
pub struct CloudFormationClient {
    client: Client,
}

impl FromAwsContext for CloudFormationClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.cloudformation_client(),
        }
    }
}

/// Operation preferences for instance rollout: parallel regions, wide
/// concurrency, and tolerance high enough that per-instance failures never
/// stop the operation.
fn rollout_preferences() -> StackSetOperationPreferences {
    StackSetOperationPreferences::builder()
        .region_concurrency_type(RegionConcurrencyType::Parallel)
        .max_concurrent_count(MAX_CONCURRENT_COUNT)
        .failure_tolerance_count(FAILURE_TOLERANCE_COUNT)
        .build()
}

/// Convert SDK stack tags, skipping any without a key
fn stack_tags(tags: &[Tag]) -> Vec<StackTag> {
    tags.iter()
        .filter_map(|t| {
            t.key()
                .map(|key| StackTag::new(key, t.value().unwrap_or_default()))
        })
        .collect()
}

impl StackSetOperations for CloudFormationClient {
    async fn create_stack_set(&self, request: &CreateStackSetRequest) -> Result<StackSetCreation> {
        info!(
            stack_set = %request.identity,
            template_url = %request.template_url,
            administration_role = %request.administration_role_arn,
            "Creating stack set"
        );

        let mut builder = self
            .client
            .create_stack_set()
            .stack_set_name(request.identity.as_str())
            .description(sechub_ingest_common::defaults::STACK_SET_DESCRIPTION)
            .template_url(&request.template_url)
            .capabilities(Capability::CapabilityNamedIam)
            .administration_role_arn(&request.administration_role_arn)
            .execution_role_name(&request.execution_role_name);

        for (key, value) in request.parameters() {
            builder = builder.parameters(
                Parameter::builder()
                    .parameter_key(key)
                    .parameter_value(value)
                    .use_previous_value(false)
                    .build(),
            );
        }

        for tag in &request.tags {
            builder = builder.tags(Tag::builder().key(&tag.key).value(&tag.value).build());
        }

        match builder.send().await {
            Ok(output) => Ok(StackSetCreation::Created {
                stack_set_id: output.stack_set_id().map(|s| s.to_string()),
            }),
            Err(e) => {
                let e = classify_sdk_error(&e);
                if e.is_already_exists() {
                    Ok(StackSetCreation::AlreadyExists)
                } else {
                    Err(e).context("Failed to create stack set")
                }
            }
        }
    }

    async fn describe_stack_set(&self, stack_set: &StackSetIdentity) -> Result<StackSetPresence> {
        match self
            .client
            .describe_stack_set()
            .stack_set_name(stack_set.as_str())
            .send()
            .await
        {
            Ok(output) if output.stack_set().is_some() => Ok(StackSetPresence::Found),
            Ok(_) => Ok(StackSetPresence::NotFound),
            Err(e) => match classify_sdk_error(&e) {
                AwsError::NotFound { .. } => Ok(StackSetPresence::NotFound),
                other => Err(other).context("Failed to describe stack set"),
            },
        }
    }

    /// Delete the stack-set, retrying while a previous operation still holds it.
    ///
    /// A stack-set that is already gone counts as deleted. Once `cancel` fires
    /// only the attempt in flight is allowed to finish.
    async fn delete_stack_set(
        &self,
        stack_set: &StackSetIdentity,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        info!(stack_set = %stack_set, "Deleting stack set");

        let cancelled = || cancel.is_some_and(CancellationToken::is_cancelled);

        let deletion = (|| async {
            self.client
                .delete_stack_set()
                .stack_set_name(stack_set.as_str())
                .send()
                .await
                .map(|_| ())
                .map_err(|e| classify_sdk_error(&e))
        })
        .retry(
            ExponentialBuilder::default()
                .with_min_delay(Duration::from_secs(5))
                .with_max_delay(Duration::from_secs(30))
                .with_max_times(5),
        )
        .when(|e| e.is_retryable() && !cancelled())
        .notify(|e, dur| {
            warn!(
                stack_set = %stack_set,
                delay = ?dur,
                error = %e,
                "Stack set deletion blocked, retrying..."
            );
        });

        // Abandon a pending backoff sleep when the deadline guard fires
        let result = match cancel {
            Some(token) if !token.is_cancelled() => tokio::select! {
                result = deletion => result,
                _ = token.cancelled() => {
                    bail!("Stack set deletion abandoned near the function deadline")
                }
            },
            _ => deletion.await,
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(stack_set = %stack_set, "Stack set already deleted");
                Ok(())
            }
            Err(e) => Err(e).context("Failed to delete stack set"),
        }
    }

    async fn create_stack_instances(
        &self,
        stack_set: &StackSetIdentity,
        target: &InstanceTarget,
    ) -> Result<OperationHandle> {
        info!(
            stack_set = %stack_set,
            account_id = %target.account_id,
            region = %target.region,
            "Creating stack instance"
        );

        let output = self
            .client
            .create_stack_instances()
            .stack_set_name(stack_set.as_str())
            .accounts(target.account_id.as_str())
            .regions(&target.region)
            .operation_preferences(rollout_preferences())
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .context("Failed to create stack instances")?;

        let operation_id = output
            .operation_id()
            .context("No operation id returned from CreateStackInstances")?;

        Ok(OperationHandle {
            stack_set: stack_set.clone(),
            operation_id: operation_id.to_string(),
        })
    }

    async fn delete_stack_instances(
        &self,
        stack_set: &StackSetIdentity,
        target: &InstanceTarget,
    ) -> Result<OperationHandle> {
        info!(
            stack_set = %stack_set,
            account_id = %target.account_id,
            region = %target.region,
            "Deleting stack instance"
        );

        let output = self
            .client
            .delete_stack_instances()
            .stack_set_name(stack_set.as_str())
            .accounts(target.account_id.as_str())
            .regions(&target.region)
            .retain_stacks(false)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .context("Failed to delete stack instances")?;

        let operation_id = output
            .operation_id()
            .context("No operation id returned from DeleteStackInstances")?;

        Ok(OperationHandle {
            stack_set: stack_set.clone(),
            operation_id: operation_id.to_string(),
        })
    }

    async fn operation_status(&self, handle: &OperationHandle) -> Result<OperationStatus> {
        let output = self
            .client
            .describe_stack_set_operation()
            .stack_set_name(handle.stack_set.as_str())
            .operation_id(&handle.operation_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .context("Failed to describe stack set operation")?;

        let raw = output
            .stack_set_operation()
            .and_then(|op| op.status())
            .context("Stack set operation has no status")?
            .as_str();

        let status = OperationStatus::from_provider(raw);
        if status == OperationStatus::Unknown {
            warn!(operation_id = %handle.operation_id, status = %raw, "Unrecognised operation status");
        }
        Ok(status)
    }

    async fn describe_stacks(&self, stack_name: &str) -> Result<Vec<StackSummary>> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .context("Failed to describe stacks")?;

        Ok(output
            .stacks()
            .iter()
            .map(|stack| StackSummary {
                stack_id: stack.stack_id().unwrap_or_default().to_string(),
                tags: stack_tags(stack.tags()),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdk_tags_without_key_are_skipped() {
        let tags = [
            Tag::builder().key("team").value("security").build(),
            Tag::builder().key("empty").build(),
            Tag::builder().value("orphan").build(),
        ];

        assert_eq!(
            stack_tags(&tags),
            vec![StackTag::new("team", "security"), StackTag::new("empty", "")]
        );
    }

    #[test]
    fn rollout_preferences_are_parallel() {
        let prefs = rollout_preferences();
        assert_eq!(
            prefs.region_concurrency_type(),
            Some(&RegionConcurrencyType::Parallel)
        );
        assert_eq!(prefs.max_concurrent_count(), Some(MAX_CONCURRENT_COUNT));
        assert_eq!(prefs.failure_tolerance_count(), Some(FAILURE_TOLERANCE_COUNT));
    }
}
