//! Create/Update: provision the stack-set and roll it out to the Audit account

use super::{InvocationContext, LifecycleController, LifecycleError};
use crate::aws::account::find_account_id;
use crate::aws::operations::{AccountDirectory, StackSetOperations};
use crate::aws::tags::fetch_stack_tags;
use crate::aws::types::{CreateStackSetRequest, InstanceTarget, StackSetCreation};
use crate::config::DeployerConfig;
use crate::provision::provision_stack_set;
use crate::wait::wait_for_operation;
use sechub_ingest_common::defaults::AUDIT_ACCOUNT_NAME;
use sechub_ingest_common::{ExternalId, StackSetIdentity};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Result of a successful Create/Update
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub identity: StackSetIdentity,
    pub creation: StackSetCreation,
    pub target: InstanceTarget,
    pub operation_id: String,
}

impl<S: StackSetOperations, A: AccountDirectory> LifecycleController<S, A> {
    pub(super) async fn create(
        &self,
        config: &DeployerConfig,
        invocation: &InvocationContext,
        cancel: Option<&CancellationToken>,
    ) -> Result<CreateReport, LifecycleError> {
        let identity = config.identity();
        info!(
            stack_set = %identity,
            lacework_account = %config.effective_account_name(),
            region = %invocation.region,
            "Provisioning Security Hub ingest"
        );

        // Resolve the target first so a missing Audit account leaves nothing behind
        let audit_account = find_account_id(&self.accounts, AUDIT_ACCOUNT_NAME)
            .await
            .map_err(|source| LifecycleError::AccountLookup {
                name: AUDIT_ACCOUNT_NAME,
                source,
            })?
            .found()
            .ok_or(LifecycleError::AuditAccountNotFound {
                name: AUDIT_ACCOUNT_NAME,
            })?;

        let target = InstanceTarget {
            account_id: audit_account,
            region: invocation.region.clone(),
        };

        let tags = fetch_stack_tags(&self.stacks, &config.stack_name, &config.stack_id).await;
        let request = CreateStackSetRequest::new(
            identity.clone(),
            &config.template_url,
            config.effective_account_name(),
            ExternalId::generate(),
            config.api_token.clone(),
            &invocation.management_account_id,
        )
        .with_tags(tags);

        let creation = provision_stack_set(&self.stacks, &request).await?;

        let handle = self
            .stacks
            .create_stack_instances(&identity, &target)
            .await
            .map_err(|source| LifecycleError::InstanceCreation {
                stack_set: identity.clone(),
                source,
            })?;

        let outcome = wait_for_operation(&self.stacks, &handle, &config.wait, cancel)
            .await
            .map_err(|source| LifecycleError::Wait {
                stack_set: identity.clone(),
                operation_id: handle.operation_id.clone(),
                source,
            })?;

        if !outcome.is_success() {
            error!(
                stack_set = %identity,
                operation_id = %handle.operation_id,
                outcome = %outcome,
                "Stack instance creation did not succeed"
            );
            return Err(LifecycleError::OperationUnsuccessful {
                stack_set: identity,
                operation_id: handle.operation_id,
                outcome,
            });
        }

        info!(
            stack_set = %identity,
            account_id = %target.account_id,
            region = %target.region,
            "Security Hub ingest stack instance created"
        );

        Ok(CreateReport {
            identity,
            creation,
            target,
            operation_id: handle.operation_id,
        })
    }
}
