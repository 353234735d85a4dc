//! Delete: best-effort teardown of the Audit instance and the stack-set
//!
//! Nothing here fails the request. Each step's error is logged and recorded
//! as a warning so CloudFormation can always finish deleting the parent stack.

use super::{InvocationContext, LifecycleController};
use crate::aws::account::{AccountLookup, find_account_id};
use crate::aws::error::suggestion_for;
use crate::aws::operations::{AccountDirectory, StackSetOperations};
use crate::aws::types::InstanceTarget;
use crate::config::DeployerConfig;
use crate::wait::{WaitOutcome, wait_for_operation};
use sechub_ingest_common::StackSetIdentity;
use sechub_ingest_common::defaults::AUDIT_ACCOUNT_NAME;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Which teardown steps ran and what went wrong along the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub identity: StackSetIdentity,
    /// `DeleteStackInstances` was issued
    pub instance_delete_attempted: bool,
    /// Instance deletion was confirmed by the waiter
    pub instance_deleted: bool,
    pub stack_set_delete_attempted: bool,
    pub stack_set_deleted: bool,
    pub warnings: Vec<String>,
}

impl DeleteReport {
    fn new(identity: StackSetIdentity) -> Self {
        Self {
            identity,
            instance_delete_attempted: false,
            instance_deleted: false,
            stack_set_delete_attempted: false,
            stack_set_deleted: false,
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, message: String) {
        warn!(stack_set = %self.identity, "{message}");
        self.warnings.push(message);
    }

    fn warn_error(&mut self, step: &str, error: &anyhow::Error) {
        let mut message = format!("{step}: {error:#}");
        if let Some(hint) = suggestion_for(error) {
            message.push_str(" (");
            message.push_str(hint);
            message.push(')');
        }
        self.warn(message);
    }
}

impl<S: StackSetOperations, A: AccountDirectory> LifecycleController<S, A> {
    pub(super) async fn delete(
        &self,
        config: &DeployerConfig,
        invocation: &InvocationContext,
        physical_resource_id: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> DeleteReport {
        // A cleanup Delete after a rename carries the old stack-set name
        let configured = config.identity();
        let identity = physical_resource_id
            .and_then(StackSetIdentity::from_physical_id)
            .unwrap_or_else(|| configured.clone());
        if identity != configured {
            info!(
                stack_set = %identity,
                configured = %configured,
                "Deleting the stack set named by the physical resource id"
            );
        }

        let mut report = DeleteReport::new(identity);
        info!(stack_set = %report.identity, region = %invocation.region, "Removing Security Hub ingest");

        match find_account_id(&self.accounts, AUDIT_ACCOUNT_NAME).await {
            Ok(AccountLookup::Found(account_id)) => {
                let target = InstanceTarget {
                    account_id,
                    region: invocation.region.clone(),
                };
                self.delete_instance(&target, config, cancel, &mut report)
                    .await;
            }
            Ok(AccountLookup::NotFound) => {
                report.warn(format!(
                    "No account named {AUDIT_ACCOUNT_NAME}, skipping stack instance deletion"
                ));
            }
            Err(e) => report.warn_error("Failed to look up the Audit account", &e),
        }

        report.stack_set_delete_attempted = true;
        match self.stacks.delete_stack_set(&report.identity, cancel).await {
            Ok(()) => {
                report.stack_set_deleted = true;
                info!(stack_set = %report.identity, "Stack set deleted");
            }
            Err(e) => report.warn_error("Failed to delete stack set", &e),
        }

        info!(
            stack_set = %report.identity,
            instance_deleted = report.instance_deleted,
            stack_set_deleted = report.stack_set_deleted,
            warnings = report.warnings.len(),
            "Delete finished"
        );
        report
    }

    async fn delete_instance(
        &self,
        target: &InstanceTarget,
        config: &DeployerConfig,
        cancel: Option<&CancellationToken>,
        report: &mut DeleteReport,
    ) {
        report.instance_delete_attempted = true;
        let handle = match self
            .stacks
            .delete_stack_instances(&report.identity, target)
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                report.warn_error("Failed to delete stack instance", &e);
                return;
            }
        };

        match wait_for_operation(&self.stacks, &handle, &config.wait, cancel).await {
            Ok(WaitOutcome::Succeeded) => {
                report.instance_deleted = true;
                info!(
                    stack_set = %report.identity,
                    account_id = %target.account_id,
                    "Stack instance deleted"
                );
            }
            Ok(outcome) => report.warn(format!(
                "Stack instance deletion {outcome} (operation {})",
                handle.operation_id
            )),
            Err(e) => report.warn_error("Failed to poll stack instance deletion", &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::lifecycle::LifecycleController;
    use crate::lifecycle::tests::{config, invocation, org};
    use crate::testing::{Call, FakeDirectory, FakeStackSets, audit_target};
    use sechub_ingest_common::OperationStatus;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test(start_paused = true)]
    async fn deletes_instance_then_stack_set() {
        let controller = LifecycleController::new(
            FakeStackSets::default().with_statuses(&[OperationStatus::Succeeded]),
            org(),
        );

        let report = controller.delete(&config(), &invocation(), None, None).await;

        assert!(report.instance_deleted);
        assert!(report.stack_set_deleted);
        assert!(report.warnings.is_empty());

        let calls = controller.stacks().calls();
        let order: Vec<_> = calls
            .iter()
            .filter(|c| !matches!(c, Call::OperationStatus(_)))
            .collect();
        assert!(matches!(order[0], Call::DeleteStackInstances(_, t) if *t == audit_target("us-west-2")));
        assert!(matches!(order[1], Call::DeleteStackSet(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn physical_id_from_earlier_name_is_deleted() {
        let controller = LifecycleController::new(
            FakeStackSets::default().with_statuses(&[OperationStatus::Succeeded]),
            org(),
        );

        let report = controller
            .delete(
                &config(),
                &invocation(),
                Some("LACEWORK-SEC-HUB_INGEST-oldname"),
                None,
            )
            .await;

        assert_eq!(report.identity.as_str(), "LACEWORK-SEC-HUB_INGEST-oldname");
        assert!(controller.stacks().calls().iter().all(|c| match c {
            Call::DeleteStackSet(id) | Call::DeleteStackInstances(id, _) => {
                id.as_str() == "LACEWORK-SEC-HUB_INGEST-oldname"
            }
            _ => true,
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn foreign_physical_id_falls_back_to_configured_name() {
        let controller = LifecycleController::new(
            FakeStackSets::default().with_statuses(&[OperationStatus::Succeeded]),
            org(),
        );

        let report = controller
            .delete(
                &config(),
                &invocation(),
                Some("sechub-ingest-unprovisioned"),
                None,
            )
            .await;

        assert_eq!(report.identity.as_str(), "LACEWORK-SEC-HUB_INGEST-lacework");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_audit_account_skips_instance_deletion() {
        let controller = LifecycleController::new(
            FakeStackSets::default(),
            FakeDirectory::single_page(&[("222222222222", "Log Archive")]),
        );

        let report = controller.delete(&config(), &invocation(), None, None).await;

        assert!(!report.instance_delete_attempted);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Audit"));
        assert!(report.stack_set_delete_attempted);
        assert!(report.stack_set_deleted);
        assert!(
            !controller
                .stacks()
                .calls()
                .iter()
                .any(|c| matches!(c, Call::DeleteStackInstances(..)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn every_failure_is_swallowed() {
        let controller = LifecycleController::new(
            FakeStackSets::default()
                .fail_on("delete_stack_instances")
                .fail_on("delete_stack_set"),
            org(),
        );

        let report = controller.delete(&config(), &invocation(), None, None).await;

        assert!(report.instance_delete_attempted);
        assert!(!report.instance_deleted);
        assert!(report.stack_set_delete_attempted);
        assert!(!report.stack_set_deleted);
        assert_eq!(report.warnings.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn listing_failure_still_deletes_stack_set() {
        let controller = LifecycleController::new(FakeStackSets::default(), FakeDirectory::failing());

        let report = controller.delete(&config(), &invocation(), None, None).await;

        assert!(!report.instance_delete_attempted);
        assert!(report.stack_set_deleted);
        assert_eq!(report.warnings.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_instance_operation_still_deletes_stack_set() {
        let controller = LifecycleController::new(
            FakeStackSets::default().with_statuses(&[OperationStatus::Running, OperationStatus::Failed]),
            org(),
        );

        let report = controller.delete(&config(), &invocation(), None, None).await;

        assert!(!report.instance_deleted);
        assert!(report.stack_set_deleted);
        assert!(report.warnings[0].contains("FAILED"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_wait_still_deletes_stack_set() {
        let controller = LifecycleController::new(
            FakeStackSets::default().with_statuses(&[OperationStatus::Running; 8]),
            org(),
        );
        let token = CancellationToken::new();
        let guard = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            guard.cancel();
        });

        let report = controller
            .delete(&config(), &invocation(), None, Some(&token))
            .await;

        assert!(!report.instance_deleted);
        assert!(report.stack_set_delete_attempted);
        assert!(report.warnings[0].contains("cancelled"));
    }
}
