//! Provider operation traits for testing
//!
//! These traits abstract the CloudFormation and Organizations calls so the
//! lifecycle logic can be unit tested without hitting real AWS.

use super::types::{
    AccountPage, CreateStackSetRequest, InstanceTarget, OperationHandle, StackSetCreation,
    StackSetPresence,
};
use anyhow::Result;
use sechub_ingest_common::{OperationStatus, StackSetIdentity, StackSummary};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// CloudFormation stack-set and stack calls
pub trait StackSetOperations: Send + Sync {
    /// Submit `CreateStackSet`
    fn create_stack_set(
        &self,
        request: &CreateStackSetRequest,
    ) -> impl Future<Output = Result<StackSetCreation>> + Send;

    /// `DescribeStackSet`, with not-found reported as a value
    fn describe_stack_set(
        &self,
        stack_set: &StackSetIdentity,
    ) -> impl Future<Output = Result<StackSetPresence>> + Send;

    /// `DeleteStackSet`; retries stop once `cancel` fires
    fn delete_stack_set(
        &self,
        stack_set: &StackSetIdentity,
        cancel: Option<&CancellationToken>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// `CreateStackInstances` for a single account/region
    fn create_stack_instances(
        &self,
        stack_set: &StackSetIdentity,
        target: &InstanceTarget,
    ) -> impl Future<Output = Result<OperationHandle>> + Send;

    /// `DeleteStackInstances` for a single account/region, never retaining stacks
    fn delete_stack_instances(
        &self,
        stack_set: &StackSetIdentity,
        target: &InstanceTarget,
    ) -> impl Future<Output = Result<OperationHandle>> + Send;

    /// `DescribeStackSetOperation` status
    fn operation_status(
        &self,
        handle: &OperationHandle,
    ) -> impl Future<Output = Result<OperationStatus>> + Send;

    /// `DescribeStacks` filtered by stack name
    fn describe_stacks(
        &self,
        stack_name: &str,
    ) -> impl Future<Output = Result<Vec<StackSummary>>> + Send;
}

/// Organizations account listing
pub trait AccountDirectory: Send + Sync {
    /// Fetch one `ListAccounts` page
    fn list_accounts_page(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<AccountPage>> + Send;
}
