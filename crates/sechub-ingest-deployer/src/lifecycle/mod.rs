//! Custom-resource lifecycle: Create/Update provisions the ingest stack-set,
//! Delete tears it down.

mod create;
mod delete;
pub mod event;
pub mod invocation;
pub mod response;

pub use create::CreateReport;
pub use delete::DeleteReport;
pub use event::{CustomResourceEvent, RequestType};
pub use invocation::{InvocationContext, InvocationError};
pub use response::{
    CustomResourceResponse, Responder, ResponseError, ResponseSink, ResponseStatus,
};

use crate::aws::operations::{AccountDirectory, StackSetOperations};
use crate::config::DeployerConfig;
use crate::provision::ProvisionError;
use crate::wait::WaitOutcome;
use sechub_ingest_common::StackSetIdentity;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Fatal Create/Update failures
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Failed to look up the {name} account")]
    AccountLookup {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("No account named {name} in the organization")]
    AuditAccountNotFound { name: &'static str },

    #[error("Failed to create stack instance for stack set {stack_set}")]
    InstanceCreation {
        stack_set: StackSetIdentity,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to poll operation {operation_id} on stack set {stack_set}")]
    Wait {
        stack_set: StackSetIdentity,
        operation_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Operation {operation_id} on stack set {stack_set} {outcome}")]
    OperationUnsuccessful {
        stack_set: StackSetIdentity,
        operation_id: String,
        outcome: WaitOutcome,
    },
}

/// What a handled lifecycle event produced
#[derive(Debug)]
pub enum LifecycleOutcome {
    Created(CreateReport),
    Deleted(DeleteReport),
}

impl LifecycleOutcome {
    /// Physical resource id reported back to CloudFormation
    pub fn physical_resource_id(&self) -> &str {
        match self {
            LifecycleOutcome::Created(report) => report.identity.as_str(),
            LifecycleOutcome::Deleted(report) => report.identity.as_str(),
        }
    }

    /// `Data` attributes of the SUCCESS response
    pub fn response_data(&self) -> BTreeMap<String, String> {
        let mut data = BTreeMap::new();
        data.insert(
            "StackSetName".to_string(),
            self.physical_resource_id().to_string(),
        );
        if let LifecycleOutcome::Created(report) = self {
            data.insert("OperationId".to_string(), report.operation_id.clone());
        }
        data
    }
}

/// Drives one lifecycle event against the stack-set and account providers
pub struct LifecycleController<S, A> {
    stacks: S,
    accounts: A,
}

impl<S: StackSetOperations, A: AccountDirectory> LifecycleController<S, A> {
    pub fn new(stacks: S, accounts: A) -> Self {
        Self { stacks, accounts }
    }

    /// Dispatch on the request type. Update reruns create.
    ///
    /// `physical_resource_id` is the id CloudFormation sent with the event;
    /// Delete targets it when it names an ingest stack-set.
    pub async fn handle(
        &self,
        request_type: RequestType,
        config: &DeployerConfig,
        invocation: &InvocationContext,
        physical_resource_id: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        match request_type {
            RequestType::Create | RequestType::Update => self
                .create(config, invocation, cancel)
                .await
                .map(LifecycleOutcome::Created),
            RequestType::Delete => Ok(LifecycleOutcome::Deleted(
                self.delete(config, invocation, physical_resource_id, cancel)
                    .await,
            )),
        }
    }

    #[cfg(test)]
    pub(crate) fn stacks(&self) -> &S {
        &self.stacks
    }
}
