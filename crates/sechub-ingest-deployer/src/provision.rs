//! Stack-set creation with existence verification

use crate::aws::operations::StackSetOperations;
use crate::aws::types::{CreateStackSetRequest, StackSetCreation, StackSetPresence};
use sechub_ingest_common::StackSetIdentity;
use thiserror::Error;
use tracing::{error, info, warn};

/// Stack-set provisioning failures
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// `CreateStackSet` was rejected
    #[error("Failed to create stack set {stack_set}")]
    Create {
        stack_set: StackSetIdentity,
        #[source]
        source: anyhow::Error,
    },

    /// The stack-set could not be confirmed after creation
    #[error("Creation verification failed for stack set {stack_set}: {reason}")]
    VerificationFailed {
        stack_set: StackSetIdentity,
        reason: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ProvisionError {
    pub fn stack_set(&self) -> &StackSetIdentity {
        match self {
            ProvisionError::Create { stack_set, .. }
            | ProvisionError::VerificationFailed { stack_set, .. } => stack_set,
        }
    }
}

/// Create the stack-set and confirm it exists.
///
/// A name collision counts as already provisioned; verification runs either way.
pub async fn provision_stack_set<S: StackSetOperations>(
    stacks: &S,
    request: &CreateStackSetRequest,
) -> Result<StackSetCreation, ProvisionError> {
    let stack_set = &request.identity;

    let creation = stacks
        .create_stack_set(request)
        .await
        .map_err(|source| ProvisionError::Create {
            stack_set: stack_set.clone(),
            source,
        })?;

    match &creation {
        StackSetCreation::Created { stack_set_id } => {
            info!(stack_set = %stack_set, stack_set_id = ?stack_set_id, "Stack set created");
        }
        StackSetCreation::AlreadyExists => {
            warn!(stack_set = %stack_set, "Stack set already exists, reusing it");
        }
    }

    match stacks.describe_stack_set(stack_set).await {
        Ok(StackSetPresence::Found) => {
            info!(stack_set = %stack_set, "Stack set verified");
            Ok(creation)
        }
        Ok(StackSetPresence::NotFound) => {
            error!(stack_set = %stack_set, "Stack set not found after creation");
            Err(ProvisionError::VerificationFailed {
                stack_set: stack_set.clone(),
                reason: "stack set not found".to_string(),
                source: None,
            })
        }
        Err(e) => {
            error!(stack_set = %stack_set, error = ?e, "Failed to describe stack set after creation");
            Err(ProvisionError::VerificationFailed {
                stack_set: stack_set.clone(),
                reason: "describe failed".to_string(),
                source: Some(e),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::types::ApiToken;
    use crate::testing::{Call, FakeStackSets};
    use sechub_ingest_common::ExternalId;

    fn request() -> CreateStackSetRequest {
        CreateStackSetRequest::new(
            StackSetIdentity::for_account("acme", None),
            "https://example.com/t.yaml",
            "acme",
            ExternalId::generate(),
            ApiToken::new("secret"),
            "111122223333",
        )
    }

    #[tokio::test]
    async fn creates_then_verifies() {
        let fake = FakeStackSets::default();
        let creation = provision_stack_set(&fake, &request()).await.unwrap();

        assert!(matches!(creation, StackSetCreation::Created { .. }));
        let calls = fake.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], Call::CreateStackSet(_)));
        assert!(matches!(calls[1], Call::DescribeStackSet(_)));
    }

    #[tokio::test]
    async fn existing_stack_set_is_reused() {
        let fake = FakeStackSets::default().with_existing_stack_set();
        let creation = provision_stack_set(&fake, &request()).await.unwrap();
        assert_eq!(creation, StackSetCreation::AlreadyExists);
        assert_eq!(fake.calls().len(), 2);
    }

    #[tokio::test]
    async fn not_found_after_create_is_verification_failure() {
        let fake = FakeStackSets::default().missing_after_create();
        let err = provision_stack_set(&fake, &request()).await.unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::VerificationFailed { source: None, .. }
        ));
        assert_eq!(err.stack_set().as_str(), "LACEWORK-SEC-HUB_INGEST-acme");
        assert!(err.to_string().contains("LACEWORK-SEC-HUB_INGEST-acme"));
    }

    #[tokio::test]
    async fn describe_error_carries_source() {
        let fake = FakeStackSets::default().fail_on("describe_stack_set");
        let err = provision_stack_set(&fake, &request()).await.unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::VerificationFailed { source: Some(_), .. }
        ));
    }

    #[tokio::test]
    async fn create_error_skips_verification() {
        let fake = FakeStackSets::default().fail_on("create_stack_set");
        let err = provision_stack_set(&fake, &request()).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Create { .. }));
        assert_eq!(fake.calls().len(), 1);
    }
}
