//! Shared AWS configuration context
//!
//! Provides `AwsContext` for loading AWS SDK configuration once per cold
//! start and creating the CloudFormation and Organizations clients from it.

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, SdkConfig};
use std::sync::Arc;

/// SDK-level retry attempts for every call (standard retry mode)
const SDK_MAX_ATTEMPTS: u32 = 10;

/// Shared AWS configuration context for creating service clients.
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
}

impl AwsContext {
    /// Load AWS configuration from the Lambda environment.
    ///
    /// Region and credentials come from the execution role; retries use the
    /// standard mode with a raised attempt budget.
    pub async fn load() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(SDK_MAX_ATTEMPTS))
            .load()
            .await;

        Self {
            config: Arc::new(config),
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Region the SDK resolved, if any.
    pub fn region(&self) -> Option<&str> {
        self.config.region().map(|r| r.as_ref())
    }

    /// Create a CloudFormation client from this context.
    pub fn cloudformation_client(&self) -> aws_sdk_cloudformation::Client {
        aws_sdk_cloudformation::Client::new(self.sdk_config())
    }

    /// Create an Organizations client from this context.
    pub fn organizations_client(&self) -> aws_sdk_organizations::Client {
        aws_sdk_organizations::Client::new(self.sdk_config())
    }
}

/// Construct a client wrapper from a loaded [`AwsContext`]
pub trait FromAwsContext {
    fn from_context(ctx: &AwsContext) -> Self;
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_context_clone_shares_config() {
        let ctx1 = AwsContext::load().await;
        let ctx2 = ctx1.clone();
        assert_eq!(ctx1.region(), ctx2.region());
    }
}
