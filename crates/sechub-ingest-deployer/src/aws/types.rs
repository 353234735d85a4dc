//! Request and result types for stack-set calls

use super::account::AccountId;
use sechub_ingest_common::defaults::{
    EXECUTION_ROLE_NAME, PARAM_API_TOKEN, PARAM_EXTERNAL_ID, PARAM_LACEWORK_ACCOUNT,
    administration_role_arn,
};
use sechub_ingest_common::{ExternalId, StackSetIdentity, StackTag};

/// Everything `CreateStackSet` needs
#[derive(Debug, Clone)]
pub struct CreateStackSetRequest {
    pub identity: StackSetIdentity,
    pub template_url: String,
    /// Value of the `LaceworkAccount` parameter
    pub lacework_account: String,
    pub external_id: ExternalId,
    pub api_token: ApiToken,
    pub tags: Vec<StackTag>,
    pub administration_role_arn: String,
    pub execution_role_name: String,
}

impl CreateStackSetRequest {
    /// Build a request using the Control Tower roles of `management_account_id`
    pub fn new(
        identity: StackSetIdentity,
        template_url: impl Into<String>,
        lacework_account: impl Into<String>,
        external_id: ExternalId,
        api_token: ApiToken,
        management_account_id: &str,
    ) -> Self {
        Self {
            identity,
            template_url: template_url.into(),
            lacework_account: lacework_account.into(),
            external_id,
            api_token,
            tags: Vec::new(),
            administration_role_arn: administration_role_arn(management_account_id),
            execution_role_name: EXECUTION_ROLE_NAME.to_string(),
        }
    }

    /// Attach tags inherited from the invoking stack
    pub fn with_tags(mut self, tags: Vec<StackTag>) -> Self {
        self.tags = tags;
        self
    }

    /// Template parameters as (key, value) pairs, in declaration order
    pub fn parameters(&self) -> [(&'static str, &str); 3] {
        [
            (PARAM_LACEWORK_ACCOUNT, self.lacework_account.as_str()),
            (PARAM_EXTERNAL_ID, self.external_id.expose()),
            (PARAM_API_TOKEN, self.api_token.expose()),
        ]
    }
}

/// Lacework API token; `Debug` is redacted
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// Outcome of `CreateStackSet`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackSetCreation {
    Created { stack_set_id: Option<String> },
    /// A stack-set with this name already exists (Update reruns create)
    AlreadyExists,
}

/// Outcome of `DescribeStackSet`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackSetPresence {
    Found,
    NotFound,
}

/// Handle on an asynchronous stack-set operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    pub stack_set: StackSetIdentity,
    pub operation_id: String,
}

/// Where a single stack instance lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceTarget {
    pub account_id: AccountId,
    pub region: String,
}

/// One page of `ListAccounts`
#[derive(Debug, Clone, Default)]
pub struct AccountPage {
    pub accounts: Vec<AccountSummary>,
    pub next_token: Option<String>,
}

/// Organizations account as far as name resolution cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_control_tower_roles() {
        let request = CreateStackSetRequest::new(
            StackSetIdentity::for_account("acme", None),
            "https://example.com/t.yaml",
            "acme",
            ExternalId::generate(),
            ApiToken::new("secret"),
            "111122223333",
        );
        assert_eq!(
            request.administration_role_arn,
            "arn:aws:iam::111122223333:role/service-role/AWSControlTowerStackSetRole"
        );
        assert_eq!(request.execution_role_name, "AWSControlTowerExecution");
    }

    #[test]
    fn parameters_carry_literal_values() {
        let external_id = ExternalId::generate();
        let request = CreateStackSetRequest::new(
            StackSetIdentity::for_account("acme", Some("team")),
            "https://example.com/t.yaml",
            "team",
            external_id.clone(),
            ApiToken::new("secret"),
            "111122223333",
        );
        assert_eq!(
            request.parameters(),
            [
                ("LaceworkAccount", "team"),
                ("ExternalID", external_id.expose()),
                ("ApiToken", "secret"),
            ]
        );
    }

    #[test]
    fn api_token_debug_is_redacted() {
        assert_eq!(format!("{:?}", ApiToken::new("secret")), "ApiToken(***)");
    }
}
