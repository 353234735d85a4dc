//! Fixed values for the Security Hub ingest stack-set
//!
//! These constants describe the deployment model: the stack-set naming scheme,
//! the Control Tower roles used for cross-account administration, and the
//! operation preferences handed to CloudFormation.

use std::time::Duration;

/// Prefix prepended to the Lacework account name to form the stack-set name
pub const STACK_SET_NAME_PREFIX: &str = "LACEWORK-SEC-HUB_INGEST-";

/// Human-readable description attached to the stack-set
pub const STACK_SET_DESCRIPTION: &str = "Lacework's cloud-native threat detection, compliance, \
behavioral anomaly detection, and automated AWS security monitoring.";

/// Organizations display name of the account that receives the ingest stack
pub const AUDIT_ACCOUNT_NAME: &str = "Audit";

/// Role (in the management account) that administers the stack-set
pub const ADMINISTRATION_ROLE_PATH: &str = "role/service-role/AWSControlTowerStackSetRole";

/// Role assumed in each target account to deploy instances
pub const EXECUTION_ROLE_NAME: &str = "AWSControlTowerExecution";

/// Template parameter carrying the Lacework account (or sub-account) name
pub const PARAM_LACEWORK_ACCOUNT: &str = "LaceworkAccount";

/// Template parameter carrying the cross-account trust secret
pub const PARAM_EXTERNAL_ID: &str = "ExternalID";

/// Template parameter carrying the Lacework API token
pub const PARAM_API_TOKEN: &str = "ApiToken";

/// Maximum number of accounts CloudFormation deploys to at once
pub const MAX_CONCURRENT_COUNT: i32 = 100;

/// Per-instance failures tolerated before CloudFormation stops the operation
pub const FAILURE_TOLERANCE_COUNT: i32 = 999;

/// Length of the generated external id
pub const EXTERNAL_ID_LEN: usize = 7;

/// Linear poll step: the Nth status poll waits `N * step`
pub const DEFAULT_POLL_STEP: Duration = Duration::from_secs(20);

/// Upper bound on a single operation wait (Lambda itself stops at 900 s)
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(840);

/// Pause before answering a Delete so CloudWatch receives the final log lines
pub const DEFAULT_DELETE_RESPONSE_DELAY: Duration = Duration::from_secs(15);

/// Time reserved before the Lambda deadline for sending the response
pub const DEFAULT_DEADLINE_MARGIN: Duration = Duration::from_secs(10);

/// Build the administration role ARN for a management account
pub fn administration_role_arn(management_account_id: &str) -> String {
    format!("arn:aws:iam::{management_account_id}:{ADMINISTRATION_ROLE_PATH}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administration_role_arn_format() {
        assert_eq!(
            administration_role_arn("123456789012"),
            "arn:aws:iam::123456789012:role/service-role/AWSControlTowerStackSetRole"
        );
    }
}
