//! AWS service clients and the provider traits the lifecycle is written against

pub mod account;
pub mod cloudformation;
pub mod context;
pub mod error;
pub mod operations;
pub mod tags;
pub mod types;

pub use account::{AccountId, AccountLookup, OrganizationsClient, find_account_id};
pub use cloudformation::CloudFormationClient;
pub use context::{AwsContext, FromAwsContext};
pub use error::{AwsError, classify_aws_error, classify_sdk_error, suggestion_for};
pub use operations::{AccountDirectory, StackSetOperations};
pub use tags::fetch_stack_tags;
pub use types::{
    AccountPage, AccountSummary, ApiToken, CreateStackSetRequest, InstanceTarget,
    OperationHandle, StackSetCreation, StackSetPresence,
};
