//! AWS error classification and handling
//!
//! Provides typed errors for CloudFormation and Organizations calls using the
//! `.code()` from `ProvideErrorMetadata` instead of matching on Debug output.

use aws_sdk_cloudformation::error::ProvideErrorMetadata;
use thiserror::Error;

/// AWS error categories for retry and cleanup logic
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found (safe to skip in cleanup)
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// Resource already exists (safe to ignore in create operations)
    #[error("Resource already exists: {message}")]
    AlreadyExists { message: String },

    /// Another stack-set operation is still running (retryable)
    #[error("Another operation is in progress: {message}")]
    OperationInProgress { message: String },

    /// Rate limit exceeded (retryable with backoff)
    #[error("Rate limit exceeded")]
    Throttled,

    /// Generic AWS SDK error with code and message
    #[error("AWS error{}: {message}", code_suffix(.code))]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AwsError::OperationInProgress { .. } | AwsError::Throttled
        )
    }

    /// Check if this is an "already exists" error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, AwsError::AlreadyExists { .. })
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            AwsError::Sdk { code: Some(c), .. } => suggestion_for_code(c),
            _ => None,
        }
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default()
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "StackSetNotFoundException",
    "StackInstanceNotFoundException",
    "OperationNotFoundException",
    "AccountNotFoundException",
];

/// Known AWS error codes for "already exists" conditions
const ALREADY_EXISTS_CODES: &[&str] = &["NameAlreadyExistsException"];

/// Codes raised while another stack-set operation holds the lock
const IN_PROGRESS_CODES: &[&str] = &[
    "OperationInProgressException",
    "ConcurrentModificationException",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound { message },
        Some(c) if ALREADY_EXISTS_CODES.contains(&c) => AwsError::AlreadyExists { message },
        Some(c) if IN_PROGRESS_CODES.contains(&c) => AwsError::OperationInProgress { message },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled,
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify any SDK error that exposes error metadata.
///
/// Works for `SdkError<E>` of every CloudFormation and Organizations
/// operation, since they share the smithy `ProvideErrorMetadata` trait.
pub fn classify_sdk_error<E: ProvideErrorMetadata>(error: &E) -> AwsError {
    classify_aws_error(error.code(), error.message())
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "AccessDeniedException",
        "Check that the function role allows organizations:ListAccounts and the cloudformation stack-set actions.",
    ),
    (
        "AWSOrganizationsNotInUseException",
        "This account is not part of an organization; deploy from the Control Tower management account.",
    ),
    (
        "StackSetNotEmptyException",
        "Stack instances still exist; delete them before deleting the stack-set.",
    ),
    (
        "ValidationError",
        "Check the template URL and stack parameters.",
    ),
    (
        "InvalidOperationException",
        "Check that the Control Tower administration and execution roles exist.",
    ),
];

/// Find the first `AwsError` in an error chain and return its suggestion.
pub fn suggestion_for(error: &anyhow::Error) -> Option<&'static str> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<AwsError>())
        .and_then(AwsError::suggestion)
}

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<&'static str> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| *s)
}
