//! Stack-set operation status codes
//!
//! Mirrors the `StackSetOperationStatus` values CloudFormation reports, so the
//! waiter can be driven and tested without the SDK types.

/// Status of an asynchronous stack-set operation
///
/// Only `Running` and `Stopping` are treated as in-flight. Everything else,
/// including `Queued` and unrecognised values, ends the wait.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
pub enum OperationStatus {
    #[strum(serialize = "QUEUED")]
    Queued,
    #[strum(serialize = "RUNNING")]
    Running,
    #[strum(serialize = "STOPPING")]
    Stopping,
    #[strum(serialize = "SUCCEEDED")]
    Succeeded,
    #[strum(serialize = "FAILED")]
    Failed,
    #[strum(serialize = "STOPPED")]
    Stopped,
    /// Anything the provider reports that this crate does not know about
    #[strum(serialize = "UNKNOWN")]
    Unknown,
}

impl OperationStatus {
    /// Parse a provider status string; unknown values map to `Unknown`
    pub fn from_provider(s: &str) -> Self {
        s.parse().unwrap_or(Self::Unknown)
    }

    /// The operation is still in flight
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running | Self::Stopping)
    }

    /// The operation finished successfully
    pub fn is_success(self) -> bool {
        self == Self::Succeeded
    }
}
