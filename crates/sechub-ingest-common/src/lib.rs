//! sechub-ingest-common - Shared types for the Security Hub ingest deployer
//!
//! Pure, SDK-free pieces of the deployment model, kept separate so they can
//! be unit tested without AWS dependencies.
//!
//! ## Modules
//!
//! - [`defaults`]: Stack-set naming, roles and operation preferences
//! - [`identity`]: Stack-set identity and external id generation
//! - [`status`]: Stack-set operation status codes
//! - [`tags`]: Tags copied from the invoking stack

pub mod defaults;
pub mod identity;
pub mod status;
pub mod tags;

pub use identity::{ExternalId, StackSetIdentity, account_name_from_url, effective_account_name};
pub use status::OperationStatus;
pub use tags::{StackSummary, StackTag};

/// Get the current timestamp in milliseconds since UNIX epoch.
///
/// Returns 0 if system time is before the epoch.
#[inline]
pub fn timestamp_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
