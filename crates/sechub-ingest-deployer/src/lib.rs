//! sechub-ingest-deployer - CloudFormation custom resource that rolls the
//! Lacework Security Hub ingest stack-set out to the Control Tower Audit account
//!
//! The Lambda entry point lives in `main.rs`; everything it drives is here so
//! it can be exercised against in-memory providers.

pub mod aws;
pub mod config;
pub mod handler;
pub mod lifecycle;
pub mod logging;
pub mod provision;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;
