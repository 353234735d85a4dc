//! Shared test utilities for the Security Hub ingest deployer
//!
//! ## Modules
//!
//! - [`aws`]: AWS region detection, unique names and function environments

pub mod aws;

pub use aws::{get_test_region, test_account_name, test_function_arn, test_run_id};
