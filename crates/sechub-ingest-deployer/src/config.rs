//! Deployer configuration loaded from the function environment

use crate::aws::types::ApiToken;
use crate::wait::WaitConfig;
use sechub_ingest_common::defaults::{
    DEFAULT_DEADLINE_MARGIN, DEFAULT_DELETE_RESPONSE_DELAY, DEFAULT_POLL_STEP,
    DEFAULT_WAIT_TIMEOUT,
};
use sechub_ingest_common::{StackSetIdentity, account_name_from_url, effective_account_name};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub const LACEWORK_URL: &str = "lacework_url";
pub const SUB_ACCOUNT_NAME: &str = "lacework_sub_account_name";
pub const TEMPLATE_URL: &str = "sec_hub_ingest_template";
pub const API_TOKEN: &str = "api_token";
pub const STACK_NAME: &str = "cfn_stack";
pub const STACK_ID: &str = "cfn_stack_id";
pub const POLL_STEP_SECS: &str = "STACK_SET_POLL_STEP_SECS";
pub const WAIT_TIMEOUT_SECS: &str = "STACK_SET_WAIT_TIMEOUT_SECS";
pub const DELETE_RESPONSE_DELAY_SECS: &str = "DELETE_RESPONSE_DELAY_SECS";
pub const DEADLINE_MARGIN_SECS: &str = "DEADLINE_MARGIN_SECS";

/// Configuration loading errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variable absent or blank
    #[error("{0} must be set")]
    Missing(&'static str),

    /// Duration variable is not a whole number of seconds
    #[error("{key} must be a whole number of seconds, got: {value}")]
    InvalidSeconds { key: &'static str, value: String },

    /// Poll step of zero would spin on the provider
    #[error("{0} must be greater than 0")]
    ZeroDuration(&'static str),
}

/// Everything one invocation needs from the environment
#[derive(Debug, Clone)]
pub struct DeployerConfig {
    /// Lacework tenant URL, e.g. `acme.lacework.net`
    pub lacework_url: String,
    pub sub_account_name: Option<String>,
    pub template_url: String,
    pub api_token: ApiToken,
    /// Name of the stack that owns the custom resource (tag source)
    pub stack_name: String,
    pub stack_id: String,
    pub wait: WaitConfig,
    pub delete_response_delay: Duration,
    pub deadline_margin: Duration,
}

impl DeployerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load from an explicit set of variables
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let required = |key: &'static str| -> Result<String, ConfigError> {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(ConfigError::Missing(key))
        };

        let seconds = |key: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
                None => Ok(default),
                Some(raw) => raw
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidSeconds {
                        key,
                        value: raw.to_string(),
                    }),
            }
        };

        let step = seconds(POLL_STEP_SECS, DEFAULT_POLL_STEP)?;
        if step.is_zero() {
            return Err(ConfigError::ZeroDuration(POLL_STEP_SECS));
        }

        Ok(Self {
            lacework_url: required(LACEWORK_URL)?,
            sub_account_name: vars
                .get(SUB_ACCOUNT_NAME)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            template_url: required(TEMPLATE_URL)?,
            api_token: ApiToken::new(required(API_TOKEN)?),
            stack_name: required(STACK_NAME)?,
            stack_id: required(STACK_ID)?,
            wait: WaitConfig {
                step,
                timeout: seconds(WAIT_TIMEOUT_SECS, DEFAULT_WAIT_TIMEOUT)?,
            },
            delete_response_delay: seconds(
                DELETE_RESPONSE_DELAY_SECS,
                DEFAULT_DELETE_RESPONSE_DELAY,
            )?,
            deadline_margin: seconds(DEADLINE_MARGIN_SECS, DEFAULT_DEADLINE_MARGIN)?,
        })
    }

    /// Account name: the URL up to its first `.`
    pub fn account_name(&self) -> &str {
        account_name_from_url(&self.lacework_url)
    }

    /// Value passed as the `LaceworkAccount` template parameter
    pub fn effective_account_name(&self) -> &str {
        effective_account_name(self.account_name(), self.sub_account_name.as_deref())
    }

    /// Stack-set name for this deployment
    pub fn identity(&self) -> StackSetIdentity {
        StackSetIdentity::for_account(self.account_name(), self.sub_account_name.as_deref())
    }
}

#[cfg(test)]
pub(crate) fn test_vars() -> Vec<(&'static str, &'static str)> {
    vec![
        (LACEWORK_URL, "lacework.example.com"),
        (TEMPLATE_URL, "https://bucket.s3.amazonaws.com/sechub.yaml"),
        (API_TOKEN, "token-123"),
        (STACK_NAME, "lacework-control-tower"),
        (STACK_ID, "arn:aws:cloudformation:us-east-1:111122223333:stack/lw/abc"),
    ]
}
