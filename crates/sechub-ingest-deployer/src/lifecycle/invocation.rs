//! Facts about the running function derived from its ARN

use thiserror::Error;

/// Invoked function ARN could not be parsed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvocationError {
    #[error("Invoked function ARN has too few fields: {0}")]
    Malformed(String),

    #[error("Invoked function ARN has an empty {field} field: {arn}")]
    EmptyField { field: &'static str, arn: String },
}

/// Where this function runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// Control Tower management account (owner of the function)
    pub management_account_id: String,
    pub region: String,
}

impl InvocationContext {
    /// Parse `arn:partition:lambda:region:account:function:name[:qualifier]`
    pub fn from_function_arn(arn: &str) -> Result<Self, InvocationError> {
        let fields: Vec<&str> = arn.split(':').collect();
        if fields.len() < 6 {
            return Err(InvocationError::Malformed(arn.to_string()));
        }

        let field = |index: usize, name: &'static str| {
            let value = fields[index].trim();
            if value.is_empty() {
                Err(InvocationError::EmptyField {
                    field: name,
                    arn: arn.to_string(),
                })
            } else {
                Ok(value.to_string())
            }
        };

        Ok(Self {
            region: field(3, "region")?,
            management_account_id: field(4, "account")?,
        })
    }
}
