//! CloudFormation custom-resource request payload

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Lifecycle phase requested by CloudFormation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

/// Custom-resource event as delivered to the function
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    #[serde(default)]
    pub resource_type: String,
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default, deserialize_with = "string_map")]
    pub resource_properties: HashMap<String, String>,
}

impl CustomResourceEvent {
    /// Parse an invocation payload.
    ///
    /// Returns `Ok(None)` for payloads that are not lifecycle events (no
    /// `RequestType`), such as warm-up pings.
    pub fn from_payload(payload: serde_json::Value) -> Result<Option<Self>, serde_json::Error> {
        if payload.get("RequestType").is_none() {
            return Ok(None);
        }
        serde_json::from_value(payload).map(Some)
    }
}

/// Properties arrive as arbitrary JSON; keep strings as-is and everything else
/// in its JSON text form.
fn string_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| {
            let v = match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (k, v)
        })
        .collect())
}

#[cfg(test)]
pub(crate) fn sample_payload(request_type: &str) -> serde_json::Value {
    serde_json::json!({
        "RequestType": request_type,
        "ServiceToken": "arn:aws:lambda:us-east-1:111122223333:function:lacework-sechub",
        "ResponseURL": "https://cloudformation-custom-resource-response.s3.amazonaws.com/signed",
        "StackId": "arn:aws:cloudformation:us-east-1:111122223333:stack/lw/abc",
        "RequestId": "req-1",
        "ResourceType": "Custom::SecHubIngest",
        "LogicalResourceId": "SecHubIngest",
        "ResourceProperties": {
            "ServiceToken": "arn:aws:lambda:us-east-1:111122223333:function:lacework-sechub",
            "Retries": 3,
            "Enabled": true
        }
    })
}
