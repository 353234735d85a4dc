//! Stack-set naming and per-create secrets

use crate::defaults::{EXTERNAL_ID_LEN, STACK_SET_NAME_PREFIX};
use rand::Rng;

/// Name of the stack-set, used as its key in every CloudFormation call
///
/// Always derived from the same inputs, so Create, Update and Delete all
/// address the same stack-set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct StackSetIdentity(String);

impl StackSetIdentity {
    /// Build the identity from a prefix and the Lacework account names.
    ///
    /// A present, non-empty sub-account name wins over the primary name.
    pub fn derive(prefix: &str, account_name: &str, sub_account_name: Option<&str>) -> Self {
        Self(format!(
            "{prefix}{}",
            effective_account_name(account_name, sub_account_name)
        ))
    }

    /// Identity with the standard Security Hub ingest prefix
    pub fn for_account(account_name: &str, sub_account_name: Option<&str>) -> Self {
        Self::derive(STACK_SET_NAME_PREFIX, account_name, sub_account_name)
    }

    /// Recognise a physical resource id previously reported for an ingest stack-set.
    ///
    /// Returns `None` unless the id carries the standard prefix and a name after it.
    pub fn from_physical_id(id: &str) -> Option<Self> {
        match id.strip_prefix(STACK_SET_NAME_PREFIX) {
            Some(name) if !name.is_empty() => Some(Self(id.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The account name the stack-set is parameterized with
pub fn effective_account_name<'a>(account_name: &'a str, sub_account_name: Option<&'a str>) -> &'a str {
    match sub_account_name {
        Some(sub) if !sub.is_empty() => sub,
        _ => account_name,
    }
}

/// Extract the Lacework account name from its URL (`acme.lacework.net` -> `acme`)
pub fn account_name_from_url(url: &str) -> &str {
    url.split('.').next().unwrap_or(url)
}

const EXTERNAL_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Cross-account trust secret, generated fresh on every create
///
/// `Debug` is redacted so the value never reaches the logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ExternalId(String);

impl ExternalId {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let id = (0..EXTERNAL_ID_LEN)
            .map(|_| EXTERNAL_ID_CHARSET[rng.gen_range(0..EXTERNAL_ID_CHARSET.len())] as char)
            .collect();
        Self(id)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ExternalId(***)")
    }
}
