//! Organizations account lookup by display name

use super::context::{AwsContext, FromAwsContext};
use super::error::classify_sdk_error;
use super::operations::AccountDirectory;
use super::types::{AccountPage, AccountSummary};
use anyhow::{Context, Result};
use aws_sdk_organizations::Client;
use tracing::{debug, info};

/// Strongly-typed AWS account ID (12-digit string)
///
/// This newtype prevents accidentally mixing account IDs with other strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(s: impl Into<String>) -> Self {
        AccountId(s.into())
    }
}

/// Result of resolving an account by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountLookup {
    Found(AccountId),
    NotFound,
}

impl AccountLookup {
    pub fn found(self) -> Option<AccountId> {
        match self {
            AccountLookup::Found(id) => Some(id),
            AccountLookup::NotFound => None,
        }
    }
}

/// Organizations client used to list member accounts
pub struct OrganizationsClient {
    client: Client,
}

impl FromAwsContext for OrganizationsClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.organizations_client(),
        }
    }
}

impl AccountDirectory for OrganizationsClient {
    async fn list_accounts_page(&self, next_token: Option<String>) -> Result<AccountPage> {
        let response = self
            .client
            .list_accounts()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .context("Failed to list organization accounts")?;

        let accounts = response
            .accounts()
            .iter()
            .filter_map(|acct| {
                Some(AccountSummary {
                    id: acct.id()?.to_string(),
                    name: acct.name()?.to_string(),
                })
            })
            .collect();

        Ok(AccountPage {
            accounts,
            next_token: response.next_token().map(|s| s.to_string()),
        })
    }
}

/// Find the id of the first account whose name matches `name` exactly.
///
/// Walks every page of the listing. Matching is case-sensitive.
pub async fn find_account_id<D: AccountDirectory>(
    directory: &D,
    name: &str,
) -> Result<AccountLookup> {
    let mut next_token: Option<String> = None;
    let mut pages = 0u32;

    loop {
        let page = directory.list_accounts_page(next_token.take()).await?;
        pages += 1;

        if let Some(acct) = page.accounts.into_iter().find(|a| a.name == name) {
            info!(account_name = %name, account_id = %acct.id, "Resolved account");
            return Ok(AccountLookup::Found(AccountId::new(acct.id)));
        }

        // Handle pagination
        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    debug!(account_name = %name, pages, "No account with that name");
    Ok(AccountLookup::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDirectory;

    fn directory() -> FakeDirectory {
        FakeDirectory::single_page(&[("111111111111", "Audit"), ("222222222222", "Dev")])
    }

    #[tokio::test]
    async fn resolves_exact_name() {
        let lookup = find_account_id(&directory(), "Audit").await.unwrap();
        assert_eq!(lookup, AccountLookup::Found(AccountId::new("111111111111")));
    }

    #[tokio::test]
    async fn missing_name_is_not_found() {
        let lookup = find_account_id(&directory(), "Missing").await.unwrap();
        assert_eq!(lookup, AccountLookup::NotFound);
    }

    #[tokio::test]
    async fn match_is_case_sensitive() {
        let lookup = find_account_id(&directory(), "audit").await.unwrap();
        assert_eq!(lookup, AccountLookup::NotFound);
    }

    #[tokio::test]
    async fn follows_pagination() {
        let dir = FakeDirectory::paged(vec![
            vec![("1", "Dev"), ("2", "Prod")],
            vec![],
            vec![("3", "Log Archive"), ("4", "Audit")],
        ]);
        let lookup = find_account_id(&dir, "Audit").await.unwrap();
        assert_eq!(lookup.found(), Some(AccountId::new("4")));
        assert_eq!(dir.pages_served(), 3);
    }

    #[tokio::test]
    async fn first_match_wins() {
        let dir = FakeDirectory::paged(vec![vec![("1", "Audit")], vec![("2", "Audit")]]);
        let lookup = find_account_id(&dir, "Audit").await.unwrap();
        assert_eq!(lookup.found(), Some(AccountId::new("1")));
        assert_eq!(dir.pages_served(), 1);
    }

    #[tokio::test]
    async fn listing_error_propagates() {
        let dir = FakeDirectory::failing();
        assert!(find_account_id(&dir, "Audit").await.is_err());
    }
}
