//! In-memory provider fakes shared by the unit tests.

use crate::aws::account::AccountId;
use crate::aws::operations::{AccountDirectory, StackSetOperations};
use crate::aws::types::{
    AccountPage, AccountSummary, CreateStackSetRequest, InstanceTarget, OperationHandle,
    StackSetCreation, StackSetPresence,
};
use anyhow::{Result, bail};
use sechub_ingest_common::{OperationStatus, StackSetIdentity, StackSummary};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio_util::sync::CancellationToken;

/// A recorded provider call
#[derive(Debug, Clone)]
pub enum Call {
    CreateStackSet(CreateStackSetRequest),
    DescribeStackSet(StackSetIdentity),
    DeleteStackSet(StackSetIdentity),
    CreateStackInstances(StackSetIdentity, InstanceTarget),
    DeleteStackInstances(StackSetIdentity, InstanceTarget),
    OperationStatus(String),
    DescribeStacks(String),
}

/// Scripted CloudFormation fake
#[derive(Default)]
pub struct FakeStackSets {
    stacks: Vec<StackSummary>,
    statuses: Mutex<VecDeque<OperationStatus>>,
    failing: HashSet<&'static str>,
    already_exists: bool,
    missing_after_create: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeStackSets {
    pub fn with_stacks(mut self, stacks: Vec<StackSummary>) -> Self {
        self.stacks = stacks;
        self
    }

    /// Statuses returned by successive `operation_status` polls
    pub fn with_statuses(self, statuses: &[OperationStatus]) -> Self {
        *self.statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    /// Make the named operation return an error
    pub fn fail_on(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// `CreateStackSet` reports the name as taken
    pub fn with_existing_stack_set(mut self) -> Self {
        self.already_exists = true;
        self
    }

    /// `DescribeStackSet` reports not-found even after a create
    pub fn missing_after_create(mut self) -> Self {
        self.missing_after_create = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn status_polls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::OperationStatus(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failing.contains(operation) {
            bail!("injected {operation} failure");
        }
        Ok(())
    }

    fn handle_for(stack_set: &StackSetIdentity, prefix: &str) -> OperationHandle {
        OperationHandle {
            stack_set: stack_set.clone(),
            operation_id: format!("{prefix}-op"),
        }
    }
}

impl StackSetOperations for FakeStackSets {
    async fn create_stack_set(&self, request: &CreateStackSetRequest) -> Result<StackSetCreation> {
        self.record(Call::CreateStackSet(request.clone()));
        self.check("create_stack_set")?;
        if self.already_exists {
            return Ok(StackSetCreation::AlreadyExists);
        }
        Ok(StackSetCreation::Created {
            stack_set_id: Some(format!("{}:1", request.identity)),
        })
    }

    async fn describe_stack_set(&self, stack_set: &StackSetIdentity) -> Result<StackSetPresence> {
        self.record(Call::DescribeStackSet(stack_set.clone()));
        self.check("describe_stack_set")?;
        if self.missing_after_create {
            return Ok(StackSetPresence::NotFound);
        }
        Ok(StackSetPresence::Found)
    }

    async fn delete_stack_set(
        &self,
        stack_set: &StackSetIdentity,
        _cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        self.record(Call::DeleteStackSet(stack_set.clone()));
        self.check("delete_stack_set")
    }

    async fn create_stack_instances(
        &self,
        stack_set: &StackSetIdentity,
        target: &InstanceTarget,
    ) -> Result<OperationHandle> {
        self.record(Call::CreateStackInstances(stack_set.clone(), target.clone()));
        self.check("create_stack_instances")?;
        Ok(Self::handle_for(stack_set, "create"))
    }

    async fn delete_stack_instances(
        &self,
        stack_set: &StackSetIdentity,
        target: &InstanceTarget,
    ) -> Result<OperationHandle> {
        self.record(Call::DeleteStackInstances(stack_set.clone(), target.clone()));
        self.check("delete_stack_instances")?;
        Ok(Self::handle_for(stack_set, "delete"))
    }

    async fn operation_status(&self, handle: &OperationHandle) -> Result<OperationStatus> {
        self.record(Call::OperationStatus(handle.operation_id.clone()));
        self.check("operation_status")?;
        match self.statuses.lock().unwrap().pop_front() {
            Some(status) => Ok(status),
            None => bail!("no scripted status left"),
        }
    }

    async fn describe_stacks(&self, stack_name: &str) -> Result<Vec<StackSummary>> {
        self.record(Call::DescribeStacks(stack_name.to_string()));
        self.check("describe_stacks")?;
        Ok(self.stacks.clone())
    }
}

/// Paged Organizations fake; tokens are `page-N`
#[derive(Default)]
pub struct FakeDirectory {
    pages: Vec<Vec<AccountSummary>>,
    failing: bool,
    served: AtomicU32,
}

impl FakeDirectory {
    pub fn single_page(accounts: &[(&str, &str)]) -> Self {
        Self::paged(vec![accounts.to_vec()])
    }

    pub fn paged(pages: Vec<Vec<(&str, &str)>>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|page| {
                    page.into_iter()
                        .map(|(id, name)| AccountSummary {
                            id: id.to_string(),
                            name: name.to_string(),
                        })
                        .collect()
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn pages_served(&self) -> u32 {
        self.served.load(Ordering::SeqCst)
    }
}

impl AccountDirectory for FakeDirectory {
    async fn list_accounts_page(&self, next_token: Option<String>) -> Result<AccountPage> {
        if self.failing {
            bail!("injected ListAccounts failure");
        }
        self.served.fetch_add(1, Ordering::SeqCst);

        let index = match next_token {
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(usize::MAX),
            None => 0,
        };
        let Some(accounts) = self.pages.get(index) else {
            bail!("invalid pagination token");
        };

        Ok(AccountPage {
            accounts: accounts.clone(),
            next_token: (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1)),
        })
    }
}

pub fn handle() -> OperationHandle {
    OperationHandle {
        stack_set: StackSetIdentity::for_account("acme", None),
        operation_id: "op-1".to_string(),
    }
}

pub fn audit_target(region: &str) -> InstanceTarget {
    InstanceTarget {
        account_id: AccountId::new("111111111111"),
        region: region.to_string(),
    }
}
