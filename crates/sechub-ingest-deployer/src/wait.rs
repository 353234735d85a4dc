//! Stack-set operation waiting with linear backoff, deadline and cancellation.
//!
//! CloudFormation reports stack-set operations asynchronously; the waiter
//! polls `DescribeStackSetOperation` until the status leaves RUNNING/STOPPING.
//! The Nth poll is preceded by a `N * step` sleep.

use crate::aws::operations::StackSetOperations;
use crate::aws::types::OperationHandle;
use anyhow::Result;
use sechub_ingest_common::OperationStatus;
use sechub_ingest_common::defaults::{DEFAULT_POLL_STEP, DEFAULT_WAIT_TIMEOUT};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Configuration for operation waiting.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Delay unit; the Nth poll waits `N * step` first
    pub step: Duration,
    /// Maximum total time to wait before giving up
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_POLL_STEP,
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

/// How a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Terminal status was SUCCEEDED
    Succeeded,
    /// Terminal status was anything else
    Failed(OperationStatus),
    /// The deadline passed while the operation was still running
    TimedOut { polls: u32 },
    /// The cancellation token fired
    Cancelled,
}

impl WaitOutcome {
    pub fn is_success(self) -> bool {
        self == WaitOutcome::Succeeded
    }
}

impl std::fmt::Display for WaitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitOutcome::Succeeded => f.write_str("succeeded"),
            WaitOutcome::Failed(status) => write!(f, "finished with status {status}"),
            WaitOutcome::TimedOut { polls } => write!(f, "timed out after {polls} polls"),
            WaitOutcome::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Poll a stack-set operation until it reaches a terminal status.
///
/// # Returns
/// * `Ok(WaitOutcome)` - terminal status, timeout, or cancellation
/// * `Err` - a status poll failed
pub async fn wait_for_operation<S: StackSetOperations>(
    stacks: &S,
    handle: &OperationHandle,
    config: &WaitConfig,
    cancel: Option<&CancellationToken>,
) -> Result<WaitOutcome> {
    info!(
        stack_set = %handle.stack_set,
        operation_id = %handle.operation_id,
        "Waiting for stack set operation to finish"
    );

    let deadline = Instant::now() + config.timeout;
    let mut polls = 0u32;

    loop {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                warn!(operation_id = %handle.operation_id, polls, "Wait cancelled");
                return Ok(WaitOutcome::Cancelled);
            }
        }

        let now = Instant::now();
        if now >= deadline {
            warn!(
                operation_id = %handle.operation_id,
                polls,
                timeout = ?config.timeout,
                "Timed out waiting for stack set operation"
            );
            return Ok(WaitOutcome::TimedOut { polls });
        }

        let remaining = deadline - now;
        let delay = config
            .step
            .checked_mul(polls + 1)
            .map_or(remaining, |d| d.min(remaining));

        debug!(operation_id = %handle.operation_id, delay_secs = delay.as_secs(), "Sleeping before poll");

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = async {
                if let Some(token) = cancel {
                    token.cancelled().await
                } else {
                    std::future::pending::<()>().await
                }
            } => {
                warn!(operation_id = %handle.operation_id, polls, "Wait cancelled");
                return Ok(WaitOutcome::Cancelled);
            }
        }

        let status = stacks.operation_status(handle).await?;
        polls += 1;

        if status.is_running() {
            info!(
                stack_set = %handle.stack_set,
                operation_id = %handle.operation_id,
                status = %status,
                "Still running"
            );
            continue;
        }

        info!(
            operation_id = %handle.operation_id,
            status = %status,
            polls,
            "Stack set operation finished"
        );

        return Ok(if status.is_success() {
            WaitOutcome::Succeeded
        } else {
            WaitOutcome::Failed(status)
        });
    }
}
