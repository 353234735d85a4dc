//! Tag lookup on the invoking stack
//!
//! Tags are cosmetic metadata, so lookup failures degrade to an empty set
//! instead of failing the deployment.

use super::operations::StackSetOperations;
use sechub_ingest_common::StackTag;
use sechub_ingest_common::tags::tags_for_stack;
use tracing::{debug, error};

/// Tags of the stack named `stack_name` whose id is exactly `stack_id`.
pub async fn fetch_stack_tags<S: StackSetOperations>(
    stacks: &S,
    stack_name: &str,
    stack_id: &str,
) -> Vec<StackTag> {
    match stacks.describe_stacks(stack_name).await {
        Ok(found) => {
            let tags = tags_for_stack(&found, stack_id);
            debug!(
                stack_name = %stack_name,
                stacks = found.len(),
                tags = tags.len(),
                "Fetched stack tags"
            );
            tags
        }
        Err(e) => {
            error!(stack_name = %stack_name, error = ?e, "Failed to describe stack, continuing without tags");
            Vec::new()
        }
    }
}
