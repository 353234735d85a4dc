//! Tags propagated from the invoking stack onto the stack-set

/// A single key/value tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackTag {
    pub key: String,
    pub value: String,
}

impl StackTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Summary of a stack as returned by `DescribeStacks`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackSummary {
    pub stack_id: String,
    pub tags: Vec<StackTag>,
}

/// Pick the tags of the stack whose id matches exactly.
///
/// Returns an empty set when no stack matches.
pub fn tags_for_stack(stacks: &[StackSummary], stack_id: &str) -> Vec<StackTag> {
    stacks
        .iter()
        .find(|s| s.stack_id == stack_id)
        .map(|s| s.tags.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stacks() -> Vec<StackSummary> {
        vec![
            StackSummary {
                stack_id: "A".to_string(),
                tags: vec![StackTag::new("team", "red")],
            },
            StackSummary {
                stack_id: "B".to_string(),
                tags: vec![StackTag::new("team", "blue")],
            },
        ]
    }

    #[test]
    fn matching_id_returns_its_tags() {
        assert_eq!(
            tags_for_stack(&stacks(), "B"),
            vec![StackTag::new("team", "blue")]
        );
    }

    #[test]
    fn no_match_returns_empty() {
        assert!(tags_for_stack(&stacks(), "C").is_empty());
        assert!(tags_for_stack(&[], "A").is_empty());
    }
}
