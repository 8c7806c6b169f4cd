//! Registry of webhook events that may be subscribed to.

use strum_macros::{AsRefStr, Display};

/// event name -> model action
pub const HOOK_EVENTS: &[(&str, &str)] = &[
    ("workflowlevel1.added", "workflow.WorkflowLevel1.created+"),
    ("workflowlevel1.changed", "workflow.WorkflowLevel1.updated+"),
    ("workflowlevel1.removed", "workflow.WorkflowLevel1.deleted+"),
    ("workflowlevel2.added", "workflow.WorkflowLevel2.created+"),
    ("workflowlevel2.changed", "workflow.WorkflowLevel2.updated+"),
    ("workflowlevel2.removed", "workflow.WorkflowLevel2.deleted+"),
    ("workflowteam.added", "workflow.WorkflowTeam.created+"),
    ("workflowteam.changed", "workflow.WorkflowTeam.updated+"),
    ("workflowteam.removed", "workflow.WorkflowTeam.deleted+"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum HookAction {
    Added,
    Changed,
    Removed,
}

pub fn is_hook_event(event_name: &str) -> bool {
    HOOK_EVENTS.iter().any(|(name, _)| *name == event_name)
}

pub fn model_action(event_name: &str) -> Option<&'static str> {
    HOOK_EVENTS
        .iter()
        .find(|(name, _)| *name == event_name)
        .map(|(_, action)| *action)
}

/// ex. ("workflowlevel1", Added) -> "workflowlevel1.added"
pub fn event_name(resource: &str, action: HookAction) -> String {
    format!("{}.{}", resource, action.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry() {
        assert!(is_hook_event("workflowlevel1.added"));
        assert!(!is_hook_event("workflowlevel3.added"));
        assert_eq!(
            model_action("workflowlevel2.removed"),
            Some("workflow.WorkflowLevel2.deleted+")
        );
        assert_eq!(
            event_name("workflowteam", HookAction::Changed),
            "workflowteam.changed"
        );
        assert!(is_hook_event(&event_name("workflowlevel2", HookAction::Added)));
    }
}
