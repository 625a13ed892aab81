//! Agent lifecycle events - the host integration boundary
//!
//! A host watching real agents turns what it sees into [`AgentEvent`]s. Each
//! variant maps onto exactly one [`OfficeState`] operation.

use serde::{Deserialize, Serialize};

use crate::components::AgentId;
use crate::office::OfficeState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    Created { id: AgentId },
    Removed { id: AgentId },
    Active { id: AgentId, active: bool },
    Tool { id: AgentId, tool: Option<String> },
    SubagentCreated { parent_id: AgentId, parent_tool_id: String },
    SubagentRemoved { parent_id: AgentId, parent_tool_id: String },
    SubagentsCleared { parent_id: AgentId },
    PermissionRequested { id: AgentId },
    PermissionCleared { id: AgentId },
    Waiting { id: AgentId },
    BubbleDismissed { id: AgentId },
}

impl AgentEvent {
    /// The agent this event is about (the parent, for sub-agent events).
    pub fn agent_id(&self) -> AgentId {
        match self {
            AgentEvent::Created { id }
            | AgentEvent::Removed { id }
            | AgentEvent::Active { id, .. }
            | AgentEvent::Tool { id, .. }
            | AgentEvent::PermissionRequested { id }
            | AgentEvent::PermissionCleared { id }
            | AgentEvent::Waiting { id }
            | AgentEvent::BubbleDismissed { id } => *id,
            AgentEvent::SubagentCreated { parent_id, .. }
            | AgentEvent::SubagentRemoved { parent_id, .. }
            | AgentEvent::SubagentsCleared { parent_id } => *parent_id,
        }
    }
}

impl OfficeState {
    pub fn apply_event(&mut self, event: &AgentEvent) {
        match event {
            AgentEvent::Created { id } => self.add_agent(*id, None, None),
            AgentEvent::Removed { id } => self.remove_agent(*id),
            AgentEvent::Active { id, active } => self.set_agent_active(*id, *active),
            AgentEvent::Tool { id, tool } => self.set_agent_tool(*id, tool.as_deref()),
            AgentEvent::SubagentCreated {
                parent_id,
                parent_tool_id,
            } => {
                self.add_subagent(*parent_id, parent_tool_id);
            }
            AgentEvent::SubagentRemoved {
                parent_id,
                parent_tool_id,
            } => self.remove_subagent(*parent_id, parent_tool_id),
            AgentEvent::SubagentsCleared { parent_id } => self.remove_all_subagents(*parent_id),
            AgentEvent::PermissionRequested { id } => self.show_permission_bubble(*id),
            AgentEvent::PermissionCleared { id } => self.clear_permission_bubble(*id),
            AgentEvent::Waiting { id } => self.show_waiting_bubble(*id),
            AgentEvent::BubbleDismissed { id } => self.dismiss_bubble(*id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::BubbleKind;
    use officesim_logic::config::OfficeConfig;

    #[test]
    fn test_events_drive_office() {
        let mut office = OfficeState::with_default_layout(OfficeConfig::seeded(3));
        let script = [
            AgentEvent::Created { id: 1 },
            AgentEvent::Tool {
                id: 1,
                tool: Some("Read".to_string()),
            },
            AgentEvent::SubagentCreated {
                parent_id: 1,
                parent_tool_id: "task-1".to_string(),
            },
            AgentEvent::SubagentCreated {
                parent_id: 1,
                parent_tool_id: "task-1".to_string(),
            },
            AgentEvent::PermissionRequested { id: 1 },
        ];
        for event in &script {
            office.apply_event(event);
        }
        assert_eq!(office.agent_count(), 2);
        assert_eq!(office.character(1).unwrap().current_tool.as_deref(), Some("Read"));
        assert_eq!(office.bubble(1).map(|b| b.kind), Some(BubbleKind::Permission));

        office.apply_event(&AgentEvent::SubagentsCleared { parent_id: 1 });
        office.apply_event(&AgentEvent::Active { id: 1, active: false });
        assert_eq!(office.agent_count(), 1);
        assert!(!office.character(1).unwrap().is_active);

        office.apply_event(&AgentEvent::Removed { id: 1 });
        office.apply_event(&AgentEvent::Waiting { id: 1 });
        assert_eq!(office.agent_count(), 0);
    }

    #[test]
    fn test_event_json_shape() {
        let json = r#"{"type":"subagent_created","parent_id":4,"parent_tool_id":"t"}"#;
        let event: AgentEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            AgentEvent::SubagentCreated {
                parent_id: 4,
                parent_tool_id: "t".to_string()
            }
        );
        assert_eq!(event.agent_id(), 4);
    }
}
