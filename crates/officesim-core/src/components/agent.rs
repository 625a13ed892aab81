//! Identity components for avatar entities.

use serde::{Deserialize, Serialize};

use officesim_logic::character::AgentId;

/// Monotonic creation index. hecs iterates by archetype, and attaching or
/// removing a bubble moves an entity between archetypes, so anything that
/// draws from the shared RNG walks entities in this order instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpawnOrder(pub u64);

/// Marks a sub-agent and names the (parent, tool) pair that created it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubagentLink {
    pub parent_agent_id: AgentId,
    pub parent_tool_id: String,
}
