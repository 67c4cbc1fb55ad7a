use serde::{Deserialize, Serialize};

/// A change applied to the service registry.
///
/// Positions are the ones in effect after the mutation, except for
/// `Deleted`, which carries the position the service held before removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceEvent {
    Added { id: String, position: usize },
    Updated { id: String, position: usize },
    Moved { id: String, from: usize, to: usize },
    Deleted { id: String, position: usize },
}

impl ServiceEvent {
    pub fn id(&self) -> &str {
        match self {
            ServiceEvent::Added { id, .. }
            | ServiceEvent::Updated { id, .. }
            | ServiceEvent::Moved { id, .. }
            | ServiceEvent::Deleted { id, .. } => id,
        }
    }
}
