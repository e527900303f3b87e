use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outbound event handed to the messaging collaborator after a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub event_id: Uuid,
    pub tenant_id: String,
    pub event_type: String,
    pub employee_id: u64,
    pub entity_id: u64,
    pub message: String,
}

impl NotificationEvent {
    pub fn new(
        tenant_id: &str,
        event_type: impl Into<String>,
        employee_id: u64,
        entity_id: u64,
        message: impl Into<String>,
    ) -> Self {
        NotificationEvent {
            event_id: Uuid::new_v4(),
            tenant_id: tenant_id.to_string(),
            event_type: event_type.into(),
            employee_id,
            entity_id,
            message: message.into(),
        }
    }
}
