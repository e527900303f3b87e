use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::model::notification::NotificationEvent;

/// Outbound queue towards the messaging collaborator.
///
/// Events are published after the ledger transaction committed. Delivery is
/// at-most-once: a full or closed queue drops the event with a warning and
/// the caller never sees an error.
#[derive(Clone)]
pub struct NotificationBus {
    tx: mpsc::Sender<NotificationEvent>,
}

impl NotificationBus {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<NotificationEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (NotificationBus { tx }, rx)
    }

    pub fn publish(&self, event: NotificationEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    event_type = %event.event_type,
                    entity_id = event.entity_id,
                    "Notification queue full, event dropped"
                );
            }
            Err(TrySendError::Closed(event)) => {
                tracing::warn!(
                    event_type = %event.event_type,
                    entity_id = event.entity_id,
                    "Notification dispatcher gone, event dropped"
                );
            }
        }
    }
}

/// Drains the queue until every bus handle is dropped.
pub async fn run_dispatcher(mut rx: mpsc::Receiver<NotificationEvent>) {
    while let Some(event) = rx.recv().await {
        match serde_json::to_string(&event) {
            Ok(payload) => {
                tracing::info!(
                    target: "notifications",
                    event_id = %event.event_id,
                    tenant_id = %event.tenant_id,
                    employee_id = event.employee_id,
                    payload = %payload,
                    "Notification dispatched"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, event_id = %event.event_id, "Notification could not be encoded");
            }
        }
    }
    tracing::info!("Notification dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(entity_id: u64) -> NotificationEvent {
        NotificationEvent::new("acme", "leave_approved", 1000, entity_id, "Your leave was approved")
    }

    #[actix_web::test]
    async fn publish_and_receive() {
        let (bus, mut rx) = NotificationBus::new(4);
        bus.publish(event(7));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.entity_id, 7);
        assert_eq!(received.event_type, "leave_approved");
    }

    #[actix_web::test]
    async fn full_queue_drops_without_error() {
        let (bus, mut rx) = NotificationBus::new(1);
        bus.publish(event(1));
        bus.publish(event(2));

        assert_eq!(rx.recv().await.unwrap().entity_id, 1);
        assert!(rx.try_recv().is_err());
    }

    #[actix_web::test]
    async fn closed_queue_is_not_fatal() {
        let (bus, rx) = NotificationBus::new(1);
        drop(rx);
        bus.publish(event(1));
    }

    #[test]
    fn event_serializes_camel_case() {
        let json = serde_json::to_value(event(3)).unwrap();
        assert_eq!(json["eventType"], "leave_approved");
        assert_eq!(json["employeeId"], 1000);
        assert_eq!(json["entityId"], 3);
    }
}
