//! Domain events
//!
//! Mutations publish an event after the backend confirmed them and the
//! affected caches were invalidated. Listeners (dashboard, notifications)
//! refresh themselves silently in response.

use tokio::sync::broadcast;

use crate::cache::Resource;

/// Default number of events a slow listener may fall behind by
pub const DEFAULT_CAPACITY: usize = 64;

/// A confirmed write on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainEvent {
    FacturaCreated { id: i64 },
    FacturaUpdated { id: i64 },
    FacturaDeleted { id: i64 },
    ProductoCreated { id: i64 },
    ProductoUpdated { id: i64 },
    ProductoDeleted { id: i64 },
    ClienteCreated { id: i64 },
    ClienteUpdated { id: i64 },
    ClienteDeleted { id: i64 },
}

impl DomainEvent {
    /// Event name, `resource:action`
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::FacturaCreated { .. } => "factura:created",
            DomainEvent::FacturaUpdated { .. } => "factura:updated",
            DomainEvent::FacturaDeleted { .. } => "factura:deleted",
            DomainEvent::ProductoCreated { .. } => "producto:created",
            DomainEvent::ProductoUpdated { .. } => "producto:updated",
            DomainEvent::ProductoDeleted { .. } => "producto:deleted",
            DomainEvent::ClienteCreated { .. } => "cliente:created",
            DomainEvent::ClienteUpdated { .. } => "cliente:updated",
            DomainEvent::ClienteDeleted { .. } => "cliente:deleted",
        }
    }

    /// Resource the write happened on
    pub fn resource(&self) -> Resource {
        match self {
            DomainEvent::FacturaCreated { .. }
            | DomainEvent::FacturaUpdated { .. }
            | DomainEvent::FacturaDeleted { .. } => Resource::Facturas,
            DomainEvent::ProductoCreated { .. }
            | DomainEvent::ProductoUpdated { .. }
            | DomainEvent::ProductoDeleted { .. } => Resource::Productos,
            DomainEvent::ClienteCreated { .. }
            | DomainEvent::ClienteUpdated { .. }
            | DomainEvent::ClienteDeleted { .. } => Resource::Clientes,
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            DomainEvent::FacturaCreated { id }
            | DomainEvent::FacturaUpdated { id }
            | DomainEvent::FacturaDeleted { id }
            | DomainEvent::ProductoCreated { id }
            | DomainEvent::ProductoUpdated { id }
            | DomainEvent::ProductoDeleted { id }
            | DomainEvent::ClienteCreated { id }
            | DomainEvent::ClienteUpdated { id }
            | DomainEvent::ClienteDeleted { id } => id,
        }
    }

    /// True when a write to this event's resource makes `resource` stale
    pub fn affects(&self, resource: Resource) -> bool {
        self.resource().invalidates().contains(&resource)
    }
}

/// In-process publish/subscribe channel for [`DomainEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish to every current subscriber; returns how many there were
    pub fn publish(&self, event: DomainEvent) -> usize {
        log::debug!("Event {} (id {})", event.name(), event.id());
        // No subscribers is not an error
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Next event from `rx`, skipping over any the receiver lagged behind on.
///
/// Returns `None` once every sender is gone.
pub async fn next_event(rx: &mut broadcast::Receiver<DomainEvent>) -> Option<DomainEvent> {
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::debug!("Event listener lagged, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_resources() {
        let event = DomainEvent::FacturaCreated { id: 3 };
        assert_eq!(event.name(), "factura:created");
        assert_eq!(event.resource(), Resource::Facturas);
        assert_eq!(event.id(), 3);
        assert_eq!(DomainEvent::ProductoDeleted { id: 1 }.name(), "producto:deleted");
    }

    #[test]
    fn test_affects_follows_invalidation_rules() {
        let event = DomainEvent::FacturaUpdated { id: 1 };
        assert!(event.affects(Resource::Estadisticas));
        assert!(!event.affects(Resource::Clientes));
        assert!(DomainEvent::ProductoUpdated { id: 1 }.affects(Resource::Notificaciones));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(DomainEvent::ClienteCreated { id: 1 }), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let bus = EventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.clone().subscribe();

        assert_eq!(bus.publish(DomainEvent::FacturaDeleted { id: 9 }), 2);
        assert_eq!(next_event(&mut a).await, Some(DomainEvent::FacturaDeleted { id: 9 }));
        assert_eq!(next_event(&mut b).await, Some(DomainEvent::FacturaDeleted { id: 9 }));
    }

    #[tokio::test]
    async fn test_lagged_listener_skips_ahead() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for id in 0..5 {
            bus.publish(DomainEvent::ProductoUpdated { id });
        }

        let event = next_event(&mut rx).await.unwrap();
        assert_eq!(event.id(), 3);
    }

    #[tokio::test]
    async fn test_closed_when_bus_dropped() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        drop(bus);
        assert_eq!(next_event(&mut rx).await, None);
    }
}
