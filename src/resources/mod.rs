//! Resource controllers
//!
//! One controller per backend resource. Each exposes an observable
//! [`ResourceState`] (`data`, `loading`, `error`), refreshes through the
//! cached client, and after a successful write reloads itself fresh and
//! publishes a [`DomainEvent`](crate::events::DomainEvent).

use std::sync::Arc;

use crate::cache::Clock;
use crate::client::{AuthGate, SaleApi};
use crate::events::EventBus;

mod clientes;
mod dashboard;
mod facturas;
mod notificaciones;
mod productos;
mod state;

pub use clientes::ClientesResource;
pub use dashboard::{Dashboard, DashboardResource};
pub use facturas::FacturasResource;
pub use notificaciones::{NotificacionesResource, OpenedNotification};
pub use productos::ProductosResource;
pub use state::{RefreshMode, ResourceState, StateCell};

/// Collaborators shared by every controller
#[derive(Clone)]
pub struct ResourceContext {
    pub client: Arc<dyn SaleApi>,
    pub gate: AuthGate,
    pub bus: EventBus,
    pub clock: Arc<dyn Clock>,
}

impl ResourceContext {
    pub fn new(client: Arc<dyn SaleApi>, gate: AuthGate, bus: EventBus, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            gate,
            bus,
            clock,
        }
    }
}
