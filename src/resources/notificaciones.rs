//! Notification list controller
//!
//! Notification payloads are hints. Opening one fetches the record it
//! points at, bypassing the cache.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::state::{RefreshMode, ResourceState, StateCell};
use super::ResourceContext;
use crate::cache::Resource;
use crate::client::models::{Factura, NotificationRef, Notificacion, Producto};
use crate::error::Result;
use crate::events::{EventBus, next_event};

/// Record behind an opened notification
#[derive(Debug, Clone, PartialEq)]
pub enum OpenedNotification {
    Producto(Producto),
    Factura(Factura),
    /// Nothing to open; the message is all there is
    Mensaje(String),
}

pub struct NotificacionesResource {
    ctx: ResourceContext,
    state: Arc<StateCell<Vec<Notificacion>>>,
}

impl NotificacionesResource {
    pub fn new(ctx: ResourceContext) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            state: StateCell::new(),
        })
    }

    pub fn state(&self) -> ResourceState<Vec<Notificacion>> {
        self.state.snapshot()
    }

    pub fn unread_count(&self) -> usize {
        self.state
            .snapshot()
            .data
            .iter()
            .filter(|n| !n.is_read())
            .count()
    }

    pub async fn refresh(&self) -> Result<()> {
        self.fetch(RefreshMode::Visible, false).await
    }

    pub async fn refresh_silent(&self) -> Result<()> {
        self.fetch(RefreshMode::Silent, false).await
    }

    pub async fn reload(&self) -> Result<()> {
        self.fetch(RefreshMode::Visible, true).await
    }

    async fn fetch(&self, mode: RefreshMode, fresh: bool) -> Result<()> {
        let client = &self.ctx.client;
        self.state
            .refresh(&self.ctx.gate, mode, || async {
                if fresh {
                    client.list_notificaciones_fresh().await
                } else {
                    client.list_notificaciones().await
                }
            })
            .await
    }

    /// Fetch the current version of the record `notificacion` refers to
    pub async fn open(&self, notificacion: &Notificacion) -> Result<OpenedNotification> {
        self.ctx.gate.check()?;
        match notificacion.target() {
            Some(NotificationRef::Producto(id)) => self
                .ctx
                .client
                .get_producto_fresh(id)
                .await
                .map(OpenedNotification::Producto),
            Some(NotificationRef::Factura(id)) => self
                .ctx
                .client
                .get_factura_fresh(id)
                .await
                .map(OpenedNotification::Factura),
            None => Ok(OpenedNotification::Mensaje(notificacion.message())),
        }
    }

    /// Refresh silently whenever another resource's write affects
    /// notifications. Ends when the bus or this controller goes away.
    pub fn listen(self: &Arc<Self>, bus: &EventBus) -> JoinHandle<()> {
        let this = Arc::downgrade(self);
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            while let Some(event) = next_event(&mut rx).await {
                let Some(this) = this.upgrade() else {
                    break;
                };
                if !event.affects(Resource::Notificaciones) {
                    continue;
                }
                log::debug!("Notifications refresh after {}", event.name());
                let _ = this.refresh_silent().await;
            }
        })
    }
}
