//! Invoice list controller

use std::sync::{Arc, Mutex};

use super::state::{RefreshMode, ResourceState, StateCell};
use super::ResourceContext;
use crate::client::FacturaFilters;
use crate::client::models::{EstadoFactura, Factura, NuevaFactura};
use crate::error::Result;
use crate::events::DomainEvent;

pub struct FacturasResource {
    ctx: ResourceContext,
    filters: Mutex<FacturaFilters>,
    state: Arc<StateCell<Vec<Factura>>>,
}

impl FacturasResource {
    pub fn new(ctx: ResourceContext, filters: FacturaFilters) -> Self {
        Self {
            ctx,
            filters: Mutex::new(filters),
            state: StateCell::new(),
        }
    }

    /// Invoices issued today, by the context clock
    pub fn today(ctx: ResourceContext) -> Self {
        let today = ctx.clock.today();
        Self::new(ctx, FacturaFilters::today(today))
    }

    pub fn state(&self) -> ResourceState<Vec<Factura>> {
        self.state.snapshot()
    }

    pub fn set_filters(&self, filters: FacturaFilters) {
        *self.filters.lock().unwrap_or_else(|p| p.into_inner()) = filters;
    }

    fn filters(&self) -> FacturaFilters {
        self.filters.lock().unwrap_or_else(|p| p.into_inner()).clone()
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
        let filters = self.filters();
        let client = &self.ctx.client;
        self.state
            .refresh(&self.ctx.gate, mode, || async {
                if fresh {
                    client.list_facturas_fresh(&filters).await
                } else {
                    client.list_facturas(&filters).await
                }
            })
            .await
    }

    /// Reload fresh after a successful write, then announce it.
    /// The write stands even if the reload fails; the failure shows in state.
    async fn after_write(&self, event: DomainEvent) {
        if let Err(e) = self.reload().await {
            log::warn!("Reload after {} failed: {}", event.name(), e);
        }
        self.ctx.bus.publish(event);
    }

    /// Full invoice with its lines, never from cache
    pub async fn detail(&self, id: i64) -> Result<Factura> {
        self.ctx.gate.check()?;
        self.ctx.client.get_factura_fresh(id).await
    }

    pub async fn create(&self, factura: &NuevaFactura) -> Result<Factura> {
        let created = self.ctx.client.create_factura(factura).await?;
        self.after_write(DomainEvent::FacturaCreated { id: created.id })
            .await;
        Ok(created)
    }

    pub async fn update_estado(&self, id: i64, estado: EstadoFactura) -> Result<Factura> {
        let updated = self.ctx.client.update_factura_estado(id, estado).await?;
        self.after_write(DomainEvent::FacturaUpdated { id }).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.ctx.client.delete_factura(id).await?;
        self.after_write(DomainEvent::FacturaDeleted { id }).await;
        Ok(())
    }
}
