//! Product catalogue controller

use std::sync::{Arc, Mutex};

use super::state::{RefreshMode, ResourceState, StateCell};
use super::ResourceContext;
use crate::client::ProductoFilters;
use crate::client::models::{Producto, ProductoInput};
use crate::error::Result;
use crate::events::DomainEvent;

pub struct ProductosResource {
    ctx: ResourceContext,
    filters: Mutex<ProductoFilters>,
    state: Arc<StateCell<Vec<Producto>>>,
}

impl ProductosResource {
    pub fn new(ctx: ResourceContext, filters: ProductoFilters) -> Self {
        Self {
            ctx,
            filters: Mutex::new(filters),
            state: StateCell::new(),
        }
    }

    pub fn state(&self) -> ResourceState<Vec<Producto>> {
        self.state.snapshot()
    }

    pub fn set_filters(&self, filters: ProductoFilters) {
        *self.filters.lock().unwrap_or_else(|p| p.into_inner()) = filters;
    }

    fn filters(&self) -> ProductoFilters {
        self.filters.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Products at or below their minimum stock, from the current state
    pub fn low_stock(&self) -> Vec<Producto> {
        self.state
            .snapshot()
            .data
            .into_iter()
            .filter(Producto::is_low_stock)
            .collect()
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
                    client.list_productos_fresh(&filters).await
                } else {
                    client.list_productos(&filters).await
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

    pub async fn create(&self, input: &ProductoInput) -> Result<Producto> {
        let created = self.ctx.client.create_producto(input).await?;
        self.after_write(DomainEvent::ProductoCreated { id: created.id })
            .await;
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: &ProductoInput) -> Result<Producto> {
        let updated = self.ctx.client.update_producto(id, input).await?;
        self.after_write(DomainEvent::ProductoUpdated { id }).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.ctx.client.delete_producto(id).await?;
        self.after_write(DomainEvent::ProductoDeleted { id }).await;
        Ok(())
    }
}
