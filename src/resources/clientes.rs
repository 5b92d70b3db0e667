//! Customer list controller

use std::sync::{Arc, Mutex};

use super::state::{RefreshMode, ResourceState, StateCell};
use super::ResourceContext;
use crate::client::ClienteFilters;
use crate::client::models::{Cliente, ClienteInput};
use crate::error::Result;
use crate::events::DomainEvent;

pub struct ClientesResource {
    ctx: ResourceContext,
    filters: Mutex<ClienteFilters>,
    state: Arc<StateCell<Vec<Cliente>>>,
}

impl ClientesResource {
    pub fn new(ctx: ResourceContext, filters: ClienteFilters) -> Self {
        Self {
            ctx,
            filters: Mutex::new(filters),
            state: StateCell::new(),
        }
    }

    pub fn state(&self) -> ResourceState<Vec<Cliente>> {
        self.state.snapshot()
    }

    /// Replace the filters; takes effect on the next refresh
    pub fn set_filters(&self, filters: ClienteFilters) {
        *self.filters.lock().unwrap_or_else(|p| p.into_inner()) = filters;
    }

    fn filters(&self) -> ClienteFilters {
        self.filters.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// User-initiated refresh
    pub async fn refresh(&self) -> Result<()> {
        self.fetch(RefreshMode::Visible, false).await
    }

    pub async fn refresh_silent(&self) -> Result<()> {
        self.fetch(RefreshMode::Silent, false).await
    }

    /// Refresh bypassing the cache
    pub async fn reload(&self) -> Result<()> {
        self.fetch(RefreshMode::Visible, true).await
    }

    async fn fetch(&self, mode: RefreshMode, fresh: bool) -> Result<()> {
        let filters = self.filters();
        let client = &self.ctx.client;
        self.state
            .refresh(&self.ctx.gate, mode, || async {
                if fresh {
                    client.list_clientes_fresh(&filters).await
                } else {
                    client.list_clientes(&filters).await
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

    pub async fn create(&self, input: &ClienteInput) -> Result<Cliente> {
        let created = self.ctx.client.create_cliente(input).await?;
        self.after_write(DomainEvent::ClienteCreated { id: created.id })
            .await;
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: &ClienteInput) -> Result<Cliente> {
        let updated = self.ctx.client.update_cliente(id, input).await?;
        self.after_write(DomainEvent::ClienteUpdated { id }).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.ctx.client.delete_cliente(id).await?;
        self.after_write(DomainEvent::ClienteDeleted { id }).await;
        Ok(())
    }
}
