//! Dashboard controller
//!
//! Combines today's statistics with today's and pending invoices, and
//! follows writes elsewhere through the event bus.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::task::JoinHandle;

use super::state::{RefreshMode, ResourceState, StateCell};
use super::ResourceContext;
use crate::cache::Resource;
use crate::client::FacturaFilters;
use crate::client::models::{Estadisticas, Factura};
use crate::error::Result;
use crate::events::{EventBus, next_event};

/// Everything the dashboard shows
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub fecha: NaiveDate,
    pub estadisticas: Estadisticas,
    pub ventas_hoy: Vec<Factura>,
    pub pendientes: Vec<Factura>,
}

pub struct DashboardResource {
    ctx: ResourceContext,
    state: Arc<StateCell<Option<Dashboard>>>,
}

impl DashboardResource {
    pub fn new(ctx: ResourceContext) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            state: StateCell::new(),
        })
    }

    pub fn state(&self) -> ResourceState<Option<Dashboard>> {
        self.state.snapshot()
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
        // Re-read on every refresh so a long-lived dashboard rolls over at midnight
        let fecha = self.ctx.clock.today();
        let hoy = FacturaFilters::today(fecha);
        let pendientes = FacturaFilters::pendientes();

        self.state
            .refresh(&self.ctx.gate, mode, || async {
                let (estadisticas, ventas_hoy, pendientes) = if fresh {
                    futures::try_join!(
                        client.get_estadisticas_fresh(fecha),
                        client.list_facturas_fresh(&hoy),
                        client.list_facturas_fresh(&pendientes),
                    )?
                } else {
                    futures::try_join!(
                        client.get_estadisticas(fecha),
                        client.list_facturas(&hoy),
                        client.list_facturas(&pendientes),
                    )?
                };
                Ok(Some(Dashboard {
                    fecha,
                    estadisticas,
                    ventas_hoy,
                    pendientes,
                }))
            })
            .await
    }

    /// Refresh silently after writes that change sales, stock or totals.
    /// Ends when the bus or this controller goes away.
    pub fn listen(self: &Arc<Self>, bus: &EventBus) -> JoinHandle<()> {
        let this = Arc::downgrade(self);
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            while let Some(event) = next_event(&mut rx).await {
                let Some(this) = this.upgrade() else {
                    break;
                };
                if !event.affects(Resource::Estadisticas) && !event.affects(Resource::Facturas) {
                    continue;
                }
                log::debug!("Dashboard refresh after {}", event.name());
                let _ = this.refresh_silent().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::factura;
    use crate::client::models::EstadoFactura;
    use crate::client::{AuthStatus, MockSaleClient};
    use crate::error::ApiError;
    use crate::events::DomainEvent;
    use crate::resources::FacturasResource;
    use crate::resources::testing::{context, settle};

    fn sample() -> Vec<Factura> {
        vec![
            factura(1, "2024-05-01", EstadoFactura::Pagada),
            factura(2, "2024-05-01", EstadoFactura::Pendiente),
            factura(3, "2024-04-15", EstadoFactura::Pendiente),
        ]
    }

    #[tokio::test]
    async fn test_refresh_combines_sources() {
        let mock = MockSaleClient::new().with_facturas(sample()).await;
        let (ctx, _) = context(mock);
        let dashboard = DashboardResource::new(ctx);

        dashboard.refresh().await.unwrap();

        let data = dashboard.state().data.unwrap();
        assert_eq!(data.fecha.to_string(), "2024-05-01");
        assert_eq!(data.ventas_hoy.len(), 2);
        assert_eq!(data.pendientes.len(), 2);
        assert_eq!(data.estadisticas.num_facturas, 2);
    }

    #[tokio::test]
    async fn test_one_failing_source_fails_refresh() {
        let mock = MockSaleClient::new().with_facturas(sample()).await;
        let (ctx, _) = context(mock.clone());
        let dashboard = DashboardResource::new(ctx);

        mock.fail_next(ApiError::ServerError("estadísticas caídas".into()))
            .await;
        assert!(dashboard.refresh().await.is_err());

        let state = dashboard.state();
        assert!(state.data.is_none());
        assert!(state.error.unwrap().contains("estadísticas caídas"));
    }

    #[tokio::test]
    async fn test_waits_for_session() {
        let mock = MockSaleClient::new();
        let (ctx, _) = context(mock.clone());
        ctx.gate.set(AuthStatus::Unknown);
        let dashboard = DashboardResource::new(ctx);

        dashboard.refresh().await.unwrap();

        assert!(dashboard.state().loading);
        assert_eq!(mock.call_counts().await.reads(), 0);
    }

    #[tokio::test]
    async fn test_invoice_created_elsewhere_refreshes_silently() {
        let mock = MockSaleClient::new().with_facturas(sample()).await;
        let (ctx, _) = context(mock.clone());
        let bus = ctx.bus.clone();
        let dashboard = DashboardResource::new(ctx.clone());
        let listener = dashboard.listen(&bus);
        dashboard.refresh().await.unwrap();

        let mut loading_seen = false;
        let mut rx = dashboard.state.subscribe();

        let facturas = FacturasResource::today(ctx);
        facturas
            .update_estado(2, EstadoFactura::Pagada)
            .await
            .unwrap();
        settle().await;

        while rx.has_changed().unwrap_or(false) {
            loading_seen |= rx.borrow_and_update().loading;
        }
        assert!(!loading_seen);

        let data = dashboard.state().data.unwrap();
        assert_eq!(data.pendientes.len(), 1);
        listener.abort();
    }

    #[tokio::test]
    async fn test_only_relevant_writes_refresh() {
        let mock = MockSaleClient::new();
        let (ctx, _) = context(mock.clone());
        let bus = ctx.bus.clone();
        let dashboard = DashboardResource::new(ctx);
        let listener = dashboard.listen(&bus);

        // Product writes touch neither statistics nor invoices
        bus.publish(DomainEvent::ProductoUpdated { id: 5 });
        settle().await;
        assert_eq!(mock.call_counts().await.get_estadisticas, 0);

        // Customer writes reach invoices through the embedded names
        bus.publish(DomainEvent::ClienteCreated { id: 5 });
        settle().await;
        assert_eq!(mock.call_counts().await.get_estadisticas, 1);
        listener.abort();
    }

    #[tokio::test]
    async fn test_failed_event_refresh_records_error() {
        let mock = MockSaleClient::new().with_facturas(sample()).await;
        let (ctx, store) = context(mock.clone());
        let bus = ctx.bus.clone();
        let dashboard = DashboardResource::new(ctx);
        let listener = dashboard.listen(&bus);
        dashboard.refresh().await.unwrap();
        settle().await;

        store.clear();
        mock.fail_next(ApiError::Network("backend down".into())).await;
        bus.publish(DomainEvent::FacturaCreated { id: 9 });
        settle().await;

        let state = dashboard.state();
        assert!(state.error.unwrap().contains("backend down"));
        assert!(state.data.is_some());
        assert!(!state.loading);
        listener.abort();
    }

    #[tokio::test]
    async fn test_listener_ends_after_drop_on_any_event() {
        let (ctx, _) = context(MockSaleClient::new());
        let bus = ctx.bus.clone();
        let dashboard = DashboardResource::new(ctx);
        let listener = dashboard.listen(&bus);
        drop(dashboard);

        // Not a dashboard event, still enough to notice the drop
        bus.publish(DomainEvent::ProductoUpdated { id: 1 });
        settle().await;

        assert!(listener.is_finished());
        assert_eq!(bus.subscriber_count(), 0);
    }
}
