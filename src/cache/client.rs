//! Cached wrapper for the SaleSystem API client
//!
//! Reads go through stale-while-revalidate; writes go straight to the
//! backend and then invalidate every cached resource they make stale.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};

use super::invalidation::{Resource, invalidate_resource};
use super::store::CacheStore;
use super::swr::{CacheRequest, cached_fetch, fetch_fresh};
use crate::client::models::{
    Cliente, ClienteInput, Credentials, EstadoFactura, Estadisticas, Factura, NuevaFactura,
    Notificacion, Producto, ProductoInput, SessionToken, Usuario,
};
use crate::client::query::QueryParams;
use crate::client::{
    AuthApi, ClienteFilters, FacturaFilters, ListingApi, MutationApi, ProductoFilters, SaleApi,
};
use crate::error::Result;

/// Cached wrapper for any [`SaleApi`] implementation.
///
/// Without a store (`--no-cache`) every call goes to the inner client.
pub struct CachedSaleClient<C: SaleApi> {
    inner: Arc<C>,
    store: Option<Arc<CacheStore>>,
}

impl<C: SaleApi + 'static> CachedSaleClient<C> {
    pub fn new(inner: C, store: Option<Arc<CacheStore>>) -> Self {
        Self {
            inner: Arc::new(inner),
            store,
        }
    }

    /// Get the inner client (for operations not part of the trait)
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn store(&self) -> Option<&Arc<CacheStore>> {
        self.store.as_ref()
    }

    /// Drop cached responses made stale by a write to `resource`
    pub fn invalidate(&self, resource: Resource) -> usize {
        let Some(store) = self.store.as_deref() else {
            return 0;
        };
        let removed = invalidate_resource(store, resource);
        log::debug!("Write to {} invalidated {} cache entries", resource, removed);
        removed
    }

    async fn read<T, F, Fut>(&self, request: CacheRequest, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce(Arc<C>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        match &self.store {
            Some(store) => cached_fetch(store, &request, move || fetch(inner)).await,
            None => fetch(inner).await,
        }
    }

    async fn read_fresh<T, F, Fut>(&self, request: CacheRequest, fetch: F) -> Result<T>
    where
        T: Serialize,
        F: FnOnce(Arc<C>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let inner = Arc::clone(&self.inner);
        match &self.store {
            Some(store) => fetch_fresh(store, &request, move || fetch(inner)).await,
            None => fetch(inner).await,
        }
    }
}

fn list_request(resource: Resource, params: QueryParams) -> CacheRequest {
    CacheRequest::get(resource.endpoint()).with_params(params)
}

fn by_id(resource: Resource, id: i64) -> CacheRequest {
    list_request(resource, QueryParams::new().with("id", id))
}

fn stats_request(fecha: NaiveDate) -> CacheRequest {
    list_request(
        Resource::Estadisticas,
        QueryParams::new().with("fecha", fecha.format("%Y-%m-%d")),
    )
}

#[async_trait]
impl<C: SaleApi + 'static> AuthApi for CachedSaleClient<C> {
    /// Never cached
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken> {
        self.inner.login(credentials).await
    }

    async fn check_session(&self) -> Result<Option<Usuario>> {
        self.inner.check_session().await
    }

    async fn logout(&self) -> Result<()> {
        self.inner.logout().await?;
        if let Some(store) = &self.store {
            store.clear();
        }
        Ok(())
    }
}

#[async_trait]
impl<C: SaleApi + 'static> ListingApi for CachedSaleClient<C> {
    async fn list_clientes(&self, filters: &ClienteFilters) -> Result<Vec<Cliente>> {
        let request = list_request(Resource::Clientes, filters.to_params());
        let filters = filters.clone();
        self.read(request, move |c| async move { c.list_clientes(&filters).await })
            .await
    }

    async fn list_productos(&self, filters: &ProductoFilters) -> Result<Vec<Producto>> {
        let request = list_request(Resource::Productos, filters.to_params());
        let filters = filters.clone();
        self.read(request, move |c| async move { c.list_productos(&filters).await })
            .await
    }

    async fn get_producto(&self, id: i64) -> Result<Producto> {
        self.read(by_id(Resource::Productos, id), move |c| async move {
            c.get_producto(id).await
        })
        .await
    }

    async fn list_facturas(&self, filters: &FacturaFilters) -> Result<Vec<Factura>> {
        let request = list_request(Resource::Facturas, filters.to_params());
        let filters = filters.clone();
        self.read(request, move |c| async move { c.list_facturas(&filters).await })
            .await
    }

    async fn get_factura(&self, id: i64) -> Result<Factura> {
        self.read(by_id(Resource::Facturas, id), move |c| async move {
            c.get_factura(id).await
        })
        .await
    }

    async fn get_estadisticas(&self, fecha: NaiveDate) -> Result<Estadisticas> {
        self.read(stats_request(fecha), move |c| async move {
            c.get_estadisticas(fecha).await
        })
        .await
    }

    async fn list_notificaciones(&self) -> Result<Vec<Notificacion>> {
        let request = list_request(Resource::Notificaciones, QueryParams::new());
        self.read(request, |c| async move { c.list_notificaciones().await })
            .await
    }

    async fn list_clientes_fresh(&self, filters: &ClienteFilters) -> Result<Vec<Cliente>> {
        let request = list_request(Resource::Clientes, filters.to_params());
        self.read_fresh(request, |c| async move { c.list_clientes(filters).await })
            .await
    }

    async fn list_productos_fresh(&self, filters: &ProductoFilters) -> Result<Vec<Producto>> {
        let request = list_request(Resource::Productos, filters.to_params());
        self.read_fresh(request, |c| async move { c.list_productos(filters).await })
            .await
    }

    async fn get_producto_fresh(&self, id: i64) -> Result<Producto> {
        self.read_fresh(by_id(Resource::Productos, id), |c| async move {
            c.get_producto(id).await
        })
        .await
    }

    async fn list_facturas_fresh(&self, filters: &FacturaFilters) -> Result<Vec<Factura>> {
        let request = list_request(Resource::Facturas, filters.to_params());
        self.read_fresh(request, |c| async move { c.list_facturas(filters).await })
            .await
    }

    async fn get_factura_fresh(&self, id: i64) -> Result<Factura> {
        self.read_fresh(by_id(Resource::Facturas, id), |c| async move {
            c.get_factura(id).await
        })
        .await
    }

    async fn get_estadisticas_fresh(&self, fecha: NaiveDate) -> Result<Estadisticas> {
        self.read_fresh(stats_request(fecha), |c| async move {
            c.get_estadisticas(fecha).await
        })
        .await
    }

    async fn list_notificaciones_fresh(&self) -> Result<Vec<Notificacion>> {
        let request = list_request(Resource::Notificaciones, QueryParams::new());
        self.read_fresh(request, |c| async move { c.list_notificaciones().await })
            .await
    }
}

#[async_trait]
impl<C: SaleApi + 'static> MutationApi for CachedSaleClient<C> {
    async fn create_cliente(&self, input: &ClienteInput) -> Result<Cliente> {
        let created = self.inner.create_cliente(input).await?;
        self.invalidate(Resource::Clientes);
        Ok(created)
    }

    async fn update_cliente(&self, id: i64, input: &ClienteInput) -> Result<Cliente> {
        let updated = self.inner.update_cliente(id, input).await?;
        self.invalidate(Resource::Clientes);
        Ok(updated)
    }

    async fn delete_cliente(&self, id: i64) -> Result<()> {
        self.inner.delete_cliente(id).await?;
        self.invalidate(Resource::Clientes);
        Ok(())
    }

    async fn create_producto(&self, input: &ProductoInput) -> Result<Producto> {
        let created = self.inner.create_producto(input).await?;
        self.invalidate(Resource::Productos);
        Ok(created)
    }

    async fn update_producto(&self, id: i64, input: &ProductoInput) -> Result<Producto> {
        let updated = self.inner.update_producto(id, input).await?;
        self.invalidate(Resource::Productos);
        Ok(updated)
    }

    async fn delete_producto(&self, id: i64) -> Result<()> {
        self.inner.delete_producto(id).await?;
        self.invalidate(Resource::Productos);
        Ok(())
    }

    async fn create_factura(&self, factura: &NuevaFactura) -> Result<Factura> {
        let created = self.inner.create_factura(factura).await?;
        self.invalidate(Resource::Facturas);
        Ok(created)
    }

    async fn update_factura_estado(&self, id: i64, estado: EstadoFactura) -> Result<Factura> {
        let updated = self.inner.update_factura_estado(id, estado).await?;
        self.invalidate(Resource::Facturas);
        Ok(updated)
    }

    async fn delete_factura(&self, id: i64) -> Result<()> {
        self.inner.delete_factura(id).await?;
        self.invalidate(Resource::Facturas);
        Ok(())
    }
}
