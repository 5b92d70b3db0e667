//! Listing API trait for read operations

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::client::filters::{ClienteFilters, FacturaFilters, ProductoFilters};
use crate::client::models::{Cliente, Estadisticas, Factura, Notificacion, Producto};
use crate::error::Result;

/// Read operations for the SaleSystem backend
///
/// Every method here is safe to serve from cache.
#[async_trait]
pub trait ListingApi: Send + Sync {
    // ========================================================================
    // Customers
    // ========================================================================

    async fn list_clientes(&self, filters: &ClienteFilters) -> Result<Vec<Cliente>>;

    // ========================================================================
    // Products
    // ========================================================================

    async fn list_productos(&self, filters: &ProductoFilters) -> Result<Vec<Producto>>;

    async fn get_producto(&self, id: i64) -> Result<Producto>;

    // ========================================================================
    // Invoices
    // ========================================================================

    async fn list_facturas(&self, filters: &FacturaFilters) -> Result<Vec<Factura>>;

    async fn get_factura(&self, id: i64) -> Result<Factura>;

    // ========================================================================
    // Dashboard
    // ========================================================================

    /// Aggregates for one day
    async fn get_estadisticas(&self, fecha: NaiveDate) -> Result<Estadisticas>;

    async fn list_notificaciones(&self) -> Result<Vec<Notificacion>>;

    // ========================================================================
    // Uncached reads
    // ========================================================================
    //
    // Reads that never come from cache. Plain clients have no cache, so the
    // defaults are the normal reads; caching wrappers override them.

    async fn list_clientes_fresh(&self, filters: &ClienteFilters) -> Result<Vec<Cliente>> {
        self.list_clientes(filters).await
    }

    async fn list_productos_fresh(&self, filters: &ProductoFilters) -> Result<Vec<Producto>> {
        self.list_productos(filters).await
    }

    async fn get_producto_fresh(&self, id: i64) -> Result<Producto> {
        self.get_producto(id).await
    }

    async fn list_facturas_fresh(&self, filters: &FacturaFilters) -> Result<Vec<Factura>> {
        self.list_facturas(filters).await
    }

    async fn get_factura_fresh(&self, id: i64) -> Result<Factura> {
        self.get_factura(id).await
    }

    async fn get_estadisticas_fresh(&self, fecha: NaiveDate) -> Result<Estadisticas> {
        self.get_estadisticas(fecha).await
    }

    async fn list_notificaciones_fresh(&self) -> Result<Vec<Notificacion>> {
        self.list_notificaciones().await
    }
}
