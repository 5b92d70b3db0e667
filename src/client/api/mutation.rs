//! Mutation API trait for write operations

use async_trait::async_trait;

use crate::client::models::{
    Cliente, ClienteInput, EstadoFactura, Factura, NuevaFactura, Producto, ProductoInput,
};
use crate::error::Result;

/// Write operations for the SaleSystem backend
#[async_trait]
pub trait MutationApi: Send + Sync {
    // ========================================================================
    // Customers
    // ========================================================================

    async fn create_cliente(&self, input: &ClienteInput) -> Result<Cliente>;

    async fn update_cliente(&self, id: i64, input: &ClienteInput) -> Result<Cliente>;

    async fn delete_cliente(&self, id: i64) -> Result<()>;

    // ========================================================================
    // Products
    // ========================================================================

    async fn create_producto(&self, input: &ProductoInput) -> Result<Producto>;

    async fn update_producto(&self, id: i64, input: &ProductoInput) -> Result<Producto>;

    async fn delete_producto(&self, id: i64) -> Result<()>;

    // ========================================================================
    // Invoices
    // ========================================================================

    async fn create_factura(&self, factura: &NuevaFactura) -> Result<Factura>;

    async fn update_factura_estado(&self, id: i64, estado: EstadoFactura) -> Result<Factura>;

    async fn delete_factura(&self, id: i64) -> Result<()>;
}
