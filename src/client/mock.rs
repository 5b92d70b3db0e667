//! Mock SaleSystem API client for testing
//!
//! Holds canned records in memory. Writes change those records, so a read
//! after a write sees the write, like the real backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::api::{AuthApi, ListingApi, MutationApi};
use super::filters::{ClienteFilters, FacturaFilters, ProductoFilters};
use super::models::{
    Cliente, ClienteInput, Credentials, EstadoFactura, Estadisticas, Factura, NuevaFactura,
    Notificacion, Producto, ProductoInput, SessionToken, Usuario,
};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// ```ignore
/// let mock = MockSaleClient::new()
///     .with_facturas(vec![factura(1, "2024-05-01", EstadoFactura::Pendiente)])
///     .await;
/// ```
#[derive(Clone, Default)]
pub struct MockSaleClient {
    clientes: Arc<Mutex<Vec<Cliente>>>,
    productos: Arc<Mutex<Vec<Producto>>>,
    facturas: Arc<Mutex<Vec<Factura>>>,
    notificaciones: Arc<Mutex<Vec<Notificacion>>>,
    estadisticas: Arc<Mutex<Option<Estadisticas>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Error for the next read only; writes pass through
    read_error: Arc<Mutex<Option<ApiError>>>,
    /// Every call waits forever while set
    hang: Arc<AtomicBool>,
    call_count: Arc<Mutex<CallCounts>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub login: usize,
    pub check_session: usize,
    pub list_clientes: usize,
    pub list_productos: usize,
    pub get_producto: usize,
    pub list_facturas: usize,
    pub get_factura: usize,
    pub get_estadisticas: usize,
    pub list_notificaciones: usize,
    pub writes: usize,
}

impl CallCounts {
    /// Total number of read calls
    pub fn reads(&self) -> usize {
        self.list_clientes
            + self.list_productos
            + self.get_producto
            + self.list_facturas
            + self.get_factura
            + self.get_estadisticas
            + self.list_notificaciones
    }
}

/// Test invoice with sensible defaults
pub fn factura(id: i64, fecha: &str, estado: EstadoFactura) -> Factura {
    Factura {
        id,
        numero: format!("F-{:04}", id),
        cliente_id: 1,
        cliente_nombre: Some("Ana Pérez".to_string()),
        fecha: fecha.to_string(),
        estado,
        subtotal: 100.0,
        impuesto: 16.0,
        total: 116.0,
        items: Vec::new(),
    }
}

/// Test product with sensible defaults
pub fn producto(id: i64, nombre: &str, stock: i64) -> Producto {
    Producto {
        id,
        codigo: Some(format!("P{:03}", id)),
        nombre: nombre.to_string(),
        precio: 10.0,
        stock,
        stock_minimo: Some(5),
        categoria: None,
    }
}

/// Test customer with sensible defaults
pub fn cliente(id: i64, nombre: &str) -> Cliente {
    Cliente {
        id,
        nombre: nombre.to_string(),
        documento: None,
        email: None,
        telefono: None,
        direccion: None,
    }
}

fn day_of(fecha: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(fecha.get(..10)?, "%Y-%m-%d").ok()
}

impl MockSaleClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_clientes(self, clientes: Vec<Cliente>) -> Self {
        *self.clientes.lock().await = clientes;
        self
    }

    pub async fn with_productos(self, productos: Vec<Producto>) -> Self {
        *self.productos.lock().await = productos;
        self
    }

    pub async fn with_facturas(self, facturas: Vec<Factura>) -> Self {
        *self.facturas.lock().await = facturas;
        self
    }

    pub async fn with_notificaciones(self, notificaciones: Vec<Notificacion>) -> Self {
        *self.notificaciones.lock().await = notificaciones;
        self
    }

    pub async fn with_estadisticas(self, estadisticas: Estadisticas) -> Self {
        *self.estadisticas.lock().await = Some(estadisticas);
        self
    }

    /// Configure an error to return on the next API call.
    /// The error is consumed after one use.
    pub async fn fail_next(&self, error: ApiError) {
        *self.error.lock().await = Some(error);
    }

    /// Fail the next read call, letting writes succeed
    pub async fn fail_next_read(&self, error: ApiError) {
        *self.read_error.lock().await = Some(error);
    }

    /// Make every call hang until `set_hang(false)`
    pub fn set_hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Replace a product directly, as another user editing it would
    pub async fn put_producto(&self, producto: Producto) {
        let mut productos = self.productos.lock().await;
        productos.retain(|p| p.id != producto.id);
        productos.push(producto);
    }

    async fn check_error(&self) -> Result<()> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(e) = self.error.lock().await.take() {
            return Err(e.into());
        }
        Ok(())
    }

    async fn check_read(&self) -> Result<()> {
        self.check_error().await?;
        if let Some(e) = self.read_error.lock().await.take() {
            return Err(e.into());
        }
        Ok(())
    }

    async fn count(&self, f: impl FnOnce(&mut CallCounts)) {
        f(&mut *self.call_count.lock().await);
    }
}

// ============================================================================
// AuthApi Implementation
// ============================================================================

#[async_trait]
impl AuthApi for MockSaleClient {
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken> {
        self.count(|c| c.login += 1).await;
        self.check_error().await?;

        Ok(SessionToken {
            cookie: "PHPSESSID=mock".to_string(),
            expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
            user: Some(Usuario {
                id: 1,
                username: credentials.username.clone(),
                nombre: None,
                rol: None,
            }),
        })
    }

    async fn check_session(&self) -> Result<Option<Usuario>> {
        self.count(|c| c.check_session += 1).await;
        self.check_error().await?;

        Ok(Some(Usuario {
            id: 1,
            username: "admin".to_string(),
            nombre: None,
            rol: None,
        }))
    }

    async fn logout(&self) -> Result<()> {
        self.check_error().await
    }
}

// ============================================================================
// ListingApi Implementation
// ============================================================================

#[async_trait]
impl ListingApi for MockSaleClient {
    async fn list_clientes(&self, filters: &ClienteFilters) -> Result<Vec<Cliente>> {
        self.count(|c| c.list_clientes += 1).await;
        self.check_read().await?;

        let needle = filters.buscar.as_deref().map(str::to_lowercase);
        Ok(self
            .clientes
            .lock()
            .await
            .iter()
            .filter(|c| {
                needle
                    .as_deref()
                    .is_none_or(|n| c.nombre.to_lowercase().contains(n))
            })
            .cloned()
            .collect())
    }

    async fn list_productos(&self, filters: &ProductoFilters) -> Result<Vec<Producto>> {
        self.count(|c| c.list_productos += 1).await;
        self.check_read().await?;

        Ok(self
            .productos
            .lock()
            .await
            .iter()
            .filter(|p| {
                filters
                    .categoria
                    .as_deref()
                    .is_none_or(|cat| p.categoria.as_deref() == Some(cat))
            })
            .cloned()
            .collect())
    }

    async fn get_producto(&self, id: i64) -> Result<Producto> {
        self.count(|c| c.get_producto += 1).await;
        self.check_read().await?;

        self.productos
            .lock()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("producto {}", id)).into())
    }

    async fn list_facturas(&self, filters: &FacturaFilters) -> Result<Vec<Factura>> {
        self.count(|c| c.list_facturas += 1).await;
        self.check_read().await?;

        Ok(self
            .facturas
            .lock()
            .await
            .iter()
            .filter(|f| filters.estado.is_none_or(|e| f.estado == e))
            .filter(|f| filters.cliente_id.is_none_or(|id| f.cliente_id == id))
            .filter(|f| {
                let day = day_of(&f.fecha);
                filters.fecha_desde.is_none_or(|d| day.is_some_and(|x| x >= d))
                    && filters.fecha_hasta.is_none_or(|h| day.is_some_and(|x| x <= h))
            })
            .cloned()
            .collect())
    }

    async fn get_factura(&self, id: i64) -> Result<Factura> {
        self.count(|c| c.get_factura += 1).await;
        self.check_read().await?;

        self.facturas
            .lock()
            .await
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("factura {}", id)).into())
    }

    async fn get_estadisticas(&self, fecha: NaiveDate) -> Result<Estadisticas> {
        self.count(|c| c.get_estadisticas += 1).await;
        self.check_read().await?;

        if let Some(stats) = self.estadisticas.lock().await.clone() {
            return Ok(stats);
        }

        // Derived from the canned invoices when none were configured
        let facturas = self.facturas.lock().await;
        let del_dia: Vec<_> = facturas
            .iter()
            .filter(|f| day_of(&f.fecha) == Some(fecha) && f.estado != EstadoFactura::Anulada)
            .collect();
        let pendientes: Vec<_> = facturas
            .iter()
            .filter(|f| f.estado == EstadoFactura::Pendiente)
            .collect();

        Ok(Estadisticas {
            fecha: fecha.format("%Y-%m-%d").to_string(),
            total_ventas: del_dia.iter().map(|f| f.total).sum(),
            num_facturas: del_dia.len() as i64,
            facturas_pendientes: pendientes.len() as i64,
            monto_pendiente: pendientes.iter().map(|f| f.total).sum(),
            productos_bajo_stock: self
                .productos
                .lock()
                .await
                .iter()
                .filter(|p| p.is_low_stock())
                .count() as i64,
            clientes_nuevos: 0,
        })
    }

    async fn list_notificaciones(&self) -> Result<Vec<Notificacion>> {
        self.count(|c| c.list_notificaciones += 1).await;
        self.check_read().await?;
        Ok(self.notificaciones.lock().await.clone())
    }
}

// ============================================================================
// MutationApi Implementation
// ============================================================================

#[async_trait]
impl MutationApi for MockSaleClient {
    async fn create_cliente(&self, input: &ClienteInput) -> Result<Cliente> {
        self.count(|c| c.writes += 1).await;
        self.check_error().await?;

        let mut clientes = self.clientes.lock().await;
        let created = Cliente {
            id: clientes.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            nombre: input.nombre.clone(),
            documento: input.documento.clone(),
            email: input.email.clone(),
            telefono: input.telefono.clone(),
            direccion: input.direccion.clone(),
        };
        clientes.push(created.clone());
        Ok(created)
    }

    async fn update_cliente(&self, id: i64, input: &ClienteInput) -> Result<Cliente> {
        self.count(|c| c.writes += 1).await;
        self.check_error().await?;

        let mut clientes = self.clientes.lock().await;
        let cliente = clientes
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("cliente {}", id)))?;
        cliente.nombre = input.nombre.clone();
        cliente.email = input.email.clone();
        cliente.telefono = input.telefono.clone();
        Ok(cliente.clone())
    }

    async fn delete_cliente(&self, id: i64) -> Result<()> {
        self.count(|c| c.writes += 1).await;
        self.check_error().await?;
        self.clientes.lock().await.retain(|c| c.id != id);
        Ok(())
    }

    async fn create_producto(&self, input: &ProductoInput) -> Result<Producto> {
        self.count(|c| c.writes += 1).await;
        self.check_error().await?;

        let mut productos = self.productos.lock().await;
        let created = Producto {
            id: productos.iter().map(|p| p.id).max().unwrap_or(0) + 1,
            codigo: input.codigo.clone(),
            nombre: input.nombre.clone(),
            precio: input.precio,
            stock: input.stock,
            stock_minimo: input.stock_minimo,
            categoria: input.categoria.clone(),
        };
        productos.push(created.clone());
        Ok(created)
    }

    async fn update_producto(&self, id: i64, input: &ProductoInput) -> Result<Producto> {
        self.count(|c| c.writes += 1).await;
        self.check_error().await?;

        let mut productos = self.productos.lock().await;
        let producto = productos
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("producto {}", id)))?;
        producto.nombre = input.nombre.clone();
        producto.precio = input.precio;
        producto.stock = input.stock;
        Ok(producto.clone())
    }

    async fn delete_producto(&self, id: i64) -> Result<()> {
        self.count(|c| c.writes += 1).await;
        self.check_error().await?;
        self.productos.lock().await.retain(|p| p.id != id);
        Ok(())
    }

    async fn create_factura(&self, nueva: &NuevaFactura) -> Result<Factura> {
        self.count(|c| c.writes += 1).await;
        self.check_error().await?;

        let mut facturas = self.facturas.lock().await;
        let id = facturas.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let subtotal: f64 = nueva
            .items
            .iter()
            .map(|i| i.cantidad * i.precio_unitario)
            .sum();
        let fecha = nueva
            .fecha
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string());

        let mut created = factura(id, &fecha, EstadoFactura::Pendiente);
        created.cliente_id = nueva.cliente_id;
        created.subtotal = subtotal;
        created.impuesto = 0.0;
        created.total = subtotal;
        facturas.push(created.clone());
        Ok(created)
    }

    async fn update_factura_estado(&self, id: i64, estado: EstadoFactura) -> Result<Factura> {
        self.count(|c| c.writes += 1).await;
        self.check_error().await?;

        let mut facturas = self.facturas.lock().await;
        let factura = facturas
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("factura {}", id)))?;
        factura.estado = estado;
        Ok(factura.clone())
    }

    async fn delete_factura(&self, id: i64) -> Result<()> {
        self.count(|c| c.writes += 1).await;
        self.check_error().await?;
        self.facturas.lock().await.retain(|f| f.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_invoice_filters() {
        let mock = MockSaleClient::new()
            .with_facturas(vec![
                factura(1, "2024-05-01", EstadoFactura::Pagada),
                factura(2, "2024-05-01 10:30:00", EstadoFactura::Pendiente),
                factura(3, "2024-04-30", EstadoFactura::Pendiente),
            ])
            .await;

        let hoy = mock
            .list_facturas(&FacturaFilters::today(day("2024-05-01")))
            .await
            .unwrap();
        assert_eq!(hoy.len(), 2);

        let pendientes = mock.list_facturas(&FacturaFilters::pendientes()).await.unwrap();
        assert_eq!(pendientes.len(), 2);
        assert_eq!(mock.call_counts().await.list_facturas, 2);
    }

    #[tokio::test]
    async fn test_one_shot_error() {
        let mock = MockSaleClient::new();
        mock.fail_next(ApiError::ServerError("boom".into())).await;

        assert!(mock.list_notificaciones().await.is_err());
        assert!(mock.list_notificaciones().await.is_ok());
    }

    #[tokio::test]
    async fn test_writes_are_visible() {
        let mock = MockSaleClient::new();
        let created = mock
            .create_cliente(&ClienteInput {
                nombre: "Luis".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let clientes = mock.list_clientes(&ClienteFilters::new()).await.unwrap();
        assert_eq!(clientes, vec![created]);
    }

    #[tokio::test]
    async fn test_derived_statistics() {
        let mock = MockSaleClient::new()
            .with_facturas(vec![
                factura(1, "2024-05-01", EstadoFactura::Pagada),
                factura(2, "2024-05-01", EstadoFactura::Pendiente),
                factura(3, "2024-05-01", EstadoFactura::Anulada),
            ])
            .await;

        let stats = mock.get_estadisticas(day("2024-05-01")).await.unwrap();
        assert_eq!(stats.num_facturas, 2);
        assert_eq!(stats.facturas_pendientes, 1);
        assert_eq!(stats.total_ventas, 232.0);
    }
}
