//! List filters for backend queries
//!
//! Each filter turns into [`QueryParams`]; unset filters stay absent so they
//! never split the cache.

use chrono::NaiveDate;

use super::models::EstadoFactura;
use super::query::QueryParams;

/// Filters for the customer list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClienteFilters {
    /// Free-text search on name or document
    pub buscar: Option<String>,
}

impl ClienteFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buscar(mut self, text: impl Into<String>) -> Self {
        self.buscar = Some(text.into());
        self
    }

    pub fn to_params(&self) -> QueryParams {
        QueryParams::new().with_opt("buscar", self.buscar.as_deref())
    }
}

/// Filters for the product list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductoFilters {
    pub buscar: Option<String>,
    pub categoria: Option<String>,
}

impl ProductoFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buscar(mut self, text: impl Into<String>) -> Self {
        self.buscar = Some(text.into());
        self
    }

    pub fn categoria(mut self, categoria: impl Into<String>) -> Self {
        self.categoria = Some(categoria.into());
        self
    }

    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("buscar", self.buscar.as_deref())
            .with_opt("categoria", self.categoria.as_deref())
    }
}

/// Filters for the invoice list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacturaFilters {
    pub fecha_desde: Option<NaiveDate>,
    pub fecha_hasta: Option<NaiveDate>,
    pub estado: Option<EstadoFactura>,
    pub cliente_id: Option<i64>,
}

impl FacturaFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoices issued on `today` only
    pub fn today(today: NaiveDate) -> Self {
        Self::new().between(today, today)
    }

    /// Invoices still awaiting payment
    pub fn pendientes() -> Self {
        Self::new().estado(EstadoFactura::Pendiente)
    }

    pub fn between(mut self, desde: NaiveDate, hasta: NaiveDate) -> Self {
        self.fecha_desde = Some(desde);
        self.fecha_hasta = Some(hasta);
        self
    }

    pub fn desde(mut self, desde: NaiveDate) -> Self {
        self.fecha_desde = Some(desde);
        self
    }

    pub fn hasta(mut self, hasta: NaiveDate) -> Self {
        self.fecha_hasta = Some(hasta);
        self
    }

    pub fn estado(mut self, estado: EstadoFactura) -> Self {
        self.estado = Some(estado);
        self
    }

    pub fn cliente(mut self, cliente_id: i64) -> Self {
        self.cliente_id = Some(cliente_id);
        self
    }

    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("fecha_desde", self.fecha_desde.map(|d| d.format("%Y-%m-%d")))
            .with_opt("fecha_hasta", self.fecha_hasta.map(|d| d.format("%Y-%m-%d")))
            .with_opt("estado", self.estado)
            .with_opt("cliente_id", self.cliente_id)
    }
}
