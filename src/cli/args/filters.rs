//! Filter argument types for list commands

use chrono::NaiveDate;
use clap::Args;

use crate::client::models::EstadoFactura;
use crate::client::{ClienteFilters, FacturaFilters, ProductoFilters};
use crate::output::formatters::parse_date;

/// Filters for `clientes list`
#[derive(Args, Debug, Default, Clone)]
pub struct ClienteFilterArgs {
    /// Search by name or document
    #[arg(long, short = 'b')]
    pub buscar: Option<String>,
}

impl ClienteFilterArgs {
    pub fn to_filters(&self) -> ClienteFilters {
        ClienteFilters {
            buscar: self.buscar.clone(),
        }
    }
}

/// Filters for `productos list`
#[derive(Args, Debug, Default, Clone)]
pub struct ProductoFilterArgs {
    /// Search by name or code
    #[arg(long, short = 'b')]
    pub buscar: Option<String>,

    /// Only this category
    #[arg(long, short = 'c')]
    pub categoria: Option<String>,

    /// Only products at or under their minimum stock
    #[arg(long = "bajo-stock")]
    pub bajo_stock: bool,
}

impl ProductoFilterArgs {
    pub fn to_filters(&self) -> ProductoFilters {
        ProductoFilters {
            buscar: self.buscar.clone(),
            categoria: self.categoria.clone(),
        }
    }
}

/// Filters for `facturas list`
///
/// Dates are `YYYY-MM-DD` on the local calendar. `--hoy` overrides
/// `--desde` and `--hasta`.
#[derive(Args, Debug, Default, Clone)]
pub struct FacturaFilterArgs {
    /// Only today's invoices
    #[arg(long, conflicts_with_all = ["desde", "hasta"])]
    pub hoy: bool,

    /// First day of the range
    #[arg(long, value_parser = parse_date)]
    pub desde: Option<NaiveDate>,

    /// Last day of the range
    #[arg(long, value_parser = parse_date)]
    pub hasta: Option<NaiveDate>,

    /// Only invoices in this state (pendiente, pagada, anulada)
    #[arg(long, short = 'e')]
    pub estado: Option<EstadoFactura>,

    /// Only invoices for this customer ID
    #[arg(long)]
    pub cliente: Option<i64>,
}

impl FacturaFilterArgs {
    pub fn to_filters(&self, today: NaiveDate) -> FacturaFilters {
        let mut filters = if self.hoy {
            FacturaFilters::today(today)
        } else {
            FacturaFilters {
                fecha_desde: self.desde,
                fecha_hasta: self.hasta,
                ..Default::default()
            }
        };
        filters.estado = self.estado;
        filters.cliente_id = self.cliente;
        filters
    }
}
