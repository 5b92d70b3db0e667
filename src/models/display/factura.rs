//! Invoice rows

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use super::EMPTY;
use crate::client::models::{EstadoFactura, Factura, FacturaItem};
use crate::output::formatters::{format_fecha, format_money};

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct FacturaDisplay {
    #[tabled(rename = "ID")]
    pub id: i64,

    #[tabled(rename = "NÚMERO")]
    pub numero: String,

    #[tabled(rename = "FECHA")]
    pub fecha: String,

    #[tabled(rename = "CLIENTE")]
    pub cliente: String,

    #[tabled(rename = "ESTADO")]
    pub estado: String,

    #[tabled(rename = "TOTAL")]
    pub total: String,
}

fn estado_label(estado: EstadoFactura) -> String {
    match estado {
        EstadoFactura::Pagada => estado.as_str().green().to_string(),
        EstadoFactura::Pendiente => estado.as_str().yellow().to_string(),
        EstadoFactura::Anulada => estado.as_str().dimmed().to_string(),
    }
}

impl From<&Factura> for FacturaDisplay {
    fn from(factura: &Factura) -> Self {
        let cliente = factura
            .cliente_nombre
            .clone()
            .unwrap_or_else(|| format!("#{}", factura.cliente_id));

        Self {
            id: factura.id,
            numero: if factura.numero.is_empty() {
                EMPTY.to_string()
            } else {
                factura.numero.clone()
            },
            fecha: format_fecha(&factura.fecha),
            cliente,
            estado: estado_label(factura.estado),
            total: format_money(factura.total),
        }
    }
}

impl From<Factura> for FacturaDisplay {
    fn from(factura: Factura) -> Self {
        Self::from(&factura)
    }
}

/// One invoice line
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct FacturaItemDisplay {
    #[tabled(rename = "PRODUCTO")]
    pub producto: String,

    #[tabled(rename = "CANT.")]
    pub cantidad: String,

    #[tabled(rename = "P. UNIT.")]
    pub precio_unitario: String,

    #[tabled(rename = "SUBTOTAL")]
    pub subtotal: String,
}

impl From<&FacturaItem> for FacturaItemDisplay {
    fn from(item: &FacturaItem) -> Self {
        Self {
            producto: item
                .descripcion
                .clone()
                .unwrap_or_else(|| format!("#{}", item.producto_id)),
            // Whole quantities print without decimals
            cantidad: if item.cantidad.fract() == 0.0 {
                format!("{}", item.cantidad as i64)
            } else {
                format!("{:.2}", item.cantidad)
            },
            precio_unitario: format_money(item.precio_unitario),
            subtotal: format_money(item.subtotal),
        }
    }
}
