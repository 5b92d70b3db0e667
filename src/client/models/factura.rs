//! Invoice models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Invoice lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoFactura {
    Pendiente,
    Pagada,
    Anulada,
}

impl EstadoFactura {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoFactura::Pendiente => "pendiente",
            EstadoFactura::Pagada => "pagada",
            EstadoFactura::Anulada => "anulada",
        }
    }
}

impl fmt::Display for EstadoFactura {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstadoFactura {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pendiente" => Ok(EstadoFactura::Pendiente),
            "pagada" => Ok(EstadoFactura::Pagada),
            "anulada" => Ok(EstadoFactura::Anulada),
            other => Err(format!(
                "unknown invoice state '{}' (expected pendiente, pagada or anulada)",
                other
            )),
        }
    }
}

/// Invoice header with its line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factura {
    #[serde(deserialize_with = "super::lenient::i64")]
    pub id: i64,

    pub numero: String,

    #[serde(deserialize_with = "super::lenient::i64")]
    pub cliente_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliente_nombre: Option<String>,

    /// Issue date as sent by the backend (`YYYY-MM-DD`, sometimes with time)
    pub fecha: String,

    pub estado: EstadoFactura,

    #[serde(default, deserialize_with = "super::lenient::f64")]
    pub subtotal: f64,

    #[serde(default, deserialize_with = "super::lenient::f64")]
    pub impuesto: f64,

    #[serde(deserialize_with = "super::lenient::f64")]
    pub total: f64,

    #[serde(default)]
    pub items: Vec<FacturaItem>,
}

/// Invoice line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacturaItem {
    #[serde(deserialize_with = "super::lenient::i64")]
    pub producto_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,

    #[serde(deserialize_with = "super::lenient::f64")]
    pub cantidad: f64,

    #[serde(deserialize_with = "super::lenient::f64")]
    pub precio_unitario: f64,

    #[serde(default, deserialize_with = "super::lenient::f64")]
    pub subtotal: f64,
}

/// Body for creating an invoice
#[derive(Debug, Clone, Default, Serialize)]
pub struct NuevaFactura {
    pub cliente_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,

    pub items: Vec<NuevoItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
}

/// Line of a new invoice
#[derive(Debug, Clone, Serialize)]
pub struct NuevoItem {
    pub producto_id: i64,
    pub cantidad: f64,
    pub precio_unitario: f64,
}
