//! Dashboard statistics

use serde::{Deserialize, Serialize};

/// Aggregates for one calendar day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Estadisticas {
    #[serde(default)]
    pub fecha: String,

    #[serde(default, deserialize_with = "super::lenient::f64")]
    pub total_ventas: f64,

    #[serde(default, deserialize_with = "super::lenient::i64")]
    pub num_facturas: i64,

    #[serde(default, deserialize_with = "super::lenient::i64")]
    pub facturas_pendientes: i64,

    #[serde(default, deserialize_with = "super::lenient::f64")]
    pub monto_pendiente: f64,

    #[serde(default, deserialize_with = "super::lenient::i64")]
    pub productos_bajo_stock: i64,

    #[serde(default, deserialize_with = "super::lenient::i64")]
    pub clientes_nuevos: i64,
}
