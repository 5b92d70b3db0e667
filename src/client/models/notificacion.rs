//! Notification models
//!
//! Notifications point at a record but never carry it authoritatively;
//! opening one re-fetches the target.

use serde::{Deserialize, Serialize};

/// One notification, tagged by `tipo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum Notificacion {
    StockBajo {
        id: String,
        #[serde(deserialize_with = "super::lenient::i64")]
        producto_id: i64,
        nombre: String,
        #[serde(deserialize_with = "super::lenient::i64")]
        stock: i64,
        #[serde(default)]
        leida: bool,
    },
    FacturaPendiente {
        id: String,
        #[serde(deserialize_with = "super::lenient::i64")]
        factura_id: i64,
        numero: String,
        #[serde(deserialize_with = "super::lenient::f64")]
        total: f64,
        #[serde(default, deserialize_with = "super::lenient::i64")]
        dias: i64,
        #[serde(default)]
        leida: bool,
    },
    FacturaVencida {
        id: String,
        #[serde(deserialize_with = "super::lenient::i64")]
        factura_id: i64,
        numero: String,
        #[serde(deserialize_with = "super::lenient::f64")]
        total: f64,
        #[serde(default, deserialize_with = "super::lenient::i64")]
        dias_vencida: i64,
        #[serde(default)]
        leida: bool,
    },
    Sistema {
        id: String,
        mensaje: String,
        #[serde(default)]
        leida: bool,
    },
}

/// Record a notification refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationRef {
    Producto(i64),
    Factura(i64),
}

impl Notificacion {
    pub fn id(&self) -> &str {
        match self {
            Notificacion::StockBajo { id, .. }
            | Notificacion::FacturaPendiente { id, .. }
            | Notificacion::FacturaVencida { id, .. }
            | Notificacion::Sistema { id, .. } => id,
        }
    }

    pub fn is_read(&self) -> bool {
        match self {
            Notificacion::StockBajo { leida, .. }
            | Notificacion::FacturaPendiente { leida, .. }
            | Notificacion::FacturaVencida { leida, .. }
            | Notificacion::Sistema { leida, .. } => *leida,
        }
    }

    /// Short label for the notification kind
    pub fn kind(&self) -> &'static str {
        match self {
            Notificacion::StockBajo { .. } => "stock",
            Notificacion::FacturaPendiente { .. } => "pendiente",
            Notificacion::FacturaVencida { .. } => "vencida",
            Notificacion::Sistema { .. } => "sistema",
        }
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        match self {
            Notificacion::StockBajo { nombre, stock, .. } => {
                format!("{} has {} units left", nombre, stock)
            }
            Notificacion::FacturaPendiente {
                numero, total, dias, ..
            } => format!("Invoice {} ({:.2}) pending for {} days", numero, total, dias),
            Notificacion::FacturaVencida {
                numero,
                total,
                dias_vencida,
                ..
            } => format!(
                "Invoice {} ({:.2}) overdue by {} days",
                numero, total, dias_vencida
            ),
            Notificacion::Sistema { mensaje, .. } => mensaje.clone(),
        }
    }

    pub fn target(&self) -> Option<NotificationRef> {
        match self {
            Notificacion::StockBajo { producto_id, .. } => {
                Some(NotificationRef::Producto(*producto_id))
            }
            Notificacion::FacturaPendiente { factura_id, .. }
            | Notificacion::FacturaVencida { factura_id, .. } => {
                Some(NotificationRef::Factura(*factura_id))
            }
            Notificacion::Sistema { .. } => None,
        }
    }
}
