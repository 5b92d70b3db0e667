//! Display model implementations for table and JSON output

mod cliente;
mod dashboard;
mod factura;
mod notificacion;
mod producto;

pub use cliente::ClienteDisplay;
pub use dashboard::DashboardSummary;
pub use factura::{FacturaDisplay, FacturaItemDisplay};
pub use notificacion::NotificacionDisplay;
pub use producto::ProductoDisplay;

/// Placeholder for absent optional fields
pub(crate) const EMPTY: &str = "--";

pub(crate) fn or_empty(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(EMPTY)
        .to_string()
}
