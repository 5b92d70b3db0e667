//! Dashboard summary

use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;

use super::FacturaDisplay;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output::Formattable;
use crate::output::formatters::format_money;
use crate::output::json::format_json;
use crate::output::table::{format_fields, format_table};
use crate::resources::Dashboard;

/// Invoices listed under each dashboard section
const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub fecha: NaiveDate,
    pub total_ventas: f64,
    pub num_facturas: i64,
    pub facturas_pendientes: i64,
    pub monto_pendiente: f64,
    pub productos_bajo_stock: i64,
    pub clientes_nuevos: i64,
    pub ventas_hoy: Vec<FacturaDisplay>,
    pub pendientes: Vec<FacturaDisplay>,
}

impl From<&Dashboard> for DashboardSummary {
    fn from(dashboard: &Dashboard) -> Self {
        let stats = &dashboard.estadisticas;
        Self {
            fecha: dashboard.fecha,
            total_ventas: stats.total_ventas,
            num_facturas: stats.num_facturas,
            facturas_pendientes: stats.facturas_pendientes,
            monto_pendiente: stats.monto_pendiente,
            productos_bajo_stock: stats.productos_bajo_stock,
            clientes_nuevos: stats.clientes_nuevos,
            ventas_hoy: dashboard.ventas_hoy.iter().map(FacturaDisplay::from).collect(),
            pendientes: dashboard.pendientes.iter().map(FacturaDisplay::from).collect(),
        }
    }
}

impl Formattable for DashboardSummary {
    fn format(&self, format: OutputFormat) -> Result<String> {
        if let OutputFormat::Json = format {
            return Ok(format_json(self)?);
        }

        let fields = [
            ("Ventas del día", format_money(self.total_ventas)),
            ("Facturas emitidas", self.num_facturas.to_string()),
            ("Facturas pendientes", self.facturas_pendientes.to_string()),
            ("Monto pendiente", format_money(self.monto_pendiente)),
            ("Productos con bajo stock", self.productos_bajo_stock.to_string()),
            ("Clientes nuevos", self.clientes_nuevos.to_string()),
        ];

        let mut out = format!("{} {}\n", "Resumen".bold(), self.fecha);
        out.push_str(&format_fields(&fields));

        out.push_str(&format!("\n\n{}\n", "Ventas de hoy".bold()));
        out.push_str(&format_table(&recent(&self.ventas_hoy)));

        out.push_str(&format!("\n\n{}\n", "Pendientes de cobro".bold()));
        out.push_str(&format_table(&recent(&self.pendientes)));

        Ok(out)
    }
}

fn recent(rows: &[FacturaDisplay]) -> Vec<FacturaDisplay> {
    rows.iter().take(RECENT_LIMIT).cloned().collect()
}
