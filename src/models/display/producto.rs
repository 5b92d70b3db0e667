//! Product rows

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use super::or_empty;
use crate::client::models::Producto;
use crate::output::formatters::{format_money, truncate};

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ProductoDisplay {
    #[tabled(rename = "ID")]
    pub id: i64,

    #[tabled(rename = "CÓDIGO")]
    pub codigo: String,

    #[tabled(rename = "NOMBRE")]
    pub nombre: String,

    #[tabled(rename = "CATEGORÍA")]
    pub categoria: String,

    #[tabled(rename = "PRECIO")]
    pub precio: String,

    /// Stock, flagged when at or under the minimum
    #[tabled(rename = "STOCK")]
    pub stock: String,

    #[tabled(skip)]
    pub bajo_stock: bool,
}

impl From<&Producto> for ProductoDisplay {
    fn from(producto: &Producto) -> Self {
        let bajo_stock = producto.is_low_stock();
        let stock = if bajo_stock {
            format!("{} {}", producto.stock, "⚠".yellow())
        } else {
            producto.stock.to_string()
        };

        Self {
            id: producto.id,
            codigo: or_empty(&producto.codigo),
            nombre: truncate(&producto.nombre, 40),
            categoria: or_empty(&producto.categoria),
            precio: format_money(producto.precio),
            stock,
            bajo_stock,
        }
    }
}

impl From<Producto> for ProductoDisplay {
    fn from(producto: Producto) -> Self {
        Self::from(&producto)
    }
}
