//! Product catalogue models

use serde::{Deserialize, Serialize};

/// Catalogue product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producto {
    #[serde(deserialize_with = "super::lenient::i64")]
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,

    pub nombre: String,

    #[serde(deserialize_with = "super::lenient::f64")]
    pub precio: f64,

    #[serde(default, deserialize_with = "super::lenient::i64")]
    pub stock: i64,

    #[serde(
        default,
        deserialize_with = "super::lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub stock_minimo: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
}

impl Producto {
    /// Stock at or below the configured minimum
    pub fn is_low_stock(&self) -> bool {
        self.stock_minimo.is_some_and(|min| self.stock <= min)
    }
}

/// Body for creating or updating a product
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductoInput {
    pub nombre: String,

    pub precio: f64,

    pub stock: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_minimo: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
}
