//! Client (customer) models

use serde::{Deserialize, Serialize};

/// Customer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cliente {
    #[serde(deserialize_with = "super::lenient::i64")]
    pub id: i64,

    pub nombre: String,

    /// Tax or identity document number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documento: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
}

/// Body for creating or updating a customer
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClienteInput {
    pub nombre: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub documento: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
}
