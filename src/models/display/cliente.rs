//! Customer rows

use serde::Serialize;
use tabled::Tabled;

use super::or_empty;
use crate::client::models::Cliente;

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ClienteDisplay {
    #[tabled(rename = "ID")]
    pub id: i64,

    #[tabled(rename = "NOMBRE")]
    pub nombre: String,

    #[tabled(rename = "DOCUMENTO")]
    pub documento: String,

    #[tabled(rename = "EMAIL")]
    pub email: String,

    #[tabled(rename = "TELÉFONO")]
    pub telefono: String,
}

impl From<&Cliente> for ClienteDisplay {
    fn from(cliente: &Cliente) -> Self {
        Self {
            id: cliente.id,
            nombre: cliente.nombre.clone(),
            documento: or_empty(&cliente.documento),
            email: or_empty(&cliente.email),
            telefono: or_empty(&cliente.telefono),
        }
    }
}

impl From<Cliente> for ClienteDisplay {
    fn from(cliente: Cliente) -> Self {
        Self::from(&cliente)
    }
}
