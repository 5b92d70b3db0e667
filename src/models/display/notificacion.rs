//! Notification rows

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::Notificacion;

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct NotificacionDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "")]
    #[serde(skip)]
    pub marca: String,

    #[tabled(rename = "TIPO")]
    pub tipo: String,

    #[tabled(rename = "MENSAJE")]
    pub mensaje: String,

    #[tabled(skip)]
    pub leida: bool,
}

impl From<&Notificacion> for NotificacionDisplay {
    fn from(notificacion: &Notificacion) -> Self {
        let leida = notificacion.is_read();
        Self {
            id: notificacion.id().to_string(),
            marca: if leida { String::new() } else { "●".to_string() },
            tipo: notificacion.kind().to_string(),
            mensaje: notificacion.message(),
            leida,
        }
    }
}
