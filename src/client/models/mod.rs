//! SaleSystem backend data models
//!
//! Field lists cover what the cache and the command line need; unknown
//! fields in backend responses are ignored.

mod auth;
mod cliente;
mod estadisticas;
mod factura;
mod notificacion;
mod producto;

pub use auth::{ApiResponse, Credentials, SessionToken, Usuario};
pub use cliente::{Cliente, ClienteInput};
pub use estadisticas::Estadisticas;
pub use factura::{EstadoFactura, Factura, FacturaItem, NuevaFactura, NuevoItem};
pub use notificacion::{NotificationRef, Notificacion};
pub use producto::{Producto, ProductoInput};

/// Deserializers for numbers the PHP backend may send as strings
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Int(i64),
        Float(f64),
        Str(String),
        Null(()),
    }

    fn parse<E: Error>(raw: NumOrString) -> Result<Option<f64>, E> {
        match raw {
            NumOrString::Int(n) => Ok(Some(n as f64)),
            NumOrString::Float(n) => Ok(Some(n)),
            NumOrString::Str(s) if s.trim().is_empty() => Ok(None),
            NumOrString::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| E::custom(format!("expected a number, got '{}'", s))),
            NumOrString::Null(()) => Ok(None),
        }
    }

    pub fn f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(parse(NumOrString::deserialize(d)?)?.unwrap_or_default())
    }

    pub fn i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Ok(parse(NumOrString::deserialize(d)?)?.unwrap_or_default() as i64)
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(parse(NumOrString::deserialize(d)?)?.map(|n| n as i64))
    }
}
