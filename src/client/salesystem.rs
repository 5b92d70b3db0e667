//! SaleSystem backend client implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::{Client as HttpClient, Method, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use super::api::{AuthApi, ListingApi, MutationApi};
use super::auth::{AuthGate, AuthStatus};
use super::filters::{ClienteFilters, FacturaFilters, ProductoFilters};
use super::models::{
    ApiResponse, Cliente, ClienteInput, Credentials, EstadoFactura, Estadisticas, Factura,
    NuevaFactura, Notificacion, Producto, ProductoInput, SessionToken, Usuario,
};
use super::query::{QueryParams, encode_query};
use super::rate_limit::{RateLimiterSet, RequestCategory};
use crate::cache::Resource;
use crate::error::{ApiError, Error, Result};

const AUTH_ENDPOINT: &str = "api/auth.php";

/// How long a fresh login is trusted before `init` must run again
const SESSION_LIFETIME_HOURS: i64 = 24;

/// HTTP client for the SaleSystem PHP backend
pub struct SaleSystemClient {
    http: HttpClient,
    base_url: String,
    rate_limiters: Arc<RateLimiterSet>,
    session: Arc<RwLock<Option<String>>>,
    gate: AuthGate,
}

impl SaleSystemClient {
    /// Create a client for the backend rooted at `base_url`
    pub fn new(base_url: &str, gate: AuthGate) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http,
            base_url,
            rate_limiters: Arc::new(RateLimiterSet::new()),
            session: Arc::new(RwLock::new(None)),
            gate,
        })
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Use a previously stored session cookie
    pub async fn set_session(&self, cookie: Option<String>) {
        *self.session.write().await = cookie;
    }

    fn url(&self, endpoint: &str, params: &QueryParams) -> String {
        let query = encode_query(params.present());
        if query.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, query)
        }
    }

    /// Send a request and map the HTTP status.
    ///
    /// Authenticated requests pass the auth gate first.
    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        params: &QueryParams,
        body: Option<serde_json::Value>,
        authenticated: bool,
    ) -> Result<Response> {
        if authenticated {
            self.gate.check()?;
        }

        let category = RequestCategory::from_request(endpoint, &method);
        self.rate_limiters.wait_for(category).await;

        let url = self.url(endpoint, params);
        log::debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method, &url)
            .header(header::ACCEPT, "application/json");
        if let Some(cookie) = self.session.read().await.as_deref() {
            request = request.header(header::COOKIE, cookie);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(ApiError::from)?;

        let status = response.status();
        match status {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => {
                if authenticated {
                    self.gate.set(AuthStatus::Unauthenticated);
                }
                Err(ApiError::Unauthorized.into())
            }
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => {
                let error_msg = backend_message(response)
                    .await
                    .unwrap_or_else(|| endpoint.to_string());
                Err(ApiError::NotFound(error_msg).into())
            }
            StatusCode::TOO_MANY_REQUESTS => {
                self.rate_limiters.activate(category);
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let error_msg = backend_message(response)
                    .await
                    .unwrap_or_else(|| "Bad request".to_string());
                Err(ApiError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = backend_message(response)
                    .await
                    .unwrap_or_else(|| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => Err(ApiError::InvalidResponse(format!("Unexpected status code: {}", status)).into()),
        }
    }

    /// Authenticated request returning the envelope's `data`
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: &QueryParams,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let response = self.send(method, endpoint, params, body, true).await?;
        let envelope: ApiResponse<T> = parse_envelope(response).await?;
        unwrap_data(envelope)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &QueryParams) -> Result<T> {
        self.request(Method::GET, endpoint, params, None).await
    }

    /// Authenticated write whose response carries no payload worth keeping
    async fn request_no_data(&self, method: Method, endpoint: &str, params: &QueryParams) -> Result<()> {
        let response = self.send(method, endpoint, params, None, true).await?;
        let envelope: ApiResponse<serde_json::Value> = parse_envelope(response).await?;
        if !envelope.success {
            return Err(ApiError::Backend(envelope.message).into());
        }
        Ok(())
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<Option<serde_json::Value>> {
    Ok(Some(serde_json::to_value(value)?))
}

fn by_id(id: i64) -> QueryParams {
    QueryParams::new().with("id", id)
}

/// Message from an error body, whether it is an envelope or plain text
async fn backend_message(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text)
        .map(|envelope| envelope.message)
        .unwrap_or(text);
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

async fn parse_envelope<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>> {
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response: {}", e)))?;
    serde_json::from_str(&text).map_err(|e| {
        ApiError::InvalidResponse(format!("Failed to parse response: {}", e)).into()
    })
}

fn unwrap_data<T>(envelope: ApiResponse<T>) -> Result<T> {
    if !envelope.success {
        return Err(ApiError::Backend(envelope.message).into());
    }
    envelope
        .data
        .ok_or_else(|| ApiError::InvalidResponse("Response has no data".to_string()).into())
}

/// `name=value` part of the first `Set-Cookie` header
fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .find(|pair| pair.contains('='))
        .map(str::to_string)
}

// ============================================================================
// AuthApi Implementation
// ============================================================================

#[async_trait]
impl AuthApi for SaleSystemClient {
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken> {
        let params = QueryParams::new().with("action", "login");
        let response = self
            .send(Method::POST, AUTH_ENDPOINT, &params, to_body(credentials)?, false)
            .await?;

        let cookie = session_cookie(&response)
            .ok_or_else(|| ApiError::InvalidResponse("Login did not set a session cookie".into()))?;
        let envelope: ApiResponse<Usuario> = parse_envelope(response).await?;
        if !envelope.success {
            self.gate.set(AuthStatus::Unauthenticated);
            return Err(ApiError::Backend(envelope.message).into());
        }

        self.set_session(Some(cookie.clone())).await;
        self.gate.set(AuthStatus::Authenticated);

        Ok(SessionToken {
            cookie,
            expires_at: Utc::now() + chrono::Duration::hours(SESSION_LIFETIME_HOURS),
            user: envelope.data,
        })
    }

    async fn check_session(&self) -> Result<Option<Usuario>> {
        let params = QueryParams::new().with("action", "check");
        let response = match self
            .send(Method::GET, AUTH_ENDPOINT, &params, None, false)
            .await
        {
            Ok(response) => response,
            Err(Error::Api(ApiError::Unauthorized)) => {
                self.gate.set(AuthStatus::Unauthenticated);
                return Ok(None);
            }
            // Status stays unknown; the caller decides whether to retry
            Err(e) => return Err(e),
        };

        let envelope: ApiResponse<Usuario> = parse_envelope(response).await?;
        match envelope.data {
            Some(user) if envelope.success => {
                self.gate.set(AuthStatus::Authenticated);
                Ok(Some(user))
            }
            _ => {
                self.gate.set(AuthStatus::Unauthenticated);
                Ok(None)
            }
        }
    }

    async fn logout(&self) -> Result<()> {
        let params = QueryParams::new().with("action", "logout");
        let result = self
            .send(Method::POST, AUTH_ENDPOINT, &params, None, false)
            .await;

        self.set_session(None).await;
        self.gate.set(AuthStatus::Unauthenticated);
        result.map(|_| ())
    }
}

// ============================================================================
// ListingApi Implementation
// ============================================================================

#[async_trait]
impl ListingApi for SaleSystemClient {
    async fn list_clientes(&self, filters: &ClienteFilters) -> Result<Vec<Cliente>> {
        self.get(Resource::Clientes.endpoint(), &filters.to_params())
            .await
    }

    async fn list_productos(&self, filters: &ProductoFilters) -> Result<Vec<Producto>> {
        self.get(Resource::Productos.endpoint(), &filters.to_params())
            .await
    }

    async fn get_producto(&self, id: i64) -> Result<Producto> {
        self.get(Resource::Productos.endpoint(), &by_id(id)).await
    }

    async fn list_facturas(&self, filters: &FacturaFilters) -> Result<Vec<Factura>> {
        self.get(Resource::Facturas.endpoint(), &filters.to_params())
            .await
    }

    async fn get_factura(&self, id: i64) -> Result<Factura> {
        self.get(Resource::Facturas.endpoint(), &by_id(id)).await
    }

    async fn get_estadisticas(&self, fecha: NaiveDate) -> Result<Estadisticas> {
        let params = QueryParams::new().with("fecha", fecha.format("%Y-%m-%d"));
        self.get(Resource::Estadisticas.endpoint(), &params).await
    }

    async fn list_notificaciones(&self) -> Result<Vec<Notificacion>> {
        self.get(Resource::Notificaciones.endpoint(), &QueryParams::new())
            .await
    }
}

// ============================================================================
// MutationApi Implementation
// ============================================================================

#[async_trait]
impl MutationApi for SaleSystemClient {
    async fn create_cliente(&self, input: &ClienteInput) -> Result<Cliente> {
        self.request(
            Method::POST,
            Resource::Clientes.endpoint(),
            &QueryParams::new(),
            to_body(input)?,
        )
        .await
    }

    async fn update_cliente(&self, id: i64, input: &ClienteInput) -> Result<Cliente> {
        self.request(
            Method::PUT,
            Resource::Clientes.endpoint(),
            &by_id(id),
            to_body(input)?,
        )
        .await
    }

    async fn delete_cliente(&self, id: i64) -> Result<()> {
        self.request_no_data(Method::DELETE, Resource::Clientes.endpoint(), &by_id(id))
            .await
    }

    async fn create_producto(&self, input: &ProductoInput) -> Result<Producto> {
        self.request(
            Method::POST,
            Resource::Productos.endpoint(),
            &QueryParams::new(),
            to_body(input)?,
        )
        .await
    }

    async fn update_producto(&self, id: i64, input: &ProductoInput) -> Result<Producto> {
        self.request(
            Method::PUT,
            Resource::Productos.endpoint(),
            &by_id(id),
            to_body(input)?,
        )
        .await
    }

    async fn delete_producto(&self, id: i64) -> Result<()> {
        self.request_no_data(Method::DELETE, Resource::Productos.endpoint(), &by_id(id))
            .await
    }

    async fn create_factura(&self, factura: &NuevaFactura) -> Result<Factura> {
        self.request(
            Method::POST,
            Resource::Facturas.endpoint(),
            &QueryParams::new(),
            to_body(factura)?,
        )
        .await
    }

    async fn update_factura_estado(&self, id: i64, estado: EstadoFactura) -> Result<Factura> {
        let params = by_id(id).with("action", "estado");
        let body = serde_json::json!({ "estado": estado });
        self.request(Method::PUT, Resource::Facturas.endpoint(), &params, Some(body))
            .await
    }

    async fn delete_factura(&self, id: i64) -> Result<()> {
        self.request_no_data(Method::DELETE, Resource::Facturas.endpoint(), &by_id(id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SaleSystemClient::new("http://localhost/salesystem", AuthGate::new());
        assert!(client.is_ok());
    }

    #[test]
    fn test_url_building() {
        let client = SaleSystemClient::new("http://localhost/salesystem", AuthGate::new()).unwrap();
        assert_eq!(
            client.url("api/clientes.php", &QueryParams::new()),
            "http://localhost/salesystem/api/clientes.php"
        );

        let params = FacturaFilters::pendientes().to_params();
        assert_eq!(
            client.url("api/facturas.php", &params),
            "http://localhost/salesystem/api/facturas.php?estado=pendiente"
        );
    }

    #[tokio::test]
    async fn test_reads_blocked_until_session_checked() {
        let client = SaleSystemClient::new("http://127.0.0.1:9", AuthGate::new()).unwrap();

        let err = client.list_clientes(&ClienteFilters::new()).await.unwrap_err();
        assert!(err.is_auth_precondition());

        client.gate().set(AuthStatus::Unauthenticated);
        let err = client.list_notificaciones().await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Unauthorized)));
    }

    #[test]
    fn test_unwrap_data() {
        let ok = ApiResponse {
            success: true,
            message: String::new(),
            data: Some(3),
        };
        assert_eq!(unwrap_data(ok).unwrap(), 3);

        let failed: ApiResponse<i32> = ApiResponse {
            success: false,
            message: "Stock insuficiente".into(),
            data: None,
        };
        let err = unwrap_data(failed).unwrap_err();
        assert_eq!(err.to_string(), "Stock insuficiente");
    }
}
