//! SaleSystem backend API client

pub mod api;
pub mod auth;
pub mod filters;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod query;
pub mod rate_limit;
pub mod salesystem;

pub use api::{AuthApi, ListingApi, MutationApi};
pub use auth::{AuthGate, AuthStatus};
pub use filters::{ClienteFilters, FacturaFilters, ProductoFilters};
#[cfg(test)]
pub use mock::MockSaleClient;
pub use query::QueryParams;
pub use salesystem::SaleSystemClient;

/// SaleSystem backend API
///
/// Combines [`AuthApi`], [`ListingApi`] and [`MutationApi`]; implemented
/// for every type that implements all three.
pub trait SaleApi: AuthApi + ListingApi + MutationApi {}

impl<T: AuthApi + ListingApi + MutationApi> SaleApi for T {}
