//! API trait definitions split by responsibility
//!
//! - [`AuthApi`] - Session operations
//! - [`ListingApi`] - Reads, all of them cacheable
//! - [`MutationApi`] - Writes
//!
//! The [`SaleApi`](super::SaleApi) super-trait combines all three.

mod auth;
mod listing;
mod mutation;

pub use auth::AuthApi;
pub use listing::ListingApi;
pub use mutation::MutationApi;
