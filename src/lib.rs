//! SaleSystem client library
//!
//! Typed access to the SaleSystem invoicing backend with a two-tier
//! response cache, stale-while-revalidate reads, write-driven invalidation
//! and observable resource controllers.

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod output;
pub mod resources;
