//! Display models for CLI output
//!
//! Converts backend records into rows with terminal-friendly columns.

pub mod display;

pub use display::{
    ClienteDisplay, DashboardSummary, FacturaDisplay, FacturaItemDisplay, NotificacionDisplay,
    ProductoDisplay,
};
