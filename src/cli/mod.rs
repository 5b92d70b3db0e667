//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod cache;
pub mod clientes;
pub mod context;
pub mod dashboard;
pub mod facturas;
pub mod handlers;
pub mod init;
pub mod notificaciones;
pub mod productos;
pub mod status;

pub use args::{ClienteFilterArgs, FacturaFilterArgs, OutputFormat, ProductoFilterArgs};
pub use context::CommandContext;

use crate::client::models::{EstadoFactura, NuevoItem};

/// SaleSystem CLI - cached command line companion for the SaleSystem backend
#[derive(Parser, Debug)]
#[command(name = "salesystem")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "SALESYSTEM_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "SALESYSTEM_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the backend root URL
    #[arg(long, global = true, env = "SALESYSTEM_BASE_URL", hide_env = true)]
    pub base_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "SALESYSTEM_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass the response cache, always ask the backend
    #[arg(long, global = true, env = "SALESYSTEM_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and save the session
    Init {
        /// Username (prompted when omitted)
        #[arg(long, short = 'u')]
        username: Option<String>,

        /// Password, for scripted logins
        #[arg(long, env = "SALESYSTEM_PASSWORD", hide = true)]
        password: Option<String>,
    },

    /// End the session and drop cached data
    Logout,

    /// Show session, configuration and cache status
    Status,

    /// Display version information
    Version,

    /// Today's sales, pending invoices and stock alerts
    #[command(after_help = "EXAMPLES:\n  \
            salesystem dashboard                 # One-off summary\n  \
            salesystem dashboard --watch 30      # Redraw every 30s until Ctrl-C\n  \
            salesystem dashboard --format json")]
    Dashboard {
        /// Keep refreshing every N seconds
        #[arg(long, short = 'w', value_name = "SECS")]
        watch: Option<u64>,
    },

    /// Manage customers
    #[command(subcommand, visible_alias = "c")]
    Clientes(ClienteCommands),

    /// Manage the product catalogue
    #[command(subcommand, visible_alias = "p")]
    Productos(ProductoCommands),

    /// View and manage invoices
    #[command(subcommand, visible_alias = "f")]
    Facturas(FacturaCommands),

    /// Stock and payment alerts
    #[command(subcommand, visible_alias = "n")]
    Notificaciones(NotificacionCommands),

    /// Manage local response cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Generate shell completions
    #[command(after_help = "\
Install:
  bash:   salesystem completion bash > /etc/bash_completion.d/salesystem
  zsh:    salesystem completion zsh > \"${fpath[1]}/_salesystem\"
  fish:   salesystem completion fish > ~/.config/fish/completions/salesystem.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Customer subcommands
#[derive(Subcommand, Debug)]
pub enum ClienteCommands {
    /// List customers
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        filters: ClienteFilterArgs,
    },

    /// Register a customer
    Create {
        /// Full name or business name
        nombre: String,
        #[arg(long)]
        documento: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        telefono: Option<String>,
        #[arg(long)]
        direccion: Option<String>,
    },

    /// Change a customer's details
    Update {
        /// Customer ID
        id: i64,
        #[arg(long)]
        nombre: Option<String>,
        #[arg(long)]
        documento: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        telefono: Option<String>,
        #[arg(long)]
        direccion: Option<String>,
    },

    /// Delete a customer
    Delete {
        /// Customer ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Product subcommands
#[derive(Subcommand, Debug)]
pub enum ProductoCommands {
    /// List products
    #[command(
        visible_alias = "ls",
        after_help = "EXAMPLES:\n  \
            salesystem productos list\n  \
            salesystem productos list --buscar cemento\n  \
            salesystem productos list --bajo-stock"
    )]
    List {
        #[command(flatten)]
        filters: ProductoFilterArgs,
    },

    /// Add a product
    Create {
        nombre: String,
        #[arg(long)]
        precio: f64,
        #[arg(long, default_value_t = 0)]
        stock: i64,
        #[arg(long)]
        codigo: Option<String>,
        /// Stock level that triggers an alert
        #[arg(long = "stock-minimo")]
        stock_minimo: Option<i64>,
        #[arg(long)]
        categoria: Option<String>,
    },

    /// Change price, stock or details
    Update {
        /// Product ID
        id: i64,
        #[arg(long)]
        nombre: Option<String>,
        #[arg(long)]
        precio: Option<f64>,
        #[arg(long)]
        stock: Option<i64>,
        #[arg(long)]
        codigo: Option<String>,
        #[arg(long = "stock-minimo")]
        stock_minimo: Option<i64>,
        #[arg(long)]
        categoria: Option<String>,
    },

    /// Delete a product
    Delete {
        /// Product ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Invoice subcommands
#[derive(Subcommand, Debug)]
pub enum FacturaCommands {
    /// List invoices
    #[command(
        visible_alias = "ls",
        after_help = "EXAMPLES:\n  \
            salesystem facturas list --hoy\n  \
            salesystem facturas list --estado pendiente\n  \
            salesystem facturas list --desde 2024-05-01 --hasta 2024-05-31 --cliente 12"
    )]
    List {
        #[command(flatten)]
        filters: FacturaFilterArgs,
    },

    /// Show an invoice with its line items
    #[command(visible_alias = "g")]
    Get {
        /// Invoice ID
        id: i64,
    },

    /// Issue an invoice
    #[command(after_help = "EXAMPLES:\n  \
            salesystem facturas create --cliente 4 --item 10:2 --item 11:1:99.90\n\n\
            Items are PRODUCTO_ID:CANTIDAD[:PRECIO]; the catalogue price is used when PRECIO is omitted.")]
    Create {
        /// Customer ID
        #[arg(long)]
        cliente: i64,
        /// Line item, repeatable
        #[arg(long = "item", required = true, value_parser = facturas::parse_item)]
        items: Vec<ItemArg>,
        #[arg(long)]
        notas: Option<String>,
    },

    /// Change an invoice's payment state
    Estado {
        /// Invoice ID
        id: i64,
        /// New state (pendiente, pagada, anulada)
        estado: EstadoFactura,
    },

    /// Delete an invoice
    Delete {
        /// Invoice ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Line item as typed on the command line; price may be left to the catalogue
#[derive(Debug, Clone, PartialEq)]
pub struct ItemArg {
    pub producto_id: i64,
    pub cantidad: f64,
    pub precio: Option<f64>,
}

impl ItemArg {
    pub fn with_price(&self, precio_unitario: f64) -> NuevoItem {
        NuevoItem {
            producto_id: self.producto_id,
            cantidad: self.cantidad,
            precio_unitario,
        }
    }
}

/// Notification subcommands
#[derive(Subcommand, Debug)]
pub enum NotificacionCommands {
    /// List notifications
    #[command(visible_alias = "ls")]
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },

    /// Show the record a notification points at
    Open {
        /// Notification ID
        id: String,
    },
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,
    /// Clear all cached data
    Clear,
    /// Print cache directory path
    Path,
}
