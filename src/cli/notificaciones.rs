//! Notification commands

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::handlers::{print_rows, with_spinner};
use crate::cli::{CommandContext, NotificacionCommands, OutputFormat};
use crate::client::models::{Factura, Notificacion, Producto};
use crate::error::{ApiError, Result};
use crate::models::{FacturaDisplay, NotificacionDisplay, ProductoDisplay};
use crate::output::json::format_json;
use crate::resources::{NotificacionesResource, OpenedNotification};

pub async fn run(opts: &GlobalOptions, command: NotificacionCommands) -> Result<()> {
    match command {
        NotificacionCommands::List { unread } => list(opts, unread).await,
        NotificacionCommands::Open { id } => open(opts, &id).await,
    }
}

async fn list(opts: &GlobalOptions, unread_only: bool) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let notificaciones = NotificacionesResource::new(ctx.resources.clone());

    with_spinner(ctx.format, "Loading notifications...", notificaciones.refresh()).await?;

    let items: Vec<Notificacion> = notificaciones
        .state()
        .data
        .into_iter()
        .filter(|n| !unread_only || !n.is_read())
        .collect();
    print_rows::<Notificacion, NotificacionDisplay>(&items, ctx.format)?;

    if ctx.format == OutputFormat::Table {
        let unread = notificaciones.unread_count();
        if unread > 0 {
            eprintln!("{} {} unread", "●".yellow(), unread);
        }
    }
    Ok(())
}

async fn open(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let notificaciones = NotificacionesResource::new(ctx.resources.clone());
    notificaciones.refresh().await?;

    let notificacion = notificaciones
        .state()
        .data
        .into_iter()
        .find(|n| n.id() == id)
        .ok_or_else(|| ApiError::NotFound(format!("Notificación {}", id)))?;

    let opened = with_spinner(ctx.format, "Opening...", notificaciones.open(&notificacion)).await?;
    match opened {
        OpenedNotification::Producto(producto) => {
            print_rows::<Producto, ProductoDisplay>(&[producto], ctx.format)
        }
        OpenedNotification::Factura(factura) => {
            print_rows::<Factura, FacturaDisplay>(&[factura], ctx.format)
        }
        OpenedNotification::Mensaje(mensaje) => {
            match ctx.format {
                OutputFormat::Json => println!(
                    "{}",
                    format_json(&serde_json::json!({ "mensaje": mensaje }))?
                ),
                OutputFormat::Table => println!("{}", mensaje),
            }
            Ok(())
        }
    }
}
