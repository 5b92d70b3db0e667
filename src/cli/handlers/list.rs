//! Generic list command handler
//!
//! Every list command follows the same flow: build the context, run a
//! visible refresh on a controller, convert the rows, print.

use std::future::Future;

use colored::Colorize;
use dialoguer::Confirm;
use log::debug;
use serde::Serialize;
use tabled::Tabled;

use super::with_spinner;
use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::resources::ResourceContext;
use crate::output::Formattable;

/// Run a list command.
///
/// `load` receives the controller context and returns the records to show;
/// it usually builds a controller, refreshes it and takes its data.
///
/// ```ignore
/// run_list_command::<Cliente, ClienteDisplay, _, _>(opts, "clientes", |ctx| async move {
///     let clientes = ClientesResource::new(ctx, filters);
///     clientes.refresh().await?;
///     Ok(clientes.state().data)
/// })
/// .await
/// ```
pub async fn run_list_command<T, D, F, Fut>(
    opts: &GlobalOptions,
    resource_name: &str,
    load: F,
) -> Result<()>
where
    D: for<'a> From<&'a T> + Tabled + Serialize,
    F: FnOnce(ResourceContext) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let ctx = CommandContext::new(opts).await?;

    debug!("Fetching {}", resource_name);
    let message = format!("Loading {}...", resource_name);
    let items = with_spinner(ctx.format, &message, load(ctx.resources.clone())).await?;
    debug!("Fetched {} {}", items.len(), resource_name);

    print_rows::<T, D>(&items, ctx.format)
}

/// Convert records to display rows and print them
pub fn print_rows<T, D>(items: &[T], format: OutputFormat) -> Result<()>
where
    D: for<'a> From<&'a T> + Tabled + Serialize,
{
    let rows: Vec<D> = items.iter().map(D::from).collect();
    rows.print(format)
}

/// Ask before a destructive change unless `--yes` was given.
///
/// Returns `false` when the user declines.
pub fn confirm(yes: bool, what: &str) -> Result<bool> {
    if yes {
        return Ok(true);
    }

    eprintln!("{} Delete {}? This cannot be undone.", "⚠".yellow(), what);
    let confirmed = Confirm::new()
        .with_prompt("Confirm deletion?")
        .default(false)
        .interact()?;

    if !confirmed {
        eprintln!("Cancelled.");
    }
    Ok(confirmed)
}

/// Print the outcome of a write: the record as JSON, or a one-line summary
pub fn print_written<T: Serialize>(format: OutputFormat, record: &T, summary: &str) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", crate::output::json::format_json(record)?),
        OutputFormat::Table => eprintln!("{} {}", "✓".green(), summary),
    }
    Ok(())
}
