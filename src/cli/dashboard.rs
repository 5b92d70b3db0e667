//! Dashboard command

use std::time::Duration;

use colored::Colorize;
use log::warn;

use crate::cli::args::GlobalOptions;
use crate::cli::handlers::with_spinner;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::{Error, Result};
use crate::models::DashboardSummary;
use crate::output::Formattable;
use crate::resources::DashboardResource;

/// Shortest accepted `--watch` period
const MIN_WATCH_SECS: u64 = 5;

pub async fn run(opts: &GlobalOptions, watch: Option<u64>) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let dashboard = DashboardResource::new(ctx.resources.clone());

    with_spinner(ctx.format, "Loading dashboard...", dashboard.refresh()).await?;
    render(&dashboard, ctx.format, false)?;

    let Some(secs) = watch else {
        return Ok(());
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(MIN_WATCH_SECS)));
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Keep showing the last good numbers when a refresh fails
                if let Err(e) = dashboard.refresh_silent().await {
                    warn!("Dashboard refresh failed: {}", e);
                }
                render(&dashboard, ctx.format, true)?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

fn render(dashboard: &DashboardResource, format: OutputFormat, redraw: bool) -> Result<()> {
    let state = dashboard.state();
    let data = state
        .data
        .as_ref()
        .ok_or_else(|| Error::Other("Dashboard has no data yet".to_string()))?;

    if redraw && format == OutputFormat::Table {
        // Clear screen, cursor home
        print!("\x1B[2J\x1B[H");
    }
    DashboardSummary::from(data).print(format)?;

    if format == OutputFormat::Table
        && let Some(updated) = state.last_updated
    {
        let local = updated.with_timezone(&chrono::Local).format("%H:%M:%S");
        eprintln!("{}", format!("Updated {}", local).dimmed());
    }
    Ok(())
}
