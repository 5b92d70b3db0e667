//! Invoice commands

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::handlers::{confirm, print_rows, print_written, run_list_command, with_spinner};
use crate::cli::{CommandContext, FacturaCommands, FacturaFilterArgs, ItemArg, OutputFormat};
use crate::client::models::{EstadoFactura, Factura, NuevaFactura, NuevoItem};
use crate::client::{FacturaFilters, ListingApi};
use crate::error::Result;
use crate::models::{FacturaDisplay, FacturaItemDisplay};
use crate::output::formatters::{format_fecha, format_money};
use crate::output::json::format_json;
use crate::output::table::format_fields;
use crate::resources::FacturasResource;

/// Parse `PRODUCTO_ID:CANTIDAD[:PRECIO]`
pub fn parse_item(value: &str) -> std::result::Result<ItemArg, String> {
    let parts: Vec<&str> = value.split(':').map(str::trim).collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(format!(
            "invalid item '{}', expected PRODUCTO_ID:CANTIDAD[:PRECIO]",
            value
        ));
    }

    let producto_id = parts[0]
        .parse::<i64>()
        .map_err(|_| format!("invalid product ID '{}'", parts[0]))?;
    let cantidad = parts[1]
        .parse::<f64>()
        .ok()
        .filter(|c| *c > 0.0)
        .ok_or_else(|| format!("invalid quantity '{}'", parts[1]))?;
    let precio = match parts.get(2) {
        Some(raw) => Some(
            raw.parse::<f64>()
                .ok()
                .filter(|p| *p >= 0.0)
                .ok_or_else(|| format!("invalid price '{}'", raw))?,
        ),
        None => None,
    };

    Ok(ItemArg {
        producto_id,
        cantidad,
        precio,
    })
}

pub async fn run(opts: &GlobalOptions, command: FacturaCommands) -> Result<()> {
    match command {
        FacturaCommands::List { filters } => list(opts, filters).await,
        FacturaCommands::Get { id } => get(opts, id).await,
        FacturaCommands::Create {
            cliente,
            items,
            notas,
        } => create(opts, cliente, items, notas).await,
        FacturaCommands::Estado { id, estado } => set_estado(opts, id, estado).await,
        FacturaCommands::Delete { id, yes } => delete(opts, id, yes).await,
    }
}

async fn list(opts: &GlobalOptions, args: FacturaFilterArgs) -> Result<()> {
    run_list_command::<Factura, FacturaDisplay, _, _>(opts, "facturas", |ctx| async move {
        let filters = args.to_filters(ctx.clock.today());
        let facturas = FacturasResource::new(ctx, filters);
        facturas.refresh().await?;
        Ok(facturas.state().data)
    })
    .await
}

fn format_detail(factura: &Factura, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(format_json(factura)?);
    }

    let cliente = factura
        .cliente_nombre
        .clone()
        .unwrap_or_else(|| format!("#{}", factura.cliente_id));
    let header = format_fields(&[
        ("Número", factura.numero.clone()),
        ("Fecha", format_fecha(&factura.fecha)),
        ("Cliente", cliente),
        ("Estado", factura.estado.to_string()),
    ]);
    let lines: Vec<FacturaItemDisplay> = factura.items.iter().map(FacturaItemDisplay::from).collect();
    let totals = format_fields(&[
        ("Subtotal", format_money(factura.subtotal)),
        ("Impuesto", format_money(factura.impuesto)),
        ("Total", format_money(factura.total)),
    ]);

    Ok(format!(
        "{}\n{}\n{}",
        header,
        crate::output::table::format_table(&lines),
        totals
    ))
}

async fn get(opts: &GlobalOptions, id: i64) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let facturas = FacturasResource::new(ctx.resources.clone(), FacturaFilters::new());

    let factura = with_spinner(ctx.format, "Loading invoice...", facturas.detail(id)).await?;
    println!("{}", format_detail(&factura, ctx.format)?);
    Ok(())
}

async fn create(
    opts: &GlobalOptions,
    cliente_id: i64,
    items: Vec<ItemArg>,
    notas: Option<String>,
) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;

    // Fill missing prices from the catalogue
    let mut lines: Vec<NuevoItem> = Vec::with_capacity(items.len());
    for item in &items {
        let precio = match item.precio {
            Some(precio) => precio,
            None => ctx.client.get_producto(item.producto_id).await?.precio,
        };
        lines.push(item.with_price(precio));
    }

    let nueva = NuevaFactura {
        cliente_id,
        fecha: None,
        items: lines,
        notas,
    };

    let facturas = FacturasResource::today(ctx.resources.clone());
    let created = facturas.create(&nueva).await?;
    print_written(
        ctx.format,
        &created,
        &format!(
            "Invoice {} issued for {}",
            created.numero.bold(),
            format_money(created.total)
        ),
    )?;

    if ctx.format == OutputFormat::Table {
        print_rows::<Factura, FacturaDisplay>(&facturas.state().data, ctx.format)?;
    }
    Ok(())
}

async fn set_estado(opts: &GlobalOptions, id: i64, estado: EstadoFactura) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let facturas = FacturasResource::new(ctx.resources.clone(), FacturaFilters::new());

    let updated = facturas.update_estado(id, estado).await?;
    print_written(
        ctx.format,
        &updated,
        &format!("Invoice {} is now {}", updated.numero, updated.estado),
    )
}

async fn delete(opts: &GlobalOptions, id: i64, yes: bool) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if !confirm(yes, &format!("invoice #{}", id))? {
        return Ok(());
    }

    let facturas = FacturasResource::new(ctx.resources.clone(), FacturaFilters::new());
    facturas.delete(id).await?;
    print_written(
        ctx.format,
        &serde_json::json!({ "deleted": true, "id": id }),
        &format!("Invoice #{} deleted", id),
    )
}
