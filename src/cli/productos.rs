//! Product commands

use crate::cli::args::GlobalOptions;
use crate::cli::handlers::{confirm, print_written, run_list_command};
use crate::cli::{CommandContext, ProductoCommands, ProductoFilterArgs};
use crate::client::{ListingApi, ProductoFilters};
use crate::client::models::{Producto, ProductoInput};
use crate::error::Result;
use crate::models::ProductoDisplay;
use crate::resources::ProductosResource;

/// Fields given to `productos update`; `None` keeps the current value
#[derive(Debug, Default)]
struct ProductoChanges {
    nombre: Option<String>,
    precio: Option<f64>,
    stock: Option<i64>,
    codigo: Option<String>,
    stock_minimo: Option<i64>,
    categoria: Option<String>,
}

impl ProductoChanges {
    fn apply(self, current: &Producto) -> ProductoInput {
        ProductoInput {
            nombre: self.nombre.unwrap_or_else(|| current.nombre.clone()),
            precio: self.precio.unwrap_or(current.precio),
            stock: self.stock.unwrap_or(current.stock),
            codigo: self.codigo.or_else(|| current.codigo.clone()),
            stock_minimo: self.stock_minimo.or(current.stock_minimo),
            categoria: self.categoria.or_else(|| current.categoria.clone()),
        }
    }
}

pub async fn run(opts: &GlobalOptions, command: ProductoCommands) -> Result<()> {
    match command {
        ProductoCommands::List { filters } => list(opts, filters).await,
        ProductoCommands::Create {
            nombre,
            precio,
            stock,
            codigo,
            stock_minimo,
            categoria,
        } => {
            let input = ProductoInput {
                nombre,
                precio,
                stock,
                codigo,
                stock_minimo,
                categoria,
            };
            create(opts, &input).await
        }
        ProductoCommands::Update {
            id,
            nombre,
            precio,
            stock,
            codigo,
            stock_minimo,
            categoria,
        } => {
            let changes = ProductoChanges {
                nombre,
                precio,
                stock,
                codigo,
                stock_minimo,
                categoria,
            };
            update(opts, id, changes).await
        }
        ProductoCommands::Delete { id, yes } => delete(opts, id, yes).await,
    }
}

async fn list(opts: &GlobalOptions, args: ProductoFilterArgs) -> Result<()> {
    let filters = args.to_filters();
    let only_low = args.bajo_stock;

    run_list_command::<Producto, ProductoDisplay, _, _>(opts, "productos", |ctx| async move {
        let productos = ProductosResource::new(ctx, filters);
        productos.refresh().await?;
        Ok(if only_low {
            productos.low_stock()
        } else {
            productos.state().data
        })
    })
    .await
}

async fn create(opts: &GlobalOptions, input: &ProductoInput) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let productos = ProductosResource::new(ctx.resources.clone(), ProductoFilters::new());

    let created = productos.create(input).await?;
    print_written(
        ctx.format,
        &created,
        &format!("Product \"{}\" created (ID: {})", created.nombre, created.id),
    )
}

async fn update(opts: &GlobalOptions, id: i64, changes: ProductoChanges) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let current = ctx.client.get_producto_fresh(id).await?;

    let productos = ProductosResource::new(ctx.resources.clone(), ProductoFilters::new());
    let updated = productos.update(id, &changes.apply(&current)).await?;
    print_written(
        ctx.format,
        &updated,
        &format!("Product \"{}\" updated", updated.nombre),
    )
}

async fn delete(opts: &GlobalOptions, id: i64, yes: bool) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if !confirm(yes, &format!("product #{}", id))? {
        return Ok(());
    }

    let productos = ProductosResource::new(ctx.resources.clone(), ProductoFilters::new());
    productos.delete(id).await?;
    print_written(
        ctx.format,
        &serde_json::json!({ "deleted": true, "id": id }),
        &format!("Product #{} deleted", id),
    )
}
