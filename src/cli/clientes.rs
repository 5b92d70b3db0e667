//! Customer commands

use crate::cli::args::GlobalOptions;
use crate::cli::handlers::{confirm, print_written, run_list_command};
use crate::cli::{ClienteCommands, ClienteFilterArgs, CommandContext};
use crate::client::ClienteFilters;
use crate::client::models::{Cliente, ClienteInput};
use crate::error::{ApiError, Result};
use crate::models::ClienteDisplay;
use crate::resources::ClientesResource;

pub async fn run(opts: &GlobalOptions, command: ClienteCommands) -> Result<()> {
    match command {
        ClienteCommands::List { filters } => list(opts, &filters).await,
        ClienteCommands::Create {
            nombre,
            documento,
            email,
            telefono,
            direccion,
        } => {
            let input = ClienteInput {
                nombre,
                documento,
                email,
                telefono,
                direccion,
            };
            create(opts, &input).await
        }
        ClienteCommands::Update {
            id,
            nombre,
            documento,
            email,
            telefono,
            direccion,
        } => {
            let changes = ClienteInput {
                nombre: nombre.unwrap_or_default(),
                documento,
                email,
                telefono,
                direccion,
            };
            update(opts, id, changes).await
        }
        ClienteCommands::Delete { id, yes } => delete(opts, id, yes).await,
    }
}

async fn list(opts: &GlobalOptions, args: &ClienteFilterArgs) -> Result<()> {
    let filters = args.to_filters();
    run_list_command::<Cliente, ClienteDisplay, _, _>(opts, "clientes", |ctx| async move {
        let clientes = ClientesResource::new(ctx, filters);
        clientes.refresh().await?;
        Ok(clientes.state().data)
    })
    .await
}

async fn create(opts: &GlobalOptions, input: &ClienteInput) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let clientes = ClientesResource::new(ctx.resources.clone(), ClienteFilters::new());

    let created = clientes.create(input).await?;
    print_written(
        ctx.format,
        &created,
        &format!("Customer \"{}\" created (ID: {})", created.nombre, created.id),
    )
}

/// Apply only the fields given on the command line over the current record
fn merge(current: &Cliente, changes: ClienteInput) -> ClienteInput {
    ClienteInput {
        nombre: if changes.nombre.is_empty() {
            current.nombre.clone()
        } else {
            changes.nombre
        },
        documento: changes.documento.or_else(|| current.documento.clone()),
        email: changes.email.or_else(|| current.email.clone()),
        telefono: changes.telefono.or_else(|| current.telefono.clone()),
        direccion: changes.direccion.or_else(|| current.direccion.clone()),
    }
}

async fn update(opts: &GlobalOptions, id: i64, changes: ClienteInput) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let clientes = ClientesResource::new(ctx.resources.clone(), ClienteFilters::new());

    // Latest state before writing
    clientes.reload().await?;
    let current = clientes
        .state()
        .data
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| ApiError::NotFound(format!("Cliente {}", id)))?;

    let updated = clientes.update(id, &merge(&current, changes)).await?;
    print_written(
        ctx.format,
        &updated,
        &format!("Customer \"{}\" updated", updated.nombre),
    )
}

async fn delete(opts: &GlobalOptions, id: i64, yes: bool) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if !confirm(yes, &format!("customer #{}", id))? {
        return Ok(());
    }

    let clientes = ClientesResource::new(ctx.resources.clone(), ClienteFilters::new());
    clientes.delete(id).await?;
    print_written(
        ctx.format,
        &serde_json::json!({ "deleted": true, "id": id }),
        &format!("Customer #{} deleted", id),
    )
}
