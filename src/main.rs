//! SaleSystem CLI - cached command line companion for the SaleSystem backend

use clap::{CommandFactory, Parser};

use salesystem::cli::args::GlobalOptions;
use salesystem::cli::{self, CacheCommands, Cli, Commands};
use salesystem::error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// `warn` by default, crate debug output with `--debug`; `RUST_LOG` wins.
fn init_logging(debug: bool) {
    let default_filter = if debug { "warn,salesystem=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);
    let format = opts.format.unwrap_or_default();

    match cli.command {
        Commands::Init { username, password } => cli::init::run(&opts, username, password).await,
        Commands::Logout => cli::init::logout(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("salesystem version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Dashboard { watch } => cli::dashboard::run(&opts, watch).await,
        Commands::Clientes(command) => cli::clientes::run(&opts, command).await,
        Commands::Productos(command) => cli::productos::run(&opts, command).await,
        Commands::Facturas(command) => cli::facturas::run(&opts, command).await,
        Commands::Notificaciones(command) => cli::notificaciones::run(&opts, command).await,
        Commands::Cache(command) => match command {
            CacheCommands::Status => cli::cache::status(format),
            CacheCommands::Clear => cli::cache::clear(format),
            CacheCommands::Path => cli::cache::path(),
        },
        Commands::Completion { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "salesystem", &mut std::io::stdout());
            Ok(())
        }
    }
}
