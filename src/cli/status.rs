//! Status command implementation

use colored::Colorize;

use crate::cache::{Clock, PersistentStore, SqliteStore, SystemClock};
use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::Result;

/// Show configuration, session and cache status without touching the network
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "SaleSystem Status".bold());

    let config = match Config::load_at(opts.config_ref()) {
        Ok(config) => config,
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!("Run {} to log in.", "salesystem init".cyan());
            println!();
            return Ok(());
        }
    };

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!("Config file: {}", config_path.display().to_string().cyan());
    let base_url = opts.base_url_ref().unwrap_or(&config.base_url);
    println!("Backend:     {}", base_url.cyan());
    println!();

    match &config.username {
        Some(user) => println!("{} User: {}", "✓".green(), user),
        None => println!("{} No user configured", "○".dimmed()),
    }

    match &config.session {
        Some(session) if !config.is_session_expired() => {
            let remaining = session.expires_at.signed_duration_since(chrono::Utc::now());
            println!(
                "{} Session valid (expires in {}h {}m)",
                "✓".green(),
                remaining.num_hours(),
                remaining.num_minutes() % 60
            );
        }
        Some(_) => {
            println!("{} Session expired", "⚠".yellow());
            println!("  → Run 'salesystem init' to log in again");
        }
        None => {
            println!("{} Not logged in", "✗".red());
            println!("  → Run 'salesystem init' to log in");
        }
    }

    let prefs = &config.preferences;
    if opts.no_cache {
        println!("{} Response cache bypassed (--no-cache)", "○".dimmed());
    } else if !prefs.persistent_cache {
        println!("{} Persistent cache off, memory only", "○".dimmed());
    } else {
        match SqliteStore::open().and_then(|s| s.stats(SystemClock.now_millis())) {
            Ok(stats) => println!(
                "{} Persistent cache: {} valid / {} max entries",
                "✓".green(),
                stats.valid_entries,
                prefs.persistent_cap
            ),
            Err(e) => println!("{} Persistent cache unavailable: {}", "⚠".yellow(), e),
        }
    }

    println!();
    Ok(())
}
