//! Cache management commands
//!
//! These work on the persistent tier only; the memory tier lives and dies
//! with each command.

use crate::cache::{Clock, PersistentStore, SqliteStore, SystemClock};
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output::formatters::{format_millis_local, format_size};

/// Show cache status/statistics
pub fn status(format: OutputFormat) -> Result<()> {
    let store = SqliteStore::open()?;
    let stats = store.stats(SystemClock.now_millis())?;
    let path = SqliteStore::cache_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "total_entries": stats.total_entries,
                "valid_entries": stats.valid_entries,
                "expired_entries": stats.expired_entries,
                "total_size_bytes": stats.total_size_bytes,
                "total_size_human": format_size(stats.total_size_bytes),
                "oldest_entry_millis": stats.oldest_entry,
                "newest_entry_millis": stats.newest_entry,
                "path": path,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            println!("Cache Status");
            println!("────────────────────────────────────────");
            println!("Location:       {}", path);
            println!("Valid entries:  {}", stats.valid_entries);
            println!("Expired:        {}", stats.expired_entries);
            println!("Total size:     {}", format_size(stats.total_size_bytes));

            if let Some(oldest) = stats.oldest_entry {
                println!("Oldest entry:   {}", format_millis_local(oldest));
            }
            if let Some(newest) = stats.newest_entry {
                println!("Newest entry:   {}", format_millis_local(newest));
            }
        }
    }

    Ok(())
}

/// Clear all cache entries
pub fn clear(format: OutputFormat) -> Result<()> {
    let removed = SqliteStore::open()?.clear()?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "entries_removed": removed,
                "success": true,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            if removed > 0 {
                println!("Cleared {} cache entries", removed);
            } else {
                println!("Cache was already empty");
            }
        }
    }

    Ok(())
}

/// Print the cache directory
pub fn path() -> Result<()> {
    println!("{}", SqliteStore::cache_dir()?.display());
    Ok(())
}
