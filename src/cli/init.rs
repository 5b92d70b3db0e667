//! Login and logout

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};
use log::{debug, warn};

use crate::cache::{PersistentStore, SqliteStore};
use crate::cli::args::GlobalOptions;
use crate::client::models::Credentials;
use crate::client::{AuthApi, AuthGate, SaleSystemClient};
use crate::config::{Config, Session};
use crate::error::Result;

/// Prompt for credentials, log in and save the session
pub async fn run(
    opts: &GlobalOptions,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let mut config = Config::load_or_default(opts.config_ref())?;
    let theme = ColorfulTheme::default();

    println!("{}", "Welcome to SaleSystem!".bold().green());

    let base_url = match opts.base_url_ref() {
        Some(url) => url.to_string(),
        None => Input::with_theme(&theme)
            .with_prompt("Backend URL")
            .default(config.base_url.clone())
            .interact_text()?,
    };

    let username = match username {
        Some(name) => name,
        None => {
            let mut prompt = Input::<String>::with_theme(&theme).with_prompt("Username");
            if let Some(last) = &config.username {
                prompt = prompt.default(last.clone());
            }
            prompt.interact_text()?
        }
    };

    let password = match password {
        Some(password) => password,
        None => Password::with_theme(&theme)
            .with_prompt("Password")
            .interact()?,
    };

    println!("\n{}", "Logging in...".cyan());
    let client = SaleSystemClient::new(&base_url, AuthGate::new())?;
    let session = client
        .login(&Credentials {
            username: username.clone(),
            password,
        })
        .await?;

    let display_name = session
        .user
        .as_ref()
        .and_then(|u| u.nombre.clone())
        .unwrap_or_else(|| username.clone());
    println!("{} Logged in as {}", "✓".green(), display_name.bold());

    // Another user's cached responses must not leak into this session
    if config.username.as_deref().is_some_and(|last| last != username) {
        clear_persistent_cache();
    }

    config.base_url = base_url;
    config.username = Some(username);
    config.session = Some(Session {
        cookie: session.cookie,
        expires_at: session.expires_at,
    });
    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Today's summary", "salesystem dashboard".cyan());
    println!("  {} - Today's invoices", "salesystem facturas list --hoy".cyan());

    Ok(())
}

/// End the backend session, forget it locally and drop cached responses
pub async fn logout(opts: &GlobalOptions) -> Result<()> {
    let mut config = match Config::load_at(opts.config_ref()) {
        Ok(config) => config,
        Err(crate::error::Error::Config(crate::error::ConfigError::NotFound)) => {
            eprintln!("Not logged in.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if let Ok(session) = config.validate_session() {
        let base_url = opts.base_url_ref().unwrap_or(&config.base_url);
        let client = SaleSystemClient::new(base_url, AuthGate::new())?;
        client.set_session(Some(session.cookie.clone())).await;
        // The local session is dropped either way
        if let Err(e) = client.logout().await {
            warn!("Backend logout failed: {}", e);
        }
    }

    config.session = None;
    config.save_at(opts.config_ref())?;
    clear_persistent_cache();

    println!("{} Logged out", "✓".green());
    Ok(())
}

fn clear_persistent_cache() {
    match SqliteStore::open().and_then(|store| store.clear()) {
        Ok(removed) => debug!("Cleared {} persistent cache entries", removed),
        Err(e) => debug!("Persistent cache not cleared: {}", e),
    }
}
