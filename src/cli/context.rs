//! Command execution context
//!
//! Loads config, restores the saved session, settles the auth gate and wires
//! the cached client, event bus and clock into a [`ResourceContext`].

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, warn};

use crate::cache::{CacheStore, CachedSaleClient, PersistentStore, SqliteStore, SystemClock};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::{AuthApi, AuthGate, SaleSystemClient};
use crate::config::{Config, Preferences};
use crate::error::{ApiError, Result};
use crate::events::EventBus;
use crate::resources::ResourceContext;

/// Arc-wrapped cached client shared by every command
pub type Client = Arc<CachedSaleClient<SaleSystemClient>>;

/// Everything a command needs once the session is known to be valid
pub struct CommandContext {
    pub config: Config,
    pub client: Client,
    pub resources: ResourceContext,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Load config, restore the session and confirm it with the backend.
    ///
    /// # Errors
    /// Fails when there is no saved session, when it has expired, or when the
    /// backend no longer accepts it.
    pub async fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_at(opts.config_ref())?;
        let cookie = config.validate_session()?.cookie.clone();
        let format = opts.format_or(config.preferences.format.as_deref());

        let base_url = opts.base_url_ref().unwrap_or(&config.base_url).to_string();
        let gate = AuthGate::new();
        let raw_client = SaleSystemClient::new(&base_url, gate.clone())?;
        raw_client.set_session(Some(cookie)).await;

        // Reads stay blocked until the backend has answered this
        match raw_client.check_session().await? {
            Some(user) => debug!("Session valid for {}", user.username),
            None => return Err(ApiError::Unauthorized.into()),
        }

        let store = build_store(&config.preferences, opts.no_cache);
        let client = Arc::new(CachedSaleClient::new(raw_client, store));

        let resources = ResourceContext::new(
            client.clone(),
            gate,
            EventBus::default(),
            Arc::new(SystemClock),
        );

        Ok(Self {
            config,
            client,
            resources,
            format,
        })
    }

    /// Calendar date on this machine
    pub fn today(&self) -> NaiveDate {
        self.resources.clock.today()
    }
}

/// Two-tier store per preferences, or `None` when caching is off.
///
/// A persistent tier that cannot be opened is logged and skipped; the memory
/// tier still works.
pub fn build_store(preferences: &Preferences, no_cache: bool) -> Option<Arc<CacheStore>> {
    if no_cache {
        debug!("Response cache disabled");
        return None;
    }

    let persistent: Option<Box<dyn PersistentStore>> = if preferences.persistent_cache {
        match SqliteStore::open() {
            Ok(store) => Some(Box::new(store)),
            Err(e) => {
                warn!("Persistent cache unavailable, using memory only: {}", e);
                None
            }
        }
    } else {
        None
    };

    let store = Arc::new(
        CacheStore::new(persistent, Arc::new(SystemClock))
            .with_persistent_cap(preferences.persistent_cap),
    );
    store.start_sweeper(Duration::from_secs(preferences.sweep_interval_secs.max(1)));
    Some(store)
}
