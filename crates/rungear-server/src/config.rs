//! Server configuration.
//!
//! Values come from a TOML or JSON file, then `RUNGEAR_*` environment
//! variables, then command-line flags, each layer overriding the last.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rungear_auth::SessionConfig;
use rungear_commerce::catalog::{BrandFacet, CatalogFacets, DEFAULT_MAX_PRICE_MAJOR};
use rungear_commerce::gateway::QuantityFloor;
use rungear_commerce::money::{Currency, Money};
use serde::{Deserialize, Serialize};

use crate::logging::{LogFormat, LoggingConfig};

/// Server configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener and session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,
    pub session_ttl_secs: u64,
    /// How long an order confirmation can be fetched after placement.
    pub confirmation_ttl_secs: u64,
    /// How often expired sessions and confirmations are dropped.
    pub sweep_interval_secs: u64,
    pub secure_cookies: bool,
    /// Require anti-forgery tokens on form posts.
    pub csrf_enabled: bool,
    /// Member assigned to new sessions; unset browses as the guest member.
    pub default_member_id: Option<i64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            session_ttl_secs: 7 * 24 * 60 * 60,
            confirmation_ttl_secs: 300,
            sweep_interval_secs: 60,
            secure_cookies: false,
            csrf_enabled: true,
            default_member_id: None,
        }
    }
}

/// Which gateway backs the shop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process store, lost on restart.
    #[default]
    Memory,
    /// SQLite database file.
    Sqlite,
}

impl Backend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Backend::Memory),
            "sqlite" => Some(Backend::Sqlite),
            _ => None,
        }
    }
}

/// Data store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: Backend,
    /// SQLite database path.
    pub database: PathBuf,
    /// What a decrement below one does to a cart line.
    pub quantity_floor: QuantityFloor,
    /// Load demo products and promo codes on startup.
    pub seed_demo_data: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            database: PathBuf::from("rungear.db"),
            quantity_floor: QuantityFloor::default(),
            seed_demo_data: true,
        }
    }
}

/// Shop page facets and filter defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub category_title: String,
    pub categories: Vec<String>,
    pub brands: Vec<BrandFacet>,
    /// Price ceiling when the request names none, in pesos.
    pub default_max_price: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let facets = CatalogFacets::default();
        Self {
            category_title: facets.category_title,
            categories: facets.categories,
            brands: facets.brands,
            default_max_price: DEFAULT_MAX_PRICE_MAJOR,
        }
    }
}

impl CatalogConfig {
    pub fn facets(&self) -> CatalogFacets {
        CatalogFacets {
            category_title: self.category_title.clone(),
            categories: self.categories.clone(),
            brands: self.brands.clone(),
        }
    }

    pub fn default_max_price(&self) -> Money {
        Money::from_major(self.default_max_price, Currency::PHP)
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub database: Option<PathBuf>,
    pub backend: Option<Backend>,
    pub json_logs: bool,
}

impl ShopConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Apply `RUNGEAR_*` variables from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `RUNGEAR_*` variables read through `lookup`.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(bind) = lookup("RUNGEAR_BIND") {
            self.server.bind = bind;
        }
        if let Some(database) = lookup("RUNGEAR_DATABASE") {
            self.store.database = PathBuf::from(database);
        }
        if let Some(raw) = lookup("RUNGEAR_BACKEND") {
            match Backend::parse(&raw) {
                Some(backend) => self.store.backend = backend,
                None => bail!("RUNGEAR_BACKEND must be `memory` or `sqlite`, got `{}`", raw),
            }
        }
        if let Some(raw) = lookup("RUNGEAR_LOG_FORMAT") {
            match LogFormat::parse(&raw) {
                Some(format) => self.logging.format = format,
                None => bail!("RUNGEAR_LOG_FORMAT must be `json` or `human`, got `{}`", raw),
            }
        }
        Ok(())
    }

    /// Apply command-line flags.
    pub fn apply_cli(&mut self, overrides: CliOverrides) {
        if let Some(bind) = overrides.bind {
            self.server.bind = bind;
        }
        if let Some(database) = overrides.database {
            self.store.database = database;
        }
        if let Some(backend) = overrides.backend {
            self.store.backend = backend;
        }
        if overrides.json_logs {
            self.logging.format = LogFormat::Json;
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            ttl: Duration::from_secs(self.server.session_ttl_secs),
            secure_cookie: self.server.secure_cookies,
            csrf_enabled: self.server.csrf_enabled,
            default_member_id: self.server.default_member_id,
            ..SessionConfig::default()
        }
    }

    pub fn confirmation_ttl(&self) -> Duration {
        Duration::from_secs(self.server.confirmation_ttl_secs)
    }

    /// Sweep period; zero disables the periodic sweep.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.server.sweep_interval_secs > 0)
            .then(|| Duration::from_secs(self.server.sweep_interval_secs))
    }
}
