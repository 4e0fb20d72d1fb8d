//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use shelf_data::HttpCatalogClient;
use shelf_shop::ShopController;

use crate::config::{ShelfConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: ShelfConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                (ShelfConfig::load(&path)?, Some(path))
            }
            None => match find_config(&cwd) {
                Some(path) => (ShelfConfig::load(&path)?, Some(path)),
                None => (ShelfConfig::default(), None),
            },
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// HTTP client for the configured API.
    pub fn client(&self) -> Result<HttpCatalogClient> {
        let api = &self.config.api;
        HttpCatalogClient::with_config(&api.base_url, &api.search_path, api.timeouts())
            .with_context(|| format!("Invalid API base URL: {}", api.base_url))
    }

    /// Shop controller backed by the configured API.
    pub fn shop(&self) -> Result<ShopController<HttpCatalogClient>> {
        let client = Arc::new(self.client()?);
        Ok(ShopController::new(client).with_price_policy(self.config.shop.price_policy()))
    }
}

/// Find a config file in `start` or any parent directory.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
