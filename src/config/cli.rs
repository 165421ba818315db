use super::MAX_TIMEOUT_SECONDS;
use crate::core::cart_store::CART_STORAGE_KEY;
use crate::core::{ConfigProvider, ProductId};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "cart-store")]
#[command(about = "Shopping cart backed by a storefront catalog and local storage")]
pub struct CliConfig {
    #[arg(long, default_value = "http://localhost:3333")]
    pub catalog_endpoint: String,

    #[arg(long, default_value = "./.cart/storage.json")]
    pub storage_path: String,

    #[arg(long, default_value = CART_STORAGE_KEY)]
    pub storage_key: String,

    #[arg(long, help = "Catalog request timeout; no timeout when omitted")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "TOML configuration file, replaces the catalog and storage flags")]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Subcommand)]
pub enum CartCommand {
    /// Print the cart
    Show,
    /// Add a product, or bump its amount when it is already in the cart
    Add { product_id: ProductId },
    /// Remove a product from the cart
    Remove { product_id: ProductId },
    /// Set the amount of a product already in the cart
    Update {
        product_id: ProductId,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

impl ConfigProvider for CliConfig {
    fn catalog_endpoint(&self) -> &str {
        &self.catalog_endpoint
    }

    fn storage_path(&self) -> &str {
        &self.storage_path
    }

    fn storage_key(&self) -> &str {
        &self.storage_key
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("catalog_endpoint", &self.catalog_endpoint)?;
        validate_path("storage_path", &self.storage_path)?;
        validate_non_empty_string("storage_key", &self.storage_key)?;
        if let Some(timeout) = self.timeout_seconds {
            validate_range("timeout_seconds", timeout, 1, MAX_TIMEOUT_SECONDS)?;
        }
        Ok(())
    }
}
