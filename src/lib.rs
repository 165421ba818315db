pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CartCommand, CliConfig};

pub use adapters::{ConsoleNotifier, FileStore, HttpCatalogClient, MemoryStore, TracingNotifier};
pub use app::{CartProvider, Notification};
pub use config::TomlConfig;
pub use core::cart_store::{CartStore, CART_STORAGE_KEY};
pub use domain::model::{CartOutcome, CatalogProduct, Product, ProductId, Stock, UpdateProductAmount};
pub use utils::error::{CartError, Result};
