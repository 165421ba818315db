use crate::domain::model::{CatalogProduct, ProductId, Stock};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Remote product and stock lookups.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn product(&self, product_id: ProductId) -> Result<CatalogProduct>;
    async fn stock(&self, product_id: ProductId) -> Result<Stock>;
}

/// Synchronous key-value storage holding serialized carts.
pub trait PersistenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Fire-and-forget display of user-facing messages.
pub trait NotificationSink: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

pub trait ConfigProvider: Send + Sync {
    fn catalog_endpoint(&self) -> &str;
    fn storage_path(&self) -> &str;
    fn storage_key(&self) -> &str;
    fn request_timeout(&self) -> Option<std::time::Duration>;
}
