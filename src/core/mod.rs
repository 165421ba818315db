pub mod cart_store;

pub use crate::domain::model::{
    CartOutcome, CatalogProduct, Product, ProductId, Stock, UpdateProductAmount,
};
pub use crate::domain::ports::{CatalogClient, ConfigProvider, NotificationSink, PersistenceStore};
pub use crate::utils::error::Result;
