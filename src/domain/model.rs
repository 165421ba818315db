use serde::{Deserialize, Serialize};

pub type ProductId = u64;

/// Product as returned by the catalog, before it lands in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub image_url: String,
}

/// A cart line. `amount` is the quantity held in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub image_url: String,
    pub amount: i64,
}

impl Product {
    pub fn from_catalog(product: CatalogProduct, amount: i64) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            image_url: product.image_url,
            amount,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.price * self.amount as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Result of a cart mutation that reached a decision.
///
/// Transport and persistence failures are reported through `Err` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    Added(ProductId),
    Updated { product_id: ProductId, amount: i64 },
    Removed(ProductId),
    /// Non-positive amount; nothing was fetched or written.
    Ignored,
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },
    NotFound(ProductId),
}
