use crate::core::{
    CartOutcome, CatalogClient, PersistenceStore, Product, ProductId, UpdateProductAmount,
};
use crate::utils::error::Result;
use std::collections::HashSet;
use tokio::sync::watch;

pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Owns the cart and keeps it mirrored into a [`PersistenceStore`].
///
/// Mutations take `&mut self`, so a store has a single writer. Readers that
/// need to follow changes call [`CartStore::subscribe`]; every committed cart
/// is published on that channel.
pub struct CartStore<C: CatalogClient, P: PersistenceStore> {
    catalog: C,
    storage: P,
    key: String,
    cart: watch::Sender<Vec<Product>>,
}

impl<C: CatalogClient, P: PersistenceStore> CartStore<C, P> {
    pub fn new(catalog: C, storage: P) -> Self {
        Self::with_key(catalog, storage, CART_STORAGE_KEY)
    }

    pub fn with_key(catalog: C, storage: P, key: impl Into<String>) -> Self {
        let key = key.into();
        let initial = load_cart(&storage, &key);
        tracing::debug!("Loaded cart '{}' with {} products", key, initial.len());
        let (cart, _) = watch::channel(initial);

        Self {
            catalog,
            storage,
            key,
            cart,
        }
    }

    pub fn cart(&self) -> Vec<Product> {
        self.cart.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Product>> {
        self.cart.subscribe()
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.cart.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.borrow().is_empty()
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.amount_of(product_id).is_some()
    }

    pub fn amount_of(&self, product_id: ProductId) -> Option<i64> {
        self.cart
            .borrow()
            .iter()
            .find(|product| product.id == product_id)
            .map(|product| product.amount)
    }

    pub fn subtotal(&self, product_id: ProductId) -> Option<f64> {
        self.cart
            .borrow()
            .iter()
            .find(|product| product.id == product_id)
            .map(Product::subtotal)
    }

    pub fn total(&self) -> f64 {
        self.cart.borrow().iter().map(Product::subtotal).sum()
    }

    pub async fn add_product(&mut self, product_id: ProductId) -> Result<CartOutcome> {
        // Existing line: same path as an amount update, stock is re-checked.
        if let Some(amount) = self.amount_of(product_id) {
            let Some(next) = amount.checked_add(1) else {
                tracing::warn!("Product {} is already at the maximum amount", product_id);
                return Ok(CartOutcome::OutOfStock {
                    product_id,
                    requested: amount,
                    available: amount,
                });
            };

            tracing::debug!(
                "Product {} already in cart, bumping amount to {}",
                product_id,
                next
            );
            return self
                .update_product_amount(UpdateProductAmount {
                    product_id,
                    amount: next,
                })
                .await;
        }

        let catalog_product = self.catalog.product(product_id).await?;

        let mut new_cart = self.cart();
        new_cart.push(Product::from_catalog(catalog_product, 1));
        self.commit(new_cart)?;

        tracing::info!("Added product {} to cart", product_id);
        Ok(CartOutcome::Added(product_id))
    }

    pub fn remove_product(&mut self, product_id: ProductId) -> Result<CartOutcome> {
        if !self.contains(product_id) {
            tracing::debug!("Product {} is not in the cart", product_id);
            return Ok(CartOutcome::NotFound(product_id));
        }

        let new_cart: Vec<Product> = self
            .cart()
            .into_iter()
            .filter(|product| product.id != product_id)
            .collect();
        self.commit(new_cart)?;

        tracing::info!("Removed product {} from cart", product_id);
        Ok(CartOutcome::Removed(product_id))
    }

    pub async fn update_product_amount(
        &mut self,
        request: UpdateProductAmount,
    ) -> Result<CartOutcome> {
        let UpdateProductAmount { product_id, amount } = request;

        if amount <= 0 {
            return Ok(CartOutcome::Ignored);
        }

        let stock = self.catalog.stock(product_id).await?;

        if amount > stock.amount {
            tracing::debug!(
                "Requested {} of product {} but only {} in stock",
                amount,
                product_id,
                stock.amount
            );
            return Ok(CartOutcome::OutOfStock {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        if !self.contains(product_id) {
            return Ok(CartOutcome::NotFound(product_id));
        }

        let new_cart: Vec<Product> = self
            .cart()
            .into_iter()
            .map(|product| {
                if product.id == product_id {
                    Product { amount, ..product }
                } else {
                    product
                }
            })
            .collect();
        self.commit(new_cart)?;

        tracing::info!("Set amount of product {} to {}", product_id, amount);
        Ok(CartOutcome::Updated { product_id, amount })
    }

    // Storage first: a failed write must leave the in-memory cart untouched.
    fn commit(&mut self, new_cart: Vec<Product>) -> Result<()> {
        let serialized = serde_json::to_string(&new_cart)?;
        tracing::debug!(
            "Persisting cart '{}' ({} bytes)",
            self.key,
            serialized.len()
        );
        self.storage.set(&self.key, &serialized)?;
        self.cart.send_replace(new_cart);
        Ok(())
    }
}

fn load_cart<P: PersistenceStore>(storage: &P, key: &str) -> Vec<Product> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("Could not read stored cart '{}': {}", key, e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Product>>(&raw) {
        Ok(products) => dedupe_by_id(drop_empty_lines(products)),
        Err(e) => {
            tracing::warn!("Stored cart '{}' is not valid, starting empty: {}", key, e);
            Vec::new()
        }
    }
}

fn drop_empty_lines(products: Vec<Product>) -> Vec<Product> {
    let before = products.len();
    let kept: Vec<Product> = products
        .into_iter()
        .filter(|product| product.amount > 0)
        .collect();

    if kept.len() != before {
        tracing::warn!(
            "Dropped {} products with non-positive amount from stored cart",
            before - kept.len()
        );
    }
    kept
}

fn dedupe_by_id(products: Vec<Product>) -> Vec<Product> {
    let mut seen = HashSet::new();
    let before = products.len();
    let unique: Vec<Product> = products
        .into_iter()
        .filter(|product| seen.insert(product.id))
        .collect();

    if unique.len() != before {
        tracing::warn!(
            "Dropped {} duplicate products from stored cart",
            before - unique.len()
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStore;
    use crate::domain::model::{CatalogProduct, Stock};
    use crate::utils::error::CartError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct MockCatalog {
        products: HashMap<ProductId, CatalogProduct>,
        stock: HashMap<ProductId, i64>,
        calls: Arc<AtomicUsize>,
    }

    impl MockCatalog {
        fn with_product(mut self, id: ProductId, price: f64, stock: i64) -> Self {
            self.products.insert(
                id,
                CatalogProduct {
                    id,
                    name: format!("Tênis {}", id),
                    price,
                    image_url: format!("https://cdn.example.com/{}.jpg", id),
                },
            );
            self.stock.insert(id, stock);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn not_found(what: &str, id: ProductId) -> CartError {
        CartError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} {} not found", what, id),
        ))
    }

    #[async_trait]
    impl CatalogClient for MockCatalog {
        async fn product(&self, product_id: ProductId) -> Result<CatalogProduct> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.products
                .get(&product_id)
                .cloned()
                .ok_or_else(|| not_found("product", product_id))
        }

        async fn stock(&self, product_id: ProductId) -> Result<Stock> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.stock
                .get(&product_id)
                .map(|amount| Stock {
                    id: product_id,
                    amount: *amount,
                })
                .ok_or_else(|| not_found("stock", product_id))
        }
    }

    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    impl PersistenceStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CartError::StorageError {
                message: "quota exceeded".to_string(),
            })
        }
    }

    fn stored_cart(storage: &MemoryStore) -> Vec<Product> {
        let raw = storage.get(CART_STORAGE_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    fn seeded_storage(products: &[(ProductId, i64)]) -> MemoryStore {
        let cart: Vec<Product> = products
            .iter()
            .map(|(id, amount)| Product {
                id: *id,
                name: format!("Tênis {}", id),
                price: 100.0,
                image_url: format!("https://cdn.example.com/{}.jpg", id),
                amount: *amount,
            })
            .collect();
        let storage = MemoryStore::new();
        storage
            .set(CART_STORAGE_KEY, &serde_json::to_string(&cart).unwrap())
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn test_add_new_product_appends_with_amount_one() {
        let catalog = MockCatalog::default()
            .with_product(1, 100.0, 5)
            .with_product(2, 50.0, 5);
        let storage = seeded_storage(&[(1, 1)]);
        let mut store = CartStore::new(catalog, storage.clone());

        let outcome = store.add_product(2).await.unwrap();

        assert_eq!(outcome, CartOutcome::Added(2));
        assert_eq!(store.len(), 2);
        assert_eq!(store.cart()[1].id, 2);
        assert_eq!(store.amount_of(2), Some(1));
        assert_eq!(stored_cart(&storage), store.cart());
    }

    #[tokio::test]
    async fn test_add_existing_product_increments_amount() {
        let catalog = MockCatalog::default().with_product(1, 100.0, 5);
        let storage = seeded_storage(&[(1, 2)]);
        let mut store = CartStore::new(catalog, storage.clone());

        let outcome = store.add_product(1).await.unwrap();

        assert_eq!(
            outcome,
            CartOutcome::Updated {
                product_id: 1,
                amount: 3
            }
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.amount_of(1), Some(3));
        assert_eq!(stored_cart(&storage), store.cart());
    }

    #[tokio::test]
    async fn test_add_existing_product_respects_stock() {
        let catalog = MockCatalog::default().with_product(1, 100.0, 2);
        let mut store = CartStore::new(catalog, seeded_storage(&[(1, 2)]));

        let outcome = store.add_product(1).await.unwrap();

        assert!(matches!(outcome, CartOutcome::OutOfStock { available: 2, .. }));
        assert_eq!(store.amount_of(1), Some(2));
    }

    #[tokio::test]
    async fn test_add_unknown_product_leaves_cart_unchanged() {
        let catalog = MockCatalog::default();
        let storage = MemoryStore::new();
        let mut store = CartStore::new(catalog, storage.clone());

        let result = store.add_product(42).await;

        assert!(result.is_err());
        assert!(store.is_empty());
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_amount_within_stock() {
        let catalog = MockCatalog::default().with_product(1, 100.0, 5);
        let storage = seeded_storage(&[(1, 2)]);
        let mut store = CartStore::new(catalog, storage.clone());

        let outcome = store
            .update_product_amount(UpdateProductAmount {
                product_id: 1,
                amount: 3,
            })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CartOutcome::Updated {
                product_id: 1,
                amount: 3
            }
        );
        assert_eq!(store.amount_of(1), Some(3));
        assert_eq!(stored_cart(&storage)[0].amount, 3);
    }

    #[tokio::test]
    async fn test_update_amount_above_stock_is_rejected() {
        let catalog = MockCatalog::default().with_product(1, 100.0, 5);
        let storage = seeded_storage(&[(1, 2)]);
        let before = storage.get(CART_STORAGE_KEY).unwrap();
        let mut store = CartStore::new(catalog, storage.clone());

        let outcome = store
            .update_product_amount(UpdateProductAmount {
                product_id: 1,
                amount: 6,
            })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CartOutcome::OutOfStock {
                product_id: 1,
                requested: 6,
                available: 5
            }
        );
        assert_eq!(store.amount_of(1), Some(2));
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_non_positive_amount_is_ignored_without_fetching() {
        let catalog = MockCatalog::default().with_product(1, 100.0, 5);
        let storage = seeded_storage(&[(1, 2)]);
        let before = storage.get(CART_STORAGE_KEY).unwrap();
        let mut store = CartStore::new(catalog.clone(), storage.clone());

        for amount in [0, -1] {
            let outcome = store
                .update_product_amount(UpdateProductAmount {
                    product_id: 1,
                    amount,
                })
                .await
                .unwrap();
            assert_eq!(outcome, CartOutcome::Ignored);
        }

        assert_eq!(catalog.calls(), 0);
        assert_eq!(store.amount_of(1), Some(2));
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_preserves_order_of_other_products() {
        let catalog = MockCatalog::default().with_product(2, 100.0, 10);
        let mut store = CartStore::new(catalog, seeded_storage(&[(1, 1), (2, 1), (3, 1)]));

        store
            .update_product_amount(UpdateProductAmount {
                product_id: 2,
                amount: 4,
            })
            .await
            .unwrap();

        let ids: Vec<ProductId> = store.cart().iter().map(|p| p.id).collect();
        let amounts: Vec<i64> = store.cart().iter().map(|p| p.amount).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(amounts, vec![1, 4, 1]);
    }

    #[tokio::test]
    async fn test_update_product_not_in_cart_reports_not_found() {
        let catalog = MockCatalog::default().with_product(7, 100.0, 10);
        let storage = MemoryStore::new();
        let mut store = CartStore::new(catalog, storage.clone());

        let outcome = store
            .update_product_amount(UpdateProductAmount {
                product_id: 7,
                amount: 2,
            })
            .await
            .unwrap();

        assert_eq!(outcome, CartOutcome::NotFound(7));
        assert!(store.is_empty());
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_stock_failure_is_an_error() {
        let catalog = MockCatalog::default();
        let mut store = CartStore::new(catalog, seeded_storage(&[(1, 2)]));

        let result = store
            .update_product_amount(UpdateProductAmount {
                product_id: 1,
                amount: 3,
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.amount_of(1), Some(2));
    }

    #[test]
    fn test_remove_present_and_absent_products() {
        let storage = seeded_storage(&[(1, 1), (2, 3)]);
        let mut store = CartStore::new(MockCatalog::default(), storage.clone());

        assert_eq!(store.remove_product(1).unwrap(), CartOutcome::Removed(1));
        assert_eq!(store.len(), 1);
        assert!(!store.contains(1));
        assert_eq!(stored_cart(&storage), store.cart());

        let before = storage.get(CART_STORAGE_KEY).unwrap();
        assert_eq!(store.remove_product(1).unwrap(), CartOutcome::NotFound(1));
        assert_eq!(store.len(), 1);
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_unchanged() {
        let catalog = MockCatalog::default()
            .with_product(1, 100.0, 5)
            .with_product(2, 100.0, 5);
        let storage = ReadOnlyStore {
            inner: seeded_storage(&[(1, 2)]),
        };
        let mut store = CartStore::new(catalog, storage);
        let before = store.cart();

        assert!(store.add_product(2).await.is_err());
        assert!(store.add_product(1).await.is_err());
        assert!(store.remove_product(1).is_err());
        assert_eq!(store.cart(), before);
    }

    #[test]
    fn test_unreadable_storage_starts_empty() {
        let storage = MemoryStore::new();
        storage.set(CART_STORAGE_KEY, "{not json").unwrap();

        let store = CartStore::new(MockCatalog::default(), storage);
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_dropped_on_load() {
        let storage = seeded_storage(&[(1, 1), (2, 1), (1, 5)]);

        let store = CartStore::new(MockCatalog::default(), storage);
        assert_eq!(store.len(), 2);
        assert_eq!(store.amount_of(1), Some(1));
    }

    #[tokio::test]
    async fn test_add_at_maximum_amount_reports_out_of_stock() {
        let catalog = MockCatalog::default().with_product(1, 100.0, i64::MAX);
        let storage = seeded_storage(&[(1, i64::MAX)]);
        let before = storage.get(CART_STORAGE_KEY).unwrap();
        let mut store = CartStore::new(catalog.clone(), storage.clone());

        let outcome = store.add_product(1).await.unwrap();

        assert_eq!(
            outcome,
            CartOutcome::OutOfStock {
                product_id: 1,
                requested: i64::MAX,
                available: i64::MAX
            }
        );
        assert_eq!(catalog.calls(), 0);
        assert_eq!(store.amount_of(1), Some(i64::MAX));
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap(), before);
    }

    #[test]
    fn test_non_positive_amounts_are_dropped_on_load() {
        let storage = seeded_storage(&[(1, 0), (2, 3), (3, -4)]);

        let store = CartStore::new(MockCatalog::default(), storage);
        assert_eq!(store.len(), 1);
        assert_eq!(store.amount_of(2), Some(3));
    }

    #[test]
    fn test_totals() {
        let store = CartStore::new(MockCatalog::default(), seeded_storage(&[(1, 2), (2, 1)]));

        assert_eq!(store.subtotal(1), Some(200.0));
        assert_eq!(store.subtotal(9), None);
        assert_eq!(store.total(), 300.0);
    }

    #[tokio::test]
    async fn test_subscribers_see_committed_carts() {
        let catalog = MockCatalog::default().with_product(1, 100.0, 5);
        let mut store = CartStore::new(catalog, MemoryStore::new());
        let mut receiver = store.subscribe();

        store.add_product(1).await.unwrap();

        assert!(receiver.has_changed().unwrap());
        let seen = receiver.borrow_and_update().clone();
        assert_eq!(seen, store.cart());
    }

    #[tokio::test]
    async fn test_custom_storage_key() {
        let catalog = MockCatalog::default().with_product(1, 100.0, 5);
        let storage = MemoryStore::new();
        let mut store = CartStore::with_key(catalog, storage.clone(), "@shop:cart");

        store.add_product(1).await.unwrap();

        assert_eq!(store.storage_key(), "@shop:cart");
        assert!(storage.get("@shop:cart").unwrap().is_some());
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap(), None);
    }
}
