//! UI-facing wrapper around [`CartStore`].
//!
//! The store reports what happened as a [`CartOutcome`] or a [`CartError`];
//! the provider turns that into the user-visible message and hands it to a
//! [`NotificationSink`]. No error leaves the provider.
//!
//! [`CartError`]: crate::utils::error::CartError

use crate::core::cart_store::CartStore;
use crate::core::{
    CartOutcome, CatalogClient, NotificationSink, PersistenceStore, Product, ProductId,
    UpdateProductAmount,
};
use crate::utils::error::Result;
use tokio::sync::watch;

pub const ADD_SUCCESS: &str = "Produto adicionado com sucesso!";
pub const ADD_FAILED: &str = "Erro na adição do produto";
pub const REMOVE_SUCCESS: &str = "Produto removido com sucesso!";
pub const REMOVE_FAILED: &str = "Erro na remoção do produto";
pub const OUT_OF_STOCK: &str = "Quantidade solicitada fora de estoque";
pub const UPDATE_FAILED: &str = "Erro na alteração de quantidade do produto";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Success(&'static str),
    Error(&'static str),
}

impl Notification {
    pub fn message(&self) -> &'static str {
        match self {
            Notification::Success(message) | Notification::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }
}

/// Which notification, if any, a finished operation produces.
pub fn notification_for(
    operation: CartOperation,
    result: &Result<CartOutcome>,
) -> Option<Notification> {
    use CartOperation::*;

    match (operation, result) {
        (Add, Err(_)) => Some(Notification::Error(ADD_FAILED)),
        (Remove, Err(_)) | (Remove, Ok(CartOutcome::NotFound(_))) => {
            Some(Notification::Error(REMOVE_FAILED))
        }
        (Update, Err(_)) => Some(Notification::Error(UPDATE_FAILED)),
        (_, Ok(CartOutcome::OutOfStock { .. })) => Some(Notification::Error(OUT_OF_STOCK)),
        (_, Ok(CartOutcome::Added(_))) => Some(Notification::Success(ADD_SUCCESS)),
        (_, Ok(CartOutcome::Removed(_))) => Some(Notification::Success(REMOVE_SUCCESS)),
        (_, Ok(_)) => None,
    }
}

pub struct CartProvider<C: CatalogClient, P: PersistenceStore, N: NotificationSink> {
    store: CartStore<C, P>,
    notifier: N,
}

impl<C: CatalogClient, P: PersistenceStore, N: NotificationSink> CartProvider<C, P, N> {
    pub fn new(store: CartStore<C, P>, notifier: N) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &CartStore<C, P> {
        &self.store
    }

    pub fn cart(&self) -> Vec<Product> {
        self.store.cart()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Product>> {
        self.store.subscribe()
    }

    pub async fn add_product(&mut self, product_id: ProductId) -> Option<Notification> {
        // The store bumps existing lines through its update path; report it as one.
        let operation = if self.store.contains(product_id) {
            CartOperation::Update
        } else {
            CartOperation::Add
        };

        let result = self.store.add_product(product_id).await;
        self.dispatch(operation, result)
    }

    pub fn remove_product(&mut self, product_id: ProductId) -> Option<Notification> {
        let result = self.store.remove_product(product_id);
        self.dispatch(CartOperation::Remove, result)
    }

    pub async fn update_product_amount(
        &mut self,
        request: UpdateProductAmount,
    ) -> Option<Notification> {
        let result = self.store.update_product_amount(request).await;
        self.dispatch(CartOperation::Update, result)
    }

    fn dispatch(
        &self,
        operation: CartOperation,
        result: Result<CartOutcome>,
    ) -> Option<Notification> {
        match &result {
            Ok(outcome) => tracing::debug!("{:?} finished with {:?}", operation, outcome),
            Err(e) => tracing::warn!("{:?} failed: {}", operation, e),
        }

        let notification = notification_for(operation, &result)?;
        if notification.is_error() {
            self.notifier.error(notification.message());
        } else {
            self.notifier.success(notification.message());
        }
        Some(notification)
    }
}
