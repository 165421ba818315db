pub mod cart_provider;

pub use cart_provider::{notification_for, CartOperation, CartProvider, Notification};
