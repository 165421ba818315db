// Adapters layer: concrete implementations of the cart ports (http catalog, storage, notifications).

pub mod http;
pub mod notify;
pub mod storage;

pub use http::HttpCatalogClient;
pub use notify::{ConsoleNotifier, TracingNotifier};
pub use storage::{FileStore, MemoryStore};
