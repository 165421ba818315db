use crate::core::{CatalogClient, CatalogProduct, ConfigProvider, ProductId, Stock};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Catalog client speaking the storefront REST API
/// (`GET /products/{id}`, `GET /stock/{id}`).
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    endpoint: String,
}

impl HttpCatalogClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: normalize_endpoint(endpoint.into()),
        }
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: normalize_endpoint(endpoint.into()),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::with_timeout(config.catalog_endpoint(), config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.endpoint, path);
        tracing::debug!("Making catalog request to: {}", url);

        let response = self.client.get(&url).send().await?;
        tracing::debug!("Catalog response status: {}", response.status());

        let body = response.error_for_status()?.json::<T>().await?;
        Ok(body)
    }
}

fn normalize_endpoint(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn product(&self, product_id: ProductId) -> Result<CatalogProduct> {
        self.get_json(&format!("/products/{}", product_id)).await
    }

    async fn stock(&self, product_id: ProductId) -> Result<Stock> {
        self.get_json(&format!("/stock/{}", product_id)).await
    }
}
