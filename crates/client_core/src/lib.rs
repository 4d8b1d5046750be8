use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Product, ProductId},
    protocol::ProductPayload,
};
use tracing::debug;

mod controller;

pub use controller::{DashboardEvent, DashboardState, ProductListController};

/// The four calls the dashboard makes against the product collection.
///
/// Any non-2xx status or transport failure is an `Err`; callers do not
/// branch on the cause.
#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn create_product(&self, payload: &ProductPayload) -> Result<Product>;
    async fn update_product(&self, id: ProductId, payload: &ProductPayload) -> Result<()>;
    async fn delete_product(&self, id: ProductId) -> Result<()>;
}

#[async_trait]
impl<T: ProductApi + ?Sized> ProductApi for std::sync::Arc<T> {
    async fn list_products(&self) -> Result<Vec<Product>> {
        (**self).list_products().await
    }

    async fn create_product(&self, payload: &ProductPayload) -> Result<Product> {
        (**self).create_product(payload).await
    }

    async fn update_product(&self, id: ProductId, payload: &ProductPayload) -> Result<()> {
        (**self).update_product(id, payload).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        (**self).delete_product(id).await
    }
}

/// `ProductApi` over HTTP/JSON rooted at a collection URL such as
/// `http://localhost:8001/api/products`.
#[derive(Debug, Clone)]
pub struct HttpProductApi {
    http: Client,
    base_url: String,
}

impl HttpProductApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: ProductId) -> String {
        format!("{}/{}", self.base_url, id.0)
    }
}

#[async_trait]
impl ProductApi for HttpProductApi {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let products: Vec<Product> = self
            .http
            .get(&self.base_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("product list body is not a JSON product array")?;
        debug!(count = products.len(), "products: list fetched");
        Ok(products)
    }

    async fn create_product(&self, payload: &ProductPayload) -> Result<Product> {
        let product: Product = self
            .http
            .post(&self.base_url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("created product body is not a JSON product")?;
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, payload: &ProductPayload) -> Result<()> {
        self.http
            .put(self.item_url(id))
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.http
            .delete(self.item_url(id))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
