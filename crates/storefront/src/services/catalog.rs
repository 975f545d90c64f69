//! Catalog lookups.

use std::sync::Arc;

use cartwright_core::ProductId;

use super::ShopError;
use crate::db::{CatalogStore, Stores};
use crate::models::Product;

/// Read-only access to products.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogStore>,
}

impl CatalogService {
    #[must_use]
    pub fn new(stores: &Stores) -> Self {
        Self {
            catalog: Arc::clone(&stores.catalog),
        }
    }

    /// Look up one product.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::StoreUnavailable` if the store fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, ShopError> {
        Ok(self.catalog.product(id).await?)
    }

    /// Products in `category`. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidInput` for a blank category.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, ShopError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(ShopError::InvalidInput("category must not be empty".to_owned()));
        }
        Ok(self.catalog.products_by_category(category).await?)
    }

    /// Every product.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::StoreUnavailable` if the store fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, ShopError> {
        Ok(self.catalog.all_products().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;

    #[tokio::test]
    async fn test_list_by_category() {
        let fx = Fixture::new().await;
        let catalog = CatalogService::new(&fx.stores);

        let tools = catalog.list_by_category("tools").await.unwrap();
        let names: Vec<&str> = tools.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Gadget", "Widget"]);

        let kitchen = catalog.list_by_category(" kitchen ").await.unwrap();
        assert_eq!(kitchen.len(), 1);
        assert_eq!(kitchen.first().map(|p| p.id), Some(fx.mug.id));

        assert!(catalog.list_by_category("garden").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_category_is_invalid() {
        let fx = Fixture::new().await;
        let catalog = CatalogService::new(&fx.stores);

        for category in ["", "   "] {
            let err = catalog.list_by_category(category).await.unwrap_err();
            assert!(matches!(err, ShopError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn test_get_and_list_all() {
        let fx = Fixture::new().await;
        let catalog = CatalogService::new(&fx.stores);

        assert_eq!(catalog.list_all().await.unwrap().len(), 3);
        assert_eq!(
            catalog.get_product(fx.widget.id).await.unwrap(),
            Some(fx.widget.clone())
        );
        assert_eq!(catalog.get_product(ProductId::new(0)).await.unwrap(), None);
    }
}
