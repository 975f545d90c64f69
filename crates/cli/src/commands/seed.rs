//! Seed the product catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Widget
//!     category: tools
//!     price: "10.00"
//!     stock_quantity: 25
//!     description: A dependable widget.
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use cartwright_storefront::db::{CatalogStore, create_pool, products::PgCatalogRepository};
use cartwright_storefront::models::NewProduct;

use super::database_url;

/// Top-level layout of a catalog seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<NewProduct>,
}

/// Parse a catalog seed file.
///
/// # Errors
///
/// Returns the YAML error when the document does not match [`CatalogFile`].
pub fn parse_catalog(content: &str) -> Result<CatalogFile, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Collect every problem in the file rather than stopping at the first.
#[must_use]
pub fn validate_catalog(catalog: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();
    for (index, product) in catalog.products.iter().enumerate() {
        let label = if product.name.trim().is_empty() {
            format!("product #{}", index + 1)
        } else {
            format!("'{}'", product.name)
        };
        if product.name.trim().is_empty() {
            errors.push(format!("{label}: name is required"));
        }
        if product.category.trim().is_empty() {
            errors.push(format!("{label}: category is required"));
        }
        if product.price.is_negative() {
            errors.push(format!("{label}: price must not be negative"));
        }
        if product.stock_quantity < 0 {
            errors.push(format!("{label}: stock_quantity must not be negative"));
        }
    }
    errors
}

/// Seed products from a YAML file.
///
/// With `replace`, products matching an existing name and category are
/// updated in place; otherwise every entry is inserted.
///
/// # Errors
///
/// Returns an error if the file cannot be read or validated, or a database
/// operation fails.
pub async fn products(file_path: &str, replace: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    let catalog = parse_catalog(&content)?;

    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }
    info!(products = catalog.products.len(), "Catalog validated");

    let database_url = database_url()?;
    let pool = create_pool(&database_url, 2).await?;
    let repo = PgCatalogRepository::new(pool);

    let mut inserted = 0_usize;
    let mut updated = 0_usize;
    for product in &catalog.products {
        if replace {
            let (_, was_inserted) = repo.upsert_by_name(product).await?;
            if was_inserted {
                inserted += 1;
            } else {
                updated += 1;
            }
        } else {
            repo.insert_product(product).await?;
            inserted += 1;
        }
    }

    info!(inserted, updated, "Seeding complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use cartwright_core::Price;

    use super::*;

    const SAMPLE: &str = r#"
products:
  - name: Widget
    category: tools
    price: "10.00"
    stock_quantity: 25
    description: A dependable widget.
  - name: Mug
    category: kitchen
    price: "7.50"
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = parse_catalog(SAMPLE).unwrap();
        assert_eq!(catalog.products.len(), 2);
        assert_eq!(catalog.products[0].price, Price::from_cents(1000));
        assert_eq!(catalog.products[0].stock_quantity, 25);
        assert_eq!(catalog.products[1].description, None);
        assert_eq!(catalog.products[1].stock_quantity, 0);
        assert!(validate_catalog(&catalog).is_empty());
    }

    #[test]
    fn test_missing_products_key() {
        assert!(parse_catalog("items: []").is_err());
    }

    #[test]
    fn test_validation_reports_every_problem() {
        let catalog = parse_catalog(
            r#"
products:
  - name: ""
    category: tools
    price: "1.00"
  - name: Refund
    category: " "
    price: "-2.00"
    stock_quantity: -1
"#,
        )
        .unwrap();

        let errors = validate_catalog(&catalog);
        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("product #1"));
        assert!(errors.iter().any(|e| e.contains("'Refund': price")));
    }
}
