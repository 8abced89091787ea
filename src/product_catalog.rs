//! # Product Catalog Module
//!
//! The catalog is a read-only external collaborator: given a text query it
//! returns a ranked list of priced products. The engine consumes it through
//! the [`CatalogAccessor`] trait and never caches or dedupes results.
//!
//! Two accessors are provided: [`HttpCatalog`] for the real backend
//! (`GET /api/products?q=…`) and [`InMemoryCatalog`] for the CLI front end
//! and tests, loadable from a JSON file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::measurement_units::Unit;

/// A catalog product, priced per one of its base unit.
///
/// This is the only wire-relevant shape the engine shares with the backend;
/// `pricePerUnit` must round-trip as a JSON number, never a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier
    pub id: String,
    /// Display name (e.g. "Azúcar refinada")
    pub name: String,
    /// The unit the price is denominated in
    pub unit: Unit,
    /// Price for one base unit of the product
    #[serde(rename = "pricePerUnit")]
    pub price_per_unit: f64,
    /// Whether the product was added by the user rather than the seed catalog
    #[serde(rename = "userCustom", default)]
    pub user_custom: bool,
}

/// Async lookup into the product catalog.
///
/// Contract: an empty or whitespace-only term resolves to an empty list
/// without performing a lookup; a non-empty term may return zero or more
/// matches in server-relevance order.
pub trait CatalogAccessor {
    /// Query the catalog for products matching `term`.
    fn query_products(
        &self,
        term: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Product>>> + Send;
}

/// Catalog accessor backed by the backend HTTP API.
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCatalog {
    /// Create an accessor for the API at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Attach a bearer token to every catalog request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl CatalogAccessor for HttpCatalog {
    async fn query_products(&self, term: &str) -> Result<Vec<Product>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/products", self.base_url);
        let mut request = self.client.get(&url).query(&[("q", term)]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let products = request
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .context("catalog request failed")?
            .json::<Vec<Product>>()
            .await
            .context("catalog response was not a product list")?;

        log::debug!("catalog query {:?} returned {} products", term, products.len());
        Ok(products)
    }
}

/// Catalog accessor over an in-memory product list.
///
/// Matching is case- and accent-insensitive substring search, with
/// prefix matches ranked ahead of interior matches.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    /// Create a catalog over the given products.
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Load a catalog from a JSON file holding an array of products.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog file {}", path.display()))?;
        let products: Vec<Product> = serde_json::from_str(&content)
            .with_context(|| format!("invalid catalog JSON in {}", path.display()))?;
        log::info!("loaded {} products from {}", products.len(), path.display());
        Ok(Self::new(products))
    }

    /// Register a user-defined product alongside the seed catalog.
    pub fn add_custom_product(&mut self, mut product: Product) {
        product.user_custom = true;
        self.products.push(product);
    }

    /// Number of products in the catalog.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl CatalogAccessor for InMemoryCatalog {
    async fn query_products(&self, term: &str) -> Result<Vec<Product>> {
        let term = normalize(term.trim());
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let mut prefix_matches = Vec::new();
        let mut interior_matches = Vec::new();
        for product in &self.products {
            let name = normalize(&product.name);
            if name.starts_with(&term) {
                prefix_matches.push(product.clone());
            } else if name.contains(&term) {
                interior_matches.push(product.clone());
            }
        }
        prefix_matches.extend(interior_matches);
        Ok(prefix_matches)
    }
}

/// Lowercase and strip the Spanish diacritics the catalog names carry.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_products() -> Vec<Product> {
        vec![
            Product {
                id: "p1".to_string(),
                name: "Azúcar refinada".to_string(),
                unit: Unit::Kilogram,
                price_per_unit: 40.0,
                user_custom: false,
            },
            Product {
                id: "p2".to_string(),
                name: "Leche entera".to_string(),
                unit: Unit::Liter,
                price_per_unit: 25.0,
                user_custom: false,
            },
            Product {
                id: "p3".to_string(),
                name: "Flor de azúcar".to_string(),
                unit: Unit::Piece,
                price_per_unit: 8.0,
                user_custom: false,
            },
        ]
    }

    #[tokio::test]
    async fn test_empty_term_yields_empty_without_lookup() {
        let catalog = InMemoryCatalog::new(sample_products());
        assert!(catalog.query_products("").await.unwrap().is_empty());
        assert!(catalog.query_products("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_accent_insensitive_matching() {
        let catalog = InMemoryCatalog::new(sample_products());
        let results = catalog.query_products("azucar").await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_prefix_matches_rank_first() {
        let catalog = InMemoryCatalog::new(sample_products());
        let results = catalog.query_products("azúcar").await.unwrap();
        assert_eq!(results[0].id, "p1"); // prefix match before interior match
        assert_eq!(results[1].id, "p3");
    }

    #[tokio::test]
    async fn test_no_match_returns_empty() {
        let catalog = InMemoryCatalog::new(sample_products());
        assert!(catalog.query_products("chocolate").await.unwrap().is_empty());
    }

    #[test]
    fn test_custom_product_flag_is_forced() {
        let mut catalog = InMemoryCatalog::new(Vec::new());
        catalog.add_custom_product(Product {
            id: "c1".to_string(),
            name: "Relleno casero".to_string(),
            unit: Unit::Flat,
            price_per_unit: 12.0,
            user_custom: false,
        });
        assert_eq!(catalog.len(), 1);
        assert!(catalog.products[0].user_custom);
    }

    #[test]
    fn test_price_per_unit_round_trips_as_number() {
        let json = r#"{"id":"p9","name":"Vainilla","unit":"ml","pricePerUnit":0.85}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price_per_unit, 0.85);
        assert!(!product.user_custom); // defaulted when absent

        let back = serde_json::to_string(&product).unwrap();
        assert!(back.contains("\"pricePerUnit\":0.85"));
        assert!(!back.contains("\"0.85\""));
    }
}
