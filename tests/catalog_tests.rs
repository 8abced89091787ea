//! # Catalog Tests
//!
//! Tests for the catalog boundary: the query contract, the wire shape of
//! products, and loading a file-backed catalog.

use std::io::Write;

use anyhow::Result;
use tempfile::NamedTempFile;

use candycost::measurement_units::Unit;
use candycost::product_catalog::{CatalogAccessor, InMemoryCatalog, Product};

fn write_catalog_file(json: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(json.as_bytes())?;
    Ok(file)
}

#[tokio::test]
async fn test_file_backed_catalog_serves_queries() -> Result<()> {
    let file = write_catalog_file(
        r#"[
            {"id":"p1","name":"Azúcar refinada","unit":"kg","pricePerUnit":40.0,"userCustom":false},
            {"id":"p2","name":"Leche entera","unit":"l","pricePerUnit":25.0,"userCustom":false}
        ]"#,
    )?;

    let catalog = InMemoryCatalog::from_json_file(file.path())?;
    assert_eq!(catalog.len(), 2);

    let results = catalog.query_products("azucar").await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].unit, Unit::Kilogram);
    assert_eq!(results[0].price_per_unit, 40.0);

    Ok(())
}

#[test]
fn test_invalid_catalog_file_is_an_error() -> Result<()> {
    let file = write_catalog_file(r#"{"not":"a list"}"#)?;
    assert!(InMemoryCatalog::from_json_file(file.path()).is_err());
    assert!(InMemoryCatalog::from_json_file("/no/such/catalog.json").is_err());
    Ok(())
}

#[test]
fn test_user_custom_defaults_to_false_on_the_wire() -> Result<()> {
    // userCustom is optional in catalog payloads
    let product: Product = serde_json::from_str(
        r#"{"id":"p1","name":"Glucosa","unit":"kg","pricePerUnit":62.0}"#,
    )?;
    assert!(!product.user_custom);
    Ok(())
}

#[test]
fn test_price_per_unit_stays_numeric() -> Result<()> {
    // A string-coerced price must be rejected, not silently parsed
    let string_price =
        serde_json::from_str::<Product>(r#"{"id":"p1","name":"Glucosa","unit":"kg","pricePerUnit":"62.0"}"#);
    assert!(string_price.is_err());

    let product: Product = serde_json::from_str(
        r#"{"id":"p1","name":"Glucosa","unit":"kg","pricePerUnit":62.0}"#,
    )?;
    let json = serde_json::to_string(&product)?;
    assert!(json.contains("\"pricePerUnit\":62.0"));

    Ok(())
}

#[tokio::test]
async fn test_whitespace_query_short_circuits() -> Result<()> {
    let catalog = InMemoryCatalog::new(vec![Product {
        id: "p1".to_string(),
        name: "Azúcar".to_string(),
        unit: Unit::Kilogram,
        price_per_unit: 40.0,
        user_custom: false,
    }]);

    assert!(catalog.query_products("").await?.is_empty());
    assert!(catalog.query_products(" \t ").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_custom_products_are_searchable() -> Result<()> {
    let mut catalog = InMemoryCatalog::default();
    catalog.add_custom_product(Product {
        id: "c1".to_string(),
        name: "Relleno de la casa".to_string(),
        unit: Unit::Flat,
        price_per_unit: 18.0,
        user_custom: false, // forced to true on registration
    });

    let results = catalog.query_products("relleno").await?;
    assert_eq!(results.len(), 1);
    assert!(results[0].user_custom);
    Ok(())
}
