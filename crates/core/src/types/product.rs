//! Catalog product snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A product as supplied by the catalog.
///
/// Cart line items and wishlist entries hold a copy taken at add time; later
/// catalog changes do not reach products already added. Only `id`, `name`,
/// and `price` are required when decoding, so older or sparser records still
/// load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Price before discount, if the catalog lists one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub category: String,
    /// Image URL or asset reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Review count.
    #[serde(default)]
    pub reviews: u32,
    /// Discount percentage, 0-100.
    #[serde(default)]
    pub discount: u8,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl Product {
    /// Create a product with only the required attributes.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            original_price: None,
            category: String::new(),
            image: None,
            rating: None,
            reviews: 0,
            discount: 0,
            features: Vec::new(),
            description: String::new(),
        }
    }

    #[must_use]
    pub const fn with_original_price(mut self, original_price: Decimal) -> Self {
        self.original_price = Some(original_price);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Whether the listed original price is above the current price.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.original_price.is_some_and(|original| original > self.price)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_catalog_record() {
        let json = r#"{
            "id": 7,
            "name": "Wireless Headphones",
            "price": 79.99,
            "originalPrice": 129.99,
            "category": "Electronics",
            "image": "https://cdn.shop.test/headphones.jpg",
            "rating": 4.5,
            "reviews": 128,
            "discount": 38,
            "features": ["Noise cancelling", "30h battery"],
            "description": "Over-ear headphones."
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(7));
        assert_eq!(product.price, Decimal::new(7999, 2));
        assert_eq!(product.original_price, Some(Decimal::new(12999, 2)));
        assert_eq!(product.features.len(), 2);
        assert!(product.is_discounted());
    }

    #[test]
    fn test_decodes_sparse_record() {
        let product: Product =
            serde_json::from_str(r#"{"id": 1, "name": "Mug", "price": "12.50"}"#).unwrap();
        assert_eq!(product, Product::new(ProductId::new(1), "Mug", Decimal::new(1250, 2)));
        assert!(!product.is_discounted());
    }

    #[test]
    fn test_builder() {
        let product = Product::new(ProductId::new(3), "Lamp", Decimal::new(30, 0))
            .with_original_price(Decimal::new(25, 0))
            .with_category("Home")
            .with_image("lamp.png");
        assert_eq!(product.category, "Home");
        assert_eq!(product.image.as_deref(), Some("lamp.png"));
        assert!(!product.is_discounted());
    }
}
