use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned product identifier. Never minted on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
}

/// Unsaved form fields. `price` stays as typed until submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftInput {
    pub name: String,
    pub price: String,
}

impl DraftInput {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
        }
    }

    /// Draft prefilled from an existing product, as the edit action does.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.to_string(),
        }
    }

    pub fn has_required_fields(&self) -> bool {
        !self.name.is_empty() && !self.price.is_empty()
    }

    /// Parses the price the way submit does: surrounding whitespace is
    /// ignored and only finite numbers are accepted.
    pub fn parsed_price(&self) -> Option<f64> {
        self.price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.price.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Update(ProductId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_deserializes_from_backend_shape() {
        let product: Product =
            serde_json::from_str(r#"{"id":4,"name":"Monitor","price":300.0}"#).expect("product");
        assert_eq!(product.id, ProductId(4));
        assert_eq!(product.name, "Monitor");
        assert_eq!(product.price, 300.0);
    }

    #[test]
    fn draft_from_product_uses_shortest_price_text() {
        let product = Product {
            id: ProductId(1),
            name: "Mouse".into(),
            price: 25.5,
        };
        assert_eq!(DraftInput::from_product(&product), DraftInput::new("Mouse", "25.5"));

        let round = Product {
            price: 300.0,
            ..product
        };
        assert_eq!(DraftInput::from_product(&round).price, "300");
    }

    #[test]
    fn required_fields_are_presence_checks_only() {
        assert!(DraftInput::new("Widget", "9.99").has_required_fields());
        assert!(!DraftInput::new("", "5").has_required_fields());
        assert!(!DraftInput::new("Widget", "").has_required_fields());
        // Presence only: unparsable prices still pass the gate.
        assert!(DraftInput::new("Widget", "abc").has_required_fields());
    }

    #[test]
    fn parsed_price_rejects_garbage_and_non_finite_values() {
        assert_eq!(DraftInput::new("a", " 9.99 ").parsed_price(), Some(9.99));
        assert_eq!(DraftInput::new("a", "abc").parsed_price(), None);
        assert_eq!(DraftInput::new("a", "inf").parsed_price(), None);
        assert_eq!(DraftInput::new("a", "NaN").parsed_price(), None);
    }
}
