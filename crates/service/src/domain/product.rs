use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Catalog record. `id` is assigned by the store; `code` is the business key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub thumbnail: String,
    pub code: String,
    pub stock: u64,
}

/// Unvalidated creation input. Any field may be missing.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
    pub code: Option<String>,
    pub stock: Option<u64>,
}

/// A draft that passed validation; only the id is missing.
#[derive(Clone, Debug, PartialEq)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub thumbnail: String,
    pub code: String,
    pub stock: u64,
}

impl NewProduct {
    pub fn with_id(self, id: u64) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            thumbnail: self.thumbnail,
            code: self.code,
            stock: self.stock,
        }
    }
}

fn present(value: Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> Option<String> {
    let value = value.filter(|s| !s.is_empty());
    if value.is_none() {
        missing.push(name);
    }
    value
}

impl ProductDraft {
    /// Every field must be present and truthy: empty strings, a zero (or NaN)
    /// price and a zero stock all count as missing. A negative price is
    /// rejected separately.
    pub fn validate(self) -> Result<NewProduct, ServiceError> {
        let mut missing = Vec::new();
        let title = present(self.title, "title", &mut missing);
        let description = present(self.description, "description", &mut missing);
        let price = self.price.filter(|p| *p != 0.0 && !p.is_nan());
        if price.is_none() {
            missing.push("price");
        }
        let thumbnail = present(self.thumbnail, "thumbnail", &mut missing);
        let code = present(self.code, "code", &mut missing);
        let stock = self.stock.filter(|s| *s != 0);
        if stock.is_none() {
            missing.push("stock");
        }

        match (title, description, price, thumbnail, code, stock) {
            (Some(title), Some(description), Some(price), Some(thumbnail), Some(code), Some(stock)) => {
                if price < 0.0 {
                    return Err(ServiceError::Validation("price must be a positive number".into()));
                }
                Ok(NewProduct { title, description, price, thumbnail, code, stock })
            }
            _ => Err(ServiceError::Validation(format!(
                "all fields are required; missing: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Partial update. Carries neither `id` nor `code`, so neither can be
/// reassigned; unknown keys in incoming JSON are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
    pub stock: Option<u64>,
}

impl ProductPatch {
    /// Shallow merge: supplied fields overwrite, the rest stay untouched.
    /// The merged record is not re-validated.
    pub fn apply_to(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(thumbnail) = self.thumbnail {
            product.thumbnail = thumbnail;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> ProductDraft {
        ProductDraft {
            title: Some("A".into()),
            description: Some("d".into()),
            price: Some(10.0),
            thumbnail: Some("t".into()),
            code: Some("C1".into()),
            stock: Some(5),
        }
    }

    #[test]
    fn full_draft_validates() {
        let p = full().validate().unwrap().with_id(9);
        assert_eq!(p.id, 9);
        assert_eq!(p.code, "C1");
        assert_eq!(p.stock, 5);
    }

    #[test]
    fn falsy_fields_count_as_missing() {
        let cases = [
            ProductDraft { title: None, ..full() },
            ProductDraft { description: Some(String::new()), ..full() },
            ProductDraft { price: Some(0.0), ..full() },
            ProductDraft { price: Some(f64::NAN), ..full() },
            ProductDraft { thumbnail: None, ..full() },
            ProductDraft { code: Some(String::new()), ..full() },
            ProductDraft { stock: Some(0), ..full() },
            ProductDraft { stock: None, ..full() },
        ];
        for draft in cases {
            assert!(matches!(draft.validate(), Err(ServiceError::Validation(_))));
        }
    }

    #[test]
    fn missing_fields_are_named() {
        let err = ProductDraft { price: Some(0.0), stock: Some(0), ..full() }.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("price"));
        assert!(msg.contains("stock"));
        assert!(!msg.contains("title"));
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(ProductDraft { price: Some(-1.0), ..full() }.validate().is_err());
    }

    #[test]
    fn patch_overwrites_only_supplied_fields() {
        let mut p = full().validate().unwrap().with_id(1);
        ProductPatch { price: Some(99.5), stock: Some(0), ..Default::default() }.apply_to(&mut p);
        assert_eq!(p.price, 99.5);
        assert_eq!(p.stock, 0);
        assert_eq!(p.title, "A");
        assert_eq!(p.code, "C1");
    }

    #[test]
    fn patch_ignores_identity_keys_in_json() {
        let patch: ProductPatch = serde_json::from_str(r#"{"id": 42, "code": "X", "title": "B"}"#).unwrap();
        let mut p = full().validate().unwrap().with_id(1);
        patch.apply_to(&mut p);
        assert_eq!(p.id, 1);
        assert_eq!(p.code, "C1");
        assert_eq!(p.title, "B");
    }
}
