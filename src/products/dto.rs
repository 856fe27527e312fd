use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::ApiError,
    validate::{coerce_integer, coerce_number, parse_optional_number, present, FieldError, PageQuery},
};

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    #[serde(flatten)]
    pub paging: PageQuery,
    pub category: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
}

/// Filters as the client sent them, echoed back in the listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductFilterEcho {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "minPrice", skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice", skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ProductListQuery {
    pub fn filter(&self) -> Result<ProductFilter, FieldError> {
        Ok(ProductFilter {
            category: present(&self.category).map(str::to_owned),
            min_price: parse_optional_number("minPrice", &self.min_price)?,
            max_price: parse_optional_number("maxPrice", &self.max_price)?,
        })
    }

    pub fn echo(&self) -> ProductFilterEcho {
        ProductFilterEcho {
            category: present(&self.category).map(str::to_owned),
            min_price: present(&self.min_price).map(str::to_owned),
            max_price: present(&self.max_price).map(str::to_owned),
        }
    }
}

/// Body of `POST /api/products`. `price` and `stock` may arrive as numbers or
/// numeric strings.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub category: Option<String>,
    pub stock: Option<Value>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub stock: i64,
    pub image_url: Option<String>,
}

impl CreateProductRequest {
    pub fn validate(self) -> Result<NewProduct, ApiError> {
        let price = self.price.filter(|v| !v.is_null() && *v != Value::String(String::new()));
        let (Some(name), Some(price), Some(category)) =
            (present(&self.name), price, present(&self.category))
        else {
            return Err(ApiError::incomplete(
                "Los campos name, price y category son obligatorios",
            ));
        };

        let price = coerce_number("price", &price)?;
        if price < 0.0 {
            return Err(FieldError::new("price", "no puede ser negativo").into());
        }
        let stock = match self.stock.filter(|v| !v.is_null()) {
            Some(v) => coerce_integer("stock", &v)?,
            None => 0,
        };
        if stock < 0 {
            return Err(FieldError::new("stock", "no puede ser negativo").into());
        }

        Ok(NewProduct {
            name: name.to_owned(),
            description: self.description,
            price,
            category: category.to_owned(),
            stock,
            image_url: self.image_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> CreateProductRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let p = parse(json!({"name": "Hub", "price": "25.50", "category": "Accesorios", "stock": "3"}))
            .validate()
            .unwrap();
        assert_eq!(p.price, 25.5);
        assert_eq!(p.stock, 3);
    }

    #[test]
    fn stock_defaults_to_zero() {
        let p = parse(json!({"name": "Hub", "price": 10, "category": "Accesorios"}))
            .validate()
            .unwrap();
        assert_eq!(p.stock, 0);
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let err = parse(json!({"name": "Hub", "price": "cheap", "category": "A"}))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { ref message, .. } if message.contains("price")));
    }

    #[test]
    fn negative_values_are_rejected() {
        assert!(parse(json!({"name": "Hub", "price": -1, "category": "A"}))
            .validate()
            .is_err());
        assert!(parse(json!({"name": "Hub", "price": 1, "category": "A", "stock": -2}))
            .validate()
            .is_err());
    }

    #[test]
    fn missing_required_fields() {
        let err = parse(json!({"name": "Hub", "category": "A"})).validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation { ref error, .. } if error == "Datos incompletos"));
    }

    #[test]
    fn bad_price_filter_is_rejected() {
        let q = ProductListQuery {
            paging: PageQuery::default(),
            category: None,
            min_price: Some("lots".into()),
            max_price: None,
        };
        assert_eq!(q.filter().unwrap_err().field, "minPrice");
    }
}
