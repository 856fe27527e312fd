use serde::Serialize;
use sqlx::FromRow;

use crate::{
    db::{Database, ExecOutcome, Param, StorageError},
    products::dto::{NewProduct, ProductFilter},
    validate::Page,
};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub stock: i64,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CategoryStats {
    pub category: String,
    pub count: i64,
    pub avg_price: f64,
}

impl Product {
    pub async fn list(
        db: &Database,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Vec<Product>, StorageError> {
        let mut sql = String::from("SELECT * FROM products WHERE 1=1");
        let mut params: Vec<Param> = Vec::new();
        if let Some(category) = &filter.category {
            sql.push_str(" AND category = ?");
            params.push(category.as_str().into());
        }
        if let Some(min) = filter.min_price {
            sql.push_str(" AND price >= ?");
            params.push(min.into());
        }
        if let Some(max) = filter.max_price {
            sql.push_str(" AND price <= ?");
            params.push(max.into());
        }
        sql.push_str(" ORDER BY id LIMIT ? OFFSET ?");
        params.push(page.limit.into());
        params.push(page.offset().into());
        db.query(&sql, &params).await
    }

    pub async fn create(db: &Database, p: &NewProduct) -> Result<ExecOutcome, StorageError> {
        db.execute(
            "INSERT INTO products (name, description, price, category, stock, image_url) \
             VALUES (?, ?, ?, ?, ?, ?)",
            &[
                p.name.as_str().into(),
                p.description.clone().into(),
                p.price.into(),
                p.category.as_str().into(),
                p.stock.into(),
                p.image_url.clone().into(),
            ],
        )
        .await
    }

    pub async fn category_stats(db: &Database) -> Result<Vec<CategoryStats>, StorageError> {
        db.query(
            "SELECT category, COUNT(*) AS count, AVG(price) AS avg_price \
             FROM products GROUP BY category",
            &[],
        )
        .await
    }
}
