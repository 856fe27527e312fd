use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    db::{StorageError, Table},
    envelope::{ApiResponse, ApiResult, Created, PageInfo},
    error::ApiError,
    extract::{JsonBody, QueryParams},
    products::{
        dto::{CreateProductRequest, NewProduct, ProductFilterEcho, ProductListQuery},
        repo::{CategoryStats, Product},
    },
    state::AppState,
    validate::parse_page,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/stats", get(stats))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<ProductListQuery>,
) -> ApiResult<Vec<Product>, ProductFilterEcho> {
    let page = parse_page(&q.paging)?;
    let filter = q.filter()?;
    let products = Product::list(&state.db, &filter, page)
        .await
        .map_err(|e| ApiError::internal("Error al obtener productos", e))?;

    let info = PageInfo {
        page: page.page,
        limit: page.limit,
        total: products.len(),
    };
    Ok(Json(
        ApiResponse::ok(products, "Productos obtenidos exitosamente")
            .with_pagination(info)
            .with_filters(q.echo()),
    ))
}

#[derive(Debug, Serialize)]
pub struct CreatedProduct {
    pub id: i64,
    #[serde(flatten)]
    pub product: NewProduct,
}

#[instrument(skip(state, body))]
pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateProductRequest>,
) -> Created<CreatedProduct> {
    let product = body.validate()?;
    let created = Product::create(&state.db, &product)
        .await
        .map_err(|e| ApiError::internal("Error al crear producto", e))?;

    info!(product_id = created.inserted_id, name = %product.name, "product created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            CreatedProduct {
                id: created.inserted_id,
                product,
            },
            "Producto creado exitosamente",
        )),
    ))
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub users: i64,
    pub products: i64,
    pub orders: i64,
    pub tutorials: i64,
    pub categories: Vec<CategoryStats>,
}

#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> ApiResult<Stats> {
    let fail = |e: StorageError| ApiError::internal("Error al obtener estadísticas", e);
    let stats = Stats {
        users: state.db.count(Table::Users).await.map_err(fail)?,
        products: state.db.count(Table::Products).await.map_err(fail)?,
        orders: state.db.count(Table::Orders).await.map_err(fail)?,
        tutorials: state.db.count(Table::Tutorials).await.map_err(fail)?,
        categories: Product::category_stats(&state.db).await.map_err(fail)?,
    };
    Ok(Json(ApiResponse::ok(stats, "Estadísticas obtenidas exitosamente")))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{send, TestApp};

    #[tokio::test]
    async fn list_echoes_filters() {
        let app = TestApp::seeded().await;
        let (status, body) = send(
            &app.router,
            Method::GET,
            "/api/products?category=Accesorios&maxPrice=100",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filters"]["category"], "Accesorios");
        assert_eq!(body["filters"]["maxPrice"], "100");
        assert!(body["filters"].get("minPrice").is_none());
        let data = body["data"].as_array().unwrap();
        // Mouse Gaming and Webcam HD
        assert_eq!(data.len(), 2);
        assert!(data.iter().all(|p| p["price"].as_f64().unwrap() <= 100.0));
    }

    #[tokio::test]
    async fn create_coerces_and_returns_201() {
        let app = TestApp::empty().await;
        let (status, body) = send(
            &app.router,
            Method::POST,
            "/api/products",
            Some(json!({"name": "Hub USB", "price": "25.5", "category": "Accesorios", "stock": 4})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["price"], 25.5);
        assert_eq!(body["data"]["stock"], 4);
        assert!(body["data"]["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn create_rejects_bad_input() {
        let app = TestApp::empty().await;
        let (status, _) = send(
            &app.router,
            Method::POST,
            "/api/products",
            Some(json!({"name": "Hub USB", "price": "free", "category": "Accesorios"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app.router,
            Method::POST,
            "/api/products",
            Some(json!({"name": "Hub USB"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stats_count_every_table() {
        let app = TestApp::seeded().await;
        let (status, body) = send(&app.router, Method::GET, "/api/stats", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["users"], 7);
        assert_eq!(body["data"]["products"], 10);
        assert_eq!(body["data"]["orders"], 3);
        assert_eq!(body["data"]["tutorials"], 8);
        assert!(!body["data"]["categories"].as_array().unwrap().is_empty());
    }
}
