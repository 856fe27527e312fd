use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    envelope::{ApiResponse, ApiResult, PageInfo},
    error::ApiError,
    extract::{PathParam, QueryParams},
    state::AppState,
    tutorials::repo::{CategoryCount, DifficultyCount, Tutorial, TutorialFilter, TutorialListQuery},
    validate::{parse_id, parse_page},
};

pub fn tutorial_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tutorials))
        .route("/:id", get(get_tutorial))
        .route("/meta/categories", get(categories))
        .route("/meta/difficulties", get(difficulties))
}

#[instrument(skip(state))]
pub async fn list_tutorials(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<TutorialListQuery>,
) -> ApiResult<Vec<Tutorial>, TutorialFilter> {
    let page = parse_page(&q.paging)?;
    let filter = q.filter();
    let tutorials = Tutorial::list(&state.db, &filter, page)
        .await
        .map_err(|e| ApiError::internal("Error al obtener tutoriales", e))?;

    let info = PageInfo {
        page: page.page,
        limit: page.limit,
        total: tutorials.len(),
    };
    Ok(Json(
        ApiResponse::ok(tutorials, "Tutoriales obtenidos exitosamente")
            .with_pagination(info)
            .with_filters(filter),
    ))
}

#[instrument(skip(state))]
pub async fn get_tutorial(
    State(state): State<AppState>,
    PathParam(raw_id): PathParam<String>,
) -> ApiResult<Tutorial> {
    let tutorial = match parse_id(&raw_id) {
        Some(id) => Tutorial::find(&state.db, id)
            .await
            .map_err(|e| ApiError::internal("Error al obtener tutorial", e))?,
        None => None,
    };
    let tutorial = tutorial.ok_or_else(|| {
        ApiError::not_found(
            "Tutorial no encontrado",
            format!("No existe un tutorial con ID {raw_id}"),
        )
    })?;
    Ok(Json(ApiResponse::ok(tutorial, "Tutorial encontrado exitosamente")))
}

#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> ApiResult<Vec<CategoryCount>> {
    let cats = Tutorial::categories(&state.db)
        .await
        .map_err(|e| ApiError::internal("Error al obtener categorías", e))?;
    Ok(Json(ApiResponse::ok(cats, "Categorías obtenidas exitosamente")))
}

#[instrument(skip(state))]
pub async fn difficulties(State(state): State<AppState>) -> ApiResult<Vec<DifficultyCount>> {
    let levels = Tutorial::difficulties(&state.db)
        .await
        .map_err(|e| ApiError::internal("Error al obtener niveles de dificultad", e))?;
    Ok(Json(ApiResponse::ok(
        levels,
        "Niveles de dificultad obtenidos exitosamente",
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::test_support::{send, TestApp};

    #[tokio::test]
    async fn list_paginates_and_echoes_filters() {
        let app = TestApp::seeded().await;
        let (status, body) = send(&app.router, Method::GET, "/tutorials?limit=5", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 5);

        let (_, body) = send(
            &app.router,
            Method::GET,
            "/tutorials?difficulty=advanced",
            None,
            None,
        )
        .await;
        assert_eq!(body["filters"]["difficulty"], "advanced");
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert!(data.iter().all(|t| t["difficulty"] == "advanced"));
    }

    #[tokio::test]
    async fn undecodable_id_gets_the_envelope() {
        let app = TestApp::seeded().await;
        let (status, body) = send(&app.router, Method::GET, "/tutorials/%FF", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Parámetros inválidos");
    }

    #[tokio::test]
    async fn get_by_id() {
        let app = TestApp::seeded().await;
        let (status, body) = send(&app.router, Method::GET, "/tutorials/1", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "¿Qué es una API?");

        let (status, body) = send(&app.router, Method::GET, "/tutorials/424242", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Tutorial no encontrado");
    }

    #[tokio::test]
    async fn difficulties_in_teaching_order() {
        let app = TestApp::seeded().await;
        let (status, body) = send(
            &app.router,
            Method::GET,
            "/tutorials/meta/difficulties",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let levels: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["difficulty"].as_str().unwrap())
            .collect();
        assert_eq!(levels, ["beginner", "intermediate", "advanced"]);
    }

    #[tokio::test]
    async fn categories_have_counts() {
        let app = TestApp::seeded().await;
        let (status, body) = send(
            &app.router,
            Method::GET,
            "/tutorials/meta/categories",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let cats = body["data"].as_array().unwrap();
        let total: i64 = cats.iter().map(|c| c["count"].as_i64().unwrap()).sum();
        assert_eq!(total, 8);
        // HTTP and Seguridad each hold two seeded tutorials
        assert_eq!(cats[0]["count"], 2);
    }
}
