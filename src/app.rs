use std::{any::Any, net::SocketAddr};

use axum::{
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    middleware::{from_fn_with_state, map_response},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    auth,
    middleware::{cors, rate_limit, security_headers},
    products,
    state::AppState,
    tutorials, users,
};

pub fn build_app(state: AppState) -> Router {
    let api = Router::new()
        .merge(users::router())
        .merge(products::router())
        .route_layer(from_fn_with_state(state.clone(), rate_limit));

    let frontend = ServeDir::new(&state.config.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    let mut app = Router::new()
        .nest("/api", api)
        .nest("/auth", auth::router())
        .nest("/tutorials", tutorials::router())
        .fallback_service(frontend)
        .with_state(state.clone())
        .layer(map_response(method_not_allowed));

    for header in security_headers() {
        app = app.layer(header);
    }

    app.layer(cors(&state.config))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Endpoint no encontrado",
            "message": "La ruta solicitada no existe en esta API",
            "availableEndpoints": {
                "GET /": "Página principal",
                "GET /api/users": "Lista de usuarios",
                "GET /api/products": "Lista de productos",
                "POST /api/users": "Crear usuario",
                "GET /tutorials": "Tutoriales disponibles",
                "POST /auth/login": "Iniciar sesión",
            }
        })),
    )
}

/// A known path hit with the wrong method gets the same JSON 404 as an
/// unknown path.
async fn method_not_allowed(res: Response) -> Response {
    if res.status() == StatusCode::METHOD_NOT_ALLOWED {
        not_found().await.into_response()
    } else {
        res
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": "Error interno del servidor",
            "message": "Algo salió mal en el servidor",
        })),
    )
        .into_response()
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "3000".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    use crate::test_support::{send, test_config, TestApp};

    #[tokio::test]
    async fn unknown_path_lists_endpoints() {
        let app = TestApp::empty().await;
        let (status, body) = send(&app.router, Method::GET, "/no/such/route", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Endpoint no encontrado");
        assert!(body["availableEndpoints"]["GET /api/users"].is_string());

        let (status, body) = send(&app.router, Method::POST, "/no/such/route", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Endpoint no encontrado");
    }

    #[tokio::test]
    async fn wrong_method_on_known_path_gets_json_404() {
        let app = TestApp::empty().await;
        for (method, uri) in [
            (Method::PATCH, "/api/users"),
            (Method::PATCH, "/auth/login"),
            (Method::GET, "/auth/login"),
            (Method::POST, "/tutorials/meta/categories"),
        ] {
            let (status, body) = send(&app.router, method.clone(), uri, None, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], "Endpoint no encontrado");
        }
    }

    async fn boom() -> &'static str {
        panic!("handler blew up")
    }

    #[tokio::test]
    async fn panics_render_generic_500_envelope() {
        let router = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(super::panic_response));
        let (status, body) = send(&router, Method::GET, "/boom", None, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Error interno del servidor");
        assert_eq!(body["message"], "Algo salió mal en el servidor");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let app = TestApp::empty().await;
        let res = app
            .router
            .clone()
            .oneshot(Request::get("/api/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(res.headers()[header::X_FRAME_OPTIONS], "DENY");
        assert!(res.headers().contains_key(header::CONTENT_SECURITY_POLICY));
    }

    #[tokio::test]
    async fn api_routes_are_rate_limited() {
        let mut cfg = test_config();
        cfg.rate_limit.max_requests = 2;
        let app = TestApp::with_config(cfg).await;

        for _ in 0..2 {
            let (status, _) = send(&app.router, Method::GET, "/api/products", None, None).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = send(&app.router, Method::GET, "/api/products", None, None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["success"], false);

        // only /api is limited
        let (status, _) = send(&app.router, Method::GET, "/tutorials", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_allows_local_frontend() {
        let app = TestApp::empty().await;
        let res = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/users")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
    }
}
