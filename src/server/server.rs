use anyhow::Result;
use std::{sync::Arc, time::Duration};

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::catalog_routes::make_catalog_routes;
use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};
use crate::manager::CatalogManager;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

pub fn make_app(config: ServerConfig, catalog_manager: Arc<CatalogManager>) -> Router {
    let state = ServerState::new(config, catalog_manager);

    let catalog_routes = make_catalog_routes(state.clone());

    let app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/v1/catalogs", catalog_routes);

    app.layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    catalog_manager: Arc<CatalogManager>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
    };
    let app = make_app(config, catalog_manager);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::SqliteCatalogStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt; // for `oneshot`

    fn test_app() -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteCatalogStore::new(dir.path().join("catalog.db")).unwrap());
        let manager = Arc::new(CatalogManager::new(store));
        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };
        (make_app(config, manager), dir)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn home_reports_uptime_and_hash() {
        let (app, _dir) = test_app();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stats = body_json(response).await;
        assert!(stats["uptime"].as_str().unwrap().contains("d "));
        assert!(stats["hash"].is_string());
    }

    #[tokio::test]
    async fn create_returns_created_catalog() {
        let (app, _dir) = test_app();

        let response = app
            .oneshot(json_request(
                "POST",
                "/v1/catalogs",
                json!({
                    "name": "Winter",
                    "vertical": "fashion",
                    "primary": true,
                    "locales": ["en_US"]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let catalog = body_json(response).await;
        assert_eq!(catalog["name"], "Winter");
        assert_eq!(catalog["vertical"], "fashion");
        assert_eq!(catalog["primary"], true);
        assert_eq!(catalog["isMultilocale"], false);
        assert!(!catalog["id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_malformed_locale() {
        let (app, _dir) = test_app();

        let response = app
            .oneshot(json_request(
                "POST",
                "/v1/catalogs",
                json!({
                    "name": "Winter",
                    "vertical": "fashion",
                    "primary": false,
                    "locales": ["EN_us"]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Each locale must follow the pattern xx_YY.");
    }

    #[tokio::test]
    async fn create_rejects_unknown_vertical() {
        let (app, _dir) = test_app();

        let response = app
            .oneshot(json_request(
                "POST",
                "/v1/catalogs",
                json!({
                    "name": "Winter",
                    "vertical": "toys",
                    "primary": false,
                    "locales": ["en_US"]
                }),
            ))
            .await
            .unwrap();
        // serde rejects the enum value before the handler runs
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn get_missing_catalog_is_not_found() {
        let (app, _dir) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/catalogs/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Catalog with ID 'missing' not found.");
    }

    #[tokio::test]
    async fn delete_rejects_malformed_id() {
        let (app, _dir) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/v1/catalogs/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bulk_delete_rejects_empty_ids() {
        let (app, _dir) = test_app();

        let response = app
            .oneshot(json_request("DELETE", "/v1/catalogs", json!({"ids": []})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "The ids array must not be empty");
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(
            format_uptime(Duration::from_secs(90_061)),
            "1d 01:01:01"
        );
    }
}
