use crate::errors::handle_panic;
use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, patch, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build and configure the application router
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Cart lifecycle
        .route("/cart", post(handlers::create_cart))
        .route(
            "/cart/{cart_id}",
            get(handlers::get_cart).delete(handlers::clear_cart),
        )
        // Line items
        .route("/cart/{cart_id}/items", post(handlers::add_item))
        .route(
            "/cart/{cart_id}/items/{item_id}",
            patch(handlers::update_item).delete(handlers::remove_item),
        )
        // Middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{chaos_state, panicking_state, test_state};
    use reqwest::{Client, StatusCode, header};
    use serde_json::{Value, json};

    /// Serves the full router on an ephemeral port and returns its base url.
    async fn spawn(state: AppState) -> String {
        spawn_with_origins(state, &["*".to_string()]).await
    }

    async fn spawn_with_origins(state: AppState, origins: &[String]) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = build_router(state, origins);
        tokio::spawn(async move { axum::serve(listener, router).await });
        format!("http://{addr}")
    }

    async fn create(client: &Client, base: &str) -> String {
        let response = client.post(format!("{base}/cart")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let cart: Value = response.json().await.unwrap();
        cart["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_route() {
        let base = spawn(test_state()).await;

        let response = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"status": "healthy", "service": "cart"}));
    }

    #[tokio::test]
    async fn test_cart_lifecycle_over_http() {
        let base = spawn(test_state()).await;
        let client = Client::new();
        let cart_id = create(&client, &base).await;
        let cart_url = format!("{base}/cart/{cart_id}");

        let fetched: Value = client.get(&cart_url).send().await.unwrap().json().await.unwrap();
        assert_eq!(fetched["id"], cart_id.as_str());
        assert_eq!(fetched["items"], json!([]));

        let item = json!({"itemId": "sku-1", "quantity": 2, "basePrice": 5.0});
        for expected in [2, 4] {
            let response = client
                .post(format!("{cart_url}/items"))
                .json(&item)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await.unwrap();
            assert_eq!(body["items"][0]["quantity"], expected);
        }

        let patched = client
            .patch(format!("{cart_url}/items/sku-1"))
            .json(&json!({"quantity": 1}))
            .send()
            .await
            .unwrap();
        assert_eq!(patched.status(), StatusCode::OK);
        let body: Value = patched.json().await.unwrap();
        assert_eq!(body["items"][0]["quantity"], 1);

        let removed = client
            .delete(format!("{cart_url}/items/sku-1"))
            .send()
            .await
            .unwrap();
        assert_eq!(removed.status(), StatusCode::OK);
        let body: Value = removed.json().await.unwrap();
        assert_eq!(body["items"], json!([]));

        let cleared = client.delete(&cart_url).send().await.unwrap();
        assert_eq!(cleared.status(), StatusCode::OK);
        let body: Value = cleared.json().await.unwrap();
        assert_eq!(body["message"], "Cart cleared successfully");

        let gone = client.get(&cart_url).send().await.unwrap();
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
        let body: Value = gone.json().await.unwrap();
        assert_eq!(body["error"], "Cart not found");

        let cleared_again = client.delete(&cart_url).send().await.unwrap();
        assert_eq!(cleared_again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unreadable_bodies_are_400() {
        let base = spawn(test_state()).await;
        let client = Client::new();
        let cart_id = create(&client, &base).await;

        let malformed = client
            .post(format!("{base}/cart/{cart_id}/items"))
            .header(header::CONTENT_TYPE, "application/json")
            .body("{\"itemId\": ")
            .send()
            .await
            .unwrap();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
        let body: Value = malformed.json().await.unwrap();
        assert!(body["error"].is_string());

        let not_json = client
            .post(format!("{base}/cart/{cart_id}/items"))
            .body("{\"itemId\": \"sku-1\", \"quantity\": 1}")
            .send()
            .await
            .unwrap();
        assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);

        let fractional = client
            .patch(format!("{base}/cart/{cart_id}/items/sku-1"))
            .json(&json!({"quantity": 2.5}))
            .send()
            .await
            .unwrap();
        assert_eq!(fractional.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unrouted_method_is_rejected() {
        let base = spawn(test_state()).await;

        let response = reqwest::get(format!("{base}/cart")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_chaos_precedes_body_parsing() {
        let base = spawn(chaos_state(
            json!({"enabled": true, "errorRate": 100, "delayMs": 200}),
        ))
        .await;
        let client = Client::new();
        let cart_id = create(&client, &base).await;

        let response = client
            .post(format!("{base}/cart/{cart_id}/items"))
            .header(header::CONTENT_TYPE, "application/json")
            .body("not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["retryAfter"], 200);
        assert_eq!(body["code"], "FEATURE_FLAG_CHAOS");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let base = spawn(test_state()).await;
        let client = Client::new();

        let simple = client
            .get(format!("{base}/health"))
            .header(header::ORIGIN, "http://shop.example")
            .send()
            .await
            .unwrap();
        assert_eq!(simple.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let preflight = client
            .request(reqwest::Method::OPTIONS, format!("{base}/cart"))
            .header(header::ORIGIN, "http://shop.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .send()
            .await
            .unwrap();
        assert!(preflight.status().is_success());
        assert_eq!(preflight.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_cors_origin_list() {
        let base = spawn_with_origins(test_state(), &["http://shop.example".to_string()]).await;
        let client = Client::new();

        let allowed = client
            .get(format!("{base}/health"))
            .header(header::ORIGIN, "http://shop.example")
            .send()
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://shop.example"
        );

        let other = client
            .get(format!("{base}/health"))
            .header(header::ORIGIN, "http://elsewhere.example")
            .send()
            .await
            .unwrap();
        assert_eq!(other.status(), StatusCode::OK);
        assert!(other.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_500() {
        let base = spawn(panicking_state()).await;

        let response = reqwest::get(format!("{base}/cart/abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["message"], "store exploded");
    }
}
