//! HTTP server for the art DID registry.
//!
//! Exposes the registry workflows as a small JSON API: resolve and check
//! over `GET`, register and transfer over `POST`, update over `PUT`.
//! Failures carry `{"success": false, "error": <kind>, "message": ...}` with
//! a status derived from the error kind.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{LedgerMode, LedgerSettings, NodeMode, ServerConfig, StoreSettings};
pub use error::{ApiError, ServerError, ServerResult};
pub use server::ArtDidServer;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    const BOB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const CAROL: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

    fn app() -> Router {
        let config = ServerConfig {
            store: StoreSettings {
                gateways: Vec::new(),
                ..StoreSettings::default()
            },
            ..ServerConfig::default()
        };
        ArtDidServer::new(config).unwrap().router()
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = call(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn register_resolve_update_transfer() {
        let app = app();

        let (status, registered) = call(
            &app,
            Method::POST,
            "/register",
            Some(json!({"metadata": {"title": "Sunset", "artist": "Ann"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let did = registered["did"].as_str().unwrap().to_string();
        assert!(did.starts_with("did:art:hkust:0x"));
        assert!(registered["contentUrl"]
            .as_str()
            .unwrap()
            .ends_with(registered["contentAddress"].as_str().unwrap()));

        let (status, checked) = call(&app, Method::GET, &format!("/check?did={did}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(checked, json!({"success": true, "data": {"exists": true}}));

        let (status, resolved) = call(&app, Method::GET, &format!("/resolve?did={did}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resolved["blockchainData"]["version"], 1);
        assert_eq!(resolved["contentMetadata"]["title"], "Sunset");
        assert!(resolved["contentFetchError"].is_null());

        let (status, updated) = call(
            &app,
            Method::PUT,
            "/update",
            Some(json!({"did": did, "metadata": {"title": "Sunset II"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["version"], 2);
        assert_eq!(updated["previousAddress"], registered["contentAddress"]);
        assert_eq!(updated["metadata"]["previousVersion"], 1);

        let (status, transferred) = call(
            &app,
            Method::POST,
            "/transfer",
            Some(json!({"did": did, "newOwner": BOB})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(transferred["currentOwner"], BOB);
        assert_eq!(transferred["totalOwners"], 2);

        // The server's signer no longer owns the record.
        let (status, body) = call(
            &app,
            Method::POST,
            "/transfer",
            Some(json!({"did": did, "newOwner": CAROL})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "OwnerAuthorizationDenied");
    }

    #[tokio::test]
    async fn bad_requests() {
        let app = app();

        let (status, body) = call(&app, Method::GET, "/resolve?did=did:art:other:0x1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InvalidFormat");

        let (status, body) = call(&app, Method::GET, "/resolve", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InvalidInput");

        let (status, _) = call(&app, Method::POST, "/register", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, Method::POST, "/register", Some(json!({"metadata": {}}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, Method::PUT, "/update", Some(json!({"did": "did:art:hkust:0x1"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &app,
            Method::POST,
            "/transfer",
            Some(json!({"did": "did:art:hkust:0x1", "newOwner": "0xB"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InvalidInput");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/register")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_record_is_not_found() {
        let app = app();
        let did = format!("did:art:hkust:0x{}", "2".repeat(64));

        let (status, body) = call(&app, Method::GET, &format!("/resolve?did={did}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "RecordNotFound");

        let (status, body) = call(&app, Method::GET, &format!("/check?did={did}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["exists"], false);

        let (status, _) = call(
            &app,
            Method::PUT,
            "/update",
            Some(json!({"did": did, "metadata": {"title": "x"}})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
