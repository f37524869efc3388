//! End-to-end tests: client → proxy → mock backend.

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use hshield_proxy::config::Environment;
use hshield_proxy::http::X_REQUEST_ID;
use hshield_proxy::HttpServer;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

use common::{client, config_for, dead_address, start_backend, start_proxy, Reply};

#[tokio::test]
async fn test_json_response_passthrough() {
    let backend = start_backend(Reply::json(201, r#"{"id":1}"#)).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    let res = client()
        .post(proxy.url("/proxy/licenses"))
        .json(&json!({ "gameId": 7 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 201);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "id": 1 }));
}

#[tokio::test]
async fn test_backend_status_preserved() {
    let backend = start_backend(Reply::json(404, r#"{"message":"Player not found"}"#)).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    let res = client().get(proxy.url("/proxy/players/99")).send().await.unwrap();

    assert_eq!(res.status(), 404);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "message": "Player not found" })
    );
}

#[tokio::test]
async fn test_path_normalized_onto_base() {
    let backend = start_backend(Reply::json(200, "{}")).await;
    let proxy = start_proxy(config_for(&format!("{}/", backend.base_url()))).await;

    for path in ["/proxy/auth/login", "/proxy//auth/login/", "/proxy/auth/login//"] {
        let res = client().get(proxy.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 200, "{path}");
    }

    let seen = backend.requests();
    assert_eq!(seen.len(), 3);
    for req in seen {
        assert_eq!(req.path_and_query, "/api/auth/login");
    }
}

#[tokio::test]
async fn test_query_string_forwarded() {
    let backend = start_backend(Reply::json(200, "[]")).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    client()
        .get(proxy.url("/proxy/matches?page=2&status=open"))
        .send()
        .await
        .unwrap();

    assert_eq!(backend.requests()[0].path_and_query, "/api/matches?page=2&status=open");
}

#[tokio::test]
async fn test_only_whitelisted_headers_forwarded() {
    let backend = start_backend(Reply::json(200, "{}")).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    let res = client()
        .put(proxy.url("/proxy/players/5/ban"))
        .header("authorization", "Bearer opaque-token")
        .header("content-type", "application/json")
        .header("cookie", "session=abc")
        .header("x-custom", "1")
        .header("x-request-id", "req-123")
        .body(r#"{"reason":"aimbot"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()[X_REQUEST_ID], "req-123");

    let seen = &backend.requests()[0];
    assert_eq!(seen.method, Method::PUT);
    assert_eq!(seen.headers["authorization"], "Bearer opaque-token");
    assert_eq!(seen.headers["content-type"], "application/json");
    assert!(seen.headers.get("cookie").is_none());
    assert!(seen.headers.get("x-custom").is_none());
    assert!(seen.headers.get("x-request-id").is_none());
    assert_eq!(&seen.body[..], br#"{"reason":"aimbot"}"#);
}

#[tokio::test]
async fn test_request_id_generated_when_missing() {
    let backend = start_backend(Reply::json(200, "{}")).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    let res = client().get(proxy.url("/proxy/dashboard")).send().await.unwrap();
    let id = res.headers()[X_REQUEST_ID].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_content_type_defaulted_for_body_methods() {
    let backend = start_backend(Reply::json(200, "{}")).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    client()
        .post(proxy.url("/proxy/auth/forgot-password"))
        .body("raw-text")
        .send()
        .await
        .unwrap();
    client().get(proxy.url("/proxy/auth/me")).send().await.unwrap();

    let seen = backend.requests();
    assert_eq!(seen[0].headers["content-type"], "application/json");
    assert_eq!(&seen[0].body[..], b"raw-text");
    assert!(seen[1].headers.get("content-type").is_none());
    assert!(seen[1].body.is_empty());
}

#[tokio::test]
async fn test_head_and_options_forwarded_without_body() {
    let backend = start_backend(Reply::json(200, r#"{"ok":true}"#)).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    let head = client()
        .head(proxy.url("/proxy/players/7"))
        .bearer_auth("abc")
        .send()
        .await
        .unwrap();
    let options = client()
        .request(Method::OPTIONS, proxy.url("/proxy/players"))
        .header("content-type", "application/json")
        .body(r#"{"ignored":true}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(head.status(), 200);
    assert_eq!(options.status(), 200);
    assert_eq!(options.json::<Value>().await.unwrap(), json!({ "ok": true }));

    let seen = backend.requests();
    assert_eq!(seen.len(), 2);

    assert_eq!(seen[0].method, Method::HEAD);
    assert_eq!(seen[0].path_and_query, "/api/players/7");
    assert_eq!(seen[0].headers["authorization"], "Bearer abc");
    assert!(seen[0].headers.get("content-type").is_none());
    assert!(seen[0].body.is_empty());

    assert_eq!(seen[1].method, Method::OPTIONS);
    assert_eq!(seen[1].path_and_query, "/api/players");
    assert_eq!(seen[1].headers["content-type"], "application/json");
    assert!(seen[1].body.is_empty());
}

#[tokio::test]
async fn test_empty_json_object_not_forwarded() {
    let backend = start_backend(Reply::json(200, "{}")).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    client()
        .delete(proxy.url("/proxy/matches/3"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    let seen = &backend.requests()[0];
    assert_eq!(seen.method, Method::DELETE);
    assert!(seen.body.is_empty());
}

#[tokio::test]
async fn test_plain_text_wrapped_in_message() {
    let backend = start_backend(Reply::text(200, "OK")).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    let res = client().get(proxy.url("/proxy/ping")).send().await.unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "message": "OK" }));
}

#[tokio::test]
async fn test_empty_non_json_body_gets_placeholder() {
    let backend = start_backend(Reply::text(202, "")).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    let res = client().post(proxy.url("/proxy/matches/1/start")).send().await.unwrap();

    assert_eq!(res.status(), 202);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "message": "Resposta não JSON" })
    );
}

#[tokio::test]
async fn test_malformed_declared_json_downgraded() {
    let backend = start_backend(Reply::json(200, "{\"broken\":")).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    let res = client().get(proxy.url("/proxy/stats")).send().await.unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "message": "Erro ao processar resposta JSON" })
    );
}

#[tokio::test]
async fn test_disallowed_method_never_forwarded() {
    let backend = start_backend(Reply::json(200, "{}")).await;
    let server = HttpServer::new(config_for(&backend.base_url())).unwrap();

    for method in [Method::TRACE, Method::from_bytes(b"PROPFIND").unwrap()] {
        let res = server
            .router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/proxy/auth/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({ "message": "Method not allowed" })
        );
    }

    assert_eq!(backend.count(), 0);
}

#[tokio::test]
async fn test_oversized_body_rejected_before_forwarding() {
    let backend = start_backend(Reply::json(200, "{}")).await;
    let mut config = config_for(&backend.base_url());
    config.limits.max_body_bytes = 16;
    let server = HttpServer::new(config).unwrap();

    let res = server
        .router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/proxy/players")
                .header("content-type", "application/json")
                .body(Body::from(format!(r#"{{"name":"{}"}}"#, "x".repeat(64))))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap(),
        json!({ "message": "Payload too large" })
    );
    assert_eq!(backend.count(), 0);
}

#[tokio::test]
async fn test_backend_timeout_returns_500() {
    let backend = start_backend(Reply::json(200, "{}").delayed(Duration::from_secs(10))).await;
    let mut config = config_for(&backend.base_url());
    config.timeouts.request_ms = 300;
    config.environment = Environment::Development;
    let proxy = start_proxy(config).await;

    let start = Instant::now();
    let res = client().get(proxy.url("/proxy/dashboard/stats")).send().await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(5), "call should be cut at the deadline");
    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Timeout ao conectar com o servidor");
    assert_eq!(body["error"], "backend did not respond within 300ms");
    assert_eq!(backend.count(), 1);
}

#[tokio::test]
async fn test_unreachable_backend_hides_detail_in_production() {
    let addr = dead_address().await;
    let proxy = start_proxy(config_for(&format!("http://{}/api", addr))).await;

    let res = client().get(proxy.url("/proxy/auth/me")).send().await.unwrap();

    assert_eq!(res.status(), 500);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "message": "Erro ao conectar com o servidor" })
    );
}

#[tokio::test]
async fn test_unreachable_backend_shows_detail_in_development() {
    let addr = dead_address().await;
    let mut config = config_for(&format!("http://{}/api", addr));
    config.environment = Environment::Development;
    let proxy = start_proxy(config).await;

    let res = client().get(proxy.url("/proxy/auth/me")).send().await.unwrap();

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Erro ao conectar com o servidor");
    assert!(body["error"].as_str().unwrap().starts_with("upstream request failed"));
}

#[tokio::test]
async fn test_repeated_get_is_forwarded_each_time() {
    let backend = start_backend(Reply::json(200, r#"{"online":12}"#)).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    for _ in 0..2 {
        let res = client().get(proxy.url("/proxy/players/online")).send().await.unwrap();
        assert_eq!(res.json::<Value>().await.unwrap(), json!({ "online": 12 }));
    }

    assert_eq!(backend.count(), 2);
}

#[tokio::test]
async fn test_mount_root_targets_backend_root() {
    let backend = start_backend(Reply::json(200, "{}")).await;
    let proxy = start_proxy(config_for(&backend.base_url())).await;

    client().get(proxy.url("/proxy")).send().await.unwrap();
    client().get(proxy.url("/proxy/")).send().await.unwrap();

    let seen = backend.requests();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|r| r.path_and_query == "/api/"));
}

#[tokio::test]
async fn test_healthz() {
    let proxy = start_proxy(config_for("http://127.0.0.1:9/api")).await;

    let res = client().get(proxy.url("/healthz")).send().await.unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "operational");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_custom_mount_path() {
    let backend = start_backend(Reply::json(200, "{}")).await;
    let mut config = config_for(&backend.base_url());
    config.listener.mount_path = "/api/proxy".into();
    let proxy = start_proxy(config).await;

    let res = client().get(proxy.url("/api/proxy/licenses")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(backend.requests()[0].path_and_query, "/api/licenses");

    let res = client().get(proxy.url("/proxy/licenses")).send().await.unwrap();
    assert_eq!(res.status(), 404);
}
