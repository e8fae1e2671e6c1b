pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::assist::handlers as assist;
use crate::auth::handlers as auth;
use crate::bundle::handlers as bundle;
use crate::config::LOCAL_ASSET_MOUNT;
use crate::profile::handlers as profile;
use crate::state::AppState;

/// Headroom above the image limit for the document part and multipart framing.
const BODY_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + BODY_OVERHEAD_BYTES;

    let mut router = Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/register", post(auth::handle_register))
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/logout", post(auth::handle_logout))
        // Profile persistence
        .route(
            "/api/profile",
            get(profile::handle_get_profile)
                .post(profile::handle_save_profile)
                .delete(profile::handle_delete_profile),
        )
        // Templates and bundles
        .route("/api/templates", get(bundle::handle_list_templates))
        .route(
            "/api/preview",
            get(bundle::handle_get_preview).post(bundle::handle_create_preview),
        )
        .route("/api/download/html", post(bundle::handle_download_html))
        .route("/api/download/zip", post(bundle::handle_download_zip))
        // Generative text
        .route("/api/proofread", post(assist::handle_proofread))
        .route("/api/questions", post(assist::handle_questions))
        .route("/api", post(assist::handle_assist));

    if state.config.asset_base_url.is_none() {
        router = router.nest_service(LOCAL_ASSET_MOUNT, ServeDir::new(&state.config.assets_dir));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::llm_client::LlmError;
    use crate::auth::{hash_token, new_token};
    use crate::store::{AccountStore, ProfileStore};
    use crate::testing::{sample_record, seed_session, test_state, FakeGenerator};

    const BOUNDARY: &str = "folio-test-boundary";

    async fn send(app: Router, req: Request<Body>) -> Response {
        app.oneshot(req).await.unwrap()
    }

    async fn body_bytes(resp: Response) -> Vec<u8> {
        to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    async fn body_json(resp: Response) -> Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn bare_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn multipart_request(
        uri: &str,
        token: Option<&str>,
        document: &Value,
        image: Option<(&str, &[u8])>,
    ) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"document\"\r\n\
                 Content-Type: application/json\r\n\r\n{document}\r\n"
            )
            .as_bytes(),
        );
        if let Some((filename, bytes)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
                     filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder().method("POST").uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn document(template: &str) -> Value {
        json!({ "content": sample_record(), "templateId": template })
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = test_state(None);
        let resp = send(build_router(state), bare_request("GET", "/health", None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "folio-api");
    }

    #[tokio::test]
    async fn test_register_login_logout_flow() {
        let (state, _) = test_state(None);
        let app = build_router(state);
        let creds = json!({ "email": " Taro@Example.com ", "password": "hunter22" });

        let resp = send(app.clone(), json_request("POST", "/api/auth/register", None, creds.clone())).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = send(app.clone(), json_request("POST", "/api/auth/register", None, creds.clone())).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let wrong = json!({ "email": "taro@example.com", "password": "nope" });
        let resp = send(app.clone(), json_request("POST", "/api/auth/login", None, wrong)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = send(app.clone(), json_request("POST", "/api/auth/login", None, creds)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        let token = body["token"].as_str().unwrap().to_string();
        assert!(body["expiresAt"].is_string());

        let resp = send(app.clone(), bare_request("GET", "/api/profile", Some(&token))).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = send(app.clone(), bare_request("POST", "/api/auth/logout", Some(&token))).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = send(app, bare_request("GET", "/api/profile", Some(&token))).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_requires_both_fields() {
        let (state, _) = test_state(None);
        let resp = send(
            build_router(state),
            json_request("POST", "/api/auth/register", None, json!({ "email": "a@b.c" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_profile_requires_identity() {
        let (state, _) = test_state(None);
        let app = build_router(state);

        let resp = send(app.clone(), bare_request("GET", "/api/profile", None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = send(
            app,
            json_request("POST", "/api/profile", Some("forged"), document("first")),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_profile_save_load_delete() {
        let (state, store) = test_state(None);
        let (_, token) = seed_session(&store, "taro@example.com").await;
        let app = build_router(state);

        let resp = send(
            app.clone(),
            json_request("POST", "/api/profile", Some(&token), document("forth")),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = send(app.clone(), bare_request("GET", "/api/profile", Some(&token))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["templateId"], "forth");
        assert_eq!(body["schemaVersion"], 2);
        assert_eq!(body["content"]["yourName"], "山田 太郎");
        assert_eq!(body["content"]["skill"], json!(["Python", "HTML", "CSS"]));

        let resp = send(app.clone(), bare_request("DELETE", "/api/profile", Some(&token))).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let resp = send(app, bare_request("DELETE", "/api/profile", Some(&token))).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_is_per_identity() {
        let (state, store) = test_state(None);
        let (_, alice) = seed_session(&store, "alice@example.com").await;
        let (_, bob) = seed_session(&store, "bob@example.com").await;
        let app = build_router(state);

        send(
            app.clone(),
            json_request("POST", "/api/profile", Some(&alice), document("second")),
        )
        .await;
        let resp = send(app, bare_request("GET", "/api/profile", Some(&bob))).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_rejects_duplicate_question_ids() {
        let (state, store) = test_state(None);
        let (_, token) = seed_session(&store, "taro@example.com").await;
        let mut doc = document("first");
        doc["content"]["questions"] = json!([
            { "id": "1", "question": "a？", "answer": "x" },
            { "id": "1", "question": "b？", "answer": "y" }
        ]);

        let resp = send(
            build_router(state),
            json_request("POST", "/api/profile", Some(&token), doc),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_legacy_profile_is_upconverted_on_load() {
        let (state, store) = test_state(None);
        let (user_id, token) = seed_session(&store, "taro@example.com").await;
        store
            .save_profile(
                user_id,
                json!({
                    "content": {
                        "yourName": "山田",
                        "hobby": "読書, 映画",
                        "questions": "Q1. Test question?\n\nA1. Test answer."
                    }
                }),
            )
            .await
            .unwrap();

        let resp = send(
            build_router(state),
            bare_request("GET", "/api/profile", Some(&token)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["templateId"], "first");
        assert_eq!(body["content"]["hobby"], json!(["読書", "映画"]));
        assert_eq!(
            body["content"]["questions"],
            json!([{ "id": "1", "question": "Test question?", "answer": "Test answer." }])
        );
    }

    #[tokio::test]
    async fn test_list_templates() {
        let (state, _) = test_state(None);
        let resp = send(build_router(state), bare_request("GET", "/api/templates", None)).await;
        let body = body_json(resp).await;
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 7);
        assert_eq!(list[3]["key"], "forth");
        assert_eq!(list[0]["cssPath"], "css/pattern1.css");
        assert!(list.iter().all(|t| t["available"] == true));
    }

    #[tokio::test]
    async fn test_download_zip_contains_site_files_and_images() {
        let (state, _) = test_state(None);
        let req = multipart_request(
            "/api/download/zip",
            None,
            &document("second"),
            Some(("photo.png", b"\x89PNG-bytes")),
        );
        let resp = send(build_router(state), req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/zip");
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"portfolio-site.zip\""
        );

        let data = body_bytes(resp).await;
        let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "img/english-icon.png",
                "img/logo.png",
                "img/photo.png",
                "index.html",
                "script.js",
                "style.css"
            ]
        );

        let mut css = String::new();
        archive.by_name("style.css").unwrap().read_to_string(&mut css).unwrap();
        assert_eq!(css, "/* second */");

        let mut html = String::new();
        archive.by_name("index.html").unwrap().read_to_string(&mut html).unwrap();
        assert!(html.contains(r#"src="img/photo.png""#));
    }

    #[tokio::test]
    async fn test_download_html_is_self_contained() {
        let (state, _) = test_state(None);
        let req = multipart_request(
            "/api/download/html",
            None,
            &document("first"),
            Some(("photo.png", b"abc")),
        );
        let resp = send(build_router(state), req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"portfolio.html\""
        );

        let html = String::from_utf8(body_bytes(resp).await).unwrap();
        assert!(html.contains("<style>\n/* first */\n</style>"));
        assert!(html.contains("data:image/png;base64,YWJj"));
        assert!(!html.contains(r#"src="img/"#));
        assert!(!html.contains(r#"href="style.css""#));
    }

    #[tokio::test]
    async fn test_download_rejects_unsafe_image_name() {
        let (state, _) = test_state(None);
        let req = multipart_request(
            "/api/download/zip",
            None,
            &document("first"),
            Some(("x\" onerror=\"alert(1).png", b"abc")),
        );
        let resp = send(build_router(state), req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_download_rejects_oversized_image() {
        let (state, _) = test_state(None);
        let big = vec![0u8; 2048];
        let req = multipart_request("/api/download/zip", None, &document("first"), Some(("big.png", &big)));
        let resp = send(build_router(state), req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_body_over_limit_is_payload_too_large() {
        let (state, _) = test_state(None);
        let huge = vec![0u8; 1024 + BODY_OVERHEAD_BYTES + 10];
        let req = multipart_request("/api/download/zip", None, &document("first"), Some(("huge.png", &huge)));
        let resp = send(build_router(state), req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_logout_keeps_preview_for_other_live_session() {
        let (state, store) = test_state(None);
        let (user, first) = seed_session(&store, "taro@example.com").await;
        let second = new_token();
        store
            .create_session(user, &hash_token(&second), chrono::Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();
        let previews = state.previews.clone();
        let app = build_router(state);

        let req = multipart_request("/api/preview", Some(&first), &document("first"), None);
        assert_eq!(send(app.clone(), req).await.status(), StatusCode::OK);

        let resp = send(app.clone(), bare_request("POST", "/api/auth/logout", Some(&first))).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let resp = send(app.clone(), bare_request("GET", "/api/preview", Some(&second))).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = send(app, bare_request("POST", "/api/auth/logout", Some(&second))).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(previews.len().await, 0);
    }

    #[tokio::test]
    async fn test_download_rejects_unknown_template() {
        let (state, _) = test_state(None);
        let req = multipart_request("/api/download/zip", None, &document("sixth"), None);
        let resp = send(build_router(state), req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preview_replaces_previous_and_is_private() {
        let (state, store) = test_state(None);
        let (_, token) = seed_session(&store, "taro@example.com").await;
        let (_, other) = seed_session(&store, "hanako@example.com").await;
        let previews = state.previews.clone();
        let app = build_router(state);

        for template in ["first", "simple"] {
            let req = multipart_request("/api/preview", Some(&token), &document(template), None);
            let resp = send(app.clone(), req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
        assert_eq!(previews.len().await, 1);

        let resp = send(app.clone(), bare_request("GET", "/api/preview", Some(&token))).await;
        let html = String::from_utf8(body_bytes(resp).await).unwrap();
        assert!(html.contains("/* simple */"));
        assert!(html.contains("faq-section"));

        let resp = send(app.clone(), bare_request("GET", "/api/preview", Some(&other))).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = multipart_request("/api/preview", None, &document("first"), None);
        let resp = send(app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_proofread_endpoint() {
        let (state, _) = test_state(Some(FakeGenerator::replying("校正済みの文章です。\n")));
        let resp = send(
            build_router(state),
            json_request("POST", "/api/proofread", None, json!({ "text": "校正前の文章" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            json!({ "correctedText": "校正済みの文章です。" })
        );
    }

    #[tokio::test]
    async fn test_proofread_blank_text_is_bad_request() {
        let (state, _) = test_state(Some(FakeGenerator::replying("unused")));
        let resp = send(
            build_router(state),
            json_request("POST", "/api/proofread", None, json!({ "text": "  " })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_combined_endpoint_dispatches_on_field() {
        let (state, _) = test_state(Some(FakeGenerator::replying(
            "強みを活かした経験は？\n2. 番号付き？",
        )));
        let app = build_router(state);

        let resp = send(
            app.clone(),
            json_request("POST", "/api", None, json!({ "selfPR": "粘り強さが強みです" })),
        )
        .await;
        assert_eq!(
            body_json(resp).await,
            json!({ "questions": ["強みを活かした経験は？"] })
        );

        let both = json!({ "text": "", "selfPR": "粘り強さが強みです" });
        let resp = send(app.clone(), json_request("POST", "/api", None, both)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_json(resp).await.get("questions").is_some());

        let resp = send(app, json_request("POST", "/api", None, json!({}))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assist_unavailable_without_generator() {
        let (state, _) = test_state(None);
        let resp = send(
            build_router(state),
            json_request("POST", "/api/questions", None, json!({ "selfPR": "自己PR" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let (state, _) = test_state(Some(FakeGenerator::failing(|| LlmError::EmptyContent)));
        let resp = send(
            build_router(state),
            json_request("POST", "/api/proofread", None, json!({ "text": "文章" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(resp).await["error"]["code"], "UPSTREAM_ERROR");
    }
}
