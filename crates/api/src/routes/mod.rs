//! Route table for the relay.

pub mod auth;
pub mod chat;
pub mod health;
pub mod instructions;
pub mod memory;

use std::path::Path;

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::auth::require_admin;
use crate::session::ensure_session;
use crate::state::AppState;

/// Build the API router with all routes.
pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/chat/default-model", post(chat::update_default_model))
        .route("/api/instructions/all", get(instructions::list_all))
        .route("/api/instructions/debug", get(instructions::debug))
        .route("/api/instructions/add-hidden", post(instructions::add_hidden))
        .route(
            "/api/instructions/init-hardcoded",
            post(instructions::init_hardcoded),
        )
        .route("/api/instructions/reset-all", post(instructions::reset_all))
        .route(
            "/api/instructions/:id/toggle-visibility",
            post(instructions::toggle_visibility),
        )
        .route("/api/instructions/:id", delete(instructions::delete))
        .route("/api/auth/check", get(auth::check))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let public = Router::new()
        // Chat
        .route("/api/chat", post(chat::complete))
        .route("/api/chat/", post(chat::complete))
        .route("/api/chat/save-key", post(chat::save_key))
        .route(
            "/api/chat/model",
            get(chat::current_model).post(chat::update_model),
        )
        .route("/api/chat/debug/models", get(chat::debug_models))
        // Memory facts
        .route("/api/memory", get(memory::list).post(memory::create))
        .route("/api/memory/:id", put(memory::update).delete(memory::delete))
        // Visible instructions
        .route(
            "/api/instructions",
            get(instructions::list_visible).post(instructions::create_visible),
        )
        // Health check
        .route("/health", get(health::health));

    Router::new()
        .merge(public)
        .merge(admin)
        .layer(middleware::from_fn_with_state(state.clone(), ensure_session))
        .with_state(state)
}

/// The full application: API routes, the static front-end, CORS and tracing.
pub fn app(state: AppState, static_dir: &Path) -> Router {
    router(state)
        .route_service("/training", ServeFile::new(static_dir.join("training.html")))
        .route_service("/api_key", ServeFile::new(static_dir.join("api_key_setup.html")))
        .route_service("/admin", ServeFile::new(static_dir.join("admin.html")))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SESSION_COOKIE;
    use crate::state::{AdminCredentials, CookieSettings};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use database::{session, training_instruction, Database};
    use openrouter_client::{OpenRouterClient, OpenRouterConfig};
    use orchestrator::{ChatOrchestrator, OrchestratorConfig, FALLBACK_MODEL};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> (Router, Database) {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();

        // Unroutable upstream; tests never reach it
        let client = OpenRouterClient::new(
            OpenRouterConfig::builder()
                .api_url("http://127.0.0.1:9/api/v1")
                .build(),
        )
        .unwrap();
        let config = OrchestratorConfig {
            trial_api_key: Some("sk-trial".to_string()),
            ..OrchestratorConfig::default()
        };
        let orchestrator = ChatOrchestrator::new(client, db.clone(), db.clone(), config);

        let state = AppState::new(
            db.clone(),
            orchestrator,
            AdminCredentials {
                username: "admin".to_string(),
                password: "secret".to_string(),
            },
            CookieSettings {
                secure: false,
                max_age_days: 30,
            },
        );

        (router(state), db)
    }

    fn admin_header() -> String {
        format!("Basic {}", STANDARD.encode("admin:secret"))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn admin_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        let mut request = json_request(method, uri, body);
        request.headers_mut().insert(
            header::AUTHORIZATION,
            admin_header().parse().unwrap(),
        );
        request
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _db) = test_app().await;

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_memory_fact_routes() {
        let (app, _db) = test_app().await;

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/memory", json!({"fact_text": "  Born in Seville "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let fact = body_json(response).await;
        assert_eq!(fact["fact_text"], "Born in Seville");
        let id = fact["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/memory", json!({"fact_text": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "Missing or empty 'fact_text' in request body"
        );

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/memory/{}", id),
                json!({"fact_text": "Born in Madrid"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["fact_text"], "Born in Madrid");

        let response = app
            .clone()
            .oneshot(json_request("PUT", "/api/memory/999", json!({"fact_text": "x"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["error"],
            "Memory fact with id 999 not found"
        );

        let response = app
            .clone()
            .oneshot(json_request("DELETE", &format!("/api/memory/{}", id), json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["deleted_id"], id);

        let response = app.oneshot(get("/api/memory")).await.unwrap();
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_admin_guard() {
        let (app, _db) = test_app().await;

        let response = app.clone().oneshot(get("/api/auth/check")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(admin_request("GET", "/api/auth/check", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "authenticated"}));

        let response = app
            .oneshot(json_request("POST", "/api/instructions/reset-all", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_instruction_visibility_routes() {
        let (app, _db) = test_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/instructions",
                json!({"instructionText": "Be warm"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(admin_request(
                "POST",
                "/api/instructions/add-hidden",
                json!({"instructionText": "Never break character"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let hidden = body_json(response).await;
        assert_eq!(hidden["is_hidden"], true);
        let hidden_id = hidden["id"].as_i64().unwrap();

        let response = app.clone().oneshot(get("/api/instructions")).await.unwrap();
        let visible = body_json(response).await;
        assert_eq!(visible.as_array().unwrap().len(), 1);
        assert_eq!(visible[0]["instruction_text"], "Be warm");

        let response = app
            .clone()
            .oneshot(admin_request("GET", "/api/instructions/debug", json!({})))
            .await
            .unwrap();
        let debug = body_json(response).await;
        assert_eq!(
            debug[1],
            json!({"id": hidden_id, "text": "Never break character", "hidden": true})
        );

        let response = app
            .clone()
            .oneshot(admin_request(
                "POST",
                &format!("/api/instructions/{}/toggle-visibility", hidden_id),
                json!({"is_hidden": "no"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(admin_request(
                "POST",
                &format!("/api/instructions/{}/toggle-visibility", hidden_id),
                json!({"is_hidden": false}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["is_hidden"], false);

        let response = app
            .clone()
            .oneshot(admin_request("DELETE", "/api/instructions/999", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(admin_request(
                "DELETE",
                &format!("/api/instructions/{}", hidden_id),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_seed_routes() {
        let (app, db) = test_app().await;
        let seeds = persona_core::SEED_INSTRUCTIONS.len();

        let response = app
            .clone()
            .oneshot(admin_request("POST", "/api/instructions/init-hardcoded", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let message = body_json(response).await["message"].as_str().unwrap().to_string();
        assert_eq!(
            message,
            format!(
                "Hardcoded instruction check complete. Found 0 existing. Added {} new (as hidden). Total instructions now: {}.",
                seeds, seeds
            )
        );

        // Second run adds nothing
        let response = app
            .clone()
            .oneshot(admin_request("POST", "/api/instructions/init-hardcoded", json!({})))
            .await
            .unwrap();
        let message = body_json(response).await["message"].as_str().unwrap().to_string();
        assert!(message.contains("Added 0 new"));

        training_instruction::create_instruction(db.pool(), "custom", false)
            .await
            .unwrap();

        let response = app
            .oneshot(admin_request("POST", "/api/instructions/reset-all", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let message = body_json(response).await["message"].as_str().unwrap().to_string();
        assert!(message.starts_with(&format!("Successfully deleted {} instructions", seeds + 1)));

        let all = training_instruction::list_all(db.pool()).await.unwrap();
        assert_eq!(all.len(), seeds);
    }

    #[tokio::test]
    async fn test_chat_invalid_body_sets_cookie() {
        let (app, _db) = test_app().await;

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/chat", json!({"contents": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with(&format!("{}=", SESSION_COOKIE)));
        assert!(cookie.contains("HttpOnly"));

        let body = body_json(response).await;
        assert_eq!(body["responseText"], Value::Null);
        assert_eq!(body["imageData"], Value::Null);
        assert!(body["error"].as_str().unwrap().contains("contents"));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    async fn use_up_trial(db: &Database, session_id: &str) {
        for _ in 0..100 {
            session::increment_prompt_count(db.pool(), session_id)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_chat_trial_limit() {
        let (app, db) = test_app().await;
        let session_id = uuid::Uuid::new_v4().to_string();
        use_up_trial(&db, &session_id).await;

        let mut request = json_request(
            "POST",
            "/api/chat",
            json!({"contents": [{"role": "user", "parts": [{"text": "hi"}]}]}),
        );
        request.headers_mut().insert(
            header::COOKIE,
            format!("{}={}", SESSION_COOKIE, session_id).parse().unwrap(),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "Trial prompt limit (100) reached. Please provide your own OpenRouter API key."
        );

        let stored = session::get_session(db.pool(), &session_id).await.unwrap().unwrap();
        assert_eq!(stored.prompt_count, 100);
    }

    #[tokio::test]
    async fn test_save_key_resets_count() {
        let (app, db) = test_app().await;
        let session_id = uuid::Uuid::new_v4().to_string();
        use_up_trial(&db, &session_id).await;
        let cookie = format!("{}={}", SESSION_COOKIE, session_id);

        let mut request = json_request("POST", "/api/chat/save-key", json!({"apiKey": " sk-mine "}));
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            body_json(response).await["message"],
            "API Key saved successfully for this session."
        );

        let stored = session::get_session(db.pool(), &session_id).await.unwrap().unwrap();
        assert_eq!(stored.user_api_key.as_deref(), Some("sk-mine"));
        assert_eq!(stored.prompt_count, 0);

        let mut request = json_request("POST", "/api/chat/save-key", json!({"apiKey": ""}));
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(body_json(response).await["message"], "API key cleared");

        let stored = session::get_session(db.pool(), &session_id).await.unwrap().unwrap();
        assert!(stored.user_api_key.is_none());
    }

    #[tokio::test]
    async fn test_model_routes() {
        let (app, _db) = test_app().await;
        let session_id = uuid::Uuid::new_v4().to_string();
        let cookie = format!("{}={}", SESSION_COOKIE, session_id);

        let mut request = get("/api/chat/model");
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            body_json(response).await,
            json!({"currentModel": FALLBACK_MODEL})
        );

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/chat/model", json!({"model": "  "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Model identifier cannot be empty."})
        );

        let mut request = json_request("POST", "/api/chat/model", json!({"model": " x/y "}));
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            body_json(response).await,
            json!({"message": "Model updated successfully for this session.", "newModel": "x/y"})
        );

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/chat/default-model", json!({"model": "a/b"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(admin_request("POST", "/api/chat/default-model", json!({"model": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Global default model identifier cannot be empty."})
        );

        let response = app
            .clone()
            .oneshot(admin_request("POST", "/api/chat/default-model", json!({"model": "a/b"})))
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!({"message": "Global default model updated successfully.", "newGlobalDefaultModel": "a/b"})
        );

        // A fresh session now sees the global default
        let response = app.oneshot(get("/api/chat/model")).await.unwrap();
        assert_eq!(body_json(response).await, json!({"currentModel": "a/b"}));
    }
}
