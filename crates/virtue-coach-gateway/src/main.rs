//! Virtue Coach Gateway: recommendation and synthesis endpoints over the core coaching pipeline.
//! Permissive CORS, JSON in and out, one shared generation client for the process lifetime.

mod api_error;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use virtue_coach_core::{
    parse_recommendation_request, parse_synthesis_request, CoachConfig, CoachService, LlmMode,
};

use crate::api_error::ApiError;

#[derive(Clone)]
struct AppState {
    coach: CoachService,
    /// Include internal error detail in 500 bodies.
    development: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[virtue-coach-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match CoachConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "[GATEWAY] Failed to load configuration");
            std::process::exit(1);
        }
    };

    if config.llm_mode() == LlmMode::Live && config.resolved_api_key().is_none() {
        tracing::warn!(
            "[GATEWAY] Live mode without GEMINI_API_KEY: every request will be answered with fallback text"
        );
    }
    if config.llm_mode() == LlmMode::Mock && !config.is_development() {
        tracing::warn!(
            environment = %config.environment,
            "[GATEWAY] Mock mode outside development: replies are placeholders (set COACH_LLM_MODE=live)"
        );
    }
    tracing::info!(
        app = %config.app_name,
        version = virtue_coach_core::version(),
        llm_mode = ?config.llm_mode(),
        environment = %config.environment,
        recommendation_models = ?config.recommendation_models,
        synthesis_models = ?config.synthesis_models,
        "[GATEWAY] Starting"
    );

    let state = Arc::new(AppState {
        coach: CoachService::from_config(&config),
        development: config.is_development(),
    });
    let app = build_app(state);

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "[GATEWAY] Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %addr, "[GATEWAY] Listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "[GATEWAY] Server error");
        std::process::exit(1);
    }
}

fn build_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/generate-recommendation",
            post(recommendation_handler).options(preflight),
        )
        .route(
            "/api/generate-synthesis",
            post(synthesis_handler).options(preflight),
        )
        .with_state(state)
        .layer(cors)
        .layer(axum::middleware::from_fn(log_coach_traffic))
}

async fn log_coach_traffic(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "[GATEWAY] Request handled"
    );
    response
}

async fn health() -> &'static str {
    "OK"
}

/// Plain `OPTIONS` without CORS request headers; real preflights are answered by the CORS layer.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// POST /api/generate-recommendation → `{ prompt, model, success }`.
///
/// The pipeline runs on its own task so a dropped client connection does not cancel
/// in-flight model calls.
async fn recommendation_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = parse_recommendation_request(&body)?;
    let coach = state.coach.clone();
    let payload = tokio::spawn(async move { coach.recommend(&request).await })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "[GATEWAY] Recommendation task failed");
            ApiError::internal(
                "Failed to generate recommendation",
                e.to_string(),
                state.development,
            )
        })?;

    Ok(Json(serde_json::json!({
        "prompt": payload.text,
        "model": payload.model_used,
        "success": payload.success,
    })))
}

/// POST /api/generate-synthesis → `{ summary, model, success }`.
async fn synthesis_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = parse_synthesis_request(&body)?;
    let coach = state.coach.clone();
    let payload = tokio::spawn(async move { coach.synthesize(&request).await })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "[GATEWAY] Synthesis task failed");
            ApiError::internal("Failed to generate synthesis", e.to_string(), state.development)
        })?;

    Ok(Json(serde_json::json!({
        "summary": payload.text,
        "model": payload.model_used,
        "success": payload.success,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tower::ServiceExt;
    use virtue_coach_core::{
        GenerationClient, GenerationError, GenerationOptions, GenerationResponse,
        MockGenerationClient,
    };

    #[derive(Default)]
    struct FailingClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerationClient for FailingClient {
        async fn generate(
            &self,
            _prompt: &str,
            _model_id: &str,
            _options: &GenerationOptions,
        ) -> Result<GenerationResponse, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GenerationError::EmptyCandidates)
        }
    }

    struct PanickingClient;

    #[async_trait]
    impl GenerationClient for PanickingClient {
        async fn generate(
            &self,
            _prompt: &str,
            _model_id: &str,
            _options: &GenerationOptions,
        ) -> Result<GenerationResponse, GenerationError> {
            panic!("generation client bug");
        }
    }

    fn test_app(client: Arc<dyn GenerationClient>, development: bool) -> Router {
        let coach = CoachService::new(
            client,
            vec!["m1".to_string(), "m2".to_string()],
            vec!["s1".to_string(), "s2".to_string()],
            Duration::from_secs(1),
        );
        build_app(Arc::new(AppState { coach, development }))
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(Arc::new(MockGenerationClient), false);
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_recommendation_with_mock_model() {
        let app = test_app(Arc::new(MockGenerationClient), false);
        let (status, json) = post_json(
            app,
            "/api/generate-recommendation",
            r#"{"prioritizedVirtues":[{"virtue":"Honesty","defectIntensity":8}],"isFirstTime":false}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["model"], "mock:m1");
        assert_eq!(json["success"], true);
        assert!(json["prompt"].as_str().unwrap().contains("m1"));
    }

    #[tokio::test]
    async fn test_recommendation_fallback_when_all_models_fail() {
        let client = Arc::new(FailingClient::default());
        let app = test_app(client.clone(), false);
        let (status, json) = post_json(
            app,
            "/api/generate-recommendation",
            r#"{"prioritizedVirtues":[{"virtue":"Honesty","defectIntensity":8}],"isFirstTime":true}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["model"], "fallback");
        assert_eq!(json["success"], true);
        let text = json["prompt"].as_str().unwrap();
        assert!(text.contains("Honesty"));
        assert!(text.contains("Dismantling"));
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_synthesis_fallback_names_top_two_virtues() {
        let app = test_app(Arc::new(FailingClient::default()), false);
        let (status, json) = post_json(
            app,
            "/api/generate-synthesis",
            r#"{"analyses":[{"virtue":"Honesty","analysis":"Noticed small lies."}],
                "prioritizedVirtues":[{"virtue":"Honesty"},{"virtue":"Patience"}]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["model"], "fallback");
        let summary = json["summary"].as_str().unwrap();
        assert!(summary.contains("Honesty"));
        assert!(summary.contains("Patience"));
    }

    #[tokio::test]
    async fn test_synthesis_rejects_non_array_analyses() {
        let client = Arc::new(FailingClient::default());
        let app = test_app(client.clone(), false);
        let (status, json) = post_json(
            app,
            "/api/generate-synthesis",
            r#"{"analyses":{"virtue":"Honesty"},"prioritizedVirtues":[]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "analyses must be an array");
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_bad_request() {
        let app = test_app(Arc::new(MockGenerationClient), false);
        let (status, json) =
            post_json(app, "/api/generate-recommendation", "{\"prioritizedVirtues\":").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_cors_preflight_short_circuits() {
        let app = test_app(Arc::new(FailingClient::default()), false);
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/generate-recommendation")
            .header("origin", "https://example.com")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_plain_options_returns_empty_ok() {
        let app = test_app(Arc::new(FailingClient::default()), false);
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/generate-synthesis")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let app = test_app(Arc::new(MockGenerationClient), false);
        let req = Request::builder()
            .method("GET")
            .uri("/api/generate-recommendation")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_internal_error_hides_details_in_production() {
        let app = test_app(Arc::new(PanickingClient), false);
        let (status, json) = post_json(
            app,
            "/api/generate-recommendation",
            r#"{"prioritizedVirtues":[]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to generate recommendation");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_includes_details_in_development() {
        let app = test_app(Arc::new(PanickingClient), true);
        let (status, json) = post_json(
            app,
            "/api/generate-synthesis",
            r#"{"analyses":[],"prioritizedVirtues":[]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to generate synthesis");
        assert!(json["details"].as_str().is_some());
    }
}
