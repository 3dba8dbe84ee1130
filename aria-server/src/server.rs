use std::net::SocketAddr;
use std::path::Path;

use aria_core::config::ServerConfig;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::handlers::{chat_handler, health_handler};
use crate::state::AppState;

/// Build the application router
///
/// `GET /` serves `index.html` from `static_dir`; any path without a route
/// is looked up in the same directory.
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let static_dir = static_dir.as_ref();

    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(
    state: AppState,
    config: &ServerConfig,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let app = build_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!("Aria AI Brain running on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown_rx.recv().await;
        tracing::info!("Server shutting down signal received");
    })
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aria_agent::{CompletionGateway, ContextBuilder, GatewaySettings, FALLBACK_REPLY};
    use aria_core::clock::ManualClock;
    use aria_core::conversation::{ConversationStore, SweepService};
    use aria_providers::{
        GenerationParams, LLMProvider, LLMResponse, Message, ProviderError, ProviderResult, Usage,
    };
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Echoes the last user turn, or fails every call
    struct EchoProvider {
        fail: bool,
    }

    #[async_trait]
    impl LLMProvider for EchoProvider {
        async fn chat(
            &self,
            messages: Vec<Message>,
            _model: Option<String>,
            _params: GenerationParams,
        ) -> ProviderResult<LLMResponse> {
            if self.fail {
                return Err(ProviderError::ApiError {
                    status: 503,
                    body: "overloaded".to_string(),
                });
            }
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(LLMResponse {
                content: format!("echo: {}", last),
                finish_reason: "stop".to_string(),
                usage: Usage::default(),
            })
        }

        fn get_default_model(&self) -> String {
            "echo".to_string()
        }
    }

    fn state(fail: bool) -> AppState {
        let store = Arc::new(ConversationStore::default());
        let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
        let gateway = CompletionGateway::new(
            Arc::clone(&store),
            Arc::new(EchoProvider { fail }),
            clock.clone(),
            ContextBuilder::default(),
            GatewaySettings::default(),
        );
        let sweeper = SweepService::new(store, clock, std::time::Duration::from_secs(3600));
        AppState::new(Arc::new(gateway), Arc::new(sweeper), false)
    }

    fn app(state: AppState, static_dir: &Path) -> Router {
        build_router(state, static_dir).layer(MockConnectInfo(SocketAddr::from((
            [10, 0, 0, 5],
            40000,
        ))))
    }

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_chat_success() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(false);
        let response = app(state.clone(), dir.path())
            .oneshot(chat_request(r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["reply"], "echo: hello");

        let history = state.gateway.store().recent("10.0.0.5", 10);
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_chat_records_message_as_sent() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(false);
        let response = app(state.clone(), dir.path())
            .oneshot(chat_request(r#"{"message":"  flights to Sydney?\n"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let history = state.gateway.store().recent("10.0.0.5", 10);
        assert_eq!(history[0].content, "  flights to Sydney?\n");
        assert_eq!(history[1].content, "echo:   flights to Sydney?\n");
    }

    #[tokio::test]
    async fn test_chat_failure_returns_fallback_with_500() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(true);
        let response = app(state.clone(), dir.path())
            .oneshot(chat_request(r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["reply"], FALLBACK_REPLY);
        assert_eq!(state.gateway.store().recent("10.0.0.5", 10).len(), 1);
    }

    #[tokio::test]
    async fn test_chat_missing_message_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(false);

        for body in [r#"{}"#, r#"{"message":"   "}"#] {
            let response = app(state.clone(), dir.path())
                .oneshot(chat_request(body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = json_body(response).await;
            assert_eq!(body["error"], "Message is required");
        }
        assert_eq!(state.gateway.store().size(), 0);
    }

    #[tokio::test]
    async fn test_health_reports_conversation_count() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(false);
        state.gateway.respond("a", "hi").await;
        state.gateway.respond("b", "hi").await;

        let response = app(state, dir.path())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "OK");
        assert_eq!(body["brain"], "Active");
        assert_eq!(body["conversations"], 2);
        assert_eq!(body["memory"], "Optimized");
        assert_eq!(body["message"], "AI Brain is fully operational");
        assert_eq!(body["sweeper"]["running"], false);
        assert_eq!(body["sweeper"]["retention_h"], 24);
        assert_eq!(body["sweeper"]["active_conversations"], 2);
    }

    #[tokio::test]
    async fn test_static_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Aria</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log('aria');").unwrap();

        let response = app(state(false), dir.path())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"<h1>Aria</h1>");

        let response = app(state(false), dir.path())
            .oneshot(Request::get("/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(state(false), dir.path())
            .oneshot(Request::get("/missing.css").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_server_stops_on_shutdown_signal() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: dir.path().to_string_lossy().to_string(),
            trust_forwarded_for: false,
        };
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(async move { run_server(state(false), &config, shutdown_rx).await });
        shutdown_tx.send(()).unwrap();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
