//! HTTP API gateway for Innkeep.
//!
//! Exposes the guest-facing chat endpoint, the explicit handoff endpoint,
//! and a health check. Built on Axum.
//!
//! Error surface: the only fatal turn error is an unavailable model, which
//! maps to 503 with a localized apology the UI can display verbatim. Every
//! other collaborator failure is absorbed inside the engine and never
//! reaches an HTTP status.

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use innkeep_core::message::Role;
use innkeep_core::notify::{HandoffNotice, Notifier};
use innkeep_core::session::Apartment;
use innkeep_core::Language;
use innkeep_engine::{ChatEngine, HistoryEntry, TurnRequest};

/// Request body size limit. Guest messages are short; anything close to
/// this limit is abuse.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub engine: Arc<ChatEngine>,
    pub notifier: Arc<dyn Notifier>,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers: body limit, restrictive CORS, HTTP trace logging.
pub fn build_router(state: SharedState, allowed_origin: Option<&str>) -> Router {
    let cors = match allowed_origin.and_then(|o| o.parse().ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(tower_http::cors::AllowOrigin::exact(origin))
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE]),
        None => CorsLayer::new(),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/chat", post(chat_handler))
        .route("/v1/handoff", post(handoff_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn serve(
    state: SharedState,
    host: &str,
    port: u16,
    allowed_origin: Option<&str>,
) -> std::io::Result<()> {
    let addr = format!("{host}:{port}");
    let app = build_router(state, allowed_origin);

    info!(addr = %addr, "gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    notifier: String,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        notifier: state.notifier.name().to_string(),
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    /// The guest's message
    message: String,
    /// Existing session (omit on the first turn)
    #[serde(default)]
    session_id: Option<String>,
    /// The UI's view of the conversation so far
    #[serde(default)]
    conversation_history: Vec<HistoryEntryDto>,
    /// UI locale tag, e.g. "de"
    #[serde(default = "default_locale")]
    locale: String,
}

fn default_locale() -> String {
    "de".into()
}

#[derive(Deserialize)]
struct HistoryEntryDto {
    role: Role,
    content: String,
}

#[derive(Serialize)]
struct ChatResponse {
    answer_text: String,
    session_id: String,
    confidence: f32,
    should_escalate: bool,
    detected_language: String,
}

#[derive(Serialize)]
struct ApologyResponse {
    error: &'static str,
    message: &'static str,
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ApologyResponse>)> {
    if payload.message.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApologyResponse {
                error: "empty_message",
                message: "message must not be empty",
            }),
        ));
    }

    let ui_language = Language::from_tag(&payload.locale);
    let request = TurnRequest {
        message: payload.message,
        session_id: payload.session_id,
        history: payload
            .conversation_history
            .into_iter()
            .map(|e| HistoryEntry {
                role: e.role,
                content: e.content,
            })
            .collect(),
        locale: payload.locale,
    };

    match state.engine.handle_turn(request).await {
        Ok(turn) => Ok(Json(ChatResponse {
            answer_text: turn.answer_text,
            session_id: turn.session_id,
            confidence: turn.confidence,
            should_escalate: turn.should_escalate,
            detected_language: turn.detected_language.tag().to_string(),
        })),
        Err(e) => {
            error!(error = %e, "chat turn failed");
            // Localized from the UI locale; the turn never got far enough
            // for message-based language detection to matter.
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApologyResponse {
                    error: "model_unavailable",
                    message: innkeep_engine::service_apology(ui_language),
                }),
            ))
        }
    }
}

#[derive(Deserialize)]
struct HandoffRequest {
    guest_name: String,
    #[serde(default)]
    guest_contact: Option<String>,
    question: String,
    #[serde(default)]
    apartment: Option<Apartment>,
    #[serde(default)]
    summary: Option<String>,
    /// UI locale tag for the confirmation text
    #[serde(default = "default_locale")]
    locale: String,
}

#[derive(Serialize)]
struct HandoffResponse {
    delivered: bool,
    message: &'static str,
}

async fn handoff_handler(
    State(state): State<SharedState>,
    Json(payload): Json<HandoffRequest>,
) -> Result<Json<HandoffResponse>, StatusCode> {
    if payload.guest_name.trim().is_empty() || payload.question.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let notice = HandoffNotice {
        guest_name: payload.guest_name,
        guest_contact: payload.guest_contact,
        question: payload.question,
        apartment: payload.apartment,
        summary: payload.summary,
    };

    match state.notifier.notify(&notice).await {
        Ok(()) => {
            let language = Language::from_tag(&payload.locale);
            Ok(Json(HandoffResponse {
                delivered: true,
                message: innkeep_engine::host_contact_message(language),
            }))
        }
        Err(e) => {
            error!(error = %e, "handoff delivery failed");
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use innkeep_core::error::{NotifyError, ProviderError};
    use innkeep_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use innkeep_core::tool::ToolRegistry;
    use innkeep_core::Message;
    use innkeep_engine::{EngineSettings, PromptAssembler};
    use innkeep_knowledge::{InMemoryKnowledgeStore, RetrievalEngine};
    use innkeep_session::InMemorySessionStore;
    use tower::ServiceExt;

    struct StubProvider {
        fail: bool,
    }

    #[async_trait]
    impl Provider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            if self.fail {
                return Err(ProviderError::Network("connection refused".into()));
            }
            Ok(ProviderResponse {
                message: Message::assistant("Check-in is at 4 PM."),
                usage: None,
                model: "stub".into(),
            })
        }
    }

    struct RecordingNotifier {
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        async fn notify(&self, _notice: &HandoffNotice) -> Result<(), NotifyError> {
            if self.fail {
                Err(NotifyError::DeliveryFailed("gateway 500".into()))
            } else {
                Ok(())
            }
        }
    }

    fn test_router(provider_fails: bool, notifier_fails: bool) -> Router {
        let provider = Arc::new(StubProvider {
            fail: provider_fails,
        });
        let retrieval = RetrievalEngine::new(
            provider.clone(),
            Arc::new(InMemoryKnowledgeStore::new()),
            "fake",
            5,
            0.3,
        );
        let engine = ChatEngine::new(
            provider,
            retrieval,
            Arc::new(InMemorySessionStore::new()),
            ToolRegistry::new(),
            PromptAssembler::new("Lakeside Guesthouse", "Interlaken, Switzerland"),
            EngineSettings::default(),
        );
        let state = Arc::new(GatewayState {
            engine: Arc::new(engine),
            notifier: Arc::new(RecordingNotifier {
                fail: notifier_fails,
            }),
        });
        build_router(state, Some("http://localhost:3000"))
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = test_router(false, false);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn chat_turn_round_trip() {
        let app = test_router(false, false);
        let response = app
            .oneshot(json_request(
                "/v1/chat",
                serde_json::json!({ "message": "when is check-in?", "locale": "en" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["answer_text"], "Check-in is at 4 PM.");
        assert!(!body["session_id"].as_str().unwrap().is_empty());
        assert_eq!(body["detected_language"], "en");
    }

    #[tokio::test]
    async fn model_outage_maps_to_503_with_apology() {
        let app = test_router(true, false);
        let response = app
            .oneshot(json_request(
                "/v1/chat",
                serde_json::json!({ "message": "hello there, quick question" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["error"], "model_unavailable");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let app = test_router(false, false);
        let response = app
            .oneshot(json_request(
                "/v1/chat",
                serde_json::json!({ "message": "   " }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn handoff_delivery_confirms() {
        let app = test_router(false, false);
        let response = app
            .oneshot(json_request(
                "/v1/handoff",
                serde_json::json!({
                    "guest_name": "Ana",
                    "question": "Can we check out at noon?",
                    "apartment": "UNIT3",
                    "locale": "fr"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["delivered"], true);
        assert!(body["message"].as_str().unwrap().contains("hôte"));
    }

    #[tokio::test]
    async fn handoff_failure_maps_to_502() {
        let app = test_router(false, true);
        let response = app
            .oneshot(json_request(
                "/v1/handoff",
                serde_json::json!({ "guest_name": "Ana", "question": "Late check-out?" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn handoff_requires_name_and_question() {
        let app = test_router(false, false);
        let response = app
            .oneshot(json_request(
                "/v1/handoff",
                serde_json::json!({ "guest_name": "", "question": "x" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
