//! The per-turn chat engine.
//!
//! Drives one guest turn end to end: session resolution, context
//! classification, retrieval, prompt assembly, the bounded tool-use loop,
//! the escalation decision, and transcript persistence.
//!
//! Failure policy per collaborator:
//! - session store down → log, continue without a durable identity
//! - embeddings down → retrieval degrades to no context
//! - web search down → neutral "No results found." tool result
//! - model down → the turn fails (`ModelUnavailable`), nothing is persisted

use crate::classify;
use crate::escalation;
use crate::messages;
use crate::prompt::PromptAssembler;
use innkeep_core::error::{Error, ProviderError};
use innkeep_core::knowledge::RetrievalResult;
use innkeep_core::message::{Message, Role};
use innkeep_core::provider::ProviderRequest;
use innkeep_core::session::{Apartment, SessionStore};
use innkeep_core::tool::ToolCall;
use innkeep_core::{Language, Provider, ToolRegistry};
use innkeep_knowledge::RetrievalEngine;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Neutral tool result used when a live lookup fails; the loop must not
/// fail because the web did.
pub const EMPTY_TOOL_RESULT: &str = "No results found.";

/// One inbound guest turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub message: String,
    /// Existing session, if the UI has one
    pub session_id: Option<String>,
    /// The UI's view of the conversation so far
    pub history: Vec<HistoryEntry>,
    /// Initial UI locale tag (e.g. "de")
    pub locale: String,
}

/// One prior exchange message as replayed by the UI.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// The completed turn.
#[derive(Debug, Clone)]
pub struct TurnResponse {
    pub answer_text: String,
    /// Empty when session persistence was unavailable for the whole turn
    pub session_id: String,
    pub confidence: f32,
    pub should_escalate: bool,
    pub detected_language: Language,
}

/// Tunables for the orchestrator.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Maximum tool-invocation rounds per turn
    pub max_tool_rounds: u32,
    /// Total wall-clock budget per turn
    pub turn_timeout: Duration,
    /// How many history messages are replayed to the model
    pub history_window: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".into(),
            temperature: 0.7,
            max_tokens: 1024,
            max_tool_rounds: 3,
            turn_timeout: Duration::from_secs(60),
            history_window: 10,
        }
    }
}

/// The conversation engine. One instance serves all sessions; per-turn
/// state lives on the stack of `handle_turn`.
pub struct ChatEngine {
    provider: Arc<dyn Provider>,
    retrieval: RetrievalEngine,
    sessions: Arc<dyn SessionStore>,
    tools: ToolRegistry,
    assembler: PromptAssembler,
    settings: EngineSettings,
}

impl ChatEngine {
    pub fn new(
        provider: Arc<dyn Provider>,
        retrieval: RetrievalEngine,
        sessions: Arc<dyn SessionStore>,
        tools: ToolRegistry,
        assembler: PromptAssembler,
        settings: EngineSettings,
    ) -> Self {
        Self {
            provider,
            retrieval,
            sessions,
            tools,
            assembler,
            settings,
        }
    }

    /// The first assistant bubble for a new conversation.
    pub fn welcome_message(&self, locale: &str) -> &'static str {
        messages::welcome_message(Language::from_tag(locale))
    }

    /// Localized "best to contact the host" text for the escalation UI.
    pub fn host_contact_message(&self, language: Language) -> &'static str {
        messages::host_contact_message(language)
    }

    /// Handle one guest turn.
    pub async fn handle_turn(&self, request: TurnRequest) -> Result<TurnResponse, Error> {
        let (session_id, mut known_apartment) = self.resolve_session(&request).await;

        // Sticky apartment: only the first detection for a session counts.
        if known_apartment.is_none() {
            if let Some(detected) = classify::detect_apartment(&request.message) {
                known_apartment = self
                    .record_apartment(session_id.as_deref(), detected)
                    .await;
            }
        }

        let language = classify::detect_language(&request.message);
        let retrieval = self.retrieval.retrieve(&request.message).await;
        let confidence = retrieval.confidence;

        let answer_text = tokio::time::timeout(
            self.settings.turn_timeout,
            self.run_tool_loop(&request, language, &retrieval, known_apartment),
        )
        .await
        .map_err(|_| {
            warn!("turn exceeded wall-clock budget");
            Error::ModelUnavailable(ProviderError::Timeout("turn timed out".into()))
        })??;

        let should_escalate =
            escalation::should_escalate(confidence, &request.message, &answer_text);

        self.persist_exchange(session_id.as_deref(), &request.message, &answer_text)
            .await;

        info!(
            session = session_id.as_deref().unwrap_or("<none>"),
            language = %language,
            confidence,
            should_escalate,
            "turn complete"
        );

        Ok(TurnResponse {
            answer_text,
            session_id: session_id.unwrap_or_default(),
            confidence,
            should_escalate,
            detected_language: language,
        })
    }

    /// Look up or create the session. Persistence failures are logged and
    /// the turn continues without a durable identity.
    async fn resolve_session(&self, request: &TurnRequest) -> (Option<String>, Option<Apartment>) {
        match &request.session_id {
            Some(id) => match self.sessions.get_session(id).await {
                Ok(Some(session)) => (Some(session.id), session.apartment),
                Ok(None) => {
                    warn!(session = %id, "unknown session id; continuing without one");
                    (None, None)
                }
                Err(e) => {
                    warn!(error = %e, "session lookup failed; continuing without identity");
                    (None, None)
                }
            },
            None => match self.sessions.create_session(&request.locale).await {
                Ok(session) => (Some(session.id), None),
                Err(e) => {
                    warn!(error = %e, "session creation failed; continuing without identity");
                    (None, None)
                }
            },
        }
    }

    /// Record a detected apartment, first-write-wins. Returns the apartment
    /// that is authoritative for the session after the write.
    async fn record_apartment(
        &self,
        session_id: Option<&str>,
        detected: Apartment,
    ) -> Option<Apartment> {
        let Some(id) = session_id else {
            // No durable session this turn; use the detection locally.
            return Some(detected);
        };

        match self.sessions.record_apartment(id, detected).await {
            Ok(true) => {
                debug!(session = %id, apartment = %detected, "apartment recorded");
                Some(detected)
            }
            Ok(false) => {
                // Lost a race; re-read the authoritative value.
                match self.sessions.get_session(id).await {
                    Ok(Some(session)) => session.apartment,
                    _ => Some(detected),
                }
            }
            Err(e) => {
                warn!(error = %e, "apartment write failed; using detection for this turn");
                Some(detected)
            }
        }
    }

    /// The bounded tool-use loop. Returns the final answer text; never
    /// empty when it returns `Ok`.
    async fn run_tool_loop(
        &self,
        request: &TurnRequest,
        language: Language,
        retrieval: &RetrievalResult,
        apartment: Option<Apartment>,
    ) -> Result<String, Error> {
        let tool_definitions = self.tools.definitions();
        let system_prompt =
            self.assembler
                .build(language, retrieval, apartment, !tool_definitions.is_empty());

        let mut conversation: Vec<Message> = Vec::new();
        conversation.push(Message::system(system_prompt));

        let window_start = request
            .history
            .len()
            .saturating_sub(self.settings.history_window);
        for entry in &request.history[window_start..] {
            conversation.push(match entry.role {
                Role::Assistant => Message::assistant(entry.content.clone()),
                _ => Message::user(entry.content.clone()),
            });
        }
        conversation.push(Message::user(request.message.clone()));

        let mut last_text = String::new();

        for round in 0..self.settings.max_tool_rounds {
            let response = self
                .provider
                .complete(ProviderRequest {
                    model: self.settings.model.clone(),
                    messages: conversation.clone(),
                    temperature: self.settings.temperature,
                    max_tokens: Some(self.settings.max_tokens),
                    tools: tool_definitions.clone(),
                })
                .await
                .map_err(Error::ModelUnavailable)?;

            let assistant = response.message;
            if !assistant.content.is_empty() {
                last_text = assistant.content.clone();
            }

            if assistant.tool_calls.is_empty() {
                debug!(round, "model produced final answer");
                return Ok(self.final_answer(last_text, language));
            }

            debug!(round, calls = assistant.tool_calls.len(), "model requested tools");
            let tool_calls = assistant.tool_calls.clone();
            conversation.push(assistant);

            for call in tool_calls {
                let arguments: serde_json::Value =
                    serde_json::from_str(&call.arguments).unwrap_or_default();
                let result = self
                    .tools
                    .execute(&ToolCall {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        arguments,
                    })
                    .await;

                let output = match result {
                    Ok(r) => r.output,
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "tool failed; using empty result");
                        EMPTY_TOOL_RESULT.to_string()
                    }
                };
                conversation.push(Message::tool_result(call.id, output));
            }
        }

        // Round limit reached; forced termination with the best available text.
        warn!(
            rounds = self.settings.max_tool_rounds,
            "tool round limit reached; forcing termination"
        );
        Ok(self.final_answer(last_text, language))
    }

    fn final_answer(&self, text: String, language: Language) -> String {
        if text.trim().is_empty() {
            messages::fallback_answer(language).to_string()
        } else {
            text
        }
    }

    /// Persist the user/assistant exchange. Failures are logged only.
    async fn persist_exchange(&self, session_id: Option<&str>, user: &str, assistant: &str) {
        let Some(id) = session_id else { return };

        if let Err(e) = self.sessions.append_message(id, Role::User, user).await {
            warn!(error = %e, "failed to persist user message");
        }
        if let Err(e) = self
            .sessions
            .append_message(id, Role::Assistant, assistant)
            .await
        {
            warn!(error = %e, "failed to persist assistant message");
        }
    }
}
