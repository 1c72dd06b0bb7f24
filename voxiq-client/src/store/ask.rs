//! Ask (Q&A) conversation store
//!
//! Holds the append-only message history and threads the server-issued
//! conversation id: the first answered turn adopts it, every follow-up
//! attaches it so the backend keeps multi-turn context, and starting a
//! new chat clears both.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::session::Session;
use voxiq_common::api::{AskRequest, ChatMessage, ChatRole};

pub struct AskStore {
    api: Arc<ApiClient>,
    token: String,
    messages: Mutex<Vec<ChatMessage>>,
    conversation_id: Mutex<Option<String>>,
    loading: AtomicBool,
    error: Mutex<Option<String>>,
}

impl AskStore {
    pub fn new(api: Arc<ApiClient>, session: &Session) -> Self {
        Self {
            api,
            token: session.token().to_string(),
            messages: Mutex::new(Vec::new()),
            conversation_id: Mutex::new(None),
            loading: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    /// Send a question. The user turn is appended immediately; the
    /// assistant turn on success. Returns the assistant message, or
    /// `None` on failure (the error state holds the message).
    pub async fn ask(&self, question: &str) -> Option<ChatMessage> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        self.push(ChatMessage {
            id: format!("user-{}", Uuid::new_v4()),
            role: ChatRole::User,
            content: question.to_string(),
            citations: Vec::new(),
            suggested_followups: Vec::new(),
        });
        self.loading.store(true, Ordering::SeqCst);
        *self.error.lock().expect("ask error poisoned") = None;

        let request = AskRequest {
            question: question.to_string(),
            conversation_id: self.conversation_id(),
        };
        let outcome = match self.api.ask(&self.token, &request).await {
            Ok(response) => {
                // Adopt the server conversation id for follow-ups
                if let Some(id) = &response.conversation_id {
                    *self
                        .conversation_id
                        .lock()
                        .expect("conversation id poisoned") = Some(id.clone());
                }
                let message = ChatMessage {
                    id: response
                        .message_id
                        .unwrap_or_else(|| format!("assistant-{}", Uuid::new_v4())),
                    role: ChatRole::Assistant,
                    content: response.answer,
                    citations: response.citations,
                    suggested_followups: response.suggested_followups,
                };
                self.push(message.clone());
                Some(message)
            }
            Err(e) => {
                *self.error.lock().expect("ask error poisoned") = Some(e.to_string());
                None
            }
        };
        self.loading.store(false, Ordering::SeqCst);
        outcome
    }

    /// Clear the history and the conversation id
    pub fn new_chat(&self) {
        self.messages.lock().expect("messages poisoned").clear();
        *self
            .conversation_id
            .lock()
            .expect("conversation id poisoned") = None;
        *self.error.lock().expect("ask error poisoned") = None;
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().expect("messages poisoned").clone()
    }

    pub fn conversation_id(&self) -> Option<String> {
        self.conversation_id
            .lock()
            .expect("conversation id poisoned")
            .clone()
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().expect("ask error poisoned").clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    fn push(&self, message: ChatMessage) {
        self.messages.lock().expect("messages poisoned").push(message);
    }
}
