//! In-memory trait implementations shared by the unit tests in this crate.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use futures_util::Stream;
use uuid::Uuid;

use makementors_types::chat::{ChatMessage, ChatSession, MessageRole};
use makementors_types::error::RepositoryError;
use makementors_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, StreamEvent, Usage,
};
use makementors_types::mentor::{Mentor, MentorId, MentorTemplate};

use crate::chat::repository::ChatRepository;
use crate::llm::provider::LlmProvider;
use crate::mentor::repository::{MentorRepository, TemplateCatalog};

// ---------------------------------------------------------------------------
// Catalogs
// ---------------------------------------------------------------------------

pub struct InMemoryTemplateCatalog {
    templates: Vec<MentorTemplate>,
}

impl InMemoryTemplateCatalog {
    pub fn with(templates: Vec<MentorTemplate>) -> Self {
        Self { templates }
    }
}

impl TemplateCatalog for InMemoryTemplateCatalog {
    async fn get_template(
        &self,
        template_id: &str,
    ) -> Result<Option<MentorTemplate>, RepositoryError> {
        Ok(self
            .templates
            .iter()
            .find(|t| t.template_id == template_id)
            .cloned())
    }

    async fn list_templates(&self) -> Result<Vec<MentorTemplate>, RepositoryError> {
        Ok(self.templates.clone())
    }
}

pub struct InMemoryMentorRepository {
    mentors: Mutex<Vec<Mentor>>,
}

impl InMemoryMentorRepository {
    pub fn with(mentors: Vec<Mentor>) -> Self {
        Self {
            mentors: Mutex::new(mentors),
        }
    }
}

impl MentorRepository for InMemoryMentorRepository {
    async fn create(&self, mentor: &Mentor) -> Result<Mentor, RepositoryError> {
        self.mentors.lock().unwrap().push(mentor.clone());
        Ok(mentor.clone())
    }

    async fn get(&self, id: &MentorId) -> Result<Option<Mentor>, RepositoryError> {
        Ok(self
            .mentors
            .lock()
            .unwrap()
            .iter()
            .find(|m| &m.id == id)
            .cloned())
    }

    async fn list_for_owner(&self, owner_user_id: &str) -> Result<Vec<Mentor>, RepositoryError> {
        Ok(self
            .mentors
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.owner_user_id == owner_user_id)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Chat repository
// ---------------------------------------------------------------------------

pub struct InMemoryChatRepository {
    sessions: Mutex<Vec<ChatSession>>,
    messages: Mutex<Vec<ChatMessage>>,
    fail_create: AtomicBool,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            fail_create: AtomicBool::new(false),
        }
    }

    /// Make subsequent `create_session` calls fail (degraded-mode testing).
    pub fn fail_session_creation(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn assistant_messages(&self, session_id: &Uuid) -> Vec<ChatMessage> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.chat_session_id == session_id && m.role == MessageRole::Assistant)
            .cloned()
            .collect()
    }
}

impl ChatRepository for InMemoryChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| &s.id == session_id)
            .cloned())
    }

    async fn touch_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.iter_mut().find(|s| &s.id == session_id) {
            Some(session) => {
                session.updated_at = chrono::Utc::now();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        let mut sessions: Vec<ChatSession> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let offset = offset.unwrap_or(0) as usize;
        let sessions: Vec<ChatSession> = sessions.into_iter().skip(offset).collect();
        Ok(match limit {
            Some(limit) => sessions.into_iter().take(limit as usize).collect(),
            None => sessions,
        })
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| &s.id != session_id);
        if sessions.len() == before {
            return Err(RepositoryError::NotFound);
        }
        self.messages
            .lock()
            .unwrap()
            .retain(|m| &m.chat_session_id != session_id);
        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        // Insertion order doubles as ascending creation order here.
        let messages: Vec<ChatMessage> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.chat_session_id == session_id)
            .cloned()
            .collect();
        let offset = offset.unwrap_or(0) as usize;
        let messages: Vec<ChatMessage> = messages.into_iter().skip(offset).collect();
        Ok(match limit {
            Some(limit) => messages.into_iter().take(limit as usize).collect(),
            None => messages,
        })
    }

    async fn count_sessions(&self) -> Result<u64, RepositoryError> {
        Ok(self.sessions.lock().unwrap().len() as u64)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        Ok(self.messages.lock().unwrap().len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Scripted LLM provider
// ---------------------------------------------------------------------------

/// One step in a scripted streaming response.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Emit a text delta.
    Delta(String),
    /// Fail the stream with a provider error.
    Error(String),
    /// Park the stream forever (for cancellation tests).
    Hang,
}

/// LLM provider that replays a fixed script.
pub struct ScriptedProvider {
    script: Vec<ScriptStep>,
    completion: Result<String, String>,
}

impl ScriptedProvider {
    pub fn streaming(script: Vec<ScriptStep>) -> Self {
        Self {
            script,
            completion: Ok(String::new()),
        }
    }

    pub fn completing(result: Result<String, String>) -> Self {
        Self {
            script: Vec::new(),
            completion: result,
        }
    }

    pub fn deltas(parts: &[&str]) -> Self {
        Self::streaming(parts.iter().map(|p| ScriptStep::Delta(p.to_string())).collect())
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        match &self.completion {
            Ok(content) => Ok(CompletionResponse {
                id: "scripted-1".to_string(),
                content: content.clone(),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            }),
            Err(message) => Err(LlmError::Provider {
                message: message.clone(),
            }),
        }
    }

    fn stream(
        &self,
        _request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let script = self.script.clone();
        Box::pin(async_stream::stream! {
            yield Ok(StreamEvent::Connected);
            for step in script {
                match step {
                    ScriptStep::Delta(text) => yield Ok(StreamEvent::TextDelta { text }),
                    ScriptStep::Error(message) => {
                        yield Err(LlmError::Provider { message });
                        return;
                    }
                    ScriptStep::Hang => {
                        futures_util::future::pending::<()>().await;
                    }
                }
            }
            yield Ok(StreamEvent::Done);
        })
    }
}
