//! Scripted generation backend for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use survey_core::{Error, GenerationBackend, Result};

/// One recorded generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub system: String,
    pub prompt: String,
}

#[derive(Debug, Default)]
struct MockState {
    replies: VecDeque<String>,
    default_reply: String,
    failure: Option<String>,
    calls: Vec<MockCall>,
}

/// Returns queued replies in order, then the default reply.
#[derive(Debug, Clone, Default)]
pub struct MockGenerationBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockGenerationBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next call.
    pub fn with_response(self, reply: impl Into<String>) -> Self {
        self.state.lock().unwrap().replies.push_back(reply.into());
        self
    }

    pub fn with_default_response(self, reply: impl Into<String>) -> Self {
        self.state.lock().unwrap().default_reply = reply.into();
        self
    }

    /// Fail every call with [`Error::Inference`].
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.state.lock().unwrap().failure = Some(message.into());
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
        });
        if let Some(message) = &state.failure {
            return Err(Error::Inference(message.clone()));
        }
        let reply = state.replies.pop_front();
        Ok(reply.unwrap_or_else(|| state.default_reply.clone()))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
