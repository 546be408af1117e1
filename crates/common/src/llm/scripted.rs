//! Offline model implementations

use super::{GenerateRequest, LanguageModel, OutputFormat};
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Replies from a queue and records every request it receives
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<Option<String>>>>,
    requests: Mutex<Vec<GenerateRequest>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model whose next reply is `text`
    pub fn replying(text: &str) -> Self {
        let replies = VecDeque::from([Ok(Some(text.to_string()))]);
        Self {
            replies: Mutex::new(replies),
            ..Self::default()
        }
    }

    /// Queue a reply; an empty queue answers with no output
    pub async fn push_reply(&self, reply: Result<Option<String>>) {
        self.replies.lock().await.push_back(reply);
    }

    /// Number of calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first
    pub async fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, request: GenerateRequest) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request);
        self.replies.lock().await.pop_front().unwrap_or(Ok(None))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Canned answers shaped like real ones, for running without an API key
pub struct EchoModel;

#[async_trait]
impl LanguageModel for EchoModel {
    async fn generate(&self, request: GenerateRequest) -> Result<Option<String>> {
        let media = request.media().count();
        let reply = match request.output {
            OutputFormat::Text => format!(
                "[echo] {} text characters and {} attachment(s) received.",
                request.prompt_text().chars().count(),
                media
            ),
            OutputFormat::Json(_) => serde_json::json!({
                "importantQuestions": [
                    "[echo] What are the key definitions in this material?",
                    "[echo] Which results are most likely to be examined?"
                ]
            })
            .to_string(),
        };
        Ok(Some(reply))
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}
