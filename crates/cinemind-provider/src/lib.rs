pub mod gemini;

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("gemini api error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// 429 and 5xx responses; informational only, nothing retries.
        retryable: bool,
    },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One text/JSON completion request. `prompt` is a single user turn; when
/// `response_schema` is set the provider constrains the reply to that shape
/// and requests an `application/json` body.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct Completion {
    /// Concatenated text parts of the first candidate. Empty when the
    /// provider returned no candidates or no text.
    pub text: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub finish_reason: Option<String>,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;
}

/// Test double that replays scripted outcomes in order, then repeats the
/// last one.
pub struct StubProvider {
    script: Mutex<Vec<StubOutcome>>,
}

enum StubOutcome {
    Text(String),
    Empty,
    Fail(String),
}

impl StubProvider {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(vec![StubOutcome::Text(text.into())]),
        }
    }

    pub fn empty() -> Self {
        Self {
            script: Mutex::new(vec![StubOutcome::Empty]),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(vec![StubOutcome::Fail(message.into())]),
        }
    }

    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.script
            .lock()
            .expect("stub script lock")
            .push(StubOutcome::Text(text.into()));
        self
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<Completion, ProviderError> {
        let mut script = self.script.lock().expect("stub script lock");
        let outcome = if script.len() > 1 {
            script.remove(0)
        } else {
            match &script[0] {
                StubOutcome::Text(t) => StubOutcome::Text(t.clone()),
                StubOutcome::Empty => StubOutcome::Empty,
                StubOutcome::Fail(m) => StubOutcome::Fail(m.clone()),
            }
        };
        match outcome {
            StubOutcome::Text(text) => Ok(Completion {
                text,
                input_tokens: Some(10),
                output_tokens: Some(20),
                finish_reason: Some("stop".into()),
            }),
            StubOutcome::Empty => Ok(Completion::default()),
            StubOutcome::Fail(message) => Err(ProviderError::Api {
                status: 500,
                message,
                retryable: true,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gemini-2.5-flash".into(),
            system: None,
            prompt: "hello".into(),
            temperature: None,
            max_output_tokens: None,
            response_schema: None,
        }
    }

    #[tokio::test]
    async fn stub_replays_scripted_outcomes_in_order() {
        let stub = StubProvider::with_text("first").then_text("second");
        assert_eq!(stub.complete(request()).await.unwrap().text, "first");
        assert_eq!(stub.complete(request()).await.unwrap().text, "second");
        // Last outcome repeats.
        assert_eq!(stub.complete(request()).await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn stub_empty_yields_blank_completion() {
        let stub = StubProvider::empty();
        let completion = stub.complete(request()).await.unwrap();
        assert!(completion.text.is_empty());
        assert!(completion.finish_reason.is_none());
    }

    #[tokio::test]
    async fn stub_failing_yields_api_error() {
        let stub = StubProvider::failing("boom");
        let err = stub.complete(request()).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Api {
                status: 500,
                retryable: true,
                ..
            }
        ));
    }
}
