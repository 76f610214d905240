//! The boundary to the external text-generation service.
//!
//! `QuestionModel` is what the orchestrator calls; `AiClient` picks a concrete
//! provider at startup from the environment.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::error::QuizError;
use crate::gemini::Gemini;
use crate::openai::OpenAI;

/// A text-completion model: prompt in, free-form text out.
pub trait QuestionModel: Send + Sync {
  /// Short provider/model label for logs.
  fn label(&self) -> String;

  fn complete(&self, system: &str, prompt: &str) -> impl Future<Output = Result<String, QuizError>> + Send;
}

#[derive(Clone)]
pub enum AiClient {
  OpenAi(OpenAI),
  Gemini(Gemini),
}

impl AiClient {
  /// OPENAI_API_KEY wins over GEMINI_API_KEY; neither means AI is disabled.
  pub fn from_env(temperature: f32, timeout: Duration) -> Option<Self> {
    OpenAI::from_env(temperature, timeout)
      .map(AiClient::OpenAi)
      .or_else(|| Gemini::from_env(temperature, timeout).map(AiClient::Gemini))
  }
}

impl QuestionModel for AiClient {
  fn label(&self) -> String {
    match self {
      AiClient::OpenAi(c) => format!("openai:{}", c.model),
      AiClient::Gemini(c) => format!("gemini:{}", c.model),
    }
  }

  async fn complete(&self, system: &str, prompt: &str) -> Result<String, QuizError> {
    match self {
      AiClient::OpenAi(c) => c.chat_plain(system, prompt).await,
      AiClient::Gemini(c) => c.generate_content(system, prompt).await,
    }
  }
}

/// Try to extract a clean error message from a provider error body
/// (`{"error": {"message": ...}}`, shared by OpenAI and Gemini).
pub(crate) fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_provider_error_message() {
    let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
    assert_eq!(extract_api_error(body).as_deref(), Some("Incorrect API key provided"));
    assert_eq!(extract_api_error("<html>bad gateway</html>"), None);
  }
}
