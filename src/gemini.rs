//! Minimal Google Gemini client (`models/{model}:generateContent`).

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::ai::extract_api_error;
use crate::error::QuizError;

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub temperature: f32,
}

impl Gemini {
  /// Construct the client if we find GEMINI_API_KEY; otherwise return None.
  pub fn from_env(temperature: f32, timeout: Duration) -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-flash-latest".into());
    let client = reqwest::Client::builder().timeout(timeout).build().ok()?;
    Some(Self { client, api_key, base_url: base_url.trim_end_matches('/').to_string(), model, temperature })
  }

  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model, prompt_len = user.len()))]
  pub async fn generate_content(&self, system: &str, user: &str) -> Result<String, QuizError> {
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let payload = GenerateRequest::new(system, user, self.temperature);

    let start = Instant::now();
    let res = self.client.post(&url)
      .header("x-goog-api-key", self.api_key.as_str())
      .json(&payload)
      .send()
      .await?;

    let status = res.status();
    if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or(body);
      return Err(QuizError::ExternalService(format!("Gemini HTTP {}: {}", status, msg)));
    }

    let body: GenerateResponse = res.json().await?;
    let text = body.into_text()
      .ok_or_else(|| QuizError::ExternalService("Gemini response contained no text".into()))?;
    info!(target: "quiz_backend", elapsed = ?start.elapsed(), response_len = text.len(), "Gemini response received");
    Ok(text)
  }
}

// --- generateContent DTOs ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
  contents: [Content<'a>; 1],
  system_instruction: Content<'a>,
  generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  role: Option<&'a str>,
  parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> { text: &'a str }

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  temperature: f32,
  response_mime_type: &'static str,
}

impl<'a> GenerateRequest<'a> {
  fn new(system: &'a str, user: &'a str, temperature: f32) -> Self {
    Self {
      contents: [Content { role: Some("user"), parts: [Part { text: user }] }],
      system_instruction: Content { role: None, parts: [Part { text: system }] },
      generation_config: GenerationConfig { temperature, response_mime_type: "application/json" },
    }
  }
}

#[derive(Deserialize)]
struct GenerateResponse { candidates: Option<Vec<Candidate>> }
#[derive(Deserialize)]
struct Candidate { content: Option<CandidateContent> }
#[derive(Deserialize)]
struct CandidateContent { parts: Option<Vec<CandidatePart>> }
#[derive(Deserialize)]
struct CandidatePart { text: Option<String> }

impl GenerateResponse {
  /// Concatenated text parts of the first candidate that has any.
  fn into_text(self) -> Option<String> {
    self.candidates.unwrap_or_default().into_iter().find_map(|c| {
      let text: String = c.content?.parts.unwrap_or_default().into_iter().filter_map(|p| p.text).collect();
      if text.trim().is_empty() { None } else { Some(text) }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn request_shape() {
    let v = serde_json::to_value(GenerateRequest::new("sys", "user", 0.3)).expect("json");
    assert_eq!(v["contents"][0]["role"], "user");
    assert_eq!(v["contents"][0]["parts"][0]["text"], "user");
    assert_eq!(v["systemInstruction"]["parts"][0]["text"], "sys");
    assert!(v["systemInstruction"].get("role").is_none());
    assert_eq!(v["generationConfig"]["responseMimeType"], "application/json");
  }

  #[test]
  fn response_text_joins_parts_and_skips_empty_candidates() {
    let body: GenerateResponse = serde_json::from_str(
      r#"{"candidates": [
        {"content": {"parts": []}},
        {"content": {"parts": [{"text": "{\"questions\""}, {"text": ": []}"}]}}
      ]}"#,
    )
    .expect("json");
    assert_eq!(body.into_text().as_deref(), Some("{\"questions\": []}"));

    let blocked: GenerateResponse = serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).expect("json");
    assert!(blocked.into_text().is_none());
  }
}
