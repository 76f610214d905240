//! Error taxonomy for generation and the HTTP mapping of the errors that can
//! reach a caller.

use axum::{
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
  /// Model text could not be parsed or was not shaped like `{"questions": [...]}`.
  #[error("malformed model output: {0}")]
  MalformedOutput(String),
  /// Model output parsed, but every question was rejected.
  #[error("model output contained no valid questions")]
  NoValidQuestions,
  #[error("only {available} offline questions available for {category} ({difficulty}); need {requested}")]
  InsufficientFallbackData {
    category: String,
    difficulty: String,
    available: usize,
    requested: usize,
  },
  /// Network, HTTP status, auth or timeout failure from the AI provider.
  #[error("AI service error: {0}")]
  ExternalService(String),
  #[error("invalid request: {0}")]
  InvalidRequest(String),
}

impl From<reqwest::Error> for QuizError {
  fn from(e: reqwest::Error) -> Self {
    QuizError::ExternalService(e.to_string())
  }
}

/// Body extraction failures (bad JSON, missing fields, wrong content type).
impl From<JsonRejection> for QuizError {
  fn from(rejection: JsonRejection) -> Self {
    QuizError::InvalidRequest(rejection.body_text())
  }
}

impl QuizError {
  pub fn status(&self) -> StatusCode {
    match self {
      QuizError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
      QuizError::InsufficientFallbackData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for QuizError {
  fn into_response(self) -> Response {
    let status = self.status();
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
