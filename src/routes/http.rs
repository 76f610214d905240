//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{extract::State, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::QuizError;
use crate::logic::score_quiz;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { status: "ok" }) }

#[instrument(
  level = "info",
  skip(state, body),
  fields(category = %body.category, difficulty = %body.difficulty, num_questions = body.num_questions, use_ai = body.use_ai)
)]
pub async fn http_generate_questions(
  State(state): State<Arc<AppState>>,
  ApiJson(body): ApiJson<GenerateQuestionsIn>,
) -> Result<Json<GenerateQuestionsOut>, QuizError> {
  let req = body.into_request(state.generation.max_questions)?;
  let result = state.generate(&req).await?;
  info!(target: "quiz", category = %req.category, source = result.source.as_str(), served = result.questions.len(), "HTTP generate-questions served");
  Ok(Json(result.into()))
}

#[instrument(level = "info", skip(body), fields(questions = body.questions.len(), answers = body.user_answers.len()))]
pub async fn http_score_quiz(ApiJson(body): ApiJson<ScoreQuizIn>) -> impl IntoResponse {
  let score = score_quiz(&body.questions, &body.user_answers);
  Json(ScoreQuizOut::from(score))
}
