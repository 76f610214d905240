//! Core behaviors shared by the HTTP handlers.
//!
//! This includes:
//!   - Choosing between the AI path and the offline fallback path
//!   - Running the AI path (prompt -> bounded model call -> parser)
//!   - Scoring a finished quiz

use std::time::Duration;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::ai::QuestionModel;
use crate::bank::QuestionBank;
use crate::config::Prompts;
use crate::domain::{GenerationRequest, GenerationResult, Question, QuestionSource, ScoreResult};
use crate::error::QuizError;
use crate::fallback::select_fallback;
use crate::parser::parse_questions;
use crate::prompt::build_prompt;

/// Read-only collaborators of one generation call.
pub struct GenerationDeps<'a> {
  pub prompts: &'a Prompts,
  pub bank: &'a QuestionBank,
  pub ai_timeout: Duration,
}

/// AI first when asked for and available; any AI failure degrades to the bank.
/// Only a fallback failure reaches the caller.
#[instrument(
  level = "info",
  skip(model, deps, req),
  fields(generation_id = %Uuid::new_v4(), category = %req.category, difficulty = %req.difficulty, count = req.count, use_ai = req.use_ai)
)]
pub async fn generate_questions<M: QuestionModel>(
  model: Option<&M>,
  deps: &GenerationDeps<'_>,
  req: &GenerationRequest,
) -> Result<GenerationResult, QuizError> {
  match (req.use_ai, model) {
    (true, Some(model)) => match ai_path(model, deps, req).await {
      Ok(questions) => {
        if questions.len() < req.count {
          warn!(target: "quiz", requested = req.count, received = questions.len(), "Model returned fewer questions than requested");
        }
        info!(target: "quiz", source = "ai", served = questions.len(), "Quiz generated");
        return Ok(GenerationResult { source: QuestionSource::Ai, questions });
      }
      Err(e) => {
        error!(target: "quiz", model = %model.label(), error = %e, "AI generation failed; falling back to offline bank");
      }
    },
    (true, None) => warn!(target: "quiz", "AI requested but no provider is configured; using offline bank"),
    (false, _) => info!(target: "quiz", "AI mode off; using offline bank"),
  }

  let questions = select_fallback(deps.bank, &req.category, &req.difficulty, req.count)?;
  info!(target: "quiz", source = "fallback", served = questions.len(), "Quiz generated");
  Ok(GenerationResult { source: QuestionSource::Fallback, questions })
}

/// Prompt -> model call bounded by `ai_timeout` -> validated questions.
pub async fn ai_path<M: QuestionModel>(
  model: &M,
  deps: &GenerationDeps<'_>,
  req: &GenerationRequest,
) -> Result<Vec<Question>, QuizError> {
  let prompt = build_prompt(deps.prompts, &req.category, &req.difficulty, req.count);
  let raw = tokio::time::timeout(deps.ai_timeout, model.complete(&deps.prompts.system, &prompt))
    .await
    .map_err(|_| QuizError::ExternalService(format!("model call timed out after {:?}", deps.ai_timeout)))??;
  parse_questions(&raw, &req.category, &req.difficulty, req.count)
}

/// Positional comparison of answers against correct indices; extra items on
/// either side are ignored.
#[instrument(level = "info", skip_all, fields(questions = questions.len(), answers = answers.len()))]
pub fn score_quiz(questions: &[Question], answers: &[i64]) -> ScoreResult {
  let total = questions.len();
  let correct = questions
    .iter()
    .zip(answers)
    .filter(|(q, a)| q.correct_index == **a)
    .count();
  let wrong = total.saturating_sub(correct);
  let percent = if total == 0 { 0.0 } else { correct as f64 / total as f64 * 100.0 };
  info!(target: "quiz", total, correct, wrong, percent = %format!("{:.2}", percent), "Quiz scored");
  ScoreResult { total, correct, wrong, percent }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::sync::atomic::{AtomicUsize, Ordering};

  enum Behavior {
    Reply(String),
    Fail,
    Hang,
  }

  struct StubModel {
    behavior: Behavior,
    calls: AtomicUsize,
  }

  impl StubModel {
    fn new(behavior: Behavior) -> Self {
      Self { behavior, calls: AtomicUsize::new(0) }
    }
  }

  impl QuestionModel for StubModel {
    fn label(&self) -> String {
      "stub".into()
    }

    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, QuizError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      assert!(prompt.contains("\"questions\""));
      match &self.behavior {
        Behavior::Reply(text) => Ok(text.clone()),
        Behavior::Fail => Err(QuizError::ExternalService("connection refused".into())),
        Behavior::Hang => {
          tokio::time::sleep(Duration::from_secs(3600)).await;
          Ok(String::new())
        }
      }
    }
  }

  fn ai_reply(n: usize) -> String {
    let questions: Vec<_> = (0..n)
      .map(|i| json!({ "id": format!("gen{i}"), "questionText": format!("Q{i}?"), "options": ["a", "b", "c", "d"], "correctIndex": i % 4 }))
      .collect();
    format!("```json\n{}\n```", json!({ "questions": questions }))
  }

  fn request(category: &str, count: usize, use_ai: bool) -> GenerationRequest {
    GenerationRequest { category: category.into(), difficulty: "easy".into(), count, use_ai }
  }

  fn question(correct: i64) -> Question {
    Question {
      id: format!("q{correct}"),
      question_text: "?".into(),
      options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
      correct_index: correct,
      explanation: None,
      category: None,
      difficulty: None,
    }
  }

  #[tokio::test]
  async fn ai_success_is_tagged_ai() {
    let prompts = Prompts::default();
    let bank = QuestionBank::seed();
    let deps = GenerationDeps { prompts: &prompts, bank: &bank, ai_timeout: Duration::from_secs(5) };
    let model = StubModel::new(Behavior::Reply(ai_reply(6)));

    let out = generate_questions(Some(&model), &deps, &request("Rust", 4, true)).await.expect("generate");
    assert_eq!(out.source, QuestionSource::Ai);
    assert_eq!(out.questions.len(), 4);
    assert_eq!(out.questions[0].category.as_deref(), Some("Rust"));
  }

  #[tokio::test]
  async fn ai_failure_falls_back() {
    let prompts = Prompts::default();
    let bank = QuestionBank::seed();
    let deps = GenerationDeps { prompts: &prompts, bank: &bank, ai_timeout: Duration::from_secs(5) };

    for behavior in [Behavior::Fail, Behavior::Reply("no json here".into()), Behavior::Reply("{\"questions\": [{\"options\": []}]}".into())] {
      let model = StubModel::new(behavior);
      let out = generate_questions(Some(&model), &deps, &request("Databases", 3, true)).await.expect("generate");
      assert_eq!(out.source, QuestionSource::Fallback);
      assert_eq!(out.questions.len(), 3);
      assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }
  }

  #[tokio::test]
  async fn hanging_model_times_out_into_fallback() {
    let prompts = Prompts::default();
    let bank = QuestionBank::seed();
    let deps = GenerationDeps { prompts: &prompts, bank: &bank, ai_timeout: Duration::from_millis(50) };
    let model = StubModel::new(Behavior::Hang);

    let err = ai_path(&model, &deps, &request("Databases", 2, true)).await.expect_err("timeout");
    assert!(matches!(err, QuizError::ExternalService(ref m) if m.contains("timed out")));

    let out = generate_questions(Some(&model), &deps, &request("Databases", 2, true)).await.expect("generate");
    assert_eq!(out.source, QuestionSource::Fallback);
    assert!(!out.questions.is_empty());
  }

  #[tokio::test]
  async fn ai_off_never_calls_the_model() {
    let prompts = Prompts::default();
    let bank = QuestionBank::seed();
    let deps = GenerationDeps { prompts: &prompts, bank: &bank, ai_timeout: Duration::from_secs(5) };
    let model = StubModel::new(Behavior::Reply(ai_reply(5)));

    let out = generate_questions(Some(&model), &deps, &request("Databases", 5, false)).await.expect("generate");
    assert_eq!(out.source, QuestionSource::Fallback);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);

    let out = generate_questions(None::<&StubModel>, &deps, &request("Databases", 2, true)).await.expect("generate");
    assert_eq!(out.source, QuestionSource::Fallback);
  }

  #[tokio::test]
  async fn fallback_shortage_propagates() {
    let prompts = Prompts::default();
    let bank = QuestionBank::seed();
    let deps = GenerationDeps { prompts: &prompts, bank: &bank, ai_timeout: Duration::from_secs(5) };
    let model = StubModel::new(Behavior::Fail);

    let err = generate_questions(Some(&model), &deps, &request("Databases", 50, true)).await.expect_err("shortage");
    assert!(matches!(err, QuizError::InsufficientFallbackData { requested: 50, .. }));
  }

  #[test]
  fn scores_three_of_five() {
    let qs: Vec<_> = [0, 1, 2, 3, 0].into_iter().map(question).collect();
    let s = score_quiz(&qs, &[0, 1, 2, 0, 1]);
    assert_eq!(s, ScoreResult { total: 5, correct: 3, wrong: 2, percent: 60.0 });
  }

  #[test]
  fn scores_empty_quiz() {
    assert_eq!(score_quiz(&[], &[]), ScoreResult { total: 0, correct: 0, wrong: 0, percent: 0.0 });
    assert_eq!(score_quiz(&[], &[1, 2]).total, 0);
  }

  #[test]
  fn unmatched_tail_and_unanswered_are_not_errors() {
    let qs: Vec<_> = [1, 2, 3, 0].into_iter().map(question).collect();
    let s = score_quiz(&qs, &[1, -1]);
    assert_eq!(s.total, 4);
    assert_eq!(s.correct, 1);
    assert_eq!(s.wrong, 3);
    assert_eq!(s.percent, 25.0);
  }
}
