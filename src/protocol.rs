//! Public protocol structs for the HTTP endpoints (serde ready).
//! Field names follow the camelCase contract the frontend already speaks.

use axum::extract::FromRequest;
use serde::{Deserialize, Serialize};

use crate::domain::{GenerationRequest, GenerationResult, Question, QuestionSource, ScoreResult};
use crate::error::QuizError;

/// `Json` extractor whose rejections answer with the `{"error": ...}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(QuizError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsIn {
  pub category: String,
  pub difficulty: String,
  pub num_questions: i64,
  #[serde(default = "default_use_ai", rename = "useAI")]
  pub use_ai: bool,
}

fn default_use_ai() -> bool {
  true
}

impl GenerateQuestionsIn {
  /// Check the count against `1..=max_questions` and convert to the domain request.
  pub fn into_request(self, max_questions: usize) -> Result<GenerationRequest, QuizError> {
    let count = usize::try_from(self.num_questions)
      .ok()
      .filter(|n| (1..=max_questions).contains(n))
      .ok_or_else(|| {
        QuizError::InvalidRequest(format!("numQuestions must be between 1 and {max_questions}, got {}", self.num_questions))
      })?;
    if self.category.trim().is_empty() {
      return Err(QuizError::InvalidRequest("category must not be empty".into()));
    }
    Ok(GenerationRequest {
      category: self.category,
      difficulty: self.difficulty,
      count,
      use_ai: self.use_ai,
    })
  }
}

#[derive(Debug, Serialize)]
pub struct GenerateQuestionsOut {
  pub source: QuestionSource,
  pub questions: Vec<Question>,
}

impl From<GenerationResult> for GenerateQuestionsOut {
  fn from(r: GenerationResult) -> Self {
    Self { source: r.source, questions: r.questions }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreQuizIn {
  pub questions: Vec<Question>,
  pub user_answers: Vec<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreQuizOut {
  pub total_questions: usize,
  pub correct_count: usize,
  pub wrong_count: usize,
  pub score_percent: f64,
}

impl From<ScoreResult> for ScoreQuizOut {
  fn from(s: ScoreResult) -> Self {
    Self {
      total_questions: s.total,
      correct_count: s.correct,
      wrong_count: s.wrong,
      score_percent: s.percent,
    }
  }
}

#[derive(Serialize)]
pub struct HealthOut {
  pub status: &'static str,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn body(num: i64) -> GenerateQuestionsIn {
    serde_json::from_value(serde_json::json!({
      "category": "Databases", "difficulty": "easy", "numQuestions": num
    }))
    .expect("json")
  }

  #[test]
  fn use_ai_defaults_to_true() {
    assert!(body(3).use_ai);
    let off: GenerateQuestionsIn = serde_json::from_str(
      r#"{"category": "x", "difficulty": "hard", "numQuestions": 2, "useAI": false}"#,
    )
    .expect("json");
    assert!(!off.use_ai);
  }

  #[test]
  fn num_questions_bounds() {
    assert_eq!(body(3).into_request(10).expect("ok").count, 3);
    for bad in [0, -2, 11] {
      assert!(matches!(body(bad).into_request(10), Err(QuizError::InvalidRequest(_))), "{bad}");
    }
  }

  #[test]
  fn question_wire_shape_is_camel_case_without_empty_optionals() {
    let q = Question {
      id: "q1".into(),
      question_text: "2+2?".into(),
      options: vec!["1".into(), "2".into(), "3".into(), "4".into()],
      correct_index: 3,
      explanation: None,
      category: Some("Math".into()),
      difficulty: None,
    };
    let v = serde_json::to_value(GenerateQuestionsOut { source: QuestionSource::Ai, questions: vec![q] }).expect("json");
    assert_eq!(v["source"], "ai");
    assert_eq!(v["questions"][0]["questionText"], "2+2?");
    assert_eq!(v["questions"][0]["correctIndex"], 3);
    assert_eq!(v["questions"][0]["category"], "Math");
    assert!(v["questions"][0].get("explanation").is_none());
  }

  #[test]
  fn score_out_shape() {
    let out = ScoreQuizOut::from(ScoreResult { total: 5, correct: 3, wrong: 2, percent: 60.0 });
    let v = serde_json::to_value(out).expect("json");
    assert_eq!(v, serde_json::json!({"totalQuestions": 5, "correctCount": 3, "wrongCount": 2, "scorePercent": 60.0}));
  }
}
