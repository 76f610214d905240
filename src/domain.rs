//! Domain models used by the backend: questions, generation requests/results, scores.

use serde::{Deserialize, Serialize};

/// Number of options every multiple-choice question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A single multiple-choice question. Serialized in the camelCase shape the
/// frontend and the question-bank file share.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub id: String,
  pub question_text: String,
  pub options: Vec<String>,
  pub correct_index: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub difficulty: Option<String>,
}

impl Question {
  /// Exactly 4 options and a correct index pointing at one of them.
  pub fn is_well_formed(&self) -> bool {
    self.options.len() == OPTIONS_PER_QUESTION
      && (0..OPTIONS_PER_QUESTION as i64).contains(&self.correct_index)
  }

  /// Copy of this question labelled with the given category/difficulty.
  pub fn stamped(&self, category: &str, difficulty: &str) -> Question {
    Question {
      category: Some(category.to_string()),
      difficulty: Some(difficulty.to_string()),
      ..self.clone()
    }
  }
}

/// Where did the questions of a quiz come from?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
  Ai,       // generated by the external model and validated
  Fallback, // sampled from the offline question bank
}

impl QuestionSource {
  pub fn as_str(&self) -> &'static str {
    match self {
      QuestionSource::Ai => "ai",
      QuestionSource::Fallback => "fallback",
    }
  }
}

/// One quiz-generation request, independent of the HTTP layer.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
  pub category: String,
  pub difficulty: String, // "easy" | "medium" | "hard" | anything else
  pub count: usize,
  pub use_ai: bool,
}

#[derive(Clone, Debug)]
pub struct GenerationResult {
  pub source: QuestionSource,
  pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreResult {
  pub total: usize,
  pub correct: usize,
  pub wrong: usize,
  pub percent: f64,
}
