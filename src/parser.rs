//! Turning raw model text into validated questions.
//!
//! Flow:
//! 1) Trim and strip a leading markdown fence (plus its language tag).
//! 2) Slice from the first '{' to the last '}'.
//! 3) Parse as JSON and take the non-empty `questions` array.
//! 4) Validate every element on its own; rejects are logged and skipped.
//! 5) Fail with `NoValidQuestions` on zero yield, else truncate to the requested count.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::domain::{Question, OPTIONS_PER_QUESTION};
use crate::error::QuizError;
use crate::util::trunc_for_log;

/// Why a single question element was dropped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
  #[error("element is not a JSON object")]
  NotAnObject,
  #[error("missing field '{0}'")]
  Missing(&'static str),
  #[error("field '{0}' has an unusable type")]
  NotCoercible(&'static str),
  #[error("question text is blank")]
  BlankText,
  #[error("expected exactly 4 options, got {0}")]
  WrongOptionCount(usize),
  #[error("correctIndex {0} is outside 0..=3")]
  IndexOutOfRange(i64),
}

/// Parse model output into at most `count` validated questions, stamped with
/// `topic`/`difficulty`.
#[instrument(level = "debug", skip(raw), fields(raw_len = raw.len()))]
pub fn parse_questions(raw: &str, topic: &str, difficulty: &str, count: usize) -> Result<Vec<Question>, QuizError> {
  debug!(target: "quiz", raw = %trunc_for_log(raw, 2000), "Raw model output");

  let text = strip_fences(raw);
  let json = locate_json(text)?;
  let data: Value = serde_json::from_str(json)
    .map_err(|e| QuizError::MalformedOutput(format!("failed to parse JSON: {e}")))?;

  let items = match data.get("questions").and_then(Value::as_array) {
    Some(items) if !items.is_empty() => items,
    _ => return Err(QuizError::MalformedOutput("JSON does not contain a non-empty 'questions' list".into())),
  };

  let mut seen_ids = HashSet::new();
  let mut questions = Vec::with_capacity(items.len().min(count));
  for (index, item) in items.iter().enumerate() {
    match validate_question(item, index, topic, difficulty) {
      Ok(mut q) => {
        if !seen_ids.insert(q.id.clone()) {
          q.id = unique_id(&mut seen_ids, synthesized_id(topic, difficulty, index));
        }
        questions.push(q);
      }
      Err(reason) => {
        warn!(target: "quiz", index, %reason, "Skipping malformed question");
      }
    }
  }

  if questions.is_empty() {
    return Err(QuizError::NoValidQuestions);
  }

  debug!(target: "quiz", received = items.len(), valid = questions.len(), requested = count, "Parsed model questions");
  questions.truncate(count);
  Ok(questions)
}

/// Remove surrounding whitespace and a leading ```lang fence (up to the closing fence, if any).
pub fn strip_fences(raw: &str) -> &str {
  let text = raw.trim();
  let Some(rest) = text.strip_prefix("```") else {
    return text;
  };
  let tag_len = rest
    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
    .unwrap_or(rest.len());
  let body = &rest[tag_len..];
  // Cut at the first closing fence, so a fence inside a question's text breaks
  // the JSON and the request falls back to the bank.
  let body = match body.find("```") {
    Some(end) => &body[..end],
    None => body,
  };
  body.trim()
}

/// Slice from the first '{' to the last '}' inclusive.
fn locate_json(text: &str) -> Result<&str, QuizError> {
  match (text.find('{'), text.rfind('}')) {
    (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
    _ => Err(QuizError::MalformedOutput("no JSON object found".into())),
  }
}

fn synthesized_id(topic: &str, difficulty: &str, index: usize) -> String {
  format!("ai_{topic}_{difficulty}_{index}")
}

/// Claim `base`, or `base_dupN` for the first N not yet taken.
fn unique_id(seen: &mut HashSet<String>, base: String) -> String {
  let mut candidate = base.clone();
  let mut n = 1;
  while !seen.insert(candidate.clone()) {
    candidate = format!("{base}_dup{n}");
    n += 1;
  }
  candidate
}

/// Schema check for one element of the `questions` array.
pub fn validate_question(item: &Value, index: usize, topic: &str, difficulty: &str) -> Result<Question, Rejection> {
  let obj = item.as_object().ok_or(Rejection::NotAnObject)?;

  let id = obj
    .get("id")
    .filter(|v| !is_falsy(v))
    .and_then(coerce_string)
    .unwrap_or_else(|| synthesized_id(topic, difficulty, index));

  let question_text = obj
    .get("questionText")
    .ok_or(Rejection::Missing("questionText"))
    .and_then(|v| coerce_string(v).ok_or(Rejection::NotCoercible("questionText")))?;
  if question_text.trim().is_empty() {
    return Err(Rejection::BlankText);
  }

  let raw_options = obj
    .get("options")
    .ok_or(Rejection::Missing("options"))?
    .as_array()
    .ok_or(Rejection::NotCoercible("options"))?;
  let options = raw_options
    .iter()
    .map(coerce_string)
    .collect::<Option<Vec<_>>>()
    .ok_or(Rejection::NotCoercible("options"))?;
  if options.len() != OPTIONS_PER_QUESTION {
    return Err(Rejection::WrongOptionCount(options.len()));
  }

  let correct_index = obj
    .get("correctIndex")
    .ok_or(Rejection::Missing("correctIndex"))
    .and_then(|v| coerce_index(v).ok_or(Rejection::NotCoercible("correctIndex")))?;
  if !(0..OPTIONS_PER_QUESTION as i64).contains(&correct_index) {
    return Err(Rejection::IndexOutOfRange(correct_index));
  }

  let explanation = obj
    .get("explanation")
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string);

  Ok(Question {
    id,
    question_text,
    options,
    correct_index,
    explanation,
    category: Some(topic.to_string()),
    difficulty: Some(difficulty.to_string()),
  })
}

fn is_falsy(v: &Value) -> bool {
  match v {
    Value::Null => true,
    Value::Bool(b) => !b,
    Value::Number(n) => n.as_f64() == Some(0.0),
    Value::String(s) => s.is_empty(),
    Value::Array(a) => a.is_empty(),
    Value::Object(o) => o.is_empty(),
  }
}

fn coerce_string(v: &Value) -> Option<String> {
  match v {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

fn coerce_index(v: &Value) -> Option<i64> {
  match v {
    Value::Number(n) => n
      .as_i64()
      .or_else(|| n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0).map(|f| f as i64)),
    Value::String(s) => s.trim().parse::<i64>().ok(),
    _ => None,
  }
}
