//! Offline question bank: category -> difficulty -> questions.
//!
//! Loaded once at startup from QUESTION_BANK_PATH and never mutated afterwards.
//! A copy of `data/questions.json` is compiled in as the seed bank, so the
//! service still has offline questions when the file is missing or broken.

use std::collections::BTreeMap;

use tracing::{error, info, warn};

use crate::domain::Question;

/// Difficulty used when the requested one is missing from a category.
pub const DEFAULT_DIFFICULTY: &str = "easy";

const SEED_BANK_JSON: &str = include_str!("../data/questions.json");

type Buckets = BTreeMap<String, Vec<Question>>;

#[derive(Debug, thiserror::Error)]
pub enum BankError {
  #[error("failed to read question bank: {0}")]
  Io(#[from] std::io::Error),
  #[error("failed to parse question bank: {0}")]
  Json(#[from] serde_json::Error),
}

/// Ordered by name so "first category" is stable across runs.
#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
  categories: BTreeMap<String, Buckets>,
}

/// The bucket a lookup ended up using, with the names actually matched.
#[derive(Debug)]
pub struct ResolvedBucket<'a> {
  pub category: &'a str,
  pub difficulty: &'a str,
  pub questions: &'a [Question],
}

impl QuestionBank {
  /// Parse the bank file format, dropping records that break the question invariants.
  pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
    let mut categories: BTreeMap<String, Buckets> = serde_json::from_str(s)?;
    for (category, buckets) in categories.iter_mut() {
      for (difficulty, questions) in buckets.iter_mut() {
        let before = questions.len();
        questions.retain(Question::is_well_formed);
        let dropped = before - questions.len();
        if dropped > 0 {
          warn!(target: "quiz", %category, %difficulty, dropped, "Dropped malformed bank questions");
        }
      }
    }
    Ok(Self { categories })
  }

  pub fn load(path: &str) -> Result<Self, BankError> {
    let s = std::fs::read_to_string(path)?;
    Ok(Self::from_json(&s)?)
  }

  /// Built-in bank compiled from `data/questions.json`.
  pub fn seed() -> Self {
    Self::from_json(SEED_BANK_JSON).unwrap_or_else(|e| {
      error!(target: "quiz_backend", error = %e, "Built-in question bank is invalid");
      Self::default()
    })
  }

  /// Load from `path`, falling back to the seed bank on any error.
  pub fn load_or_seed(path: &str) -> Self {
    let bank = match Self::load(path) {
      Ok(bank) => {
        info!(target: "quiz_backend", %path, "Loaded question bank");
        bank
      }
      Err(e) => {
        error!(target: "quiz_backend", %path, error = %e, "Question bank unavailable; using built-in seed bank");
        Self::seed()
      }
    };
    bank.log_inventory();
    bank
  }

  pub fn is_empty(&self) -> bool {
    self.categories.is_empty()
  }

  pub fn categories(&self) -> impl Iterator<Item = &str> {
    self.categories.keys().map(String::as_str)
  }

  /// Find the bucket for `category`/`difficulty`:
  /// unknown category -> first category; unknown or empty difficulty -> "easy"
  /// of that category; nothing left -> an empty bucket.
  pub fn resolve<'a>(&'a self, category: &'a str, difficulty: &'a str) -> ResolvedBucket<'a> {
    let Some((cat_name, buckets)) = self
      .categories
      .get_key_value(category)
      .or_else(|| self.categories.iter().next())
    else {
      return ResolvedBucket { category, difficulty, questions: &[] };
    };

    match buckets.get_key_value(difficulty) {
      Some((diff_name, qs)) if !qs.is_empty() => ResolvedBucket {
        category: cat_name,
        difficulty: diff_name,
        questions: qs,
      },
      _ => ResolvedBucket {
        category: cat_name,
        difficulty: DEFAULT_DIFFICULTY,
        questions: buckets.get(DEFAULT_DIFFICULTY).map(Vec::as_slice).unwrap_or(&[]),
      },
    }
  }

  fn log_inventory(&self) {
    for (category, buckets) in &self.categories {
      for (difficulty, questions) in buckets {
        info!(target: "quiz", %category, %difficulty, count = questions.len(), "Startup question inventory");
      }
    }
  }
}
