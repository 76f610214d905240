//! Offline question selection from the bank.
//!
//! Strict policy: if the resolved bucket holds fewer questions than requested we
//! fail with `InsufficientFallbackData` instead of serving a short quiz.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, instrument, warn};

use crate::bank::QuestionBank;
use crate::domain::Question;
use crate::error::QuizError;

/// Sample `count` questions without replacement using the thread-local RNG.
pub fn select_fallback(
  bank: &QuestionBank,
  category: &str,
  difficulty: &str,
  count: usize,
) -> Result<Vec<Question>, QuizError> {
  select_fallback_with(&mut rand::thread_rng(), bank, category, difficulty, count)
}

#[instrument(level = "debug", skip(rng, bank))]
pub fn select_fallback_with<R: Rng + ?Sized>(
  rng: &mut R,
  bank: &QuestionBank,
  category: &str,
  difficulty: &str,
  count: usize,
) -> Result<Vec<Question>, QuizError> {
  let bucket = bank.resolve(category, difficulty);
  if bucket.category != category || bucket.difficulty != difficulty {
    warn!(
      target: "quiz",
      requested_category = %category, requested_difficulty = %difficulty,
      used_category = %bucket.category, used_difficulty = %bucket.difficulty,
      "Fallback bucket substituted"
    );
  }

  let available = bucket.questions.len();
  if available < count {
    return Err(QuizError::InsufficientFallbackData {
      category: category.to_string(),
      difficulty: difficulty.to_string(),
      available,
      requested: count,
    });
  }

  let picked: Vec<Question> = bucket
    .questions
    .choose_multiple(rng, count)
    .map(|q| q.stamped(category, difficulty))
    .collect();
  info!(target: "quiz", %category, %difficulty, picked = picked.len(), available, "Fallback questions selected");
  Ok(picked)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use std::collections::HashSet;

  #[test]
  fn samples_exact_count_without_duplicates() {
    let bank = QuestionBank::seed();
    let mut rng = StdRng::seed_from_u64(7);
    for count in 0..=5 {
      let qs = select_fallback_with(&mut rng, &bank, "Databases", "medium", count).expect("select");
      assert_eq!(qs.len(), count);
      let ids: HashSet<_> = qs.iter().map(|q| q.id.clone()).collect();
      assert_eq!(ids.len(), count, "duplicates in {ids:?}");
      assert!(qs.iter().all(|q| q.id.starts_with("db_m")));
    }
  }

  #[test]
  fn sampling_varies_with_rng_state() {
    let bank = QuestionBank::seed();
    let mut rng = StdRng::seed_from_u64(42);
    let draws: HashSet<Vec<String>> = (0..20)
      .map(|_| {
        select_fallback_with(&mut rng, &bank, "Data Structures", "easy", 2)
          .expect("select")
          .into_iter()
          .map(|q| q.id)
          .collect()
      })
      .collect();
    assert!(draws.len() > 1);
  }

  #[test]
  fn substituted_bucket_keeps_requested_labels() {
    let bank = QuestionBank::seed();
    let qs = select_fallback(&bank, "Quantum Basket Weaving", "legendary", 3).expect("select");
    assert_eq!(qs.len(), 3);
    for q in &qs {
      assert_eq!(q.category.as_deref(), Some("Quantum Basket Weaving"));
      assert_eq!(q.difficulty.as_deref(), Some("legendary"));
      assert!(q.is_well_formed());
    }
  }

  #[test]
  fn insufficient_bucket_is_an_error() {
    let bank = QuestionBank::seed();
    match select_fallback(&bank, "Databases", "hard", 6) {
      Err(QuizError::InsufficientFallbackData { available, requested, .. }) => {
        assert_eq!(available, 5);
        assert_eq!(requested, 6);
      }
      other => panic!("unexpected: {other:?}"),
    }
  }

  #[test]
  fn empty_bank_is_an_error() {
    let bank = QuestionBank::default();
    assert!(matches!(
      select_fallback(&bank, "Databases", "easy", 1),
      Err(QuizError::InsufficientFallbackData { available: 0, .. })
    ));
  }
}
