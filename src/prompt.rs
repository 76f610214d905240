//! Prompt construction for question generation. Pure: same input, same text.

use crate::config::Prompts;
use crate::util::fill_template;

/// Map a difficulty name to the wording the model sees.
pub fn difficulty_text(difficulty: &str) -> &'static str {
  match difficulty.trim().to_ascii_lowercase().as_str() {
    "easy" => "beginner-friendly",
    "medium" => "undergraduate level",
    "hard" => "challenging/analytical",
    _ => "mixed difficulty",
  }
}

/// Render the user prompt asking for `count` questions on `topic` in the strict JSON schema.
pub fn build_prompt(prompts: &Prompts, topic: &str, difficulty: &str, count: usize) -> String {
  let count = count.to_string();
  fill_template(
    &prompts.user_template,
    &[
      ("count", count.as_str()),
      ("topic", topic),
      ("difficulty_text", difficulty_text(difficulty)),
    ],
  )
}
