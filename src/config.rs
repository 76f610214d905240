//! Loading service configuration (prompts + generation knobs) from TOML and env.
//!
//! See `QuizConfig`, `Prompts` and `GenerationCfg` for the expected schema:
//!
//! ```toml
//! [prompts]
//! system = "..."
//! user_template = "... {count} ... {topic} ... {difficulty_text} ..."
//!
//! [generation]
//! ai_timeout_secs = 20
//! max_questions = 50
//! temperature = 0.7
//! ```

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub generation: GenerationCfg,
}

/// Prompts sent to the model. Defaults ask for the strict question schema;
/// override them in TOML to tune tone or audience.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system: String,
  /// Rendered with `{count}`, `{topic}` and `{difficulty_text}`.
  pub user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system: "You are a question generator for a multiple-choice quiz app. Respond ONLY with strict JSON.".into(),
      user_template: r#"Generate exactly {count} multiple-choice questions on the topic: "{topic}".

Difficulty level: {difficulty_text}.

Rules:
- Each question must have exactly 4 options.
- Only one option is correct.
- Make questions clear, concise, and non-ambiguous.
- Avoid offensive, unsafe, or personal content.

Return the output as pure JSON: no markdown, no backticks, no prose before or after the JSON.
Use this exact schema:

{
  "questions": [
    {
      "id": "string-question-id",
      "questionText": "your question text here",
      "options": ["option A", "option B", "option C", "option D"],
      "correctIndex": 0
    }
  ]
}

Remember:
- "correctIndex" is an integer 0, 1, 2 or 3 indicating which option is correct.
- Do NOT wrap the JSON in ```json fences or any other text.
- Do NOT include extra keys."#
        .into(),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GenerationCfg {
  /// Upper bound on one model round trip, applied by the orchestrator.
  pub ai_timeout_secs: u64,
  pub max_questions: usize,
  pub temperature: f32,
}

impl Default for GenerationCfg {
  fn default() -> Self {
    Self { ai_timeout_secs: 20, max_questions: 50, temperature: 0.7 }
  }
}

impl GenerationCfg {
  pub fn ai_timeout(&self) -> Duration {
    Duration::from_secs(self.ai_timeout_secs.max(1))
  }
}

/// Default location of the question-bank JSON file.
pub const DEFAULT_BANK_PATH: &str = "data/questions.json";

pub fn bank_path_from_env() -> String {
  std::env::var("QUESTION_BANK_PATH").unwrap_or_else(|_| DEFAULT_BANK_PATH.into())
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_quiz_config(&s) {
      Ok(cfg) => {
        info!(target: "quiz_backend", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quiz_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quiz_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_quiz_config(s: &str) -> Result<QuizConfig, toml::de::Error> {
  toml::from_str::<QuizConfig>(s)
}
