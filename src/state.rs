//! Application state: question bank, prompts, generation knobs and the optional AI client.
//!
//! Everything here is built once at startup and only read afterwards, so the
//! state is shared as a plain `Arc<AppState>` without locks.

use tracing::{info, instrument, warn};

use crate::ai::{AiClient, QuestionModel};
use crate::bank::QuestionBank;
use crate::config::{bank_path_from_env, load_quiz_config_from_env, GenerationCfg, Prompts};
use crate::domain::{GenerationRequest, GenerationResult};
use crate::error::QuizError;
use crate::logic::{generate_questions, GenerationDeps};

pub struct AppState {
  pub bank: QuestionBank,
  pub prompts: Prompts,
  pub generation: GenerationCfg,
  pub ai: Option<AiClient>,
}

impl AppState {
  /// Build state from env: load config, load the bank, init the AI client.
  #[instrument(level = "info", skip_all)]
  pub fn from_env() -> Self {
    let cfg = load_quiz_config_from_env().unwrap_or_default();
    let bank = QuestionBank::load_or_seed(&bank_path_from_env());
    if bank.is_empty() {
      warn!(target: "quiz_backend", "Question bank is empty; every fallback request will fail");
    } else {
      info!(target: "quiz_backend", categories = ?bank.categories().collect::<Vec<_>>(), "Question bank ready");
    }

    let ai = AiClient::from_env(cfg.generation.temperature, cfg.generation.ai_timeout());
    match &ai {
      Some(client) => info!(target: "quiz_backend", model = %client.label(), timeout = ?cfg.generation.ai_timeout(), "AI generation enabled."),
      None => info!(target: "quiz_backend", "AI disabled (no OPENAI_API_KEY or GEMINI_API_KEY). Serving offline bank only."),
    }

    Self::new(bank, cfg.prompts, cfg.generation, ai)
  }

  pub fn new(bank: QuestionBank, prompts: Prompts, generation: GenerationCfg, ai: Option<AiClient>) -> Self {
    Self { bank, prompts, generation, ai }
  }

  /// Run one generation request against this state's collaborators.
  pub async fn generate(&self, req: &GenerationRequest) -> Result<GenerationResult, QuizError> {
    let deps = GenerationDeps {
      prompts: &self.prompts,
      bank: &self.bank,
      ai_timeout: self.generation.ai_timeout(),
    };
    generate_questions(self.ai.as_ref(), &deps, req).await
  }
}
