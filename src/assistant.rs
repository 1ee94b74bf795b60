//! Request handling: match, ask the LLM, pick the final answer.
//!
//! # Decision tree
//!
//! | Condition | Answer | `source` |
//! |-----------|--------|----------|
//! | blank question | clarification prompt | `validation` |
//! | LLM answer of 5+ characters | LLM answer | `knowledge_base+llm` |
//! | LLM answer empty or shorter | matched answer, else "no direct answer" | `knowledge_base_only` |
//! | LLM error | matched answer, else "temporary outage" | `fallback` |
//!
//! [`Assistant::answer`] never fails. A broken LLM degrades to plain
//! knowledge-base answers.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::LlmError;
use crate::knowledge::KnowledgeBase;
use crate::llm::AnswerGenerator;
use crate::matcher::{find_best_match, MatchResult};

/// Answer for a blank question.
pub const VALIDATION_MESSAGE: &str = "فضلاً اكتب سؤالك لأتمكن من مساعدتك.";
/// Answer when the LLM gave nothing usable and nothing matched.
pub const NO_DIRECT_ANSWER_MESSAGE: &str =
    "لم أجد إجابة مباشرة في قاعدة المعرفة، يُفضّل تحويلك لموظف خدمة العملاء.";
/// Answer when the LLM failed and nothing matched.
pub const OUTAGE_MESSAGE: &str =
    "عذراً، حدث خلل مؤقت في خدمة المساعد الذكي. يُفضّل تحويلك لموظف خدمة العملاء.";

/// LLM answers shorter than this many characters are discarded.
pub const MIN_ANSWER_CHARS: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// How the answer in an [`AskResponse`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceTag {
    #[serde(rename = "validation")]
    Validation,
    #[serde(rename = "knowledge_base_only")]
    KnowledgeBaseOnly,
    #[serde(rename = "knowledge_base+llm")]
    KnowledgeBaseLlm,
    #[serde(rename = "fallback")]
    Fallback,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Validation => "validation",
            SourceTag::KnowledgeBaseOnly => "knowledge_base_only",
            SourceTag::KnowledgeBaseLlm => "knowledge_base+llm",
            SourceTag::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskResponse {
    pub user_question: String,
    /// Matched knowledge-base question; `""` when nothing matched.
    pub matched_question: Option<String>,
    pub answer: String,
    pub source: SourceTag,
}

/// What came back from the LLM, classified for the decision tree.
#[derive(Debug)]
pub enum LlmOutcome {
    Answered(String),
    LowSignal,
    Failed(LlmError),
}

impl LlmOutcome {
    pub fn classify(result: Result<String, LlmError>) -> Self {
        match result {
            Ok(text) if text.chars().count() >= MIN_ANSWER_CHARS => LlmOutcome::Answered(text),
            Ok(_) => LlmOutcome::LowSignal,
            Err(e) => LlmOutcome::Failed(e),
        }
    }
}

/// Orchestrates matcher and LLM over a shared, read-only knowledge base.
pub struct Assistant {
    kb: Arc<KnowledgeBase>,
    llm: Arc<dyn AnswerGenerator>,
}

impl Assistant {
    pub fn new(kb: Arc<KnowledgeBase>, llm: Arc<dyn AnswerGenerator>) -> Self {
        Self { kb, llm }
    }

    pub async fn answer(&self, raw_question: &str) -> AskResponse {
        let user_question = raw_question.trim();

        if user_question.is_empty() {
            tracing::debug!("blank question rejected");
            return AskResponse {
                user_question: String::new(),
                matched_question: Some(String::new()),
                answer: VALIDATION_MESSAGE.to_string(),
                source: SourceTag::Validation,
            };
        }

        let best = find_best_match(&self.kb, user_question);
        let outcome = LlmOutcome::classify(self.llm.generate_answer(user_question, &best).await);
        let response = Self::respond(user_question, best, outcome);

        tracing::info!(
            source = response.source.as_str(),
            matched = response
                .matched_question
                .as_deref()
                .is_some_and(|q| !q.is_empty()),
            "question answered"
        );
        response
    }

    fn respond(user_question: &str, best: MatchResult, outcome: LlmOutcome) -> AskResponse {
        let (answer, source) = match outcome {
            LlmOutcome::Answered(text) => (text, SourceTag::KnowledgeBaseLlm),
            LlmOutcome::LowSignal => (
                non_empty_or(best.answer, NO_DIRECT_ANSWER_MESSAGE),
                SourceTag::KnowledgeBaseOnly,
            ),
            LlmOutcome::Failed(err) => {
                tracing::warn!(error = %err, "LLM error, falling back to knowledge base");
                (non_empty_or(best.answer, OUTAGE_MESSAGE), SourceTag::Fallback)
            }
        };

        AskResponse {
            user_question: user_question.to_string(),
            matched_question: Some(best.question),
            answer,
            source,
        }
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}
