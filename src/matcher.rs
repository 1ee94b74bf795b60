//! Token-overlap matching against the knowledge base.
//!
//! Questions are split on whitespace into sets of unique tokens, with no
//! case folding, punctuation stripping or stemming. An entry's score is the
//! size of the intersection with the user's token set. The first entry with
//! the strictly highest score wins, so ties go to the earlier entry.

use serde::Serialize;
use std::collections::HashSet;

use crate::knowledge::KnowledgeBase;

/// Answer returned by the matcher when the question is blank.
pub const BLANK_QUESTION_PROMPT: &str = "فضلاً اطرح سؤالك بشكل واضح لأتمكن من مساعدتك.";

/// Outcome of a match: a copy of the winning entry, or the empty pair when
/// nothing shares a token with the question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct MatchResult {
    pub question: String,
    pub answer: String,
}

impl MatchResult {
    /// The `{"", ""}` sentinel meaning "no match found".
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_match(&self) -> bool {
        !self.question.is_empty()
    }
}

fn tokenize(text: &str) -> HashSet<&str> {
    text.split_whitespace().collect()
}

fn shared_tokens(tokens: &HashSet<&str>, text: &str) -> usize {
    tokenize(text)
        .iter()
        .filter(|token| tokens.contains(*token))
        .count()
}

/// Number of unique tokens shared by `a` and `b`.
pub fn overlap_score(a: &str, b: &str) -> usize {
    shared_tokens(&tokenize(a), b)
}

/// Finds the knowledge-base entry with the largest token overlap.
pub fn find_best_match(kb: &KnowledgeBase, user_question: &str) -> MatchResult {
    let user_question = user_question.trim();
    if user_question.is_empty() {
        return MatchResult {
            question: String::new(),
            answer: BLANK_QUESTION_PROMPT.to_string(),
        };
    }

    let user_tokens = tokenize(user_question);
    let mut best = None;
    let mut best_score = 0;

    for entry in kb.entries() {
        let score = shared_tokens(&user_tokens, &entry.question);

        if score > best_score {
            best_score = score;
            best = Some(entry);
        }
    }

    match best {
        Some(entry) => MatchResult {
            question: entry.question.clone(),
            answer: entry.answer.clone(),
        },
        None => MatchResult::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeEntry;

    fn kb(pairs: &[(&str, &str)]) -> KnowledgeBase {
        KnowledgeBase::new(
            pairs
                .iter()
                .map(|(q, a)| KnowledgeEntry::new(*q, *a))
                .collect(),
        )
    }

    #[test]
    fn test_arabic_overlap_match() {
        let kb = kb(&[("ما هي مدة التغطية", "سنة واحدة")]);
        let m = find_best_match(&kb, "ما هي مدة التغطية الطبية");
        assert_eq!(m.question, "ما هي مدة التغطية");
        assert_eq!(m.answer, "سنة واحدة");
        assert_eq!(overlap_score("ما هي مدة التغطية الطبية", "ما هي مدة التغطية"), 4);
    }

    #[test]
    fn test_highest_overlap_wins() {
        let kb = kb(&[
            ("how do I renew", "renew-answer"),
            ("how do I file a claim", "claim-answer"),
        ]);
        let m = find_best_match(&kb, "how do I file my claim");
        assert_eq!(m.answer, "claim-answer");
    }

    #[test]
    fn test_tie_keeps_first_entry() {
        let kb = kb(&[("claim status", "first"), ("claim form", "second")]);
        let m = find_best_match(&kb, "claim");
        assert_eq!(m.answer, "first");
    }

    #[test]
    fn test_no_shared_token_returns_sentinel() {
        let kb = kb(&[("claim status", "a"), ("renew policy", "b")]);
        let m = find_best_match(&kb, "hospital network");
        assert_eq!(m, MatchResult::none());
        assert!(!m.is_match());
    }

    #[test]
    fn test_empty_knowledge_base_returns_sentinel() {
        let m = find_best_match(&KnowledgeBase::default(), "anything at all");
        assert_eq!(m, MatchResult::none());
    }

    #[test]
    fn test_blank_question_short_circuits() {
        let kb = kb(&[("", "empty question entry")]);
        let m = find_best_match(&kb, "   \t ");
        assert_eq!(m.question, "");
        assert_eq!(m.answer, BLANK_QUESTION_PROMPT);
    }

    #[test]
    fn test_no_normalization() {
        let kb = kb(&[("Claim?", "a")]);
        assert_eq!(find_best_match(&kb, "claim"), MatchResult::none());
        assert_eq!(find_best_match(&kb, "my Claim?").answer, "a");
    }

    #[test]
    fn test_duplicate_tokens_count_once() {
        assert_eq!(overlap_score("claim claim claim", "claim status"), 1);
    }

    #[test]
    fn test_empty_entry_question_never_matches() {
        let kb = kb(&[("", "orphan"), ("network list", "net")]);
        assert_eq!(find_best_match(&kb, "network").answer, "net");
        assert_eq!(find_best_match(&kb, "unrelated"), MatchResult::none());
    }
}
