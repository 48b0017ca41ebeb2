use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// Content
// =============================================================================

/// Stable identifier of a dictation (its source file name).
pub type DictationId = String;

/// An ordered set of sentences to practise, plus header metadata.
///
/// Immutable once loaded; owned by the content repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictation {
    pub id: DictationId,
    pub sentences: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

impl Dictation {
    /// Display title: the `titel` (or `title`) header, else the id without
    /// its file extension.
    pub fn title(&self) -> String {
        self.metadata
            .get("titel")
            .or_else(|| self.metadata.get("title"))
            .cloned()
            .unwrap_or_else(|| match self.id.rsplit_once('.') {
                Some((stem, _)) if !stem.is_empty() => stem.to_string(),
                _ => self.id.clone(),
            })
    }
}

/// Source of dictations.
pub trait ContentRepository: Send + Sync {
    /// All known dictation ids, sorted.
    fn list_dictations(&self) -> Result<Vec<DictationId>>;

    /// Load one dictation. Fails with `DiktatError::NotFound` for unknown ids.
    fn load_dictation(&self, id: &str) -> Result<Dictation>;
}

// =============================================================================
// Comparison
// =============================================================================

/// Classification of one token after aligning a submission to its reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Present in both, aligned.
    Match,
    /// Present only in the reference.
    Missing,
    /// Present only in the submission.
    Extra,
}

impl Verdict {
    /// CSS classes the presentation layer uses to colour the token.
    pub fn badge_class(&self) -> &'static str {
        match self {
            Verdict::Match => "badge-success",
            Verdict::Missing => "badge-warning line-through",
            Verdict::Extra => "badge-error",
        }
    }
}

/// A single token together with its classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenVerdict {
    pub token: String,
    pub classification: Verdict,
}

impl TokenVerdict {
    pub fn new(token: impl Into<String>, classification: Verdict) -> Self {
        Self {
            token: token.into(),
            classification,
        }
    }
}

/// One submitted sentence and how it compared to the reference.
///
/// Created once per submission and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// Position of the sentence within its dictation.
    pub sentence_index: usize,
    pub original: String,
    pub submitted: String,
    pub verdicts: Vec<TokenVerdict>,
    pub is_correct: bool,
}

/// Aggregate statistics over a completed run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total_sentences: usize,
    pub correct_sentences: usize,
    pub total_words: usize,
    pub correct_words: usize,
    /// Percentage in `0.0..=100.0`.
    pub word_accuracy: f64,
    pub correct: Vec<Attempt>,
    pub incorrect: Vec<Attempt>,
}

// =============================================================================
// Users
// =============================================================================

/// Primary key of a registered user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered account, without its credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Credential store consumed by the web layer.
pub trait UserStore: Send + Sync {
    /// Register a new account. Fails with `DiktatError::AlreadyExists` if the
    /// username is taken.
    fn create(&self, username: &str, password: &str) -> Result<UserId>;

    /// Check a username/password pair.
    fn verify(&self, username: &str, password: &str) -> Result<Option<User>>;

    fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictation(id: &str, meta: &[(&str, &str)]) -> Dictation {
        Dictation {
            id: id.to_string(),
            sentences: vec!["Ein Satz.".to_string()],
            metadata: meta
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_title_prefers_titel_header() {
        let d = dictation("tiere.txt", &[("titel", "Tiere im Wald"), ("title", "Animals")]);
        assert_eq!(d.title(), "Tiere im Wald");
    }

    #[test]
    fn test_title_falls_back_to_title_then_stem() {
        assert_eq!(dictation("a.txt", &[("title", "Animals")]).title(), "Animals");
        assert_eq!(dictation("herbst.txt", &[]).title(), "herbst");
        assert_eq!(dictation("noext", &[]).title(), "noext");
    }

    #[test]
    fn test_verdict_serde_snake_case() {
        let json = serde_json::to_string(&TokenVerdict::new("Hund", Verdict::Missing)).unwrap();
        assert_eq!(json, r#"{"token":"Hund","classification":"missing"}"#);
    }

    #[test]
    fn test_badge_classes() {
        assert_eq!(Verdict::Match.badge_class(), "badge-success");
        assert!(Verdict::Missing.badge_class().contains("line-through"));
        assert_eq!(Verdict::Extra.badge_class(), "badge-error");
    }
}
