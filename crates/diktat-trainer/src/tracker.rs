//! Progress tracker driving one run of a dictation.
//!
//! The tracker is a plain value: the web layer owns one per session and is
//! responsible for serializing access to it. Each operation validates the
//! requested transition against [`RunState`] before mutating anything.

use uuid::Uuid;

use diktat_core::error::{DiktatError, Result};
use diktat_core::types::{Attempt, ContentRepository, DictationId, ResultSummary};

use crate::compare::compare;
use crate::state::RunState;
use crate::summary::summarize;

/// Mutable state of one in-progress dictation.
///
/// `current_index` ranges over `0..=sentences.len()`. Every recorded attempt
/// carries the index it was made for, so `attempts` never refers past
/// `current_index`.
#[derive(Debug, Clone)]
pub struct Run {
    pub id: Uuid,
    pub dictation_id: DictationId,
    pub title: String,
    pub sentences: Vec<String>,
    pub current_index: usize,
    pub attempts: Vec<Attempt>,
}

impl Run {
    pub fn total(&self) -> usize {
        self.sentences.len()
    }

    /// Latest attempt made for the sentence currently shown.
    pub fn latest_attempt(&self) -> Option<&Attempt> {
        self.attempts
            .last()
            .filter(|a| a.sentence_index == self.current_index)
    }

    /// One attempt per sentence: the last submission made for it, or an
    /// empty submission if the sentence was skipped.
    pub fn graded_attempts(&self) -> Vec<Attempt> {
        self.sentences
            .iter()
            .enumerate()
            .map(|(index, sentence)| {
                self.attempts
                    .iter()
                    .rev()
                    .find(|a| a.sentence_index == index)
                    .cloned()
                    .unwrap_or_else(|| build_attempt(index, sentence, ""))
            })
            .collect()
    }
}

/// Outcome of finalizing a run.
#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub run_id: Uuid,
    pub dictation_id: DictationId,
    pub title: String,
    /// Every submission in the order it was made, retries included.
    pub attempt_log: Vec<Attempt>,
    pub summary: ResultSummary,
}

/// State machine over at most one active run.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    state: RunState,
    run: Option<Run>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    /// Create a tracker in the `Idle` state.
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            run: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn run(&self) -> Option<&Run> {
        self.run.as_ref()
    }

    /// Begin a run of `dictation_id`.
    ///
    /// A run that is still active is abandoned. Fails with `NotFound` if the
    /// repository does not know the id or the dictation has no sentences.
    pub fn start<R>(&mut self, repo: &R, dictation_id: &str) -> Result<&Run>
    where
        R: ContentRepository + ?Sized,
    {
        let dictation = repo.load_dictation(dictation_id)?;
        if dictation.sentences.is_empty() {
            return Err(DiktatError::NotFound(format!(
                "Dictation '{}' has no sentences",
                dictation_id
            )));
        }

        if self.state != RunState::Idle {
            tracing::warn!(
                from = %self.state,
                dictation = %dictation_id,
                "Abandoning active run"
            );
            self.reset();
        }
        self.transition(RunState::InProgress)?;

        let run = Run {
            id: Uuid::new_v4(),
            title: dictation.title(),
            dictation_id: dictation.id,
            sentences: dictation.sentences,
            current_index: 0,
            attempts: Vec::new(),
        };
        tracing::info!(
            run_id = %run.id,
            dictation = %run.dictation_id,
            sentences = run.total(),
            "Run started"
        );
        Ok(&*self.run.insert(run))
    }

    /// The sentence the user is expected to type.
    pub fn current_sentence(&self) -> Result<&str> {
        let run = self.active_run()?;
        run.sentences
            .get(run.current_index)
            .map(String::as_str)
            .ok_or(DiktatError::OutOfRange {
                index: run.current_index,
                total: run.total(),
            })
    }

    /// Compare `submitted` with the current sentence and log the attempt.
    ///
    /// Does not advance. Re-submitting before advancing appends another
    /// attempt; all of them are kept.
    pub fn record_attempt(&mut self, submitted: &str) -> Result<&Attempt> {
        self.require_started("record an attempt")?;
        let sentence = self.current_sentence()?.to_string();
        self.transition(RunState::AwaitingAdvance)?;

        let run = self.run_mut()?;
        let attempt = build_attempt(run.current_index, &sentence, submitted);
        tracing::debug!(
            index = attempt.sentence_index,
            correct = attempt.is_correct,
            "Attempt recorded"
        );
        run.attempts.push(attempt);
        run.attempts
            .last()
            .ok_or_else(|| DiktatError::InvalidState("attempt log is empty".to_string()))
    }

    /// Move to the next sentence, or to `Completed` after the last one.
    pub fn advance(&mut self) -> Result<RunState> {
        self.require_started("advance")?;
        let (next_index, total) = {
            let run = self.active_run()?;
            (run.current_index + 1, run.total())
        };
        let target = if next_index >= total {
            RunState::Completed
        } else {
            RunState::InProgress
        };
        self.transition(target)?;
        self.run_mut()?.current_index = next_index;
        Ok(target)
    }

    /// Summarize a completed run and return to `Idle`.
    pub fn finalize(&mut self) -> Result<CompletedRun> {
        if self.state != RunState::Completed {
            return Err(DiktatError::InvalidState(format!(
                "cannot finalize from {}",
                self.state
            )));
        }
        let run = self
            .run
            .take()
            .ok_or_else(|| DiktatError::NotFound("no active run".to_string()))?;
        self.transition(RunState::Idle)?;

        let summary = summarize(&run.graded_attempts());
        tracing::info!(
            run_id = %run.id,
            dictation = %run.dictation_id,
            correct = summary.correct_sentences,
            total = summary.total_sentences,
            accuracy = summary.word_accuracy,
            "Run finalized"
        );
        Ok(CompletedRun {
            run_id: run.id,
            dictation_id: run.dictation_id,
            title: run.title,
            attempt_log: run.attempts,
            summary,
        })
    }

    /// Drop any run and return to `Idle`.
    pub fn reset(&mut self) {
        if self.state != RunState::Idle {
            tracing::debug!("Run state reset to Idle from {}", self.state);
        }
        self.state = RunState::Idle;
        self.run = None;
    }

    fn transition(&mut self, target: RunState) -> Result<()> {
        if self.state.can_transition_to(&target) {
            tracing::debug!("Run state: {} -> {}", self.state, target);
            self.state = target;
            Ok(())
        } else {
            Err(DiktatError::InvalidState(format!(
                "invalid transition: {} -> {}",
                self.state, target
            )))
        }
    }

    fn require_started(&self, operation: &str) -> Result<()> {
        if self.state == RunState::Idle {
            return Err(DiktatError::InvalidState(format!(
                "cannot {} without an active run",
                operation
            )));
        }
        Ok(())
    }

    fn active_run(&self) -> Result<&Run> {
        self.run
            .as_ref()
            .ok_or_else(|| DiktatError::NotFound("no active run".to_string()))
    }

    fn run_mut(&mut self) -> Result<&mut Run> {
        self.run
            .as_mut()
            .ok_or_else(|| DiktatError::NotFound("no active run".to_string()))
    }
}

fn build_attempt(sentence_index: usize, original: &str, submitted: &str) -> Attempt {
    let comparison = compare(original, submitted);
    Attempt {
        sentence_index,
        original: original.to_string(),
        submitted: submitted.to_string(),
        verdicts: comparison.verdicts,
        is_correct: comparison.is_correct,
    }
}
