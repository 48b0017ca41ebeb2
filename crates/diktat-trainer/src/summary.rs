//! Aggregation of a finished run into a `ResultSummary`.
//!
//! Word accuracy is positional: the i-th reference token is credited only if
//! the i-th submitted token equals it. A word shifted by an insertion or a
//! deletion earns nothing, unlike the diff used for feedback.

use diktat_core::types::{Attempt, ResultSummary};

use crate::compare::tokenize;

/// Reduce a list of attempts to aggregate statistics.
pub fn summarize(attempts: &[Attempt]) -> ResultSummary {
    let mut total_words = 0;
    let mut correct_words = 0;

    for attempt in attempts {
        let original = tokenize(&attempt.original);
        let submitted = tokenize(&attempt.submitted);

        total_words += original.len();
        correct_words += original
            .iter()
            .zip(submitted.iter())
            .filter(|(o, s)| o == s)
            .count();
    }

    let word_accuracy = if total_words > 0 {
        100.0 * correct_words as f64 / total_words as f64
    } else {
        0.0
    };

    let (correct, incorrect): (Vec<Attempt>, Vec<Attempt>) =
        attempts.iter().cloned().partition(|a| a.is_correct);

    ResultSummary {
        total_sentences: attempts.len(),
        correct_sentences: correct.len(),
        total_words,
        correct_words,
        word_accuracy,
        correct,
        incorrect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare;

    fn attempt(index: usize, original: &str, submitted: &str) -> Attempt {
        let c = compare(original, submitted);
        Attempt {
            sentence_index: index,
            original: original.to_string(),
            submitted: submitted.to_string(),
            verdicts: c.verdicts,
            is_correct: c.is_correct,
        }
    }

    #[test]
    fn test_positional_word_accuracy() {
        let summary = summarize(&[attempt(0, "a b c", "a x c")]);
        assert_eq!(summary.total_words, 3);
        assert_eq!(summary.correct_words, 2);
        assert!((summary.word_accuracy - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_shifted_words_earn_nothing() {
        // "b c" are present but one position late.
        let summary = summarize(&[attempt(0, "a b c", "a x b c")]);
        assert_eq!(summary.total_words, 3);
        assert_eq!(summary.correct_words, 1);
    }

    #[test]
    fn test_longer_submission_is_bounded_by_reference() {
        let summary = summarize(&[attempt(0, "a b", "a b c d")]);
        assert_eq!(summary.total_words, 2);
        assert_eq!(summary.correct_words, 2);
        assert!(!summary.incorrect.is_empty());
    }

    #[test]
    fn test_empty_attempts() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_sentences, 0);
        assert_eq!(summary.correct_sentences, 0);
        assert_eq!(summary.total_words, 0);
        assert_eq!(summary.word_accuracy, 0.0);
        assert!(summary.correct.is_empty());
        assert!(summary.incorrect.is_empty());
    }

    #[test]
    fn test_partition_preserves_order() {
        let attempts = vec![
            attempt(0, "eins", "eins"),
            attempt(1, "zwei", "drei"),
            attempt(2, "vier", "vier"),
            attempt(3, "fünf", ""),
        ];
        let summary = summarize(&attempts);

        assert_eq!(summary.total_sentences, 4);
        assert_eq!(summary.correct_sentences, 2);
        let correct: Vec<usize> = summary.correct.iter().map(|a| a.sentence_index).collect();
        let incorrect: Vec<usize> = summary.incorrect.iter().map(|a| a.sentence_index).collect();
        assert_eq!(correct, vec![0, 2]);
        assert_eq!(incorrect, vec![1, 3]);
        assert_eq!(summary.total_words, 4);
        assert_eq!(summary.correct_words, 2);
        assert_eq!(summary.word_accuracy, 50.0);
    }
}
