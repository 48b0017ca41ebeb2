//! Word-level comparison of a submission against its reference sentence.
//!
//! Both texts are split on whitespace (no case folding, no punctuation
//! normalization) and aligned with a longest-common-subsequence diff.
//!
//! Tie-break rule: the walk goes front to back. Equal front tokens are always
//! matched. On a mismatch, the reference token is reported `Missing` whenever
//! dropping it keeps the remaining common subsequence at least as long as
//! dropping the submitted token; otherwise the submitted token is `Extra`.
//! Deletions therefore precede insertions inside a substituted run, e.g.
//! `"a a b"` vs `"a b a"` yields `Match a, Missing a, Match b, Extra a`.
//!
//! This is not Python's `difflib.ndiff` ordering. ndiff anchors on its own
//! matching blocks and reports the example above as `Missing a, Match a,
//! Match b, Extra a`; it also emits the `+` lines before the `-` lines when
//! the submitted side of a substitution is shorter, where this module always
//! lists every `Missing` token of the run first. Match and mismatch counts
//! agree with ndiff whenever both find a longest common subsequence.

use diktat_core::types::{TokenVerdict, Verdict};

/// Result of comparing one submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comparison {
    /// Verdicts in diff order.
    pub verdicts: Vec<TokenVerdict>,
    /// True iff no token is `Missing` or `Extra`.
    pub is_correct: bool,
}

impl Comparison {
    /// Number of verdicts with the given classification.
    pub fn count(&self, verdict: Verdict) -> usize {
        self.verdicts
            .iter()
            .filter(|v| v.classification == verdict)
            .count()
    }
}

/// Split text into whitespace-separated tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Align `submitted` against `reference` and classify every token.
///
/// Never fails: empty inputs on either side are valid.
pub fn compare(reference: &str, submitted: &str) -> Comparison {
    let reference = tokenize(reference);
    let submitted = tokenize(submitted);

    let table = SuffixLcs::build(&reference, &submitted);
    let mut verdicts = Vec::with_capacity(reference.len().max(submitted.len()));

    let (mut i, mut j) = (0, 0);
    while i < reference.len() && j < submitted.len() {
        if reference[i] == submitted[j] {
            verdicts.push(TokenVerdict::new(reference[i], Verdict::Match));
            i += 1;
            j += 1;
        } else if table.get(i + 1, j) >= table.get(i, j + 1) {
            verdicts.push(TokenVerdict::new(reference[i], Verdict::Missing));
            i += 1;
        } else {
            verdicts.push(TokenVerdict::new(submitted[j], Verdict::Extra));
            j += 1;
        }
    }
    verdicts.extend(
        reference[i..]
            .iter()
            .map(|t| TokenVerdict::new(*t, Verdict::Missing)),
    );
    verdicts.extend(
        submitted[j..]
            .iter()
            .map(|t| TokenVerdict::new(*t, Verdict::Extra)),
    );

    let is_correct = verdicts
        .iter()
        .all(|v| v.classification == Verdict::Match);

    Comparison {
        verdicts,
        is_correct,
    }
}

/// `get(i, j)` is the LCS length of `a[i..]` and `b[j..]`.
struct SuffixLcs {
    width: usize,
    cells: Vec<u32>,
}

impl SuffixLcs {
    fn build(a: &[&str], b: &[&str]) -> Self {
        let width = b.len() + 1;
        let mut cells = vec![0u32; (a.len() + 1) * width];
        for i in (0..a.len()).rev() {
            for j in (0..b.len()).rev() {
                cells[i * width + j] = if a[i] == b[j] {
                    cells[(i + 1) * width + j + 1] + 1
                } else {
                    cells[(i + 1) * width + j].max(cells[i * width + j + 1])
                };
            }
        }
        Self { width, cells }
    }

    fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.width + j]
    }
}
