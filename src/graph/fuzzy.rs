//! Tiered relevance ranking over normalized identifiers.
//!
//! Every identifier in a snapshot falls into one of three groups relative
//! to the input: exact, partial (substring either way), or fuzzy (trigram
//! similarity above a threshold). Anything else is dropped.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::snapshot::Snapshot;
use crate::types::{FuzzyMatch, RelevanceGroup};

/// Similarity an identifier must exceed to land in the fuzzy group.
pub const DEFAULT_THRESHOLD: f32 = 0.25;

/// Maximum number of ranked identifiers handed on for assembly.
pub const DEFAULT_RESULT_CAP: usize = 500;

/// A padded 3-character shingle.
pub type Trigram = [char; 3];

/// Extracts the set of padded 3-character shingles of `text`.
///
/// Text is split into words on non-alphanumeric characters and each word is
/// padded with two leading blanks and one trailing blank, so short strings
/// still produce shingles and word starts weigh more than word ends.
pub fn trigrams(text: &str) -> HashSet<Trigram> {
    let mut set = HashSet::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars().flat_map(char::to_lowercase))
            .chain(std::iter::once(' '))
            .collect();
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }
    set
}

fn jaccard(a: &HashSet<Trigram>, b: &HashSet<Trigram>) -> f32 {
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    if union == 0 {
        return 0.0;
    }
    shared as f32 / union as f32
}

/// Symmetric trigram similarity in `[0, 1]`.
///
/// Returns 0.0 when either string has no alphanumeric content.
pub fn similarity(a: &str, b: &str) -> f32 {
    jaccard(&trigrams(a), &trigrams(b))
}

/// Assigns `id` to a relevance group relative to `input`.
///
/// Returns `None` when `id` is neither equal to, overlapping with, nor
/// similar enough to `input`.
pub fn classify(id: &str, input: &str, threshold: f32) -> Option<(RelevanceGroup, f32)> {
    classify_with(id, &trigrams(id), input, &trigrams(input), threshold)
}

fn classify_with(
    id: &str,
    id_trigrams: &HashSet<Trigram>,
    input: &str,
    input_trigrams: &HashSet<Trigram>,
    threshold: f32,
) -> Option<(RelevanceGroup, f32)> {
    if input.is_empty() || id.is_empty() {
        return None;
    }
    let score = jaccard(id_trigrams, input_trigrams);
    if id == input {
        Some((RelevanceGroup::Exact, score))
    } else if id.contains(input) || input.contains(id) {
        Some((RelevanceGroup::Partial, score))
    } else if score > threshold {
        Some((RelevanceGroup::Fuzzy, score))
    } else {
        None
    }
}

/// Ranks snapshot identifiers against a normalized input.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    threshold: f32,
    cap: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_RESULT_CAP)
    }
}

impl FuzzyMatcher {
    pub fn new(threshold: f32, cap: usize) -> Self {
        Self { threshold, cap }
    }

    /// Classifies every identifier in `snapshot` against `input`.
    ///
    /// Results are ordered by ascending group, then descending similarity;
    /// equal entries keep the snapshot's first-seen order. The cap is applied
    /// after ranking so truncation only ever drops the lowest-ranked matches.
    pub fn rank(&self, snapshot: &Snapshot, input: &str) -> Vec<FuzzyMatch> {
        if input.is_empty() {
            return Vec::new();
        }

        let input_trigrams = trigrams(input);
        let mut matches: Vec<FuzzyMatch> = snapshot
            .identifier_trigrams()
            .filter_map(|(id, id_trigrams)| {
                classify_with(id, id_trigrams, input, &input_trigrams, self.threshold).map(
                    |(group, score)| FuzzyMatch {
                        identifier: id.to_string(),
                        group,
                        similarity: score,
                    },
                )
            })
            .collect();

        // `sort_by` is stable, which keeps encounter order for full ties.
        matches.sort_by(|a, b| {
            a.group.cmp(&b.group).then_with(|| {
                b.similarity
                    .partial_cmp(&a.similarity)
                    .unwrap_or(Ordering::Equal)
            })
        });
        matches.truncate(self.cap);
        matches
    }
}
