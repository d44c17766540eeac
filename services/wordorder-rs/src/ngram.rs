//! Frequent contiguous tag patterns per language.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::TagSequence;

/// Contiguous tag subsequence
pub type Ngram = Vec<String>;

/// Sliding window of width `n`; empty when the sequence is shorter than `n` or `n == 0`
pub fn extract_ngrams<T: Clone>(sequence: &[T], n: usize) -> Vec<Vec<T>> {
    if n == 0 || sequence.len() < n {
        return Vec::new();
    }
    sequence.windows(n).map(|window| window.to_vec()).collect()
}

/// N-gram occurrence counts in first-encounter order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NgramCounts {
    counts: IndexMap<Ngram, usize>,
}

impl NgramCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ngram: Ngram) {
        *self.counts.entry(ngram).or_insert(0) += 1;
    }

    pub fn get(&self, ngram: &[String]) -> usize {
        self.counts.get(ngram).copied().unwrap_or(0)
    }

    /// Number of distinct n-grams
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ngram, usize)> {
        self.counts.iter().map(|(ngram, &count)| (ngram, count))
    }

    /// The `k` most frequent n-grams; equal counts keep first-encounter order
    pub fn top_k(&self, k: usize) -> Vec<NgramFrequency> {
        let mut entries: Vec<NgramFrequency> = self
            .counts
            .iter()
            .map(|(ngram, &count)| NgramFrequency {
                ngram: ngram.clone(),
                count,
            })
            .collect();

        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.truncate(k);
        entries
    }
}

/// Ranked n-gram with its count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramFrequency {
    pub ngram: Ngram,
    pub count: usize,
}

impl NgramFrequency {
    /// Pattern joined with `-`, e.g. `DET-NOUN`
    pub fn pattern(&self) -> String {
        self.ngram.join("-")
    }
}

/// Count n-grams across all sentences of one language
pub fn count_ngrams(sentences: &[TagSequence], n: usize) -> NgramCounts {
    let mut counts = NgramCounts::new();
    for sentence in sentences {
        for ngram in extract_ngrams(sentence, n) {
            counts.add(ngram);
        }
    }
    counts
}

/// Ranked tops for several n-gram sizes, keyed language → n
pub type NgramReport = BTreeMap<String, BTreeMap<usize, Vec<NgramFrequency>>>;

/// Top `top_k` n-grams for every language and every size in `sizes`
pub fn analyze_ngrams(
    language_sequences: &BTreeMap<String, Vec<TagSequence>>,
    sizes: &[usize],
    top_k: usize,
) -> NgramReport {
    language_sequences
        .par_iter()
        .map(|(language, sentences)| {
            let per_size: BTreeMap<usize, Vec<NgramFrequency>> = sizes
                .iter()
                .map(|&n| (n, count_ngrams(sentences, n).top_k(top_k)))
                .collect();
            (language.clone(), per_size)
        })
        .collect()
}
