//! Edit distance over tag sequences and parallel-corpus language distances.

use std::collections::BTreeMap;

use log::{debug, info};
use ndarray::Array2;
use rayon::prelude::*;

use crate::distance::DistanceMatrix;
use crate::error::{AnalysisError, Result};
use crate::types::{Alignment, EditOp, TagSequence, GAP};

/// Fill the (m+1)×(n+1) edit-distance table with unit costs
fn edit_table<T: PartialEq>(a: &[T], b: &[T]) -> Array2<usize> {
    let len_a = a.len();
    let len_b = b.len();

    let mut dp = Array2::<usize>::zeros((len_a + 1, len_b + 1));

    for i in 0..=len_a {
        dp[[i, 0]] = i;
    }
    for j in 0..=len_b {
        dp[[0, j]] = j;
    }

    for i in 1..=len_a {
        for j in 1..=len_b {
            dp[[i, j]] = if a[i - 1] == b[j - 1] {
                dp[[i - 1, j - 1]]
            } else {
                1 + dp[[i - 1, j]]
                    .min(dp[[i, j - 1]])
                    .min(dp[[i - 1, j - 1]])
            };
        }
    }

    dp
}

/// Minimum number of insertions, deletions and substitutions turning `a` into `b`
pub fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    edit_table(a, b)[[a.len(), b.len()]]
}

/// Edit distance divided by the longer length, in [0, 1].
///
/// Two empty sequences are at distance 0.0.
pub fn normalized_edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 0.0;
    }

    edit_distance(a, b) as f64 / max_len as f64
}

/// Align two tag sequences by backtracking the edit-distance table
pub fn align_sequences(a: &[String], b: &[String]) -> Alignment {
    let table = edit_table(a, b);

    let mut i = a.len();
    let mut j = b.len();
    let mut operations = Vec::new();
    let mut aligned_a = Vec::new();
    let mut aligned_b = Vec::new();

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1] == b[j - 1] && table[[i, j]] == table[[i - 1, j - 1]] {
            operations.push(EditOp::Match);
            aligned_a.push(a[i - 1].clone());
            aligned_b.push(b[j - 1].clone());
            i -= 1;
            j -= 1;
        } else if i > 0 && j > 0 && table[[i, j]] == table[[i - 1, j - 1]] + 1 {
            operations.push(EditOp::Substitute);
            aligned_a.push(a[i - 1].clone());
            aligned_b.push(b[j - 1].clone());
            i -= 1;
            j -= 1;
        } else if i > 0 && table[[i, j]] == table[[i - 1, j]] + 1 {
            operations.push(EditOp::Delete);
            aligned_a.push(a[i - 1].clone());
            aligned_b.push(GAP.to_string());
            i -= 1;
        } else {
            operations.push(EditOp::Insert);
            aligned_a.push(GAP.to_string());
            aligned_b.push(b[j - 1].clone());
            j -= 1;
        }
    }

    // Reverse since we backtracked
    operations.reverse();
    aligned_a.reverse();
    aligned_b.reverse();

    Alignment::new(aligned_a, aligned_b, operations, table[[a.len(), b.len()]])
}

/// Average normalized edit distance between every pair of languages.
///
/// Sentence `i` of every language is assumed to translate the same source
/// sentence. The assumption is not checked: misaligned corpora give
/// meaningless but well-formed numbers. At most `sample_size` aligned
/// sentences are compared, and never more than the shortest collection.
pub fn pairwise_language_distance(
    language_sequences: &BTreeMap<String, Vec<TagSequence>>,
    sample_size: Option<usize>,
) -> Result<DistanceMatrix> {
    if language_sequences.is_empty() {
        return Err(AnalysisError::EmptyCorpus);
    }

    let languages: Vec<String> = language_sequences.keys().cloned().collect();
    let collections: Vec<&Vec<TagSequence>> = language_sequences.values().collect();
    let n_langs = languages.len();

    let mut compared = collections.iter().map(|c| c.len()).min().unwrap_or(0);
    if let Some(cap) = sample_size {
        compared = compared.min(cap);
    }

    if compared == 0 {
        return Err(AnalysisError::NoComparableSentences { languages: n_langs });
    }

    info!(
        "comparing {} aligned sentences across {} languages",
        compared, n_langs
    );

    let pairs: Vec<(usize, usize)> = (0..n_langs)
        .flat_map(|i| (i + 1..n_langs).map(move |j| (i, j)))
        .collect();

    let averages: Vec<f64> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let total: f64 = collections[i][..compared]
                .iter()
                .zip(&collections[j][..compared])
                .map(|(seq_a, seq_b)| normalized_edit_distance(seq_a, seq_b))
                .sum();
            total / compared as f64
        })
        .collect();

    let mut matrix = Array2::<f64>::zeros((n_langs, n_langs));
    for (&(i, j), &avg) in pairs.iter().zip(&averages) {
        debug!("{} - {}: {:.4}", languages[i], languages[j], avg);
        matrix[[i, j]] = avg;
        matrix[[j, i]] = avg;
    }

    DistanceMatrix::new(languages, matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_identical_sequences() {
        let s = seq(&["DET", "NOUN", "VERB"]);
        assert_eq!(edit_distance(&s, &s), 0);
    }

    #[test]
    fn test_symmetry() {
        let a = seq(&["DET", "NOUN", "VERB", "ADP"]);
        let b = seq(&["NOUN", "ADP", "VERB"]);
        assert_eq!(edit_distance(&a, &b), edit_distance(&b, &a));
    }

    #[test]
    fn test_empty_sequence() {
        let b = seq(&["A", "B", "C"]);
        assert_eq!(edit_distance::<String>(&[], &b), 3);
        assert_eq!(edit_distance::<String>(&b, &[]), 3);
        assert_eq!(normalized_edit_distance::<String>(&[], &[]), 0.0);
    }

    #[test]
    fn test_one_substitution() {
        let a = seq(&["A", "B", "C"]);
        let b = seq(&["A", "B", "D"]);
        assert!((normalized_edit_distance(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_word_order_swap() {
        // SVO vs SOV: one deletion plus one insertion
        let svo = seq(&["NOUN", "VERB", "NOUN"]);
        let sov = seq(&["NOUN", "NOUN", "VERB"]);
        assert_eq!(edit_distance(&svo, &sov), 2);
    }

    #[test]
    fn test_alignment_cost_matches_distance() {
        let a = seq(&["DET", "NOUN", "VERB"]);
        let b = seq(&["NOUN", "VERB", "ADV"]);
        let alignment = align_sequences(&a, &b);
        assert_eq!(alignment.cost, edit_distance(&a, &b));
        assert_eq!(alignment.sequence_a.len(), alignment.sequence_b.len());
        assert_eq!(alignment.operations.len(), alignment.sequence_a.len());
    }

    #[test]
    fn test_alignment_substitutions() {
        let a = seq(&["A", "B", "C"]);
        let b = seq(&["A", "X", "C"]);
        let alignment = align_sequences(&a, &b);
        assert_eq!(alignment.substitutions(), vec![("B".to_string(), "X".to_string())]);
    }

    #[test]
    fn test_pairwise_rejects_zero_sentences() {
        let mut corpus = BTreeMap::new();
        corpus.insert("English".to_string(), vec![seq(&["NOUN"])]);
        corpus.insert("Japanese".to_string(), vec![]);
        assert!(matches!(
            pairwise_language_distance(&corpus, None),
            Err(AnalysisError::NoComparableSentences { languages: 2 })
        ));
    }
}
