//! Head-dependent directionality statistics and per-language feature vectors.
//!
//! Every non-root dependency is classified by whether its head precedes the
//! dependent in the sentence. Counts are kept per (head tag, dependent tag,
//! base relation) key; the head-initial rate of a key is 1.0 for a strictly
//! head-first pattern (English verb-object), 0.0 for head-final (Japanese
//! verb-object), and around 0.5 when order varies.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;
use log::{debug, info, warn};
use ndarray::Array2;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::categories::{merge_deprel, merge_upos, PUNCT};
use crate::types::{DepToken, PairStats, RelationPairKey, Sentence};

/// Rate assigned to a key a language never exhibits
pub const NEUTRAL_RATE: f64 = 0.5;

/// Per-key direction counts for one language
pub type PairCounts = BTreeMap<RelationPairKey, PairStats>;

/// Thresholds and tag handling for feature extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureOptions {
    /// Remap tags and relations through the coarse category tables
    pub use_merged: bool,
    pub exclude_punct: bool,
    /// Minimum total count for a key to be supported in a language
    pub min_occurrences: u64,
    /// Minimum number of supporting languages; `None` means half, at least one
    pub min_languages: Option<usize>,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            use_merged: false,
            exclude_punct: true,
            min_occurrences: 10,
            min_languages: None,
        }
    }
}

impl FeatureOptions {
    pub fn min_languages_for(&self, n_languages: usize) -> usize {
        self.min_languages
            .unwrap_or_else(|| std::cmp::max(1, n_languages / 2))
    }
}

/// Relation-pair key for one token and its head, or `None` when the pair is skipped
fn pair_key(
    head: &DepToken,
    dependent: &DepToken,
    use_merged: bool,
    exclude_punct: bool,
) -> Option<RelationPairKey> {
    let head_upos = head.upos()?;
    let dep_upos = dependent.upos()?;
    let deprel = dependent.deprel()?;

    if exclude_punct && (head_upos == PUNCT || dep_upos == PUNCT) {
        return None;
    }

    let key = if use_merged {
        RelationPairKey::new(merge_upos(head_upos), merge_upos(dep_upos), merge_deprel(deprel))
    } else {
        RelationPairKey::new(head_upos, dep_upos, crate::types::base_relation(deprel))
    };
    Some(key)
}

/// Count head-initial and total occurrences of every relation pair.
///
/// Root tokens, unresolvable heads and tokens missing a tag or relation are
/// skipped silently.
pub fn extract_head_dependent_pairs(
    sentences: &[Sentence],
    use_merged: bool,
    exclude_punct: bool,
) -> PairCounts {
    let mut counts = PairCounts::new();

    for sentence in sentences {
        let by_id: FxHashMap<u32, &DepToken> =
            sentence.tokens.iter().map(|token| (token.id, token)).collect();

        for token in &sentence.tokens {
            if token.is_root() {
                continue;
            }
            let Some(head) = by_id.get(&token.head) else {
                continue;
            };
            let Some(key) = pair_key(head, token, use_merged, exclude_punct) else {
                continue;
            };

            counts.entry(key).or_default().record(head.id < token.id);
        }
    }

    counts
}

/// Head-initial rate per key; 0.5 for keys with no occurrences
pub fn head_initial_rates(pair_counts: &PairCounts) -> BTreeMap<RelationPairKey, f64> {
    pair_counts
        .iter()
        .map(|(key, stats)| (key.clone(), stats.rate()))
        .collect()
}

/// Language × relation-pair matrix of head-initial rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVectors {
    /// Row labels, sorted
    pub languages: Vec<String>,
    /// Column labels, sorted
    pub keys: Vec<RelationPairKey>,
    pub matrix: Array2<f64>,
}

impl FeatureVectors {
    fn empty(languages: Vec<String>) -> Self {
        Self {
            languages,
            keys: Vec::new(),
            matrix: Array2::zeros((0, 0)),
        }
    }

    /// No key met the thresholds
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn rate(&self, language: &str, key: &RelationPairKey) -> Option<f64> {
        let row = self.languages.iter().position(|l| l == language)?;
        let col = self.keys.binary_search(key).ok()?;
        Some(self.matrix[[row, col]])
    }
}

fn pair_counts_per_language(
    corpus: &BTreeMap<String, Vec<Sentence>>,
    options: &FeatureOptions,
) -> BTreeMap<String, PairCounts> {
    corpus
        .par_iter()
        .map(|(language, sentences)| {
            let counts =
                extract_head_dependent_pairs(sentences, options.use_merged, options.exclude_punct);
            debug!("{}: {} relation pairs", language, counts.len());
            (language.clone(), counts)
        })
        .collect()
}

/// Build the shared feature space and every language's vector in it.
///
/// A key enters the feature space when at least `min_languages` languages
/// observe it `min_occurrences` times or more. Absent keys default to 0.5.
/// When no key qualifies the result is empty, which is not an error.
pub fn build_feature_vectors(
    corpus: &BTreeMap<String, Vec<Sentence>>,
    options: &FeatureOptions,
) -> FeatureVectors {
    let languages: Vec<String> = corpus.keys().cloned().collect();
    let min_languages = options.min_languages_for(languages.len());

    info!(
        "building feature vectors: {} languages, merged={}, min_occurrences={}, min_languages={}",
        languages.len(),
        options.use_merged,
        options.min_occurrences,
        min_languages
    );

    let per_language = pair_counts_per_language(corpus, options);

    let mut support: AHashMap<&RelationPairKey, usize> = AHashMap::new();
    for counts in per_language.values() {
        for (key, stats) in counts {
            if stats.total >= options.min_occurrences {
                *support.entry(key).or_insert(0) += 1;
            }
        }
    }

    let mut keys: Vec<RelationPairKey> = support
        .into_iter()
        .filter(|&(_, n_langs)| n_langs >= min_languages)
        .map(|(key, _)| key.clone())
        .collect();
    keys.sort();

    info!("{} common relation pairs", keys.len());

    if keys.is_empty() {
        warn!("no relation pair meets the thresholds; lower min_occurrences or min_languages");
        return FeatureVectors::empty(languages);
    }

    let mut matrix = Array2::<f64>::from_elem((languages.len(), keys.len()), NEUTRAL_RATE);
    for (i, language) in languages.iter().enumerate() {
        let Some(counts) = per_language.get(language) else {
            continue;
        };
        for (j, key) in keys.iter().enumerate() {
            if let Some(stats) = counts.get(key) {
                matrix[[i, j]] = stats.rate();
            }
        }
    }

    FeatureVectors {
        languages,
        keys,
        matrix,
    }
}

/// One relation pair's rates across languages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    pub key: RelationPairKey,
    /// Aligned with [`RateTable::languages`]; `None` where the key is unsupported
    pub rates: Vec<Option<f64>>,
}

/// Per-(relation pair, language) head-initial rates for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub languages: Vec<String>,
    pub rows: Vec<RateRow>,
}

/// Rates of every key some language supports with at least `min_occurrences` observations
pub fn head_initial_rate_table(
    corpus: &BTreeMap<String, Vec<Sentence>>,
    options: &FeatureOptions,
) -> RateTable {
    let per_language = pair_counts_per_language(corpus, options);
    let languages: Vec<String> = per_language.keys().cloned().collect();

    let supported: BTreeMap<&String, BTreeMap<&RelationPairKey, f64>> = per_language
        .iter()
        .map(|(language, counts)| {
            let rates = counts
                .iter()
                .filter(|(_, stats)| stats.total >= options.min_occurrences)
                .map(|(key, stats)| (key, stats.rate()))
                .collect();
            (language, rates)
        })
        .collect();

    let all_keys: BTreeSet<&RelationPairKey> = supported
        .values()
        .flat_map(|rates| rates.keys().copied())
        .collect();

    let rows = all_keys
        .into_iter()
        .map(|key| RateRow {
            key: key.clone(),
            rates: supported
                .values()
                .map(|rates| rates.get(key).copied())
                .collect(),
        })
        .collect();

    RateTable { languages, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svo_sentence() -> Sentence {
        Sentence::new(vec![
            DepToken::new(1, "NOUN", 2, "nsubj"),
            DepToken::new(2, "VERB", 0, "root"),
            DepToken::new(3, "NOUN", 2, "obj"),
        ])
    }

    #[test]
    fn test_direction_counting() {
        let counts = extract_head_dependent_pairs(&[svo_sentence()], false, true);

        let subj = counts[&RelationPairKey::new("VERB", "NOUN", "nsubj")];
        assert_eq!(subj, PairStats { head_initial: 0, total: 1 });

        let obj = counts[&RelationPairKey::new("VERB", "NOUN", "obj")];
        assert_eq!(obj, PairStats { head_initial: 1, total: 1 });

        // Root never contributes
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_subtype_is_stripped() {
        let sentence = Sentence::new(vec![
            DepToken::new(1, "NOUN", 2, "nsubj:pass"),
            DepToken::new(2, "VERB", 0, "root"),
        ]);
        let counts = extract_head_dependent_pairs(&[sentence], false, true);
        assert!(counts.contains_key(&RelationPairKey::new("VERB", "NOUN", "nsubj")));
    }

    #[test]
    fn test_malformed_tokens_are_skipped() {
        let mut missing_tag = DepToken::new(3, "NOUN", 2, "obj");
        missing_tag.upos = None;
        let mut empty_rel = DepToken::new(4, "ADV", 2, "advmod");
        empty_rel.deprel = Some(String::new());

        let sentence = Sentence::new(vec![
            DepToken::new(1, "NOUN", 9, "nsubj"), // dangling head
            DepToken::new(2, "VERB", 0, "root"),
            missing_tag,
            empty_rel,
        ]);
        assert!(extract_head_dependent_pairs(&[sentence], false, true).is_empty());
    }

    #[test]
    fn test_punctuation_filter() {
        let sentence = Sentence::new(vec![
            DepToken::new(1, "VERB", 0, "root"),
            DepToken::new(2, "PUNCT", 1, "punct"),
        ]);
        assert!(extract_head_dependent_pairs(&[sentence.clone()], false, true).is_empty());
        assert_eq!(extract_head_dependent_pairs(&[sentence], false, false).len(), 1);
    }

    #[test]
    fn test_merged_categories() {
        let sentence = Sentence::new(vec![
            DepToken::new(1, "PRON", 2, "nsubj"),
            DepToken::new(2, "AUX", 0, "root"),
            DepToken::new(3, "PROPN", 2, "iobj"),
        ]);
        let counts = extract_head_dependent_pairs(&[sentence], true, true);
        let key = RelationPairKey::new("VERBAL", "NOMINAL", "CORE_ARG");
        assert_eq!(counts[&key], PairStats { head_initial: 1, total: 2 });
    }

    #[test]
    fn test_zero_total_rate_is_neutral() {
        let mut counts = PairCounts::new();
        counts.insert(RelationPairKey::new("VERB", "NOUN", "obj"), PairStats::default());
        let rates = head_initial_rates(&counts);
        assert_eq!(rates[&RelationPairKey::new("VERB", "NOUN", "obj")], 0.5);
    }

    #[test]
    fn test_thresholds_above_counts_give_empty_result() {
        let mut corpus = BTreeMap::new();
        corpus.insert("English".to_string(), vec![svo_sentence()]);
        let options = FeatureOptions {
            min_occurrences: 1_000,
            ..FeatureOptions::default()
        };
        let features = build_feature_vectors(&corpus, &options);
        assert!(features.is_empty());
        assert_eq!(features.matrix.len(), 0);
        assert_eq!(features.languages, vec!["English".to_string()]);
    }

    #[test]
    fn test_default_min_languages() {
        let options = FeatureOptions::default();
        assert_eq!(options.min_languages_for(0), 1);
        assert_eq!(options.min_languages_for(5), 2);
        assert_eq!(options.min_languages_for(20), 10);
    }
}
