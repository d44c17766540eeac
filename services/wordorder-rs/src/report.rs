//! End-to-end analyses producing serializable reports.

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::distance::{DistanceMatrix, DistanceMetric, LanguagePair};
use crate::edit_distance::pairwise_language_distance;
use crate::error::Result;
use crate::head_direction::{
    build_feature_vectors, head_initial_rate_table, FeatureVectors, RateTable,
};
use crate::ngram::{analyze_ngrams, NgramReport};
use crate::tags::{corpus_tag_sequences, TagKind};
use crate::types::Sentence;

/// Edit-distance and n-gram comparison for one tag kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordOrderReport {
    pub tag_kind: TagKind,
    pub compared_sentences: usize,
    pub distances: DistanceMatrix,
    pub most_similar: Vec<LanguagePair>,
    pub ngrams: NgramReport,
}

/// Distances computed under one metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricResult {
    pub metric: DistanceMetric,
    pub distances: DistanceMatrix,
    pub most_similar: Vec<LanguagePair>,
}

/// Head-direction feature vectors and the language distances derived from them.
///
/// `cosine` and `euclidean` are `None` when no relation pair met the thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadDirectionReport {
    pub features: FeatureVectors,
    pub cosine: Option<MetricResult>,
    pub euclidean: Option<MetricResult>,
    pub rates: RateTable,
}

impl WordOrderReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl HeadDirectionReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Compare languages by tag-sequence edit distance over aligned sentences
pub fn analyze_word_order(
    corpus: &BTreeMap<String, Vec<Sentence>>,
    kind: TagKind,
    config: &AnalysisConfig,
) -> Result<WordOrderReport> {
    config.validate()?;
    info!("word order analysis on {} sequences", kind);

    let sequences = corpus_tag_sequences(corpus, kind);
    let distances = pairwise_language_distance(&sequences, config.sample_size)?;

    let shortest = sequences.values().map(Vec::len).min().unwrap_or(0);
    let compared_sentences = config.sample_size.map_or(shortest, |cap| shortest.min(cap));

    let most_similar = distances.most_similar_pairs(config.top_pairs)?;
    let ngrams = analyze_ngrams(&sequences, &config.ngram_sizes, config.ngram_top_k);

    Ok(WordOrderReport {
        tag_kind: kind,
        compared_sentences,
        distances,
        most_similar,
        ngrams,
    })
}

fn metric_result(
    features: &FeatureVectors,
    metric: DistanceMetric,
    top_pairs: usize,
) -> Result<MetricResult> {
    let values = metric.compute(features.matrix.view());
    let distances = DistanceMatrix::new(features.languages.clone(), values)?;
    let most_similar = distances.most_similar_pairs(top_pairs)?;
    Ok(MetricResult {
        metric,
        distances,
        most_similar,
    })
}

/// Compare languages by their head-initial feature vectors
pub fn analyze_head_direction(
    corpus: &BTreeMap<String, Vec<Sentence>>,
    config: &AnalysisConfig,
) -> Result<HeadDirectionReport> {
    config.validate()?;

    let options = &config.head_direction;
    let features = build_feature_vectors(corpus, options);
    let rates = head_initial_rate_table(corpus, options);

    let (cosine, euclidean) = if features.is_empty() {
        (None, None)
    } else {
        (
            Some(metric_result(&features, DistanceMetric::Cosine, config.top_pairs)?),
            Some(metric_result(&features, DistanceMetric::Euclidean, config.top_pairs)?),
        )
    };

    Ok(HeadDirectionReport {
        features,
        cosine,
        euclidean,
        rates,
    })
}
