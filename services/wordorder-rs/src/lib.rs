//! Word-order similarity kernel for Universal Dependencies treebanks.
//!
//! Provides:
//! - Edit distance over tag sequences of parallel sentences
//! - N-gram frequency ranking of tag patterns
//! - Head-direction statistics and per-language feature vectors
//! - Cosine and Euclidean language distance matrices
//!
//! Python bindings are built with the `python` feature.

pub mod categories;
pub mod config;
pub mod corpus;
pub mod distance;
pub mod edit_distance;
pub mod error;
pub mod head_direction;
pub mod ngram;
pub mod phrase;
pub mod report;
pub mod tags;
pub mod types;

#[cfg(feature = "python")]
mod python;

pub use config::AnalysisConfig;
pub use distance::{
    cosine_distance_matrix, euclidean_distance_matrix, most_similar_pairs, DistanceMatrix,
    DistanceMetric, LanguagePair,
};
pub use edit_distance::{edit_distance, normalized_edit_distance, pairwise_language_distance};
pub use error::{AnalysisError, Result};
pub use head_direction::{
    build_feature_vectors, extract_head_dependent_pairs, head_initial_rates, FeatureOptions,
    FeatureVectors,
};
pub use ngram::{count_ngrams, extract_ngrams, NgramCounts};
pub use tags::TagKind;
pub use types::{DepToken, PairStats, RelationPairKey, Sentence, TagSequence};
