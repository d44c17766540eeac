//! PyO3 bindings exposing the kernel as the `wordorder_core` Python module.

use std::collections::{BTreeMap, HashMap};

use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::config::AnalysisConfig;
use crate::corpus::{load_corpus_dir, parse_conllu};
use crate::distance::{cosine_distance_matrix, euclidean_distance_matrix, most_similar_pairs};
use crate::edit_distance::{
    align_sequences, edit_distance, normalized_edit_distance, pairwise_language_distance,
};
use crate::error::AnalysisError;
use crate::head_direction::{build_feature_vectors, extract_head_dependent_pairs, FeatureOptions};
use crate::ngram::{count_ngrams, extract_ngrams};
use crate::report::{analyze_head_direction, analyze_word_order};
use crate::tags::{tag_sequences, TagKind};
use crate::types::{Alignment, DepToken, Sentence, TagSequence};

impl From<AnalysisError> for PyErr {
    fn from(err: AnalysisError) -> Self {
        match &err {
            AnalysisError::Io { .. } => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// (id, head, upos, deprel) as passed from Python
type PyToken = (u32, u32, Option<String>, Option<String>);

fn to_sentences(raw: Vec<Vec<PyToken>>) -> Vec<Sentence> {
    raw.into_iter()
        .map(|tokens| {
            Sentence::new(
                tokens
                    .into_iter()
                    .map(|(id, head, upos, deprel)| DepToken {
                        id,
                        form: String::new(),
                        upos,
                        head,
                        deprel,
                    })
                    .collect(),
            )
        })
        .collect()
}

fn to_corpus(raw: HashMap<String, Vec<Vec<PyToken>>>) -> BTreeMap<String, Vec<Sentence>> {
    raw.into_iter()
        .map(|(language, sentences)| (language, to_sentences(sentences)))
        .collect()
}

fn parse_tag_kind(kind: &str) -> PyResult<TagKind> {
    TagKind::ALL
        .into_iter()
        .find(|k| k.as_str() == kind)
        .ok_or_else(|| PyValueError::new_err(format!("unknown tag kind: {kind}")))
}

fn parse_config(config_json: Option<&str>) -> PyResult<AnalysisConfig> {
    match config_json {
        Some(json) => Ok(AnalysisConfig::from_json_str(json)?),
        None => Ok(AnalysisConfig::default()),
    }
}

// ============================================================================
// EDIT DISTANCE FUNCTIONS
// ============================================================================

#[pyfunction]
fn py_edit_distance(seq_a: Vec<String>, seq_b: Vec<String>) -> PyResult<usize> {
    Ok(edit_distance(&seq_a, &seq_b))
}

#[pyfunction]
fn py_normalized_edit_distance(seq_a: Vec<String>, seq_b: Vec<String>) -> PyResult<f64> {
    Ok(normalized_edit_distance(&seq_a, &seq_b))
}

#[pyfunction]
fn py_align_sequences(seq_a: Vec<String>, seq_b: Vec<String>) -> PyResult<PyAlignment> {
    Ok(PyAlignment::from(align_sequences(&seq_a, &seq_b)))
}

#[pyfunction]
#[pyo3(signature = (language_sequences, sample_size=None))]
fn py_pairwise_language_distance<'py>(
    py: Python<'py>,
    language_sequences: HashMap<String, Vec<TagSequence>>,
    sample_size: Option<usize>,
) -> PyResult<(&'py PyArray2<f64>, Vec<String>)> {
    let sequences: BTreeMap<String, Vec<TagSequence>> = language_sequences.into_iter().collect();
    let matrix = pairwise_language_distance(&sequences, sample_size)?;
    Ok((matrix.values.into_pyarray(py), matrix.languages))
}

// ============================================================================
// N-GRAM FUNCTIONS
// ============================================================================

#[pyfunction]
fn py_extract_ngrams(sequence: Vec<String>, n: usize) -> PyResult<Vec<Vec<String>>> {
    Ok(extract_ngrams(&sequence, n))
}

#[pyfunction]
fn py_top_ngrams(
    sentences: Vec<TagSequence>,
    n: usize,
    k: usize,
) -> PyResult<Vec<(Vec<String>, usize)>> {
    Ok(count_ngrams(&sentences, n)
        .top_k(k)
        .into_iter()
        .map(|entry| (entry.ngram, entry.count))
        .collect())
}

// ============================================================================
// HEAD DIRECTION FUNCTIONS
// ============================================================================

#[pyfunction]
#[pyo3(signature = (sentences, use_merged=false, exclude_punct=true))]
fn py_extract_head_dependent_pairs(
    sentences: Vec<Vec<PyToken>>,
    use_merged: bool,
    exclude_punct: bool,
) -> PyResult<Vec<((String, String, String), (u64, u64))>> {
    let counts = extract_head_dependent_pairs(&to_sentences(sentences), use_merged, exclude_punct);
    Ok(counts
        .into_iter()
        .map(|(key, stats)| {
            (
                (key.head, key.dependent, key.relation),
                (stats.head_initial, stats.total),
            )
        })
        .collect())
}

#[pyfunction]
#[pyo3(signature = (corpus, use_merged=false, min_occurrences=10, min_languages=None))]
fn py_build_feature_vectors<'py>(
    py: Python<'py>,
    corpus: HashMap<String, Vec<Vec<PyToken>>>,
    use_merged: bool,
    min_occurrences: u64,
    min_languages: Option<usize>,
) -> PyResult<(&'py PyArray2<f64>, Vec<String>, Vec<(String, String, String)>)> {
    let options = FeatureOptions {
        use_merged,
        min_occurrences,
        min_languages,
        ..FeatureOptions::default()
    };
    let features = build_feature_vectors(&to_corpus(corpus), &options);
    let keys = features
        .keys
        .into_iter()
        .map(|key| (key.head, key.dependent, key.relation))
        .collect();
    Ok((features.matrix.into_pyarray(py), features.languages, keys))
}

// ============================================================================
// DISTANCE FUNCTIONS
// ============================================================================

#[pyfunction]
fn py_cosine_distance_matrix<'py>(
    py: Python<'py>,
    features: PyReadonlyArray2<'py, f64>,
) -> &'py PyArray2<f64> {
    cosine_distance_matrix(features.as_array()).into_pyarray(py)
}

#[pyfunction]
fn py_euclidean_distance_matrix<'py>(
    py: Python<'py>,
    features: PyReadonlyArray2<'py, f64>,
) -> &'py PyArray2<f64> {
    euclidean_distance_matrix(features.as_array()).into_pyarray(py)
}

#[pyfunction]
#[pyo3(signature = (matrix, languages, top_n=10))]
fn py_most_similar_pairs(
    matrix: PyReadonlyArray2<'_, f64>,
    languages: Vec<String>,
    top_n: usize,
) -> PyResult<Vec<(String, String, f64)>> {
    let pairs = most_similar_pairs(matrix.as_array(), &languages, top_n)?;
    Ok(pairs
        .into_iter()
        .map(|pair| (pair.lang_a, pair.lang_b, pair.distance))
        .collect())
}

// ============================================================================
// CORPUS AND REPORT FUNCTIONS
// ============================================================================

#[pyfunction]
#[pyo3(signature = (input, kind="upos"))]
fn py_conllu_tag_sequences(input: &str, kind: &str) -> PyResult<Vec<TagSequence>> {
    let kind = parse_tag_kind(kind)?;
    Ok(tag_sequences(&parse_conllu(input), kind))
}

#[pyfunction]
#[pyo3(signature = (corpus_dir, kind="upos", config_json=None))]
fn py_word_order_report(
    corpus_dir: &str,
    kind: &str,
    config_json: Option<&str>,
) -> PyResult<String> {
    let kind = parse_tag_kind(kind)?;
    let config = parse_config(config_json)?;
    let corpus = load_corpus_dir(corpus_dir)?;
    Ok(analyze_word_order(&corpus, kind, &config)?.to_json()?)
}

#[pyfunction]
#[pyo3(signature = (corpus_dir, config_json=None))]
fn py_head_direction_report(corpus_dir: &str, config_json: Option<&str>) -> PyResult<String> {
    let config = parse_config(config_json)?;
    let corpus = load_corpus_dir(corpus_dir)?;
    Ok(analyze_head_direction(&corpus, &config)?.to_json()?)
}

// ============================================================================
// PYTHON WRAPPER TYPES
// ============================================================================

#[pyclass]
struct PyAlignment {
    #[pyo3(get)]
    sequence_a: Vec<String>,
    #[pyo3(get)]
    sequence_b: Vec<String>,
    #[pyo3(get)]
    cost: usize,
    inner: Alignment,
}

impl From<Alignment> for PyAlignment {
    fn from(alignment: Alignment) -> Self {
        Self {
            sequence_a: alignment.sequence_a.clone(),
            sequence_b: alignment.sequence_b.clone(),
            cost: alignment.cost,
            inner: alignment,
        }
    }
}

#[pymethods]
impl PyAlignment {
    fn substitutions(&self) -> Vec<(String, String)> {
        self.inner.substitutions()
    }
}

// ============================================================================
// MODULE DEFINITION
// ============================================================================

#[pymodule]
fn wordorder_core(_py: Python, m: &PyModule) -> PyResult<()> {
    // Edit distance functions
    m.add_function(wrap_pyfunction!(py_edit_distance, m)?)?;
    m.add_function(wrap_pyfunction!(py_normalized_edit_distance, m)?)?;
    m.add_function(wrap_pyfunction!(py_align_sequences, m)?)?;
    m.add_function(wrap_pyfunction!(py_pairwise_language_distance, m)?)?;

    // N-gram functions
    m.add_function(wrap_pyfunction!(py_extract_ngrams, m)?)?;
    m.add_function(wrap_pyfunction!(py_top_ngrams, m)?)?;

    // Head direction functions
    m.add_function(wrap_pyfunction!(py_extract_head_dependent_pairs, m)?)?;
    m.add_function(wrap_pyfunction!(py_build_feature_vectors, m)?)?;

    // Distance functions
    m.add_function(wrap_pyfunction!(py_cosine_distance_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(py_euclidean_distance_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(py_most_similar_pairs, m)?)?;

    // Corpus and report functions
    m.add_function(wrap_pyfunction!(py_conllu_tag_sequences, m)?)?;
    m.add_function(wrap_pyfunction!(py_word_order_report, m)?)?;
    m.add_function(wrap_pyfunction!(py_head_direction_report, m)?)?;

    m.add_class::<PyAlignment>()?;

    Ok(())
}
