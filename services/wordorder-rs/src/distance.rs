//! Pairwise distances between per-language feature vectors.

use ndarray::{Array2, ArrayView1, ArrayView2};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Vector metric used to compare languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    Cosine,
    Euclidean,
}

impl DistanceMetric {
    pub fn compute(self, features: ArrayView2<'_, f64>) -> Array2<f64> {
        match self {
            Self::Cosine => cosine_distance_matrix(features),
            Self::Euclidean => euclidean_distance_matrix(features),
        }
    }
}

/// Square language distance matrix with its row/column labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    pub languages: Vec<String>,
    pub values: Array2<f64>,
}

impl DistanceMatrix {
    pub fn new(languages: Vec<String>, values: Array2<f64>) -> Result<Self> {
        let (rows, cols) = values.dim();
        if rows != cols || rows != languages.len() {
            return Err(AnalysisError::ShapeMismatch {
                rows,
                cols,
                labels: languages.len(),
            });
        }
        Ok(Self { languages, values })
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Distance between two languages by name
    pub fn get(&self, lang_a: &str, lang_b: &str) -> Option<f64> {
        let i = self.languages.iter().position(|l| l == lang_a)?;
        let j = self.languages.iter().position(|l| l == lang_b)?;
        Some(self.values[[i, j]])
    }

    pub fn most_similar_pairs(&self, top_n: usize) -> Result<Vec<LanguagePair>> {
        most_similar_pairs(self.values.view(), &self.languages, top_n)
    }

    /// Matrix as nested rows for external consumers
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.outer_iter().map(|row| row.to_vec()).collect()
    }
}

/// Two languages and the distance between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub lang_a: String,
    pub lang_b: String,
    pub distance: f64,
}

fn dot(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.dot(&b)
}

/// Fill a symmetric matrix from the upper triangle, diagonal left at zero
fn symmetric_from_pairs<F>(n: usize, pair_value: F) -> Array2<f64>
where
    F: Fn(usize, usize) -> f64 + Sync,
{
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect();

    let values: Vec<f64> = pairs.par_iter().map(|&(i, j)| pair_value(i, j)).collect();

    let mut matrix = Array2::<f64>::zeros((n, n));
    for (&(i, j), &value) in pairs.iter().zip(&values) {
        matrix[[i, j]] = value;
        matrix[[j, i]] = value;
    }
    matrix
}

/// `1 - cosine similarity` between every pair of rows.
///
/// Negative values from rounding are clipped to 0 and the diagonal is exactly 0.
/// A zero row has similarity 0 with every other row.
pub fn cosine_distance_matrix(features: ArrayView2<'_, f64>) -> Array2<f64> {
    let n = features.nrows();
    let norms: Vec<f64> = features
        .outer_iter()
        .map(|row| dot(row, row).sqrt())
        .collect();

    symmetric_from_pairs(n, |i, j| {
        let denom = norms[i] * norms[j];
        let similarity = if denom > 0.0 {
            dot(features.row(i), features.row(j)) / denom
        } else {
            0.0
        };
        (1.0 - similarity).max(0.0)
    })
}

/// Euclidean distance between rows divided by `sqrt(dimensions)`.
///
/// With zero dimensions every distance is 0 and no scaling is applied.
pub fn euclidean_distance_matrix(features: ArrayView2<'_, f64>) -> Array2<f64> {
    let n = features.nrows();
    let dims = features.ncols();

    let mut matrix = symmetric_from_pairs(n, |i, j| {
        features
            .row(i)
            .iter()
            .zip(features.row(j).iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    });

    let max_possible = (dims as f64).sqrt();
    if max_possible > 0.0 {
        matrix /= max_possible;
    }
    matrix
}

/// The `top_n` closest unordered language pairs, ascending by distance.
///
/// Equal distances keep (i, j) iteration order.
pub fn most_similar_pairs(
    matrix: ArrayView2<'_, f64>,
    languages: &[String],
    top_n: usize,
) -> Result<Vec<LanguagePair>> {
    let (rows, cols) = matrix.dim();
    let n = languages.len();
    if rows < n || cols < n {
        return Err(AnalysisError::ShapeMismatch {
            rows,
            cols,
            labels: n,
        });
    }

    let mut pairs: Vec<LanguagePair> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .map(|(i, j)| LanguagePair {
            lang_a: languages[i].clone(),
            lang_b: languages[j].clone(),
            distance: matrix[[i, j]],
        })
        .collect();

    pairs.sort_by_key(|pair| OrderedFloat(pair.distance));
    pairs.truncate(top_n);

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cosine_diagonal_and_clipping() {
        let features = array![[0.1, 0.1, 0.3], [0.1, 0.1, 0.3], [0.9, 0.2, 0.5]];
        let distances = cosine_distance_matrix(features.view());

        for i in 0..3 {
            assert_eq!(distances[[i, i]], 0.0);
        }
        assert!(distances.iter().all(|&d| d >= 0.0));
        // Identical rows: similarity rounds slightly above 1, clipped to exactly 0
        assert_eq!(distances[[0, 1]], 0.0);
        assert_eq!(distances[[0, 2]], distances[[2, 0]]);
    }

    #[test]
    fn test_cosine_zero_row() {
        let features = array![[0.0, 0.0], [0.5, 0.5]];
        let distances = cosine_distance_matrix(features.view());
        assert_eq!(distances[[0, 1]], 1.0);
        assert_eq!(distances[[0, 0]], 0.0);
    }

    #[test]
    fn test_euclidean_normalization() {
        let features = array![[0.0, 0.0, 0.0, 0.0], [1.0, 1.0, 1.0, 1.0]];
        let distances = euclidean_distance_matrix(features.view());
        assert!((distances[[0, 1]] - 1.0).abs() < 1e-12);
        assert_eq!(distances[[1, 1]], 0.0);
    }

    #[test]
    fn test_euclidean_zero_dimensions() {
        let features = Array2::<f64>::zeros((3, 0));
        let distances = euclidean_distance_matrix(features.view());
        assert_eq!(distances.dim(), (3, 3));
        assert!(distances.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_most_similar_pairs_order() {
        let matrix = array![[0.0, 0.4, 0.2], [0.4, 0.0, 0.2], [0.2, 0.2, 0.0]];
        let languages = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let pairs = most_similar_pairs(matrix.view(), &languages, 10).unwrap();

        assert_eq!(pairs.len(), 3);
        // Ties keep iteration order: (a, c) before (b, c)
        assert_eq!((pairs[0].lang_a.as_str(), pairs[0].lang_b.as_str()), ("a", "c"));
        assert_eq!((pairs[1].lang_a.as_str(), pairs[1].lang_b.as_str()), ("b", "c"));
        assert_eq!(pairs[2].distance, 0.4);
        assert!(pairs.iter().all(|p| p.lang_a != p.lang_b));
    }

    #[test]
    fn test_most_similar_pairs_shape_mismatch() {
        let matrix = Array2::<f64>::zeros((2, 2));
        let languages = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(most_similar_pairs(matrix.view(), &languages, 1).is_err());
    }

    #[test]
    fn test_distance_matrix_lookup() {
        let matrix = DistanceMatrix::new(
            vec!["English".to_string(), "German".to_string()],
            array![[0.0, 0.3], [0.3, 0.0]],
        )
        .unwrap();
        assert_eq!(matrix.get("German", "English"), Some(0.3));
        assert_eq!(matrix.get("English", "Klingon"), None);
    }

    #[test]
    fn test_distance_matrix_pairs_after_relabel() {
        let mut matrix = DistanceMatrix::new(
            vec!["English".to_string(), "German".to_string()],
            array![[0.0, 0.3], [0.3, 0.0]],
        )
        .unwrap();
        assert_eq!(matrix.most_similar_pairs(5).unwrap().len(), 1);

        matrix.languages.push("Dutch".to_string());
        assert!(matches!(
            matrix.most_similar_pairs(5),
            Err(AnalysisError::ShapeMismatch { rows: 2, cols: 2, labels: 3 })
        ));
    }
}
