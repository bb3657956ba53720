use std::collections::{BTreeMap, BTreeSet, HashSet};

/// TF-IDF vectors fitted over one comparison set.
///
/// Vocabulary indices follow lexicographic term order. Weights are raw term
/// counts times the smoothed IDF `ln((1 + n) / (1 + df)) + 1`, and every row
/// is L2-normalized (all-zero rows stay zero).
#[derive(Clone, Debug, PartialEq)]
pub struct TfidfSpace {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<Vec<f64>>,
}

impl TfidfSpace {
    pub fn fit(documents: &[Vec<String>], stop_words: &HashSet<&'static str>) -> Self {
        let filtered = documents
            .iter()
            .map(|tokens| {
                tokens
                    .iter()
                    .filter(|token| !stop_words.contains(token.as_str()))
                    .map(String::as_str)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let vocabulary = filtered
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term.to_string(), index))
            .collect::<BTreeMap<_, _>>();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for tokens in &filtered {
            let unique = tokens.iter().copied().collect::<BTreeSet<_>>();
            for term in unique {
                if let Some(&index) = vocabulary.get(term) {
                    document_frequency[index] += 1;
                }
            }
        }

        let n = filtered.len() as f64;
        let idf = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect::<Vec<_>>();

        let rows = filtered
            .iter()
            .map(|tokens| {
                let mut row = vec![0.0f64; vocabulary.len()];
                for term in tokens {
                    if let Some(&index) = vocabulary.get(*term) {
                        row[index] += 1.0;
                    }
                }
                for (weight, idf) in row.iter_mut().zip(&idf) {
                    *weight *= idf;
                }
                l2_normalize(&mut row);
                row
            })
            .collect();

        Self { vocabulary, idf, rows }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&index| self.idf[index])
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cosine similarity of two L2-normalized rows.
pub fn cosine(left: &[f64], right: &[f64]) -> f64 {
    left.iter().zip(right).fold(0.0, |acc, (a, b)| acc + a * b)
}

fn l2_normalize(row: &mut [f64]) {
    let norm = row.iter().map(|value| value * value).sum::<f64>().sqrt();
    if norm > 0.0 {
        row.iter_mut().for_each(|value| *value /= norm);
    }
}
