use super::vectorizer::SparseVector;
use crate::catalog::Course;
use std::cmp::Ordering;

#[derive(Copy, Clone, Debug)]
pub struct Matched {
    pub ordinal: usize,
    similarity: f32,
}

impl PartialOrd for Matched {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.similarity.partial_cmp(&other.similarity)
    }
}

impl Ord for Matched {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

impl PartialEq for Matched {
    fn eq(&self, other: &Self) -> bool {
        self.similarity == other.similarity
    }
}

impl Eq for Matched {}

/// Best `top_n` rows for `query`, most similar first.
///
/// Rows are stable sorted ascending by similarity, the last `top_n` are taken and
/// then reversed, so of two rows with the same score the higher ordinal wins.
pub fn match_top_n(query: &SparseVector, matrix: &[SparseVector], top_n: usize) -> Vec<Matched> {
    let mut matched = matrix
        .iter()
        .enumerate()
        .map(|(ordinal, row)| {
            let similarity = cosine_similarity(query, row);
            debug!("ordinal: {}, similarity: {}", ordinal, similarity);
            Matched { ordinal, similarity }
        })
        .collect::<Vec<_>>();

    // stable, equal scores keep ordinal order
    matched.sort();
    let start = matched.len().saturating_sub(top_n);
    let mut top_n = matched.split_off(start);
    top_n.reverse();
    debug!("top_n: {:?}", top_n);

    top_n
}

pub fn recommend(
    query: &SparseVector,
    matrix: &[SparseVector],
    courses: &[Course],
    top_n: usize,
) -> Vec<Course> {
    match_top_n(query, matrix, top_n)
        .into_iter()
        .filter_map(|m| courses.get(m.ordinal).cloned())
        .collect()
}

pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f32 {
    let mag_a = a.magnitude();
    let mag_b = b.magnitude();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    a.dot(b) / (mag_a * mag_b)
}
