// Frozen TF-IDF vector space.
//
// tokens: lowercase runs of alphanumerics or '_', at least two chars, stop words removed
// idf: ln((1 + n) / (1 + df)) + 1
// rows: raw term count * idf, l2 normalized
//
// The model is fitted once over the whole catalog and only read afterwards.

use super::stop_words::is_stop_word;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Sparse vector sorted by column. Every stored value is positive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f32>,
}

impl SparseVector {
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j, mut sum) = (0, 0, 0f32);
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn magnitude(&self) -> f32 {
        self.values.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    fn normalize(&mut self) {
        let norm = self.magnitude();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }
}

pub struct VectorSpaceModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    matrix: Vec<SparseVector>,
}

impl VectorSpaceModel {
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let tokenized = documents
            .iter()
            .map(|d| tokenize(d.as_ref()))
            .collect::<Vec<_>>();

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in tokenized.iter() {
            let unique = tokens.iter().map(String::as_str).collect::<BTreeSet<_>>();
            for token in unique {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        // BTreeMap iterates in token order, so columns are assigned alphabetically
        let n = documents.len() as f32;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (column, (token, df)) in document_frequency.iter().enumerate() {
            vocabulary.insert(token.to_string(), column);
            idf.push(((1.0 + n) / (1.0 + *df as f32)).ln() + 1.0);
        }

        let mut model = Self {
            vocabulary,
            idf,
            matrix: vec![],
        };
        model.matrix = tokenized.iter().map(|t| model.weigh(t)).collect();
        debug!(
            "fitted vector space: {} documents, {} terms",
            model.matrix.len(),
            model.dimension()
        );

        model
    }

    /// Vector for any text in the fitted space. Unknown tokens carry no weight.
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&tokenize(text))
    }

    fn weigh(&self, tokens: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
        for token in tokens {
            if let Some(&column) = self.vocabulary.get(token) {
                *counts.entry(column).or_insert(0) += 1;
            }
        }
        let mut vector = SparseVector {
            indices: Vec::with_capacity(counts.len()),
            values: Vec::with_capacity(counts.len()),
        };
        for (column, count) in counts {
            vector.indices.push(column);
            vector.values.push(count as f32 * self.idf[column]);
        }
        vector.normalize();
        vector
    }

    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    #[cfg(test)]
    pub fn row(&self, ordinal: usize) -> Option<&SparseVector> {
        self.matrix.get(ordinal)
    }

    pub fn matrix(&self) -> &[SparseVector] {
        &self.matrix
    }

    #[cfg(test)]
    pub fn idf(&self, token: &str) -> Option<f32> {
        self.vocabulary.get(token).map(|&column| self.idf[column])
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|s| s.chars().count() > 1)
        .filter(|s| !is_stop_word(s))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn tokenize_lowercases_and_filters() {
        assert_eq!(
            tokenize("The Art of Machine-Learning, in R & Python3!"),
            vec!["art", "machine", "learning", "python3"]
        );
        assert_eq!(tokenize("snake_case x"), vec!["snake_case"]);
        assert!(tokenize("the and of a").is_empty());
    }

    #[test]
    fn vocabulary_and_idf() {
        let model = VectorSpaceModel::fit(&[
            "python programming",
            "python data science",
            "cooking basics",
        ]);

        assert_eq!(model.dimension(), 6);
        assert_eq!(model.len(), 3);
        assert!(approx(model.idf("python").unwrap(), (4f32 / 3f32).ln() + 1.0));
        assert!(approx(model.idf("cooking").unwrap(), 2f32.ln() + 1.0));
        assert_eq!(model.idf("the"), None);
    }

    #[test]
    fn rows_are_unit_length() {
        let model = VectorSpaceModel::fit(&["rust rust systems", "web design", ""]);

        assert!(approx(model.row(0).unwrap().magnitude(), 1.0));
        assert!(approx(model.row(1).unwrap().magnitude(), 1.0));
        assert!(model.row(2).unwrap().is_zero());
        assert!(model.row(3).is_none());
    }

    #[test]
    fn term_frequency_is_raw_count() {
        let model = VectorSpaceModel::fit(&["rust rust systems", "systems"]);
        let row = model.row(0).unwrap();
        let rust = model.vocabulary["rust"];
        let systems = model.vocabulary["systems"];
        let weight = |c: usize| row.values[row.indices.iter().position(|&i| i == c).unwrap()];

        let ratio = weight(rust) / weight(systems);
        let expected = 2.0 * model.idf("rust").unwrap() / model.idf("systems").unwrap();
        assert!(approx(ratio, expected));
    }

    #[test]
    fn transform_ignores_unseen_tokens() {
        let model = VectorSpaceModel::fit(&["python programming", "cooking basics"]);

        assert!(model.transform("quantum chemistry").is_zero());
        assert!(model.transform("").is_zero());
        assert!(model.transform("the of and").is_zero());

        let known = model.transform("python quantum");
        assert_eq!(known.indices.len(), 1);
        assert_eq!(known, model.transform("python"));
    }

    #[test]
    fn transform_matches_fitted_rows() {
        let docs = ["python programming", "cooking basics"];
        let model = VectorSpaceModel::fit(&docs);
        assert_eq!(&model.transform(docs[0]), model.row(0).unwrap());
    }

    #[test]
    fn empty_corpus() {
        let model = VectorSpaceModel::fit::<&str>(&[]);
        assert!(model.is_empty());
        assert_eq!(model.dimension(), 0);
        assert!(model.transform("anything").is_zero());
    }

    #[test]
    fn sparse_dot() {
        let a = SparseVector {
            indices: vec![0, 2, 5],
            values: vec![1.0, 2.0, 3.0],
        };
        let b = SparseVector {
            indices: vec![2, 3, 5],
            values: vec![4.0, 1.0, 1.0],
        };
        assert!(approx(a.dot(&b), 11.0));
        assert!(approx(a.dot(&SparseVector::default()), 0.0));
    }
}
