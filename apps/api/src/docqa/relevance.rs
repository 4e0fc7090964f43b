//! TF-IDF relevance selector.
//!
//! Picks the single document most similar to the query. Weights are raw term
//! counts times smoothed IDF, vectors are L2-normalised, and similarity is
//! the dot product of the normalised vectors (cosine).

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// English stop words removed before indexing.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelevanceError {
    #[error("No documents to search")]
    EmptyCorpus,

    #[error("Please enter a query")]
    EmptyQuery,

    #[error("The documents contain no searchable words")]
    EmptyVocabulary,
}

/// The winning document and its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    pub index: usize,
    pub score: f64,
    pub text: &'a str,
}

/// Lowercases and splits on non-word characters, keeping tokens of two or
/// more characters that are not stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    let stop_set: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= 2 && !stop_set.contains(w))
        .map(String::from)
        .collect()
}

/// Fitted TF-IDF model over a fixed corpus.
#[derive(Debug)]
pub struct TfIdfIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    vectors: Vec<Vec<f64>>,
}

impl TfIdfIndex {
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Result<Self, RelevanceError> {
        if documents.is_empty() {
            return Err(RelevanceError::EmptyCorpus);
        }

        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();

        // Sorted vocabulary keeps term indices deterministic.
        let mut terms: Vec<&str> = tokenized
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if terms.is_empty() {
            return Err(RelevanceError::EmptyVocabulary);
        }
        terms.sort_unstable();
        let vocabulary: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        for tokens in &tokenized {
            let seen: HashSet<usize> = tokens.iter().filter_map(|t| vocabulary.get(t).copied()).collect();
            for idx in seen {
                df[idx] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let mut index = Self {
            vocabulary,
            idf,
            vectors: Vec::new(),
        };
        index.vectors = tokenized.iter().map(|t| index.weigh(t)).collect();
        Ok(index)
    }

    fn weigh(&self, tokens: &[String]) -> Vec<f64> {
        let mut vector = vec![0.0; self.idf.len()];
        for token in tokens {
            if let Some(&idx) = self.vocabulary.get(token) {
                vector[idx] += 1.0;
            }
        }
        for (weight, idf) in vector.iter_mut().zip(&self.idf) {
            *weight *= idf;
        }
        let norm = vector.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|w| *w /= norm);
        }
        vector
    }

    /// L2-normalised TF-IDF vector of `text`. Out-of-vocabulary terms are ignored.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        self.weigh(&tokenize(text))
    }

    /// Cosine similarity of the query against every document, in corpus order.
    pub fn similarities(&self, query: &str) -> Vec<f64> {
        let q = self.transform(query);
        self.vectors
            .iter()
            .map(|doc| doc.iter().zip(&q).map(|(a, b)| a * b).sum())
            .collect()
    }
}

/// Returns the document most similar to `query`; ties go to the first one.
pub fn select_most_relevant<'a, S: AsRef<str>>(
    query: &str,
    documents: &'a [S],
) -> Result<Selection<'a>, RelevanceError> {
    if documents.is_empty() {
        return Err(RelevanceError::EmptyCorpus);
    }
    if query.trim().is_empty() {
        return Err(RelevanceError::EmptyQuery);
    }

    let index = TfIdfIndex::fit(documents)?;
    let (best, score) = index
        .similarities(query)
        .into_iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, bs), (i, s)| {
            if s > bs {
                (i, s)
            } else {
                (bi, bs)
            }
        });

    Ok(Selection {
        index: best,
        score,
        text: documents[best].as_ref(),
    })
}
