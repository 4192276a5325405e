//! Inverted index and Okapi BM25 scoring, generalized to the hybrid
//! word-n-gram / character-n-gram / overlap retrieval channel combination.
//!
//! # BM25 formula
//!
//! ```text
//! BM25(q, d) = sum IDF(t) * (f(t,d) * (k1+1)) / (f(t,d) + k1 * (1 - b + b * |d|/avgdl))
//! ```
//!
//! `IDF(t) = ln((N - df(t) + 0.5) / (df(t) + 0.5) + 1)`, which keeps IDF
//! positive even for terms that appear in most documents.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::error::RetrieveError;

/// Term-frequency saturation (`k1`) and length-normalization (`b`) knobs
/// shared by every BM25 channel.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// Term-level inverted index with Okapi BM25 scoring. One instance backs
/// each retrieval channel (word n-grams, character n-grams); both share
/// this implementation, just fed different tokenizations.
#[derive(Clone)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct InvertedIndex {
    postings: HashMap<String, HashMap<u32, u32>>,
    doc_lengths: HashMap<u32, u32>,
    num_docs: u32,
    avg_doc_length: f32,
    doc_frequencies: HashMap<String, u32>,
    precomputed_idf: RefCell<HashMap<String, f32>>,
    idf_computed_at_num_docs: RefCell<u32>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self {
            postings: HashMap::new(),
            doc_lengths: HashMap::new(),
            num_docs: 0,
            avg_doc_length: 0.0,
            doc_frequencies: HashMap::new(),
            precomputed_idf: RefCell::new(HashMap::new()),
            idf_computed_at_num_docs: RefCell::new(0),
        }
    }

    pub fn add_document(&mut self, doc_id: u32, terms: &[String]) {
        let doc_length = terms.len() as u32;
        self.doc_lengths.insert(doc_id, doc_length);

        let mut term_freqs: HashMap<String, u32> = HashMap::new();
        for term in terms {
            *term_freqs.entry(term.clone()).or_insert(0) += 1;
        }
        for (term, freq) in term_freqs {
            self.postings
                .entry(term.clone())
                .or_default()
                .insert(doc_id, freq);
            *self.doc_frequencies.entry(term).or_insert(0) += 1;
        }

        self.num_docs += 1;
        let total_length: u32 = self.doc_lengths.values().sum();
        self.avg_doc_length = total_length as f32 / self.num_docs as f32;
        self.precomputed_idf.borrow_mut().clear();
        *self.idf_computed_at_num_docs.borrow_mut() = 0;
    }

    fn ensure_idf_computed(&self) {
        let computed_at = *self.idf_computed_at_num_docs.borrow();
        if computed_at == self.num_docs && !self.precomputed_idf.borrow().is_empty() {
            return;
        }
        let mut idf_map = self.precomputed_idf.borrow_mut();
        idf_map.clear();
        let n = self.num_docs as f32;
        for (term, df) in &self.doc_frequencies {
            let df_f = *df as f32;
            idf_map.insert(term.clone(), ((n - df_f + 0.5) / (df_f + 0.5) + 1.0).ln());
        }
        *self.idf_computed_at_num_docs.borrow_mut() = self.num_docs;
    }

    pub fn idf(&self, term: &str) -> f32 {
        self.ensure_idf_computed();
        self.precomputed_idf.borrow().get(term).copied().unwrap_or(0.0)
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    /// Candidate documents containing at least one of `terms`.
    pub fn candidates(&self, terms: &[String]) -> Vec<u32> {
        let mut seen: HashSet<u32> = HashSet::new();
        let mut out = Vec::new();
        for term in terms {
            if let Some(postings) = self.postings.get(term) {
                for &doc_id in postings.keys() {
                    if seen.insert(doc_id) {
                        out.push(doc_id);
                    }
                }
            }
        }
        out
    }

    /// Raw (un-normalized) BM25 score of `doc_id` against `terms`.
    pub fn score(&self, doc_id: u32, terms: &[String], params: Bm25Params) -> f32 {
        if self.avg_doc_length == 0.0 {
            return 0.0;
        }
        let doc_length = self.doc_lengths.get(&doc_id).copied().unwrap_or(0) as f32;
        let mut score = 0.0;
        for term in terms {
            let idf = self.idf(term);
            if idf == 0.0 {
                continue;
            }
            let tf = self
                .postings
                .get(term)
                .and_then(|postings| postings.get(&doc_id))
                .copied()
                .unwrap_or(0) as f32;
            if tf == 0.0 {
                continue;
            }
            let numerator = tf * (params.k1 + 1.0);
            let denominator =
                tf + params.k1 * (1.0 - params.b + params.b * doc_length / self.avg_doc_length);
            score += idf * numerator / denominator;
        }
        score
    }
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Inclusive n-gram length range, e.g. `(1, 2)` for unigrams and bigrams.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct NGramRange {
    pub min: usize,
    pub max: usize,
}

/// Retrieval strategy a [`HybridParams`] selects (spec "BM25 Index":
/// "both hybrid-mode retrieval and exact-mode retrieval are selectable by
/// configuration").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub enum RetrievalMode {
    /// Combine char-n-gram BM25, word-n-gram BM25, and word-n-gram overlap
    /// (the default: tolerant of typos and partial-word matches).
    Hybrid,
    /// Word-n-gram BM25 only, no char channel or overlap term. Stricter:
    /// a query has to share whole words with a document to match at all.
    Exact,
}

/// Hybrid-channel configuration (spec "BM25 Index").
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct HybridParams {
    pub mode: RetrievalMode,
    pub word_range: NGramRange,
    pub char_range: NGramRange,
    pub bm25: Bm25Params,
    pub weight_char: f32,
    pub weight_word: f32,
    pub weight_overlap: f32,
}

impl Default for HybridParams {
    fn default() -> Self {
        Self {
            mode: RetrievalMode::Hybrid,
            word_range: NGramRange { min: 1, max: 2 },
            char_range: NGramRange { min: 3, max: 5 },
            bm25: Bm25Params::default(),
            weight_char: 0.6,
            weight_word: 0.25,
            weight_overlap: 0.15,
        }
    }
}

fn preprocess(text: &str) -> Vec<String> {
    equisearch_normalize::normalize_equip(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn word_ngrams(tokens: &[String], range: NGramRange) -> Vec<String> {
    let mut out = Vec::new();
    for n in range.min..=range.max {
        if n == 0 || n > tokens.len() {
            continue;
        }
        for window in tokens.windows(n) {
            out.push(window.join(" "));
        }
    }
    out
}

/// Character n-grams of a single word, padded with `#` at both ends so a
/// short word's boundary is distinguishable from a mid-word substring.
fn char_ngrams_for_word(word: &str, range: NGramRange) -> Vec<String> {
    let padded = format!("#{word}#");
    let chars: Vec<char> = padded.chars().collect();
    let mut out = Vec::new();
    for n in range.min..=range.max {
        if n == 0 || n > chars.len() {
            continue;
        }
        for window in chars.windows(n) {
            out.push(window.iter().collect::<String>());
        }
    }
    out
}

fn char_ngrams(tokens: &[String], range: NGramRange) -> Vec<String> {
    tokens.iter().flat_map(|w| char_ngrams_for_word(w, range)).collect()
}

/// Hybrid BM25 retrieval index combining character-n-gram BM25,
/// word-n-gram BM25, and word-n-gram overlap (spec "BM25 Index").
///
/// Document ids are assigned in insertion order; `search` breaks ties by
/// that insertion order.
#[derive(Clone)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct BM25Index {
    char_index: InvertedIndex,
    word_index: InvertedIndex,
    doc_ids: Vec<String>,
    doc_word_ngrams: HashMap<u32, HashSet<String>>,
    params: HybridParams,
}

impl BM25Index {
    /// Build from `{id, text}` pairs. An empty corpus is a programming
    /// error and fails fast.
    pub fn build(
        docs: &[(String, String)],
        params: HybridParams,
    ) -> Result<Self, RetrieveError> {
        if docs.is_empty() {
            return Err(RetrieveError::EmptyIndex);
        }
        let mut char_index = InvertedIndex::new();
        let mut word_index = InvertedIndex::new();
        let mut doc_ids = Vec::with_capacity(docs.len());
        let mut doc_word_ngrams = HashMap::with_capacity(docs.len());

        for (internal_id, (external_id, text)) in docs.iter().enumerate() {
            let internal_id = internal_id as u32;
            let tokens = preprocess(text);
            let words = word_ngrams(&tokens, params.word_range);
            let chars = char_ngrams(&tokens, params.char_range);

            word_index.add_document(internal_id, &words);
            char_index.add_document(internal_id, &chars);
            doc_word_ngrams.insert(internal_id, words.into_iter().collect());
            doc_ids.push(external_id.clone());
        }

        Ok(Self {
            char_index,
            word_index,
            doc_ids,
            doc_word_ngrams,
            params,
        })
    }

    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Top-k documents for `query`, combined score normalized to `[0, 1]`
    /// against the maximum score in the result set.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<(String, f32)>, RetrieveError> {
        let tokens = preprocess(query);
        if tokens.is_empty() {
            return Err(RetrieveError::EmptyQuery);
        }
        let word_q = word_ngrams(&tokens, self.params.word_range);
        let exact = self.params.mode == RetrievalMode::Exact;
        let char_q = if exact { Vec::new() } else { char_ngrams(&tokens, self.params.char_range) };
        let query_word_set: HashSet<&String> = word_q.iter().collect();

        let mut seen_candidates: HashSet<u32> = HashSet::new();
        let mut candidates: Vec<u32> = Vec::new();
        for doc_id in self
            .char_index
            .candidates(&char_q)
            .into_iter()
            .chain(self.word_index.candidates(&word_q))
        {
            if seen_candidates.insert(doc_id) {
                candidates.push(doc_id);
            }
        }
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut raw_scores: Vec<(u32, f32)> = Vec::with_capacity(candidates.len());
        for doc_id in candidates {
            let word_score = self.word_index.score(doc_id, &word_q, self.params.bm25);
            let combined = if exact {
                word_score
            } else {
                let char_score = self.char_index.score(doc_id, &char_q, self.params.bm25);
                let overlap = if word_q.is_empty() {
                    0.0
                } else {
                    let doc_set = self.doc_word_ngrams.get(&doc_id);
                    let hits = doc_set
                        .map(|set| query_word_set.iter().filter(|ng| set.contains(ng.as_str())).count())
                        .unwrap_or(0);
                    hits as f32 / word_q.len() as f32
                };
                self.params.weight_char * char_score
                    + self.params.weight_word * word_score
                    + self.params.weight_overlap * overlap
            };
            if combined.is_finite() && combined > 0.0 {
                raw_scores.push((doc_id, combined));
            }
        }

        if raw_scores.is_empty() {
            return Ok(Vec::new());
        }

        let max_score = raw_scores.iter().fold(0.0_f32, |acc, (_, s)| acc.max(*s));
        if max_score <= 0.0 {
            return Ok(Vec::new());
        }

        let mut ordered: Vec<(u32, f32)> = raw_scores;
        ordered.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ordered.truncate(k);

        Ok(ordered
            .into_iter()
            .map(|(doc_id, score)| (self.doc_ids[doc_id as usize].clone(), score / max_score))
            .collect())
    }
}
