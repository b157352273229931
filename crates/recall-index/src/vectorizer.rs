//! TF-IDF vocabulary and sparse document vectors.
//!
//! Term frequency is the raw count divided by the text's token count, applied
//! the same way to documents and queries. Inverse document frequency is the
//! smoothed `ln((1 + N) / (1 + df)) + 1`, so every known term weighs > 0.
//! Terms live in `BTreeMap`s: iteration order, and therefore every float
//! summation, is fixed for a given corpus.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use recall_core::error::{Error, Result};
use recall_core::types::Corpus;

use crate::tokenize::{analyzer, tokenize, tokenize_with};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermStats {
	/// Number of documents containing the term at least once.
	pub doc_freq: usize,
	pub idf: f32,
}

/// Every term seen in the corpus with its document frequency and IDF weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyModel {
	corpus_size: usize,
	terms: BTreeMap<String, TermStats>,
}

impl VocabularyModel {
	pub fn corpus_size(&self) -> usize { self.corpus_size }

	pub fn len(&self) -> usize { self.terms.len() }

	pub fn is_empty(&self) -> bool { self.terms.is_empty() }

	pub fn get(&self, term: &str) -> Option<&TermStats> { self.terms.get(term) }

	pub fn idf(&self, term: &str) -> Option<f32> { self.terms.get(term).map(|s| s.idf) }

	pub fn terms(&self) -> impl Iterator<Item = (&str, &TermStats)> {
		self.terms.iter().map(|(t, s)| (t.as_str(), s))
	}

	/// Project free text into this vocabulary's space. Unknown terms are dropped.
	pub fn transform(&self, text: &str) -> SparseVector { self.weigh(&tokenize(text)) }

	fn weigh(&self, tokens: &[String]) -> SparseVector {
		if tokens.is_empty() { return SparseVector::default(); }
		let total = tokens.len() as f32;
		let weights = term_counts(tokens)
			.into_iter()
			.filter_map(|(term, count)| {
				let idf = self.idf(term)?;
				Some((term.to_string(), count as f32 / total * idf))
			})
			.collect();
		SparseVector::from_weights(weights)
	}
}

/// Term → weight for one text, with its Euclidean norm precomputed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
	weights: BTreeMap<String, f32>,
	norm: f32,
}

pub type DocumentVector = SparseVector;
pub type QueryVector = SparseVector;

impl SparseVector {
	fn from_weights(weights: BTreeMap<String, f32>) -> Self {
		let norm = weights.values().map(|w| w * w).sum::<f32>().sqrt();
		Self { weights, norm }
	}

	pub fn get(&self, term: &str) -> Option<f32> { self.weights.get(term).copied() }

	pub fn len(&self) -> usize { self.weights.len() }

	pub fn is_empty(&self) -> bool { self.weights.is_empty() }

	pub fn norm(&self) -> f32 { self.norm }

	pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
		self.weights.iter().map(|(t, w)| (t.as_str(), *w))
	}

	pub fn dot(&self, other: &SparseVector) -> f32 {
		let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
		small
			.weights
			.iter()
			.filter_map(|(term, w)| large.weights.get(term).map(|o| w * o))
			.sum()
	}
}

/// Fit a vocabulary over `corpus` and weigh every document against it.
///
/// Vectors come back in corpus order. Fails with `EmptyCorpus` when there is
/// nothing to fit.
pub fn build(corpus: &Corpus) -> Result<(VocabularyModel, Vec<DocumentVector>)> {
	if corpus.is_empty() { return Err(Error::EmptyCorpus); }

	let mut analyzer = analyzer();
	let tokenized: Vec<Vec<String>> = corpus.iter().map(|doc| tokenize_with(&mut analyzer, doc.text())).collect();

	let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
	for tokens in &tokenized {
		for term in term_counts(tokens).into_keys() { *doc_freq.entry(term).or_insert(0) += 1; }
	}

	let n = corpus.len() as f64;
	let terms = doc_freq
		.into_iter()
		.map(|(term, df)| {
			let idf = ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0;
			(term.to_string(), TermStats { doc_freq: df, idf: idf as f32 })
		})
		.collect();
	let model = VocabularyModel { corpus_size: corpus.len(), terms };

	let vectors = tokenized.iter().map(|tokens| model.weigh(tokens)).collect();
	Ok((model, vectors))
}

fn term_counts(tokens: &[String]) -> BTreeMap<&str, usize> {
	let mut counts = BTreeMap::new();
	for t in tokens { *counts.entry(t.as_str()).or_insert(0) += 1; }
	counts
}
