use std::cmp::Ordering;

use recall_core::error::{Error, Result};
use recall_core::types::SearchHit;

use crate::vectorizer::{DocumentVector, QueryVector};

/// Cosine similarity; a zero-magnitude side scores 0 instead of dividing by zero.
pub fn cosine(query: &QueryVector, doc: &DocumentVector) -> f32 {
	let denom = query.norm() * doc.norm();
	if denom == 0.0 { return 0.0; }
	let score = query.dot(doc) / denom;
	// an empty overlap sums to -0.0; keep every zero score the same zero
	if score > 0.0 { score.min(1.0) } else { 0.0 }
}

/// Score every document and keep the best `top_n`, most similar first.
///
/// The sort is stable, so equal scores keep corpus order. A `top_n` larger
/// than the corpus returns the whole corpus.
pub fn rank(query: &QueryVector, vectors: &[DocumentVector], top_n: usize) -> Result<Vec<SearchHit>> {
	if top_n == 0 { return Err(Error::InvalidTopN(top_n)); }
	let mut hits: Vec<SearchHit> = vectors
		.iter()
		.enumerate()
		.map(|(position, doc)| SearchHit { position, score: cosine(query, doc) })
		.collect();
	hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
	hits.truncate(top_n);
	Ok(hits)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::vectorizer::build;
	use recall_core::types::Corpus;

	#[test]
	fn ties_keep_corpus_order() {
		let (model, vectors) = build(&Corpus::from_texts(["x one", "y two", "x three"])).unwrap();
		let hits = rank(&model.transform("nothing"), &vectors, 3).unwrap();
		let order: Vec<usize> = hits.iter().map(|h| h.position).collect();
		assert_eq!(order, vec![0, 1, 2]);
		assert!(hits.iter().all(|h| h.score == 0.0));
	}

	#[test]
	fn empty_and_disjoint_documents_tie_in_order() {
		let (model, vectors) = build(&Corpus::from_texts(["other words", "", "budget"])).unwrap();
		let hits = rank(&model.transform("budget"), &vectors, 3).unwrap();
		let order: Vec<usize> = hits.iter().map(|h| h.position).collect();
		assert_eq!(order, vec![2, 0, 1]);
	}

	#[test]
	fn zero_top_n_is_invalid() {
		let (model, vectors) = build(&Corpus::from_texts(["x"])).unwrap();
		assert!(matches!(rank(&model.transform("x"), &vectors, 0), Err(Error::InvalidTopN(0))));
	}

	#[test]
	fn identical_vectors_score_one() {
		let (model, vectors) = build(&Corpus::from_texts(["red green", "blue"])).unwrap();
		let score = cosine(&model.transform("green red"), &vectors[0]);
		assert!((score - 1.0).abs() < 1e-6, "score={score}");
	}
}
