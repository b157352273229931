use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use recall_core::config::RetrievalSettings;
use recall_core::error::{Error, Result};
use recall_core::loader;
use recall_core::traits::{DocumentStore, Retriever};
use recall_core::types::{Corpus, Document, SearchHit};

use crate::ranker::rank;
use crate::snapshot;
use crate::vectorizer::{self, DocumentVector, VocabularyModel};

/// Everything one successful build produces. Never mutated once built;
/// a rebuild makes a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexState {
	corpus: Corpus,
	model: VocabularyModel,
	vectors: Vec<DocumentVector>,
	content_hash: String,
}

impl IndexState {
	pub fn build(corpus: Corpus) -> Result<Self> {
		let (model, vectors) = vectorizer::build(&corpus)?;
		let content_hash = corpus.content_hash();
		Ok(Self { corpus, model, vectors, content_hash })
	}

	pub(crate) fn from_parts(corpus: Corpus, model: VocabularyModel, vectors: Vec<DocumentVector>, content_hash: String) -> Self {
		Self { corpus, model, vectors, content_hash }
	}

	pub fn corpus(&self) -> &Corpus { &self.corpus }

	pub fn model(&self) -> &VocabularyModel { &self.model }

	pub fn vectors(&self) -> &[DocumentVector] { &self.vectors }

	pub fn content_hash(&self) -> &str { &self.content_hash }

	pub fn stats(&self) -> IndexStats {
		IndexStats { documents: self.corpus.len(), vocabulary: self.model.len(), content_hash: self.content_hash.clone() }
	}

	/// Rank this state's documents against `text`.
	pub fn rank(&self, text: &str, top_n: usize) -> Result<Vec<SearchHit>> {
		rank(&self.model.transform(text), &self.vectors, top_n)
	}

	pub fn query(&self, text: &str, top_n: usize) -> Result<Vec<ScoredDocument>> {
		let hits = self.rank(text, top_n)?;
		Ok(hits
			.into_iter()
			.filter_map(|hit| {
				self.corpus
					.get(hit.position)
					.map(|doc| ScoredDocument { position: hit.position, score: hit.score, document: doc.clone() })
			})
			.collect())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
	pub documents: usize,
	pub vocabulary: usize,
	pub content_hash: String,
}

/// A ranked document together with its corpus position and similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
	pub position: usize,
	pub score: f32,
	pub document: Document,
}

/// TF-IDF retrieval over a corpus of meeting documents.
///
/// The built state sits behind an `Arc`. Queries take a clone of the `Arc`
/// and rank without holding the lock; builds construct the replacement
/// first and only then swap it in, so a failed or slow build never disturbs
/// the state queries are reading.
pub struct RetrievalIndex {
	state: RwLock<Option<Arc<IndexState>>>,
	search_top_n: usize,
}

impl Default for RetrievalIndex {
	fn default() -> Self { Self::new() }
}

impl RetrievalIndex {
	pub fn new() -> Self {
		Self { state: RwLock::new(None), search_top_n: RetrievalSettings::default().search_top_n }
	}

	pub fn with_settings(settings: &RetrievalSettings) -> Self {
		Self { state: RwLock::new(None), search_top_n: settings.search_top_n.max(1) }
	}

	pub fn is_built(&self) -> bool { self.state.read().is_some() }

	/// The currently installed state, for callers that need positions and
	/// documents from one consistent build.
	pub fn current(&self) -> Result<Arc<IndexState>> { self.state.read().clone().ok_or(Error::NotBuilt) }

	pub fn stats(&self) -> Option<IndexStats> { self.state.read().as_ref().map(|s| s.stats()) }

	/// Build over `corpus` and replace the current state.
	///
	/// On error the previous state, if any, stays installed.
	pub fn build(&self, corpus: Corpus) -> Result<()> {
		let start = Instant::now();
		let state = IndexState::build(corpus).inspect_err(|e| warn!("index build rejected: {e}"))?;
		info!(
			documents = state.corpus.len(),
			vocabulary = state.model.len(),
			hash = %short_hash(&state.content_hash),
			elapsed_ms = start.elapsed().as_millis() as u64,
			"index built"
		);
		self.install(state);
		Ok(())
	}

	/// Rebuild only if `corpus` differs from what is installed. Returns whether
	/// a build happened.
	pub fn refresh(&self, corpus: Corpus) -> Result<bool> {
		let current = self.state.read().clone();
		if let Some(current) = current {
			if current.content_hash == corpus.content_hash() {
				debug!(hash = %short_hash(&current.content_hash), "corpus unchanged, keeping index");
				return Ok(false);
			}
		}
		self.build(corpus)?;
		Ok(true)
	}

	/// Load every record from `store` and build over them.
	pub fn load_from<S: DocumentStore + ?Sized>(&self, store: &S) -> Result<()> {
		let corpus = loader::load(store)?;
		self.build(corpus)
	}

	/// Install a matching snapshot from `path` if there is one, otherwise build
	/// and write a fresh snapshot there.
	pub fn build_cached(&self, corpus: Corpus, path: &Path) -> Result<()> {
		match snapshot::load(path, &corpus) {
			Ok(Some(state)) => {
				info!(path = %path.display(), documents = state.corpus.len(), "index restored from snapshot");
				self.install(state);
				return Ok(());
			}
			Ok(None) => debug!(path = %path.display(), "no usable snapshot"),
			Err(e) => warn!("ignoring snapshot: {e}"),
		}
		let state = IndexState::build(corpus).inspect_err(|e| warn!("index build rejected: {e}"))?;
		if let Err(e) = snapshot::save(path, &state) {
			warn!("index built but snapshot not written: {e}");
		}
		info!(documents = state.corpus.len(), vocabulary = state.model.len(), "index built");
		self.install(state);
		Ok(())
	}

	/// Top `top_n` documents for `text`, most relevant first.
	pub fn query(&self, text: &str, top_n: usize) -> Result<Vec<Document>> {
		Ok(self.query_hits(text, top_n)?.into_iter().map(|s| s.document).collect())
	}

	/// Like [`query`](Self::query) but keeps positions and scores.
	pub fn query_hits(&self, text: &str, top_n: usize) -> Result<Vec<ScoredDocument>> {
		let state = self.current()?;
		let results = state.query(text, top_n)?;
		debug!(top_n, returned = results.len(), best = ?results.first().map(|r| r.score), "query ranked");
		Ok(results)
	}

	pub fn search(&self, text: &str) -> Result<Vec<Document>> { self.query(text, self.search_top_n) }

	fn install(&self, state: IndexState) {
		let state = Arc::new(state);
		*self.state.write() = Some(state);
	}
}

impl Retriever for RetrievalIndex {
	fn query(&self, text: &str, top_n: usize) -> Result<Vec<Document>> { Self::query(self, text, top_n) }
	fn search(&self, text: &str) -> Result<Vec<Document>> { Self::search(self, text) }
}

fn short_hash(hash: &str) -> &str { hash.get(..12).unwrap_or(hash) }
