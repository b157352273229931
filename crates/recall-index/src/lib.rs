//! recall-index
//!
//! TF-IDF retrieval over meeting documents: `tokenize` → `vectorizer` →
//! `ranker`, wrapped by the swappable `RetrievalIndex`. `snapshot` persists a
//! built index keyed by the corpus content hash.

pub mod tokenize;
pub mod vectorizer;
pub mod ranker;
pub mod index;
pub mod snapshot;

pub use index::{IndexState, IndexStats, RetrievalIndex, ScoredDocument};
pub use vectorizer::{DocumentVector, QueryVector, SparseVector, TermStats, VocabularyModel};
