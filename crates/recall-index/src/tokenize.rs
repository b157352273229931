use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream};

/// Word-level analyzer shared by documents and queries: split on every
/// non-alphanumeric character, lower-case, no stemming, no stop words.
pub fn analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.build()
}

pub fn tokenize(text: &str) -> Vec<String> {
	let mut analyzer = analyzer();
	tokenize_with(&mut analyzer, text)
}

/// Same as [`tokenize`] but reuses an analyzer across many texts.
pub fn tokenize_with(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
	let mut stream = analyzer.token_stream(text);
	let mut tokens = Vec::new();
	while stream.advance() { tokens.push(stream.token().text.clone()); }
	tokens
}
