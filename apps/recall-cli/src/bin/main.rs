use std::env;
use std::path::PathBuf;

use recall_core::config::Config;
use recall_core::error::Error;
use recall_core::loader;
use recall_core::store;
use recall_core::traits::Retriever;
use recall_index::RetrievalIndex;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: recall <query|search|stats> [text] [--top N] [--records PATH]";

struct Args {
    cmd: String,
    text: Option<String>,
    top_n: Option<usize>,
    records: Option<PathBuf>,
}

/// Parse and check the command line before any config or records are read,
/// so usage errors surface even when the config is broken.
fn parse_args<I: IntoIterator<Item = String>>(argv: I) -> Result<Args, String> {
    let mut args = argv.into_iter();
    let cmd = args.next().ok_or_else(|| USAGE.to_string())?;
    if !matches!(cmd.as_str(), "query" | "search" | "stats") {
        return Err(format!("Unknown command: {cmd}\n{USAGE}"));
    }
    let mut parsed = Args { cmd, text: None, top_n: None, records: None };
    let mut words = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--top" | "-n" => match args.next().and_then(|v| v.parse::<usize>().ok()) {
                Some(n) => parsed.top_n = Some(n),
                None => return Err("Error: --top requires a positive number".to_string()),
            },
            "--records" | "-r" => match args.next() {
                Some(p) => parsed.records = Some(PathBuf::from(p)),
                None => return Err("Error: --records requires a path".to_string()),
            },
            _ => words.push(arg),
        }
    }
    if !words.is_empty() { parsed.text = Some(words.join(" ")); }
    if parsed.cmd != "stats" && parsed.text.is_none() {
        return Err(USAGE.to_string());
    }
    Ok(parsed)
}

/// Documents for the generation step, joined the way the prompt expects them.
fn context_for(retriever: &dyn Retriever, cmd: &str, text: &str, top_n: usize) -> recall_core::error::Result<String> {
    let docs = match cmd {
        "search" => retriever.search(text)?,
        _ => retriever.query(text, top_n)?,
    };
    Ok(docs.iter().map(|d| d.text()).collect::<Vec<_>>().join("\n\n"))
}

fn explain(err: &Error) -> &'static str {
    match err {
        Error::SourceNotFound(_) | Error::EmptyCorpus | Error::NotBuilt => "nothing indexed yet; transcribe a meeting first",
        Error::MalformedSource(_) => "the record store holds data that is not a meeting record",
        Error::InvalidTopN(_) | Error::InvalidConfig(_) => "invalid request",
        Error::Snapshot(_) => "index snapshot could not be used",
    }
}

fn run(args: Args) -> recall_core::error::Result<()> {
    let config = Config::load().map_err(|e| Error::InvalidConfig(e.to_string()))?;
    let settings = config.retrieval()?;

    let base = env::current_dir().map_err(|e| Error::InvalidConfig(format!("working directory: {e}")))?;
    let records_path = args.records.unwrap_or_else(|| settings.records_path(&base));
    let corpus = loader::load(&*store::open(&records_path))?;

    let index = RetrievalIndex::with_settings(&settings);
    match settings.snapshot_path(&base) {
        Some(path) => index.build_cached(corpus, &path)?,
        None => index.build(corpus)?,
    }

    if args.cmd == "stats" {
        let stats = index.current()?.stats();
        println!("documents:  {}\nvocabulary: {}\nhash:       {}", stats.documents, stats.vocabulary, stats.content_hash);
        return Ok(());
    }
    let text = args.text.unwrap_or_default();
    let top_n = args.top_n.unwrap_or(settings.default_top_n);
    info!(cmd = %args.cmd, top_n, "retrieving context");
    println!("{}", context_for(&index, &args.cmd, &text, top_n)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => { eprintln!("{msg}"); std::process::exit(1) }
    };
    if let Err(e) = run(args) {
        eprintln!("Error: {} ({e})", explain(&e));
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(words: &[&str]) -> Vec<String> { words.iter().map(|w| w.to_string()).collect() }

    #[test]
    fn no_arguments_is_usage() {
        assert_eq!(parse_args(argv(&[])).err().as_deref(), Some(USAGE));
    }

    #[test]
    fn query_without_text_is_usage() {
        assert_eq!(parse_args(argv(&["query", "--top", "2"])).err().as_deref(), Some(USAGE));
        assert!(parse_args(argv(&["stats"])).is_ok());
    }

    #[test]
    fn unknown_command_is_rejected() {
        let err = parse_args(argv(&["reindex"])).err().unwrap_or_default();
        assert!(err.starts_with("Unknown command: reindex"), "{err}");
    }

    #[test]
    fn flags_and_words_are_split() {
        let args = parse_args(argv(&["query", "who", "owns", "--top", "3", "billing", "-r", "data"])).unwrap();
        assert_eq!(args.text.as_deref(), Some("who owns billing"));
        assert_eq!(args.top_n, Some(3));
        assert_eq!(args.records, Some(PathBuf::from("data")));
    }
}
