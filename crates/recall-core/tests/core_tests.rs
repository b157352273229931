use figment::providers::Serialized;
use figment::Figment;
use std::fs;
use tempfile::TempDir;

use recall_core::config::{resolve_with_base, Config, RetrievalSettings};
use recall_core::error::Error;
use recall_core::loader::{load, load_str};
use recall_core::store::{self, JsonDirStore, JsonFileStore, MemoryStore};
use recall_core::traits::DocumentStore;
use recall_core::types::{Corpus, Notes, RawRecord};

#[test]
fn load_single_record_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("transcript.json");
    fs::write(
        &path,
        r#"{"transcript": "We ship on Friday.", "summary": "Release planning.", "notes": ["• Ship Friday", "• Alice owns QA"]}"#,
    )
    .unwrap();

    let corpus = load(&JsonFileStore::new(&path)).expect("load");

    assert_eq!(corpus.len(), 1, "one record becomes one document");
    assert_eq!(
        corpus.get(0).unwrap().text(),
        "We ship on Friday. Release planning. • Ship Friday • Alice owns QA"
    );
}

#[test]
fn load_array_preserves_order_and_defaults_missing_fields() {
    let corpus = load_str(
        r#"[
            {"transcript": "first"},
            {"summary": "second", "notes": null},
            {"notes": "third", "_id": "65f0c2"}
        ]"#,
    )
    .expect("load");

    let texts: Vec<&str> = corpus.iter().map(|d| d.text()).collect();
    assert_eq!(texts, vec!["first  ", " second ", "  third"]);
}

#[test]
fn missing_middle_field_keeps_both_separators() {
    let corpus = load_str(r#"{"transcript": "a", "notes": "c"}"#).expect("load");
    assert_eq!(corpus.get(0).unwrap().text(), "a  c");

    let blank = load_str("{}").expect("load");
    assert_eq!(blank.get(0).unwrap().text(), "  ", "all parts empty still joins three");
}

#[test]
fn empty_array_is_an_empty_corpus() {
    let corpus = load_str("[]").expect("empty array is valid");
    assert!(corpus.is_empty());
}

#[test]
fn missing_file_is_source_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = load(&JsonFileStore::new(tmp.path().join("nope.json"))).unwrap_err();
    assert!(matches!(err, Error::SourceNotFound(_)), "got {err}");
}

#[test]
fn wrong_field_types_are_malformed() {
    for raw in [
        r#"{"transcript": 12}"#,
        r#"{"notes": ["ok", 3]}"#,
        r#"[{"summary": "fine"}, "not a record"]"#,
        r#"{"transcript": "unterminated"#,
        "null",
    ] {
        let err = load_str(raw).unwrap_err();
        assert!(matches!(err, Error::MalformedSource(_)), "{raw:?} gave {err}");
    }
}

#[test]
fn malformed_file_error_names_the_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.json");
    fs::write(&path, "__import__('os')").unwrap();

    match JsonFileStore::new(&path).read_records() {
        Err(Error::MalformedSource(msg)) => assert!(msg.contains("bad.json"), "{msg}"),
        other => panic!("expected MalformedSource, got {other:?}"),
    }
}

#[test]
fn dir_store_reads_json_files_in_sorted_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("2024")).unwrap();
    fs::write(dir.join("b.json"), r#"{"transcript": "bravo"}"#).unwrap();
    fs::write(dir.join("a.json"), r#"[{"transcript": "alpha"}, {"transcript": "alpha two"}]"#).unwrap();
    fs::write(dir.join("2024/c.json"), r#"{"transcript": "charlie"}"#).unwrap();
    fs::write(dir.join("ignored.txt"), "not a record").unwrap();

    let corpus = load(&*store::open(dir)).expect("load dir");
    let texts: Vec<&str> = corpus.iter().map(|d| d.text()).collect();
    assert_eq!(texts, vec!["charlie  ", "alpha  ", "alpha two  ", "bravo  "]);
}

#[test]
fn dir_store_on_missing_dir_is_source_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = JsonDirStore::new(tmp.path().join("missing")).read_records().unwrap_err();
    assert!(matches!(err, Error::SourceNotFound(_)));
}

#[test]
fn memory_store_flattens_note_lines() {
    let records = vec![RawRecord::new("talk", "sum", Notes::Lines(vec!["x".into(), "y".into()]))];
    let corpus = load(&MemoryStore::new(records)).expect("load");
    assert_eq!(corpus.get(0).unwrap().text(), "talk sum x y");
}

#[test]
fn content_hash_tracks_document_boundaries() {
    let a = Corpus::from_texts(["ab", "c"]);
    let b = Corpus::from_texts(["a", "bc"]);
    assert_ne!(a.content_hash(), b.content_hash());
    assert_eq!(a.content_hash(), Corpus::from_texts(["ab", "c"]).content_hash());
}

#[test]
fn retrieval_settings_from_config_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[retrieval]\nrecords_path = \"records\"\nsearch_top_n = 5\n",
    )
    .unwrap();

    let config = Config::load_in(tmp.path()).expect("config");
    let settings = config.retrieval().expect("settings");

    assert_eq!(settings.search_top_n, 5);
    assert_eq!(settings.default_top_n, 1, "unset fields keep their defaults");
    assert_eq!(settings.records_path(tmp.path()), tmp.path().join("records"));
    assert_eq!(settings.snapshot_path(tmp.path()), None);
}

#[test]
fn retrieval_settings_reject_zero_widths() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[retrieval]\ndefault_top_n = 0\n").unwrap();

    let err = Config::load_in(tmp.path()).expect("config").retrieval().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
    assert!(RetrievalSettings::default().validate().is_ok());
}

#[test]
fn injected_figment_overrides_retrieval_defaults() {
    let overrides = RetrievalSettings {
        snapshot_path: Some("cache/index.json".to_string()),
        search_top_n: 7,
        ..RetrievalSettings::default()
    };
    let config = Config::from_figment(Figment::from(Serialized::default("retrieval", &overrides)));

    let settings = config.retrieval().expect("settings");
    assert_eq!(settings, overrides);
    assert_eq!(config.get::<usize>("retrieval.search_top_n").unwrap(), 7);
    assert_eq!(
        settings.snapshot_path(std::path::Path::new("/srv")),
        Some(std::path::PathBuf::from("/srv/cache/index.json"))
    );
}

#[test]
fn absolute_paths_ignore_base() {
    let tmp = TempDir::new().unwrap();
    let abs = tmp.path().join("x.json");
    assert_eq!(resolve_with_base(std::path::Path::new("/elsewhere"), abs.to_string_lossy()), abs);
}
