//! Alias corpus directory loading.

use std::fs;
use std::path::PathBuf;

use ivr_map::corpus::{GLOBAL_FILE, SCOPES_DIR, load_dir};
use ivr_map::{AliasScope, ConfigurationError};
use ivr_model::Normalizer;

struct TempCorpus {
    root: PathBuf,
}

impl TempCorpus {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "ivr_map_corpus_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join(SCOPES_DIR)).expect("create corpus dir");
        Self { root }
    }

    fn write(&self, relative: &str, content: &str) {
        fs::write(self.root.join(relative), content).expect("write alias file");
    }
}

impl Drop for TempCorpus {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

const HEADER: &str = "\"Canonical Name\",\"Variant\"\n";

#[test]
fn loads_global_and_manufacturer_files() {
    let dir = TempCorpus::new("loads");
    dir.write(
        GLOBAL_FILE,
        &format!("{HEADER}\"provider_npi\",\"NPI Number\"\n\"facility_name\",\"Practice Name\"\n"),
    );
    dir.write(
        "manufacturers/MedLife.csv",
        &format!("{HEADER}\"provider_npi\",\"Physician NPI\"\n"),
    );
    dir.write(
        "manufacturers/acz.csv",
        &format!("{HEADER}\"provider_npi\",\"Physician NPI\"\n"),
    );
    dir.write("manufacturers/notes.txt", "ignored");

    let corpus = load_dir(&dir.root).expect("load corpus");
    assert_eq!(corpus.len(), 4);
    assert_eq!(
        corpus.scopes(),
        vec![
            &AliasScope::Global,
            &AliasScope::Scoped("acz".to_string()),
            &AliasScope::Scoped("medlife".to_string()),
        ]
    );

    let name = Normalizer::default().normalize("Physician NPI");
    assert_eq!(
        corpus.lookup(&name, Some("MEDLIFE")).map(|c| c.as_str()),
        Some("provider_npi")
    );
    assert_eq!(corpus.lookup(&name, None), None);
}

#[test]
fn duplicate_variant_in_one_scope_is_fatal() {
    let dir = TempCorpus::new("duplicate");
    dir.write(
        "manufacturers/medlife.csv",
        &format!("{HEADER}\"provider_npi\",\"Physician NPI\"\n\"facility_npi\",\"physician-npi\"\n"),
    );
    let err = load_dir(&dir.root).unwrap_err();
    match err {
        ConfigurationError::DuplicateAlias {
            scope,
            variant,
            existing,
            attempted,
        } => {
            assert_eq!(scope, "medlife");
            assert_eq!(variant, "physician_npi");
            assert_eq!(existing, "provider_npi");
            assert_eq!(attempted, "facility_npi");
        }
        other => panic!("expected duplicate alias, got {other:?}"),
    }
}

#[test]
fn empty_directory_yields_empty_corpus() {
    let dir = TempCorpus::new("empty");
    let corpus = load_dir(&dir.root).expect("load corpus");
    assert!(corpus.is_empty());
}

#[test]
fn missing_directory_is_an_io_error() {
    let missing = std::env::temp_dir().join("ivr_map_corpus_does_not_exist_9f2c");
    let err = load_dir(&missing).unwrap_err();
    assert!(matches!(err, ConfigurationError::Io { .. }));
}
