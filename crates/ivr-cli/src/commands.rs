use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use ivr_cli::input::{parse_catalog, parse_ocr, parse_sources, parse_stored, read_with};
use ivr_map::corpus::load_dir;
use ivr_map::{AliasCorpus, AliasEntry, AliasScope, MappingEngine, MappingReport, MatchPolicy};

use crate::cli::{AliasesArgs, ResolveArgs};

pub fn run_resolve(args: &ResolveArgs) -> Result<MappingReport> {
    let span = info_span!("resolve", scope = args.scope.as_deref().unwrap_or(""));
    let _guard = span.enter();

    let corpus = load_corpus(args.aliases.as_deref())?;
    let policy = match &args.policy {
        Some(path) => MatchPolicy::from_path(path).context("load match policy")?,
        None => MatchPolicy::default(),
    };
    debug!(?policy, "Match policy");
    let engine = MappingEngine::new(corpus, policy).context("configure mapping engine")?;

    let sources = read_with(&args.sources, parse_sources)?;
    let catalog = read_with(&args.catalog, parse_catalog)?;
    let stored = match &args.stored {
        Some(path) => Some(read_with(path, parse_stored)?),
        None => None,
    };
    info!(
        sources = sources.len(),
        targets = catalog.len(),
        stored = stored.as_ref().map_or(0, Vec::len),
        "Inputs loaded"
    );

    let report = engine
        .resolve_and_validate(&sources, &catalog, args.scope.as_deref(), stored.as_deref())
        .context("resolve mappings")?;
    match &args.ocr {
        Some(path) => {
            let ocr = read_with(path, parse_ocr)?;
            Ok(engine.reconcile_with_ocr(&report, &ocr))
        }
        None => Ok(report),
    }
}

/// Corpus entries visible from the requested scope, sorted.
pub fn run_aliases(args: &AliasesArgs) -> Result<Vec<AliasEntry>> {
    let corpus = load_corpus(args.aliases.as_deref())?;
    let entries = corpus.entries();
    Ok(match args.scope.as_deref() {
        Some(scope) => {
            let scope = AliasScope::from_id(scope);
            entries
                .into_iter()
                .filter(|entry| entry.scope.is_global() || entry.scope == scope)
                .collect()
        }
        None => entries,
    })
}

fn load_corpus(dir: Option<&Path>) -> Result<AliasCorpus> {
    match dir {
        Some(dir) => {
            load_dir(dir).with_context(|| format!("load alias corpus from {}", dir.display()))
        }
        None => AliasCorpus::builtin().context("load built-in alias corpus"),
    }
}
