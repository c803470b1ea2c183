//! Wiring between configuration, the document on disk, and the core index.

use anyhow::{Context, Result};
use report_harness_core::{
    IndexHandle, IndexSnapshot, Lexicon, MorphAnalyzer, Normalizer, RuleAnalyzer, UserDictionary,
};
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::document::DocumentStore;

/// The rule analyzer, extended with the configured user dictionary.
pub fn create_analyzer(config: &Config) -> Result<Arc<dyn MorphAnalyzer>> {
    let mut lexicon = Lexicon::builtin();
    if let Some(path) = &config.analyzer.user_dictionary {
        let dict = load_user_dictionary(path)?;
        tracing::info!(
            path = %path.display(),
            nouns = dict.nouns.len(),
            adjectives = dict.adjectives.len(),
            "user dictionary loaded"
        );
        lexicon.extend(&dict);
    }
    Ok(Arc::new(RuleAnalyzer::with_lexicon(lexicon)))
}

fn load_user_dictionary(path: &Path) -> Result<UserDictionary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read user dictionary: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse user dictionary: {}", path.display()))
}

/// An empty handle configured from `[analyzer]` and `[retrieval]`.
pub fn create_handle(config: &Config) -> Result<IndexHandle> {
    let normalizer = Normalizer::with_retain(create_analyzer(config)?, config.retain_tags()?);
    Ok(IndexHandle::new(
        Arc::new(normalizer),
        config.retrieval.tfidf_params(),
    ))
}

/// Rebuild `handle` from `text` on the blocking pool.
pub async fn rebuild(handle: Arc<IndexHandle>, text: String) -> Result<Arc<IndexSnapshot>> {
    let snapshot = tokio::task::spawn_blocking(move || handle.rebuild(&text))
        .await
        .context("index rebuild task panicked")??;
    Ok(snapshot)
}

/// Load the document and build a ready-to-search handle.
///
/// Fails if the document cannot be indexed; used by one-shot CLI commands.
pub async fn open_index(config: &Config) -> Result<(Arc<IndexHandle>, DocumentStore)> {
    let store = DocumentStore::new(&config.document.path);
    let handle = Arc::new(create_handle(config)?);
    let text = store.load().await?;
    rebuild(handle.clone(), text)
        .await
        .with_context(|| format!("Failed to index {}", store.path().display()))?;
    Ok((handle, store))
}
