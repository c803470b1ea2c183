//! Report generation and publication.
//!
//! Publishing saves the new report as the document and rebuilds the index
//! from it. The save is authoritative: if the new text cannot be indexed,
//! the file is still replaced and the previous snapshot keeps serving
//! queries until a later report indexes cleanly.

use anyhow::Result;
use report_harness_core::IndexHandle;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::document::DocumentStore;
use crate::engine;
use crate::llm::{create_backend, CompletionBackend};
use crate::profiles::load_tables;
use crate::prompt::report_prompt;

/// Ask `backend` for a report built from the profile tables and `info`.
pub async fn generate(
    tables: &[PathBuf],
    backend: &dyn CompletionBackend,
    info: &str,
) -> Result<String> {
    let tables = load_tables(tables).await?;
    let prompt = report_prompt(&tables, info);
    backend.complete(&prompt).await
}

/// Save `text` as the document, then rebuild `index` from it.
///
/// Returns the new generation, or `None` if the rebuild failed.
pub async fn publish(
    store: &DocumentStore,
    index: &Arc<IndexHandle>,
    text: &str,
) -> Result<Option<u64>> {
    store.save(text).await?;
    match engine::rebuild(index.clone(), text.to_string()).await {
        Ok(snapshot) => Ok(Some(snapshot.generation())),
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "saved report could not be indexed");
            Ok(None)
        }
    }
}

/// `rh report`: generate a report and save it as the document.
pub async fn run_report(config: &Config, info: &str) -> Result<()> {
    let backend = create_backend(&config.llm.report_backend, &config.llm)?;
    let text = generate(&config.profiles.tables, backend.as_ref(), info).await?;

    let store = DocumentStore::new(&config.document.path);
    let index = Arc::new(engine::create_handle(config)?);
    let generation = publish(&store, &index, &text).await?;

    println!("{}", text);
    eprintln!();
    match generation {
        Some(_) => eprintln!(
            "Saved to {} ({} lines indexed)",
            store.path().display(),
            index.snapshot()?.corpus().len()
        ),
        None => eprintln!(
            "Saved to {} (not indexable; see log)",
            store.path().display()
        ),
    }
    Ok(())
}
