//! Retrieval-grounded question answering.

use anyhow::Result;
use report_harness_core::IndexHandle;

use crate::config::Config;
use crate::engine;
use crate::llm::{create_backend, CompletionBackend};
use crate::prompt::chat_prompt;

/// Retrieve context for `prompt`, then ask `backend` to answer.
///
/// A missing index surfaces as a [`report_harness_core::PreconditionError`]
/// inside the returned error.
pub async fn answer(
    index: &IndexHandle,
    backend: &dyn CompletionBackend,
    top_k: usize,
    prompt: &str,
    prev_chat: &str,
) -> Result<String> {
    let relevant_info = index.context(prompt, top_k)?;
    tracing::debug!(relevant_info = %relevant_info, "retrieved context");
    let full_prompt = chat_prompt(&relevant_info, prompt, prev_chat);
    backend.complete(&full_prompt).await
}

/// `rh chat`: answer one question against the current document.
pub async fn run_chat(config: &Config, prompt: &str, prev_chat: &str) -> Result<()> {
    let (index, _store) = engine::open_index(config).await?;
    let backend = create_backend(&config.llm.chat_backend, &config.llm)?;
    let response = answer(
        &index,
        backend.as_ref(),
        config.retrieval.top_k,
        prompt,
        prev_chat,
    )
    .await?;
    println!("{}", response);
    Ok(())
}
