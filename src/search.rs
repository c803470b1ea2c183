//! `rh search`: rank document lines for a query from the command line.

use anyhow::Result;
use report_harness_core::search::rank_normalized;
use report_harness_core::NO_RELATED_INFO;

use crate::config::Config;
use crate::engine;

pub async fn run_search(
    config: &Config,
    query: &str,
    top_k: Option<usize>,
    explain: bool,
) -> Result<()> {
    let (index, _store) = engine::open_index(config).await?;
    let snapshot = index.snapshot()?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);

    let normalized = snapshot.normalizer().normalize(query);
    let hits = rank_normalized(&snapshot, &normalized, top_k)?;

    if explain {
        let space = snapshot.space();
        println!("query:      {}", query);
        println!("normalized: {}", normalized);
        println!("features:");
        for feature in space.features(&normalized) {
            match space.vocabulary().get(&feature) {
                Some(&i) => println!("    {:<24} idf {:.4}", feature, space.idf()[i]),
                None => println!("    {:<24} (not in vocabulary)", feature),
            }
        }
        println!();
    }

    if hits.is_empty() {
        println!("{}", NO_RELATED_INFO);
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("{}. [{:.2}] line {}", i + 1, hit.score, hit.line + 1);
        println!("    text: \"{}\"", hit.text.trim());
        if explain {
            println!(
                "    normalized: \"{}\"",
                snapshot.corpus().normalized()[hit.line]
            );
        }
    }

    Ok(())
}
