//! `rh inspect`: summary of what the index holds.

use anyhow::Result;

use crate::config::Config;
use crate::engine;

const TOP_FEATURES: usize = 10;

pub async fn run_inspect(config: &Config) -> Result<()> {
    let (index, store) = engine::open_index(config).await?;
    let snapshot = index.snapshot()?;
    let corpus = snapshot.corpus();
    let space = snapshot.space();
    let params = space.params();

    let blank = corpus.normalized().iter().filter(|n| n.is_empty()).count();

    println!("Report Harness — Index");
    println!("======================");
    println!();
    println!("  Document:    {}", store.path().display());
    println!("  Fingerprint: {}", snapshot.fingerprint());
    println!("  Built:       {}", snapshot.built_at().format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Analyzer:    {}", snapshot.normalizer().analyzer_name());
    println!();
    println!("  Lines:       {} ({} without content words)", corpus.len(), blank);
    println!("  Features:    {}", space.dimension());
    println!(
        "  N-grams:     {}..={}   min_df: {}   max_df: {}",
        params.ngram_range.0, params.ngram_range.1, params.min_df, params.max_df
    );
    println!();
    println!("  Rarest features:");
    for (feature, idf) in space.top_features(TOP_FEATURES) {
        println!("    {:<24} {:.4}", feature, idf);
    }

    Ok(())
}
