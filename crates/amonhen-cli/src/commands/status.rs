//! `amonhen status` — item/cluster counts, total cost, per-source health
//!
//! Ported from `cli.py::status`.

use amonhen_config::Settings;
use amonhen_store::MetaStore;
use amonhen_vectorindex::VectorIndex;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct StatusArgs {}

pub fn execute(_args: StatusArgs, settings: &Settings) -> Result<()> {
    let store = MetaStore::open(&settings.sqlite_path)?;
    let vectors = VectorIndex::open(&settings.vector_index_path)?;

    let item_count = store.get_item_count()?;
    let cluster_count = store.get_cluster_count()?;
    let total_cost = store.total_cost_usd()?;
    let vector_info = vectors.collection_info();

    println!("Items:    {item_count}");
    println!("Clusters: {cluster_count}");
    println!("Vectors:  {}", vector_info.points_count);
    println!("Total cost: ${total_cost:.4}");
    println!();

    let statuses = store.get_all_source_health()?;
    if statuses.is_empty() {
        println!("No source status recorded yet.");
        return Ok(());
    }

    println!("Source Health:");
    for s in statuses {
        let status_str = if s.error_count == 0 {
            "OK".to_string()
        } else {
            format!("ERR({})", s.error_count)
        };
        let last = s
            .last_fetch_at
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "  {:<25} {:<10} last={}  items={}",
            s.source_name, status_str, last, s.items_fetched
        );
    }

    Ok(())
}
