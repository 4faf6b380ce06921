//! Verify command - batch threat-intelligence lookups

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use serde_json::json;
use veil_cache::MemoryCache;
use veil_core::IndicatorKind;
use veil_intel::{IntelConfig, ThreatAggregator};

use crate::cli::KindArg;

pub async fn handle(
    kind: KindArg,
    items: Vec<String>,
    file: Option<PathBuf>,
    cache: Arc<MemoryCache>,
) -> Result<()> {
    let kind: IndicatorKind = kind.into();

    let mut items = items;
    if let Some(path) = file {
        let text = super::read_input(Some(&path))?;
        items.extend(text.lines().map(str::to_string));
    }
    if items.iter().all(|i| i.trim().is_empty()) {
        bail!("no indicators given; pass them as arguments or via --file");
    }

    let config = IntelConfig::from_env();
    if config.virustotal_api_key.is_none() && config.abuseipdb_api_key.is_none() {
        tracing::warn!("no API keys configured; verdicts will be placeholders");
    }

    let aggregator = ThreatAggregator::from_config(&config, cache);

    let result = aggregator.verify_batch(&items, kind).await;
    let summary = result.summary(aggregator.source_names());

    tracing::info!(
        total = result.total,
        malicious = result.malicious,
        suspicious = result.suspicious,
        clean = result.clean,
        "batch verification finished"
    );

    let report = json!({
        "total": result.total,
        "malicious": result.malicious,
        "suspicious": result.suspicious,
        "clean": result.clean,
        "items": result.items,
        "summary": summary,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
