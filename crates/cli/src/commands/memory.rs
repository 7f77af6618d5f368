//! `hearth memory`: append and list memory records.

use hearth_core::memory::{MemoryKind, MemoryLog, MemoryRecord};
use hearth_memory::FileMemoryLog;

use super::load_config;

pub async fn add(
    owner: &str,
    summary: &str,
    kind: &str,
    importance: f64,
    tags: Vec<String>,
    source: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let kind: MemoryKind = kind.parse()?;
    let log = FileMemoryLog::new(config.storage.memory_dir());

    let record = MemoryRecord::new(summary)
        .with_kind(kind)
        .with_importance(importance)
        .with_tags(tags)
        .with_source(source);

    let stored = log.append(owner, record).await?;
    println!("🧠 Stored memory {}", stored.id);
    println!("   Kind:       {}", stored.kind);
    println!("   Importance: {:.2}", stored.importance);
    if !stored.tags.is_empty() {
        println!("   Tags:       {}", stored.tags.join(", "));
    }
    Ok(())
}

pub async fn recent(owner: &str, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let log = FileMemoryLog::new(config.storage.memory_dir());

    let records = log.load_recent(owner, limit).await;
    if records.is_empty() {
        println!("   No memories for {owner}.");
        return Ok(());
    }

    println!("🧠 {} most recent memories for {owner}", records.len());
    println!();
    for r in &records {
        let date = r
            .created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".into());
        println!("  [{date}] {:<12} {:.2}  {}", r.kind.as_str(), r.importance, r.summary);
    }
    Ok(())
}
