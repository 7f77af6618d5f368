//! `hearth context`: assemble and print the context for one message.

use hearth_context::ContextRequest;
use hearth_core::dialogue::DialogueLog;
use hearth_memory::FileDialogueLog;

use super::{build_engine, load_config};

pub async fn run(
    owner: &str,
    query: &str,
    budget: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let engine = build_engine(&config);

    let transcript = FileDialogueLog::new(config.storage.transcript_dir());
    let turns = transcript
        .load_recent(owner, config.context.max_dialogue_turns)
        .await;

    let mut request = ContextRequest::new(owner, query).with_turns(turns);
    if let Some(budget) = budget {
        request = request.with_budget(budget);
    }

    let assembled = engine.assemble(request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&assembled)?);
        return Ok(());
    }

    println!("{}", assembled.render());
    println!();
    let meta = &assembled.metadata;
    println!(
        "📦 {} / {} chars ({:.1}%)",
        meta.total_chars, meta.budget, meta.utilization_pct
    );
    for block in &meta.blocks {
        println!(
            "   {:<24} {:>6} chars  {}/{} items",
            block.label, block.chars, block.items_included, block.items_total
        );
    }
    for drop in &meta.drops {
        println!(
            "   ⚠️  {} dropped {} item(s), {} chars: {}",
            drop.label, drop.items_dropped, drop.chars_dropped, drop.reason
        );
    }
    Ok(())
}
