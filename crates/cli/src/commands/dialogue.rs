//! `hearth dialogue`: append turns to the transcript.

use hearth_core::dialogue::{DialogueLog, DialogueTurn, TurnRole};
use hearth_memory::FileDialogueLog;

use super::load_config;

pub async fn append(owner: &str, role: &str, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let role: TurnRole = role.parse()?;
    let log = FileDialogueLog::new(config.storage.transcript_dir());

    let turn = match role {
        TurnRole::User => DialogueTurn::user(content),
        TurnRole::Assistant => DialogueTurn::assistant(content),
    };
    log.append(owner, turn).await?;
    println!("💬 Appended {role} turn for {owner}");
    Ok(())
}
