//! JSON-lines helpers shared by the file-backed stores.
//!
//! One JSON object per line. Reads skip blank and corrupted lines; a file
//! that does not exist yet reads as empty.

use hearth_core::error::MemoryError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::io::SeekFrom;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::warn;

/// Resolve `{dir}/{owner}{suffix}`, rejecting owner ids that are not a
/// plain file-name component.
pub(crate) fn owner_file(dir: &Path, owner_id: &str, suffix: &str) -> Result<PathBuf, MemoryError> {
    let valid = !owner_id.is_empty()
        && owner_id != "."
        && owner_id != ".."
        && owner_id
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
    if !valid {
        return Err(MemoryError::Validation(format!("invalid owner id: {owner_id:?}")));
    }
    Ok(dir.join(format!("{owner_id}{suffix}")))
}

/// Read every parseable line of a JSONL file.
pub(crate) async fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, MemoryError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(MemoryError::NotAvailable(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };

    Ok(content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(n, line)| match serde_json::from_str::<T>(line) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(file = %path.display(), line = n + 1, error = %e, "Skipping corrupted line");
                None
            }
        })
        .collect())
}

/// Append one serialized value as a single line, creating the file and
/// its parent directory on first write.
///
/// A file whose last line was left unterminated gets a newline first, so
/// the partial line stays the only corrupted one. Callers hold the owner lock.
pub(crate) async fn append_line<T: Serialize>(path: &Path, value: &T) -> Result<(), MemoryError> {
    let json = serde_json::to_string(value)
        .map_err(|e| MemoryError::Storage(format!("failed to serialize entry: {e}")))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            MemoryError::Storage(format!("failed to create {}: {e}", parent.display()))
        })?;
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| MemoryError::Storage(format!("failed to open {}: {e}", path.display())))?;

    let mut line = String::with_capacity(json.len() + 2);
    if !ends_with_newline(&mut file)
        .await
        .map_err(|e| MemoryError::Storage(format!("failed to inspect {}: {e}", path.display())))?
    {
        warn!(file = %path.display(), "Unterminated last line, starting a new one");
        line.push('\n');
    }
    line.push_str(&json);
    line.push('\n');

    file.write_all(line.as_bytes())
        .await
        .map_err(|e| MemoryError::Storage(format!("failed to write {}: {e}", path.display())))?;
    file.flush()
        .await
        .map_err(|e| MemoryError::Storage(format!("failed to flush {}: {e}", path.display())))?;

    Ok(())
}

/// Whether the file is empty or its last byte is `\n`.
async fn ends_with_newline(file: &mut tokio::fs::File) -> std::io::Result<bool> {
    let len = file.metadata().await?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] == b'\n')
}
