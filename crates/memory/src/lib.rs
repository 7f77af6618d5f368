//! Storage implementations for Hearth: memory logs, transcripts, the
//! imported archive, and the timeline directory.

pub mod noop;
pub mod in_memory;
pub mod file_backend;
pub mod transcript;
pub mod imported;
pub mod timeline;
pub mod locks;
mod jsonl;

pub use noop::NoopMemory;
pub use in_memory::InMemoryLog;
pub use file_backend::FileMemoryLog;
pub use transcript::{FileDialogueLog, InMemoryDialogueLog};
pub use imported::ImportedArchive;
pub use timeline::DirectoryTimeline;
pub use locks::OwnerLocks;
