//! Context assembly: pack everything into one budgeted payload.
//!
//! Blocks are budgeted in priority order:
//!
//! | Priority | Block | Overflow strategy |
//! |----------|-------|-------------------|
//! | 1 | Persona | Never trimmed |
//! | 2 | Current message | Never trimmed |
//! | 3 | Recent dialogue | Oldest turns dropped first |
//! | 4 | Dialogue digest | Omitted whole |
//! | 5 | Long-term memories | Omitted whole |
//! | 6 | Timeline | Omitted whole |
//! | 7 | Imported memories | Omitted whole |
//!
//! and rendered in reading order: persona, dialogue, digest, memories,
//! timeline, imported memories, and the current message last.
//!
//! The serialized form is `[LABEL]\nbody` per block, blocks separated by a
//! blank line. Sizes are counted in characters of that serialized form, so
//! `total_chars == render().chars().count() <= budget` always holds.
//!
//! Assembly is deterministic: identical inputs always produce identical
//! outputs.

use hearth_core::dialogue::DialogueTurn;
use hearth_core::memory::MemoryRecord;
use hearth_core::timeline::TimelineEvent;
use serde::{Deserialize, Serialize};

use crate::timeline::render_event;
use crate::window::transcript_lines;

/// Characters between two rendered blocks.
const SEPARATOR: &str = "\n\n";

// ── Types ─────────────────────────────────────────────────────────────────

/// Which block a body belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Persona,
    Transcript,
    Digest,
    Memories,
    Timeline,
    Imported,
    Utterance,
}

impl BlockKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Persona => "CORE_SYSTEM",
            Self::Transcript => "RECENT_DIALOGUE",
            Self::Digest => "RECENT_DIALOGUE_SUMMARY",
            Self::Memories => "LONG_TERM_MEMORY",
            Self::Timeline => "TIMELINE",
            Self::Imported => "IMPORTED_MEMORY",
            Self::Utterance => "USER_MESSAGE",
        }
    }

    /// Position in the rendered output.
    fn render_rank(&self) -> u8 {
        match self {
            Self::Persona => 0,
            Self::Transcript => 1,
            Self::Digest => 2,
            Self::Memories => 3,
            Self::Timeline => 4,
            Self::Imported => 5,
            Self::Utterance => 6,
        }
    }

    /// Characters of `[LABEL]\n`.
    fn header_chars(&self) -> usize {
        self.label().chars().count() + 3
    }
}

/// One labeled block of the assembled context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextBlock {
    pub kind: BlockKind,
    pub body: String,
}

impl ContextBlock {
    pub fn new(kind: BlockKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            body: body.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    /// Characters this block occupies when rendered, separator excluded.
    pub fn rendered_chars(&self) -> usize {
        self.kind.header_chars() + self.body.chars().count()
    }

    fn render_into(&self, out: &mut String) {
        out.push('[');
        out.push_str(self.label());
        out.push_str("]\n");
        out.push_str(&self.body);
    }
}

/// All inputs for one assembly.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyInput<'a> {
    /// Persona text, included verbatim.
    pub persona: &'a str,
    /// The current user message, included verbatim.
    pub utterance: &'a str,
    /// The trimmed dialogue window, oldest first.
    pub transcript: &'a [DialogueTurn],
    /// Digest lines from the dialogue window.
    pub digest: &'a [String],
    /// Selected ordinary memories, best first.
    pub memories: &'a [MemoryRecord],
    /// Selected timeline events, best first.
    pub timeline: &'a [TimelineEvent],
    /// Selected imported memories, best first.
    pub imported: &'a [MemoryRecord],
}

/// The assembled context, ready to be serialized for the generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledContext {
    /// Blocks in render order.
    pub blocks: Vec<ContextBlock>,
    /// Character count of `render()`.
    pub total_chars: usize,
    pub metadata: AssemblyMetadata,
}

impl AssembledContext {
    /// `[LABEL]\nbody` per block, joined by a blank line.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.total_chars * 4);
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push_str(SEPARATOR);
            }
            block.render_into(&mut out);
        }
        out
    }

    pub fn block(&self, kind: BlockKind) -> Option<&ContextBlock> {
        self.blocks.iter().find(|b| b.kind == kind)
    }
}

/// Detailed metadata about the assembly process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    /// Configured budget, in characters.
    pub budget: usize,
    pub total_chars: usize,
    /// Budget utilization percentage (0.0–100.0).
    pub utilization_pct: f32,
    /// Per-block statistics, in priority order.
    pub blocks: Vec<BlockStats>,
    /// Items dropped during budget enforcement.
    pub drops: Vec<DropInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockStats {
    pub label: String,
    /// Characters the block occupies when rendered (0 if omitted).
    pub chars: usize,
    pub items_included: usize,
    pub items_total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropInfo {
    pub label: String,
    pub items_dropped: usize,
    pub chars_dropped: usize,
    pub reason: String,
}

/// Errors from context assembly.
#[derive(Debug, Clone)]
pub enum AssemblyError {
    /// Persona + current message alone exceed the budget.
    BudgetExceeded {
        persona_chars: usize,
        utterance_chars: usize,
        budget: usize,
    },
}

impl std::fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BudgetExceeded {
                persona_chars,
                utterance_chars,
                budget,
            } => write!(
                f,
                "Persona ({} chars) + current message ({} chars) exceed the context budget ({} chars)",
                persona_chars, utterance_chars, budget
            ),
        }
    }
}

impl std::error::Error for AssemblyError {}

/// `- [kind|YYYY-MM-DD] summary (tags: a, b)`
pub fn render_memory(record: &MemoryRecord) -> String {
    let mut line = match record.created_at {
        Some(ts) => format!("- [{}|{}] {}", record.kind, ts.format("%Y-%m-%d"), record.summary.trim()),
        None => format!("- [{}] {}", record.kind, record.summary.trim()),
    };
    if !record.tags.is_empty() {
        line.push_str(&format!(" (tags: {})", record.tags.join(", ")));
    }
    line
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// The context assembler. Stateless apart from its budget.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    budget_chars: usize,
}

/// Running state while blocks are admitted.
struct Packing {
    remaining: usize,
    blocks: Vec<ContextBlock>,
    stats: Vec<BlockStats>,
    drops: Vec<DropInfo>,
}

impl Packing {
    /// Admit a block of `lines` whole, or record it as dropped.
    fn admit_whole(&mut self, kind: BlockKind, lines: Vec<String>, reason: &str) {
        if lines.is_empty() {
            return;
        }
        let block = ContextBlock::new(kind, lines.join("\n"));
        let cost = SEPARATOR.len() + block.rendered_chars();

        if cost <= self.remaining {
            self.remaining -= cost;
            self.stats.push(BlockStats {
                label: kind.label().into(),
                chars: block.rendered_chars(),
                items_included: lines.len(),
                items_total: lines.len(),
            });
            self.blocks.push(block);
        } else {
            self.stats.push(BlockStats {
                label: kind.label().into(),
                chars: 0,
                items_included: 0,
                items_total: lines.len(),
            });
            self.drops.push(DropInfo {
                label: kind.label().into(),
                items_dropped: lines.len(),
                chars_dropped: block.rendered_chars(),
                reason: reason.into(),
            });
        }
    }

    /// Admit the newest transcript lines that fit, dropping oldest first.
    fn admit_transcript(&mut self, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        let kind = BlockKind::Transcript;
        let overhead = SEPARATOR.len() + kind.header_chars();
        let total = lines.len();

        let mut used = overhead;
        let mut kept = 0;
        if overhead < self.remaining {
            for line in lines.iter().rev() {
                let cost = line.chars().count() + usize::from(kept > 0);
                if used + cost > self.remaining {
                    break;
                }
                used += cost;
                kept += 1;
            }
        }

        let dropped_chars: usize = lines[..total - kept].iter().map(|l| l.chars().count() + 1).sum();

        if kept == 0 {
            self.stats.push(BlockStats {
                label: kind.label().into(),
                chars: 0,
                items_included: 0,
                items_total: total,
            });
            self.drops.push(DropInfo {
                label: kind.label().into(),
                items_dropped: total,
                chars_dropped: dropped_chars,
                reason: "No budget left for recent dialogue".into(),
            });
            return;
        }

        let block = ContextBlock::new(kind, lines[total - kept..].join("\n"));
        self.remaining -= used;
        self.stats.push(BlockStats {
            label: kind.label().into(),
            chars: block.rendered_chars(),
            items_included: kept,
            items_total: total,
        });
        if kept < total {
            self.drops.push(DropInfo {
                label: kind.label().into(),
                items_dropped: total - kept,
                chars_dropped: dropped_chars,
                reason: "Oldest turns dropped".into(),
            });
        }
        self.blocks.push(block);
    }
}

impl ContextAssembler {
    pub fn new(budget_chars: usize) -> Self {
        Self { budget_chars }
    }

    pub fn budget_chars(&self) -> usize {
        self.budget_chars
    }

    /// Assemble all blocks under the budget.
    ///
    /// # Algorithm
    ///
    /// 1. Measure persona + current message (always included)
    /// 2. If those exceed the budget → return error
    /// 3. Admit the rest in priority order against what remains
    /// 4. Order blocks for reading and compute metadata
    pub fn assemble(&self, input: &AssemblyInput<'_>) -> Result<AssembledContext, AssemblyError> {
        let persona = ContextBlock::new(BlockKind::Persona, input.persona);
        let utterance = ContextBlock::new(BlockKind::Utterance, input.utterance);
        let persona_chars = persona.rendered_chars();
        let utterance_chars = utterance.rendered_chars();

        let reserved = persona_chars + SEPARATOR.len() + utterance_chars;
        if reserved > self.budget_chars {
            return Err(AssemblyError::BudgetExceeded {
                persona_chars,
                utterance_chars,
                budget: self.budget_chars,
            });
        }

        let mut packing = Packing {
            remaining: self.budget_chars - reserved,
            blocks: Vec::with_capacity(7),
            stats: vec![
                BlockStats {
                    label: BlockKind::Persona.label().into(),
                    chars: persona_chars,
                    items_included: 1,
                    items_total: 1,
                },
                BlockStats {
                    label: BlockKind::Utterance.label().into(),
                    chars: utterance_chars,
                    items_included: 1,
                    items_total: 1,
                },
            ],
            drops: Vec::new(),
        };
        packing.blocks.push(persona);
        packing.blocks.push(utterance);

        packing.admit_transcript(transcript_lines(input.transcript));
        packing.admit_whole(
            BlockKind::Digest,
            input.digest.to_vec(),
            "No budget left for dialogue digest",
        );
        packing.admit_whole(
            BlockKind::Memories,
            input.memories.iter().map(render_memory).collect(),
            "No budget left for memories",
        );
        packing.admit_whole(
            BlockKind::Timeline,
            input.timeline.iter().map(render_event).collect(),
            "No budget left for timeline",
        );
        packing.admit_whole(
            BlockKind::Imported,
            input.imported.iter().map(render_memory).collect(),
            "No budget left for imported memories",
        );

        let Packing {
            mut blocks,
            stats,
            drops,
            ..
        } = packing;
        blocks.sort_by_key(|b| b.kind.render_rank());

        let mut context = AssembledContext {
            blocks,
            total_chars: 0,
            metadata: AssemblyMetadata {
                budget: self.budget_chars,
                total_chars: 0,
                utilization_pct: 0.0,
                blocks: stats,
                drops,
            },
        };
        let total_chars = context.render().chars().count();
        context.total_chars = total_chars;
        context.metadata.total_chars = total_chars;
        context.metadata.utilization_pct = (total_chars as f32 / self.budget_chars.max(1) as f32) * 100.0;

        Ok(context)
    }
}
