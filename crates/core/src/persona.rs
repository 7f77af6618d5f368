//! Persona: the identity block placed first in every assembled context.
//!
//! Loading follows a layered order (later sections append):
//!
//! 1. **Identity**: `IDENTITY.md` (who the assistant is)
//! 2. **Soul**: `SOUL.md` (tone, speech style, temperament)
//! 3. **User**: `USER.md` (profile of the person being accompanied)
//! 4. **Rules**: `RULES.md` (relationship and memory-usage rules)
//! 5. **Context directory**: `context/*.md|*.txt`, sorted by name
//! 6. **Extra files**: any additional files named in config
//!
//! Each file is optional. Missing files are silently skipped. When nothing
//! is found, a built-in fallback prompt is used so the persona block is
//! never empty.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Well-known persona file names.
pub const IDENTITY_FILE: &str = "IDENTITY.md";
pub const SOUL_FILE: &str = "SOUL.md";
pub const USER_FILE: &str = "USER.md";
pub const RULES_FILE: &str = "RULES.md";

/// The assistant's persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// The assistant's name
    pub name: String,

    /// Identity text, included verbatim in every context
    pub system_prompt: String,

    /// Which files were loaded (for diagnostics)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loaded_files: Vec<String>,
}

/// Where to look for persona files.
#[derive(Debug, Clone, Default)]
pub struct PersonaPaths {
    /// Persona directory (e.g., ~/.hearth/persona/)
    pub dir: Option<PathBuf>,

    /// Additional files to load (absolute paths)
    pub extra_files: Vec<PathBuf>,

    /// Use this text verbatim and skip all file loading
    pub system_prompt_override: Option<String>,
}

#[derive(Debug, Clone)]
struct PersonaSection {
    source: String,
    heading: String,
    content: String,
}

impl Persona {
    /// A persona built from the fallback prompt.
    pub fn fallback() -> Self {
        Self {
            name: "Hearth".into(),
            system_prompt: Self::fallback_system_prompt(),
            loaded_files: vec![],
        }
    }

    /// A persona with the given prompt text and no files.
    pub fn from_prompt(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: prompt.into(),
            loaded_files: vec![],
        }
    }

    fn fallback_system_prompt() -> String {
        concat!(
            "You are Hearth, a long-time companion and creative partner. ",
            "Speak casually and warmly, in two to four sentences. ",
            "Use what you remember about the user when it helps, without dwelling on it.",
        )
        .into()
    }

    /// Load the persona from files following the layered order.
    pub fn load(paths: &PersonaPaths) -> Self {
        if let Some(override_prompt) = &paths.system_prompt_override {
            debug!("Using persona override, skipping file loading");
            return Self {
                system_prompt: override_prompt.clone(),
                loaded_files: vec!["<override>".into()],
                ..Self::fallback()
            };
        }

        let mut sections: Vec<PersonaSection> = Vec::new();

        if let Some(dir) = &paths.dir {
            Self::try_load_section(dir, IDENTITY_FILE, "Identity", &mut sections);
            Self::try_load_section(dir, SOUL_FILE, "Soul", &mut sections);
            Self::try_load_section(dir, USER_FILE, "User Profile", &mut sections);
            Self::try_load_section(dir, RULES_FILE, "Rules", &mut sections);

            let context_subdir = dir.join("context");
            if context_subdir.is_dir() {
                Self::load_context_directory(&context_subdir, &mut sections);
            }
        }

        for extra_path in &paths.extra_files {
            if let Some(content) = Self::read_nonempty(extra_path) {
                let filename = extra_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("extra");
                sections.push(PersonaSection {
                    source: extra_path.display().to_string(),
                    heading: format!("Additional Context ({})", filename),
                    content,
                });
            }
        }

        if sections.is_empty() {
            debug!("No persona files found, using fallback prompt");
            return Self::fallback();
        }

        let name = sections
            .iter()
            .find(|s| s.source.ends_with(IDENTITY_FILE))
            .and_then(|s| Self::extract_name(&s.content))
            .unwrap_or_else(|| "Hearth".into());

        let system_prompt = Self::assemble_prompt(&sections);
        let loaded_files: Vec<String> = sections.iter().map(|s| s.source.clone()).collect();

        debug!(
            files_loaded = loaded_files.len(),
            prompt_chars = system_prompt.chars().count(),
            "Persona loaded"
        );

        Self {
            name,
            system_prompt,
            loaded_files,
        }
    }

    fn try_load_section(dir: &Path, filename: &str, heading: &str, sections: &mut Vec<PersonaSection>) {
        let path = dir.join(filename);
        if let Some(content) = Self::read_nonempty(&path) {
            debug!(file = %path.display(), "Loaded persona file");
            sections.push(PersonaSection {
                source: path.display().to_string(),
                heading: heading.to_string(),
                content,
            });
        }
    }

    fn load_context_directory(dir: &Path, sections: &mut Vec<PersonaSection>) {
        let mut entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
            Ok(rd) => rd
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext == "md" || ext == "txt")
                })
                .collect(),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to read persona context directory");
                return;
            }
        };

        entries.sort();

        for path in entries {
            if let Some(content) = Self::read_nonempty(&path) {
                let stem = path
                    .file_stem()
                    .and_then(|n| n.to_str())
                    .unwrap_or("context");
                sections.push(PersonaSection {
                    source: path.display().to_string(),
                    heading: format!("Context: {}", stem),
                    content,
                });
            }
        }
    }

    fn read_nonempty(path: &Path) -> Option<String> {
        std::fs::read_to_string(path)
            .ok()
            .filter(|content| !content.trim().is_empty())
    }

    /// Wrap each section in an XML-style tag derived from its heading.
    fn assemble_prompt(sections: &[PersonaSection]) -> String {
        let mut prompt = String::with_capacity(4096);

        for (i, section) in sections.iter().enumerate() {
            if i > 0 {
                prompt.push('\n');
            }

            let tag: String = section
                .heading
                .to_lowercase()
                .chars()
                .filter_map(|c| match c {
                    ' ' => Some('_'),
                    ':' | '(' | ')' => None,
                    other => Some(other),
                })
                .collect();

            prompt.push_str(&format!("<{}>\n", tag));
            prompt.push_str(section.content.trim());
            prompt.push_str(&format!("\n</{}>\n", tag));
        }

        prompt.trim_end().to_string()
    }

    /// Pull a name out of IDENTITY.md: "You are <Name>" or the first H1.
    fn extract_name(content: &str) -> Option<String> {
        if let Some(pos) = content.find("You are ") {
            let rest = &content[pos + "You are ".len()..];
            let name: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
                .collect();
            let name = name.trim().to_string();
            if !name.is_empty() && name.chars().count() < 50 {
                return Some(name);
            }
        }

        for line in content.lines() {
            if let Some(heading) = line.trim().strip_prefix("# ") {
                let heading = heading.trim();
                if heading != "Identity" && !heading.is_empty() {
                    return Some(heading.to_string());
                }
            }
        }

        None
    }

    /// Length of the persona block body in characters.
    pub fn char_len(&self) -> usize {
        self.system_prompt.chars().count()
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::fallback()
    }
}
