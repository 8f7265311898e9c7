//! Legal knowledge base — the fixed principles appended to every context.
//!
//! The built-in base is compiled into the binary from
//! `resources/legal_kb.toml`. Operators may point `[knowledge_base] path` at
//! their own file with the same layout:
//!
//! ```toml
//! version = 1
//!
//! [[principles]]
//! id = "presumption-innocence"
//! title = "Presumption of Innocence"
//! text = "The accused is presumed innocent until proven guilty."
//! ```

use mocktrial_core::error::KnowledgeError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

const BUILTIN_KB: &str = include_str!("../resources/legal_kb.toml");

/// A named legal principle, cited as `kb:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principle {
    pub id: String,
    pub title: String,
    pub text: String,
}

impl Principle {
    pub fn citation_key(&self) -> String {
        format!("kb:{}", self.id)
    }

    /// `[kb:<id>] <title>: <text>`
    pub fn context_line(&self) -> String {
        format!("[{}] {}: {}", self.citation_key(), self.title, self.text)
    }
}

#[derive(Debug, Deserialize)]
struct KbFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    principles: Vec<Principle>,
}

fn default_version() -> u32 {
    1
}

/// Immutable, validated set of principles in resource order.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    version: u32,
    principles: Vec<Principle>,
}

impl KnowledgeBase {
    /// Parse the packaged knowledge base.
    pub fn builtin() -> Result<Self, KnowledgeError> {
        Self::from_toml_str(BUILTIN_KB)
    }

    /// Parse a knowledge base file from disk.
    pub fn load_from(path: &Path) -> Result<Self, KnowledgeError> {
        let content = std::fs::read_to_string(path).map_err(|e| KnowledgeError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let kb = Self::from_toml_str(&content)?;
        info!(path = %path.display(), principles = kb.len(), "Loaded knowledge base");
        Ok(kb)
    }

    /// Load from `path` when given, otherwise the built-in base.
    pub fn from_path_or_builtin(path: Option<&Path>) -> Result<Self, KnowledgeError> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::builtin(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, KnowledgeError> {
        let file: KbFile =
            toml::from_str(content).map_err(|e| KnowledgeError::Malformed(e.to_string()))?;
        Self::with_version(file.version, file.principles)
    }

    /// Build from in-memory principles (version 1).
    pub fn from_principles(principles: Vec<Principle>) -> Result<Self, KnowledgeError> {
        Self::with_version(1, principles)
    }

    fn with_version(version: u32, mut principles: Vec<Principle>) -> Result<Self, KnowledgeError> {
        if principles.is_empty() {
            return Err(KnowledgeError::Empty);
        }

        // Ids are stored as cited: `[kb:<id>]` never carries padding.
        for p in &mut principles {
            let trimmed = p.id.trim();
            if trimmed.len() != p.id.len() {
                p.id = trimmed.to_string();
            }
        }

        let mut seen = HashSet::new();
        for p in &principles {
            let id = p.id.as_str();
            if id.is_empty() {
                return Err(KnowledgeError::Malformed("principle with empty id".into()));
            }
            if id.contains(']') || id.chars().any(char::is_whitespace) {
                return Err(KnowledgeError::Malformed(format!(
                    "principle id '{id}' cannot be cited"
                )));
            }
            if !seen.insert(id) {
                return Err(KnowledgeError::DuplicateId(id.to_string()));
            }
        }

        Ok(Self {
            version,
            principles,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn principles(&self) -> &[Principle] {
        &self.principles
    }

    pub fn get(&self, id: &str) -> Option<&Principle> {
        self.principles.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.principles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principles.is_empty()
    }

    /// Every principle as a context line, newline-separated.
    pub fn render(&self) -> String {
        self.principles
            .iter()
            .map(Principle::context_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

static SHARED: OnceLock<Result<KnowledgeBase, String>> = OnceLock::new();

/// The built-in knowledge base, parsed on first use and kept for the process
/// lifetime.
pub fn shared() -> Result<&'static KnowledgeBase, KnowledgeError> {
    SHARED
        .get_or_init(|| KnowledgeBase::builtin().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| KnowledgeError::Malformed(e.clone()))
}
