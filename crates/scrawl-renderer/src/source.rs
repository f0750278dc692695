use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::error::SourceError;

/// Where `set_script_file` names are resolved.
pub trait ScriptSource: Send + Sync {
    fn read(&self, name: &str) -> Result<String, SourceError>;
}

// ─── Directory ────────────────────────────────────────────────────────────────

/// Scripts bundled as files under one directory. Names are relative paths
/// and may not leave the directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ScriptSource for DirSource {
    fn read(&self, name: &str) -> Result<String, SourceError> {
        let rel = Path::new(name);
        let contained = !name.is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !contained {
            return Err(SourceError::NotFound { name: name.into() });
        }
        std::fs::read_to_string(self.root.join(rel)).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound { name: name.into() },
            _ => SourceError::Io { name: name.into(), source: e },
        })
    }
}

// ─── In memory ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    scripts: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.scripts.insert(name.into(), text.into());
    }
}

impl ScriptSource for MemorySource {
    fn read(&self, name: &str) -> Result<String, SourceError> {
        self.scripts.get(name).cloned().ok_or_else(|| SourceError::NotFound { name: name.into() })
    }
}
