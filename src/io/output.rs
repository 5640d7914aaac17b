use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

/// Paths of every artifact produced for one base name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    /// User-chosen base name, e.g. `meta`
    pub base: String,
    /// Directory the artifacts are written to before collation
    pub root: PathBuf,
    pub resume_json: PathBuf,
    pub tex: PathBuf,
    pub pdf: PathBuf,
    pub docx: PathBuf,
    pub log: PathBuf,
}

impl ArtifactSet {
    /// Build the artifact paths for `base` under `root`.
    ///
    /// The base name is trimmed and must be usable as a single path component.
    pub fn new(root: &Path, base: &str) -> Result<Self> {
        let base = base.trim();
        if base.is_empty() {
            anyhow::bail!("Output base name must not be empty");
        }
        if base.contains(['/', '\\']) || base == "." || base == ".." {
            anyhow::bail!("Output base name must be a plain file name, got {:?}", base);
        }

        Ok(Self {
            base: base.to_string(),
            root: root.to_path_buf(),
            resume_json: root.join(format!("{base}_resume.json")),
            tex: root.join(format!("{base}.tex")),
            pdf: root.join(format!("{base}.pdf")),
            docx: root.join(format!("{base}.docx")),
            log: root.join(format!("{base}.log")),
        })
    }

    /// Files moved by the collator, in order
    pub fn collected_files(&self) -> [&Path; 5] {
        [
            self.resume_json.as_path(),
            self.tex.as_path(),
            self.pdf.as_path(),
            self.docx.as_path(),
            self.log.as_path(),
        ]
    }

    /// Directory the artifacts are collected into
    pub fn collation_dir(&self) -> PathBuf {
        self.root.join(&self.base)
    }
}

/// Write a value as pretty-printed JSON
pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

/// Write a text file
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write file: {:?}", path))
}
