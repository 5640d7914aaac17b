use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::stages::{CompileConfig, EnhanceConfig};

/// Pipeline configuration, read from `config.yml` in the working directory.
/// Every key is optional; paths default to files under `data/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Source resume
    pub resume_yaml: PathBuf,
    /// Job description text handed to the enhancer
    pub job_description_file: PathBuf,
    /// LaTeX template with the substitutable regions
    pub latex_template: PathBuf,
    /// Schema the resume is validated against
    pub template_yaml: PathBuf,
    /// Directory holding LaTeX class files
    pub class_dir: PathBuf,
    pub latex_engine: String,
    pub docx_converter: String,
    /// Overrides the enhancer's default model
    pub model: Option<String>,
    pub max_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let data = Path::new("data");
        let compile = CompileConfig::default();
        Self {
            resume_yaml: data.join("resume.yaml"),
            job_description_file: data.join("job_description.txt"),
            latex_template: data.join("resume.tex"),
            template_yaml: data.join("template.yaml"),
            class_dir: compile.class_dir,
            latex_engine: compile.engine,
            docx_converter: compile.converter,
            model: None,
            max_retries: EnhanceConfig::default().max_retries,
        }
    }
}

impl PipelineConfig {
    pub const FILE_NAME: &'static str = "config.yml";

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).context("Failed to parse config YAML")
    }

    pub fn compile_config(&self) -> CompileConfig {
        CompileConfig {
            engine: self.latex_engine.clone(),
            class_dir: self.class_dir.clone(),
            converter: self.docx_converter.clone(),
            ..Default::default()
        }
    }

    pub fn enhance_config(&self) -> EnhanceConfig {
        EnhanceConfig {
            max_retries: self.max_retries,
            ..Default::default()
        }
    }
}
