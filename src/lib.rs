pub mod config;
pub mod io;
pub mod llm;
pub mod models;
pub mod stages;

pub use config::PipelineConfig;
pub use io::{ArtifactSet, read_yaml_file, write_json};
pub use llm::{AnthropicClient, AnthropicConfig};
pub use models::{RegionKind, Resume, TexTemplate};
pub use stages::{
    execute_collate, execute_compile, execute_enhance, execute_enhance_file, execute_normalize,
    execute_render, execute_validate, normalize, render_file, validate_structure, CompileConfig,
    EnhanceConfig, ValidationError,
};
