use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::io::ArtifactSet;

/// Result of Stage 5 collation
#[derive(Debug)]
pub struct CollationReport {
    /// The `<base>` directory
    pub directory: PathBuf,
    /// Whether the directory was created by this run
    pub created: bool,
    /// Destination paths of the moved artifacts
    pub moved: Vec<PathBuf>,
    /// Expected artifacts that did not exist
    pub missing: Vec<PathBuf>,
}

/// Execute Stage 5: move every produced artifact into the `<base>` directory
///
/// Missing artifacts are reported, never fatal.
pub fn execute_collate(artifacts: &ArtifactSet) -> Result<CollationReport> {
    let directory = artifacts.collation_dir();
    let created = if directory.is_dir() {
        info!("Folder {:?} already exists. Files will be moved into it.", directory);
        false
    } else {
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create directory: {:?}", directory))?;
        info!("Created folder: {:?}", directory);
        true
    };

    let mut moved = Vec::new();
    let mut missing = Vec::new();

    for source in artifacts.collected_files() {
        if !source.is_file() {
            warn!("File {:?} not found, cannot move", source);
            missing.push(source.to_path_buf());
            continue;
        }

        let Some(name) = source.file_name() else {
            continue;
        };
        let destination = directory.join(name);
        move_file(source, &destination)?;
        info!("Moved {:?} to {:?}", source, directory);
        moved.push(destination);
    }

    Ok(CollationReport {
        directory,
        created,
        moved,
        missing,
    })
}

/// Rename, falling back to copy-and-delete across filesystems
fn move_file(source: &Path, destination: &Path) -> Result<()> {
    if std::fs::rename(source, destination).is_ok() {
        return Ok(());
    }
    std::fs::copy(source, destination)
        .with_context(|| format!("Failed to copy {:?} to {:?}", source, destination))?;
    std::fs::remove_file(source).with_context(|| format!("Failed to remove {:?}", source))?;
    Ok(())
}
