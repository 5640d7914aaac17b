use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::io::require_file;

/// Configuration for Stage 4
#[derive(Debug, Clone)]
pub struct CompileConfig {
    /// TeX engine executable
    pub engine: String,
    /// Engine runs; the second resolves cross-references
    pub passes: u32,
    /// Directory searched recursively for class files (e.g. `resume.cls`)
    pub class_dir: PathBuf,
    /// PDF → DOCX converter executable, invoked as `<converter> convert <pdf> <docx>`
    pub converter: String,
    /// Intermediate files removed after a successful compile; the `.log` is kept
    pub aux_extensions: Vec<String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            engine: "xelatex".to_string(),
            passes: 2,
            class_dir: PathBuf::from("data"),
            converter: "pdf2docx".to_string(),
            aux_extensions: [".aux", ".out", ".toc", ".synctex.gz"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

/// Outcome of Stage 4. Every field reflects what actually exists on disk.
#[derive(Debug, Default)]
pub struct CompileReport {
    /// Engine passes that exited successfully
    pub passes_completed: u32,
    pub pdf: Option<PathBuf>,
    pub docx: Option<PathBuf>,
    pub removed_aux: Vec<PathBuf>,
}

/// External tools from `config` that cannot be found on `PATH`
pub fn check_tools(config: &CompileConfig) -> Vec<String> {
    [&config.engine, &config.converter]
        .into_iter()
        .filter(|tool| which::which(tool.as_str()).is_err())
        .cloned()
        .collect()
}

/// `TEXINPUTS` with `<class_dir>//` prepended; the trailing separator keeps the engine defaults
pub fn texinputs_value(class_dir: &Path, existing: Option<OsString>) -> OsString {
    let separator = if cfg!(windows) { ";" } else { ":" };
    let mut value = class_dir.as_os_str().to_os_string();
    value.push("//");
    value.push(separator);
    if let Some(existing) = existing {
        value.push(existing);
    }
    value
}

/// Execute Stage 4: compile the `.tex` to PDF, then convert the PDF to DOCX
///
/// Best-effort: engine and converter failures are logged and reflected in the
/// report. Only a missing `.tex` file is an error.
pub fn execute_compile(tex_path: &Path, config: &CompileConfig) -> Result<CompileReport> {
    require_file(tex_path, "TeX file")?;

    let mut report = CompileReport::default();
    for tool in check_tools(config) {
        warn!("{} not found on PATH", tool);
    }

    let pdf = tex_path.with_extension("pdf");
    report.passes_completed = run_engine(tex_path, config)?;

    if pdf.is_file() {
        info!("PDF generated: {:?}", pdf);
        report.removed_aux = clean_auxiliary_files(tex_path, &config.aux_extensions);
        report.pdf = Some(pdf.clone());
    } else {
        warn!("PDF not found after compilation: {:?}", pdf);
    }

    let docx = tex_path.with_extension("docx");
    if convert_to_docx(&pdf, &docx, &config.converter) {
        report.docx = Some(docx);
    }

    Ok(report)
}

/// Run the engine up to `config.passes` times, stopping at the first failure
fn run_engine(tex_path: &Path, config: &CompileConfig) -> Result<u32> {
    let work_dir = match tex_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = tex_path
        .file_name()
        .with_context(|| format!("Invalid TeX path: {:?}", tex_path))?;
    let class_dir = std::path::absolute(&config.class_dir)
        .with_context(|| format!("Failed to resolve class directory: {:?}", config.class_dir))?;
    let texinputs = texinputs_value(&class_dir, std::env::var_os("TEXINPUTS"));

    let mut completed = 0;
    for pass in 1..=config.passes {
        info!("Pass {} of {}...", pass, config.engine);
        let output = Command::new(&config.engine)
            .arg("-interaction=nonstopmode")
            .arg(file_name)
            .current_dir(&work_dir)
            .env("TEXINPUTS", &texinputs)
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(out) if out.status.success() => completed += 1,
            Ok(out) => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                let lines: Vec<&str> = stdout.lines().collect();
                let tail = &lines[lines.len().saturating_sub(20)..];
                debug!("{} output tail:\n{}", config.engine, tail.join("\n"));
                warn!(
                    "{} exited with {}. Check your .tex file.",
                    config.engine, out.status
                );
                break;
            }
            Err(e) => {
                warn!("Failed to run {}: {}", config.engine, e);
                break;
            }
        }
    }

    Ok(completed)
}

/// Delete `<stem><ext>` for each extension; returns the files removed
fn clean_auxiliary_files(tex_path: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let stem = tex_path.with_extension("");
    let mut deleted = Vec::new();

    for ext in extensions {
        let mut name = stem.clone().into_os_string();
        name.push(ext);
        let path = PathBuf::from(name);
        if !path.exists() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => deleted.push(path),
            Err(e) => warn!("Could not delete {:?}: {}", path, e),
        }
    }

    if !deleted.is_empty() {
        info!("Deleted auxiliary files: {:?}", deleted);
    }
    deleted
}

/// Convert the PDF with the external converter; returns whether the DOCX exists afterwards
fn convert_to_docx(pdf: &Path, docx: &Path, converter: &str) -> bool {
    info!("Converting {:?} to {:?}...", pdf, docx);
    if !pdf.is_file() {
        warn!("PDF file {:?} not found, skipping DOCX conversion", pdf);
        return false;
    }

    match Command::new(converter)
        .arg("convert")
        .arg(pdf)
        .arg(docx)
        .stdin(Stdio::null())
        .output()
    {
        Ok(out) if !out.status.success() => {
            warn!(
                "{} exited with {}: {}",
                converter,
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(_) => {}
        Err(e) => warn!("Error during DOCX conversion: {}", e),
    }

    if docx.is_file() {
        info!("DOCX generated: {:?}", docx);
        true
    } else {
        warn!("DOCX not created");
        false
    }
}
