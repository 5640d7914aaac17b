use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use resume_tailor::{
    execute_collate, execute_compile, execute_enhance_file, execute_normalize, execute_validate,
    render_file, AnthropicClient, AnthropicConfig, ArtifactSet, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "resume-tailor")]
#[command(author, version, about = "Tailor a YAML resume into LaTeX, PDF and DOCX", long_about = None)]
struct Cli {
    /// Base output name (e.g. meta); names every artifact and the output folder
    #[arg(short, long)]
    output: String,

    /// Pipeline configuration file
    #[arg(short, long, default_value = PipelineConfig::FILE_NAME)]
    config: PathBuf,

    /// Skip the LLM enhancement stage and render the resume as written
    #[arg(long)]
    skip_enhance: bool,

    /// Stop after generating the .tex file (no PDF/DOCX)
    #[arg(long)]
    skip_compile: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    run_pipeline(cli).await
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn run_pipeline(cli: Cli) -> Result<()> {
    let config = PipelineConfig::load(&cli.config)?;
    let root = std::env::current_dir().context("Failed to read the working directory")?;
    let artifacts = ArtifactSet::new(&root, &cli.output)?;

    // Stage 0: Validate the resume against the schema template
    info!("Stage 0: Validating resume YAML structure...");
    execute_validate(&config.resume_yaml, &config.template_yaml)?;

    // Stage 1: YAML -> normalized JSON
    info!("Stage 1: Converting YAML to JSON...");
    execute_normalize(&config.resume_yaml, &artifacts.resume_json)?;

    // Stage 2: Tailor to the job description
    if cli.skip_enhance {
        info!("Stage 2: Skipping enhancement (--skip-enhance)");
    } else {
        info!("Stage 2: Updating resume JSON with job description...");
        let mut api_config = AnthropicConfig::from_env()?;
        if let Some(model) = &config.model {
            api_config.model = model.clone();
        }
        let client = AnthropicClient::new(api_config);

        let result = execute_enhance_file(
            &client,
            &artifacts.resume_json,
            &config.job_description_file,
            &config.enhance_config(),
        )
        .await?;
        info!(
            "Stage 2: {} changes accepted after {} attempt(s)",
            result.changes.len(),
            result.attempts
        );
    }

    // Stage 3: Substitute into the LaTeX template
    info!("Stage 3: Generating LaTeX resume...");
    let render = render_file(&artifacts.resume_json, &config.latex_template, &artifacts.tex)?;
    info!(
        "Stage 3: {} regions updated, {} not in template",
        render.filled.len(),
        render.absent.len()
    );

    // Stage 4: Compile; failures here are warnings only
    if cli.skip_compile {
        info!("Stage 4: Skipping compilation (--skip-compile)");
    } else {
        info!("Stage 4: Converting LaTeX to PDF and DOCX...");
        match execute_compile(&artifacts.tex, &config.compile_config()) {
            Ok(report) => info!(
                "Stage 4: {} engine pass(es), pdf={}, docx={}",
                report.passes_completed,
                report.pdf.is_some(),
                report.docx.is_some()
            ),
            Err(e) => warn!("Stage 4: compilation failed: {:#}", e),
        }
    }

    // Stage 5: Collect artifacts into <base>/
    info!("Stage 5: Collecting output files...");
    let collation = execute_collate(&artifacts)?;

    info!(
        "Complete: {} files in {:?} ({} missing)",
        collation.moved.len(),
        collation.directory,
        collation.missing.len()
    );

    Ok(())
}
