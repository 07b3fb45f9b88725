//! Analyze one document from the command line and print the record as JSON.

use std::path::PathBuf;

use anyhow::Result;
use api::{AppConfig, AppContext, analyze_path, logging};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "analyze", about = "Split, tag and summarize a .pdf or .docx document")]
struct Args {
    /// Path to file (.pdf/.docx)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Also write analysis_<file>.json into this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let Some(file) = args.file else {
        println!("Usage: --file <path>");
        return Ok(());
    };

    let config = AppConfig::from_env();
    logging::init_tracing(config.log_format);

    // Reject unsupported files before contacting the model runtime.
    ingest::DocumentFormat::from_path(&file)?;

    let ctx = AppContext::from_config(&config).await;
    let record = analyze_path(&ctx.workflow, &file).await?;

    if let Some(dir) = args.output_dir {
        let path = record.save(&dir).await?;
        tracing::info!(path = ?path, "Analysis record saved");
    }

    println!("{}", record.to_json()?);

    Ok(())
}
