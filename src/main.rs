use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::time::Duration;

use invoice_pdf::cli::Args;
use invoice_pdf::compliance::{ComplianceEmbedder, HttpEmbedder, LocalEmbedder};
use invoice_pdf::config::Settings;
use invoice_pdf::model::DocumentData;
use invoice_pdf::{generate_document, DirectoryRasterizer};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    // Read document data
    let json = fs::read_to_string(&args.data)
        .with_context(|| format!("Failed to read data file: {}", args.data.display()))?;
    let data: DocumentData = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse data file: {}", args.data.display()))?;

    log::info!("Loaded document with {} line items", data.items.len());

    // Build settings from config file, CLI args and document appearance
    let settings = Settings::from_args(&args)
        .with_context(|| "Invalid configuration")?
        .with_document(&data);

    if !args.sections.is_dir() {
        anyhow::bail!("Sections directory not found: {}", args.sections.display());
    }
    let rasterizer = DirectoryRasterizer::new(&args.sections);

    let embedder: Box<dyn ComplianceEmbedder> = match settings.embed_url {
        Some(ref url) => Box::new(HttpEmbedder::new(
            url.clone(),
            Duration::from_secs(settings.embed_timeout_secs),
        )),
        None => Box::new(LocalEmbedder::new()),
    };

    let kind = args.document_kind();
    let document = generate_document(&data, kind, &rasterizer, &settings, Some(embedder.as_ref()))
        .with_context(|| format!("Failed to generate {} PDF", kind))?;

    for warning in &document.warnings {
        eprintln!("warning: {}", warning);
    }

    // Write output
    let output_path = args.output_path(&document.file_name);
    fs::write(&output_path, &document.bytes)
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

    println!(
        "Successfully wrote {} page(s) to {} ({})",
        document.page_count,
        output_path.display(),
        document.compliance
    );

    Ok(())
}
