//! Extract text from a local file with the same dispatch and post-processing
//! as the HTTP endpoint, without authentication or persistence.
//!
//! ```bash
//! studia-extract-file notes.docx
//! LLM_GATEWAY_API_KEY=sk-... studia-extract-file scan.pdf --json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use studia_core::text::preview;
use studia_core::{logging, ExtractionConfig, FileKind};
use studia_extract::{extract_and_process, ExtractionRegistry};
use studia_inference::OpenAIBackend;

#[derive(Parser, Debug)]
#[command(name = "studia-extract-file", version, about = "Extract plain text from a study material")]
struct Args {
    /// File to extract (.docx, .pdf, .png, .jpg, .jpeg, .webp)
    path: PathBuf,

    /// Declared MIME type; derived from the extension when omitted
    #[arg(long)]
    mime: Option<String>,

    /// Maximum characters kept before truncation
    #[arg(long)]
    max_chars: Option<usize>,

    /// Print a JSON summary instead of the text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init("studia_extract=info,studia_inference=info");
    let args = Args::parse();

    let mut config = ExtractionConfig::from_env();
    if let Some(max) = args.max_chars {
        config = config.with_max_content_chars(max);
    }

    let path_str = args.path.to_string_lossy().to_string();
    let kind = FileKind::detect(args.mime.as_deref(), &path_str);
    // Reject legacy and unsupported files before reading anything
    studia_extract::strategy_for(&kind)?;

    let data = tokio::fs::read(&args.path)
        .await
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let file_name = args
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path_str.clone());

    let ocr = Arc::new(OpenAIBackend::from_env()?);
    let registry = ExtractionRegistry::standard(ocr);
    let processed = extract_and_process(&registry, &config, &kind, &data, &file_name).await?;

    if args.json {
        let summary = serde_json::json!({
            "fileName": file_name,
            "fileKind": kind.label(),
            "strategy": processed.strategy.as_str(),
            "contentLength": processed.content.chars().count(),
            "truncated": processed.truncated,
            "preview": preview(&processed.content, config.preview_chars),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", processed.content);
    }

    Ok(())
}
