use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use engine_logging::{engine_info, engine_warn};
use tokio_util::sync::CancellationToken;
use transcript_core::TerminalReason;
use transcript_engine::{
    decode_snapshot, export_filename, inspect_document, ExportOrchestrator, ExportResponse,
    HtmlDocument, LogProgressSink, RoleSelectors, TranscriptWriter,
};

use crate::config::ExportConfig;

/// Options of one `export` run.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub input: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub to_stdout: bool,
    pub json: bool,
    pub full_history: bool,
    pub no_header: bool,
    pub separator: bool,
}

pub fn run_export(request: &ExportRequest, mut config: ExportConfig) -> Result<()> {
    if request.no_header {
        config.export.transcript.include_header = false;
    }
    if request.separator {
        config.export.transcript.add_separator = true;
    }

    let doc = load_snapshot(&request.input, &config.selectors)?;
    let orchestrator = ExportOrchestrator::new(config.export.clone());
    let sink = LogProgressSink;

    let result = if request.full_history {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("Failed to start the async runtime")?;
        let cancel = CancellationToken::new();
        runtime.block_on(orchestrator.full_history_export(&doc, &sink, &cancel))
    } else {
        orchestrator.snapshot_export(&doc, &sink)
    };

    if request.json {
        let response = ExportResponse::from(&result);
        println!("{}", serde_json::to_string_pretty(&response)?);
        if let Err(err) = result {
            bail!(err);
        }
        return Ok(());
    }

    let report = result.context("Export failed")?;
    if report.terminal_reason == Some(TerminalReason::MaxIterationsExceeded) {
        engine_warn!("History may be incomplete: stopped at the iteration limit");
    }

    if request.to_stdout {
        println!("{}", report.artifact);
        return Ok(());
    }

    let dir = request
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let filename = export_filename(&config.filename_prefix, report.exported_at.naive_local());
    let path = TranscriptWriter::new(dir)
        .save(&filename, &report.artifact)
        .context("Failed to write transcript")?;
    engine_info!("{} messages from \"{}\"", report.message_count, report.title);
    println!("{}", path.display());
    Ok(())
}

pub fn run_inspect(input: &Path, config: &ExportConfig) -> Result<()> {
    let doc = load_snapshot(input, &config.selectors)?;
    let report = inspect_document(&doc, &config.export.extraction)
        .context("Failed to inspect document")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_snapshot(path: &Path, selectors: &RoleSelectors) -> Result<HtmlDocument> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let decoded =
        decode_snapshot(&bytes).with_context(|| format!("Failed to decode {}", path.display()))?;
    engine_info!(
        "Loaded {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        decoded.encoding_label
    );
    HtmlDocument::parse(&decoded.html, selectors).context("Invalid selector configuration")
}
