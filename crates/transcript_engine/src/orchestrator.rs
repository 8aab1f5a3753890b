use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local};
use engine_logging::{engine_error, engine_info};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use transcript_core::{
    PaginationSettings, TerminalReason, TranscriptOptions, TranscriptSerializer,
};

use crate::document::DocumentProvider;
use crate::extract::{ExtractionSettings, RecordExtractor};
use crate::progress::ProgressSink;
use crate::scroll::PaginationController;
use crate::types::{ExportError, ExportEvent, ExportReport};

/// Source of the export instant. Its offset is also the display time zone.
pub type Clock = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub pagination: PaginationSettings,
    pub extraction: ExtractionSettings,
    pub transcript: TranscriptOptions,
    /// Wait after history loading before extracting.
    pub final_settle_ms: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            pagination: PaginationSettings::default(),
            extraction: ExtractionSettings::default(),
            transcript: TranscriptOptions::default(),
            final_settle_ms: 1500,
        }
    }
}

/// Held for the duration of one export; releases the orchestrator when dropped.
pub struct ExportPermit<'a> {
    busy: &'a AtomicBool,
}

impl Drop for ExportPermit<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Composes history loading, extraction and rendering. Runs one export at a time.
pub struct ExportOrchestrator {
    settings: ExportSettings,
    clock: Clock,
    busy: AtomicBool,
}

impl ExportOrchestrator {
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            settings,
            clock: Arc::new(|| Local::now().fixed_offset()),
            busy: AtomicBool::new(false),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Fails with [`ExportError::Busy`] instead of waiting when an export is running.
    pub fn try_acquire(&self) -> Result<ExportPermit<'_>, ExportError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ExportPermit { busy: &self.busy })
            .map_err(|_| ExportError::Busy)
    }

    /// Exports whatever is currently loaded.
    pub fn snapshot_export<P: DocumentProvider>(
        &self,
        doc: &P,
        sink: &dyn ProgressSink,
    ) -> Result<ExportReport, ExportError> {
        let result = self
            .try_acquire()
            .and_then(|permit| self.extract_and_render(&permit, doc, sink, 0, None));
        report_failure(&result, sink);
        result
    }

    /// Loads the whole history first, then exports it.
    pub async fn full_history_export<P: DocumentProvider>(
        &self,
        doc: &P,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<ExportReport, ExportError> {
        let result = match self.try_acquire() {
            Ok(permit) => self.load_and_export(&permit, doc, sink, cancel).await,
            Err(err) => Err(err),
        };
        report_failure(&result, sink);
        result
    }

    async fn load_and_export<P: DocumentProvider>(
        &self,
        permit: &ExportPermit<'_>,
        doc: &P,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<ExportReport, ExportError> {
        engine_info!("Starting full history export");
        let outcome = PaginationController::new(doc, &self.settings.pagination)
            .load_full_history(sink, cancel)
            .await?;

        sink.emit(ExportEvent::Waiting);
        tokio::time::sleep(Duration::from_millis(self.settings.final_settle_ms)).await;

        self.extract_and_render(
            permit,
            doc,
            sink,
            outcome.iterations,
            Some(outcome.reason),
        )
    }

    fn extract_and_render<P: DocumentProvider>(
        &self,
        _permit: &ExportPermit<'_>,
        doc: &P,
        sink: &dyn ProgressSink,
        iteration_count: u32,
        terminal_reason: Option<TerminalReason>,
    ) -> Result<ExportReport, ExportError> {
        sink.emit(ExportEvent::Extracting);
        let extractor = RecordExtractor::new(doc, &self.settings.extraction);
        let title = extractor.thread_title();
        let records = extractor.extract_all()?;
        if records.is_empty() {
            return Err(ExportError::NoMessagesFound);
        }

        sink.emit(ExportEvent::Formatting);
        let exported_at = (self.clock)();
        let artifact = TranscriptSerializer::new(&self.settings.transcript, *exported_at.offset())
            .render(&records, &title, exported_at.naive_local());

        let message_count = records.len();
        engine_info!("Exported {} messages from \"{}\"", message_count, title);
        sink.emit(ExportEvent::Complete { message_count });
        Ok(ExportReport {
            title,
            artifact,
            message_count,
            iteration_count,
            terminal_reason,
            exported_at,
        })
    }
}

fn report_failure(result: &Result<ExportReport, ExportError>, sink: &dyn ProgressSink) {
    if let Err(err) = result {
        engine_error!("Export failed: {}", err);
        sink.emit(ExportEvent::Error {
            message: err.to_string(),
        });
    }
}
