use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use transcript_core::TerminalReason;

use crate::document::DocumentError;

/// Stage notifications emitted while an export runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ExportEvent {
    Locating,
    Counting {
        item_count: usize,
    },
    Scrolling {
        iteration: u32,
        offset: f64,
        item_count: usize,
    },
    Waiting,
    Extracting,
    Formatting,
    Complete {
        message_count: usize,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ExportError {
    #[error("an export is already in progress")]
    Busy,
    #[error("scrollable conversation container not found")]
    ContainerNotFound,
    #[error("no messages found")]
    NoMessagesFound,
    #[error("export cancelled after loading {loaded_items} items")]
    Cancelled { loaded_items: usize },
    #[error("history load stalled after {iterations} iterations ({loaded_items} items)")]
    Stalled { iterations: u32, loaded_items: usize },
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// A finished export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub title: String,
    pub artifact: String,
    pub message_count: usize,
    /// Pagination ticks run; 0 for a snapshot export.
    pub iteration_count: u32,
    /// How history loading ended; `None` for a snapshot export.
    pub terminal_reason: Option<TerminalReason>,
    pub exported_at: DateTime<FixedOffset>,
}

/// Result envelope handed back to the calling shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&Result<ExportReport, ExportError>> for ExportResponse {
    fn from(result: &Result<ExportReport, ExportError>) -> Self {
        match result {
            Ok(report) => Self {
                success: true,
                artifact_text: Some(report.artifact.clone()),
                message_count: Some(report.message_count),
                iteration_count: Some(report.iteration_count),
                error_message: None,
            },
            Err(err) => Self {
                success: false,
                artifact_text: None,
                message_count: None,
                iteration_count: None,
                error_message: Some(err.to_string()),
            },
        }
    }
}
