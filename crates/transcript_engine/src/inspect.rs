use std::collections::BTreeMap;

use serde::Serialize;
use transcript_core::{MessageRecord, Timestamp};

use crate::document::{DocumentError, DocumentProvider, NodeRole};
use crate::extract::{ExtractionSettings, RecordExtractor};

const SAMPLE_COUNT: usize = 3;
const PREVIEW_CHARS: usize = 100;

/// What the exporter can see in a document, without producing a transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub title: String,
    pub role_counts: BTreeMap<NodeRole, usize>,
    pub record_count: usize,
    pub samples: Vec<RecordSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSample {
    pub index: usize,
    pub author: Option<String>,
    pub timestamp: Option<Timestamp>,
    pub subject: Option<String>,
    pub preview: String,
    pub attachment_count: usize,
    pub has_reactions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
}

impl From<&MessageRecord> for RecordSample {
    fn from(record: &MessageRecord) -> Self {
        Self {
            index: record.sequence_index,
            author: record.author.clone(),
            timestamp: record.timestamp.clone(),
            subject: record.subject.clone(),
            preview: record.content.chars().take(PREVIEW_CHARS).collect(),
            attachment_count: record.attachments.len(),
            has_reactions: !record.reactions.is_empty(),
            extraction_error: record.extraction_error.clone(),
        }
    }
}

pub fn inspect_document<P: DocumentProvider>(
    doc: &P,
    settings: &ExtractionSettings,
) -> Result<DocumentReport, DocumentError> {
    let mut role_counts = BTreeMap::new();
    for role in NodeRole::ALL {
        role_counts.insert(role, doc.query_all(None, role)?.len());
    }

    let extractor = RecordExtractor::new(doc, settings);
    let records = extractor.extract_all()?;
    Ok(DocumentReport {
        title: extractor.thread_title(),
        role_counts,
        record_count: records.len(),
        samples: records.iter().take(SAMPLE_COUNT).map(RecordSample::from).collect(),
    })
}
