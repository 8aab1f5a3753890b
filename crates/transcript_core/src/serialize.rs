//! IRC-style transcript rendering with author and timestamp carry-forward.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use engine_logging::{engine_error, engine_warn};
use serde::Deserialize;

use crate::{MessageRecord, ReactionTable, Timestamp};

pub const RULE_WIDTH: usize = 80;
/// Width of a rendered timestamp, used to pad records that have none.
pub const TIMESTAMP_WIDTH: usize = 19;
pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const FORMAT_NAME: &str = "IRC (optimized for LLMs)";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const EDITED_SUFFIX: &str = "[EDITED]";
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TranscriptOptions {
    pub include_header: bool,
    /// Names the source system in the title line, e.g. "MS Teams".
    pub source_label: String,
    /// Blank line between record blocks.
    pub add_separator: bool,
    pub reaction_table: ReactionTable,
}

impl Default for TranscriptOptions {
    fn default() -> Self {
        Self {
            include_header: true,
            source_label: "MS Teams".to_string(),
            add_separator: false,
            reaction_table: ReactionTable::default(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormattingError {
    #[error("timestamp {0} ms is outside the representable range")]
    TimestampOutOfRange(i64),
}

/// Renders `timestamp` in `offset`.
///
/// `Ok(None)` means an explicit string that is not a recognizable date-time.
pub fn format_timestamp(
    timestamp: &Timestamp,
    offset: &FixedOffset,
) -> Result<Option<String>, FormattingError> {
    match timestamp {
        Timestamp::EpochMillis(millis) => format_millis(*millis, offset).map(Some),
        Timestamp::Explicit(raw) => {
            let raw = raw.trim();
            if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(millis) = raw.parse::<i64>() {
                    return format_millis(millis, offset).map(Some);
                }
            }
            if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
                return Ok(Some(
                    parsed.with_timezone(offset).format(TIMESTAMP_FORMAT).to_string(),
                ));
            }
            Ok(NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|naive| naive.format(TIMESTAMP_FORMAT).to_string()))
        }
    }
}

fn format_millis(millis: i64, offset: &FixedOffset) -> Result<String, FormattingError> {
    DateTime::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(offset).format(TIMESTAMP_FORMAT).to_string())
        .ok_or(FormattingError::TimestampOutOfRange(millis))
}

/// Forward state threaded through the record list.
struct CarryForward {
    author: String,
    timestamp: Option<String>,
}

/// Renders records into the final text artifact.
pub struct TranscriptSerializer<'a> {
    options: &'a TranscriptOptions,
    offset: FixedOffset,
}

impl<'a> TranscriptSerializer<'a> {
    /// `offset` is the zone epoch timestamps are displayed in.
    pub fn new(options: &'a TranscriptOptions, offset: FixedOffset) -> Self {
        Self { options, offset }
    }

    pub fn render(
        &self,
        records: &[MessageRecord],
        title: &str,
        exported_at: NaiveDateTime,
    ) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines: Vec<String> = Vec::new();

        if self.options.include_header {
            lines.push(rule.clone());
            lines.push(format!("{} - {}", self.options.source_label, title));
            lines.push(format!("Exported: {}", exported_at.format(TIMESTAMP_FORMAT)));
            lines.push(format!("Total messages: {}", records.len()));
            lines.push(format!("Format: {FORMAT_NAME}"));
            lines.push(rule.clone());
            lines.push(String::new());
        }

        let mut carry = CarryForward {
            author: UNKNOWN_AUTHOR.to_string(),
            timestamp: None,
        };
        let mut emitted_blocks = 0usize;

        for record in records {
            let block = match self.render_record(record, &mut carry) {
                Ok(block) => block,
                Err(err) => {
                    engine_error!("Error formatting message {}: {}", record.sequence_index, err);
                    vec![format!("[ERROR] Could not format message: {err}")]
                }
            };

            if block.is_empty() {
                engine_warn!(
                    "Message {} skipped - no content (author={:?}, timestamp={:?})",
                    record.sequence_index,
                    record.author,
                    record.timestamp
                );
                continue;
            }

            if self.options.add_separator && emitted_blocks > 0 {
                lines.push(String::new());
            }
            lines.extend(block);
            emitted_blocks += 1;
        }

        if self.options.include_header {
            lines.push(String::new());
            lines.push(rule.clone());
            lines.push("End of conversation".to_string());
            lines.push(rule);
        }

        lines.join("\n")
    }

    fn render_record(
        &self,
        record: &MessageRecord,
        carry: &mut CarryForward,
    ) -> Result<Vec<String>, FormattingError> {
        let author = match record.author.as_deref().map(str::trim) {
            Some(author) if !author.is_empty() => {
                carry.author = author.to_string();
                author.to_string()
            }
            _ => carry.author.clone(),
        };

        let own_timestamp = match &record.timestamp {
            Some(timestamp) => {
                let formatted = format_timestamp(timestamp, &self.offset)?;
                if formatted.is_none() {
                    engine_warn!(
                        "Could not parse timestamp {:?} of message {}",
                        timestamp,
                        record.sequence_index
                    );
                }
                formatted
            }
            None => None,
        };
        let display_timestamp = match own_timestamp {
            Some(formatted) => {
                carry.timestamp = Some(formatted.clone());
                formatted
            }
            None => carry
                .timestamp
                .clone()
                .unwrap_or_else(|| " ".repeat(TIMESTAMP_WIDTH)),
        };
        let prefix = format!("[{display_timestamp}]");

        let mut lines = Vec::new();

        if let Some(subject) = record.subject.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("{prefix} === {subject} ==="));
        }

        let content_start = lines.len();
        for (idx, paragraph) in record.paragraphs().enumerate() {
            if idx == 0 {
                lines.push(format!("{prefix} <{author}> {paragraph}"));
            } else {
                lines.push(format!("{prefix}   {paragraph}"));
            }
        }
        let has_content = lines.len() > content_start;
        if record.is_edited && has_content && !record.content.contains(EDITED_SUFFIX) {
            if let Some(last) = lines.last_mut() {
                last.push(' ');
                last.push_str(EDITED_SUFFIX);
            }
        }

        let attachment_author = if author.is_empty() { "SYSTEM" } else { author.as_str() };
        for attachment in &record.attachments {
            lines.push(format!(
                "{prefix} <{attachment_author}> [ATTACHMENT: {}]",
                attachment.name
            ));
        }

        let symbols = record
            .reactions
            .iter()
            .map(|reaction| self.options.reaction_table.render(reaction))
            .filter(|rendered| !rendered.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !symbols.is_empty() {
            lines.push(format!("{prefix} {symbols}"));
        }

        Ok(lines)
    }
}
