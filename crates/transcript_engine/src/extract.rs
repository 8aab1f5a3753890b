use engine_logging::{engine_debug, engine_error};
use serde::Deserialize;
use transcript_core::{
    mark_mention, merge_mentions, normalize_text, Attachment, AttachmentKind, AuthorRules,
    EditedMarkers, MessageRecord, Reaction, Timestamp, PARAGRAPH_BREAK,
};

use crate::document::{DocumentError, DocumentProvider, NodeRole};
use crate::reactions::ReactionAggregator;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Literal prefix of a time marker id that carries epoch milliseconds.
    pub timestamp_id_prefix: String,
    pub edited_markers: EditedMarkers,
    /// Image sources containing any of these are avatars, not attachments.
    pub avatar_patterns: Vec<String>,
    pub author_rules: AuthorRules,
    pub default_title: String,
    /// Fallback headings must be longer than this to count as a title.
    pub min_title_len: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            timestamp_id_prefix: "timestamp-".to_string(),
            edited_markers: EditedMarkers::default(),
            avatar_patterns: vec!["profilepicture".to_string(), "avatar".to_string()],
            author_rules: AuthorRules::default(),
            default_title: "Untitled conversation".to_string(),
            min_title_len: 5,
        }
    }
}

/// Builds [`MessageRecord`]s from conversation items.
pub struct RecordExtractor<'a, P: DocumentProvider> {
    doc: &'a P,
    settings: &'a ExtractionSettings,
}

impl<'a, P: DocumentProvider> RecordExtractor<'a, P> {
    pub fn new(doc: &'a P, settings: &'a ExtractionSettings) -> Self {
        Self { doc, settings }
    }

    /// Every loaded item in document order.
    pub fn extract_all(&self) -> Result<Vec<MessageRecord>, DocumentError> {
        let items = self.doc.query_all(None, NodeRole::ConversationItem)?;
        engine_debug!("Extracting {} conversation items", items.len());
        Ok(items
            .iter()
            .enumerate()
            .map(|(index, item)| self.extract(item, index))
            .collect())
    }

    /// Never fails: a field that cannot be read is left empty and the failure is
    /// recorded in `extraction_error`. The other fields are still filled.
    pub fn extract(&self, item: &P::Node, sequence_index: usize) -> MessageRecord {
        let mut record = MessageRecord::new(sequence_index);
        let mut failures = FieldFailures::default();

        record.author = failures.capture("author", self.author(item)).flatten();
        record.timestamp = failures.capture("timestamp", self.timestamp(item)).flatten();
        record.subject = failures.capture("subject", self.subject(item)).flatten();
        if let Some((content, is_edited)) = failures.capture("content", self.content(item)) {
            record.content = content;
            record.is_edited = is_edited;
        }
        record.attachments = failures
            .capture("attachments", self.attachments(item))
            .unwrap_or_default();
        record.reactions = failures
            .capture("reactions", self.reactions(item))
            .unwrap_or_default();
        record.refresh_system_flag();

        if let Some(message) = failures.into_message() {
            engine_error!("Item {} extracted partially: {}", sequence_index, message);
            record.extraction_error = Some(message);
        }
        record
    }

    /// Dedicated title node, then the first long enough heading, then the configured default.
    pub fn thread_title(&self) -> String {
        let dedicated = self
            .doc
            .query_first(None, NodeRole::ConversationTitle)
            .ok()
            .flatten()
            .and_then(|node| self.normalized(&node).ok())
            .filter(|text| !text.is_empty());
        if let Some(title) = dedicated {
            return title;
        }

        let headings = self
            .doc
            .query_all(None, NodeRole::Heading)
            .unwrap_or_default();
        headings
            .iter()
            .filter_map(|node| self.normalized(node).ok())
            .find(|text| text.chars().count() > self.settings.min_title_len)
            .unwrap_or_else(|| self.settings.default_title.clone())
    }

    fn normalized(&self, node: &P::Node) -> Result<String, DocumentError> {
        Ok(normalize_text(&self.doc.text(node)?))
    }

    fn author(&self, item: &P::Node) -> Result<Option<String>, DocumentError> {
        for label in self.doc.query_all(Some(item), NodeRole::AuthorLabel)? {
            let text = self.normalized(&label)?;
            if self.settings.author_rules.accepts(&text) {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }

    fn timestamp(&self, item: &P::Node) -> Result<Option<Timestamp>, DocumentError> {
        let Some(marker) = self.doc.query_first(Some(item), NodeRole::TimeMarker)? else {
            return Ok(None);
        };

        let from_id = self
            .doc
            .attr(&marker, "id")
            .and_then(|id| {
                id.strip_prefix(&self.settings.timestamp_id_prefix)
                    .and_then(|millis| millis.trim().parse::<i64>().ok())
            })
            .map(Timestamp::EpochMillis);
        if from_id.is_some() {
            return Ok(from_id);
        }

        if let Some(datetime) = self
            .doc
            .attr(&marker, "datetime")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
            return Ok(Some(Timestamp::Explicit(datetime)));
        }

        let text = self.normalized(&marker)?;
        Ok((!text.is_empty()).then_some(Timestamp::Explicit(text)))
    }

    fn subject(&self, item: &P::Node) -> Result<Option<String>, DocumentError> {
        match self.doc.query_first(Some(item), NodeRole::Heading)? {
            Some(heading) => {
                let text = self.normalized(&heading)?;
                Ok((!text.is_empty()).then_some(text))
            }
            None => Ok(None),
        }
    }

    /// Normalized content and the edited flag.
    fn content(&self, item: &P::Node) -> Result<(String, bool), DocumentError> {
        let Some(body) = self.doc.query_first(Some(item), NodeRole::Body)? else {
            return Ok((String::new(), false));
        };

        let wrap = |token: &str| mark_mention(token);
        let paragraphs = self.doc.query_all(Some(&body), NodeRole::Paragraph)?;
        let content = if paragraphs.is_empty() {
            merge_mentions(&normalize_text(&self.doc.marked_text(
                &body,
                NodeRole::Mention,
                &wrap,
            )?))
        } else {
            let mut parts = Vec::with_capacity(paragraphs.len());
            for paragraph in &paragraphs {
                let text = normalize_text(&self.doc.marked_text(
                    paragraph,
                    NodeRole::Mention,
                    &wrap,
                )?);
                if !text.is_empty() {
                    parts.push(merge_mentions(&text));
                }
            }
            parts.join(PARAGRAPH_BREAK)
        };

        let is_edited = self
            .settings
            .edited_markers
            .matches(&self.normalized(&body)?);
        Ok((content, is_edited))
    }

    fn attachments(&self, item: &P::Node) -> Result<Vec<Attachment>, DocumentError> {
        let images = self.doc.query_all(Some(item), NodeRole::AttachmentImage)?;
        Ok(images
            .iter()
            .filter_map(|image| {
                let url = self.doc.attr(image, "src").unwrap_or_default();
                if self.is_avatar(&url) {
                    return None;
                }
                let name = self
                    .doc
                    .attr(image, "alt")
                    .filter(|alt| !alt.trim().is_empty())
                    .unwrap_or_else(|| "image".to_string());
                Some(Attachment {
                    name,
                    url,
                    kind: AttachmentKind::Image,
                })
            })
            .collect())
    }

    fn is_avatar(&self, url: &str) -> bool {
        self.settings
            .avatar_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && url.contains(pattern.as_str()))
    }

    fn reactions(&self, item: &P::Node) -> Result<Vec<Reaction>, DocumentError> {
        match self.doc.query_first(Some(item), NodeRole::ReactionSummary)? {
            Some(summary) => ReactionAggregator::new(self.doc).aggregate(&summary),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Default)]
struct FieldFailures(Vec<String>);

impl FieldFailures {
    fn capture<T>(&mut self, field: &str, result: Result<T, DocumentError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.0.push(format!("{field}: {err}"));
                None
            }
        }
    }

    fn into_message(self) -> Option<String> {
        (!self.0.is_empty()).then(|| self.0.join("; "))
    }
}
