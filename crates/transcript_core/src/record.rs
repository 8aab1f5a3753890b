use serde::Serialize;
use uuid::Uuid;

/// When a message was posted, as recovered from the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Milliseconds since the Unix epoch, taken from a structured identifier.
    EpochMillis(i64),
    /// A date-time string from an attribute or the marker's own text.
    Explicit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
    pub kind: AttachmentKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reaction {
    /// Symbol variants of one reaction (skin tones, styles) and how many people used it.
    Symbols { symbols: Vec<String>, count: u32 },
    /// Free-text description of the reactions, resolved to a symbol at render time.
    Described { text: String },
}

impl Reaction {
    /// Builds a symbol entry. Returns `None` when there are no symbols.
    ///
    /// The count defaults to the number of variants and never drops below it.
    pub fn from_symbols(symbols: Vec<String>, explicit_count: Option<u32>) -> Option<Self> {
        if symbols.is_empty() {
            return None;
        }
        let variants = u32::try_from(symbols.len()).unwrap_or(u32::MAX);
        let count = explicit_count.unwrap_or(variants).max(variants);
        Some(Reaction::Symbols { symbols, count })
    }
}

/// One normalized conversation item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub id: Uuid,
    pub author: Option<String>,
    pub timestamp: Option<Timestamp>,
    pub subject: Option<String>,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub reactions: Vec<Reaction>,
    pub is_edited: bool,
    pub is_system_message: bool,
    pub sequence_index: usize,
    pub extraction_error: Option<String>,
}

impl MessageRecord {
    /// An empty record at `sequence_index` with a fresh id.
    pub fn new(sequence_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: None,
            timestamp: None,
            subject: None,
            content: String::new(),
            attachments: Vec::new(),
            reactions: Vec::new(),
            is_edited: false,
            is_system_message: true,
            sequence_index,
            extraction_error: None,
        }
    }

    /// Recomputes `is_system_message` from the author.
    pub fn refresh_system_flag(&mut self) {
        self.is_system_message = self.author.as_deref().map_or(true, str::is_empty);
    }

    /// Content split into paragraphs, skipping blank ones.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content
            .split(crate::PARAGRAPH_BREAK)
            .filter(|para| !para.trim().is_empty())
    }

    /// Compares everything except the generated id.
    pub fn same_content(&self, other: &Self) -> bool {
        Self {
            id: other.id,
            ..self.clone()
        } == *other
    }
}
