//! Transcript core: IO-free data model, text normalization, rule sets, the
//! history pagination state machine and the transcript serializer.
mod normalize;
mod reaction_table;
mod record;
mod rules;
mod serialize;

pub mod pagination;

pub use normalize::{
    mark_mention, merge_mentions, normalize_text, MENTION_CLOSE, MENTION_OPEN, PARAGRAPH_BREAK,
};
pub use pagination::{
    advance, PaginationEffect, PaginationMsg, PaginationOutcome, PaginationPhase,
    PaginationSettings, PaginationState, TerminalReason,
};
pub use reaction_table::{ReactionKeyword, ReactionTable, MAX_REPEAT};
pub use record::{Attachment, AttachmentKind, MessageRecord, Reaction, Timestamp};
pub use rules::{first_integer, AuthorRule, AuthorRules, EditedMarkers};
pub use serialize::{
    format_timestamp, FormattingError, TranscriptOptions, TranscriptSerializer, FORMAT_NAME,
    RULE_WIDTH, TIMESTAMP_WIDTH, UNKNOWN_AUTHOR,
};
