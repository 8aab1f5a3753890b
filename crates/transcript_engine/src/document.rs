use std::fmt;

use serde::{Deserialize, Serialize};

/// Structural roles the exporter queries for. A provider maps each role onto
/// whatever its tree technology uses to find such nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    ConversationItem,
    ConversationTitle,
    Heading,
    AuthorLabel,
    TimeMarker,
    Body,
    Paragraph,
    Mention,
    AttachmentImage,
    ReactionSummary,
    ReactionButton,
    ReactionSymbol,
    ScrollViewport,
}

impl NodeRole {
    pub const ALL: [NodeRole; 13] = [
        NodeRole::ConversationItem,
        NodeRole::ConversationTitle,
        NodeRole::Heading,
        NodeRole::AuthorLabel,
        NodeRole::TimeMarker,
        NodeRole::Body,
        NodeRole::Paragraph,
        NodeRole::Mention,
        NodeRole::AttachmentImage,
        NodeRole::ReactionSummary,
        NodeRole::ReactionButton,
        NodeRole::ReactionSymbol,
        NodeRole::ScrollViewport,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Auto,
    Scroll,
}

impl Overflow {
    pub fn is_scrollable(self) -> bool {
        matches!(self, Overflow::Auto | Overflow::Scroll)
    }
}

/// Layout facts about one node, as far as the provider knows them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub overflow: Overflow,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Scrollable overflow and more content than fits.
    pub fn can_scroll(&self) -> bool {
        self.overflow.is_scrollable() && self.scroll_height > self.client_height
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("invalid selector for {role:?}: {message}")]
    InvalidSelector { role: NodeRole, message: String },
    #[error("node is no longer attached to the document")]
    Detached,
    #[error("operation not supported by this document: {0}")]
    Unsupported(&'static str),
}

/// The capability the exporter needs from a live or saved conversation view.
///
/// Scroll writes take `&self`; providers that track an offset use interior mutability.
pub trait DocumentProvider {
    type Node: Clone + fmt::Debug;

    /// All nodes with `role`, in document order, below `scope` (or anywhere).
    fn query_all(
        &self,
        scope: Option<&Self::Node>,
        role: NodeRole,
    ) -> Result<Vec<Self::Node>, DocumentError>;

    /// Text content of `node` and its descendants.
    fn text(&self, node: &Self::Node) -> Result<String, DocumentError>;

    /// Like [`text`](Self::text), but each descendant with role `marker` contributes
    /// `wrap(trimmed_text)` instead of its raw text.
    fn marked_text(
        &self,
        node: &Self::Node,
        marker: NodeRole,
        wrap: &dyn Fn(&str) -> String,
    ) -> Result<String, DocumentError>;

    fn attr(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn scroll_metrics(&self, node: &Self::Node) -> ScrollMetrics;

    fn scroll_offset(&self, container: &Self::Node) -> Result<f64, DocumentError>;

    fn set_scroll_offset(&self, container: &Self::Node, offset: f64) -> Result<(), DocumentError>;

    fn query_first(
        &self,
        scope: Option<&Self::Node>,
        role: NodeRole,
    ) -> Result<Option<Self::Node>, DocumentError> {
        Ok(self.query_all(scope, role)?.into_iter().next())
    }

    /// Number of loaded conversation items.
    fn item_count(&self) -> Result<usize, DocumentError> {
        Ok(self.query_all(None, NodeRole::ConversationItem)?.len())
    }
}
