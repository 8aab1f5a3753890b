use std::collections::HashMap;

use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

use crate::document::{DocumentError, DocumentProvider, NodeRole, Overflow, ScrollMetrics};

/// CSS selector per [`NodeRole`]. Defaults match the Teams web client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoleSelectors {
    pub conversation_item: String,
    pub conversation_title: String,
    pub heading: String,
    pub author_label: String,
    pub time_marker: String,
    pub body: String,
    pub paragraph: String,
    pub mention: String,
    pub attachment_image: String,
    pub reaction_summary: String,
    pub reaction_button: String,
    pub reaction_symbol: String,
    pub scroll_viewport: String,
}

impl Default for RoleSelectors {
    fn default() -> Self {
        Self {
            conversation_item: r#"[data-tid="channel-replies-pane-message"]"#.to_string(),
            conversation_title: r#"h2[id^="subject-line"]"#.to_string(),
            heading: "h2".to_string(),
            author_label: "span.fui-StyledText".to_string(),
            time_marker: "time".to_string(),
            body: r#"[data-tid="message-body"]"#.to_string(),
            paragraph: "p".to_string(),
            mention: r#"[itemtype="http://schema.skype.com/Mention"]"#.to_string(),
            attachment_image: r#"img[role="button"]"#.to_string(),
            reaction_summary: r#"[data-tid="channel-message-reaction-summary"]"#.to_string(),
            reaction_button: r#"button[data-tid="diverse-reaction-pill-button"]"#.to_string(),
            reaction_symbol: "img[alt]".to_string(),
            scroll_viewport: r#"[data-tid="channel-replies-viewport"]"#.to_string(),
        }
    }
}

impl RoleSelectors {
    pub fn get(&self, role: NodeRole) -> &str {
        match role {
            NodeRole::ConversationItem => &self.conversation_item,
            NodeRole::ConversationTitle => &self.conversation_title,
            NodeRole::Heading => &self.heading,
            NodeRole::AuthorLabel => &self.author_label,
            NodeRole::TimeMarker => &self.time_marker,
            NodeRole::Body => &self.body,
            NodeRole::Paragraph => &self.paragraph,
            NodeRole::Mention => &self.mention,
            NodeRole::AttachmentImage => &self.attachment_image,
            NodeRole::ReactionSummary => &self.reaction_summary,
            NodeRole::ReactionButton => &self.reaction_button,
            NodeRole::ReactionSymbol => &self.reaction_symbol,
            NodeRole::ScrollViewport => &self.scroll_viewport,
        }
    }
}

/// A saved conversation page, queried with CSS selectors.
///
/// A snapshot has no layout and cannot load more history: its scroll offset is
/// always 0 and scroll writes are accepted and ignored.
pub struct HtmlDocument {
    html: Html,
    selectors: HashMap<NodeRole, Selector>,
}

impl HtmlDocument {
    pub fn parse(source: &str, roles: &RoleSelectors) -> Result<Self, DocumentError> {
        let mut selectors = HashMap::with_capacity(NodeRole::ALL.len());
        for role in NodeRole::ALL {
            let selector =
                Selector::parse(roles.get(role)).map_err(|err| DocumentError::InvalidSelector {
                    role,
                    message: err.to_string(),
                })?;
            selectors.insert(role, selector);
        }
        Ok(Self {
            html: Html::parse_document(source),
            selectors,
        })
    }

    fn selector(&self, role: NodeRole) -> Result<&Selector, DocumentError> {
        self.selectors
            .get(&role)
            .ok_or(DocumentError::Unsupported("role without selector"))
    }

    fn element(&self, id: NodeId) -> Result<ElementRef<'_>, DocumentError> {
        self.html
            .tree
            .get(id)
            .and_then(ElementRef::wrap)
            .ok_or(DocumentError::Detached)
    }
}

impl DocumentProvider for HtmlDocument {
    type Node = NodeId;

    fn query_all(
        &self,
        scope: Option<&NodeId>,
        role: NodeRole,
    ) -> Result<Vec<NodeId>, DocumentError> {
        let selector = self.selector(role)?;
        let ids = match scope {
            None => self.html.select(selector).map(|el| el.id()).collect(),
            Some(id) => self
                .element(*id)?
                .select(selector)
                .map(|el| el.id())
                .collect(),
        };
        Ok(ids)
    }

    fn text(&self, node: &NodeId) -> Result<String, DocumentError> {
        let element = self.element(*node)?;
        let mut out = String::new();
        collect_text(*element, None, &mut out);
        Ok(out)
    }

    fn marked_text(
        &self,
        node: &NodeId,
        marker: NodeRole,
        wrap: &dyn Fn(&str) -> String,
    ) -> Result<String, DocumentError> {
        let element = self.element(*node)?;
        let selector = self.selector(marker)?;
        let mut out = String::new();
        collect_text(*element, Some((selector, wrap)), &mut out);
        Ok(out)
    }

    fn attr(&self, node: &NodeId, name: &str) -> Option<String> {
        self.element(*node)
            .ok()?
            .value()
            .attr(name)
            .map(str::to_string)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.html
            .tree
            .get(*node)?
            .parent()
            .filter(|parent| parent.value().is_element())
            .map(|parent| parent.id())
    }

    fn scroll_metrics(&self, node: &NodeId) -> ScrollMetrics {
        let overflow = self
            .attr(node, "style")
            .map(|style| inline_overflow(&style))
            .unwrap_or_default();
        ScrollMetrics {
            overflow,
            ..ScrollMetrics::default()
        }
    }

    fn scroll_offset(&self, container: &NodeId) -> Result<f64, DocumentError> {
        self.element(*container)?;
        Ok(0.0)
    }

    fn set_scroll_offset(&self, container: &NodeId, _offset: f64) -> Result<(), DocumentError> {
        self.element(*container)?;
        Ok(())
    }
}

type Marker<'a> = (&'a Selector, &'a dyn Fn(&str) -> String);

fn collect_text(node: NodeRef<'_, Node>, marker: Option<Marker<'_>>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                if matches!(element.name(), "script" | "style" | "noscript") {
                    continue;
                }
                if let (Some((selector, wrap)), Some(child_el)) = (marker, ElementRef::wrap(child)) {
                    if selector.matches(&child_el) {
                        let raw: String = child_el.text().collect();
                        let token = raw.trim();
                        if !token.is_empty() {
                            out.push_str(&wrap(token));
                        }
                        continue;
                    }
                }
                collect_text(child, marker, out);
            }
            _ => {}
        }
    }
}

/// `overflow-y` wins over the `overflow` shorthand.
fn inline_overflow(style: &str) -> Overflow {
    let mut shorthand = None;
    let mut vertical = None;
    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let parsed = match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Overflow::Auto,
            "scroll" => Overflow::Scroll,
            "hidden" => Overflow::Hidden,
            _ => Overflow::Visible,
        };
        match property.trim().to_ascii_lowercase().as_str() {
            "overflow-y" => vertical = Some(parsed),
            "overflow" => shorthand = Some(parsed),
            _ => {}
        }
    }
    vertical.or(shorthand).unwrap_or_default()
}
