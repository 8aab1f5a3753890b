use std::sync::Once;

use pretty_assertions::assert_eq;
use transcript_core::{Attachment, AttachmentKind, Reaction, Timestamp};
use transcript_engine::{
    inspect_document, DocumentError, DocumentProvider, ExtractionSettings, HtmlDocument,
    NodeRole, ReactionAggregator, RecordExtractor, RoleSelectors, ScrollMetrics,
};

const CONVERSATION: &str = include_str!("fixtures/conversation.html");

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn conversation() -> HtmlDocument {
    HtmlDocument::parse(CONVERSATION, &RoleSelectors::default()).expect("fixture parses")
}

type HtmlNode = <HtmlDocument as DocumentProvider>::Node;

/// A saved page whose listed nodes fail text reads as if they had been detached.
struct DetachingDocument {
    inner: HtmlDocument,
    detached: Vec<HtmlNode>,
}

impl DetachingDocument {
    fn check(&self, node: &HtmlNode) -> Result<(), DocumentError> {
        if self.detached.contains(node) {
            Err(DocumentError::Detached)
        } else {
            Ok(())
        }
    }
}

impl DocumentProvider for DetachingDocument {
    type Node = HtmlNode;

    fn query_all(
        &self,
        scope: Option<&HtmlNode>,
        role: NodeRole,
    ) -> Result<Vec<HtmlNode>, DocumentError> {
        self.inner.query_all(scope, role)
    }

    fn text(&self, node: &HtmlNode) -> Result<String, DocumentError> {
        self.check(node)?;
        self.inner.text(node)
    }

    fn marked_text(
        &self,
        node: &HtmlNode,
        marker: NodeRole,
        wrap: &dyn Fn(&str) -> String,
    ) -> Result<String, DocumentError> {
        self.check(node)?;
        self.inner.marked_text(node, marker, wrap)
    }

    fn attr(&self, node: &HtmlNode, name: &str) -> Option<String> {
        self.inner.attr(node, name)
    }

    fn parent(&self, node: &HtmlNode) -> Option<HtmlNode> {
        self.inner.parent(node)
    }

    fn scroll_metrics(&self, node: &HtmlNode) -> ScrollMetrics {
        self.inner.scroll_metrics(node)
    }

    fn scroll_offset(&self, container: &HtmlNode) -> Result<f64, DocumentError> {
        self.inner.scroll_offset(container)
    }

    fn set_scroll_offset(&self, container: &HtmlNode, offset: f64) -> Result<(), DocumentError> {
        self.inner.set_scroll_offset(container, offset)
    }
}

#[test]
fn extracts_every_item_in_document_order() {
    init_logging();
    let doc = conversation();
    let settings = ExtractionSettings::default();
    let records = RecordExtractor::new(&doc, &settings).extract_all().unwrap();

    assert_eq!(records.len(), 3);
    let indices: Vec<usize> = records.iter().map(|r| r.sequence_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert!(records.iter().all(|r| r.extraction_error.is_none()));
}

#[test]
fn first_item_has_merged_mentions_attachments_and_reactions() {
    init_logging();
    let doc = conversation();
    let settings = ExtractionSettings::default();
    let records = RecordExtractor::new(&doc, &settings).extract_all().unwrap();
    let first = &records[0];

    assert_eq!(first.author.as_deref(), Some("Ada Lovelace"));
    assert_eq!(first.timestamp, Some(Timestamp::EpochMillis(1_704_164_645_000)));
    assert_eq!(first.subject, None);
    assert_eq!(
        first.content,
        "Hello @<John Smith Doe>, welcome\n\nSecond paragraph spans lines"
    );
    assert!(!first.is_edited);
    assert!(!first.is_system_message);
    assert_eq!(
        first.attachments,
        vec![Attachment {
            name: "chart.png".to_string(),
            url: "https://files.example.com/chart.png".to_string(),
            kind: AttachmentKind::Image,
        }]
    );
    assert_eq!(
        first.reactions,
        vec![
            Reaction::Symbols {
                symbols: vec!["😀".to_string(), "😀-light".to_string()],
                count: 3,
            },
            Reaction::Symbols {
                symbols: vec!["❤️".to_string()],
                count: 1,
            },
        ]
    );
}

#[test]
fn unattributed_item_is_a_system_message_with_subject() {
    init_logging();
    let doc = conversation();
    let settings = ExtractionSettings::default();
    let records = RecordExtractor::new(&doc, &settings).extract_all().unwrap();
    let second = &records[1];

    assert_eq!(second.author, None);
    assert!(second.is_system_message);
    assert_eq!(second.subject.as_deref(), Some("Release notes"));
    assert_eq!(
        second.timestamp,
        Some(Timestamp::Explicit("2024-01-02T04:00:00Z".to_string()))
    );
    assert_eq!(second.content, "Shipped @Alice's build (Edited)");
    assert!(second.is_edited);
}

#[test]
fn author_rules_and_timestamp_fallbacks_apply() {
    init_logging();
    let doc = conversation();
    let settings = ExtractionSettings::default();
    let records = RecordExtractor::new(&doc, &settings).extract_all().unwrap();
    let third = &records[2];

    assert_eq!(third.author.as_deref(), Some("Grace Hopper"));
    assert_eq!(third.timestamp, Some(Timestamp::Explicit("Today".to_string())));
    assert_eq!(third.content, "Thanks!");
    assert_eq!(
        third.reactions,
        vec![Reaction::Described {
            text: "2 reactions: Like".to_string()
        }]
    );
}

#[test]
fn unreadable_field_is_isolated_to_its_item() {
    init_logging();
    let inner = conversation();
    let first_item = inner
        .query_first(None, NodeRole::ConversationItem)
        .unwrap()
        .unwrap();
    let detached = inner
        .query_all(Some(&first_item), NodeRole::AuthorLabel)
        .unwrap();
    assert_eq!(detached.len(), 2);
    let doc = DetachingDocument { inner, detached };
    let settings = ExtractionSettings::default();

    let records = RecordExtractor::new(&doc, &settings).extract_all().unwrap();

    assert_eq!(records.len(), 3);
    let first = &records[0];
    assert_eq!(
        first.extraction_error.as_deref(),
        Some("author: node is no longer attached to the document")
    );
    assert_eq!(first.author, None);
    assert_eq!(first.timestamp, Some(Timestamp::EpochMillis(1_704_164_645_000)));
    assert_eq!(
        first.content,
        "Hello @<John Smith Doe>, welcome\n\nSecond paragraph spans lines"
    );
    assert_eq!(first.attachments.len(), 1);
    assert_eq!(first.reactions.len(), 2);

    let healthy = RecordExtractor::new(&doc.inner, &settings)
        .extract_all()
        .unwrap();
    for (record, expected) in records.iter().zip(&healthy).skip(1) {
        assert!(record.same_content(expected));
    }
    assert_eq!(records[2].author.as_deref(), Some("Grace Hopper"));
    assert!(records[1..].iter().all(|r| r.extraction_error.is_none()));
}

#[test]
fn extracting_twice_gives_the_same_records() {
    init_logging();
    let doc = conversation();
    let settings = ExtractionSettings::default();
    let extractor = RecordExtractor::new(&doc, &settings);
    let first = extractor.extract_all().unwrap();
    let second = extractor.extract_all().unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_ne!(a.id, b.id);
        assert!(a.same_content(b));
    }
}

#[test]
fn thread_title_prefers_dedicated_node_then_long_heading() {
    init_logging();
    let settings = ExtractionSettings::default();

    let doc = conversation();
    assert_eq!(
        RecordExtractor::new(&doc, &settings).thread_title(),
        "Quarterly planning"
    );

    let headings = HtmlDocument::parse(
        "<h2>Hi</h2><h2>  Incident   review </h2>",
        &RoleSelectors::default(),
    )
    .unwrap();
    assert_eq!(
        RecordExtractor::new(&headings, &settings).thread_title(),
        "Incident review"
    );

    let empty = HtmlDocument::parse("<p>nothing</p>", &RoleSelectors::default()).unwrap();
    assert_eq!(
        RecordExtractor::new(&empty, &settings).thread_title(),
        "Untitled conversation"
    );
}

#[test]
fn empty_document_yields_no_records() {
    init_logging();
    let doc = HtmlDocument::parse("<html><body></body></html>", &RoleSelectors::default()).unwrap();
    let settings = ExtractionSettings::default();
    assert!(RecordExtractor::new(&doc, &settings)
        .extract_all()
        .unwrap()
        .is_empty());
}

#[test]
fn avatar_patterns_are_configurable() {
    init_logging();
    let doc = conversation();
    let settings = ExtractionSettings {
        avatar_patterns: vec!["files.example.com".to_string()],
        ..ExtractionSettings::default()
    };
    let records = RecordExtractor::new(&doc, &settings).extract_all().unwrap();
    let names: Vec<&str> = records[0]
        .attachments
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["Ada"]);
}

#[test]
fn reaction_count_defaults_to_variant_count() {
    init_logging();
    let html = r#"<div data-tid="channel-message-reaction-summary">
        <button data-tid="diverse-reaction-pill-button"><img alt="😀"><img alt="😀-light"></button>
    </div>"#;
    let doc = HtmlDocument::parse(html, &RoleSelectors::default()).unwrap();
    let summary = doc
        .query_first(None, NodeRole::ReactionSummary)
        .unwrap()
        .unwrap();

    assert_eq!(
        ReactionAggregator::new(&doc).aggregate(&summary).unwrap(),
        vec![Reaction::Symbols {
            symbols: vec!["😀".to_string(), "😀-light".to_string()],
            count: 2,
        }]
    );
}

#[test]
fn blank_reaction_summary_yields_nothing() {
    init_logging();
    let doc = HtmlDocument::parse(
        r#"<div data-tid="channel-message-reaction-summary">  </div>"#,
        &RoleSelectors::default(),
    )
    .unwrap();
    let summary = doc
        .query_first(None, NodeRole::ReactionSummary)
        .unwrap()
        .unwrap();
    assert!(ReactionAggregator::new(&doc)
        .aggregate(&summary)
        .unwrap()
        .is_empty());
}

#[test]
fn custom_selectors_drive_extraction() {
    init_logging();
    let html = r#"<ul><li class="msg"><b class="who">Linus Torvalds</b><div class="text">Patch applied</div></li></ul>"#;
    let selectors = RoleSelectors {
        conversation_item: "li.msg".to_string(),
        author_label: "b.who".to_string(),
        body: "div.text".to_string(),
        ..RoleSelectors::default()
    };
    let doc = HtmlDocument::parse(html, &selectors).unwrap();
    let settings = ExtractionSettings::default();
    let records = RecordExtractor::new(&doc, &settings).extract_all().unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].author.as_deref(), Some("Linus Torvalds"));
    assert_eq!(records[0].content, "Patch applied");
}

#[test]
fn inspection_reports_counts_and_samples() {
    init_logging();
    let doc = conversation();
    let report = inspect_document(&doc, &ExtractionSettings::default()).unwrap();

    assert_eq!(report.title, "Quarterly planning");
    assert_eq!(report.record_count, 3);
    assert_eq!(report.role_counts[&NodeRole::ConversationItem], 3);
    assert_eq!(report.role_counts[&NodeRole::ReactionButton], 3);
    assert_eq!(report.role_counts[&NodeRole::ScrollViewport], 1);
    assert_eq!(report.samples.len(), 3);
    assert_eq!(report.samples[0].attachment_count, 1);
    assert!(report.samples[0].has_reactions);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["role_counts"]["conversation_item"], 3);
    assert_eq!(json["samples"][1]["subject"], "Release notes");
}
