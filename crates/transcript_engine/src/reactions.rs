use engine_logging::engine_debug;
use transcript_core::{first_integer, normalize_text, Reaction};

use crate::document::{DocumentError, DocumentProvider, NodeRole};

/// Turns a reaction summary node into ordered reaction entries.
pub struct ReactionAggregator<'a, P: DocumentProvider> {
    doc: &'a P,
}

impl<'a, P: DocumentProvider> ReactionAggregator<'a, P> {
    pub fn new(doc: &'a P) -> Self {
        Self { doc }
    }

    /// One entry per reaction button, in document order.
    ///
    /// Every symbol variant of a button is kept, duplicates included. The count is the first
    /// integer in the button text, falling back to the variant count. Buttons without symbols
    /// are skipped. A summary with no buttons but some text yields a single described entry.
    pub fn aggregate(&self, summary: &P::Node) -> Result<Vec<Reaction>, DocumentError> {
        let buttons = self.doc.query_all(Some(summary), NodeRole::ReactionButton)?;
        if buttons.is_empty() {
            let text = normalize_text(&self.doc.text(summary)?);
            if text.is_empty() {
                return Ok(Vec::new());
            }
            return Ok(vec![Reaction::Described { text }]);
        }

        let mut reactions = Vec::with_capacity(buttons.len());
        for button in &buttons {
            let symbols: Vec<String> = self
                .doc
                .query_all(Some(button), NodeRole::ReactionSymbol)?
                .iter()
                .filter_map(|symbol| self.doc.attr(symbol, "alt"))
                .map(|alt| alt.trim().to_string())
                .filter(|alt| !alt.is_empty())
                .collect();
            let count = first_integer(&normalize_text(&self.doc.text(button)?));
            match Reaction::from_symbols(symbols, count) {
                Some(reaction) => reactions.push(reaction),
                None => engine_debug!("Reaction button without symbols skipped"),
            }
        }
        Ok(reactions)
    }
}
