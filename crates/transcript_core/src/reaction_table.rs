use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::Reaction;

static DESCRIBED_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)\s+(?:reacci[oó]n|reaction)").expect("valid reaction count pattern")
});

/// Largest count rendered by repeating the symbol; bigger counts render as `👍×N`.
pub const MAX_REPEAT: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReactionKeyword {
    pub keyword: String,
    pub symbol: String,
}

/// Keyword to symbol lookup for reactions that only came with a text description.
///
/// Matching is a case-insensitive substring test in table order; the first hit wins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReactionTable {
    pub entries: Vec<ReactionKeyword>,
    pub default_symbol: String,
}

impl Default for ReactionTable {
    fn default() -> Self {
        const ENTRIES: &[(&str, &str)] = &[
            ("me gusta", "👍"),
            ("like", "👍"),
            ("love", "❤️"),
            ("corazón", "❤️"),
            ("amor", "❤️"),
            ("carcajada", "😂"),
            ("laugh", "😂"),
            ("sorpresa", "😮"),
            ("surprise", "😮"),
            ("wow", "😮"),
            ("triste", "😢"),
            ("sad", "😢"),
            ("enfadado", "😠"),
            ("angry", "😠"),
            ("celebrar", "🎉"),
            ("celebrate", "🎉"),
            ("party", "🎉"),
            ("aplaudir", "👏"),
            ("clap", "👏"),
        ];
        Self {
            entries: ENTRIES
                .iter()
                .map(|(keyword, symbol)| ReactionKeyword {
                    keyword: (*keyword).to_string(),
                    symbol: (*symbol).to_string(),
                })
                .collect(),
            default_symbol: "👍".to_string(),
        }
    }
}

impl ReactionTable {
    /// Adds a keyword after the existing ones.
    pub fn push(&mut self, keyword: impl Into<String>, symbol: impl Into<String>) {
        self.entries.push(ReactionKeyword {
            keyword: keyword.into(),
            symbol: symbol.into(),
        });
    }

    /// Turns a reaction description such as "2 reactions: Like" into symbols.
    pub fn resolve(&self, description: &str) -> String {
        let lowered = description.to_lowercase();
        let matched = self.entries.iter().find(|entry| {
            !entry.keyword.is_empty() && lowered.contains(&entry.keyword.to_lowercase())
        });

        if let Some(entry) = matched {
            return match DESCRIBED_COUNT.captures(&lowered) {
                Some(caps) => match caps[1].parse::<u64>() {
                    Ok(count) => repeat_symbol(&entry.symbol, count),
                    // Too many digits for u64; still far past the cap.
                    Err(_) => format!("{}×{}", entry.symbol, caps[1].trim_start_matches('0')),
                },
                None => entry.symbol.clone(),
            };
        }

        if let Some(pictograph) = description.chars().find(|ch| is_pictograph(*ch)) {
            return pictograph.to_string();
        }

        self.default_symbol.clone()
    }

    /// Display form of one reaction entry; empty when nothing can be shown.
    pub fn render(&self, reaction: &Reaction) -> String {
        match reaction {
            Reaction::Symbols { symbols, count } => symbols
                .first()
                .map(|symbol| repeat_symbol(symbol, u64::from((*count).max(1))))
                .unwrap_or_default(),
            Reaction::Described { text } => {
                if text.trim().is_empty() {
                    String::new()
                } else {
                    self.resolve(text)
                }
            }
        }
    }
}

fn repeat_symbol(symbol: &str, count: u64) -> String {
    if count <= MAX_REPEAT {
        symbol.repeat(count as usize)
    } else {
        format!("{symbol}×{count}")
    }
}

fn is_pictograph(ch: char) -> bool {
    ('\u{1F300}'..='\u{1F9FF}').contains(&ch)
}
