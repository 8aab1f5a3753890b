//! Heuristic rule sets applied to loosely structured text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static TIME_OF_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+:\d+").expect("valid time-of-day pattern"));
static RELATIVE_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(yesterday|today|tomorrow)").expect("valid relative-day pattern")
});
static FIRST_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid integer pattern"));

/// One predicate an author candidate must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorRule {
    /// Contains a space or is longer than `min_len` characters.
    NameLike { min_len: usize },
    /// Does not start with `H:MM`.
    NotTimeOfDay,
    /// Does not start with Yesterday/Today/Tomorrow.
    NotRelativeDay,
    /// Contains no colon.
    NoColon,
}

impl AuthorRule {
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            AuthorRule::NameLike { min_len } => {
                text.contains(' ') || text.chars().count() > *min_len
            }
            AuthorRule::NotTimeOfDay => !TIME_OF_DAY.is_match(text),
            AuthorRule::NotRelativeDay => !RELATIVE_DAY.is_match(text),
            AuthorRule::NoColon => !text.contains(':'),
        }
    }
}

/// Ordered list of [`AuthorRule`]s; a candidate is an author when every rule accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AuthorRules(pub Vec<AuthorRule>);

impl Default for AuthorRules {
    fn default() -> Self {
        Self(vec![
            AuthorRule::NameLike { min_len: 3 },
            AuthorRule::NotTimeOfDay,
            AuthorRule::NotRelativeDay,
            AuthorRule::NoColon,
        ])
    }
}

impl AuthorRules {
    /// `text` must already be normalized. Empty text is never an author.
    pub fn accepts(&self, text: &str) -> bool {
        !text.is_empty() && self.0.iter().all(|rule| rule.accepts(text))
    }
}

/// Tokens that mark a message body as edited, in any supported language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct EditedMarkers(pub Vec<String>);

impl Default for EditedMarkers {
    fn default() -> Self {
        Self(vec!["edited".to_string(), "editado".to_string()])
    }
}

impl EditedMarkers {
    /// Case-insensitive substring match against any marker.
    pub fn matches(&self, body: &str) -> bool {
        let lowered = body.to_lowercase();
        self.0
            .iter()
            .filter(|marker| !marker.is_empty())
            .any(|marker| lowered.contains(&marker.to_lowercase()))
    }
}

/// First run of ASCII digits in `text`, if it fits in a `u32`.
pub fn first_integer(text: &str) -> Option<u32> {
    FIRST_INTEGER
        .find(text)
        .and_then(|found| found.as_str().parse().ok())
}
