//! Whitespace collapsing and mention merging.

/// Separator between paragraphs inside [`MessageRecord::content`](crate::MessageRecord).
pub const PARAGRAPH_BREAK: &str = "\n\n";

/// Opens a marked mention token. Private-use code point, never present in real text.
pub const MENTION_OPEN: char = '\u{E000}';
/// Closes a marked mention token.
pub const MENTION_CLOSE: char = '\u{E001}';

/// Collapses every whitespace run (line breaks included) into one space and trims the ends.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Wraps a mention token in the sentinel pair understood by [`merge_mentions`].
pub fn mark_mention(token: &str) -> String {
    let mut out = String::with_capacity(token.len() + 6);
    out.push(MENTION_OPEN);
    out.push_str(token);
    out.push(MENTION_CLOSE);
    out
}

/// Collapses runs of marked tokens separated only by whitespace into one mention.
///
/// One token becomes `@Token`, several become `@<Token1 Token2>`. The output never
/// contains sentinels, so a second pass returns its input unchanged.
pub fn merge_mentions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(MENTION_OPEN) {
        push_plain(&mut out, &rest[..start]);
        let (tokens, consumed) = take_mention_run(&rest[start..]);
        match tokens.as_slice() {
            [] => {
                // Unterminated or empty marker: drop the sentinel, keep scanning.
                rest = &rest[start + MENTION_OPEN.len_utf8()..];
                continue;
            }
            [single] => {
                out.push('@');
                out.push_str(single);
            }
            many => {
                out.push_str("@<");
                out.push_str(&many.join(" "));
                out.push('>');
            }
        }
        rest = &rest[start + consumed..];
    }
    push_plain(&mut out, rest);
    out
}

/// Reads `OPEN tok CLOSE (ws+ OPEN tok CLOSE)*` from the start of `text`.
/// Returns the tokens and the byte length up to the last closing sentinel.
fn take_mention_run(text: &str) -> (Vec<&str>, usize) {
    let mut tokens = Vec::new();
    let mut consumed = 0;
    let mut offset = 0;

    loop {
        let cursor = &text[offset..];
        let Some(body) = cursor.strip_prefix(MENTION_OPEN) else {
            break;
        };
        let Some(end) = body.find(MENTION_CLOSE) else {
            break;
        };
        let token = &body[..end];
        if token.is_empty() || token.contains(MENTION_OPEN) {
            break;
        }
        tokens.push(token);

        let token_len = MENTION_OPEN.len_utf8() + end + MENTION_CLOSE.len_utf8();
        consumed = offset + token_len;

        let after = &cursor[token_len..];
        let trimmed = after.trim_start();
        if trimmed.len() == after.len() || !trimmed.starts_with(MENTION_OPEN) {
            break;
        }
        offset = consumed + (after.len() - trimmed.len());
    }

    (tokens, consumed)
}

fn push_plain(out: &mut String, text: &str) {
    out.extend(
        text.chars()
            .filter(|&ch| ch != MENTION_OPEN && ch != MENTION_CLOSE),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(tokens: &[&str]) -> String {
        tokens
            .iter()
            .map(|t| mark_mention(t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn normalize_collapses_runs_and_line_breaks() {
        assert_eq!(normalize_text("  hello \n\n  world\t!\r\n"), "hello world !");
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \n "), "");
    }

    #[test]
    fn adjacent_mentions_merge_into_full_name() {
        let text = format!("Hi {} please review", marked(&["John", "Smith", "Doe"]));
        assert_eq!(merge_mentions(&text), "Hi @<John Smith Doe> please review");
    }

    #[test]
    fn single_mention_gets_at_prefix() {
        let text = format!("thanks {}!", mark_mention("Alice"));
        assert_eq!(merge_mentions(&text), "thanks @Alice!");
    }

    #[test]
    fn mentions_separated_by_text_stay_separate() {
        let text = format!("{} and {}", mark_mention("Alice"), mark_mention("Bob"));
        assert_eq!(merge_mentions(&text), "@Alice and @Bob");
    }

    #[test]
    fn touching_mentions_without_whitespace_are_not_merged() {
        let text = format!("{}{}", mark_mention("Alice"), mark_mention("Bob"));
        assert_eq!(merge_mentions(&text), "@Alice@Bob");
    }

    #[test]
    fn merging_is_idempotent() {
        let text = format!("cc {} {}", mark_mention("Ada"), mark_mention("Lovelace"));
        let once = merge_mentions(&text);
        assert_eq!(once, "cc @<Ada Lovelace>");
        assert_eq!(merge_mentions(&once), once);
    }

    #[test]
    fn stray_sentinels_are_removed() {
        let text = format!("a{}b {}c", MENTION_CLOSE, MENTION_OPEN);
        assert_eq!(merge_mentions(&text), "ab c");
    }
}
