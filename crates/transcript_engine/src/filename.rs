use chrono::NaiveDateTime;

pub const DEFAULT_EXPORT_PREFIX: &str = "teams-export";
const MAX_PREFIX_LEN: usize = 60;

/// `{prefix}-YYYY-MM-DDTHH-MM-SS.txt`, safe to create on Windows.
pub fn export_filename(prefix: &str, instant: NaiveDateTime) -> String {
    format!(
        "{}-{}.txt",
        sanitize_prefix(prefix),
        instant.format("%Y-%m-%dT%H-%M-%S")
    )
}

fn sanitize_prefix(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) || c.is_whitespace() {
            '_'
        } else {
            c
        };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let mut cleaned: String = compacted
        .trim_matches(&['_', '-', '.'][..])
        .chars()
        .take(MAX_PREFIX_LEN)
        .collect();
    if cleaned.is_empty() {
        cleaned = DEFAULT_EXPORT_PREFIX.to_string();
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
