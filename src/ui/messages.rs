use regex::Regex;
use std::sync::LazyLock;

/// Discord rejects messages longer than this.
pub const MESSAGE_LIMIT: usize = 2000;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?://[^\s<>]+)").expect("URL pattern compiles"));

/// Turns a reply into the message bodies to send.
pub fn prepare_reply(content: &str, disable_embeds: bool) -> Vec<String> {
    let content = if disable_embeds {
        suppress_embeds(content)
    } else {
        content.to_string()
    };
    split_message(&content, MESSAGE_LIMIT)
}

/// Wraps every URL in `<...>` so Discord does not unfurl it.
pub fn suppress_embeds(content: &str) -> String {
    URL_PATTERN.replace_all(content, "<$1>").into_owned()
}

/// Splits `content` into pieces of at most `limit` bytes, preferring line breaks.
pub fn split_message(content: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in content.split_inclusive('\n') {
        if !current.is_empty() && current.len() + line.len() > limit {
            chunks.push(std::mem::take(&mut current));
        }

        if line.len() <= limit {
            current.push_str(line);
            continue;
        }

        // Single line over the limit: cut on char boundaries.
        for c in line.chars() {
            if current.len() + c.len_utf8() > limit {
                chunks.push(std::mem::take(&mut current));
            }
            current.push(c);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
