//! Parser for the HTTP `Link` header (RFC 8288).
//!
//! Only the Invenio discovery strategy consumes this, and it only looks at
//! `rel` and `type`. Every other parameter is kept in [`HeaderLink::extras`].

use std::collections::HashMap;

/// One link from a `Link` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderLink {
    pub href: String,
    pub rel: String,
    /// The `type` parameter (a media type such as `application/linkset+json`).
    pub media_type: String,
    pub extras: HashMap<String, String>,
}

/// Parse a raw `Link` header value. Empty or malformed input yields no links.
pub fn parse_link_header(header: &str) -> Vec<HeaderLink> {
    split_outside(header, ',')
        .into_iter()
        .filter_map(parse_link)
        .collect()
}

fn parse_link(raw: &str) -> Option<HeaderLink> {
    let raw = raw.trim();
    let rest = raw.strip_prefix('<')?;
    let end = rest.find('>')?;
    let mut link = HeaderLink {
        href: rest[..end].trim().to_string(),
        ..Default::default()
    };

    for param in split_outside(&rest[end + 1..], ';') {
        let param = param.trim();
        if param.is_empty() {
            continue;
        }
        let (name, value) = match param.split_once('=') {
            Some((name, value)) => (name.trim(), unquote(value.trim())),
            None => (param, String::new()),
        };
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "rel" => link.rel = value,
            "type" => link.media_type = value,
            _ => {
                link.extras.insert(name, value);
            }
        }
    }
    Some(link)
}

/// Split on `sep`, ignoring separators inside `<...>` or double quotes.
fn split_outside(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_angle = false;
    let mut in_quote = false;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '<' if !in_quote => in_angle = true,
            '>' if !in_quote => in_angle = false,
            '"' if !in_angle => in_quote = !in_quote,
            c if c == sep && !in_angle && !in_quote => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts.retain(|p| !p.trim().is_empty());
    parts
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}
