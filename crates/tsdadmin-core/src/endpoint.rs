//! Routing-key extraction.
//!
//! The routing key is the first path segment of the request URI, without the
//! leading slash:
//!
//! | URI             | key     |
//! |-----------------|---------|
//! | `/`             | `""`    |
//! | `/foo`          | `"foo"` |
//! | `/foo/bar`      | `"foo"` |
//! | `/foo?quux`     | `"foo"` |
//! | `/foo?bar/quux` | `"foo"` |
//! | `/foo/bar?quux` | `"foo"` |

use crate::error::{AdminError, Result};

/// Return the first path segment of `uri`.
///
/// Fails with [`AdminError::BadRequest`] when the URI is empty or does not
/// start with `/`.
pub fn extract_endpoint(uri: &str) -> Result<&str> {
    if uri.is_empty() {
        return Err(AdminError::bad_request("Empty query"));
    }
    if !uri.starts_with('/') {
        return Err(AdminError::bad_request(format!(
            "Query doesn't start with a slash: <code>{}</code>",
            escape_html(uri)
        )));
    }

    // Both searches start after the leading slash; whichever delimiter comes
    // first ends the segment.
    let rest = &uri[1..];
    let questionmark = rest.find('?');
    let slash = rest.find('/');
    let end = match (questionmark, slash) {
        (Some(q), Some(s)) => q.min(s),
        (Some(q), None) => q,
        (None, Some(s)) => s,
        (None, None) => rest.len(),
    };
    Ok(&rest[..end])
}

/// Escape `s` for inclusion in an HTML page.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
