//! Normalization of request paths for grouping.

use std::borrow::Cow;

use uuid::Uuid;

/// Replaces path segments that are integers with `{id}` and segments that
/// are UUIDs with `{guid}`, so `/users/12345/orders/<uuid>` becomes
/// `/users/{id}/orders/{guid}`.
///
/// Empty segments are dropped; a leading and a trailing slash are kept when
/// the input has them. Input without any `/` is returned as is.
pub fn clean_partial_url(url: &str) -> Cow<'_, str> {
    if url.is_empty() || !url.contains('/') {
        return Cow::Borrowed(url);
    }
    let mut out = String::with_capacity(url.len());
    for (i, piece) in url.split('/').filter(|p| !p.is_empty()).enumerate() {
        if i > 0 || url.starts_with('/') {
            out.push('/');
        }
        if piece.trim().parse::<i64>().is_ok() {
            out.push_str("{id}");
        } else if Uuid::parse_str(piece.trim()).is_ok() {
            out.push_str("{guid}");
        } else {
            out.push_str(piece);
        }
    }
    if url.ends_with('/') {
        out.push('/');
    }
    Cow::Owned(out)
}
