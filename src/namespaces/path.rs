//! # Namespace path syntax.
//!
//! A namespace is one or more non-empty dot-separated segments. The wildcard
//! segment `*` may only appear last: `system.io.*` and the bare root
//! wildcard `*` are valid, `system.*.io` and `system..io` are not.

use crate::error::Error;

/// The subtree-wildcard segment.
pub(crate) const WILDCARD: &str = "*";

/// Splits a namespace into its segments.
#[inline]
pub(crate) fn segments(namespace: &str) -> std::str::Split<'_, char> {
    namespace.split('.')
}

/// Validates namespace syntax.
///
/// Accepts literal paths and wildcard-suffixed patterns. Rejects empty
/// strings, empty segments, and `*` anywhere but the final segment.
pub(crate) fn validate(namespace: &str) -> Result<(), Error> {
    let invalid = |reason| Error::InvalidNamespace {
        namespace: namespace.to_string(),
        reason,
    };

    if namespace.is_empty() {
        return Err(invalid("namespace is empty"));
    }

    let segs: Vec<&str> = segments(namespace).collect();
    for (i, seg) in segs.iter().enumerate() {
        if seg.is_empty() {
            return Err(invalid("empty segment"));
        }
        if *seg == WILDCARD && i != segs.len() - 1 {
            return Err(invalid("wildcard '*' is only valid as the final segment"));
        }
    }

    Ok(())
}
