//! # Argument-signature declaration and emission validation.
//!
//! Every subscriber declares the keyword arguments it accepts. The first
//! non-flexible subscriber registered to a namespace freezes that
//! namespace's signature record; later non-flexible registrations must match
//! it exactly, and every emission reaching the namespace must supply exactly
//! that key set. [`Signature::Flexible`] opts a subscriber out of both
//! checks.
//!
//! Declaration replaces reflection: there is no way to inspect a Rust
//! closure's parameter list at runtime, so the contract is stated up front
//! at registration time.

use std::collections::BTreeSet;

use crate::error::Error;
use crate::events::Kwargs;

use super::entry::ResolvedSubscriber;

/// The keyword-argument contract a subscriber declares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signature {
    /// Accepts arbitrary keyword arguments; exempt from signature records.
    Flexible,
    /// Accepts exactly this set of keyword-argument names.
    Exact(BTreeSet<String>),
}

impl Signature {
    /// Builds an exact signature from argument names.
    ///
    /// ```rust
    /// use emissary::Signature;
    ///
    /// let sig = Signature::exact(["message", "level"]);
    /// assert!(!sig.is_flexible());
    /// ```
    pub fn exact<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Signature::Exact(names.into_iter().map(Into::into).collect())
    }

    /// Builds the signature of callbacks taking no keyword arguments.
    pub fn empty() -> Self {
        Signature::Exact(BTreeSet::new())
    }

    #[inline]
    pub fn is_flexible(&self) -> bool {
        matches!(self, Signature::Flexible)
    }
}

/// Sorted name list for error reporting.
pub(crate) fn sorted_names(names: &BTreeSet<String>) -> Vec<String> {
    names.iter().cloned().collect()
}

/// Checks emitted kwargs against the records of the matched snapshot.
///
/// For every non-flexible matched entry whose owning node carries a record,
/// the kwarg key set must equal that record exactly. Flexible entries impose
/// nothing; with no record in the matched set, any shape passes. Runs after
/// the transformer pipeline and before any delivery.
pub(crate) fn validate_emission(
    emitted: &str,
    matched: &[ResolvedSubscriber],
    kwargs: &Kwargs,
) -> Result<(), Error> {
    let mut checked: Vec<&str> = Vec::new();

    for sub in matched.iter().filter(|s| !s.flexible) {
        let Some(record) = &sub.owner_signature else {
            continue;
        };
        if checked.contains(&&*sub.owner) {
            continue;
        }
        checked.push(&sub.owner);

        let matches_record =
            record.len() == kwargs.len() && kwargs.keys().all(|k| record.contains(k));
        if !matches_record {
            return Err(Error::ArgumentMismatch {
                emitted: emitted.to_string(),
                namespace: sub.owner.to_string(),
                expected: sorted_names(record),
                provided: {
                    let mut keys: Vec<String> = kwargs.keys().cloned().collect();
                    keys.sort();
                    keys
                },
            });
        }
    }

    Ok(())
}
