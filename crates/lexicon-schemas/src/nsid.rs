//! Namespaced identifiers (NSIDs)
//!
//! An NSID is a reversed domain authority followed by a name segment, for example
//! `com.atproto.repo.listRecords`. [`validate`] is the accept/reject contract used for
//! document ids and external ref targets; [`Nsid`] is the checked newtype.
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Maximum total length of an NSID
pub const MAX_LENGTH: usize = 317;

/// Maximum length of the domain authority part
pub const MAX_AUTHORITY_LENGTH: usize = 253;

static DOMAIN_SEGMENT_REGEX: OnceLock<Regex> = OnceLock::new();
static NAME_SEGMENT_REGEX: OnceLock<Regex> = OnceLock::new();

fn domain_segment() -> &'static Regex {
    DOMAIN_SEGMENT_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$").expect("domain segment pattern")
    })
}

fn name_segment() -> &'static Regex {
    NAME_SEGMENT_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9]{0,62}$").expect("name segment pattern"))
}

/// Why a string is not an NSID
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum NsidError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier is {len} characters long, the limit is {}", MAX_LENGTH)]
    TooLong { len: usize },

    #[error("identifier has {count} segments, at least 3 are required")]
    TooFewSegments { count: usize },

    #[error("segment {index} ('{segment}') {problem}")]
    InvalidSegment {
        index: usize,
        segment: String,
        problem: String,
    },
}

impl NsidError {
    fn segment(index: usize, segment: &str, problem: impl Into<String>) -> Self {
        Self::InvalidSegment {
            index,
            segment: segment.to_string(),
            problem: problem.into(),
        }
    }
}

/// Check that `input` is a syntactically valid NSID
pub fn validate(input: &str) -> Result<(), NsidError> {
    if input.is_empty() {
        return Err(NsidError::Empty);
    }
    if input.len() > MAX_LENGTH {
        return Err(NsidError::TooLong { len: input.len() });
    }
    if !input.is_ascii() {
        return Err(NsidError::segment(0, input, "contains non-ASCII characters"));
    }

    let segments: Vec<&str> = input.split('.').collect();
    if segments.len() < 3 {
        return Err(NsidError::TooFewSegments {
            count: segments.len(),
        });
    }

    let (name, authority) = segments
        .split_last()
        .ok_or(NsidError::TooFewSegments { count: 0 })?;

    let authority_len = input.len() - name.len() - 1;
    if authority_len > MAX_AUTHORITY_LENGTH {
        return Err(NsidError::segment(
            0,
            &input[..authority_len],
            format!("authority exceeds {} characters", MAX_AUTHORITY_LENGTH),
        ));
    }

    for (index, segment) in authority.iter().enumerate() {
        if segment.is_empty() {
            return Err(NsidError::segment(index, segment, "is empty"));
        }
        if !domain_segment().is_match(segment) {
            return Err(NsidError::segment(
                index,
                segment,
                "is not a valid domain label",
            ));
        }
        if index == 0 && segment.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(NsidError::segment(
                index,
                segment,
                "is a top-level domain starting with a digit",
            ));
        }
    }

    if !name_segment().is_match(name) {
        return Err(NsidError::segment(
            segments.len() - 1,
            name,
            "is not a valid name (letter first, then letters and digits)",
        ));
    }

    Ok(())
}

/// A syntactically valid NSID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Nsid(String);

impl Nsid {
    /// Validate and wrap `input`
    pub fn new(input: impl Into<String>) -> Result<Self, NsidError> {
        let input = input.into();
        validate(&input)?;
        Ok(Self(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Domain authority in natural order, e.g. `repo.atproto.com`
    pub fn authority(&self) -> String {
        let mut segments: Vec<&str> = self.0.split('.').collect();
        segments.pop();
        segments.reverse();
        segments.join(".")
    }

    /// The final name segment, e.g. `listRecords`
    pub fn name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or_default()
    }
}

impl FromStr for Nsid {
    type Err = NsidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Nsid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Nsid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_well_formed_ids() {
        for id in [
            "com.example.foo",
            "com.atproto.repo.listRecords",
            "app.bsky.feed.post",
            "a.b.c",
            "net.users.bob.ping",
            "a-0.b-1.c",
            "cn.8.lex.stuff",
        ] {
            assert!(validate(id).is_ok(), "expected '{}' to be accepted", id);
        }
    }

    #[test]
    fn test_rejects_malformed_ids() {
        for id in [
            "",
            "com.example",
            "com..foo",
            "com.example.3",
            "com.example.foo-bar",
            "com.-example.foo",
            "com.example-.foo",
            "1com.example.foo",
            "com.example.foo.",
            "com.exa💩ple.thing",
            "com.example.foo bar",
        ] {
            assert!(validate(id).is_err(), "expected '{}' to be rejected", id);
        }
    }

    #[test]
    fn test_error_variants() {
        assert_eq!(validate(""), Err(NsidError::Empty));
        assert_eq!(
            validate("com.example"),
            Err(NsidError::TooFewSegments { count: 2 })
        );
        let long = format!("com.example.{}", "a".repeat(400));
        assert!(matches!(validate(&long), Err(NsidError::TooLong { .. })));
        assert!(matches!(
            validate("com.example.3"),
            Err(NsidError::InvalidSegment { index: 2, .. })
        ));
    }

    #[test]
    fn test_nsid_parts() {
        let nsid: Nsid = "com.atproto.repo.listRecords".parse().unwrap();
        assert_eq!(nsid.authority(), "repo.atproto.com");
        assert_eq!(nsid.name(), "listRecords");
        assert_eq!(nsid.to_string(), "com.atproto.repo.listRecords");
    }
}
