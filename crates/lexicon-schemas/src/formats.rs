//! String formats
//!
//! The `format` attribute of a `string` schema names one of a closed set of syntaxes.
//! Parsing rejects unknown names; data validation uses [`StringFormat::check`] to test
//! concrete values.
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::nsid;
use chrono::DateTime;
use ipld_core::cid::Cid;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;
use url::Url;

/// Longest accepted `uri` value, in bytes
pub const MAX_URI_LENGTH: usize = 8192;

static DID_REGEX: OnceLock<Regex> = OnceLock::new();
static HANDLE_REGEX: OnceLock<Regex> = OnceLock::new();
static TID_REGEX: OnceLock<Regex> = OnceLock::new();
static RECORD_KEY_REGEX: OnceLock<Regex> = OnceLock::new();
static LANGUAGE_REGEX: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("string format pattern"))
}

/// Known `format` values for string schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringFormat {
    AtIdentifier,
    AtUri,
    Cid,
    Datetime,
    Did,
    Handle,
    Nsid,
    Tid,
    RecordKey,
    Uri,
    Language,
}

impl StringFormat {
    pub const ALL: [StringFormat; 11] = [
        StringFormat::AtIdentifier,
        StringFormat::AtUri,
        StringFormat::Cid,
        StringFormat::Datetime,
        StringFormat::Did,
        StringFormat::Handle,
        StringFormat::Nsid,
        StringFormat::Tid,
        StringFormat::RecordKey,
        StringFormat::Uri,
        StringFormat::Language,
    ];

    /// Look up a format by its schema name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            StringFormat::AtIdentifier => "at-identifier",
            StringFormat::AtUri => "at-uri",
            StringFormat::Cid => "cid",
            StringFormat::Datetime => "datetime",
            StringFormat::Did => "did",
            StringFormat::Handle => "handle",
            StringFormat::Nsid => "nsid",
            StringFormat::Tid => "tid",
            StringFormat::RecordKey => "record-key",
            StringFormat::Uri => "uri",
            StringFormat::Language => "language",
        }
    }

    /// Check a concrete value, returning the reason it does not conform
    pub fn check(&self, value: &str) -> Result<(), String> {
        let ok = match self {
            StringFormat::AtIdentifier => is_did(value) || is_handle(value),
            StringFormat::AtUri => is_at_uri(value),
            StringFormat::Cid => Cid::try_from(value).is_ok(),
            StringFormat::Datetime => DateTime::parse_from_rfc3339(value).is_ok(),
            StringFormat::Did => is_did(value),
            StringFormat::Handle => is_handle(value),
            StringFormat::Nsid => nsid::validate(value).is_ok(),
            StringFormat::Tid => pattern(
                &TID_REGEX,
                r"^[234567abcdefghij][234567abcdefghijklmnopqrstuvwxyz]{12}$",
            )
            .is_match(value),
            StringFormat::RecordKey => is_record_key(value),
            StringFormat::Uri => value.len() <= MAX_URI_LENGTH && Url::parse(value).is_ok(),
            StringFormat::Language => {
                pattern(&LANGUAGE_REGEX, r"^(i|[a-z]{2,3})(-[a-zA-Z0-9]+)*$").is_match(value)
            }
        };

        if ok {
            Ok(())
        } else {
            Err(format!("'{}' is not a valid {}", value, self.name()))
        }
    }
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn is_did(value: &str) -> bool {
    value.len() <= 2048
        && pattern(&DID_REGEX, r"^did:[a-z]+:[a-zA-Z0-9._:%-]*[a-zA-Z0-9._-]$").is_match(value)
}

fn is_handle(value: &str) -> bool {
    value.len() <= 253
        && pattern(
            &HANDLE_REGEX,
            r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$",
        )
        .is_match(value)
}

fn is_record_key(value: &str) -> bool {
    value != "."
        && value != ".."
        && pattern(&RECORD_KEY_REGEX, r"^[a-zA-Z0-9_~.:-]{1,512}$").is_match(value)
}

/// `at://<did-or-handle>[/<collection-nsid>[/<record-key>]]`
fn is_at_uri(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("at://") else {
        return false;
    };
    let rest = rest.split(&['#', '?'][..]).next().unwrap_or_default();
    let mut parts = rest.splitn(3, '/');

    let authority = parts.next().unwrap_or_default();
    if !(is_did(authority) || is_handle(authority)) {
        return false;
    }
    if let Some(collection) = parts.next() {
        if nsid::validate(collection).is_err() {
            return false;
        }
    }
    match parts.next() {
        Some(key) => is_record_key(key),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_covers_all_formats() {
        for format in StringFormat::ALL {
            assert_eq!(StringFormat::from_name(format.name()), Some(format));
        }
        assert_eq!(StringFormat::from_name("email"), None);
    }

    #[test]
    fn test_identifier_formats() {
        assert!(StringFormat::Did.check("did:plc:z72i7hdynmk6r22z27h6tvur").is_ok());
        assert!(StringFormat::Did.check("did:web:example.com").is_ok());
        assert!(StringFormat::Did.check("plc:abc").is_err());

        assert!(StringFormat::Handle.check("alice.bsky.social").is_ok());
        assert!(StringFormat::Handle.check("localhost").is_err());

        assert!(StringFormat::AtIdentifier.check("alice.example.com").is_ok());
        assert!(StringFormat::AtIdentifier.check("did:plc:abc123").is_ok());
        assert!(StringFormat::AtIdentifier.check("not an id").is_err());

        assert!(StringFormat::Nsid.check("app.bsky.feed.post").is_ok());
        assert!(StringFormat::Nsid.check("post").is_err());
    }

    #[test]
    fn test_at_uri() {
        let format = StringFormat::AtUri;
        assert!(format.check("at://did:plc:abc123").is_ok());
        assert!(format
            .check("at://alice.example.com/app.bsky.feed.post/3jzfcijpj2z2a")
            .is_ok());
        assert!(format.check("https://example.com").is_err());
        assert!(format.check("at://alice.example.com/not-an-nsid").is_err());
    }

    #[test]
    fn test_misc_formats() {
        assert!(StringFormat::Datetime.check("2024-01-15T10:30:00.000Z").is_ok());
        assert!(StringFormat::Datetime.check("2024-01-15").is_err());

        assert!(StringFormat::Tid.check("3jzfcijpj2z2a").is_ok());
        assert!(StringFormat::Tid.check("3jzfcijpj2z2").is_err());

        assert!(StringFormat::RecordKey.check("self").is_ok());
        assert!(StringFormat::RecordKey.check("..").is_err());

        assert!(StringFormat::Uri.check("https://example.com/path?q=1").is_ok());
        assert!(StringFormat::Uri.check("no scheme").is_err());

        assert!(StringFormat::Language.check("en").is_ok());
        assert!(StringFormat::Language.check("pt-BR").is_ok());
        assert!(StringFormat::Language.check("english!").is_err());

        assert!(StringFormat::Cid
            .check("bafyreidfayvfuwqa7qlnopdjiqrxzs6blmoeu4rujcjtnci5beludirz2a")
            .is_ok());
    }

    #[test]
    fn test_uri_must_parse() {
        let format = StringFormat::Uri;
        assert!(format.check("http://[::1]:8080/").is_ok());
        assert!(format.check("mailto:alice@example.com").is_ok());
        assert!(format.check("http://[::1").is_err());
        assert!(format.check("https://exa mple.com").is_err());

        let long = format!("https://example.com/{}", "a".repeat(MAX_URI_LENGTH));
        assert!(format.check(&long).is_err());
    }

    #[test]
    fn test_cid_must_decode() {
        let format = StringFormat::Cid;
        assert!(format.check("QmY7Yh4UquoXHLPFo2XbhXkhBvFoPwmQUSa92pxnxjQuPU").is_ok());
        assert!(format.check("bafy+not=a=cid").is_err());
        assert_eq!(
            format.check("bafy+not=a=cid").unwrap_err(),
            "'bafy+not=a=cid' is not a valid cid"
        );
    }
}
