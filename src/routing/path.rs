//! Nested-URL path cleanup.
//!
//! Earlier rewritten pages can make the browser request paths such as
//! `/owner/repo/latest-commit/main/https%3A//gh.example.com/owner/repo`.
//! Only the `latest-commit` and `tree-commit-info` segments are touched;
//! everything else passes through unchanged.

use std::borrow::Cow;

use regex::Regex;

const ENCODED_NESTED_URL: &str =
    r"(/[^/]+/[^/]+/(?:latest-commit|tree-commit-info)/[^/]+)/https%3A//[^/]+/.*";
const LITERAL_NESTED_URL: &str =
    r"(/[^/]+/[^/]+/(?:latest-commit|tree-commit-info)/[^/]+)/https://[^/]+/.*";

/// Strips embedded sub-URLs from known API-style path segments.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    encoded: Regex,
    literal: Regex,
}

impl PathNormalizer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            encoded: Regex::new(ENCODED_NESTED_URL)?,
            literal: Regex::new(LITERAL_NESTED_URL)?,
        })
    }

    /// Return `path` with any nested trailing URL removed.
    pub fn normalize<'a>(&self, path: &'a str) -> Cow<'a, str> {
        let once = self.encoded.replacen(path, 1, "${1}");
        let twice = match self.literal.replacen(&once, 1, "${1}") {
            Cow::Owned(stripped) => Some(stripped),
            Cow::Borrowed(_) => None,
        };
        match twice {
            Some(stripped) => Cow::Owned(stripped),
            None => once,
        }
    }
}
