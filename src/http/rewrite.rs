//! Response body domain rewriting.
//!
//! # Responsibilities
//! - Decide from the content type whether a body is text worth rewriting
//! - Replace absolute and protocol-relative references to real domains with
//!   their decoy equivalents
//! - Anchor root-relative links at the effective host (shortcut prefix only)
//!
//! # Design Decisions
//! - Patterns depend only on the real domain, so they are compiled once at
//!   startup; the decoy domain is supplied per request
//! - Each rule is a single forward pass over the text; output of one rule is
//!   never fed back into the same rule
//! - Replacement is literal (no `$` expansion)
//! - Patterns are plain `regex` automata; the host boundary and the
//!   root-relative exclusions are checked on the text following each match

use regex::Regex;

use crate::routing::DomainMap;

/// A `/` opening a quoted attribute or string value.
const QUOTED_SLASH: &str = r#"["']/"#;

const TEXT_CONTENT_TYPES: [&str; 4] = [
    "text/",
    "application/json",
    "application/javascript",
    "application/xml",
];

/// True when a body with this `Content-Type` should be rewritten.
pub fn is_rewritable(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    TEXT_CONTENT_TYPES
        .iter()
        .any(|kind| content_type.contains(kind))
}

/// A domain only counts as a whole host when followed by `/`, a quote,
/// whitespace or the end of the text.
fn at_host_boundary(rest: &str) -> bool {
    match rest.chars().next() {
        None => true,
        Some(c) => matches!(c, '/' | '"' | '\'') || c.is_whitespace(),
    }
}

/// True unless `rest` (the text after a quoted `/`) continues as `//host` or
/// `/scheme:`.
fn is_root_relative(rest: &str) -> bool {
    if rest.starts_with('/') {
        return false;
    }
    let letters = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
    !(letters > 0 && rest[letters..].starts_with(':'))
}

#[derive(Debug, Clone)]
struct DomainRule {
    decoy_prefix: String,
    absolute: Regex,
    protocol_relative: Regex,
}

/// Rewrites real-domain references in text bodies back to decoy form.
#[derive(Debug, Clone)]
pub struct ResponseRewriter {
    rules: Vec<DomainRule>,
    quoted_slash: Regex,
    shortcut: String,
}

impl ResponseRewriter {
    /// Compile one rule per mapping, in table order.
    pub fn new(map: &DomainMap) -> Result<Self, regex::Error> {
        let rules = map
            .mappings()
            .iter()
            .map(|mapping| {
                let domain = regex::escape(&mapping.real_domain);
                Ok(DomainRule {
                    decoy_prefix: mapping.decoy_prefix.clone(),
                    absolute: Regex::new(&format!("https?://{domain}"))?,
                    protocol_relative: Regex::new(&format!("//{domain}"))?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            rules,
            quoted_slash: Regex::new(QUOTED_SLASH)?,
            shortcut: map.shortcut().to_string(),
        })
    }

    /// Rewrite `text` served under `decoy_prefix` to a client that addressed
    /// `effective_host`.
    pub fn rewrite_text(&self, text: &str, decoy_prefix: &str, effective_host: &str) -> String {
        let domain_suffix = effective_host
            .strip_prefix(decoy_prefix)
            .unwrap_or(effective_host);

        let mut text = text.to_string();
        for rule in &self.rules {
            let decoy_domain = format!("{}{}", rule.decoy_prefix, domain_suffix);
            text = replace_where(
                &rule.absolute,
                text,
                0,
                &format!("https://{decoy_domain}"),
                at_host_boundary,
            );
            text = replace_where(
                &rule.protocol_relative,
                text,
                0,
                &format!("//{decoy_domain}"),
                at_host_boundary,
            );
        }

        if decoy_prefix == self.shortcut {
            // Keep the opening quote, replace only the slash.
            text = replace_where(
                &self.quoted_slash,
                text,
                1,
                &format!("https://{effective_host}/"),
                is_root_relative,
            );
        }

        text
    }
}

/// Replace every match of `regex` for which `accept` holds on the text that
/// follows it. The first `keep` bytes of each match are left in place.
fn replace_where(
    regex: &Regex,
    text: String,
    keep: usize,
    replacement: &str,
    accept: fn(&str) -> bool,
) -> String {
    let mut out: Option<String> = None;
    let mut last = 0;

    for m in regex.find_iter(&text) {
        if !accept(&text[m.end()..]) {
            continue;
        }
        let buf = out.get_or_insert_with(|| String::with_capacity(text.len()));
        buf.push_str(&text[last..m.start() + keep]);
        buf.push_str(replacement);
        last = m.end();
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&text[last..]);
            buf
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::DomainMapping;

    fn rewriter() -> ResponseRewriter {
        ResponseRewriter::new(&DomainMap::default()).unwrap()
    }

    #[test]
    fn test_content_type_gate() {
        for rewritable in [
            "text/html; charset=utf-8",
            "text/plain",
            "application/json",
            "application/javascript",
            "application/xml",
            "Text/HTML",
        ] {
            assert!(is_rewritable(rewritable), "{rewritable}");
        }
        for binary in ["image/png", "application/octet-stream", "font/woff2", ""] {
            assert!(!is_rewritable(binary), "{binary}");
        }
    }

    #[test]
    fn test_json_absolute_url() {
        let out = rewriter().rewrite_text(
            r#"{"html_url":"https://github.com/foo"}"#,
            "gh.",
            "gh.example.com",
        );
        assert_eq!(out, r#"{"html_url":"https://gh.example.com/foo"}"#);
    }

    #[test]
    fn test_http_upgraded_and_other_domains_use_same_suffix() {
        let out = rewriter().rewrite_text(
            "see http://api.github.com/repos and https://raw.githubusercontent.com/a/b/main/x",
            "api-github-com.",
            "api-github-com.mirror.test",
        );
        assert_eq!(
            out,
            "see https://api-github-com.mirror.test/repos and \
             https://raw-githubusercontent-com.mirror.test/a/b/main/x"
        );
    }

    #[test]
    fn test_protocol_relative() {
        let out = rewriter().rewrite_text(
            r#"<script src="//github.githubassets.com/app.js"></script>"#,
            "gh.",
            "gh.example.com",
        );
        assert_eq!(
            out,
            r#"<script src="//github-githubassets-com.example.com/app.js"></script>"#
        );
    }

    #[test]
    fn test_boundaries() {
        let rewriter = rewriter();
        assert_eq!(
            rewriter.rewrite_text("https://github.com", "api-github-com.", "api-github-com.x.io"),
            "https://gh.x.io"
        );
        assert_eq!(
            rewriter.rewrite_text("'https://github.com' x", "api-github-com.", "api-github-com.x.io"),
            "'https://gh.x.io' x"
        );
        assert_eq!(
            rewriter.rewrite_text("https://github.com\tnext", "api-github-com.", "api-github-com.x.io"),
            "https://gh.x.io\tnext"
        );
    }

    #[test]
    fn test_no_false_positives_in_unrelated_text() {
        let rewriter = rewriter();
        for text in [
            "https://github.company.com/x",
            "https://notgithub.com/x",
            "https://github.comx",
            "visit github.com/foo today",
            "mailto:someone@github.com",
            "https://github.com?tab=repositories",
        ] {
            assert_eq!(
                rewriter.rewrite_text(text, "api-github-com.", "api-github-com.example.com"),
                text
            );
        }
    }

    #[test]
    fn test_similar_domains_map_to_their_own_rows() {
        let out = rewriter().rewrite_text(
            "https://github.community/t and https://github.io/x",
            "api-github-com.",
            "api-github-com.example.com",
        );
        assert_eq!(
            out,
            "https://github-community.example.com/t and https://github-io.example.com/x"
        );
    }

    #[test]
    fn test_already_decoy_text_is_stable() {
        let rewriter = rewriter();
        let text = r#"<a href="https://gh.example.com/foo">"#;
        let once = rewriter.rewrite_text(text, "gh.", "gh.example.com");
        assert_eq!(once, text);
        assert_eq!(rewriter.rewrite_text(&once, "gh.", "gh.example.com"), text);
    }

    #[test]
    fn test_root_relative_for_shortcut_only() {
        let rewriter = rewriter();
        let html = r#"<a href="/owner/repo">x</a><img src='/img.png'><a href="//cdn.x/y"><a href="/http:x">"#;

        assert_eq!(
            rewriter.rewrite_text(html, "gh.", "gh.example.com"),
            r#"<a href="https://gh.example.com/owner/repo">x</a><img src='https://gh.example.com/img.png'><a href="//cdn.x/y"><a href="/http:x">"#
        );
        assert_eq!(
            rewriter.rewrite_text(html, "api-github-com.", "api-github-com.example.com"),
            html
        );
    }

    #[test]
    fn test_port_in_effective_host_is_part_of_suffix() {
        let out = rewriter().rewrite_text(
            r#"["https://github.com/a", "/b"]"#,
            "gh.",
            "gh.mirror.test:8443",
        );
        assert_eq!(
            out,
            r#"["https://gh.mirror.test:8443/a", "https://gh.mirror.test:8443/b"]"#
        );
    }

    #[test]
    fn test_multi_megabyte_body_fully_rewritten() {
        let mut html = "<p>".to_string() + &"a".repeat(2 * 1024 * 1024);
        html.push_str(r#" "https://github.com/foo" '/rel' <img src="//avatars.githubusercontent.com/u/1">"#);

        let out = rewriter().rewrite_text(&html, "gh.", "gh.example.com");

        assert!(out.ends_with(
            r#" "https://gh.example.com/foo" 'https://gh.example.com/rel' <img src="//avatars-githubusercontent-com.example.com/u/1">"#
        ));
        assert!(!out.contains("github.com"));
    }

    #[test]
    fn test_rejected_match_does_not_hide_the_next_one() {
        let out = rewriter().rewrite_text(
            "https://github.comx https://github.com/a",
            "api-github-com.",
            "api-github-com.example.com",
        );
        assert_eq!(out, "https://github.comx https://gh.example.com/a");
    }

    #[test]
    fn test_alternate_table() {
        let map = DomainMap::new(
            vec![
                DomainMapping::new("gitlab.com", "gl."),
                DomainMapping::new("docs.gitlab.com", "docs-gitlab-com."),
            ],
            "gl.",
        );
        let rewriter = ResponseRewriter::new(&map).unwrap();
        let out = rewriter.rewrite_text(
            "https://docs.gitlab.com/ee and https://github.com/x",
            "gl.",
            "gl.example.net",
        );
        assert_eq!(out, "https://docs-gitlab-com.example.net/ee and https://github.com/x");
    }
}
