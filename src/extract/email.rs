// src/extract/email.rs
// =============================================================================
// Finds email addresses in page content.
//
// Two sources:
// 1. The page text, scanned with a regular expression
// 2. Anchor hrefs using the mailto: scheme
//
// Everything here is a pure function: no network, no global state.
// Addresses are kept exactly as found (no lowercasing, no validation past
// the pattern), so "A@x.test" and "a@x.test" are two different entries.
// =============================================================================

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::html::ParsedPage;

// local-part @ domain-labels . tld-of-2+-letters
//
// This accepts some addresses that aren't strictly valid (a..b@x.test) and
// misses some exotic valid ones. Callers see whatever this matches, so
// changing it changes observable results.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap()
});

const MAILTO: &str = "mailto:";

// Returns every non-overlapping match of the email pattern in `text`
pub fn extract_from_text(text: &str) -> HashSet<String> {
    EMAIL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

// Returns the addresses carried by mailto: hrefs
//
// For "mailto:a@b.com?subject=hi" we keep "a@b.com": everything after
// "mailto:" and before the first '?'. Kept verbatim, so a bare "mailto:"
// contributes an empty string.
pub fn extract_from_links<S: AsRef<str>>(hrefs: &[S]) -> HashSet<String> {
    hrefs
        .iter()
        .filter_map(|href| mailto_address(href.as_ref()))
        .map(str::to_string)
        .collect()
}

// Union of the text matches and the mailto: addresses of a page
pub fn extract_from_page(page: &ParsedPage) -> HashSet<String> {
    let mut emails = extract_from_text(page.visible_text());
    emails.extend(extract_from_links(page.anchors()));
    emails
}

fn mailto_address(href: &str) -> Option<&str> {
    // "mailto:" may appear anywhere in the href, not only at the start
    let (_, after) = href.split_once(MAILTO)?;

    // Stop at a second "mailto:" too, so a doubled-up href doesn't produce
    // one giant glued address
    let address = after.split(MAILTO).next().unwrap_or("");
    address.split('?').next()
}
