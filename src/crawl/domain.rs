// src/crawl/domain.rs
// =============================================================================
// Decides which URLs belong to the site being crawled.
//
// The "domain" of a URL here is its network location: whatever sits between
// "scheme://" and the next '/', '?' or '#'. That is the host plus an optional
// port (and userinfo, if someone put it there).
//
// The comparison is plain string equality on purpose:
// - "Example.com" and "example.com" are different
// - "www.example.com" and "example.com" are different
// - "example.com" and "example.com:443" are different
// Real hostnames are case-insensitive, so a seed typed with capitals (or an
// explicit :443) won't match absolute links written the usual way. That's
// kept as-is.
//
// The url crate lowercases hosts and drops default ports when it resolves a
// link, so the check for a link looks at the href as written, not at the
// resolved URL.
// =============================================================================

// Returns the network-location part of a URL, exactly as written
//
// Examples:
//   "https://www.example.com/page" -> "www.example.com"
//   "http://localhost:8080/?q=1"  -> "localhost:8080"
//   "//cdn.example.com/app.js"    -> "cdn.example.com"
//   "not a url"                   -> ""
//
// Never fails: malformed input just gives an empty (or partial) string,
// which won't compare equal to a real domain.
pub fn domain_of(url: &str) -> &str {
    let rest = strip_scheme(url);

    let Some(rest) = rest.strip_prefix("//") else {
        return "";
    };

    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

// True when both URLs have the same network location
pub fn same_domain(a: &str, b: &str) -> bool {
    domain_of(a) == domain_of(b)
}

// Decides whether a link found on a page of the crawl stays on the seed's site
//
// Parameters:
//   href: the link as written in the page
//   resolved: the link after resolving it against the page (url crate form)
//   page_url: the page it was found on (url crate form)
//   seed: the seed URL exactly as the caller wrote it
//
// An href that names its own network location ("https://host/..." or
// "//host/...") is compared literally against the seed. A relative href
// inherits the page's location, and every page we crawl already has the
// seed's location, so it only has to land on the same host as the page.
pub fn link_stays_on_site(href: &str, resolved: &str, page_url: &str, seed: &str) -> bool {
    let href = href.trim();
    if domain_of(href).is_empty() {
        same_domain(resolved, page_url)
    } else {
        same_domain(href, seed)
    }
}

// Drops a leading "scheme:" if the URL has one
//
// A scheme is a letter followed by letters, digits, '+', '-' or '.'.
fn strip_scheme(url: &str) -> &str {
    let Some(colon) = url.find(':') else {
        return url;
    };

    let scheme = &url[..colon];
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    if valid {
        &url[colon + 1..]
    } else {
        url
    }
}
