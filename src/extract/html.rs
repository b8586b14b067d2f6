// src/extract/html.rs
// =============================================================================
// Turns raw HTML into the two things the rest of the program cares about:
// - the page's text content (where we look for email addresses)
// - the href of every <a> element (mailto: links and links to crawl)
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Why copy everything out into a ParsedPage?
// - scraper's Html type is not Send, so it can't be held across an .await
// - The crawler only needs plain strings, so we parse once and drop the DOM
// =============================================================================

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

// "all <a> tags that have an href attribute"
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    // Constant selector, known to be valid
    Selector::parse("a[href]").unwrap()
});

// A parsed HTML page, reduced to text and anchor hrefs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    text: String,
    hrefs: Vec<String>,
}

impl ParsedPage {
    // Parses an HTML document
    //
    // Parsing never fails: html5ever repairs broken markup the same way a
    // browser would, so garbage in still gives us *some* page.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        // Every text node in document order, glued together with no separator
        let text: String = document.root_element().text().collect();

        let hrefs = document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect();

        Self { text, hrefs }
    }

    /// All text content of the page
    pub fn visible_text(&self) -> &str {
        &self.text
    }

    /// The href of every anchor that has one, in document order
    pub fn anchors(&self) -> &[String] {
        &self.hrefs
    }
}
