// src/extract/mod.rs
// =============================================================================
// This module contains all email extraction logic.
//
// Submodules:
// - html: Parses a page into its text and anchor hrefs
// - email: Finds email addresses in that text and in mailto: links
// =============================================================================

mod email;
mod html;

pub use email::extract_from_page;
pub use html::ParsedPage;
