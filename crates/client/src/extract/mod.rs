//! HTML extraction for the two pages the bot reads.
//!
//! - [`basket`]: the "products to collect" summary table.
//! - [`contracts`]: the list of contracts open for subscription.
//!
//! Both work on the raw page body and never mutate the parsed document.

pub mod basket;
pub mod contracts;

pub use basket::extract_basket;
pub use contracts::extract_contracts;

use scraper::ElementRef;

/// Text fragments of `element`, trimmed, empties dropped, concatenated.
pub(crate) fn stripped_text(element: &ElementRef<'_>) -> String {
    element.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

/// Text fragments of `element` outside the subtree rooted at `skip`, trimmed,
/// empties dropped, joined with single spaces.
pub(crate) fn spaced_text_excluding(element: &ElementRef<'_>, skip: Option<&ElementRef<'_>>) -> String {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let inside_skipped = skip.is_some_and(|s| node.ancestors().any(|a| a.id() == s.id()));
            if inside_skipped { None } else { Some(text.trim()) }
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
