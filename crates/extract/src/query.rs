// ABOUTME: Capability-typed query interface (DocumentNode / ElementNode) over parsed HTML.
// ABOUTME: Implemented for scraper's Html and ElementRef, with a process-wide compiled selector cache.

//! Selector queries over a parsed document.
//!
//! Selector strings are opaque to the extractor: they are handed to the
//! query implementation, which compiles them (once per process) and applies
//! them. Any HTML library can back the extractor by implementing the two
//! traits below.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::QueryError;

/// A parsed document that can be searched with a CSS selector.
pub trait DocumentNode {
    type Element<'a>: ElementNode
    where
        Self: 'a;

    /// All elements matching `selector`, in document order.
    fn select_all(&self, selector: &str) -> Result<Vec<Self::Element<'_>>, QueryError>;
}

/// An element whose subtree can be searched.
pub trait ElementNode: Sized {
    /// First descendant matching `selector`, or `None`.
    fn select_first(&self, selector: &str) -> Result<Option<Self>, QueryError>;

    /// Concatenated text of the element's subtree, markup removed.
    fn text_content(&self) -> String;
}

/// Compiled selectors keyed by their source string. Invalid selectors are
/// cached too, with the compile error.
static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Result<Selector, String>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
pub fn compile(css: &str) -> Result<Selector, QueryError> {
    {
        let cache = SELECTOR_CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.get(css) {
            return to_query_result(css, cached);
        }
    }

    let compiled = Selector::parse(css).map_err(|e| e.to_string());
    let mut cache = SELECTOR_CACHE.write().unwrap_or_else(|e| e.into_inner());
    let entry = cache.entry(css.to_string()).or_insert(compiled);
    to_query_result(css, entry)
}

fn to_query_result(css: &str, cached: &Result<Selector, String>) -> Result<Selector, QueryError> {
    match cached {
        Ok(selector) => Ok(selector.clone()),
        Err(reason) => Err(QueryError::InvalidSelector {
            selector: css.to_string(),
            reason: reason.clone(),
        }),
    }
}

impl DocumentNode for Html {
    type Element<'a> = ElementRef<'a>;

    fn select_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>, QueryError> {
        let compiled = compile(selector)?;
        Ok(self.select(&compiled).collect())
    }
}

impl<'a> ElementNode for ElementRef<'a> {
    fn select_first(&self, selector: &str) -> Result<Option<Self>, QueryError> {
        let compiled = compile(selector)?;
        Ok(self.select(&compiled).next())
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_HTML: &str = r#"
        <html><body>
        <table class="tbl_list">
            <tbody>
                <tr><td class="al_left"><a href="/c/1">Acme Corp</a> - makes widgets</td></tr>
                <tr><td class="al_left"><a href="/c/2">Globex</a> <b>turbines</b></td></tr>
                <tr><td class="other">no link here</td></tr>
            </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_select_all_in_document_order() {
        let doc = Html::parse_document(LIST_HTML);
        let rows = doc.select_all("table.tbl_list tbody tr").unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].text_content().contains("Acme Corp"));
        assert!(rows[1].text_content().contains("Globex"));
    }

    #[test]
    fn test_select_first_is_scoped_to_subtree() {
        let doc = Html::parse_document(LIST_HTML);
        let rows = doc.select_all("tr").unwrap();
        let link = rows[1].select_first("a").unwrap().unwrap();
        assert_eq!(link.text_content(), "Globex");
        assert!(rows[2].select_first("a").unwrap().is_none());
    }

    #[test]
    fn test_select_first_excludes_the_element_itself() {
        let doc = Html::parse_document(LIST_HTML);
        let cells = doc.select_all("td.al_left").unwrap();
        assert!(cells[0].select_first("td").unwrap().is_none());
    }

    #[test]
    fn test_text_content_strips_markup_keeps_inner_spacing() {
        let doc = Html::parse_document(LIST_HTML);
        let rows = doc.select_all("tr").unwrap();
        let cell = rows[1].select_first("td").unwrap().unwrap();
        assert_eq!(cell.text_content(), "Globex turbines");
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let doc = Html::parse_document(LIST_HTML);
        let err = doc.select_all("[[[invalid").unwrap_err();
        assert!(matches!(err, QueryError::InvalidSelector { .. }));
    }

    #[test]
    fn test_empty_selector_is_an_error() {
        assert!(compile("").is_err());
    }

    #[test]
    fn test_compile_is_cached() {
        assert!(compile("div.container > p").is_ok());
        assert!(compile("div.container > p").is_ok());
        assert!(compile("td[").is_err());
        assert!(compile("td[").is_err());
    }
}
