//! Thin helpers over the `scraper` document model
//!
//! The core only needs ordered selection, trimmed text, attributes and class
//! names; everything else about HTML parsing is left to `scraper`.

use crate::ConfigError;
use scraper::{ElementRef, Html, Node, Selector};

/// A compiled selector that remembers its source text for logging
#[derive(Debug, Clone)]
pub struct NamedSelector {
    source: String,
    selector: Selector,
}

impl NamedSelector {
    /// Compiles a CSS selector
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(source).map_err(|e| ConfigError::InvalidSelector {
            selector: source.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }

    /// Compiles a list of selectors, preserving order
    pub fn parse_all(sources: &[String]) -> Result<Vec<Self>, ConfigError> {
        sources.iter().map(|s| Self::parse(s)).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// All matches in the document, in document order
    pub fn select_in<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.selector).collect()
    }

    /// First match below `element`, in document order
    pub fn first_below<'a>(&self, element: ElementRef<'a>) -> Option<ElementRef<'a>> {
        element.select(&self.selector).next()
    }
}

/// Concatenated, trimmed text content of an element
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed, non-empty text nodes below an element, in document order
pub fn text_nodes(element: ElementRef<'_>) -> Vec<String> {
    element
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            _ => None,
        })
        .collect()
}

/// Non-empty attribute value, trimmed
pub fn attribute(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// True when any class name of the element contains one of the keywords
pub fn class_contains_any(element: ElementRef<'_>, keywords: &[String]) -> bool {
    element
        .value()
        .classes()
        .any(|class| keywords.iter().any(|k| class.contains(k.as_str())))
}
