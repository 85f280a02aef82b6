//! Page URL templates
//!
//! A listing is addressed by a template such as
//! `http://sh.bendibao.com/news/list_17_727_{page}.htm` or
//! `https://www.maoyan.com/board/4?offset={offset}`. The same template tells
//! the pagination resolver how to read a page index back out of an href.

use crate::config::SourceConfig;
use crate::ConfigError;
use regex::Regex;

const PAGE: &str = "{page}";
const OFFSET: &str = "{offset}";

/// Which numbering convention the template uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numbering {
    Page,
    Offset,
}

/// Renders page URLs and infers page indices from hrefs
#[derive(Debug, Clone)]
pub struct PageUrlTemplate {
    template: String,
    first_page_url: Option<String>,
    page_size: u32,
    numbering: Numbering,
    index_pattern: Regex,
}

impl PageUrlTemplate {
    /// Builds a template, deriving the page-index pattern from it
    pub fn new(
        template: &str,
        first_page_url: Option<String>,
        page_size: u32,
    ) -> Result<Self, ConfigError> {
        let numbering = if template.contains(PAGE) {
            Numbering::Page
        } else if template.contains(OFFSET) {
            Numbering::Offset
        } else {
            return Err(ConfigError::InvalidTemplate(format!(
                "'{}' has no {{page}} or {{offset}} placeholder",
                template
            )));
        };

        let placeholder = match numbering {
            Numbering::Page => PAGE,
            Numbering::Offset => OFFSET,
        };
        let index_pattern = derive_index_pattern(template, placeholder)?;

        Ok(Self {
            template: template.to_string(),
            first_page_url,
            page_size: page_size.max(1),
            numbering,
            index_pattern,
        })
    }

    /// Builds a template from the `[source]` section
    pub fn from_config(source: &SourceConfig) -> Result<Self, ConfigError> {
        Self::new(
            &source.url_template,
            source.first_page_url.clone(),
            source.page_size,
        )
    }

    /// Replaces the derived index pattern; the first capture group is the index
    pub fn with_index_pattern(mut self, pattern: &str) -> Result<Self, ConfigError> {
        self.index_pattern = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self)
    }

    /// Returns the URL of a 1-based page index
    pub fn render(&self, page: u32) -> String {
        if page <= 1 {
            if let Some(first) = &self.first_page_url {
                return first.clone();
            }
        }

        let offset = page.saturating_sub(1).saturating_mul(self.page_size);
        self.template
            .replace(PAGE, &page.to_string())
            .replace(OFFSET, &offset.to_string())
    }

    /// Reads a 1-based page index out of an href
    ///
    /// The last occurrence of the pattern wins, so a host or directory that
    /// happens to look like an index does not shadow the real one.
    pub fn infer_page(&self, href: &str) -> Option<u32> {
        let captures = self.index_pattern.captures_iter(href).last()?;
        let raw = captures.get(1).or_else(|| captures.get(0))?.as_str();
        let value: u32 = raw.parse().ok()?;

        match self.numbering {
            Numbering::Page => Some(value),
            Numbering::Offset => Some(value / self.page_size + 1),
        }
    }

    /// The regex used by [`Self::infer_page`]
    pub fn index_pattern(&self) -> &str {
        self.index_pattern.as_str()
    }
}

/// Builds the regex matching the literal text around the placeholder
///
/// The prefix runs back to the previous `/`, `?` or `&`; the suffix runs
/// forward to the next `/`, `?`, `&` or `#`. For `list_17_727_{page}.htm`
/// this yields `list_17_727_(\d+)\.htm`; for `default.html?page={page}` it
/// yields `page=(\d+)`.
fn derive_index_pattern(template: &str, placeholder: &str) -> Result<Regex, ConfigError> {
    let start = template.rfind(placeholder).ok_or_else(|| {
        ConfigError::InvalidTemplate(format!("'{}' lost its placeholder", template))
    })?;
    let end = start + placeholder.len();

    let before = &template[..start];
    let prefix_start = before
        .rfind(|c: char| c == '/' || c == '?' || c == '&')
        .map(|i| i + 1)
        .unwrap_or(0);
    let prefix = &before[prefix_start..];

    let after = &template[end..];
    let suffix_end = after
        .find(|c: char| c == '/' || c == '?' || c == '&' || c == '#')
        .unwrap_or(after.len());
    let suffix = &after[..suffix_end];

    let pattern = format!(r"{}(\d+){}", regex::escape(prefix), regex::escape(suffix));
    Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern { pattern, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_page_placeholder() {
        let t = PageUrlTemplate::new("http://sh.example.com/news/list_17_727_{page}.htm", None, 10)
            .unwrap();
        assert_eq!(t.render(1), "http://sh.example.com/news/list_17_727_1.htm");
        assert_eq!(t.render(12), "http://sh.example.com/news/list_17_727_12.htm");
    }

    #[test]
    fn test_render_first_page_override() {
        let t = PageUrlTemplate::new(
            "https://blog.example.com/pinard/default.html?page={page}",
            Some("https://blog.example.com/pinard".to_string()),
            10,
        )
        .unwrap();
        assert_eq!(t.render(1), "https://blog.example.com/pinard");
        assert_eq!(t.render(3), "https://blog.example.com/pinard/default.html?page=3");
    }

    #[test]
    fn test_render_offset_placeholder() {
        let t = PageUrlTemplate::new("https://example.com/board/4?offset={offset}", None, 10)
            .unwrap();
        assert_eq!(t.render(1), "https://example.com/board/4?offset=0");
        assert_eq!(t.render(4), "https://example.com/board/4?offset=30");
    }

    #[test]
    fn test_derived_pattern_for_path_index() {
        let t = PageUrlTemplate::new("http://sh.example.com/news/list_17_727_{page}.htm", None, 10)
            .unwrap();
        assert_eq!(t.index_pattern(), r"list_17_727_(\d+)\.htm");
        assert_eq!(t.infer_page("/news/list_17_727_14.htm"), Some(14));
        assert_eq!(
            t.infer_page("http://sh.example.com/news/list_17_727_2.htm"),
            Some(2)
        );
        assert_eq!(t.infer_page("/news/other_3.htm"), None);
    }

    #[test]
    fn test_derived_pattern_for_query_index() {
        let t = PageUrlTemplate::new("https://example.com/default.html?page={page}", None, 10)
            .unwrap();
        assert_eq!(t.index_pattern(), r"page=(\d+)");
        assert_eq!(t.infer_page("default.html?page=7"), Some(7));
        assert_eq!(t.infer_page("javascript:void(0)"), None);
    }

    #[test]
    fn test_offset_inference_converts_to_page() {
        let t = PageUrlTemplate::new("https://example.com/board/4?offset={offset}", None, 10)
            .unwrap();
        assert_eq!(t.infer_page("?offset=90"), Some(10));
        assert_eq!(t.infer_page("?offset=0"), Some(1));
    }

    #[test]
    fn test_index_pattern_override() {
        let t = PageUrlTemplate::new("https://example.com/list_{page}.htm", None, 10)
            .unwrap()
            .with_index_pattern(r"_(\d+)\.htm")
            .unwrap();
        assert_eq!(t.infer_page("/anything_5.htm"), Some(5));

        let bad = PageUrlTemplate::new("https://example.com/list_{page}.htm", None, 10)
            .unwrap()
            .with_index_pattern("(unclosed");
        assert!(matches!(bad, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_missing_placeholder_is_rejected() {
        let result = PageUrlTemplate::new("https://example.com/list.htm", None, 10);
        assert!(matches!(result, Err(ConfigError::InvalidTemplate(_))));
    }
}
