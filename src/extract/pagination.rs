//! Pagination discovery
//!
//! Reads a listing page and works out whether more pages exist. Evidence is
//! ranked by confidence:
//!
//! 1. numeric page links and "last page" hrefs inside pagination regions
//! 2. the index carried by a "next page" href
//! 3. the mere presence of a "next page" control anywhere in the document
//! 4. nothing at all, meaning a single page
//!
//! Explicit numbers always win over an inferred next-link index.

use crate::config::PaginationConfig;
use crate::extract::document::{attribute, element_text, NamedSelector};
use crate::url::PageUrlTemplate;
use crate::ConfigError;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashSet;

/// Which confidence tier produced a pagination state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationEvidence {
    /// Largest page number seen in numeric or "last page" links
    Explicit { last_page: u32 },
    /// Index parsed from a "next page" href; a lower bound only
    NextLink { next_page: u32 },
    /// A "next page" control exists but carries no usable index
    PresenceOnly,
    /// No pagination evidence
    SinglePage,
}

/// Pagination as seen from one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub current_page: u32,
    /// Set only for explicit evidence
    pub known_last_page: Option<u32>,
    pub has_more: bool,
    pub evidence: PaginationEvidence,
}

impl PaginationState {
    /// State for a listing with no pagination controls
    pub fn single_page(current_page: u32) -> Self {
        Self {
            current_page,
            known_last_page: None,
            has_more: false,
            evidence: PaginationEvidence::SinglePage,
        }
    }

    /// Known page count, when the evidence pins it down
    pub fn total_pages(&self) -> Option<u32> {
        match self.evidence {
            PaginationEvidence::Explicit { last_page } => Some(last_page),
            PaginationEvidence::SinglePage => Some(self.current_page),
            PaginationEvidence::NextLink { .. } | PaginationEvidence::PresenceOnly => None,
        }
    }

    /// Whether a page after `page` may exist
    ///
    /// With an unknown total the answer is always yes; the crawl then stops on
    /// an empty page or its page budget.
    pub fn has_more_after(&self, page: u32) -> bool {
        match self.evidence {
            PaginationEvidence::Explicit { last_page } => page < last_page,
            PaginationEvidence::SinglePage => page < self.current_page,
            PaginationEvidence::NextLink { .. } | PaginationEvidence::PresenceOnly => true,
        }
    }
}

/// Resolves pagination state from a parsed listing page
#[derive(Debug, Clone)]
pub struct PaginationResolver {
    regions: Vec<NamedSelector>,
    region_class: Regex,
    next_markers: Vec<String>,
    last_markers: Vec<String>,
    next_selectors: Vec<NamedSelector>,
    link: NamedSelector,
    template: PageUrlTemplate,
}

impl PaginationResolver {
    /// Compiles the `[pagination]` section against a page URL template
    pub fn from_config(
        config: &PaginationConfig,
        template: PageUrlTemplate,
    ) -> Result<Self, ConfigError> {
        let template = match config.page_pattern.as_deref() {
            Some(pattern) => template.with_index_pattern(pattern)?,
            None => template,
        };

        let region_class =
            Regex::new(&config.class_pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: config.class_pattern.clone(),
                source,
            })?;

        Ok(Self {
            regions: NamedSelector::parse_all(&config.selectors)?,
            region_class,
            next_markers: lowercase_all(&config.next_markers),
            last_markers: lowercase_all(&config.last_markers),
            next_selectors: NamedSelector::parse_all(&config.next_selectors)?,
            link: NamedSelector::parse("a")?,
            template,
        })
    }

    pub fn template(&self) -> &PageUrlTemplate {
        &self.template
    }

    /// Determines pagination as seen from `current_page`
    pub fn resolve(&self, document: &Html, current_page: u32) -> PaginationState {
        let links = self.region_links(document);

        let mut explicit: Option<u32> = None;
        let mut next_link: Option<u32> = None;

        for link in links {
            let text = element_text(link);

            if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(number) = text.parse::<u32>() {
                    explicit = explicit.max(Some(number));
                }
                continue;
            }

            let lowered = text.to_lowercase();
            let href_page = || {
                attribute(link, "href").and_then(|href| self.template.infer_page(&href))
            };

            if is_marker(&lowered, &self.last_markers) {
                if let Some(page) = href_page() {
                    explicit = explicit.max(Some(page));
                }
            } else if is_marker(&lowered, &self.next_markers) {
                if let Some(page) = href_page() {
                    next_link = next_link.max(Some(page));
                }
            }
        }

        if let Some(last) = explicit {
            if let Some(next) = next_link.filter(|next| *next > last) {
                tracing::warn!(
                    "Pagination conflict on page {}: numbered links end at {}, next link points to {}; keeping {}",
                    current_page,
                    last,
                    next,
                    last
                );
            }
            let last_page = last.max(current_page);
            tracing::debug!("Explicit pagination: last page {}", last_page);
            return PaginationState {
                current_page,
                known_last_page: Some(last_page),
                has_more: current_page < last_page,
                evidence: PaginationEvidence::Explicit { last_page },
            };
        }

        if let Some(next_page) = next_link.filter(|next| *next > current_page) {
            tracing::debug!("Next link points to page {}", next_page);
            return PaginationState {
                current_page,
                known_last_page: None,
                has_more: true,
                evidence: PaginationEvidence::NextLink { next_page },
            };
        }

        if self.has_next_control(document) {
            tracing::debug!("Next control present; total pages unknown");
            return PaginationState {
                current_page,
                known_last_page: None,
                has_more: true,
                evidence: PaginationEvidence::PresenceOnly,
            };
        }

        tracing::debug!("No pagination evidence; single page");
        PaginationState::single_page(current_page)
    }

    /// Links inside pagination regions, each counted once, in document order
    fn region_links<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let mut regions: Vec<ElementRef<'a>> = self
            .regions
            .iter()
            .flat_map(|selector| selector.select_in(document))
            .collect();

        regions.extend(
            document
                .root_element()
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().classes().any(|c| self.region_class.is_match(c))),
        );

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for region in regions {
            for link in region.select(self.link.selector()) {
                if seen.insert(link.id()) {
                    links.push(link);
                }
            }
        }
        links
    }

    fn has_next_control(&self, document: &Html) -> bool {
        let by_text = self
            .link
            .select_in(document)
            .into_iter()
            .any(|a| is_marker(&element_text(a).to_lowercase(), &self.next_markers));

        by_text
            || self
                .next_selectors
                .iter()
                .any(|selector| !selector.select_in(document).is_empty())
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

/// True when the link text is one of the markers once arrows and
/// punctuation around it are dropped
///
/// `下一页 >` and `Next »` match `next`; `Next.js 实战` and `Blast` do not.
fn is_marker(text: &str, markers: &[String]) -> bool {
    let label = text.trim_matches(|c: char| !c.is_alphanumeric());
    !label.is_empty() && markers.iter().any(|m| m.as_str() == label)
}
