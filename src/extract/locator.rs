//! Block locator
//!
//! Finds the repeating item blocks of a listing page through an ordered chain
//! of strategies. Each stage runs only when every earlier stage found nothing:
//!
//! 1. `Selectors`: known "list container > item" shapes, first non-empty wins
//! 2. `ClassKeywords`: item-tag elements whose class names contain a keyword
//! 3. `LinkBearing`: every item-tag element that contains a link
//!
//! Precision drops at each stage, so a markup rewrite degrades the crawl
//! instead of silently returning nothing.

use crate::config::BlocksConfig;
use crate::extract::document::{class_contains_any, NamedSelector};
use crate::ConfigError;
use scraper::{ElementRef, Html};
use std::fmt;

/// One stage of the block location chain
#[derive(Debug, Clone)]
pub enum BlockStrategy {
    /// Ordered compound selectors; the first with any match wins
    Selectors(Vec<NamedSelector>),

    /// Item-tag elements whose class names contain one of the keywords
    ClassKeywords {
        tag: NamedSelector,
        keywords: Vec<String>,
    },

    /// Item-tag elements with at least one `<a>` descendant
    LinkBearing {
        tag: NamedSelector,
        link: NamedSelector,
    },
}

impl BlockStrategy {
    /// Short label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Selectors(_) => "selectors",
            Self::ClassKeywords { .. } => "class-keywords",
            Self::LinkBearing { .. } => "link-bearing",
        }
    }

    /// Runs this stage alone; returns the matching blocks and, for
    /// `Selectors`, the selector that produced them
    fn apply<'a>(&self, document: &'a Html) -> (Vec<ElementRef<'a>>, Option<String>) {
        match self {
            Self::Selectors(selectors) => {
                for selector in selectors {
                    let found = selector.select_in(document);
                    if !found.is_empty() {
                        return (found, Some(selector.as_str().to_string()));
                    }
                }
                (Vec::new(), None)
            }
            Self::ClassKeywords { tag, keywords } => {
                let found = tag
                    .select_in(document)
                    .into_iter()
                    .filter(|el| class_contains_any(*el, keywords))
                    .collect();
                (found, None)
            }
            Self::LinkBearing { tag, link } => {
                let found = tag
                    .select_in(document)
                    .into_iter()
                    .filter(|el| link.first_below(*el).is_some())
                    .collect();
                (found, None)
            }
        }
    }
}

/// Which stage produced a page's blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorStage {
    /// Position in the chain (0-based)
    pub index: usize,
    pub label: &'static str,
    /// The winning selector, for the `Selectors` stage
    pub selector: Option<String>,
}

impl fmt::Display for LocatorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selector {
            Some(selector) => write!(f, "{} '{}'", self.label, selector),
            None => write!(f, "{}", self.label),
        }
    }
}

/// Item blocks located on one page
#[derive(Debug)]
pub struct LocatedBlocks<'a> {
    /// Blocks in document order
    pub blocks: Vec<ElementRef<'a>>,
    /// None when no stage matched
    pub stage: Option<LocatorStage>,
}

impl<'a> LocatedBlocks<'a> {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Ordered chain of block strategies
#[derive(Debug, Clone)]
pub struct BlockLocator {
    strategies: Vec<BlockStrategy>,
}

impl BlockLocator {
    /// Creates a locator from an explicit strategy chain
    pub fn new(strategies: Vec<BlockStrategy>) -> Self {
        Self { strategies }
    }

    /// Builds the standard three-stage chain from the `[blocks]` section
    ///
    /// An empty selector list or keyword list drops that stage.
    pub fn from_config(config: &BlocksConfig) -> Result<Self, ConfigError> {
        let tag = NamedSelector::parse(&config.item_tag)?;
        let mut strategies = Vec::new();

        if !config.selectors.is_empty() {
            strategies.push(BlockStrategy::Selectors(NamedSelector::parse_all(
                &config.selectors,
            )?));
        }

        if !config.keywords.is_empty() {
            strategies.push(BlockStrategy::ClassKeywords {
                tag: tag.clone(),
                keywords: config.keywords.clone(),
            });
        }

        strategies.push(BlockStrategy::LinkBearing {
            tag,
            link: NamedSelector::parse("a")?,
        });

        Ok(Self::new(strategies))
    }

    pub fn strategies(&self) -> &[BlockStrategy] {
        &self.strategies
    }

    /// Locates item blocks, trying each stage in order
    ///
    /// Deterministic and side-effect free: the same document always yields
    /// the same blocks in document order.
    pub fn locate<'a>(&self, document: &'a Html) -> LocatedBlocks<'a> {
        for (index, strategy) in self.strategies.iter().enumerate() {
            let (blocks, selector) = strategy.apply(document);
            if blocks.is_empty() {
                tracing::trace!("Block stage {} found nothing", strategy.label());
                continue;
            }

            let stage = LocatorStage {
                index,
                label: strategy.label(),
                selector,
            };
            tracing::debug!("Located {} blocks with {}", blocks.len(), stage);
            return LocatedBlocks {
                blocks,
                stage: Some(stage),
            };
        }

        LocatedBlocks {
            blocks: Vec::new(),
            stage: None,
        }
    }
}
