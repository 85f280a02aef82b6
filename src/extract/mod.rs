//! Extraction engine
//!
//! Everything in this module is synchronous and side-effect free: given the
//! body of one listing page it locates item blocks, fills records and, when
//! asked, reads the pagination controls. The crawler owns all I/O.

mod document;
mod field;
mod locator;
mod pagination;
mod record;

pub use document::{attribute, element_text, text_nodes, NamedSelector};
pub use field::{Candidate, FieldExtractor, FieldSpec};
pub use locator::{BlockLocator, BlockStrategy, LocatedBlocks, LocatorStage};
pub use pagination::{PaginationEvidence, PaginationResolver, PaginationState};
pub use record::{FieldValue, Record, SOURCE_PAGE};

use crate::config::{Config, PaginationMode};
use crate::url::PageUrlTemplate;
use crate::ConfigError;
use scraper::Html;
use thiserror::Error;
use url::Url;

/// Block-level extraction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// No candidate produced a value; absorbed unless the field is mandatory
    #[error("Field '{field}' unresolved after {candidates} candidates")]
    FieldUnresolved { field: String, candidates: usize },

    /// A mandatory field is missing; the block is rejected
    #[error("Mandatory field '{field}' missing")]
    MandatoryFieldMissing { field: String },
}

/// Result of extracting one page
#[derive(Debug, Clone)]
pub struct PageExtraction {
    /// Accepted records, in document order
    pub records: Vec<Record>,
    pub blocks_found: usize,
    pub blocks_rejected: usize,
    pub stage: Option<LocatorStage>,
    /// Present only when pagination was resolved on this page
    pub pagination: Option<PaginationState>,
}

/// A compiled listing profile
///
/// Holds every selector, pattern and template a crawl needs, compiled once
/// up front so a bad profile fails before the first request.
#[derive(Debug, Clone)]
pub struct ExtractionProfile {
    locator: BlockLocator,
    fields: FieldExtractor,
    resolver: PaginationResolver,
    mode: PaginationMode,
}

impl ExtractionProfile {
    pub fn compile(config: &Config) -> Result<Self, ConfigError> {
        let template = PageUrlTemplate::from_config(&config.source)?;
        Ok(Self {
            locator: BlockLocator::from_config(&config.blocks)?,
            fields: FieldExtractor::from_config(&config.fields)?,
            resolver: PaginationResolver::from_config(&config.pagination, template)?,
            mode: config.pagination.mode,
        })
    }

    pub fn locator(&self) -> &BlockLocator {
        &self.locator
    }

    pub fn fields(&self) -> &FieldExtractor {
        &self.fields
    }

    pub fn pagination_mode(&self) -> PaginationMode {
        self.mode
    }

    pub fn template(&self) -> &PageUrlTemplate {
        self.resolver.template()
    }

    /// URL of a 1-based page index
    pub fn page_url(&self, page: u32) -> String {
        self.template().render(page)
    }

    /// Output column order: declared fields, then `source_page`
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.fields.field_names();
        columns.push(SOURCE_PAGE.to_string());
        columns
    }

    /// Extracts records (and optionally pagination) from one page body
    pub fn extract_page(
        &self,
        body: &str,
        page_url: &Url,
        page: u32,
        resolve_pagination: bool,
    ) -> PageExtraction {
        let document = Html::parse_document(body);
        let located = self.locator.locate(&document);

        let mut records = Vec::with_capacity(located.len());
        let mut blocks_rejected = 0;
        for block in &located.blocks {
            match self.fields.extract(*block, page_url, page) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::debug!("Page {}: block rejected: {}", page, e);
                    blocks_rejected += 1;
                }
            }
        }

        let pagination = resolve_pagination.then(|| self.resolver.resolve(&document, page));

        PageExtraction {
            records,
            blocks_found: located.len(),
            blocks_rejected,
            stage: located.stage,
            pagination,
        }
    }
}
