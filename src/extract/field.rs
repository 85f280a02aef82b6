//! Field extraction
//!
//! Every output field is described by a [`FieldSpec`]: an ordered list of
//! candidate locators, an optional pattern, prefixes to strip, and a typed
//! coercion. Candidates are tried in declaration order and the first one that
//! yields non-empty, pattern-valid, coercible text wins. A field that cannot
//! be resolved takes its default; only mandatory fields can reject a block.

use crate::config::{CandidateConfig, CandidateSource, FieldConfig, FieldKind};
use crate::extract::document::{attribute, element_text, text_nodes, NamedSelector};
use crate::extract::record::{FieldValue, Record};
use crate::extract::ExtractError;
use crate::url::resolve_link;
use crate::ConfigError;
use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;
use url::Url;

/// Attribute precedence for URL fields when a candidate names none.
/// Lazily loaded images keep the real URL in `data-src` and a placeholder in `src`.
const URL_ATTRIBUTES: &[&str] = &["data-src", "data-original", "src", "href"];

/// Lines kept by a residual candidate when the profile does not say
const DEFAULT_RESIDUAL_LINES: usize = 2;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid date regex"));

/// One way of finding a field's raw text inside a block
#[derive(Debug, Clone)]
pub enum Candidate {
    /// First element matching the selector; attributes are read in order
    Element {
        selector: NamedSelector,
        attributes: Vec<String>,
    },
    /// Concatenated text of the whole block
    Block,
    /// Each text node of the block, in document order
    TextNodes,
    /// Block lines not already used by earlier fields and not dated
    Residual { max_lines: usize },
}

impl Candidate {
    fn compile(config: &CandidateConfig) -> Result<Self, ConfigError> {
        Ok(match config.from {
            CandidateSource::Element => {
                let source = config.selector.as_deref().ok_or_else(|| {
                    ConfigError::Validation("element candidate needs a selector".to_string())
                })?;
                Self::Element {
                    selector: NamedSelector::parse(source)?,
                    attributes: config.attributes.clone(),
                }
            }
            CandidateSource::Block => Self::Block,
            CandidateSource::TextNodes => Self::TextNodes,
            CandidateSource::Residual => Self::Residual {
                max_lines: config.max_lines.unwrap_or(DEFAULT_RESIDUAL_LINES).max(1),
            },
        })
    }

    fn describe(&self) -> String {
        match self {
            Self::Element { selector, .. } => format!("element '{}'", selector.as_str()),
            Self::Block => "block".to_string(),
            Self::TextNodes => "text-nodes".to_string(),
            Self::Residual { .. } => "residual".to_string(),
        }
    }
}

/// Compiled description of one output field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    mandatory: bool,
    candidates: Vec<Candidate>,
    pattern: Option<Regex>,
    strip_prefixes: Vec<String>,
    default: FieldValue,
    distinct_from: Option<String>,
}

impl FieldSpec {
    /// Compiles selectors and the pattern of a `[[fields]]` entry
    pub fn compile(config: &FieldConfig) -> Result<Self, ConfigError> {
        let candidates = config
            .candidates
            .iter()
            .map(Candidate::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let pattern = config
            .pattern
            .as_deref()
            .map(|p| {
                Regex::new(p).map_err(|source| ConfigError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .transpose()?;

        let default = match (config.kind, config.default.as_deref()) {
            (FieldKind::Integer, Some(raw)) => {
                FieldValue::Integer(raw.trim().parse().map_err(|_| {
                    ConfigError::Validation(format!(
                        "integer field '{}' has non-numeric default '{}'",
                        config.name, raw
                    ))
                })?)
            }
            (FieldKind::Integer, None) => FieldValue::Integer(0),
            (_, Some(raw)) => FieldValue::Text(raw.to_string()),
            (_, None) => FieldValue::Text(String::new()),
        };

        Ok(Self {
            name: config.name.clone(),
            kind: config.kind,
            mandatory: config.mandatory,
            candidates,
            pattern,
            strip_prefixes: config.strip_prefix.clone(),
            default,
            distinct_from: config.distinct_from.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// Value used when no candidate succeeds
    pub fn default_value(&self) -> &FieldValue {
        &self.default
    }

    /// Tries every candidate in order
    ///
    /// `earlier` holds the values already extracted from this block.
    pub fn extract(
        &self,
        block: ElementRef<'_>,
        page_url: &Url,
        earlier: &[(String, FieldValue)],
    ) -> Result<FieldValue, ExtractError> {
        for candidate in &self.candidates {
            for raw in self.raw_texts(candidate, block, earlier) {
                if let Some(value) = self.refine(&raw, page_url, earlier) {
                    tracing::trace!(
                        "Field '{}' resolved by {}",
                        self.name,
                        candidate.describe()
                    );
                    return Ok(value);
                }
            }
            tracing::trace!("Field '{}': {} failed", self.name, candidate.describe());
        }

        Err(ExtractError::FieldUnresolved {
            field: self.name.clone(),
            candidates: self.candidates.len(),
        })
    }

    /// Raw strings a candidate offers, best first
    fn raw_texts(
        &self,
        candidate: &Candidate,
        block: ElementRef<'_>,
        earlier: &[(String, FieldValue)],
    ) -> Vec<String> {
        match candidate {
            Candidate::Element {
                selector,
                attributes,
            } => {
                let Some(element) = selector.first_below(block) else {
                    return Vec::new();
                };
                self.element_value(element, attributes)
                    .into_iter()
                    .collect()
            }
            Candidate::Block => vec![element_text(block)],
            Candidate::TextNodes => text_nodes(block),
            Candidate::Residual { max_lines } => {
                let used: Vec<String> = earlier.iter().map(|(_, v)| v.to_string()).collect();
                let lines: Vec<String> = text_nodes(block)
                    .iter()
                    .flat_map(|node| node.lines())
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .filter(|line| !used.iter().any(|u| u == line))
                    .filter(|line| !DATE_RE.is_match(line))
                    .take(*max_lines)
                    .map(str::to_string)
                    .collect();
                vec![lines.join(" ")]
            }
        }
    }

    /// Attribute value (first non-empty in precedence order) or text
    fn element_value(&self, element: ElementRef<'_>, attributes: &[String]) -> Option<String> {
        if !attributes.is_empty() {
            return attributes.iter().find_map(|name| attribute(element, name));
        }
        if self.kind == FieldKind::Url {
            return URL_ATTRIBUTES.iter().find_map(|name| attribute(element, name));
        }
        Some(element_text(element))
    }

    /// Strips prefixes, applies the pattern, checks distinctness and coerces
    fn refine(
        &self,
        raw: &str,
        page_url: &Url,
        earlier: &[(String, FieldValue)],
    ) -> Option<FieldValue> {
        let mut text = raw.trim();
        for prefix in &self.strip_prefixes {
            if let Some(rest) = text.strip_prefix(prefix.as_str()) {
                text = rest.trim_start();
            }
        }

        let text = match &self.pattern {
            Some(pattern) => {
                let captures = pattern.captures(text)?;
                captures.get(1).or_else(|| captures.get(0))?.as_str().trim()
            }
            None => text,
        };

        if text.is_empty() {
            return None;
        }

        if let Some(other) = &self.distinct_from {
            let clashes = earlier
                .iter()
                .any(|(name, value)| name == other && value.as_text() == Some(text));
            if clashes {
                return None;
            }
        }

        match self.kind {
            FieldKind::Integer => text.parse::<i64>().ok().map(FieldValue::Integer),
            FieldKind::Url => resolve_link(text, page_url).map(FieldValue::Text),
            FieldKind::Text | FieldKind::Date => Some(FieldValue::Text(text.to_string())),
        }
    }
}

/// Builds records from item blocks
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    fields: Vec<FieldSpec>,
}

impl FieldExtractor {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Compiles every `[[fields]]` entry in declaration order
    pub fn from_config(fields: &[FieldConfig]) -> Result<Self, ConfigError> {
        Ok(Self::new(
            fields
                .iter()
                .map(FieldSpec::compile)
                .collect::<Result<Vec<_>, _>>()?,
        ))
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Declared field names, in order
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Extracts one record from a block
    ///
    /// Unresolved optional fields take their default and extraction carries
    /// on; an unresolved mandatory field rejects the whole block.
    pub fn extract(
        &self,
        block: ElementRef<'_>,
        page_url: &Url,
        source_page: u32,
    ) -> Result<Record, ExtractError> {
        let mut values: Vec<(String, FieldValue)> = Vec::with_capacity(self.fields.len());

        for spec in &self.fields {
            let value = match spec.extract(block, page_url, &values) {
                Ok(value) => value,
                Err(_) if spec.mandatory => {
                    return Err(ExtractError::MandatoryFieldMissing {
                        field: spec.name.clone(),
                    });
                }
                Err(e) => {
                    tracing::trace!("{}; using default", e);
                    spec.default.clone()
                }
            };
            values.push((spec.name.clone(), value));
        }

        Ok(Record::new(values, source_page))
    }
}
