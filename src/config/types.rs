use serde::Deserialize;

/// Main configuration structure for a listing profile
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub blocks: BlocksConfig,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub assets: Option<AssetConfig>,
}

/// Crawl loop behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Stop once this many records were gathered
    pub target_records: Option<usize>,

    /// First page index to fetch (1-based)
    #[serde(default = "default_start_page")]
    pub start_page: u32,

    /// Maximum number of pages to attempt
    pub max_pages: Option<u32>,

    /// Minimum time between two page fetches (milliseconds)
    #[serde(default = "default_page_delay")]
    pub page_delay: u64,

    /// Pause after each accepted record (milliseconds)
    #[serde(default)]
    pub item_delay: u64,

    /// Consecutive failed pages that abort the crawl
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,

    /// Number of page fetches allowed in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            target_records: None,
            start_page: default_start_page(),
            max_pages: None,
            page_delay: default_page_delay(),
            item_delay: 0,
            max_consecutive_failures: default_max_consecutive_failures(),
            concurrency: default_concurrency(),
        }
    }
}

/// Client identity presented to listing sites
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    #[serde(default = "default_user_agent")]
    pub value: String,

    /// Accept-Language header value
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
            accept_language: default_accept_language(),
            timeout: default_timeout(),
        }
    }
}

/// Where the listing pages live
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceConfig {
    /// Page URL with a `{page}` or `{offset}` placeholder
    pub url_template: String,

    /// URL used for page 1 instead of the template
    pub first_page_url: Option<String>,

    /// Items per page, used to compute `{offset}`
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Block location strategy chain
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BlocksConfig {
    /// Compound selectors tried in order
    #[serde(default = "default_block_selectors")]
    pub selectors: Vec<String>,

    /// Class keywords for the fallback scan
    #[serde(default = "default_block_keywords")]
    pub keywords: Vec<String>,

    /// Generic item tag used by the fallback stages
    #[serde(default = "default_item_tag")]
    pub item_tag: String,
}

impl Default for BlocksConfig {
    fn default() -> Self {
        Self {
            selectors: default_block_selectors(),
            keywords: default_block_keywords(),
            item_tag: default_item_tag(),
        }
    }
}

/// Declared type of an extracted field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    #[default]
    Text,
    Integer,
    Date,
    Url,
}

/// Where a candidate takes its raw text from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateSource {
    /// First element matching `selector` inside the block
    #[default]
    Element,
    /// Concatenated text of the whole block
    Block,
    /// Individual text nodes of the block
    TextNodes,
    /// Block lines left over after removing known values and dated lines
    Residual,
}

/// One candidate locator of a field
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CandidateConfig {
    #[serde(default)]
    pub from: CandidateSource,

    pub selector: Option<String>,

    /// Attributes read instead of text, in precedence order
    #[serde(default)]
    pub attributes: Vec<String>,

    /// Lines kept by a residual candidate
    pub max_lines: Option<usize>,
}

/// Declarative description of one output field
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldConfig {
    pub name: String,

    #[serde(default)]
    pub kind: FieldKind,

    #[serde(default)]
    pub mandatory: bool,

    #[serde(default)]
    pub candidates: Vec<CandidateConfig>,

    pub pattern: Option<String>,

    #[serde(default)]
    pub strip_prefix: Vec<String>,

    pub default: Option<String>,

    /// Reject candidates equal to this earlier field's value
    pub distinct_from: Option<String>,
}

/// How the crawl learns where the listing ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaginationMode {
    /// Resolve pagination signals on the first fetched page
    #[default]
    Detect,
    /// Walk pages until the budget, target or an empty page stops the crawl
    Budget,
}

/// Pagination signal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PaginationConfig {
    #[serde(default)]
    pub mode: PaginationMode,

    /// Pagination container selectors
    #[serde(default = "default_pagination_selectors")]
    pub selectors: Vec<String>,

    /// Regex matched against individual class names of containers
    #[serde(default = "default_pagination_class_pattern")]
    pub class_pattern: String,

    #[serde(default = "default_next_markers")]
    pub next_markers: Vec<String>,

    #[serde(default = "default_last_markers")]
    pub last_markers: Vec<String>,

    /// Selectors whose presence alone signals a next page
    #[serde(default = "default_next_selectors")]
    pub next_selectors: Vec<String>,

    /// Overrides the page-index regex derived from the URL template
    pub page_pattern: Option<String>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            mode: PaginationMode::default(),
            selectors: default_pagination_selectors(),
            class_pattern: default_pagination_class_pattern(),
            next_markers: default_next_markers(),
            last_markers: default_last_markers(),
            next_selectors: default_next_selectors(),
            page_pattern: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    pub json_path: Option<String>,
    pub csv_path: Option<String>,

    /// Append `_YYYYmmdd_HHMMSS` to output file stems
    #[serde(default)]
    pub timestamped: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: Some("records.json".to_string()),
            csv_path: Some("records.csv".to_string()),
            timestamped: false,
        }
    }
}

/// Binary asset download configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssetConfig {
    /// Field holding the media URL
    pub url_field: String,

    /// Field used to derive the file name
    pub name_field: String,

    pub directory: String,
}

fn default_start_page() -> u32 {
    1
}

fn default_page_delay() -> u64 {
    1000
}

fn default_max_consecutive_failures() -> u32 {
    3
}

fn default_concurrency() -> usize {
    1
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_accept_language() -> String {
    "zh-CN,zh;q=0.9,en;q=0.8".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_page_size() -> u32 {
    10
}

fn default_block_selectors() -> Vec<String> {
    [
        ".list-article li",
        ".news-list li",
        ".list-content li",
        ".article-list li",
        "ul.list li",
        ".list-box li",
        ".news-box li",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_block_keywords() -> Vec<String> {
    ["list", "article", "news", "box", "post", "entry", "blog"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_item_tag() -> String {
    "li".to_string()
}

fn default_pagination_selectors() -> Vec<String> {
    [".page", ".pagination", ".pages", ".page-num", ".pager"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_pagination_class_pattern() -> String {
    r"(?i)^(pages?|pager|pagination|paging|page-?num|pagenav)$".to_string()
}

fn default_next_markers() -> Vec<String> {
    ["下一页", "下页", "next"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_last_markers() -> Vec<String> {
    ["末页", "尾页", "最后一页", "last"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_next_selectors() -> Vec<String> {
    [r#"a[title*="下一页"]"#, r#"a[class*="next"]"#]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
