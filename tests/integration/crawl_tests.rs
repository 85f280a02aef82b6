//! Integration tests for the crawler
//!
//! These tests use wiremock to serve listing pages and exercise the full
//! fetch, extract, paginate and persist cycle over real HTTP.

use list_harvest::config::parse_config;
use list_harvest::crawler::{self, FetchError, HttpFetcher, PageFetcher};
use list_harvest::extract::ExtractionProfile;
use list_harvest::output::{self, AssetSink};
use list_harvest::state::{CrawlOutcome, StopReason};
use list_harvest::Config;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a listing profile against the mock server
fn create_test_config(base_url: &str, crawl: &str, extra: &str) -> Config {
    let toml = format!(
        r#"
[crawl]
page-delay = 10
{crawl}

[source]
url-template = "{base_url}/news/list_{{page}}.htm"

[[fields]]
name = "title"
mandatory = true
candidates = [{{ selector = "a" }}]

[[fields]]
name = "url"
kind = "url"
mandatory = true
candidates = [{{ selector = "a", attributes = ["href"] }}]

[[fields]]
name = "publish_time"
kind = "date"
pattern = '\d{{4}}-\d{{2}}-\d{{2}}'
candidates = [{{ selector = ".time" }}, {{ from = "text-nodes" }}]

{extra}
"#
    );
    parse_config(&toml).expect("Failed to parse test profile")
}

/// A listing page with `items` entries followed by `pagination` markup
fn listing_page(page: u32, items: usize, pagination: &str) -> String {
    let entries: String = (1..=items)
        .map(|i| {
            format!(
                r#"<li><a href="/news/{page}_{i}.htm">通知 {page}-{i}</a><span class="time">2024-03-{i:02}</span></li>"#
            )
        })
        .collect();
    format!(
        r#"<html><head><meta charset="utf-8"></head><body><ul class="news-list">{}</ul>{}</body></html>"#,
        entries, pagination
    )
}

fn numbered_links(last: u32) -> String {
    let links: String = (1..=last)
        .map(|p| format!(r#"<a href="list_{p}.htm">{p}</a>"#))
        .collect();
    format!(r#"<div class="pages">{}</div>"#, links)
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_page_listing_over_http() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/news/list_1.htm",
        listing_page(1, 10, &numbered_links(2)),
    )
    .await;
    mount_html(
        &mock_server,
        "/news/list_2.htm",
        listing_page(2, 3, &numbered_links(2)),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), "", "");
    let report = crawler::harvest(&config, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome, CrawlOutcome::Done);
    assert_eq!(report.stop_reason, StopReason::LastPage);
    assert_eq!(report.pages_succeeded, 2);
    assert_eq!(report.records.len(), 13);
    assert_eq!(
        report.pagination.and_then(|p| p.total_pages()),
        Some(2)
    );

    let pages: Vec<u32> = report.records.iter().map(|r| r.source_page()).collect();
    assert_eq!(pages.iter().filter(|&&p| p == 1).count(), 10);
    assert_eq!(pages.iter().filter(|&&p| p == 2).count(), 3);

    let first = &report.records[0];
    assert_eq!(first.text("title"), Some("通知 1-1"));
    assert_eq!(
        first.text("url"),
        Some(format!("{}/news/1_1.htm", mock_server.uri()).as_str())
    );
    assert_eq!(first.text("publish_time"), Some("2024-03-01"));
}

#[tokio::test]
async fn test_http_fetcher_reports_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.htm"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(reqwest::Client::new());
    let result = fetcher
        .fetch(&format!("{}/gone.htm", mock_server.uri()))
        .await;

    assert_eq!(result.unwrap_err(), FetchError::Status(404));
}

#[tokio::test]
async fn test_http_fetcher_decodes_body() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/news/list_1.htm", listing_page(1, 1, "")).await;

    let fetcher = HttpFetcher::new(reqwest::Client::new());
    let page = fetcher
        .fetch(&format!("{}/news/list_1.htm", mock_server.uri()))
        .await
        .expect("Fetch failed");

    assert_eq!(page.status, 200);
    assert!(page.is_html());
    assert!(page.body.contains("通知 1-1"));
}

#[tokio::test]
async fn test_unreachable_listing_aborts() {
    // Nothing mounted: every page answers 404
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri(), "max-consecutive-failures = 2", "");

    let report = crawler::harvest(&config, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome, CrawlOutcome::Aborted);
    assert_eq!(report.stop_reason, StopReason::TooManyFailures);
    assert_eq!(report.pages_failed, 2);
    assert!(report.records.is_empty());
    assert_eq!(
        report.failures[0].url,
        format!("{}/news/list_1.htm", mock_server.uri())
    );
}

#[tokio::test]
async fn test_records_persist_to_json_and_csv() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/news/list_1.htm", listing_page(1, 4, "")).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let json_path = dir.path().join("out/records.json");
    let csv_path = dir.path().join("out/records.csv");
    let extra = format!(
        "[output]\njson-path = '{}'\ncsv-path = '{}'\n",
        json_path.display(),
        csv_path.display()
    );
    let config = create_test_config(&mock_server.uri(), "", &extra);
    let columns = ExtractionProfile::compile(&config)
        .expect("Failed to compile profile")
        .columns();

    let report = crawler::harvest(&config, CancellationToken::new())
        .await
        .expect("Crawl failed");
    assert_eq!(report.outcome, CrawlOutcome::Done);
    assert_eq!(report.records.len(), 4);

    let sinks = output::sinks_from_config(&config.output, chrono::Local::now());
    output::persist(&sinks, &columns, &report.records).expect("Failed to persist");

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    let array = json.as_array().expect("JSON output is not an array");
    assert_eq!(array.len(), 4);
    assert_eq!(array[0]["title"], "通知 1-1");
    assert_eq!(array[0]["source_page"], 1);

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("title,url,publish_time,source_page")
    );
    assert_eq!(lines.count(), 4);
}

#[tokio::test]
async fn test_assets_downloaded_once() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let body = format!(
        r#"<html><body><dl class="board-wrapper">
            <dd><p class="name"><a href="/films/1">霸王别姬</a></p>
                <img class="board-img" data-src="{base}/posters/1.jpg@160w_220h_1e_1c" src="/loading.png"></dd>
            <dd><p class="name"><a href="/films/2">活着</a></p></dd>
        </dl></body></html>"#
    );
    Mock::given(method("GET"))
        .and(path("/board/4"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posters/1.jpg@160w_220h_1e_1c"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"poster".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let toml = format!(
        r#"
[crawl]
page-delay = 0
max-pages = 1

[source]
url-template = "{base}/board/4?offset={{offset}}"

[blocks]
selectors = ["dl.board-wrapper dd"]
item-tag = "dd"

[[fields]]
name = "name"
mandatory = true
candidates = [{{ selector = "p.name a" }}]

[[fields]]
name = "image_url"
kind = "url"
candidates = [{{ selector = "img.board-img" }}]

[pagination]
mode = "budget"
"#
    );
    let config = parse_config(&toml).expect("Failed to parse profile");
    let report = crawler::harvest(&config, CancellationToken::new())
        .await
        .expect("Crawl failed");
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.stop_reason, StopReason::PageBudget);

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let sink = AssetSink::new(reqwest::Client::new(), dir.path(), "image_url", "name");

    assert_eq!(sink.save_all(&report.records).await, 1);
    assert_eq!(
        std::fs::read(dir.path().join("霸王别姬.jpg")).unwrap(),
        b"poster"
    );

    // Second pass finds the file in place
    assert_eq!(sink.save_all(&report.records).await, 0);
}
