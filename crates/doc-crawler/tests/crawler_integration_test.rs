use std::pin::pin;
use std::time::Duration;

use doc_crawler::FetchError;
use doc_crawler::crawler::Crawler;
use doc_crawler::http_client::HttpClient;
use doc_crawler::page::PageResult;
use doc_crawler::processor::{ContentProcessor, PAGE_SEPARATOR};
use doc_crawler::stats::StatsRecorder;
use futures::StreamExt;
use httpmock::{Method::GET, Mock, MockServer};
use tokio_util::sync::CancellationToken;

fn crawler(respect_robots: bool) -> Crawler {
    let client = HttpClient::new("doc-crawler-test/1.0", Duration::from_secs(5), 4).unwrap();
    Crawler::with_client(client, respect_robots)
}

fn base_url(server: &MockServer) -> String {
    format!("http://{}", server.address())
}

async fn page<'a>(server: &'a MockServer, path: &str, links: &[&str]) -> Mock<'a> {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">Link to {}</a>"#, link, link))
        .collect();
    let body = format!(
        "<html><head><title>Page {path}</title></head><body><main><p>Content of page {path}</p>{anchors}</main></body></html>"
    );
    let path = path.to_string();
    server
        .mock_async(move |when, then| {
            when.method(GET).path(path);
            then.status(200)
                .header("content-type", "text/html")
                .body(body);
        })
        .await
}

async fn crawl_all(
    crawler: &mut Crawler,
    start_url: &str,
    max_depth: usize,
) -> Vec<PageResult> {
    crawler
        .crawl(start_url, max_depth, Duration::ZERO, CancellationToken::new())
        .collect()
        .await
}

fn paths(results: &[PageResult], base: &str) -> Vec<String> {
    results
        .iter()
        .map(|result| {
            let path = result.url.trim_start_matches(base);
            if path.is_empty() { "/".to_string() } else { path.to_string() }
        })
        .collect()
}

#[tokio::test]
async fn test_max_depth_zero_fetches_only_start_page() {
    let server = MockServer::start_async().await;
    page(&server, "/", &["/a", "/b"]).await;
    let base = base_url(&server);

    let results = crawl_all(&mut crawler(false), &base, 0).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, base);
    assert_eq!(results[0].title, "Page /");
    assert_eq!(results[0].links.len(), 2);
}

#[tokio::test]
async fn test_breadth_first_order_and_depth_bound() {
    let server = MockServer::start_async().await;
    page(&server, "/", &["/a", "/b"]).await;
    page(&server, "/a", &["/a/deep", "/"]).await;
    page(&server, "/b", &["/b/deep"]).await;
    page(&server, "/a/deep", &["/a/deeper"]).await;
    page(&server, "/b/deep", &[]).await;
    let base = base_url(&server);

    let one = crawl_all(&mut crawler(false), &base, 1).await;
    assert_eq!(paths(&one, &base), vec!["/", "/a", "/b"]);

    let two = crawl_all(&mut crawler(false), &base, 2).await;
    assert_eq!(
        paths(&two, &base),
        vec!["/", "/a", "/b", "/a/deep", "/b/deep"]
    );
    assert!(two.iter().all(PageResult::is_success));
}

#[tokio::test]
async fn test_shared_link_fetched_once() {
    let server = MockServer::start_async().await;
    page(&server, "/", &["/a", "/b"]).await;
    page(&server, "/a", &["/shared", "/shared/"]).await;
    page(&server, "/b", &["/shared?from=b", "/shared#top"]).await;
    let shared = page(&server, "/shared", &[]).await;
    let base = base_url(&server);

    let results = crawl_all(&mut crawler(false), &base, 3).await;

    assert_eq!(paths(&results, &base), vec!["/", "/a", "/b", "/shared"]);
    shared.assert_async().await;
}

#[tokio::test]
async fn test_cancel_after_second_result() {
    let server = MockServer::start_async().await;
    page(&server, "/", &["/p1", "/p2", "/p3", "/p4"]).await;
    for path in ["/p1", "/p2", "/p3", "/p4"] {
        page(&server, path, &[]).await;
    }
    let base = base_url(&server);

    let cancel = CancellationToken::new();
    let mut crawler = crawler(false);
    let mut stream = pin!(crawler.crawl(&base, 1, Duration::ZERO, cancel.clone()));

    let processor = ContentProcessor::default();
    let mut recorder = StatsRecorder::new(&base, 1, Duration::ZERO, false);
    let mut results = Vec::new();
    while let Some(result) = stream.next().await {
        recorder.record(&result, &processor.process_result(&result, true));
        results.push(result);
        if results.len() == 2 {
            cancel.cancel();
        }
    }
    recorder.mark_cancelled();
    let stats = recorder.finish();

    assert_eq!(results.len(), 2);
    assert_eq!(stats.total_urls(), 2);
    assert_eq!(stats.successful_urls, vec![base.clone(), format!("{}/p1", base)]);
    assert!(stats.failed_urls.is_empty());
    assert!(stats.cancelled);
}

#[tokio::test]
async fn test_cancel_interrupts_delay() {
    let server = MockServer::start_async().await;
    page(&server, "/", &["/next"]).await;
    page(&server, "/next", &[]).await;
    let base = base_url(&server);

    let cancel = CancellationToken::new();
    let mut crawler = crawler(false);
    let mut stream = pin!(crawler.crawl(&base, 1, Duration::from_secs(30), cancel.clone()));

    let first = stream.next().await.unwrap();
    assert!(first.is_success());

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let next = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("cancellation should cut the delay short");
    assert!(next.is_none());
}

#[tokio::test]
async fn test_cross_host_links_are_not_followed() {
    let server = MockServer::start_async().await;
    page(
        &server,
        "/",
        &["https://elsewhere.example.org/page", "http://127.0.0.2:1/x", "/local"],
    )
    .await;
    page(&server, "/local", &[]).await;
    let base = base_url(&server);

    let results = crawl_all(&mut crawler(false), &base, 2).await;

    assert_eq!(paths(&results, &base), vec!["/", "/local"]);
}

#[tokio::test]
async fn test_robots_server_error_allows_everything() {
    let server = MockServer::start_async().await;
    let robots = server
        .mock_async(|when, then| {
            when.method(GET).path("/robots.txt");
            then.status(500);
        })
        .await;
    page(&server, "/", &["/private"]).await;
    page(&server, "/private", &[]).await;
    let base = base_url(&server);

    let results = crawl_all(&mut crawler(true), &base, 1).await;

    assert_eq!(paths(&results, &base), vec!["/", "/private"]);
    assert!(results.iter().all(PageResult::is_success));
    robots.assert_async().await;
}

#[tokio::test]
async fn test_robots_disallow_blocks_page() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/robots.txt");
            then.status(200).body("User-agent: *\nDisallow: /private");
        })
        .await;
    page(&server, "/", &["/private", "/public"]).await;
    page(&server, "/public", &[]).await;
    let base = base_url(&server);

    let results = crawl_all(&mut crawler(true), &base, 1).await;

    assert_eq!(paths(&results, &base), vec!["/", "/private", "/public"]);
    let blocked = &results[1];
    assert_eq!(blocked.status_code, 403);
    assert_eq!(blocked.error, Some(FetchError::PolicyBlocked));
    assert!(blocked.content.is_none());
    assert!(results[2].is_success());
}

#[tokio::test]
async fn test_failed_pages_are_reported_and_not_expanded() {
    let server = MockServer::start_async().await;
    page(&server, "/", &["/missing"]).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body(r#"<a href="/never">never</a>"#);
        })
        .await;
    let base = base_url(&server);

    let results = crawl_all(&mut crawler(false), &base, 3).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[1].status_code, 404);
    assert!(matches!(
        results[1].error,
        Some(FetchError::HttpStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_redirect_reports_final_url() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/old");
            then.status(301).header("location", "/new/");
        })
        .await;
    page(&server, "/new/", &["child"]).await;
    let base = base_url(&server);

    let results = crawl_all(&mut crawler(false), &format!("{}/old", base), 0).await;

    assert_eq!(results.len(), 1);
    assert!(results[0].was_redirected);
    assert_eq!(results[0].requested_url, format!("{}/old", base));
    assert_eq!(results[0].url, format!("{}/new", base));
    assert_eq!(results[0].links[0].as_str(), format!("{}/new/child", base));
}

#[tokio::test]
async fn test_invalid_start_url_yields_single_error() {
    let results = crawl_all(&mut crawler(false), "not a url", 3).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status_code, 0);
    assert!(matches!(results[0].error, Some(FetchError::InvalidUrl(_))));
}

#[tokio::test]
async fn test_unreachable_host_yields_transport_error() {
    let results = crawl_all(&mut crawler(false), "http://127.0.0.1:9/", 1).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status_code, 0);
    assert!(matches!(results[0].error, Some(FetchError::Transport(_))));
}

#[tokio::test]
async fn test_crawl_to_combined_markdown() {
    let server = MockServer::start_async().await;
    page(&server, "/", &["/guide"]).await;
    page(&server, "/guide", &[]).await;
    let base = base_url(&server);

    let results = crawl_all(&mut crawler(false), &base, 1).await;
    let combined = ContentProcessor::default().process_multiple(&results, true);

    assert_eq!(combined.matches(PAGE_SEPARATOR).count(), 3);
    assert!(combined.starts_with(&format!("# Page /\n**Source:** `{}`", base)));
    assert!(combined.contains("Content of page /guide"));
}
